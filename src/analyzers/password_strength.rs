use super::Analyzer;
use crate::config::PasswordConfig;
use crate::error::AnalyzerError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const YEAR: f64 = 31_557_600.0;

lazy_static! {
    static ref YEAR_LIKE: Regex = Regex::new(r"(?-u:\b)(?:19|20)[0-9]{2}(?-u:\b)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    pub fn from_entropy(entropy_bits: f64) -> Self {
        if entropy_bits < 40.0 {
            StrengthLevel::Weak
        } else if entropy_bits < 60.0 {
            StrengthLevel::Medium
        } else {
            StrengthLevel::Strong
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "Very Weak",
            StrengthLevel::Medium => "Medium",
            StrengthLevel::Strong => "Strong",
        }
    }
}

/// Entropy-derived strength and heuristic issues are reported side by
/// side; a strong level can still carry issues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordAssessment {
    pub length: usize,
    pub entropy_bits: f64,
    pub crack_time_estimate: String,
    pub strength: StrengthLevel,
    pub issues: Vec<String>,
}

/// Size of the brute-force alphabet implied by which character classes
/// appear anywhere in the password.
pub fn pool_size(password: &str) -> u32 {
    let mut pool = 0;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        pool += 26;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        pool += 26;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        pool += 10;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        pool += 32;
    }
    pool
}

/// log2(pool) * length, rounded to one decimal.
pub fn estimate_entropy(password: &str) -> f64 {
    let pool = pool_size(password);
    if pool == 0 {
        return 0.0;
    }
    let entropy = f64::from(pool).log2() * password.chars().count() as f64;
    (entropy * 10.0).round() / 10.0
}

/// Year counts from here up print in exponent form instead of digits.
const EXPONENT_YEARS: f64 = 1e21;

/// Time to exhaust a 2^entropy keyspace at `guesses_per_second`.
pub fn crack_time_estimate(entropy_bits: f64, guesses_per_second: f64) -> String {
    let seconds = 2f64.powf(entropy_bits) / guesses_per_second;
    if seconds < 1.0 {
        "< 1 second".to_string()
    } else if seconds < MINUTE {
        format!("{} seconds", seconds.round())
    } else if seconds < HOUR {
        format!("{} minutes", (seconds / MINUTE).round())
    } else if seconds < DAY {
        format!("{} hours", (seconds / HOUR).round())
    } else if seconds < YEAR {
        format!("{} days", (seconds / DAY).round())
    } else if seconds < YEAR * 100.0 {
        format!("{} years", (seconds / YEAR).round())
    } else if seconds / YEAR < EXPONENT_YEARS {
        format!("{:.0}+ years", (seconds / YEAR).round())
    } else {
        // 2^entropy may be infinite here, so work in log space
        let log10_years = entropy_bits * 2f64.log10() - guesses_per_second.log10() - YEAR.log10();
        let mut exponent = log10_years.floor();
        let mut mantissa = (10f64.powf(log10_years - exponent) * 10.0).round() / 10.0;
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1.0;
        }
        format!("{:.1}e+{}+ years", mantissa, exponent as i64)
    }
}

fn has_triple_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|w| w[0].is_ascii_alphanumeric() && w[0] == w[1] && w[1] == w[2])
}

#[derive(Debug, Clone, Default)]
pub struct PasswordStrengthEstimator {
    config: PasswordConfig,
}

impl PasswordStrengthEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PasswordConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn has_keyboard_pattern(&self, password: &str) -> bool {
        let lower = password.to_lowercase();
        self.config
            .keyboard_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }

    pub fn is_common_password(&self, password: &str) -> bool {
        let lower = password.to_lowercase();
        self.config
            .common_passwords
            .iter()
            .any(|p| p.to_lowercase() == lower)
    }

    pub fn find_issues(&self, password: &str) -> Vec<String> {
        let mut issues = Vec::new();
        let length = password.chars().count();

        if length < 8 {
            issues.push("Very short: less than 8 characters.".to_string());
        } else if length < 12 {
            issues.push("Short: consider at least 12+ characters.".to_string());
        }

        let unique: HashSet<char> = password.chars().collect();
        if unique.len() as f64 <= length as f64 / 2.0 {
            issues.push("Repetitive characters: limited variety in the password.".to_string());
        }

        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            issues.push("Numeric-only password: very weak against brute force.".to_string());
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_alphabetic()) {
            issues.push("Alphabet-only password: add digits and symbols.".to_string());
        }
        if self.is_common_password(password) {
            issues.push("Matches a very common password: extremely weak.".to_string());
        }
        if self.has_keyboard_pattern(password) {
            issues.push("Contains common keyboard patterns (e.g. qwerty, 1234).".to_string());
        }
        if YEAR_LIKE.is_match(password) {
            issues.push("Contains what looks like a year: often guessable.".to_string());
        }
        if has_triple_run(password) {
            issues.push("Contains repeated characters (aaa, 111): reduces strength.".to_string());
        }

        issues
    }
}

impl Analyzer for PasswordStrengthEstimator {
    type Report = PasswordAssessment;

    /// The password is taken verbatim; surrounding whitespace counts.
    fn analyze(&self, input: &str) -> Result<PasswordAssessment, AnalyzerError> {
        if input.is_empty() {
            return Err(AnalyzerError::EmptyInput {
                prompt: "Enter a password to analyze.",
            });
        }

        let entropy_bits = estimate_entropy(input);
        let assessment = PasswordAssessment {
            length: input.chars().count(),
            entropy_bits,
            crack_time_estimate: crack_time_estimate(entropy_bits, self.config.guesses_per_second),
            strength: StrengthLevel::from_entropy(entropy_bits),
            issues: self.find_issues(input),
        };
        log::debug!(
            "password: {} bits, {} issue(s)",
            assessment.entropy_bits,
            assessment.issues.len()
        );
        Ok(assessment)
    }

    fn name(&self) -> &str {
        "Password Strength"
    }
}
