use crate::config::GeneratorConfig;
use crate::error::AnalyzerError;
use rand::Rng;
use serde::Serialize;

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 64;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSets {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for CharacterSets {
    fn default() -> Self {
        Self {
            lower: true,
            upper: true,
            digits: true,
            symbols: true,
        }
    }
}

impl CharacterSets {
    pub fn pool(&self) -> Vec<char> {
        let mut pool = String::new();
        if self.lower {
            pool.push_str(LOWERCASE);
        }
        if self.upper {
            pool.push_str(UPPERCASE);
        }
        if self.digits {
            pool.push_str(DIGITS);
        }
        if self.symbols {
            pool.push_str(SYMBOLS);
        }
        pool.chars().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPassword {
    pub password: String,
    pub length: usize,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PasswordGenerator {
    config: GeneratorConfig,
}

impl PasswordGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn clamp_length(length: usize) -> usize {
        length.clamp(MIN_LENGTH, MAX_LENGTH)
    }

    /// Generate with the configured default length.
    pub fn generate_default(&self, sets: CharacterSets) -> Result<GeneratedPassword, AnalyzerError> {
        self.generate(self.config.default_length, sets)
    }

    /// `length` is clamped to 8..=64. Characters are drawn uniformly from
    /// the selected sets using the thread-local CSPRNG.
    pub fn generate(&self, length: usize, sets: CharacterSets) -> Result<GeneratedPassword, AnalyzerError> {
        let pool = sets.pool();
        if pool.is_empty() {
            return Err(AnalyzerError::NoCharacterSets);
        }

        let length = Self::clamp_length(length);
        let mut rng = rand::thread_rng();
        let password: String = (0..length)
            .map(|_| pool[rng.gen_range(0..pool.len())])
            .collect();

        log::debug!("generated {}-char password from a pool of {}", length, pool.len());
        Ok(GeneratedPassword {
            password,
            length,
            pool_size: pool.len(),
        })
    }
}
