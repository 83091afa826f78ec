use super::Analyzer;
use crate::config::RedirectConfig;
use crate::error::{require_input, AnalyzerError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref ENCODED_SLASH: Regex = Regex::new(r"(?i)%2f|%5c").unwrap();
    static ref RAW_IPV4: Regex = Regex::new(r"(?-u:\b)[0-9]{1,3}(\.[0-9]{1,3}){3}(?-u:\b)").unwrap();
    static ref HOST_BEFORE_AT: Regex = Regex::new(r"(?i)//[a-z0-9-]+\.[a-z]{2,}.*@").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectAssessment {
    pub matched_params: Vec<String>,
    pub warnings: Vec<String>,
}

/// Static open-redirect and phishing heuristics over the literal URL text.
/// Nothing is resolved or fetched.
#[derive(Debug, Clone, Default)]
pub struct RedirectAnalyzer {
    config: RedirectConfig,
}

impl RedirectAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RedirectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Suspicious parameter names found anywhere in the text, in list order.
    /// This is a substring search, not a query-string parse.
    pub fn match_params(&self, url: &str) -> Vec<String> {
        let lower = url.to_lowercase();
        let mut matched: Vec<String> = Vec::new();
        for param in &self.config.suspicious_params {
            if lower.contains(&param.to_lowercase()) && !matched.contains(param) {
                matched.push(param.clone());
            }
        }
        matched
    }

    pub fn static_warnings(&self, url: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if ENCODED_SLASH.is_match(url) {
            warnings.push("Encoded slashes (%2F / %5C) present: may hide true path.".to_string());
        }
        if url.contains('@') {
            warnings.push(
                "The '@' symbol appears in the URL: classic trick to hide the real destination."
                    .to_string(),
            );
        }
        if url.chars().count() > self.config.max_url_length {
            warnings.push("URL is quite long: can be a sign of tracking or obfuscation.".to_string());
        }
        if RAW_IPV4.is_match(url) {
            warnings.push("URL uses a raw IP instead of a domain: higher risk for phishing.".to_string());
        }
        if HOST_BEFORE_AT.is_match(url) {
            warnings.push("Possible visually deceptive URL structure before '@'.".to_string());
        }

        warnings
    }
}

impl Analyzer for RedirectAnalyzer {
    type Report = RedirectAssessment;

    fn analyze(&self, input: &str) -> Result<RedirectAssessment, AnalyzerError> {
        let url = require_input(input, "Enter a URL first.")?;
        let assessment = RedirectAssessment {
            matched_params: self.match_params(url),
            warnings: self.static_warnings(url),
        };
        log::debug!(
            "redirect: {} parameter(s), {} warning(s)",
            assessment.matched_params.len(),
            assessment.warnings.len()
        );
        Ok(assessment)
    }

    fn name(&self) -> &str {
        "Redirect Chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(url: &str) -> RedirectAssessment {
        RedirectAnalyzer::new().analyze(url).unwrap()
    }

    #[test]
    fn test_empty_input_prompts() {
        let err = RedirectAnalyzer::new().analyze("  ").unwrap_err();
        assert_eq!(err.to_string(), "Enter a URL first.");
    }

    #[test]
    fn test_plain_redirect_parameter() {
        let result = analyze("http://example.com/login?redirect=http://evil.com");
        assert_eq!(result.matched_params, vec!["redirect=".to_string()]);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_parameter_match_is_case_insensitive_substring() {
        let result = analyze("https://shop.example/MENU=1&GoTo=home");
        // "menu=" contains "u=", and "goto=" also contains "to="
        assert_eq!(
            result.matched_params,
            vec!["u=".to_string(), "goto=".to_string(), "to=".to_string()]
        );
    }

    #[test]
    fn test_at_sign_and_deceptive_authority() {
        let result = analyze("https://paypal.com-secure.login@203.0.113.9/verify");
        assert!(result.warnings.iter().any(|w| w.contains("'@' symbol")));
        assert!(result.warnings.iter().any(|w| w.contains("raw IP")));
        assert!(result.warnings.iter().any(|w| w.contains("deceptive")));
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn test_raw_ip_boundaries_are_ascii() {
        let result = analyze("http://\u{0661}10.0.0.1/login");
        assert!(result.warnings.iter().any(|w| w.contains("raw IP")));

        let result = analyze("https://v2.10.20.30.cdn.example/");
        assert!(!result.warnings.iter().any(|w| w.contains("raw IP")));
    }

    #[test]
    fn test_encoded_slashes() {
        let result = analyze("https://example.com/?out=https%3A%2f%2Fevil.test%5C&u=1");
        assert!(result.warnings[0].starts_with("Encoded slashes"));
        assert_eq!(
            result.matched_params,
            vec!["u=".to_string(), "out=".to_string()]
        );
    }

    #[test]
    fn test_long_url_threshold() {
        let long = format!("https://example.com/{}", "a".repeat(140));
        let result = analyze(&long);
        assert_eq!(
            result.warnings,
            vec!["URL is quite long: can be a sign of tracking or obfuscation.".to_string()]
        );

        let exactly = format!("https://example.com/{}", "a".repeat(130));
        assert_eq!(exactly.len(), 150);
        assert!(analyze(&exactly).warnings.is_empty());
    }

    #[test]
    fn test_configured_parameters() {
        let config = RedirectConfig {
            suspicious_params: vec!["continue=".to_string()],
            max_url_length: 10,
        };
        let analyzer = RedirectAnalyzer::from_config(&config);
        let result = analyzer.analyze("https://a.io/?Continue=x").unwrap();
        assert_eq!(result.matched_params, vec!["continue=".to_string()]);
        assert_eq!(result.warnings.len(), 1);
    }
}
