use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub email_header: HeaderScoring,
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Weights and thresholds for the header risk rules. Positive values raise
/// the risk score, negative values lower it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderScoring {
    pub auth_failure_penalty: f64,
    pub auth_pass_credit: f64,
    pub domain_mismatch_penalty: f64,
    pub spam_very_high_threshold: f64,
    pub spam_very_high_penalty: f64,
    pub spam_elevated_threshold: f64,
    pub spam_elevated_penalty: f64,
    pub spam_low_credit: f64,
    pub missing_auth_penalty: f64,
    pub high_risk_threshold: f64,
    pub moderate_risk_threshold: f64,
}

impl Default for HeaderScoring {
    fn default() -> Self {
        Self {
            auth_failure_penalty: 2.0,
            auth_pass_credit: -0.5,
            domain_mismatch_penalty: 2.0,
            spam_very_high_threshold: 10.0,
            spam_very_high_penalty: 3.0,
            spam_elevated_threshold: 5.0,
            spam_elevated_penalty: 2.0,
            spam_low_credit: -1.0,
            missing_auth_penalty: 1.5,
            high_risk_threshold: 8.0,
            moderate_risk_threshold: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObfuscationConfig {
    /// A decode only counts when it yields more than this many bytes.
    pub min_decoded_len: usize,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self { min_decoded_len: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub guesses_per_second: f64,
    pub common_passwords: Vec<String>,
    pub keyboard_patterns: Vec<String>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            guesses_per_second: 1e10,
            common_passwords: to_strings(&[
                "password",
                "123456",
                "123456789",
                "qwerty",
                "letmein",
                "admin",
                "welcome",
                "iloveyou",
                "monkey",
                "dragon",
                "111111",
                "123123",
                "abc123",
                "qwerty123",
                "password1",
            ]),
            keyboard_patterns: to_strings(&["qwerty", "asdf", "zxcv", "1234", "12345", "qaz", "wsx"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub suspicious_params: Vec<String>,
    pub max_url_length: usize,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            suspicious_params: to_strings(&[
                "redirect=",
                "redir=",
                "next=",
                "forward=",
                "url=",
                "target=",
                "dest=",
                "u=",
                "link=",
                "goto=",
                "out=",
                "r=",
                "to=",
                "callback=",
            ]),
            max_url_length: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub default_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { default_length: 16 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.password.guesses_per_second > 0.0) {
            anyhow::bail!(
                "password.guesses_per_second must be positive, got {}",
                self.password.guesses_per_second
            );
        }
        let scoring = &self.email_header;
        if scoring.moderate_risk_threshold > scoring.high_risk_threshold {
            anyhow::bail!(
                "email_header.moderate_risk_threshold ({}) exceeds high_risk_threshold ({})",
                scoring.moderate_risk_threshold,
                scoring.high_risk_threshold
            );
        }
        if scoring.spam_elevated_threshold > scoring.spam_very_high_threshold {
            anyhow::bail!(
                "email_header.spam_elevated_threshold ({}) exceeds spam_very_high_threshold ({})",
                scoring.spam_elevated_threshold,
                scoring.spam_very_high_threshold
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.email_header, config.email_header);
        assert_eq!(parsed.password, config.password);
        assert_eq!(parsed.redirect, config.redirect);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
password:
  guesses_per_second: 1000.0
redirect:
  max_url_length: 80
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.password.guesses_per_second, 1000.0);
        assert_eq!(config.password.common_passwords.len(), 15);
        assert_eq!(config.redirect.max_url_length, 80);
        assert_eq!(config.redirect.suspicious_params.len(), 14);
        assert_eq!(config.email_header, HeaderScoring::default());
        assert_eq!(config.obfuscation.min_decoded_len, 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.password.guesses_per_second = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.email_header.moderate_risk_threshold = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("sudosoc-tools-{}.yaml", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let mut config = Config::default();
        config.generator.default_length = 24;
        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.generator.default_length, 24);
    }
}
