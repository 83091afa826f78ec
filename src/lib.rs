pub mod analyzers;
pub mod config;
pub mod domain_utils;
pub mod error;
pub mod headers;
pub mod report;

pub use analyzers::{
    Analyzer, HeaderRiskAnalyzer, ObfuscationHunter, PasswordGenerator, PasswordStrengthEstimator,
    RedirectAnalyzer,
};
pub use config::Config;
pub use error::AnalyzerError;
pub use headers::HeaderFieldMap;
