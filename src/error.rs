use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    /// Nothing to analyze; `prompt` is what the user should be told.
    #[error("{prompt}")]
    EmptyInput { prompt: &'static str },

    /// A decode attempt was handed text that is not valid in that encoding.
    /// Decoders catch this themselves; it never leaves `analyze`.
    #[error("malformed {encoding} input: {detail}")]
    MalformedEncoding {
        encoding: &'static str,
        detail: String,
    },

    #[error("Select at least one character set.")]
    NoCharacterSets,
}

impl AnalyzerError {
    pub fn malformed(encoding: &'static str, detail: impl ToString) -> Self {
        AnalyzerError::MalformedEncoding {
            encoding,
            detail: detail.to_string(),
        }
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(self, AnalyzerError::EmptyInput { .. })
    }
}

/// Trim `input` and fail with `prompt` when nothing is left.
pub fn require_input<'a>(input: &'a str, prompt: &'static str) -> Result<&'a str, AnalyzerError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(AnalyzerError::EmptyInput { prompt })
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_input_trims() {
        assert_eq!(require_input("  abc \n", "x"), Ok("abc"));
    }

    #[test]
    fn test_require_input_empty() {
        let err = require_input(" \t\n", "Paste a header first.").unwrap_err();
        assert!(err.is_empty_input());
        assert_eq!(err.to_string(), "Paste a header first.");
    }

    #[test]
    fn test_malformed_message() {
        let err = AnalyzerError::malformed("hex", "odd length");
        assert_eq!(err.to_string(), "malformed hex input: odd length");
        assert!(!err.is_empty_input());
    }
}
