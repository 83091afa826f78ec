use super::Analyzer;
use crate::config::ObfuscationConfig;
use crate::error::{require_input, AnalyzerError};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Base64 as browsers accept it: padding optional, stray trailing bits ignored.
const FORGIVING_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

lazy_static! {
    static ref BASE64_CHARSET: Regex = Regex::new(r"^[A-Za-z0-9+/=]+$").unwrap();
    static ref HEX_CHARSET: Regex = Regex::new(r"^[0-9a-fA-F]+$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref WARNING_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (
            Regex::new(r"(?i)eval\(").unwrap(),
            "⚠ eval() detected (frequently used in obfuscated scripts).",
        ),
        (
            Regex::new(r"(?i)Function\(").unwrap(),
            "⚠ Function() constructor detected.",
        ),
        (
            Regex::new(r"(?i)atob\(").unwrap(),
            "⚠ atob() usage: may be decoding hidden payloads.",
        ),
        (
            Regex::new(r"(?i)unescape\(").unwrap(),
            "⚠ unescape() usage: suspicious legacy API.",
        ),
        (
            Regex::new(r"\\x[0-9A-Fa-f]{2}").unwrap(),
            "⚠ hex escape sequences (\\xNN) present.",
        ),
        (
            Regex::new(r"\\u[0-9A-Fa-f]{4}").unwrap(),
            "⚠ unicode escape sequences (\\uNNNN) present.",
        ),
        (
            Regex::new(r"(?i)while\s*\(\s*true\s*\)").unwrap(),
            "⚠ infinite loop pattern detected.",
        ),
        (
            Regex::new(r"(?i)document\.write").unwrap(),
            "⚠ document.write() usage can be abused in injected scripts.",
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecodeLayer {
    Base64,
    Hex,
    Url,
}

impl DecodeLayer {
    pub fn label(&self) -> &'static str {
        match self {
            DecodeLayer::Base64 => "Base64 decoded",
            DecodeLayer::Hex => "Hex decoded",
            DecodeLayer::Url => "URL decoded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObfuscationReport {
    pub detected_layers: Vec<DecodeLayer>,
    pub final_output: String,
    pub warnings: Vec<String>,
}

/// A decoded payload. `len` is what the acceptance threshold is measured
/// against (bytes for binary decodes, chars for URL decoding).
struct Decoded {
    text: String,
    len: usize,
}

/// Render decoded bytes for display: UTF-8 when valid, one char per byte
/// otherwise.
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

fn decode_base64(input: &str) -> Result<Decoded, AnalyzerError> {
    let cleaned = WHITESPACE.replace_all(input, "");
    if !BASE64_CHARSET.is_match(&cleaned) {
        return Err(AnalyzerError::malformed("base64", "characters outside the base64 alphabet"));
    }
    let bytes = FORGIVING_BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| AnalyzerError::malformed("base64", e))?;
    Ok(Decoded {
        len: bytes.len(),
        text: bytes_to_text(bytes),
    })
}

fn decode_hex(input: &str) -> Result<Decoded, AnalyzerError> {
    let without_markers = input.replace("\\x", "");
    let cleaned = WHITESPACE.replace_all(&without_markers, "");
    if !HEX_CHARSET.is_match(&cleaned) {
        return Err(AnalyzerError::malformed("hex", "non-hex characters"));
    }
    let bytes = hex::decode(cleaned.as_bytes()).map_err(|e| AnalyzerError::malformed("hex", e))?;
    Ok(Decoded {
        len: bytes.len(),
        text: bytes_to_text(bytes),
    })
}

fn decode_url(input: &str) -> Result<Decoded, AnalyzerError> {
    // every escape must be a full %XX pair
    let bytes = input.as_bytes();
    for (i, _) in input.match_indices('%') {
        let pair = bytes.get(i + 1..i + 3);
        if !pair.is_some_and(|p| p.iter().all(u8::is_ascii_hexdigit)) {
            return Err(AnalyzerError::malformed("url", format!("incomplete escape at offset {}", i)));
        }
    }
    let text = urlencoding::decode(input)
        .map_err(|e| AnalyzerError::malformed("url", e))?
        .into_owned();
    if text == input {
        return Err(AnalyzerError::malformed("url", "nothing to decode"));
    }
    Ok(Decoded {
        len: text.chars().count(),
        text,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ObfuscationHunter {
    config: ObfuscationConfig,
}

impl ObfuscationHunter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ObfuscationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn scan_patterns(&self, snippet: &str) -> Vec<String> {
        WARNING_PATTERNS
            .iter()
            .filter(|(pattern, _)| pattern.is_match(snippet))
            .map(|(_, warning)| warning.to_string())
            .collect()
    }
}

impl Analyzer for ObfuscationHunter {
    type Report = ObfuscationReport;

    /// Each decoder sees the original snippet, not a previous decoder's
    /// output. The last decoder that succeeds supplies `final_output`.
    fn analyze(&self, input: &str) -> Result<ObfuscationReport, AnalyzerError> {
        let snippet = require_input(input, "Paste something to analyze.")?;
        let warnings = self.scan_patterns(snippet);

        let decoders: [(DecodeLayer, fn(&str) -> Result<Decoded, AnalyzerError>); 3] = [
            (DecodeLayer::Base64, decode_base64),
            (DecodeLayer::Hex, decode_hex),
            (DecodeLayer::Url, decode_url),
        ];

        let mut detected_layers = Vec::new();
        let mut final_output = snippet.to_string();

        for (layer, decode) in decoders {
            match decode(snippet) {
                Ok(decoded) if decoded.len > self.config.min_decoded_len => {
                    log::debug!("{} produced {} units", layer.label(), decoded.len);
                    detected_layers.push(layer);
                    final_output = decoded.text;
                }
                Ok(decoded) => {
                    log::debug!("{} too short ({} units), ignored", layer.label(), decoded.len);
                }
                Err(e) => log::debug!("{} not applicable: {}", layer.label(), e),
            }
        }

        Ok(ObfuscationReport {
            detected_layers,
            final_output,
            warnings,
        })
    }

    fn name(&self) -> &str {
        "Obfuscation Hunter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunt(input: &str) -> ObfuscationReport {
        ObfuscationHunter::new().analyze(input).unwrap()
    }

    #[test]
    fn test_empty_input_prompts() {
        let err = ObfuscationHunter::new().analyze("\n\t ").unwrap_err();
        assert!(err.is_empty_input());
        assert_eq!(err.to_string(), "Paste something to analyze.");
    }

    #[test]
    fn test_eval_atob_is_not_decoded_as_a_whole() {
        let report = hunt("eval(atob('aGVsbG8='))");
        assert_eq!(
            report.warnings,
            vec![
                "⚠ eval() detected (frequently used in obfuscated scripts).".to_string(),
                "⚠ atob() usage: may be decoding hidden payloads.".to_string(),
            ]
        );
        assert!(report.detected_layers.is_empty());
        assert_eq!(report.final_output, "eval(atob('aGVsbG8='))");
    }

    #[test]
    fn test_all_patterns_fire_in_order() {
        let snippet = r#"EVAL(x); new Function(y); atob(z); unescape(w); "\x41B\u0041"; while ( true ) {} document.write(q)"#;
        let warnings = hunt(snippet).warnings;
        assert_eq!(warnings.len(), 8);
        assert!(warnings[0].contains("eval()"));
        assert!(warnings[4].contains("\\xNN"));
        assert!(warnings[5].contains("\\uNNNN"));
        assert!(warnings[6].contains("infinite loop"));
        assert!(warnings[7].contains("document.write()"));
    }

    #[test]
    fn test_base64_layer() {
        let report = hunt("aGVsbG8gd29ybGQ=");
        assert_eq!(report.detected_layers, vec![DecodeLayer::Base64]);
        assert_eq!(report.final_output, "hello world");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_base64_with_whitespace_and_missing_padding() {
        let report = hunt("aGVsbG8g\n d29ybGQ");
        assert_eq!(report.detected_layers, vec![DecodeLayer::Base64]);
        assert_eq!(report.final_output, "hello world");
    }

    #[test]
    fn test_short_base64_is_ignored() {
        // "hi" decodes to two bytes, under the threshold
        let report = hunt("aGk=");
        assert!(report.detected_layers.is_empty());
        assert_eq!(report.final_output, "aGk=");
    }

    #[test]
    fn test_hex_escapes_decode() {
        let report = hunt(r"\x61\x6c\x65\x72\x74\x28\x31\x29");
        assert_eq!(report.detected_layers, vec![DecodeLayer::Hex]);
        assert_eq!(report.final_output, "alert(1)");
        assert!(report.warnings[0].contains("\\xNN"));
    }

    #[test]
    fn test_last_successful_decode_wins() {
        // pure hex digits are valid base64 and valid hex at once
        let report = hunt("48656c6c6f21");
        assert_eq!(report.detected_layers, vec![DecodeLayer::Base64, DecodeLayer::Hex]);
        assert_eq!(report.final_output, "Hello!");
    }

    #[test]
    fn test_url_decoding() {
        let report = hunt("%3Cscript%3Ealert(1)%3C%2Fscript%3E");
        assert_eq!(report.detected_layers, vec![DecodeLayer::Url]);
        assert_eq!(report.final_output, "<script>alert(1)</script>");
    }

    #[test]
    fn test_malformed_url_escape_is_not_a_layer() {
        let report = hunt("100% sure %zz");
        assert!(report.detected_layers.is_empty());
        assert_eq!(report.final_output, "100% sure %zz");
        assert!(decode_url("abc%4").is_err());
        assert!(decode_url("%ff%fe").is_err());
    }

    #[test]
    fn test_odd_length_hex_is_rejected() {
        assert!(matches!(
            decode_hex("abc"),
            Err(AnalyzerError::MalformedEncoding { encoding: "hex", .. })
        ));
    }

    #[test]
    fn test_non_utf8_bytes_render_per_byte() {
        let decoded = decode_hex("ff41").unwrap();
        assert_eq!(decoded.len, 2);
        assert_eq!(decoded.text, "\u{ff}A");
    }

    #[test]
    fn test_custom_threshold() {
        let hunter = ObfuscationHunter::from_config(&ObfuscationConfig { min_decoded_len: 1 });
        let report = hunter.analyze("aGk=").unwrap();
        assert_eq!(report.detected_layers, vec![DecodeLayer::Base64]);
        assert_eq!(report.final_output, "hi");
    }
}
