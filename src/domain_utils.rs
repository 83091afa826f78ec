use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ANGLE_ADDRESS: Regex = Regex::new(r"<([^>]+)>").unwrap();
}

/// Minimal address and domain helpers for header values
pub struct DomainUtils;

impl DomainUtils {
    /// Pull the mailbox out of a header value such as `"Name" <user@host>`.
    /// Falls back to the whole value when there is no angle-bracket part.
    pub fn extract_address(header_value: &str) -> Option<String> {
        let candidate = ANGLE_ADDRESS
            .captures(header_value)
            .and_then(|caps| caps.get(1))
            .map_or(header_value, |m| m.as_str());

        let address: String = candidate
            .trim()
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();

        if address.is_empty() {
            None
        } else {
            Some(address)
        }
    }

    /// Extract domain from email address
    pub fn extract_domain(email: &str) -> Option<String> {
        email
            .split('@')
            .nth(1)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            DomainUtils::extract_domain("user@Example.COM"),
            Some("example.com".to_string())
        );
        assert_eq!(DomainUtils::extract_domain("invalid"), None);
        assert_eq!(DomainUtils::extract_domain("user@"), None);
    }

    #[test]
    fn test_extract_address_angle_brackets() {
        assert_eq!(
            DomainUtils::extract_address(r#""PayPal Support" <alerts@paypa1.com>"#),
            Some("alerts@paypa1.com".to_string())
        );
        assert_eq!(
            DomainUtils::extract_address("<bounce@mailer.example.net>"),
            Some("bounce@mailer.example.net".to_string())
        );
    }

    #[test]
    fn test_extract_address_bare_value() {
        assert_eq!(
            DomainUtils::extract_address(" 'someone@example.org' "),
            Some("someone@example.org".to_string())
        );
        assert_eq!(DomainUtils::extract_address("  "), None);
    }
}
