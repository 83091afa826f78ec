use std::collections::HashMap;

/// Header fields keyed by lowercase name. Every occurrence of a name is
/// kept, in the order it appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFieldMap {
    fields: HashMap<String, Vec<String>>,
}

impl HeaderFieldMap {
    /// Parse raw header text. Lines starting with whitespace are folded into
    /// the previous field; lines without a colon are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                if let Some(values) = current.as_ref().and_then(|name| fields.get_mut(name)) {
                    if let Some(last) = values.last_mut() {
                        last.push(' ');
                        last.push_str(line.trim());
                    }
                    continue;
                }
            }

            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim().to_lowercase();
            fields
                .entry(name.clone())
                .or_default()
                .push(value.trim().to_string());
            current = Some(name);
        }

        Self { fields }
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All values of `name` joined with newlines, or `None` if absent.
    pub fn joined(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join("\n"))
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_folded() {
        let map = HeaderFieldMap::parse("Subject: Hello\nFROM: a@b.com");
        assert_eq!(map.get_all("subject"), &["Hello".to_string()]);
        assert_eq!(map.get_all("From"), &["a@b.com".to_string()]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_continuation_lines_fold_into_last_value() {
        let raw = "Received: from a.example.com\r\n\tby b.example.com; Mon\r\nReceived: from c\r\n  by d;";
        let map = HeaderFieldMap::parse(raw);
        assert_eq!(
            map.get_all("received"),
            &[
                "from a.example.com by b.example.com; Mon".to_string(),
                "from c by d;".to_string()
            ]
        );
    }

    #[test]
    fn test_repeated_headers_are_preserved_in_order() {
        let map = HeaderFieldMap::parse("To: one@x.com\nTo: two@x.com\nTo: three@x.com");
        assert_eq!(map.get_all("to").len(), 3);
        assert_eq!(
            map.joined("to").unwrap(),
            "one@x.com\ntwo@x.com\nthree@x.com"
        );
    }

    #[test]
    fn test_lines_without_colon_are_ignored() {
        let map = HeaderFieldMap::parse("garbage line\nSubject: ok\nmore garbage");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_all("subject"), &["ok".to_string()]);
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let map = HeaderFieldMap::parse("Date: Mon, 1 Jan 2024 10:11:12 +0000");
        assert_eq!(map.get_all("date"), &["Mon, 1 Jan 2024 10:11:12 +0000".to_string()]);
    }

    #[test]
    fn test_no_fields_recognised() {
        let map = HeaderFieldMap::parse("just some pasted text\n\n  indented too");
        assert!(map.is_empty());
        assert!(!HeaderFieldMap::parse("X: y").is_empty());
    }

    #[test]
    fn test_missing_header() {
        let map = HeaderFieldMap::parse("Subject: hi");
        assert_eq!(map.joined("from"), None);
        assert!(map.get_all("from").is_empty());
    }
}
