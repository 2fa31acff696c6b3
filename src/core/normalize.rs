//! Cleanup passes applied to CSV rows before they are compared with the directory.

use crate::config::SyncSettings;
use crate::domain::model::{GroupDescriptions, RawEntry, SourceRecord};
use unicode_normalization::UnicodeNormalization;

const UMLAUTS: [(char, &str); 6] = [
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-')
}

/// Turns a human group label into a directory-safe token.
///
/// Whitespace runs become `_`, German umlauts are transliterated, remaining
/// diacritics are stripped and anything outside `[A-Za-z0-9_/-]` is dropped.
/// Applying it to its own output is a no-op.
pub fn normalize_group_token(label: &str) -> String {
    let joined = label.split_whitespace().collect::<Vec<_>>().join("_");

    let mut transliterated = String::with_capacity(joined.len());
    for c in joined.chars() {
        match UMLAUTS.iter().find(|(umlaut, _)| *umlaut == c) {
            Some((_, replacement)) => transliterated.push_str(replacement),
            None => transliterated.push(c),
        }
    }

    transliterated
        .nfkd()
        .filter(char::is_ascii)
        .filter(|c| is_token_char(*c))
        .collect()
}

/// Splits a multi-group field into `(token, label)` pairs, dropping pieces
/// that normalize to nothing. Tokens keep first-seen order without repeats.
pub fn split_groups(field: &str, separator: char) -> Vec<(String, String)> {
    let mut groups: Vec<(String, String)> = Vec::new();
    for piece in field.split(separator) {
        let label = piece.trim();
        let token = normalize_group_token(label);
        if token.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(existing, _)| *existing == token) {
            Some(entry) => entry.1 = label.to_string(),
            None => groups.push((token, label.to_string())),
        }
    }
    groups
}

/// Keeps only the first of several separated addresses.
pub fn first_email(value: &str, separator: char) -> &str {
    value.split(separator).next().unwrap_or("")
}

/// A lone `0` is the export's way of saying "no value".
pub fn strip_placeholder_zero(value: &str) -> &str {
    if value.trim() == "0" {
        ""
    } else {
        value
    }
}

pub struct Normalizer<'a> {
    settings: &'a SyncSettings,
}

impl<'a> Normalizer<'a> {
    pub fn new(settings: &'a SyncSettings) -> Self {
        Self { settings }
    }

    /// Runs the email, placeholder and group passes and collects the labels of
    /// every group token seen. A token seen with several labels keeps the last.
    pub fn normalize(&self, entries: Vec<RawEntry>) -> (Vec<SourceRecord>, GroupDescriptions) {
        let mut descriptions = GroupDescriptions::default();

        let records = entries
            .into_iter()
            .map(|entry| {
                let groups = split_groups(&entry.groups, self.settings.group_separator);
                for (token, label) in &groups {
                    descriptions.record(token, label);
                }

                let email = first_email(&entry.email, self.settings.email_separator);

                SourceRecord {
                    login: entry.login.trim().to_string(),
                    first_name: entry.first_name,
                    last_name: entry.last_name,
                    email: strip_placeholder_zero(email).to_string(),
                    phone: strip_placeholder_zero(&entry.phone).to_string(),
                    mobile: strip_placeholder_zero(&entry.mobile).to_string(),
                    groups: groups.into_iter().map(|(token, _)| token).collect(),
                }
            })
            .collect();

        (records, descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_group_token() {
        assert_eq!(normalize_group_token("Sales"), "Sales");
        assert_eq!(normalize_group_token("  Field   Service  "), "Field_Service");
        assert_eq!(normalize_group_token("Geschäftsführung"), "Geschaeftsfuehrung");
        assert_eq!(normalize_group_token("Übersetzer"), "Uebersetzer");
        assert_eq!(normalize_group_token("Café Crème"), "Cafe_Creme");
        assert_eq!(normalize_group_token("R&D (intern)"), "RD_intern");
        assert_eq!(normalize_group_token("IT-Support"), "IT-Support");
        assert_eq!(normalize_group_token("日本"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for label in ["Geschäftsführung", "Café Crème", "R&D (intern)", "a\tb  c", "ß-Team"] {
            let once = normalize_group_token(label);
            assert_eq!(normalize_group_token(&once), once, "label {:?}", label);
        }
    }

    #[test]
    fn test_tokens_only_use_allowed_characters() {
        for label in ["Ærø Øst", "x!y@z#", "  ", "Œuvre—Team", "Ñandú/Ça"] {
            for (token, _) in split_groups(label, '/') {
                assert!(!token.is_empty());
                assert!(token.chars().all(is_token_char), "token {:?}", token);
            }
        }
    }

    #[test]
    fn test_split_groups() {
        let groups = split_groups("/Sales / Marketing Team/", '/');
        assert_eq!(
            groups,
            vec![
                ("Sales".to_string(), "Sales".to_string()),
                ("Marketing_Team".to_string(), "Marketing Team".to_string()),
            ]
        );
        assert!(split_groups("", '/').is_empty());
        assert!(split_groups(" / ", '/').is_empty());
    }

    #[test]
    fn test_split_groups_merges_duplicate_tokens() {
        let groups = split_groups("Sales Team/Sales_Team", '/');
        assert_eq!(
            groups,
            vec![("Sales_Team".to_string(), "Sales_Team".to_string())]
        );
    }

    #[test]
    fn test_first_email() {
        assert_eq!(first_email("a@x.com;b@x.com", ';'), "a@x.com");
        assert_eq!(first_email("a@x.com", ';'), "a@x.com");
        assert_eq!(first_email("", ';'), "");
    }

    #[test]
    fn test_strip_placeholder_zero() {
        assert_eq!(strip_placeholder_zero("0"), "");
        assert_eq!(strip_placeholder_zero(" 0 "), "");
        assert_eq!(strip_placeholder_zero("00"), "00");
        assert_eq!(strip_placeholder_zero("0151 123"), "0151 123");
    }

    #[test]
    fn test_normalizer_collects_descriptions() {
        let settings = SyncSettings::default();
        let entries = vec![
            RawEntry {
                login: "jdoe".to_string(),
                email: "a@x.com;b@x.com".to_string(),
                phone: "0".to_string(),
                groups: "Sales/Marketing".to_string(),
                ..RawEntry::default()
            },
            RawEntry {
                login: "mmuster".to_string(),
                mobile: "0".to_string(),
                groups: "Geschäftsführung".to_string(),
                ..RawEntry::default()
            },
        ];

        let (records, descriptions) = Normalizer::new(&settings).normalize(entries);

        assert_eq!(records[0].email, "a@x.com");
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].groups, vec!["Sales", "Marketing"]);
        assert_eq!(records[1].mobile, "");
        assert_eq!(records[1].groups, vec!["Geschaeftsfuehrung"]);
        assert_eq!(
            descriptions.label("Geschaeftsfuehrung"),
            Some("Geschäftsführung")
        );
        assert_eq!(descriptions.label("Sales"), Some("Sales"));
        assert_eq!(descriptions.label("Marketing"), Some("Marketing"));
    }

    #[test]
    fn test_later_label_overwrites_description() {
        let settings = SyncSettings::default();
        let entries = vec![
            RawEntry {
                login: "a".to_string(),
                groups: "Sales Team".to_string(),
                ..RawEntry::default()
            },
            RawEntry {
                login: "b".to_string(),
                groups: "Sales  Team".to_string(),
                ..RawEntry::default()
            },
        ];

        let (_, descriptions) = Normalizer::new(&settings).normalize(entries);
        assert_eq!(descriptions.label("Sales_Team"), Some("Sales  Team"));
    }
}
