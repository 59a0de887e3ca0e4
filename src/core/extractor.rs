use regex::Regex;
use std::sync::LazyLock;

// local-part: 以單一句點分隔的字元串；domain: 至少兩段，標籤不可以連字號開頭或結尾
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[-A-Za-z0-9!#$%&'*+/=?^_`{|}~]+(?:\.[-A-Za-z0-9!#$%&'*+/=?^_`{|}~]+)*@(?:[A-Za-z0-9](?:[-A-Za-z0-9]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[-A-Za-z0-9]*[A-Za-z0-9])?",
    )
    .expect("email pattern is a valid regex")
});

/// Pulls the leftmost email address out of a free-form line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressExtractor;

impl AddressExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first match only; later addresses on the same line are ignored.
    pub fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        EMAIL_PATTERN.find(line).map(|m| m.as_str())
    }

    /// One address per line that has one, in input order.
    pub fn addresses<'a>(&self, input: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let extractor = *self;
        input.lines().filter_map(move |line| extractor.extract(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_plain_address() {
        let extractor = AddressExtractor::new();
        assert_eq!(
            extractor.extract("alice@example.com"),
            Some("alice@example.com")
        );
    }

    #[test]
    fn test_extracts_leftmost_of_several() {
        let extractor = AddressExtractor::new();
        assert_eq!(
            extractor.extract("Alice <alice@example.com>, bob@test.org"),
            Some("alice@example.com")
        );
    }

    #[test]
    fn test_extracts_from_delimited_row() {
        let extractor = AddressExtractor::new();
        assert_eq!(
            extractor.extract("42;John Doe;john.doe+news@mail.example.co.uk;active"),
            Some("john.doe+news@mail.example.co.uk")
        );
    }

    #[test]
    fn test_allows_special_characters_in_local_part() {
        let extractor = AddressExtractor::new();
        assert_eq!(
            extractor.extract("o'brien!x#y{z}~@sub-domain.example.org"),
            Some("o'brien!x#y{z}~@sub-domain.example.org")
        );
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_domain() {
        let extractor = AddressExtractor::new();
        assert_eq!(
            extractor.extract("mail me at carol@x.com."),
            Some("carol@x.com")
        );
    }

    #[test]
    fn test_no_match_returns_none() {
        let extractor = AddressExtractor::new();
        assert_eq!(extractor.extract(""), None);
        assert_eq!(extractor.extract("not-an-email"), None);
        assert_eq!(extractor.extract("root@localhost"), None);
        assert_eq!(extractor.extract("user@-bad.com"), None);
        assert_eq!(extractor.extract("user@bad-.com"), None);
    }

    #[test]
    fn test_addresses_skips_unmatched_lines() {
        let extractor = AddressExtractor::new();
        let input = "alice@example.com\r\nnot-an-email\n\nbob@test.org, carol@x.com\n";
        assert_eq!(
            extractor.addresses(input).collect::<Vec<_>>(),
            vec!["alice@example.com", "bob@test.org"]
        );
    }

    #[test]
    fn test_consecutive_dots_break_the_local_part() {
        let extractor = AddressExtractor::new();
        assert_eq!(extractor.extract("x..y@a.com"), Some("y@a.com"));
    }
}
