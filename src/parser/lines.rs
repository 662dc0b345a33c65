use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::records::Lead;

static NON_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9+]").unwrap());
static WORD_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w").unwrap());

/// Cleaned numbers of this length or shorter are treated as noise.
const MIN_MOBILE_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Company or domain marker, e.g. `ethicsgroup.in`.
    Header(&'a str),
    Lead(&'a str),
    /// Non-empty line that is neither, e.g. `Batch 2`.
    Ignored(&'a str),
}

/// Trim every line, drop the empty ones and classify the rest.
pub fn classify_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(classify)
        .collect()
}

pub fn classify(line: &str) -> Line<'_> {
    if line.contains('@') {
        Line::Lead(line)
    } else if line.contains('.') {
        Line::Header(line)
    } else {
        Line::Ignored(line)
    }
}

// ── Lead extraction ──

/// Raw, un-normalized slices of a lead line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub email: &'a str,
    pub mobile: &'a str,
    pub comment: &'a str,
}

pub struct SplitRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub split: for<'a> fn(&'a str) -> RawFields<'a>,
}

/// Tried in order; the first rule whose `matches` accepts the line wins.
pub const SPLIT_RULES: &[SplitRule] = &[
    SplitRule {
        name: "double_colon",
        matches: has_double_colon,
        split: split_double_colon,
    },
    SplitRule {
        name: "colon",
        matches: has_colon,
        split: split_colon,
    },
    SplitRule {
        name: "bare",
        matches: always,
        split: split_bare,
    },
];

fn has_double_colon(line: &str) -> bool {
    line.contains(": :")
}

fn has_colon(line: &str) -> bool {
    line.contains(':')
}

fn always(_: &str) -> bool {
    true
}

// Email : : Mobile : : Comment
fn split_double_colon(line: &str) -> RawFields<'_> {
    let mut parts = line.split(": :");
    RawFields {
        email: parts.next().unwrap_or(""),
        mobile: parts.next().unwrap_or(""),
        comment: parts.next().map(str::trim).unwrap_or(""),
    }
}

// Email : Mobile
fn split_colon(line: &str) -> RawFields<'_> {
    let mut parts = line.split(':');
    RawFields {
        email: parts.next().unwrap_or(""),
        mobile: parts.next().unwrap_or(""),
        comment: "",
    }
}

fn split_bare(line: &str) -> RawFields<'_> {
    RawFields {
        email: line,
        mobile: "",
        comment: "",
    }
}

/// Split a lead line with the first matching rule. Returns the rule name too.
pub fn split_fields(line: &str) -> (&'static str, RawFields<'_>) {
    SPLIT_RULES
        .iter()
        .find(|rule| (rule.matches)(line))
        .map(|rule| (rule.name, (rule.split)(line)))
        .unwrap_or(("bare", split_bare(line)))
}

/// Parse a lead line. `None` when nothing is left of the email after trimming.
pub fn extract_lead(line: &str) -> Option<Lead> {
    let (_, fields) = split_fields(line);
    let email = fields.email.trim().to_lowercase();
    if email.is_empty() {
        return None;
    }

    Some(Lead {
        mobile: clean_mobile(fields.mobile),
        contact_person: contact_person(&email),
        original_line: line.to_string(),
        line_comment: fields.comment.to_string(),
        email,
    })
}

/// First phone number of the field with spaces, dashes and parens stripped.
///
/// `"91 87794 73221, 91 88282 51345"` becomes `"918779473221"`; spreadsheet
/// noise such as `#ERROR!` and numbers of five chars or less become empty.
pub fn clean_mobile(field: &str) -> String {
    if field.is_empty() || field.to_lowercase().contains("error") {
        return String::new();
    }
    let first = field.split([',', '/']).next().unwrap_or("").trim();
    let cleaned = NON_PHONE_RE.replace_all(first, "");
    if cleaned.len() > MIN_MOBILE_LEN {
        cleaned.into_owned()
    } else {
        String::new()
    }
}

/// `john.doe@x.com` → `John Doe`. Empty when the email has no `@`.
pub fn contact_person(email: &str) -> String {
    let Some((local, _)) = email.split_once('@') else {
        return String::new();
    };
    let spaced = local.replace(['.', '_'], " ");
    WORD_START_RE
        .replace_all(&spaced, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Text after the first `@`, up to any second one.
pub fn email_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_header_lead_and_noise() {
        assert_eq!(classify("ethicsgroup.in"), Line::Header("ethicsgroup.in"));
        assert_eq!(classify("a@b.com"), Line::Lead("a@b.com"));
        assert_eq!(classify("Batch 2"), Line::Ignored("Batch 2"));
    }

    #[test]
    fn lead_wins_over_header() {
        // Contains both '.' and '@'
        assert!(matches!(classify("john.doe@x.com"), Line::Lead(_)));
    }

    #[test]
    fn classify_lines_trims_and_skips_blank() {
        let lines = classify_lines("  acme.com  \n\n   \n  a@acme.com\r\nBatch 1");
        assert_eq!(
            lines,
            vec![
                Line::Header("acme.com"),
                Line::Lead("a@acme.com"),
                Line::Ignored("Batch 1"),
            ]
        );
    }

    #[test]
    fn rule_table_order() {
        let names: Vec<_> = SPLIT_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["double_colon", "colon", "bare"]);
    }

    #[test]
    fn double_colon_rule() {
        let (rule, f) = split_fields("a@b.com: :91 98765 43210: : call after 5pm ");
        assert_eq!(rule, "double_colon");
        assert_eq!(f.email, "a@b.com");
        assert_eq!(f.mobile, "91 98765 43210");
        assert_eq!(f.comment, "call after 5pm");
    }

    #[test]
    fn double_colon_without_comment() {
        let (_, f) = split_fields("a@b.com: :12345678");
        assert_eq!(f.mobile, "12345678");
        assert_eq!(f.comment, "");
    }

    #[test]
    fn single_colon_rule_takes_second_segment() {
        let (rule, f) = split_fields("a@b.com : 9876543210 : ignored");
        assert_eq!(rule, "colon");
        assert_eq!(f.email, "a@b.com ");
        assert_eq!(f.mobile, " 9876543210 ");
        assert_eq!(f.comment, "");
    }

    #[test]
    fn bare_rule() {
        let (rule, f) = split_fields("a@b.com");
        assert_eq!(rule, "bare");
        assert_eq!(f, RawFields { email: "a@b.com", mobile: "", comment: "" });
    }

    #[test]
    fn mobile_takes_first_number() {
        assert_eq!(clean_mobile("91 87794 73221, 91 88282 51345"), "918779473221");
        assert_eq!(clean_mobile("+91-98765-43210 / 022 1234567"), "+919876543210");
        assert_eq!(clean_mobile("(022) 2345 6789"), "02223456789");
    }

    #[test]
    fn mobile_rejects_noise() {
        assert_eq!(clean_mobile("#ERROR!"), "");
        assert_eq!(clean_mobile("Error 91 98765 43210"), "");
        assert_eq!(clean_mobile("12345"), "");
        assert_eq!(clean_mobile("n/a"), "");
        assert_eq!(clean_mobile(""), "");
    }

    #[test]
    fn mobile_length_boundary() {
        assert_eq!(clean_mobile("12-34-56"), "123456");
        assert_eq!(clean_mobile("12 34 5"), "");
    }

    #[test]
    fn contact_person_title_case() {
        assert_eq!(contact_person("john.doe@ethicsgroup.in"), "John Doe");
        assert_eq!(contact_person("jane_smith@ethicsgroup.in"), "Jane Smith");
        assert_eq!(contact_person("info@acme.com"), "Info");
        assert_eq!(contact_person("no-at-sign"), "");
    }

    #[test]
    fn extract_normalizes_email() {
        let lead = extract_lead("  John.Doe@EthicsGroup.IN : : 91 98765 43210").unwrap();
        assert_eq!(lead.email, "john.doe@ethicsgroup.in");
        assert_eq!(lead.mobile, "919876543210");
        assert_eq!(lead.contact_person, "John Doe");
        assert_eq!(lead.line_comment, "");
    }

    #[test]
    fn extract_keeps_original_line() {
        let line = "a.b@c.com: :#ERROR!: :follow up";
        let lead = extract_lead(line).unwrap();
        assert_eq!(lead.original_line, line);
        assert_eq!(lead.mobile, "");
        assert_eq!(lead.line_comment, "follow up");
    }

    #[test]
    fn extract_empty_email_is_none() {
        assert!(extract_lead(" : x@y.com").is_none());
    }

    #[test]
    fn domain() {
        assert_eq!(email_domain("a@ethicsgroup.in"), Some("ethicsgroup.in"));
        assert_eq!(email_domain("a@"), None);
        assert_eq!(email_domain("plain"), None);
    }
}
