pub mod batch;
pub mod group;
pub mod lines;

use crate::records::CompositeRecord;
use batch::CommentPolicy;
use group::ParseStats;

pub struct ParsedBatch {
    pub records: Vec<CompositeRecord>,
    pub companies: usize,
    pub stats: ParseStats,
}

/// Two-pass pipeline: text → classified lines → company groups → composite records.
pub fn parse_leads(text: &str, policy: &CommentPolicy) -> ParsedBatch {
    let lines = lines::classify_lines(text);
    let (groups, stats) = group::group_leads(&lines);
    let records = batch::batch_groups(&groups, policy);
    ParsedBatch {
        records,
        companies: groups.len(),
        stats,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.txt", name)).unwrap()
    }

    #[test]
    fn ethicsgroup_example() {
        let batch = parse_leads(&fixture("ethicsgroup"), &CommentPolicy::None);
        assert_eq!(batch.companies, 1);
        assert_eq!(batch.records.len(), 1);
        let r = &batch.records[0];
        assert_eq!(r.company, "ethicsgroup.in");
        assert_eq!(r.email, "john.doe@ethicsgroup.in, jane_smith@ethicsgroup.in");
        assert_eq!(r.mobile, "919876543210");
        assert_eq!(r.contact_person, "John Doe");
        assert_eq!(
            r.requirements,
            "john.doe@ethicsgroup.in : 919876543210\njane_smith@ethicsgroup.in : "
        );
    }

    #[test]
    fn mixed_fixture() {
        let batch = parse_leads(&fixture("mixed"), &CommentPolicy::CompanyLead);
        let companies: Vec<_> = batch.records.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(
            companies,
            ["globex.com", "initech.co.in", "initech.co.in", "umbrella.org"]
        );
        assert_eq!(batch.records[1].lead_count, 5);
        assert_eq!(batch.records[2].lead_count, 2);
        assert_eq!(batch.stats.duplicates, 2);
        assert_eq!(batch.stats.ignored, 2);

        let umbrella = &batch.records[3];
        assert_eq!(umbrella.mobile, "");
        assert_eq!(
            umbrella.comment,
            "Lead provided by company.\n\n[alice@umbrella.org]: prefers email"
        );
        assert!(batch
            .records
            .iter()
            .all(|r| r.comment.starts_with("Lead provided by company.")));
    }

    #[test]
    fn lead_count_follows_parsed_leads_not_commas() {
        let batch = parse_leads("x.com\na@x.com, b@x.com\nc@x.com", &CommentPolicy::None);
        assert_eq!(batch.stats.leads, 2);
        let r = &batch.records[0];
        assert_eq!(r.email, "a@x.com, b@x.com, c@x.com");
        assert_eq!(r.lead_count, 2);
    }

    #[test]
    fn empty_input() {
        let batch = parse_leads("\n  \n", &CommentPolicy::None);
        assert!(batch.records.is_empty());
        assert_eq!(batch.stats, ParseStats::default());
    }

    #[test]
    fn reparse_with_duplicates_matches_clean_input() {
        let clean = parse_leads("a.com\nx@a.com\ny@a.com: :9876543210", &CommentPolicy::None);
        let dup = parse_leads(
            "a.com\nx@a.com\ny@a.com: :9876543210\nX@a.com\ny@a.com: :9876543210",
            &CommentPolicy::None,
        );
        assert_eq!(clean.records, dup.records);
    }
}
