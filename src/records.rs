use serde::Serialize;

// ── Parsing ──

/// One contact parsed from a lead line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub email: String,
    pub mobile: String,
    pub contact_person: String,
    pub original_line: String,
    pub line_comment: String,
}

/// Leads filed under one company key, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyGroup {
    pub company: String,
    pub leads: Vec<Lead>,
}

// ── Submission ──

/// A chunk of up to five leads folded into the shape the lead form accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeRecord {
    pub company: String,
    pub email: String,
    pub mobile: String,
    pub contact_person: String,
    pub requirements: String,
    pub comment: String,
    /// Leads folded into this record, 1 to 5.
    #[serde(skip)]
    pub lead_count: usize,
}
