use std::fmt;
use std::str::FromStr;

use crate::records::{CompanyGroup, CompositeRecord, Lead};

/// Leads per submitted record: one main lead plus four extras.
pub const CHUNK_SIZE: usize = 5;

const COLD_CALL: &str = "Cold call";
const COMPANY_LEAD: &str = "Lead provided by company.";

/// Comment applied to every record of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommentPolicy {
    #[default]
    None,
    ColdCall,
    CompanyLead,
    Custom(String),
}

impl CommentPolicy {
    pub fn text(&self) -> &str {
        match self {
            CommentPolicy::None => "",
            CommentPolicy::ColdCall => COLD_CALL,
            CommentPolicy::CompanyLead => COMPANY_LEAD,
            CommentPolicy::Custom(text) => text,
        }
    }
}

impl FromStr for CommentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(text) = s.strip_prefix("custom:") {
            return Ok(CommentPolicy::Custom(text.trim().to_string()));
        }
        match s {
            "" | "none" => Ok(CommentPolicy::None),
            "cold_call" => Ok(CommentPolicy::ColdCall),
            "company_lead" => Ok(CommentPolicy::CompanyLead),
            other => Err(format!(
                "unknown comment '{}' (expected none, cold_call, company_lead or custom:<text>)",
                other
            )),
        }
    }
}

impl fmt::Display for CommentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentPolicy::None => write!(f, "none"),
            CommentPolicy::ColdCall => write!(f, "cold_call"),
            CommentPolicy::CompanyLead => write!(f, "company_lead"),
            CommentPolicy::Custom(text) => write!(f, "custom:{}", text),
        }
    }
}

/// Split every bucket into chunks of [`CHUNK_SIZE`] and fold each chunk into a record.
pub fn batch_groups(groups: &[CompanyGroup], policy: &CommentPolicy) -> Vec<CompositeRecord> {
    groups
        .iter()
        .flat_map(|group| {
            group
                .leads
                .chunks(CHUNK_SIZE)
                .map(|chunk| fold_chunk(&group.company, chunk, policy.text()))
        })
        .collect()
}

fn fold_chunk(company: &str, chunk: &[Lead], global_comment: &str) -> CompositeRecord {
    let email = chunk
        .iter()
        .map(|l| l.email.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mobile = chunk
        .iter()
        .find(|l| !l.mobile.is_empty())
        .map(|l| l.mobile.clone())
        .unwrap_or_default();

    let contact_person = chunk
        .first()
        .map(|l| l.contact_person.clone())
        .unwrap_or_default();

    let requirements = chunk
        .iter()
        .map(|l| format!("{} : {}", l.email, l.mobile))
        .collect::<Vec<_>>()
        .join("\n");

    CompositeRecord {
        company: company.to_string(),
        email,
        mobile,
        contact_person,
        requirements,
        comment: build_comment(chunk, global_comment),
        lead_count: chunk.len(),
    }
}

fn build_comment(chunk: &[Lead], global_comment: &str) -> String {
    let line_comments = chunk
        .iter()
        .filter(|l| !l.line_comment.is_empty())
        .map(|l| format!("[{}]: {}", l.email, l.line_comment))
        .collect::<Vec<_>>()
        .join("\n");

    let mut comment = global_comment.to_string();
    if !line_comments.is_empty() {
        if !comment.is_empty() {
            comment.push_str("\n\n");
        }
        comment.push_str(&line_comments);
    }
    comment
}
