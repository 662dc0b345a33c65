use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use super::lines::{email_domain, extract_lead, Line};
use crate::records::{CompanyGroup, Lead};

/// Per-run counters for what the parser kept and what it skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines: usize,
    pub headers: usize,
    pub lead_lines: usize,
    pub leads: usize,
    pub duplicates: usize,
    pub ignored: usize,
    /// Lead lines with no header above them and no usable email domain.
    pub unassigned: usize,
    /// Lead lines whose email field is blank, e.g. `: :98765 43210`.
    pub empty_email: usize,
}

/// Fold state threaded through one pass over the classified lines.
#[derive(Default)]
struct GroupState {
    current_company: Option<String>,
    seen: HashSet<String>,
    index: HashMap<String, usize>,
    groups: Vec<CompanyGroup>,
    stats: ParseStats,
}

impl GroupState {
    fn step(mut self, line: &Line<'_>) -> Self {
        self.stats.lines += 1;
        match *line {
            Line::Header(company) => {
                self.stats.headers += 1;
                self.current_company = Some(company.to_string());
            }
            Line::Lead(raw) => {
                self.stats.lead_lines += 1;
                match extract_lead(raw) {
                    Some(lead) => self.accept(lead),
                    None => {
                        debug!("No email in lead line: {}", raw);
                        self.stats.empty_email += 1;
                    }
                }
            }
            Line::Ignored(_) => self.stats.ignored += 1,
        }
        self
    }

    fn accept(&mut self, lead: Lead) {
        // Dedup first so a repeat never touches bucket assignment.
        if !self.seen.insert(lead.email.clone()) {
            info!("Duplicate skipped: {}", lead.email);
            self.stats.duplicates += 1;
            return;
        }

        let company = match &self.current_company {
            Some(c) => c.clone(),
            None => match email_domain(&lead.email) {
                Some(domain) => domain.to_string(),
                None => {
                    debug!("No company for lead line: {}", lead.original_line);
                    self.stats.unassigned += 1;
                    return;
                }
            },
        };

        self.stats.leads += 1;
        let slot = match self.index.get(&company) {
            Some(&i) => i,
            None => {
                self.groups.push(CompanyGroup {
                    company: company.clone(),
                    leads: Vec::new(),
                });
                self.index.insert(company, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].leads.push(lead);
    }
}

/// Dedup and bucket leads by the latest header, or by email domain before any header.
///
/// Buckets come back in order of first use; leads keep input order inside each.
pub fn group_leads(lines: &[Line<'_>]) -> (Vec<CompanyGroup>, ParseStats) {
    let state = lines
        .iter()
        .fold(GroupState::default(), |state, line| state.step(line));
    (state.groups, state.stats)
}
