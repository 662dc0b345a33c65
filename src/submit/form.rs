use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::multipart::Form;
use thiserror::Error;
use tracing::debug;

use crate::records::CompositeRecord;

pub const DEFAULT_BASE_URL: &str = "https://employer.tigihr.com/admin";
const SUBMIT_PATH: &str = "/bde/insert_industry";
/// What the form handler prints when it stored the lead.
const SUCCESS_MARKER: &str = "TRUE";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server response ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, record: &CompositeRecord, industry: &str) -> Result<(), SubmitError>;
}

/// Values the form page itself has selected; used when no global value is given.
#[derive(Debug, Clone, Default)]
pub struct PageSelection {
    pub industry: Option<String>,
    pub location: Option<String>,
}

/// Field set of the add-lead form, in the order the page posts it.
///
/// `requirments` is the form's own spelling. Missing industry or location go
/// out empty rather than failing the record.
pub fn form_fields(
    record: &CompositeRecord,
    industry: &str,
    selection: &PageSelection,
) -> Vec<(&'static str, String)> {
    let industry = selected(Some(industry))
        .or_else(|| selected(selection.industry.as_deref()))
        .unwrap_or_default();
    let location = selected(selection.location.as_deref()).unwrap_or_default();

    vec![
        ("industry", industry),
        ("location", location),
        ("company", record.company.clone()),
        ("email", record.email.clone()),
        ("mobile", record.mobile.clone()),
        ("contact_person", record.contact_person.clone()),
        ("dealing", String::new()),
        ("gst", String::new()),
        ("requirments", record.requirements.clone()),
        ("comment", record.comment.clone()),
    ]
}

// Select widgets report "null" when nothing is picked.
fn selected(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_string)
}

pub struct HttpFormSubmitter {
    client: reqwest::Client,
    submit_url: String,
    session_cookie: String,
    selection: PageSelection,
}

impl HttpFormSubmitter {
    pub fn new(
        base_url: &str,
        session_cookie: String,
        selection: PageSelection,
    ) -> anyhow::Result<Self> {
        let submit_url = format!("{}{}", base_url.trim_end_matches('/'), SUBMIT_PATH);
        reqwest::Url::parse(&submit_url)
            .with_context(|| format!("Invalid form endpoint: {}", submit_url))?;
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            submit_url,
            session_cookie,
            selection,
        })
    }

    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }
}

#[async_trait]
impl FormSubmitter for HttpFormSubmitter {
    async fn submit(&self, record: &CompositeRecord, industry: &str) -> Result<(), SubmitError> {
        let form = form_fields(record, industry, &self.selection)
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .client
            .post(&self.submit_url)
            .header(COOKIE, &self.session_cookie)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("{} -> {} {:?}", record.company, status, body);

        if body.contains(SUCCESS_MARKER) || status.is_success() {
            Ok(())
        } else {
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
