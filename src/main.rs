mod events;
mod parser;
mod records;
mod settings;
mod submit;

use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use parser::batch::CommentPolicy;
use parser::ParsedBatch;
use submit::pipeline::DEFAULT_PACING;
use submit::{HttpFormSubmitter, PageSelection, Pipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "lead_uploader", about = "Batch pasted sales leads into the lead form")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse leads and show the records that would be submitted
    Parse {
        #[command(flatten)]
        input: InputArgs,
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Parse leads and submit every record to the form, one at a time
    Submit {
        #[command(flatten)]
        input: InputArgs,
        /// Industry id applied to every record (default: LEADS_INDUSTRY, else empty)
        #[arg(short, long)]
        industry: Option<String>,
        /// Location id (default: LEADS_LOCATION, else empty)
        #[arg(short, long)]
        location: Option<String>,
        /// Form base URL (default: LEADS_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,
        /// Pause after each submission
        #[arg(long, default_value_t = DEFAULT_PACING.as_millis() as u64)]
        delay_ms: u64,
        /// Print progress events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// File with the pasted lead text (default: stdin)
    file: Option<PathBuf>,
    /// Comment for every record: none, cold_call, company_lead or custom:<text>
    #[arg(short, long, default_value = "none")]
    comment: CommentPolicy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, json } => {
            let batch = load_batch(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&batch.records)?);
            } else {
                print_records(&batch);
            }
            Ok(())
        }
        Commands::Submit {
            input,
            industry,
            location,
            base_url,
            delay_ms,
            json,
        } => {
            let batch = load_batch(&input)?;
            if batch.records.is_empty() {
                bail!("No leads found in input. Nothing to submit.");
            }

            let settings = settings::Settings::load()?;
            let cookie = settings.require_session_cookie()?;
            let base_url = base_url.unwrap_or_else(|| settings.base_url.clone());
            let submitter = HttpFormSubmitter::new(
                &base_url,
                cookie,
                PageSelection {
                    industry: settings.industry.clone(),
                    location: location.or_else(|| settings.location.clone()),
                },
            )?;
            info!("Submitting to {}", submitter.submit_url());

            let (sink, rx) = events::channel();
            let listener = tokio::spawn(events::render(rx, batch.records.len(), json));

            let mut pipeline = Pipeline::new(
                submitter,
                sink,
                PipelineOptions {
                    industry: industry.unwrap_or_default(),
                    pacing: Duration::from_millis(delay_ms),
                },
            );
            let summary = pipeline.run(&batch.records).await;
            // Closes the event channel so the listener drains and exits.
            drop(pipeline);
            listener.await.context("Progress listener crashed")?;

            if !json {
                println!(
                    "Done: {}/{} records submitted ({} ok, {} failed).",
                    summary.attempted(),
                    summary.total,
                    summary.success,
                    summary.failure
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_batch(input: &InputArgs) -> anyhow::Result<ParsedBatch> {
    let text = match &input.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("No data provided.");
    }

    let batch = parser::parse_leads(&text, &input.comment);
    let s = &batch.stats;
    info!(
        "Parsed {} leads into {} companies, {} records ({} duplicates, {} ignored lines, {} without company, {} without email)",
        s.leads,
        batch.companies,
        batch.records.len(),
        s.duplicates,
        s.ignored,
        s.unassigned,
        s.empty_email
    );
    Ok(batch)
}

fn print_records(batch: &ParsedBatch) {
    if batch.records.is_empty() {
        println!("No leads found.");
        return;
    }

    println!(
        "{:>3} | {:<24} | {:>5} | {:<14} | {:<20} | {:<40}",
        "#", "Company", "Leads", "Mobile", "Contact", "Emails"
    );
    println!("{}", "-".repeat(122));

    for (i, r) in batch.records.iter().enumerate() {
        println!(
            "{:>3} | {:<24} | {:>5} | {:<14} | {:<20} | {:<40}",
            i + 1,
            truncate(&r.company, 24),
            r.lead_count,
            if r.mobile.is_empty() { "-" } else { r.mobile.as_str() },
            truncate(&r.contact_person, 20),
            truncate(&r.email, 40),
        );
    }

    // Per-lead comments are easy to miss in the table
    if batch.records.iter().any(|r| !r.comment.is_empty()) {
        println!("\n--- Comments ---");
        for (i, r) in batch.records.iter().enumerate() {
            if !r.comment.is_empty() {
                println!("  #{}: {}", i + 1, r.comment.replace('\n', " | "));
            }
        }
    }

    println!(
        "\n{} records | {} leads | {} companies",
        batch.records.len(),
        batch.stats.leads,
        batch.companies
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_comment_policies() {
        let cli = Cli::try_parse_from(["lead_uploader", "parse", "leads.txt", "-c", "custom:Expo"])
            .unwrap();
        match cli.command {
            Commands::Parse { input, .. } => {
                assert_eq!(input.comment, CommentPolicy::Custom("Expo".into()));
                assert_eq!(input.file, Some(PathBuf::from("leads.txt")));
            }
            _ => panic!("expected parse"),
        }
        assert!(Cli::try_parse_from(["lead_uploader", "parse", "-c", "warm"]).is_err());
    }

    #[test]
    fn submit_defaults() {
        let cli = Cli::try_parse_from(["lead_uploader", "submit"]).unwrap();
        match cli.command {
            Commands::Submit { industry, delay_ms, json, input, .. } => {
                assert!(industry.is_none());
                assert_eq!(delay_ms, 1000);
                assert!(!json);
                assert_eq!(input.comment, CommentPolicy::None);
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn truncate_long_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
