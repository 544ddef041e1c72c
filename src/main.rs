mod error;
mod pages;
mod parser;
mod report;
mod settings;
mod translate;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use parser::SectionsDocument;
use settings::Settings;
use translate::client::ChatClient;

#[derive(Parser)]
#[command(
    name = "bylaw_sections",
    about = "Recover numbered section structure from zoning bylaw page text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split page text into numbered sections (JSON)
    Extract {
        /// Page text: form-feed separated .txt or a .json list of pages
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the sections JSON
        #[arg(short, long)]
        output: PathBuf,
        /// Literal line to strip from every page (e.g. "R1-1")
        #[arg(short, long)]
        district_code: Option<String>,
    },
    /// Translate extracted section bodies into plain language
    Translate {
        /// Sections JSON produced by `extract`
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the translations JSON
        #[arg(short, long)]
        output: PathBuf,
        /// API key (default: BYLAW_API_KEY or OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Max sections to translate (default: all with body text)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Extract + translate in one pipeline
    Run {
        #[arg(short, long)]
        input: PathBuf,
        /// Directory receiving sections.json and translated.json
        #[arg(long)]
        output_dir: PathBuf,
        #[arg(short, long)]
        district_code: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Summarize a sections JSON file
    Stats {
        #[arg(short, long)]
        input: PathBuf,
        /// Max rows in the outline table
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            district_code,
        } => {
            if district_code.is_some() {
                settings.district_code = district_code;
            }
            let doc = run_extract(&input, &settings)?;
            write_json(&output, &doc)?;
            println!(
                "Extraction complete. {} sections saved to {}",
                doc.sections.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Translate {
            input,
            output,
            api_key,
            limit,
        } => {
            if api_key.is_some() {
                settings.api_key = api_key;
            }
            let mut doc = read_sections(&input)?;
            if let Some(n) = limit {
                keep_first_with_body(&mut doc, n);
            }
            run_translate(&doc, &settings, &output).await
        }
        Commands::Run {
            input,
            output_dir,
            district_code,
            api_key,
        } => {
            if district_code.is_some() {
                settings.district_code = district_code;
            }
            if api_key.is_some() {
                settings.api_key = api_key;
            }
            // fail on a missing key before doing any work
            let client = ChatClient::from_settings(&settings)?;

            fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            let t_extract = Instant::now();
            let doc = run_extract(&input, &settings)?;
            let sections_path = output_dir.join("sections.json");
            write_json(&sections_path, &doc)?;
            println!(
                "Extracted {} sections in {:.1}s -> {}",
                doc.sections.len(),
                t_extract.elapsed().as_secs_f64(),
                sections_path.display()
            );

            let translated_path = output_dir.join("translated.json");
            translate_with(client, &doc, &settings, &translated_path).await
        }
        Commands::Stats { input, limit } => {
            let doc = read_sections(&input)?;
            if doc.sections.is_empty() {
                println!("No sections found.");
                return Ok(());
            }
            report::print_stats(&report::section_stats(&doc.sections));
            println!();
            report::print_overview(&doc.sections, limit);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", report::format_duration(elapsed));
    }

    result
}

fn run_extract(input: &Path, settings: &Settings) -> Result<SectionsDocument> {
    let pages = pages::load_pages(input)?;
    Ok(parser::extract(&pages, settings.district_code.as_deref()))
}

async fn run_translate(doc: &SectionsDocument, settings: &Settings, output: &Path) -> Result<()> {
    let client = ChatClient::from_settings(settings)?;
    translate_with(client, doc, settings, output).await
}

async fn translate_with(
    client: ChatClient,
    doc: &SectionsDocument,
    settings: &Settings,
    output: &Path,
) -> Result<()> {
    let t_translate = Instant::now();
    let translated = translate::translate_all(Arc::new(client), settings, &doc.sections).await;
    write_json(output, &translated)?;
    info!(
        "Translation finished in {:.1}s",
        t_translate.elapsed().as_secs_f64()
    );
    println!(
        "Translation complete. {} sections saved to {}",
        translated.translated_sections.len(),
        output.display()
    );
    Ok(())
}

/// Drop sections past the `n`-th one that has body text.
fn keep_first_with_body(doc: &mut SectionsDocument, n: usize) {
    let mut seen = 0;
    doc.sections.retain(|s| {
        if s.section_body_text.is_none() {
            return false;
        }
        seen += 1;
        seen <= n
    });
}

fn read_sections(path: &Path) -> Result<SectionsDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid sections JSON in {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
