use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use pagegen::batch::run_batch;
use pagegen::normalize::normalize;
use pagegen::output::write_documents;
use pagegen::pipeline::sample_input;
use pagegen::questions::generate;
use pagegen::settings::Settings;
use pagegen::templates::{DocumentKind, Templates};
use pagegen::{Assembler, Pipeline};

#[derive(Parser)]
#[command(
    name = "pagegen",
    about = "Generate FAQ, product and comparison pages from a product record"
)]
struct Cli {
    /// Directory with faq.json / product_page.json / comparison.json overrides
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the three documents for one record
    Run {
        /// JSON object with the raw record (default: built-in sample)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory (default: settings output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render documents for every record in a JSON array, in parallel
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Compile the templates and report what they use
    Check,
    /// Print the generated questions for a record
    Questions {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    let templates_dir = cli.templates.or_else(|| settings.templates_dir.clone());

    let result = match cli.command {
        Commands::Run { input, out } => {
            let pipeline = build_pipeline(templates_dir.as_deref(), &settings)?;
            let raw = match input {
                Some(path) => read_record(&path)?,
                None => sample_input(),
            };
            let docs = pipeline.run(&raw)?;
            let dir = out.unwrap_or_else(|| settings.output_dir.clone());
            let written = write_documents(&dir, &docs)?;
            println!("Outputs written to {}", dir.display());
            for path in written {
                println!("  - {}", path.file_name().unwrap_or_default().to_string_lossy());
            }
            Ok(())
        }
        Commands::Batch { input, out } => {
            let pipeline = build_pipeline(templates_dir.as_deref(), &settings)?;
            let records = read_batch(&input)?;
            if records.is_empty() {
                println!("No records in {}.", input.display());
                return Ok(());
            }
            let dir = out.unwrap_or_else(|| settings.output_dir.clone());
            println!("Rendering {} records...", records.len());
            let counts = run_batch(&pipeline, &records, &dir)?;
            println!(
                "Rendered {} records ({} failed), wrote {} files.",
                counts.ok, counts.failed, counts.files,
            );
            if counts.ok == 0 {
                bail!("all {} records failed", counts.failed);
            }
            Ok(())
        }
        Commands::Check => {
            let templates = Templates::load(templates_dir.as_deref())?;
            Assembler::new(templates.clone())?;
            println!("{:<14} | {:>6} | {:<9} | {}", "Document", "Fields", "Questions", "Blocks");
            println!("{}", "-".repeat(72));
            for kind in DocumentKind::ALL {
                let t = templates.get(kind);
                let flags = t.flags();
                let blocks: Vec<&str> = flags.blocks.iter().map(|b| b.name()).collect();
                println!(
                    "{:<14} | {:>6} | {:<9} | {}",
                    kind.name(),
                    t.len(),
                    if flags.uses_questions { "yes" } else { "no" },
                    blocks.join(", ")
                );
            }
            println!("\nTemplates OK.");
            Ok(())
        }
        Commands::Questions { input } => {
            let raw = match input {
                Some(path) => read_record(&path)?,
                None => sample_input(),
            };
            let questions = generate(&normalize(&raw));
            println!("{:>3} | {:<13} | {}", "#", "Category", "Question");
            println!("{}", "-".repeat(72));
            for (i, q) in questions.iter().enumerate() {
                println!(
                    "{:>3} | {:<13} | {}",
                    i + 1,
                    q.category.as_str(),
                    truncate(&q.question, 50)
                );
            }
            println!("\n{} questions", questions.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn build_pipeline(templates_dir: Option<&Path>, settings: &Settings) -> Result<Pipeline> {
    let templates = Templates::load(templates_dir)?;
    let assembler = Assembler::new(templates)?.with_faq_limit(settings.faq_limit);
    Ok(Pipeline::new(assembler))
}

fn read_record(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str::<Value>(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must hold a JSON object", path.display()),
    }
}

fn read_batch(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str::<Value>(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => bail!("{} must hold a JSON array of records", path.display()),
    }
}

/// Cuts `s` to `max` characters for the table column, marking the cut with "…".
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…", s[..cut].trim_end()),
    }
}

fn format_duration(d: Duration) -> String {
    match d.as_secs() {
        0..=59 => format!("{:.2}s", d.as_secs_f64()),
        secs => format!("{}m {:02}s", secs / 60, secs % 60),
    }
}

// ── Tests ──
