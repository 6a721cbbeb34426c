mod exam;
mod services;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use viva_ai::session::Examiner;
use viva_core::chunking::chunk_text;
use viva_core::config::VivaConfig;
use viva_core::ingest::extract_text_from_pdf;

use crate::services::Services;

#[derive(Parser)]
#[command(name = "lexicognition", about = "Viva examiner for research papers", version)]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the local Ollama daemon is reachable
    Health,

    /// Print the chunks a paper is split into
    Chunks {
        /// Path to the paper
        pdf: PathBuf,
    },

    /// Generate and print viva questions for a paper
    Questions {
        /// Path to the paper
        pdf: PathBuf,
    },

    /// Run an interactive viva over a paper
    Exam {
        /// Path to the paper
        pdf: PathBuf,
        /// Write a JSON transcript here when the exam ends
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = VivaConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Health => health(&cfg),
        Command::Chunks { pdf } => chunks(&cfg, &pdf),
        Command::Questions { pdf } => questions(&cfg, &pdf),
        Command::Exam { pdf, transcript } => exam(&cfg, &pdf, transcript.as_deref()),
    }
}

fn health(cfg: &VivaConfig) -> anyhow::Result<()> {
    let services = Services::from_config(cfg)?;
    services.client.health_check()?;
    println!("Ollama reachable at {}", services.client.base_url());
    Ok(())
}

fn chunks(cfg: &VivaConfig, pdf: &Path) -> anyhow::Result<()> {
    let doc = extract_text_from_pdf(pdf, &cfg.extraction)?;
    let chunks = chunk_text(&doc.text, &cfg.chunking);
    log::info!("{} chunks from {}", chunks.len(), pdf.display());
    for (i, c) in chunks.iter().enumerate() {
        println!("--- chunk {} ({} chars) ---", i + 1, c.chars().count());
        println!("{c}");
    }
    Ok(())
}

fn questions(cfg: &VivaConfig, pdf: &Path) -> anyhow::Result<()> {
    let services = Services::from_config(cfg)?;
    let examiner = Examiner::new(&services.embedder, services.llm.as_ref(), cfg);
    let session = examiner.prepare_from_pdf(pdf)?;

    if session.questions().is_empty() {
        println!("No numbered questions in model output:\n{}", session.questions_raw());
        return Ok(());
    }
    for (i, q) in session.questions().iter().enumerate() {
        println!("{}. {q}", i + 1);
    }
    Ok(())
}

fn exam(cfg: &VivaConfig, pdf: &Path, transcript: Option<&Path>) -> anyhow::Result<()> {
    let services = Services::from_config(cfg)?;
    let examiner = Examiner::new(&services.embedder, services.llm.as_ref(), cfg);
    let mut session = examiner.prepare_from_pdf(pdf)?;

    if session.questions().is_empty() {
        println!("No questions could be generated for this paper.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    exam::run_and_report(&examiner, &mut session, &mut lines, &mut out, pdf, transcript)
}
