use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use parstat_core::accessor::SnapshotIndex;
use parstat_core::snapshot::ArraySnapshot;
use parstat_core::{status, summarize, StatusOptions, StatusOutcome};

#[derive(Parser)]
#[command(name = "parstat", version, about = "Status report for a parity-protected disk array")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the array status report
    Status {
        snapshot: PathBuf,
        /// Per-block diagnostic lines (diagnostics go to stderr unless --log is set)
        #[arg(long, default_value_t = false)]
        gui: bool,
        /// Write the diagnostic stream to this file
        #[arg(long)]
        log: Option<PathBuf>,
        /// Reference time in unix seconds (default: now)
        #[arg(long, env = "PARSTAT_NOW")]
        now: Option<i64>,
        #[arg(long, env = "PARSTAT_LANG", default_value = "en-GB")]
        lang: String,
        /// Print the computed summary as JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Validate a snapshot and print its dimensions
    Check { snapshot: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("PARSTAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Status { snapshot, gui, log, now, lang, json } => {
            let opts = StatusOptions {
                now: now.unwrap_or_else(|| chrono::Utc::now().timestamp()),
                gui,
                lang,
                ..Default::default()
            };
            run_status(&snapshot, log.as_deref(), &opts, json)?;
        }
        Cmd::Check { snapshot } => check(&snapshot)?,
    }
    Ok(())
}

fn log_sink(path: Option<&Path>, gui: bool) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("create log {}", p.display()))?,
        )),
        None if gui => Box::new(io::stderr()),
        None => Box::new(io::sink()),
    })
}

fn run_status(path: &Path, log: Option<&Path>, opts: &StatusOptions, json: bool) -> Result<()> {
    let snap = ArraySnapshot::load(path)?;
    let index = SnapshotIndex::new(&snap);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        let summary = summarize(&snap, &index, opts);
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    let mut sink = log_sink(log, opts.gui)?;
    let outcome = status(&snap, &index, opts, &mut out, &mut sink)?;
    sink.flush()?;
    if outcome == StatusOutcome::Empty {
        tracing::info!("report shortened, nothing scrubbed yet");
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let snap = ArraySnapshot::load(path)?;
    let files: usize = snap.disks.iter().map(|d| d.files.len()).sum();
    println!(
        "OK: {} disk(s), {} parity level(s), {} file(s), blockmax {}, {} info entries",
        snap.disks.len(),
        snap.parity.len(),
        files,
        snap.blockmax,
        snap.info.len()
    );
    Ok(())
}
