// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod model;
pub mod runner;
pub mod script;
pub mod sink;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::exec::{LogScanner, PersistingScanner, Scanner, TempScriptStore};
use crate::fs::{FileSystem, RealFileSystem};
use crate::model::{ExecRequest, LogRecord, Script};
use crate::runner::{BatchReport, ScriptRunner};
use crate::script::load_script_file;
use crate::sink::MemoryStore;
use crate::types::ScannerKind;

/// High-level entry point used by `main.rs`.
///
/// Every collaborator is built here once and handed down:
/// - config
/// - script store + log sink (in memory)
/// - scanner variant
/// - temp script store
/// - runner
pub async fn run(args: CliArgs) -> Result<BatchReport> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cfg = load_or_default(fs.as_ref(), args.config.as_deref())?;
    let mode = args.mode_override().unwrap_or(cfg.exec.mode);
    let kind = args.scanner.unwrap_or(cfg.scanner.kind);
    // `--timeout` wins over the config file; 0 means no deadline.
    let timeout_seconds = args.timeout.unwrap_or(cfg.exec.default_timeout_seconds);

    let store = Arc::new(MemoryStore::new());

    let mut scripts = Vec::with_capacity(args.scripts.len());
    for path in &args.scripts {
        let file = load_script_file(fs.as_ref(), path)?;
        scripts.push(store.add_script(file.title, file.body));
    }

    if args.dry_run {
        print_dry_run(&cfg, &scripts, mode, kind, timeout_seconds);
        return Ok(BatchReport::from_errors(Vec::new()));
    }

    let scanner: Arc<dyn Scanner> = match kind {
        ScannerKind::Log => Arc::new(LogScanner),
        ScannerKind::Persist => Arc::new(PersistingScanner::new(store.clone())),
    };

    let runner = ScriptRunner::from_config(&cfg, store.clone(), store.clone(), scanner)
        .with_store(TempScriptStore::with_fs(&cfg.exec.tmp_dir, Arc::clone(&fs)));

    let requests: Vec<ExecRequest> = scripts
        .iter()
        .map(|s| ExecRequest::new(s.id, timeout_seconds))
        .collect();
    info!(scripts = requests.len(), %mode, scanner = ?kind, "running scripts");

    let report = runner.execute_batch(&requests, mode).await?;

    print_logs(&scripts, &store.logs(), args.json)?;
    println!("{}", report.message);

    Ok(report)
}

/// Print recorded log entries in insertion order.
fn print_logs(scripts: &[Script], logs: &[LogRecord], json: bool) -> Result<()> {
    for record in logs {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            let title = scripts
                .iter()
                .find(|s| s.id == record.script_id)
                .map(|s| s.title.as_str())
                .unwrap_or("?");
            let marker = if record.is_error { "ERR" } else { "out" };
            println!("[{title}] {marker} {}", record.body);
        }
    }
    Ok(())
}

/// Dry-run output: config and the batch that would run.
fn print_dry_run(
    cfg: &ConfigFile,
    scripts: &[Script],
    mode: crate::types::ExecMode,
    kind: ScannerKind,
    timeout_seconds: u64,
) {
    println!("pgsh dry-run");
    println!("  exec.interpreter = {}", cfg.exec.interpreter);
    println!("  exec.tmp_dir = {}", cfg.exec.tmp_dir.display());
    println!("  mode = {mode}");
    println!("  scanner = {kind:?}");
    match timeout_seconds {
        0 => println!("  timeout = none"),
        secs => println!("  timeout = {secs}s"),
    }
    println!();

    println!("scripts ({}):", scripts.len());
    for script in scripts {
        println!("  - {} ({})", script.title, script.id);
        println!("      lines: {}", script.body.lines().count());
    }

    debug!("dry-run complete (no execution)");
}
