// src/main.rs

use pgsh::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("pgsh error: {err:?}");
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` when the batch ran but reported failures.
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let report = run(args).await?;
    Ok(report.is_ok())
}
