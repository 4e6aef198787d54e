//! `pdv verify` – run the download verification.

use anyhow::Result;
use pdv_core::config;
use pdv_core::verify::{ContentDownloadVerifier, RunOutcome};
use std::path::Path;

/// Prints the per-scheme report. A skipped run is not a failure.
pub fn run_verify(config_path: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let cfg = match config_path {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!(
        base_url = %cfg.pulp.base_url,
        version = %cfg.pulp.version,
        "loaded config"
    );
    let bugs = cfg.bug_registry()?;

    let mut verifier = ContentDownloadVerifier::new(cfg, Box::new(bugs))?;
    if let Some(seed) = seed {
        verifier = verifier.with_seed(seed);
    }
    match verifier.run()? {
        RunOutcome::Passed(report) => {
            print!("{}", report);
            println!("PASS");
        }
        RunOutcome::Skipped(reason) => println!("SKIP {}", reason),
    }
    Ok(())
}
