use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub const SNAPSHOT_ENV: &str = "HEAP_SNAPSHOT";
pub const EXCLUDES_ENV: &str = "HEAP_NAVIGATOR_EXCLUDES";

pub fn resolve_snapshot_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.snapshot.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(SNAPSHOT_ENV) {
        return Ok(PathBuf::from(p));
    }

    Ok(navigator_home()?.join("snapshot.json"))
}

/// Excludes are optional: the default file is only used when it exists.
pub fn resolve_excludes_path(cli: &Cli) -> Result<Option<PathBuf>> {
    if let Some(p) = cli.excludes.clone() {
        return Ok(Some(p));
    }

    if let Ok(p) = env::var(EXCLUDES_ENV) {
        return Ok(Some(PathBuf::from(p)));
    }

    let default_path = navigator_home()?.join("excludes.txt");
    Ok(default_path.exists().then_some(default_path))
}

pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn navigator_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("heap-navigator"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn explicit_flags_win() -> Result<()> {
        let cli = Cli::parse_from([
            "heap-navigator",
            "--snapshot",
            "/data/heap.json",
            "--excludes",
            "/data/excludes.txt",
            "summary",
        ]);
        assert_eq!(resolve_snapshot_path(&cli)?, PathBuf::from("/data/heap.json"));
        assert_eq!(
            resolve_excludes_path(&cli)?,
            Some(PathBuf::from("/data/excludes.txt"))
        );
        Ok(())
    }
}
