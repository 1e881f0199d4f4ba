use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `UNITDRILL_LOG=debug`.
pub const LOG_ENV: &str = "UNITDRILL_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, appending to the file at `path`.
///
/// The terminal belongs to the UI, so logs never go to stdout/stderr.
pub fn init(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_to_file_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("unitdrill.log");

        init(&path).unwrap();
        tracing::info!("logging smoke test");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("logging smoke test"));

        // a second global subscriber is refused
        assert!(init(&path).is_err());
    }
}
