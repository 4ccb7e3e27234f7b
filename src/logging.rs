use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "conway-screensaver.log";

/// Where logs go when `RUST_LOG` is set
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Installs a file logger if `RUST_LOG` is set, and returns the file it writes to.
///
/// The screensaver owns the whole terminal, so logging to stdout or stderr would scribble over
/// the board. Without `RUST_LOG` nothing is installed and every `tracing` macro is a no-op.
pub fn init() -> Option<PathBuf> {
    std::env::var_os(EnvFilter::DEFAULT_ENV)?;

    let path = log_path();
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("[WARNING] Can't log to {}: {err}", path.display());
            return None;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(path)
}
