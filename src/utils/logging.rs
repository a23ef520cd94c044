//! Logger setup shared by every command.

use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Initialize `env_logger`
///
/// `RUST_LOG` still wins over the level chosen here. When `log_file` is set
/// records are appended to that file as `timestamp - LEVEL - message`.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(log_level));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(buf, "{} - {} - {}", buf.timestamp(), record.level(), record.args())
            });
    }

    // A second init (e.g. from tests) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}
