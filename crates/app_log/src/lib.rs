//! FileDeck Logging & Observability Module
//!
//! Provides structured logging, panic handling and deadlock detection.

mod panic_hook;
mod logging;

pub use panic_hook::init_panic_hook;
pub use logging::{init_logging, cleanup_old_logs, LogGuard, LogOptions};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "FileDeck", "FileDeck")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features.
///
/// Keep the returned guard alive for the lifetime of the process; dropping
/// it flushes and stops the file writer.
pub fn init(options: LogOptions) -> anyhow::Result<LogGuard> {
    let guard = init_logging(&options)?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    init_deadlock_detector();

    Ok(guard)
}

#[cfg(debug_assertions)]
fn init_deadlock_detector() {
    use std::thread;
    use std::time::Duration;

    thread::spawn(|| loop {
        thread::sleep(Duration::from_secs(10));
        let deadlocks = parking_lot::deadlock::check_deadlock();
        if deadlocks.is_empty() {
            continue;
        }
        tracing::error!("{} deadlocks detected", deadlocks.len());
        for (i, threads) in deadlocks.iter().enumerate() {
            for t in threads {
                tracing::error!(deadlock = i, thread = ?t.thread_id(), "{:#?}", t.backtrace());
            }
        }
    });
}
