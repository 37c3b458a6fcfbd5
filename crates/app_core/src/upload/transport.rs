//! Transfer backends

use super::FileHandle;
use crate::config::SimulationConfig;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// A failed transfer, with a message for the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferError(pub String);

/// Moves one file's bytes somewhere, reporting percent progress (0-100)
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, file: &FileHandle, progress: &(dyn Fn(u8) + Send + Sync)) -> Result<(), TransferError>;
}

/// Pretends to upload: ticks progress over a random duration and
/// occasionally fails at the end
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    config: SimulationConfig,
}

impl SimulatedTransport {
    pub const NETWORK_ERROR: &'static str = "Network error during upload";

    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// (duration in ms, whether this transfer will fail)
    fn roll(&self) -> (u64, bool) {
        let mut rng = rand::thread_rng();
        let min = self.config.min_duration_ms;
        let max = self.config.max_duration_ms.max(min);
        let duration = rng.gen_range(min..=max);
        let fails = rng.gen_bool(self.config.failure_rate.clamp(0.0, 1.0));
        (duration, fails)
    }
}

#[async_trait]
impl UploadTransport for SimulatedTransport {
    async fn send(&self, file: &FileHandle, progress: &(dyn Fn(u8) + Send + Sync)) -> Result<(), TransferError> {
        let (duration_ms, fails) = self.roll();
        let tick_ms = self.config.tick_ms.max(1);
        let total_ticks = (duration_ms as f64 / tick_ms as f64).max(1.0);

        tracing::trace!("Simulating {} over {} ms", file.name, duration_ms);

        let mut tick = 0u64;
        loop {
            tokio::time::sleep(Duration::from_millis(tick_ms)).await;
            tick += 1;

            let percent = (tick as f64 / total_ticks * 100.0).min(100.0).round() as u8;
            progress(percent);

            if tick as f64 >= total_ticks {
                break;
            }
        }

        if fails {
            Err(TransferError(Self::NETWORK_ERROR.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn fixed(failure_rate: f64) -> SimulatedTransport {
        SimulatedTransport::new(SimulationConfig {
            min_duration_ms: 1000,
            max_duration_ms: 1000,
            tick_ms: 100,
            failure_rate,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_to_100() {
        let seen = Mutex::new(Vec::new());
        let start = tokio::time::Instant::now();

        fixed(0.0)
            .send(&FileHandle::new("a.pdf", 10), &|p| seen.lock().push(p))
            .await
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 10);
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_certain_failure() {
        let err = fixed(1.0)
            .send(&FileHandle::new("a.pdf", 10), &|_| {})
            .await
            .unwrap_err();
        assert_eq!(err.0, SimulatedTransport::NETWORK_ERROR);
    }
}
