//! Upload pipeline
//!
//! Files are validated against [`UploadSettings`], queued, and handed to an
//! [`UploadTransport`] on a tokio task each. The queue is shared with those
//! tasks behind a mutex; see [`queue`] for how late updates are discarded.

mod queue;
mod transport;
mod validation;

pub use queue::{RetryMode, TransferRate, UploadEntry, UploadQueue, UploadStats, UploadStatus};
pub use transport::{SimulatedTransport, TransferError, UploadTransport};
pub use validation::{validate, ValidationError, ValidationKind, Verdict};

use crate::config::{SimulationConfig, UploadSettings};
use crate::AppError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// A file offered for upload (drag-drop or picker)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub mime: Option<String>,
}

impl FileHandle {
    pub fn new(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: &str) -> Self {
        self.mime = Some(mime.to_string());
        self
    }
}

/// What happened to one submitted batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitReport {
    pub accepted: Vec<Uuid>,
    /// (offered name, name it was queued under)
    pub renamed: Vec<(String, String)>,
    pub rejected: Vec<ValidationError>,
}

/// Owns the upload queue and the transfer tasks feeding it
pub struct UploadManager {
    queue: Arc<Mutex<UploadQueue>>,
    transport: Arc<dyn UploadTransport>,
    settings: UploadSettings,
    tasks: Mutex<Vec<(Uuid, JoinHandle<()>)>>,
}

impl UploadManager {
    pub fn new(settings: UploadSettings, transport: Arc<dyn UploadTransport>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(UploadQueue::new())),
            transport,
            settings,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn simulated(settings: UploadSettings, simulation: SimulationConfig) -> Self {
        Self::new(settings, Arc::new(SimulatedTransport::new(simulation)))
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: UploadSettings) {
        self.settings = settings;
    }

    /// Validate a batch and start every file that passes.
    ///
    /// `existing` holds the names already in the target folder. Must be
    /// called inside a tokio runtime.
    pub fn submit(&self, files: Vec<FileHandle>, existing: &HashSet<String>) -> SubmitReport {
        let target = self.settings.target_path();
        let mut taken = existing.clone();
        taken.extend(self.queue.lock().names_for(&target));

        let mut report = SubmitReport::default();
        for file in files {
            match validate(&file, &self.settings, |n| taken.contains(n)) {
                Verdict::Accept { name } => {
                    if name != file.name {
                        report.renamed.push((file.name.clone(), name.clone()));
                    }
                    taken.insert(name.clone());

                    let file = FileHandle { name, ..file };
                    let id = self.queue.lock().enqueue(file.clone(), &target);
                    self.spawn(id, file, 0);
                    report.accepted.push(id);
                }
                Verdict::Reject(errors) => {
                    tracing::warn!("Rejected {}: {} problem(s)", file.name, errors.len());
                    report.rejected.extend(errors);
                }
            }
        }

        self.queue.lock().push_errors(report.rejected.iter().cloned());
        tracing::info!(
            "Upload batch: {} accepted, {} validation errors",
            report.accepted.len(),
            report.rejected.len()
        );
        report
    }

    fn spawn(&self, id: Uuid, file: FileHandle, attempt: u32) {
        let queue = Arc::clone(&self.queue);
        let transport = Arc::clone(&self.transport);

        let handle = tokio::spawn(async move {
            if !queue.lock().begin(id, attempt, Instant::now()) {
                return;
            }

            let progress_queue = Arc::clone(&queue);
            let report = move |percent: u8| {
                progress_queue.lock().progress(id, attempt, percent);
            };

            let outcome = transport.send(&file, &report).await.map_err(|e| e.0);
            if let Err(message) = &outcome {
                tracing::warn!("Upload of {} failed: {}", file.name, message);
            }
            if queue.lock().finish(id, attempt, outcome) {
                tracing::debug!("Upload {} attempt {} finished", file.name, attempt);
            }
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|(_, task)| !task.is_finished());
        tasks.push((id, handle));
    }

    /// Restart a finished or failed entry
    pub fn retry(&self, id: Uuid, mode: RetryMode) -> Result<(), AppError> {
        let (file, attempt) = {
            let mut queue = self.queue.lock();
            if queue.get(id).is_none() {
                return Err(AppError::UploadNotFound(id.to_string()));
            }
            queue
                .reset(id, mode)
                .ok_or_else(|| AppError::InvalidOperation(format!("upload {} is still running", id)))?
        };

        tracing::info!("Retrying upload {} ({:?}) as {}", id, mode, file.name);
        self.spawn(id, file, attempt);
        Ok(())
    }

    /// Retry every failed entry; returns how many were restarted
    pub fn retry_failed(&self) -> usize {
        let failed = self.queue.lock().failed_ids();
        failed
            .into_iter()
            .filter(|id| self.retry(*id, RetryMode::Retry).is_ok())
            .count()
    }

    /// Drop an entry, stopping its transfer
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.queue.lock().remove(id).is_some();
        if removed {
            for (_, task) in self.tasks.lock().iter().filter(|(task_id, _)| *task_id == id) {
                task.abort();
            }
        }
        removed
    }

    /// Drop every entry and validation error and reset the counters
    pub fn clear_all(&self) {
        self.queue.lock().clear();
        for (_, task) in self.tasks.lock().drain(..) {
            task.abort();
        }
        tracing::debug!("Upload queue cleared");
    }

    /// Wait until no transfer task is running
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.tasks.lock());
            if pending.is_empty() {
                break;
            }
            for (id, task) in pending {
                if let Err(e) = task.await {
                    if !e.is_cancelled() {
                        tracing::error!("Upload task {} panicked: {}", id, e);
                    }
                }
            }
        }
    }

    pub fn entries(&self) -> Vec<UploadEntry> {
        self.queue.lock().entries().to_vec()
    }

    pub fn entry(&self, id: Uuid) -> Option<UploadEntry> {
        self.queue.lock().get(id).cloned()
    }

    pub fn is_uploading(&self) -> bool {
        self.queue.lock().is_busy()
    }

    /// Completed entries waiting to be added to the collection
    pub fn uncommitted(&self) -> Vec<UploadEntry> {
        self.queue.lock().uncommitted()
    }

    pub fn mark_committed(&self, entry: &UploadEntry) -> bool {
        self.queue.lock().mark_committed(entry)
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.queue.lock().errors().to_vec()
    }

    pub fn dismiss_error(&self, index: usize) -> bool {
        self.queue.lock().dismiss_error(index).is_some()
    }

    pub fn dismiss_all_errors(&self) {
        self.queue.lock().dismiss_all_errors();
    }

    pub fn stats(&self) -> UploadStats {
        self.queue.lock().stats()
    }

    pub fn rate(&self) -> Option<TransferRate> {
        self.stats().rate(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Two progress ticks, then the next scripted outcome (success when the script runs out)
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<(), TransferError>>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<(), TransferError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl UploadTransport for ScriptedTransport {
        async fn send(&self, _file: &FileHandle, progress: &(dyn Fn(u8) + Send + Sync)) -> Result<(), TransferError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            progress(40);
            tokio::time::sleep(Duration::from_millis(100)).await;
            progress(80);
            let next = self.outcomes.lock().pop_front();
            next.unwrap_or(Ok(()))
        }
    }

    fn settings() -> UploadSettings {
        UploadSettings {
            max_file_size: 10,
            auto_rename: false,
            ..UploadSettings::default()
        }
    }

    fn no_failures() -> SimulationConfig {
        SimulationConfig {
            failure_rate: 0.0,
            ..SimulationConfig::default()
        }
    }

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_files_do_not_block_batch() {
        let manager = UploadManager::simulated(settings(), no_failures());
        let report = manager.submit(
            vec![
                FileHandle::new("ok.pdf", 1024),
                FileHandle::new("huge.pdf", 20 * 1_048_576),
                FileHandle::new("taken.jpg", 10),
            ],
            &existing(&["taken.jpg"]),
        );

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(manager.errors().len(), 2);
        assert_eq!(manager.entries().len(), 1);

        manager.settle().await;
        let entry = manager.entry(report.accepted[0]).unwrap();
        assert_eq!(entry.status, UploadStatus::Completed);
        assert_eq!(entry.progress, 100);
        assert!(!manager.is_uploading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_visible_mid_flight() {
        let simulation = SimulationConfig {
            min_duration_ms: 2000,
            max_duration_ms: 2000,
            ..no_failures()
        };
        let manager = UploadManager::simulated(settings(), simulation);
        let id = manager.submit(vec![FileHandle::new("a.txt", 10)], &HashSet::new()).accepted[0];

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let entry = manager.entry(id).unwrap();
        assert_eq!(entry.status, UploadStatus::Uploading);
        assert!(entry.progress >= 50 && entry.progress < 100);

        manager.settle().await;
        assert_eq!(manager.entry(id).unwrap().status, UploadStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_then_retry_with_rename() {
        let transport = ScriptedTransport::new(vec![Err(TransferError("Network error during upload".into()))]);
        let manager = UploadManager::new(settings(), transport);
        let id = manager.submit(vec![FileHandle::new("photo.jpg", 10)], &HashSet::new()).accepted[0];
        manager.settle().await;

        let failed = manager.entry(id).unwrap();
        assert_eq!(failed.status, UploadStatus::Error);
        assert_eq!(failed.progress, 80);
        assert_eq!(failed.error.as_deref(), Some("Network error during upload"));

        // frozen until retried
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(manager.entry(id).unwrap().progress, 80);

        manager.retry(id, RetryMode::Rename).unwrap();
        assert_eq!(manager.entry(id).unwrap().status, UploadStatus::Pending);
        manager.settle().await;

        let done = manager.entry(id).unwrap();
        assert_eq!(done.name, "photo_copy.jpg");
        assert_eq!(done.status, UploadStatus::Completed);
        assert!(done.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_rules() {
        let manager = UploadManager::new(settings(), ScriptedTransport::new(Vec::new()));
        assert!(matches!(
            manager.retry(Uuid::new_v4(), RetryMode::Retry),
            Err(AppError::UploadNotFound(_))
        ));

        let id = manager.submit(vec![FileHandle::new("a.pdf", 1)], &HashSet::new()).accepted[0];
        assert!(matches!(
            manager.retry(id, RetryMode::Retry),
            Err(AppError::InvalidOperation(_))
        ));
        manager.settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_failed() {
        let err = || Err(TransferError("boom".into()));
        let manager = UploadManager::new(settings(), ScriptedTransport::new(vec![err(), err()]));
        manager.submit(
            vec![FileHandle::new("a.pdf", 1), FileHandle::new("b.pdf", 1)],
            &HashSet::new(),
        );
        manager.settle().await;

        assert_eq!(manager.retry_failed(), 2);
        manager.settle().await;
        assert!(manager
            .entries()
            .iter()
            .all(|e| e.status == UploadStatus::Completed));
        assert_eq!(manager.stats().completed_files, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_in_flight() {
        let manager = UploadManager::simulated(settings(), no_failures());
        let id = manager.submit(vec![FileHandle::new("a.pdf", 1)], &HashSet::new()).accepted[0];

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(manager.remove(id));
        manager.settle().await;

        assert!(manager.entry(id).is_none());
        assert!(manager.entries().is_empty());
        assert!(!manager.remove(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_rename_within_batch() {
        let renaming = UploadSettings {
            auto_rename: true,
            ..settings()
        };
        let manager = UploadManager::new(renaming, ScriptedTransport::new(Vec::new()));
        let report = manager.submit(
            vec![FileHandle::new("scan.png", 1), FileHandle::new("scan.png", 1)],
            &existing(&["scan.png"]),
        );

        assert_eq!(
            report.renamed,
            vec![
                ("scan.png".to_string(), "scan (1).png".to_string()),
                ("scan.png".to_string(), "scan (2).png".to_string()),
            ]
        );
        manager.settle().await;
        let done = manager.uncommitted();
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|e| manager.mark_committed(e)));
        assert!(manager.uncommitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_and_rate() {
        let manager = UploadManager::new(settings(), ScriptedTransport::new(Vec::new()));
        manager.submit(vec![FileHandle::new("a.pdf", 1000)], &HashSet::new());
        manager.settle().await;

        let rate = manager.rate().unwrap();
        assert_eq!(rate.eta_secs, 0);
        assert!(rate.bytes_per_sec > 0.0);

        manager.submit(vec![FileHandle::new("bad.zip", 1)], &HashSet::new());
        assert!(manager.dismiss_error(0));
        manager.clear_all();
        assert!(manager.entries().is_empty());
        assert!(manager.errors().is_empty());
        assert_eq!(manager.stats(), UploadStats::default());
    }
}
