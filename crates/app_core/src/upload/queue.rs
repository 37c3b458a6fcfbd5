//! Upload queue state
//!
//! Every transition is keyed by `(id, attempt)`. A retry bumps the attempt
//! and a removal drops the entry, so updates from an older transfer task
//! are ignored.

use super::validation::ValidationError;
use super::FileHandle;
use app_fs::copy_name;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

/// How a retried entry is resubmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    /// Same name, e.g. after a network error
    Retry,
    /// Resubmit as "stem_copy.ext"
    Rename,
    /// Same name, replacing what is in the target folder
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEntry {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    /// Destination folder path
    pub target: String,
    pub status: UploadStatus,
    /// 0-100
    pub progress: u8,
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) attempt: u32,
    #[serde(skip)]
    pub(crate) committed: bool,
}

impl UploadEntry {
    pub fn handle(&self) -> FileHandle {
        FileHandle {
            name: self.name.clone(),
            size: self.size,
            mime: self.mime.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, UploadStatus::Pending | UploadStatus::Uploading)
    }
}

/// Running totals for the speed/ETA readout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub total_files: usize,
    pub completed_files: usize,
    pub total_size: u64,
    pub uploaded_size: u64,
    pub started_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRate {
    pub bytes_per_sec: f64,
    /// Whole seconds left, rounded up
    pub eta_secs: u64,
}

impl UploadStats {
    /// Average speed since the first transfer started. None until something completed.
    pub fn rate(&self, now: Instant) -> Option<TransferRate> {
        let started = self.started_at?;
        if self.uploaded_size == 0 {
            return None;
        }

        let elapsed = now.saturating_duration_since(started).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        let bytes_per_sec = self.uploaded_size as f64 / elapsed;
        let remaining = self.total_size.saturating_sub(self.uploaded_size) as f64;
        Some(TransferRate {
            bytes_per_sec,
            eta_secs: (remaining / bytes_per_sec).ceil() as u64,
        })
    }
}

#[derive(Debug, Default)]
pub struct UploadQueue {
    entries: Vec<UploadEntry>,
    errors: Vec<ValidationError>,
    stats: UploadStats,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&UploadEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn stats(&self) -> UploadStats {
        self.stats
    }

    /// Names queued for `target` that have not failed
    pub fn names_for(&self, target: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.target == target && e.status != UploadStatus::Error && !e.committed)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn enqueue(&mut self, file: FileHandle, target: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.stats.total_files += 1;
        self.stats.total_size += file.size;
        self.entries.push(UploadEntry {
            id,
            name: file.name,
            size: file.size,
            mime: file.mime,
            target: target.to_string(),
            status: UploadStatus::Pending,
            progress: 0,
            error: None,
            attempt: 0,
            committed: false,
        });
        id
    }

    fn current_mut(&mut self, id: Uuid, attempt: u32) -> Option<&mut UploadEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id && e.attempt == attempt)
    }

    /// pending -> uploading
    pub fn begin(&mut self, id: Uuid, attempt: u32, now: Instant) -> bool {
        let Some(entry) = self.current_mut(id, attempt) else {
            return false;
        };
        if entry.status != UploadStatus::Pending {
            return false;
        }
        entry.status = UploadStatus::Uploading;
        self.stats.started_at.get_or_insert(now);
        true
    }

    /// Record progress; it never goes backwards
    pub fn progress(&mut self, id: Uuid, attempt: u32, percent: u8) -> bool {
        match self.current_mut(id, attempt) {
            Some(entry) if entry.status == UploadStatus::Uploading => {
                entry.progress = entry.progress.max(percent.min(100));
                true
            }
            _ => false,
        }
    }

    /// uploading -> completed | error. On error the progress stays where it was.
    pub fn finish(&mut self, id: Uuid, attempt: u32, outcome: Result<(), String>) -> bool {
        let Some(entry) = self.current_mut(id, attempt) else {
            return false;
        };
        if entry.status != UploadStatus::Uploading {
            return false;
        }

        match outcome {
            Ok(()) => {
                entry.status = UploadStatus::Completed;
                entry.progress = 100;
                let size = entry.size;
                self.stats.completed_files += 1;
                self.stats.uploaded_size += size;
            }
            Err(message) => {
                entry.status = UploadStatus::Error;
                entry.error = Some(message);
            }
        }
        true
    }

    /// Put a finished entry back to pending under a new attempt.
    /// Returns the file to resend and the new attempt number.
    pub fn reset(&mut self, id: Uuid, mode: RetryMode) -> Option<(FileHandle, u32)> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        if entry.is_active() {
            return None;
        }

        if entry.status == UploadStatus::Completed {
            self.stats.completed_files = self.stats.completed_files.saturating_sub(1);
            self.stats.uploaded_size = self.stats.uploaded_size.saturating_sub(entry.size);
        }
        if mode == RetryMode::Rename {
            entry.name = copy_name(&entry.name);
        }

        entry.attempt += 1;
        entry.status = UploadStatus::Pending;
        entry.progress = 0;
        entry.error = None;
        entry.committed = false;
        Some((entry.handle(), entry.attempt))
    }

    pub fn remove(&mut self, id: Uuid) -> Option<UploadEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(idx);

        self.stats.total_files = self.stats.total_files.saturating_sub(1);
        self.stats.total_size = self.stats.total_size.saturating_sub(entry.size);
        if entry.status == UploadStatus::Completed {
            self.stats.completed_files = self.stats.completed_files.saturating_sub(1);
            self.stats.uploaded_size = self.stats.uploaded_size.saturating_sub(entry.size);
        }
        Some(entry)
    }

    /// Drop every entry, error and counter
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.entries
            .iter()
            .filter(|e| e.status == UploadStatus::Error)
            .map(|e| e.id)
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.entries.iter().any(UploadEntry::is_active)
    }

    /// Completed entries not yet added to the collection
    pub fn uncommitted(&self) -> Vec<UploadEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == UploadStatus::Completed && !e.committed)
            .cloned()
            .collect()
    }

    /// Record that `entry` landed in the collection. Ignored if it was retried meanwhile.
    pub fn mark_committed(&mut self, entry: &UploadEntry) -> bool {
        match self.current_mut(entry.id, entry.attempt) {
            Some(e) if e.status == UploadStatus::Completed => {
                e.committed = true;
                true
            }
            _ => false,
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn push_errors(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn dismiss_error(&mut self, index: usize) -> Option<ValidationError> {
        (index < self.errors.len()).then(|| self.errors.remove(index))
    }

    pub fn dismiss_all_errors(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::ValidationKind;
    use std::time::Duration;

    fn queue_with(name: &str, size: u64) -> (UploadQueue, Uuid) {
        let mut q = UploadQueue::new();
        let id = q.enqueue(FileHandle::new(name, size), "");
        (q, id)
    }

    #[test]
    fn test_lifecycle() {
        let (mut q, id) = queue_with("a.pdf", 100);
        assert!(!q.progress(id, 0, 10));
        assert!(q.begin(id, 0, Instant::now()));
        assert!(q.progress(id, 0, 40));
        assert!(q.progress(id, 0, 30));
        assert_eq!(q.get(id).unwrap().progress, 40);

        assert!(q.finish(id, 0, Ok(())));
        let entry = q.get(id).unwrap();
        assert_eq!(entry.status, UploadStatus::Completed);
        assert_eq!(entry.progress, 100);
        assert_eq!(q.stats().uploaded_size, 100);
        assert!(!q.is_busy());
    }

    #[test]
    fn test_error_freezes_progress() {
        let (mut q, id) = queue_with("a.pdf", 100);
        q.begin(id, 0, Instant::now());
        q.progress(id, 0, 70);
        q.finish(id, 0, Err("Network error during upload".into()));

        assert!(!q.progress(id, 0, 90));
        let entry = q.get(id).unwrap();
        assert_eq!(entry.status, UploadStatus::Error);
        assert_eq!(entry.progress, 70);
        assert_eq!(q.failed_ids(), vec![id]);
    }

    #[test]
    fn test_stale_attempt_ignored() {
        let (mut q, id) = queue_with("photo.jpg", 100);
        q.begin(id, 0, Instant::now());
        q.finish(id, 0, Err("boom".into()));

        let (handle, attempt) = q.reset(id, RetryMode::Rename).unwrap();
        assert_eq!(attempt, 1);
        assert_eq!(handle.name, "photo_copy.jpg");

        // late update from the first attempt
        assert!(!q.begin(id, 0, Instant::now()));
        assert!(q.begin(id, 1, Instant::now()));
        assert!(!q.progress(id, 0, 99));
        assert_eq!(q.get(id).unwrap().progress, 0);
    }

    #[test]
    fn test_active_entry_cannot_reset() {
        let (mut q, id) = queue_with("a.pdf", 1);
        assert!(q.reset(id, RetryMode::Retry).is_none());
    }

    #[test]
    fn test_removed_entry_ignores_updates() {
        let (mut q, id) = queue_with("a.pdf", 100);
        q.begin(id, 0, Instant::now());
        assert!(q.remove(id).is_some());
        assert!(!q.progress(id, 0, 50));
        assert!(!q.finish(id, 0, Ok(())));
        assert_eq!(q.stats().total_files, 0);
    }

    #[test]
    fn test_commit_marks_only_current_attempt() {
        let (mut q, id) = queue_with("a.pdf", 100);
        q.begin(id, 0, Instant::now());
        q.finish(id, 0, Ok(()));

        let done = q.uncommitted();
        assert_eq!(done.len(), 1);
        // still pending until the caller confirms
        assert_eq!(q.uncommitted().len(), 1);
        assert_eq!(q.names_for(""), vec!["a.pdf".to_string()]);

        let (_, attempt) = q.reset(id, RetryMode::Retry).unwrap();
        assert!(!q.mark_committed(&done[0]));
        q.begin(id, attempt, Instant::now());
        q.finish(id, attempt, Ok(()));

        let done = q.uncommitted();
        assert!(q.mark_committed(&done[0]));
        assert!(q.uncommitted().is_empty());
        assert!(q.names_for("").is_empty());
    }

    #[test]
    fn test_errors_dismiss() {
        let mut q = UploadQueue::new();
        q.push_errors(["a", "b", "c"].map(|n| ValidationError {
            kind: ValidationKind::Size,
            file_name: n.to_string(),
            detail: String::new(),
        }));
        assert_eq!(q.dismiss_error(1).unwrap().file_name, "b");
        assert!(q.dismiss_error(5).is_none());
        assert_eq!(q.errors().len(), 2);
        q.dismiss_all_errors();
        assert!(q.errors().is_empty());
    }

    #[test]
    fn test_rate() {
        let start = Instant::now();
        let stats = UploadStats {
            total_files: 2,
            completed_files: 1,
            total_size: 3000,
            uploaded_size: 1000,
            started_at: Some(start),
        };
        let rate = stats.rate(start + Duration::from_secs(2)).unwrap();
        assert_eq!(rate.bytes_per_sec, 500.0);
        assert_eq!(rate.eta_secs, 4);
        assert!(UploadStats::default().rate(start).is_none());
    }
}
