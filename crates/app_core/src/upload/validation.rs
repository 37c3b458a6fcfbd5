//! Pre-acceptance checks for incoming files

use super::FileHandle;
use crate::config::UploadSettings;
use app_fs::{extension_of, numbered_name};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1_048_576.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Size,
    Type,
    Duplicate,
}

/// One violated constraint for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub file_name: String,
    /// What was wrong, e.g. "12.50 MB exceeds 10 MB"
    pub detail: String,
}

/// Outcome of validating a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted, possibly under a new name
    Accept { name: String },
    Reject(Vec<ValidationError>),
}

/// Check one file against the upload settings.
///
/// `taken` reports names already present in the target folder. With
/// `overwrite_existing` the duplicate check is skipped; with `auto_rename`
/// a duplicate is accepted under a numbered name instead of rejected.
pub fn validate(file: &FileHandle, settings: &UploadSettings, taken: impl Fn(&str) -> bool) -> Verdict {
    let mut errors = Vec::new();
    let mut name = file.name.clone();

    let size_mb = file.size as f64 / BYTES_PER_MB;
    if size_mb > settings.max_file_size as f64 {
        errors.push(ValidationError {
            kind: ValidationKind::Size,
            file_name: file.name.clone(),
            detail: format!("{:.2} MB exceeds {} MB", size_mb, settings.max_file_size),
        });
    }

    match extension_of(&file.name) {
        Some(ext) if settings.allows(&ext) => {}
        Some(ext) => errors.push(ValidationError {
            kind: ValidationKind::Type,
            file_name: file.name.clone(),
            detail: format!(".{} is not an allowed type", ext),
        }),
        None => errors.push(ValidationError {
            kind: ValidationKind::Type,
            file_name: file.name.clone(),
            detail: "file has no extension".to_string(),
        }),
    }

    if !settings.overwrite_existing && taken(&file.name) {
        if settings.auto_rename {
            name = numbered_name(&file.name, &taken);
        } else {
            errors.push(ValidationError {
                kind: ValidationKind::Duplicate,
                file_name: file.name.clone(),
                detail: format!("{} already exists in the target folder", file.name),
            });
        }
    }

    if errors.is_empty() {
        Verdict::Accept { name }
    } else {
        Verdict::Reject(errors)
    }
}
