//! Model artifact persistence — versioned schema, atomic replace.
//!
//! The artifact is the only shared resource between training and
//! classification, with single-writer/multiple-reader discipline:
//! training serializes under an exclusive lock file and renames a fully
//! written temporary into place, so a reader never observes a partial
//! artifact. Readers open the file once per run.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::model::bayes::NaiveBayes;
use crate::model::vectorizer::TokenCountVectorizer;

/// Current artifact schema version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Serialized form of a trained model: the fitted vocabulary plus the
/// classifier parameters, under an explicit schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub vectorizer: TokenCountVectorizer,
    pub classifier: NaiveBayes,
}

impl ModelArtifact {
    pub fn new(vectorizer: TokenCountVectorizer, classifier: NaiveBayes) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            vectorizer,
            classifier,
        }
    }
}

/// Write an artifact atomically.
///
/// Takes `<path>.lock` via exclusive creation, writes the full encoding to
/// `<path>.tmp`, then renames into place. A held lock is a fatal error —
/// training aborts and no partial artifact remains.
pub fn write_atomic(artifact: &ModelArtifact, path: &Path) -> Result<(), ArtifactError> {
    let bytes = bincode::serialize(artifact).map_err(|e| ArtifactError::Encode(e.to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let lock_path = lock_path(path);
    let _lock = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&lock_path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ArtifactError::Locked {
                path: lock_path.clone(),
            },
            _ => ArtifactError::Io(e),
        })?;

    let result = write_and_rename(&bytes, path);
    let _ = fs::remove_file(&lock_path);
    result
}

fn write_and_rename(bytes: &[u8], path: &Path) -> Result<(), ArtifactError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and validate an artifact.
///
/// An absent file, undecodable bytes, or a version mismatch are all fatal
/// — classification must never run against a model it cannot trust.
pub fn read(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Io(e),
    })?;

    let artifact: ModelArtifact =
        bincode::deserialize(&bytes).map_err(|e| ArtifactError::Corrupt(e.to_string()))?;

    if artifact.version != ARTIFACT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: artifact.version,
            expected: ARTIFACT_VERSION,
        });
    }

    Ok(artifact)
}

fn lock_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}
