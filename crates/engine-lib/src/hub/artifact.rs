//! Model artifact download and scratch storage
//!
//! Downloads ONNX weights from the hub into a scratch directory, enforcing a
//! size bound and recording a SHA-256 checksum. Files are written atomically
//! (temp + rename) so a failed download never leaves a partial artifact.

use crate::error::{EngineError, EngineResult};
use crate::hub::metadata::MetadataFetcher;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default maximum artifact size (5 GB, matching registry validation rules)
pub const DEFAULT_MAX_ARTIFACT_BYTES: usize = 5 * 1024 * 1024 * 1024;

/// Repository file holding the model weights
const WEIGHTS_FILE: &str = "model.onnx";

/// A downloaded model artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub checksum: String,
    pub path: PathBuf,
}

/// Downloads model weights into a scratch directory
pub struct ArtifactStore {
    scratch_dir: PathBuf,
    max_bytes: usize,
}

impl ArtifactStore {
    pub fn new(scratch_dir: impl Into<PathBuf>, max_bytes: usize) -> EngineResult<Self> {
        let scratch_dir = scratch_dir.into();
        fs::create_dir_all(&scratch_dir).map_err(|e| {
            EngineError::Load(format!(
                "Failed to create scratch directory {:?}: {}",
                scratch_dir, e
            ))
        })?;
        Ok(Self {
            scratch_dir,
            max_bytes,
        })
    }

    /// Download the weights for a validated hub path
    pub async fn download(&self, fetcher: &MetadataFetcher, path: &str) -> EngineResult<Artifact> {
        let url = fetcher.resolve(path, WEIGHTS_FILE)?;

        let mut request = fetcher.client().get(url);
        if let Some(token) = fetcher.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EngineError::Network(format!(
                "Weights fetch for {} returned {}",
                path,
                response.status()
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.len() > self.max_bytes {
            return Err(EngineError::Load(format!(
                "Artifact size {} exceeds maximum {}",
                bytes.len(),
                self.max_bytes
            )));
        }

        let checksum = compute_checksum(&bytes);
        let file_path = self
            .scratch_dir
            .join(format!("{}.onnx", path.replace('/', "_")));
        save_atomic(&file_path, &bytes)?;

        info!(
            path = %path,
            size = bytes.len(),
            checksum = %checksum,
            "Model artifact downloaded"
        );

        Ok(Artifact {
            bytes,
            checksum,
            path: file_path,
        })
    }

    /// Remove all scratch artifacts, keeping the directory usable for
    /// subsequent downloads
    pub fn cleanup(&self) {
        let entries = match fs::read_dir(&self.scratch_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.scratch_dir.display(), error = %e, "Scratch cleanup failed");
                return;
            }
        };
        for entry in entries.flatten() {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove scratch file");
            }
        }
    }
}

/// Write bytes to a temp file then rename into place
fn save_atomic(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)
        .map_err(|e| EngineError::Load(format!("Failed to create {:?}: {}", temp_path, e)))?;
    file.write_all(bytes)
        .and_then(|_| file.sync_all())
        .map_err(|e| EngineError::Load(format!("Failed to write artifact: {}", e)))?;
    fs::rename(&temp_path, path)
        .map_err(|e| EngineError::Load(format!("Failed to rename artifact into place: {}", e)))?;
    Ok(())
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
