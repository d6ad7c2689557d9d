//! Model hub access
//!
//! This module provides:
//! - Trusted-source validation of hub paths
//! - Metadata fetching with fixed timeouts and optional token auth
//! - Artifact download with checksum validation and scratch storage

mod artifact;
mod metadata;
mod trust;

pub use artifact::{compute_checksum, Artifact, ArtifactStore, DEFAULT_MAX_ARTIFACT_BYTES};
pub use metadata::{MetadataFetcher, CONFIG_TIMEOUT, DEFAULT_HUB_URL, DOC_TIMEOUT, TOKEN_ENV};
pub use trust::{is_trusted, TRUSTED_PREFIXES};
