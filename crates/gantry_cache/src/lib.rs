//! Persisted build state: fingerprints, declaration metadata, and artifacts.
//!
//! This crate owns everything gantry remembers between compile invocations.
//! The build manifest records what each file looked like and declared at its
//! last successful compile; the artifact store holds one JSON file per
//! declaration. Change detection compares fresh fingerprints against the
//! manifest without parsing anything.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod fingerprint;
pub mod manifest;

pub use artifact::{unix_millis_now, Artifact, ArtifactStore};
pub use error::CacheError;
pub use fingerprint::{ChangeSet, Fingerprint, FingerprintKind, SourceScanner};
pub use manifest::{BuildManifest, DeclarationRecord, FileRecord, MANIFEST_FILE};
