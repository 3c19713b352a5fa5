//! # casehub-storage
//!
//! Filesystem side of the ingestion pipeline: the local storage provider
//! rooted at the configured storage directory, the DICOM signature check,
//! and file moves with best-effort cleanup of emptied directories.

pub mod providers;
pub mod signature;
pub mod transfer;

pub use providers::LocalStorageProvider;
pub use signature::{is_dicom, requires_signature};
pub use transfer::{CleanupOutcome, MoveMethod, MoveOutcome, move_file, remove_empty_dirs};
