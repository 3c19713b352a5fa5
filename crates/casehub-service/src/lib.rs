//! # casehub-service
//!
//! The case file-ingestion pipeline. Each service orchestrates the case
//! repository and the storage provider to implement one step: staging
//! uploads, resolving folder trees, keeping case folders, associating
//! staged files with a case, and removing them again.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod case;
pub mod context;
pub mod file;
pub mod folder;

pub use case::CaseService;
pub use context::RequestContext;
pub use file::{
    AppliedFile, AssociationReport, AssociationService, Placement, RemovalService, SkipReason,
    SkippedFile, StagingReport, StagingService, UploadedFile,
};
pub use folder::{CaseFolderManager, resolve};

#[cfg(test)]
pub(crate) mod test_support;
