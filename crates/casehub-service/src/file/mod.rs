//! File ingestion: staging uploads, associating them with cases, removal.

pub mod association;
pub mod removal;
pub mod staging;

pub use association::{
    AppliedFile, AssociationReport, AssociationService, Placement, SkipReason, SkippedFile,
};
pub use removal::RemovalService;
pub use staging::{StagingReport, StagingService, UploadedFile};
