//! # casehub-entity
//!
//! Domain entity models for CaseHub. Every struct in this crate represents
//! a persisted record or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize` and `Deserialize`; JSON field names follow
//! the camelCase convention used by the web client.

pub mod case;
pub mod folder;
pub mod staged;

pub use case::{Case, CaseFileRecord, CaseStatus, CreateCase, Gender};
pub use folder::{FolderNode, FolderStructure};
pub use staged::StagedFile;
