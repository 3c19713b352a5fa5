//! Staged (uploaded but not yet associated) files.

pub mod model;

pub use model::StagedFile;
