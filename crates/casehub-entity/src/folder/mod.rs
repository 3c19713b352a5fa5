//! Folder tree value objects.

pub mod structure;

pub use structure::{FolderNode, FolderStructure};
