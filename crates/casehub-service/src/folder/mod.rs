//! Folder tree resolution and per-case folder management.

pub mod case_folder;
pub mod tree;

pub use case_folder::{CaseFolderManager, folder_name_for};
pub use tree::resolve;
