//! Builds a nested folder tree from the flat relative paths of a batch.

use casehub_entity::{FolderStructure, StagedFile};

/// Build the folder tree for a batch of staged files.
///
/// Every segment of a file's relative path except the last becomes a nested
/// folder and the file is listed under the deepest one. Files without a
/// folder component are loose files and do not appear in the tree. Sibling
/// folders keep the order in which they were first seen.
pub fn resolve(files: &[StagedFile]) -> FolderStructure {
    let mut tree = FolderStructure::new();

    for file in files {
        let segments: Vec<&str> = file
            .relative_path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let Some((_, folders)) = segments.split_last() else {
            continue;
        };
        let Some((first, rest)) = folders.split_first() else {
            continue;
        };

        let mut node = tree.entry(first);
        for segment in rest {
            node = node.folders.entry(segment);
        }
        node.files.push(file.clone());
    }

    tree
}
