//! Nested folder tree describing how uploaded files were organised on the
//! client.
//!
//! A [`FolderStructure`] is an ordered map from folder name to
//! [`FolderNode`]. Key order is the order in which folders were first seen
//! and survives a round trip through JSON text; it serialises as a plain
//! JSON object. Stores that normalise objects (Postgres `jsonb` sorts keys)
//! hand the tree back in their own key order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use casehub_core::config::FolderMergeStrategy;

use crate::staged::StagedFile;

/// One folder in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Files placed directly in this folder.
    #[serde(default)]
    pub files: Vec<StagedFile>,
    /// Child folders.
    #[serde(default)]
    pub folders: FolderStructure,
}

impl FolderNode {
    /// Total number of files in this folder and all descendants.
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .folders
                .iter()
                .map(|(_, child)| child.file_count())
                .sum::<usize>()
    }

    fn merge_deep(&mut self, incoming: FolderNode) {
        for file in incoming.files {
            if !self.files.iter().any(|f| f.id == file.id) {
                self.files.push(file);
            }
        }
        self.folders.merge_deep(incoming.folders);
    }
}

/// Ordered mapping of folder name to [`FolderNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderStructure {
    entries: Vec<(String, FolderNode)>,
}

impl FolderStructure {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tree has no top-level folders.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of top-level folders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up a top-level folder.
    pub fn get(&self, name: &str) -> Option<&FolderNode> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Top-level folder names in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over `(name, node)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FolderNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace a folder. A replaced folder keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, node: FolderNode) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((name, node)),
        }
    }

    /// Get a folder by name, appending an empty one if it does not exist.
    pub fn entry(&mut self, name: &str) -> &mut FolderNode {
        let idx = match self.entries.iter().position(|(k, _)| k == name) {
            Some(idx) => idx,
            None => {
                self.entries.push((name.to_string(), FolderNode::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Merge `incoming` into this tree using the given strategy.
    pub fn merge(&mut self, incoming: FolderStructure, strategy: FolderMergeStrategy) {
        match strategy {
            FolderMergeStrategy::Shallow => self.merge_shallow(incoming),
            FolderMergeStrategy::Deep => self.merge_deep(incoming),
        }
    }

    /// Top-level merge: incoming keys overwrite same-named keys, new keys
    /// are appended.
    pub fn merge_shallow(&mut self, incoming: FolderStructure) {
        for (name, node) in incoming.entries {
            self.insert(name, node);
        }
    }

    /// Recursive merge: same-named folders are merged level by level and
    /// files are unioned by id.
    pub fn merge_deep(&mut self, incoming: FolderStructure) {
        for (name, node) in incoming.entries {
            self.entry(&name).merge_deep(node);
        }
    }
}

impl Serialize for FolderStructure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FolderStructure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StructureVisitor;

        impl<'de> Visitor<'de> for StructureVisitor {
            type Value = FolderStructure;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of folder name to folder node")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut structure = FolderStructure::new();
                while let Some((name, node)) = access.next_entry::<String, FolderNode>()? {
                    structure.insert(name, node);
                }
                Ok(structure)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(FolderStructure::new())
            }
        }

        deserializer.deserialize_any(StructureVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_core::types::FileRecordId;
    use chrono::Utc;

    fn file(name: &str) -> StagedFile {
        StagedFile {
            id: FileRecordId::new(),
            name: name.into(),
            staging_path: format!("_staging/u/{name}"),
            relative_path: String::new(),
            folder_path: String::new(),
            size: 1,
            mime_type: "application/dicom".into(),
            uploaded_at: Utc::now(),
        }
    }

    fn node_with(files: Vec<StagedFile>) -> FolderNode {
        FolderNode {
            files,
            folders: FolderStructure::new(),
        }
    }

    #[test]
    fn test_json_preserves_insertion_order() {
        let mut tree = FolderStructure::new();
        tree.insert("zeta", FolderNode::default());
        tree.insert("alpha", FolderNode::default());
        tree.insert("mid", FolderNode::default());

        let json = serde_json::to_string(&tree).expect("serialize");
        let back: FolderStructure = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_null_deserializes_to_empty() {
        let tree: FolderStructure = serde_json::from_str("null").expect("deserialize");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_shallow_merge_overwrites_top_level() {
        let mut existing = FolderStructure::new();
        let mut study = node_with(vec![file("a.dcm")]);
        study.folders.insert("series1", node_with(vec![file("b.dcm")]));
        existing.insert("study", study);
        existing.insert("other", node_with(vec![file("c.dcm")]));

        let mut incoming = FolderStructure::new();
        let mut study2 = node_with(vec![]);
        study2.folders.insert("series2", node_with(vec![file("d.dcm")]));
        incoming.insert("study", study2);
        incoming.insert("new", FolderNode::default());

        existing.merge(incoming, FolderMergeStrategy::Shallow);

        assert_eq!(existing.keys().collect::<Vec<_>>(), vec!["study", "other", "new"]);
        let study = existing.get("study").expect("study");
        assert!(study.folders.get("series1").is_none());
        assert!(study.folders.get("series2").is_some());
        assert!(study.files.is_empty());
    }

    #[test]
    fn test_deep_merge_unions_nested_folders() {
        let shared = file("a.dcm");
        let mut existing = FolderStructure::new();
        let mut study = node_with(vec![shared.clone()]);
        study.folders.insert("series1", node_with(vec![file("b.dcm")]));
        existing.insert("study", study);

        let mut incoming = FolderStructure::new();
        let mut study2 = node_with(vec![shared, file("e.dcm")]);
        study2.folders.insert("series2", node_with(vec![file("d.dcm")]));
        incoming.insert("study", study2);

        existing.merge(incoming, FolderMergeStrategy::Deep);

        let study = existing.get("study").expect("study");
        assert_eq!(study.files.len(), 2);
        assert_eq!(study.folders.keys().collect::<Vec<_>>(), vec!["series1", "series2"]);
        assert_eq!(study.file_count(), 4);
    }
}
