//! Core type definitions used across the CaseHub workspace.

pub mod id;

pub use id::*;
