//! HTTP request handlers.

pub mod case;
pub mod file;
pub mod health;
