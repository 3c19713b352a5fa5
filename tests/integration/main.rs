//! HTTP-level integration tests driving the router in-process.

mod case_test;
mod file_test;
mod helpers;
