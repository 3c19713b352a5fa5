//! Case lifecycle around the ingestion pipeline.

pub mod service;

pub use service::CaseService;
