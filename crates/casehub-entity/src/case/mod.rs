//! Case domain entities.

pub mod file_record;
pub mod model;
pub mod status;

pub use file_record::CaseFileRecord;
pub use model::{Case, CreateCase};
pub use status::{CaseStatus, Gender};
