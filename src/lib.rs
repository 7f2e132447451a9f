pub mod ann;
pub mod error;
pub mod report;
pub mod snpeff;
pub mod validate;

pub use error::{ReportError, SnpeffError, ValidateError};
