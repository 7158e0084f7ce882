// Utility modules for the scam check service

pub mod check_errors;

pub use check_errors::{CheckError, CheckErrorResponse, CheckResult};
