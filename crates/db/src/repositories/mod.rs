//! Repository abstractions for data access.
//!
//! Repositories hide statement binding and row decoding from the HTTP layer.

pub mod report;

pub use report::ReportRepository;
