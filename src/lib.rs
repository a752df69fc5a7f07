//! Export engine for the RVCE sports registration portal.
//!
//! Turns a filtered set of student submissions into downloadable documents:
//! a flat spreadsheet listing, or the five-row-per-student proforma required
//! for inter-collegiate eligibility, each available as XLSX or PDF.
//!
//! The entry point is [`export::build_document`]; [`client`] provides the
//! paged submissions fetch for the CLI.

pub mod client;
pub mod export;
pub mod letterhead;
pub mod model;

pub use export::{build_document, DocumentFormat, DocumentVariant, ExportError, GeneratedDocument};
pub use letterhead::LetterheadConfig;
pub use model::{ExportFilter, StudentRecord, SubmissionStatus};
