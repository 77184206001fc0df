//! Spreadsheet import for Library Desk.
//!
//! Fetches the published CSV export of the registration form and turns each
//! usable row into a candidate [`library_engine::Student`]. Column names in
//! those exports drift, so fields are located by [`FieldMatcher`]: exact
//! header names first, then a guarded substring match.

mod matcher;
mod parse;
mod source;

pub use matcher::{FieldMatcher, Row, StudentField};
pub use parse::{parse_registration_date, parse_students, FEE_PERIOD_DAYS, MISSING_PARENT_NAME};
pub use source::{cache_busted, CsvImportSource};
