//! Company profile directory.
//!
//! Profiles live in a spreadsheet maintained by the listings team: a header
//! row naming columns, one row per company. [`SheetDirectory`] fetches and
//! validates rows over the Sheets values API; [`MemoryDirectory`] serves
//! fixed profiles in tests. Validation is strict at this boundary so the
//! reply pipeline never sees a half-filled record.

pub mod error;
pub mod lookup;
pub mod profile;
pub mod sheet;

pub use {
    error::{Error, Result},
    lookup::{MemoryDirectory, ProfileDirectory},
    profile::{CompanyDetails, CompanyProfile, columns},
    sheet::SheetDirectory,
};
