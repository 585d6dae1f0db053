//! sheetwright - plain-language spreadsheet requests in, `.xlsx` files out
//!
//! A generation backend writes a short workbook script for the request. The
//! script is extracted from the raw output, stripped of deny-listed lines,
//! and run by an allow-list interpreter. Faults are fed back into the prompt
//! for a bounded number of repair attempts.

pub mod artifact;
pub mod error;
pub mod executor;
pub mod llm;
pub mod program;
pub mod prompt;
pub mod repair;
pub mod script;

pub use error::{Result, SheetwrightError};
