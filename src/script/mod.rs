//! Workbook script language
//!
//! Models are asked to describe a spreadsheet as a short line-oriented
//! script instead of host-language code. Each line is one statement from a
//! fixed allow-list; the interpreter in [`crate::executor`] turns the parsed
//! statements into a workbook and renders it with rust_xlsxwriter.
//!
//! ```text
//! import workbook
//! import styles
//! workbook wb
//! sheet wb "Expenses"
//! style header bold font_color=#FFFFFF fill=#1F4E78
//! write A1 "Amount" header
//! write A2 12.5
//! formula A3 "=SUM(A2:A2)"
//! save wb output_buffer
//! ```

pub mod ast;
pub mod cell;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod render;

pub use ast::{Capability, ScriptLine, Statement, StyleSpec, Value};
pub use cell::{CellRef, RangeRef};
pub use model::{SheetModel, WorkbookModel};
pub use parser::{parse_line, parse_script};
pub use render::render_workbook;

/// Fault raised while parsing or running a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFault {
    /// 1-based source line
    pub line: usize,
    pub message: String,
}

impl ScriptFault {
    /// Fault tied to a source line
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScriptFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptFault {}
