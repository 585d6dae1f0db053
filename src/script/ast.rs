//! Statements of the workbook script language

use std::fmt;

use crate::script::cell::{CellRef, RangeRef};

/// Capability groups a script must import before using their statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// workbook, sheet, write, formula, save
    Workbook,
    /// style
    Styles,
    /// merge, width, height, freeze, filter
    Layout,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Workbook, Capability::Styles, Capability::Layout];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Workbook => "workbook",
            Capability::Styles => "styles",
            Capability::Layout => "layout",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Literal cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    Thin,
    Medium,
    Thick,
}

/// Resolved cell formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSpec {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub wrap: bool,
    pub font_size: Option<f64>,
    /// 0xRRGGBB
    pub font_color: Option<u32>,
    /// 0xRRGGBB
    pub fill: Option<u32>,
    pub align: Option<Align>,
    pub border: Option<Border>,
    pub num_format: Option<String>,
}

/// One parsed script statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Import(Capability),
    Workbook {
        name: String,
    },
    Sheet {
        workbook: String,
        title: String,
    },
    Style {
        name: String,
        spec: StyleSpec,
    },
    Write {
        cell: CellRef,
        value: Value,
        style: Option<String>,
    },
    Formula {
        cell: CellRef,
        expr: String,
        style: Option<String>,
    },
    Merge {
        range: RangeRef,
        text: String,
        style: Option<String>,
    },
    Width {
        col: u16,
        width: f64,
    },
    Height {
        row: u32,
        height: f64,
    },
    Freeze {
        cell: CellRef,
    },
    Filter {
        range: RangeRef,
    },
    Save {
        workbook: String,
        target: String,
    },
}

impl Statement {
    /// Capability that must be imported before this statement runs
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Statement::Import(_) => None,
            Statement::Workbook { .. }
            | Statement::Sheet { .. }
            | Statement::Write { .. }
            | Statement::Formula { .. }
            | Statement::Save { .. } => Some(Capability::Workbook),
            Statement::Style { .. } => Some(Capability::Styles),
            Statement::Merge { .. }
            | Statement::Width { .. }
            | Statement::Height { .. }
            | Statement::Freeze { .. }
            | Statement::Filter { .. } => Some(Capability::Layout),
        }
    }

    /// Keyword that introduces this statement
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::Import(_) => "import",
            Statement::Workbook { .. } => "workbook",
            Statement::Sheet { .. } => "sheet",
            Statement::Style { .. } => "style",
            Statement::Write { .. } => "write",
            Statement::Formula { .. } => "formula",
            Statement::Merge { .. } => "merge",
            Statement::Width { .. } => "width",
            Statement::Height { .. } => "height",
            Statement::Freeze { .. } => "freeze",
            Statement::Filter { .. } => "filter",
            Statement::Save { .. } => "save",
        }
    }
}

/// A statement with its 1-based source line
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub number: usize,
    pub statement: Statement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_parse() {
        assert_eq!(Capability::parse("workbook"), Some(Capability::Workbook));
        assert_eq!(Capability::parse("styles"), Some(Capability::Styles));
        assert_eq!(Capability::parse("layout"), Some(Capability::Layout));
        assert_eq!(Capability::parse("conditional"), None);
    }

    #[test]
    fn test_statement_capability() {
        let style = Statement::Style {
            name: "header".into(),
            spec: StyleSpec::default(),
        };
        assert_eq!(style.capability(), Some(Capability::Styles));
        assert_eq!(Statement::Import(Capability::Layout).capability(), None);
        assert_eq!(
            Statement::Freeze {
                cell: CellRef::new(1, 0)
            }
            .capability(),
            Some(Capability::Layout)
        );
    }

    #[test]
    fn test_statement_keyword() {
        let save = Statement::Save {
            workbook: "wb".into(),
            target: "output_buffer".into(),
        };
        assert_eq!(save.keyword(), "save");
    }
}
