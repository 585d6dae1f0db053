//! In-memory workbook built up by a script before it is rendered

use std::collections::BTreeMap;

use crate::script::ast::{StyleSpec, Value};
use crate::script::cell::{CellRef, RangeRef};

/// Characters Excel refuses in sheet titles
const FORBIDDEN_TITLE_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

const MAX_TITLE_LEN: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Value(Value),
    Formula(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellEntry {
    pub content: CellContent,
    pub style: Option<StyleSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRange {
    pub range: RangeRef,
    pub text: String,
    pub style: Option<StyleSpec>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetModel {
    pub title: String,
    pub cells: BTreeMap<CellRef, CellEntry>,
    pub merges: Vec<MergedRange>,
    pub widths: BTreeMap<u16, f64>,
    pub heights: BTreeMap<u32, f64>,
    pub freeze: Option<CellRef>,
    pub filter: Option<RangeRef>,
}

impl SheetModel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set a cell; later writes to the same cell win
    pub fn set_cell(&mut self, cell: CellRef, content: CellContent, style: Option<StyleSpec>) {
        self.cells.insert(cell, CellEntry { content, style });
    }

    pub fn add_merge(&mut self, range: RangeRef, text: String, style: Option<StyleSpec>) -> Result<(), String> {
        if let Some(existing) = self.merges.iter().find(|m| overlaps(&m.range, &range)) {
            return Err(format!("merge {} overlaps earlier merge {}", range, existing.range));
        }
        self.merges.push(MergedRange { range, text, style });
        Ok(())
    }
}

fn overlaps(a: &RangeRef, b: &RangeRef) -> bool {
    a.first.row <= b.last.row && b.first.row <= a.last.row && a.first.col <= b.last.col && b.first.col <= a.last.col
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookModel {
    pub sheets: Vec<SheetModel>,
}

impl WorkbookModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet and return its index
    pub fn add_sheet(&mut self, title: &str) -> Result<usize, String> {
        validate_title(title)?;
        if self
            .sheets
            .iter()
            .any(|s| s.title.eq_ignore_ascii_case(title))
        {
            return Err(format!("a sheet named \"{}\" already exists", title));
        }
        self.sheets.push(SheetModel::new(title));
        Ok(self.sheets.len() - 1)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut SheetModel> {
        self.sheets.get_mut(index)
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("sheet title must not be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("sheet title \"{}\" is longer than {} characters", title, MAX_TITLE_LEN));
    }
    if let Some(c) = title.chars().find(|c| FORBIDDEN_TITLE_CHARS.contains(c)) {
        return Err(format!("sheet title \"{}\" contains the forbidden character '{}'", title, c));
    }
    if title.starts_with('\'') || title.ends_with('\'') {
        return Err(format!("sheet title \"{}\" must not start or end with an apostrophe", title));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sheet() {
        let mut wb = WorkbookModel::new();
        assert_eq!(wb.add_sheet("Expenses").unwrap(), 0);
        assert_eq!(wb.add_sheet("Summary").unwrap(), 1);
        assert_eq!(wb.sheets.len(), 2);
    }

    #[test]
    fn test_duplicate_sheet_title() {
        let mut wb = WorkbookModel::new();
        wb.add_sheet("Data").unwrap();
        let err = wb.add_sheet("data").unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn test_sheet_title_rules() {
        let mut wb = WorkbookModel::new();
        assert!(wb.add_sheet("").is_err());
        assert!(wb.add_sheet("Q1/Q2").is_err());
        assert!(wb.add_sheet(&"x".repeat(32)).is_err());
        assert!(wb.add_sheet("'quoted'").is_err());
        assert!(wb.add_sheet(&"x".repeat(31)).is_ok());
    }

    #[test]
    fn test_set_cell_overwrites() {
        let mut sheet = SheetModel::new("S");
        let cell = CellRef::new(0, 0);
        sheet.set_cell(cell, CellContent::Value(Value::Number(1.0)), None);
        sheet.set_cell(cell, CellContent::Formula("=1+1".into()), None);
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[&cell].content, CellContent::Formula("=1+1".into()));
    }

    #[test]
    fn test_overlapping_merges_rejected() {
        let mut sheet = SheetModel::new("S");
        sheet
            .add_merge(RangeRef::parse("A1:D1").unwrap(), "Title".into(), None)
            .unwrap();
        assert!(
            sheet
                .add_merge(RangeRef::parse("C1:E2").unwrap(), "Other".into(), None)
                .is_err()
        );
        assert!(
            sheet
                .add_merge(RangeRef::parse("A2:D2").unwrap(), "Sub".into(), None)
                .is_ok()
        );
    }
}
