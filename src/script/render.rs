//! Render a workbook model to `.xlsx` bytes with rust_xlsxwriter

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline, Formula, Workbook, Worksheet};

use crate::error::Result;
use crate::script::ast::{Align, Border, StyleSpec, Value};
use crate::script::model::{CellContent, SheetModel, WorkbookModel};

/// Render the model into an in-memory `.xlsx` file
pub fn render_workbook(model: &WorkbookModel) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in &model.sheets {
        let worksheet = workbook.add_worksheet();
        render_sheet(worksheet, sheet)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn render_sheet(worksheet: &mut Worksheet, sheet: &SheetModel) -> Result<()> {
    worksheet.set_name(&sheet.title)?;

    for (&col, &width) in &sheet.widths {
        worksheet.set_column_width(col, width)?;
    }
    for (&row, &height) in &sheet.heights {
        worksheet.set_row_height(row, height)?;
    }

    for (cell, entry) in &sheet.cells {
        let (row, col) = (cell.row, cell.col);
        let format = entry.style.as_ref().map(to_format);

        match (&entry.content, &format) {
            (CellContent::Value(Value::Text(text)), Some(f)) => {
                worksheet.write_string_with_format(row, col, text, f)?;
            }
            (CellContent::Value(Value::Text(text)), None) => {
                worksheet.write_string(row, col, text)?;
            }
            (CellContent::Value(Value::Number(n)), Some(f)) => {
                worksheet.write_number_with_format(row, col, *n, f)?;
            }
            (CellContent::Value(Value::Number(n)), None) => {
                worksheet.write_number(row, col, *n)?;
            }
            (CellContent::Value(Value::Bool(b)), Some(f)) => {
                worksheet.write_boolean_with_format(row, col, *b, f)?;
            }
            (CellContent::Value(Value::Bool(b)), None) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            (CellContent::Formula(expr), Some(f)) => {
                worksheet.write_formula_with_format(row, col, Formula::new(expr), f)?;
            }
            (CellContent::Formula(expr), None) => {
                worksheet.write_formula(row, col, Formula::new(expr))?;
            }
        }
    }

    for merge in &sheet.merges {
        let format = merge.style.as_ref().map(to_format).unwrap_or_else(Format::new);
        worksheet.merge_range(
            merge.range.first.row,
            merge.range.first.col,
            merge.range.last.row,
            merge.range.last.col,
            &merge.text,
            &format,
        )?;
    }

    if let Some(cell) = sheet.freeze {
        worksheet.set_freeze_panes(cell.row, cell.col)?;
    }

    if let Some(range) = sheet.filter {
        worksheet.autofilter(range.first.row, range.first.col, range.last.row, range.last.col)?;
    }

    Ok(())
}

/// Translate a style into an xlsx cell format
pub fn to_format(spec: &StyleSpec) -> Format {
    let mut format = Format::new();

    if spec.bold {
        format = format.set_bold();
    }
    if spec.italic {
        format = format.set_italic();
    }
    if spec.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if spec.wrap {
        format = format.set_text_wrap();
    }
    if let Some(size) = spec.font_size {
        format = format.set_font_size(size);
    }
    if let Some(rgb) = spec.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    if let Some(rgb) = spec.fill {
        format = format.set_background_color(Color::RGB(rgb));
    }
    if let Some(align) = spec.align {
        format = format.set_align(match align {
            Align::Left => FormatAlign::Left,
            Align::Center => FormatAlign::Center,
            Align::Right => FormatAlign::Right,
        });
    }
    if let Some(border) = spec.border {
        format = format.set_border(match border {
            Border::Thin => FormatBorder::Thin,
            Border::Medium => FormatBorder::Medium,
            Border::Thick => FormatBorder::Thick,
        });
    }
    if let Some(num_format) = &spec.num_format {
        format = format.set_num_format(num_format);
    }

    format
}
