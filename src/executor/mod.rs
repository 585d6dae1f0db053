//! Executor - runs a candidate program and reports what it produced
//!
//! The candidate is parsed as a workbook script and interpreted statement by
//! statement against a fresh [`Namespace`]. The run succeeds only if every
//! statement succeeds and `output_buffer` ends up bound to saved `.xlsx`
//! bytes. Nothing outside the statement allow-list can run.

mod namespace;

use std::collections::HashSet;

use crate::artifact::Artifact;
use crate::program::CandidateProgram;
use crate::script::{Capability, ScriptFault, ScriptLine, Statement, StyleSpec, parse_script, render_workbook};
use crate::script::model::{CellContent, SheetModel};

pub use namespace::{Binding, Namespace};

/// Reserved variable that carries the finished workbook out of a script
pub const OUTPUT_VARIABLE: &str = "output_buffer";

/// Diagnostic used when a script runs cleanly but never saves its output
pub const MISSING_OUTPUT_DIAGNOSTIC: &str =
    "the script finished without binding `output_buffer`; end it with `save wb output_buffer`";

/// Result of executing one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success(Artifact),
    Failure(String),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }
}

/// Something that can turn a candidate program into an artifact
pub trait ProgramExecutor: Send + Sync {
    fn execute(&self, candidate: &CandidateProgram) -> ExecutionOutcome;
}

/// Interprets workbook scripts
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptExecutor;

impl ScriptExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ProgramExecutor for ScriptExecutor {
    fn execute(&self, candidate: &CandidateProgram) -> ExecutionOutcome {
        let lines = match parse_script(candidate.as_str()) {
            Ok(lines) => lines,
            Err(fault) => return ExecutionOutcome::Failure(fault.to_string()),
        };
        log::debug!("Executing script with {} statements", lines.len());

        let mut interpreter = Interpreter::new();
        if let Err(fault) = interpreter.run(&lines) {
            return ExecutionOutcome::Failure(fault.to_string());
        }

        match interpreter.namespace.take_buffer(OUTPUT_VARIABLE) {
            Some(Ok(bytes)) => ExecutionOutcome::Success(Artifact::new(bytes)),
            Some(Err(kind)) => ExecutionOutcome::Failure(format!(
                "`{}` is bound to {}, not a saved buffer; end the script with `save wb {}`",
                OUTPUT_VARIABLE, kind, OUTPUT_VARIABLE
            )),
            None => ExecutionOutcome::Failure(MISSING_OUTPUT_DIAGNOSTIC.to_string()),
        }
    }
}

/// Per-run interpreter state
struct Interpreter {
    namespace: Namespace,
    imported: HashSet<Capability>,
    /// Workbook name and sheet index that cell statements write to
    active: Option<(String, usize)>,
}

impl Interpreter {
    fn new() -> Self {
        Self {
            namespace: Namespace::new(),
            imported: HashSet::new(),
            active: None,
        }
    }

    fn run(&mut self, lines: &[ScriptLine]) -> Result<(), ScriptFault> {
        for line in lines {
            self.step(&line.statement)
                .map_err(|message| ScriptFault::at(line.number, message))?;
        }
        Ok(())
    }

    fn step(&mut self, statement: &Statement) -> Result<(), String> {
        if let Some(capability) = statement.capability() {
            if !self.imported.contains(&capability) {
                return Err(format!(
                    "`{}` requires `import {}` at the top of the script",
                    statement.keyword(),
                    capability
                ));
            }
        }

        match statement {
            Statement::Import(capability) => {
                self.imported.insert(*capability);
            }
            Statement::Workbook { name } => {
                if self.active.as_ref().is_some_and(|(wb, _)| wb == name) {
                    self.active = None;
                }
                self.namespace
                    .bind(name.clone(), Binding::Workbook(Default::default()));
            }
            Statement::Sheet { workbook, title } => {
                let index = self.namespace.workbook_mut(workbook)?.add_sheet(title)?;
                self.active = Some((workbook.clone(), index));
            }
            Statement::Style { name, spec } => {
                self.namespace.bind(name.clone(), Binding::Style(spec.clone()));
            }
            Statement::Write { cell, value, style } => {
                let style = self.resolve_style(style.as_deref())?;
                self.active_sheet()?
                    .set_cell(*cell, CellContent::Value(value.clone()), style);
            }
            Statement::Formula { cell, expr, style } => {
                let style = self.resolve_style(style.as_deref())?;
                self.active_sheet()?
                    .set_cell(*cell, CellContent::Formula(expr.clone()), style);
            }
            Statement::Merge { range, text, style } => {
                let style = self.resolve_style(style.as_deref())?;
                self.active_sheet()?.add_merge(*range, text.clone(), style)?;
            }
            Statement::Width { col, width } => {
                self.active_sheet()?.widths.insert(*col, *width);
            }
            Statement::Height { row, height } => {
                self.active_sheet()?.heights.insert(*row, *height);
            }
            Statement::Freeze { cell } => {
                self.active_sheet()?.freeze = Some(*cell);
            }
            Statement::Filter { range } => {
                self.active_sheet()?.filter = Some(*range);
            }
            Statement::Save { workbook, target } => {
                let model = self.namespace.workbook(workbook)?;
                if model.sheets.is_empty() {
                    return Err(format!(
                        "workbook '{}' has no sheets; add `sheet {} \"Sheet1\"` before saving",
                        workbook, workbook
                    ));
                }
                let bytes = render_workbook(model).map_err(|e| e.to_string())?;
                self.namespace.bind(target.clone(), Binding::Buffer(bytes));
            }
        }

        Ok(())
    }

    fn resolve_style(&self, name: Option<&str>) -> Result<Option<StyleSpec>, String> {
        name.map(|n| self.namespace.style(n).cloned()).transpose()
    }

    fn active_sheet(&mut self) -> Result<&mut SheetModel, String> {
        let (workbook, index) = self
            .active
            .clone()
            .ok_or_else(|| "no active sheet; add `sheet wb \"Sheet1\"` first".to_string())?;
        self.namespace
            .workbook_mut(&workbook)?
            .sheet_mut(index)
            .ok_or_else(|| format!("active sheet of '{}' no longer exists", workbook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r##"import workbook
import styles
import layout
workbook wb
sheet wb "Expenses"
style header bold font_color=#FFFFFF fill=#1F4E78 align=center
style money num_format="$#,##0.00"
write A1 "Date" header
write B1 "Category" header
write C1 "Amount" header
write A2 "2025-01-03"
write B2 "Food"
write C2 12.5 money
write A3 "2025-01-04"
write B3 "Transport"
write C3 30 money
write B4 "Total" header
formula C4 "=SUM(C2:C3)" money
width A 14
freeze A2
filter A1:C3
save wb output_buffer"##;

    fn run(script: &str) -> ExecutionOutcome {
        ScriptExecutor::new().execute(&CandidateProgram::from(script))
    }

    fn fault(script: &str) -> String {
        match run(script) {
            ExecutionOutcome::Failure(fault) => fault,
            ExecutionOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_valid_script_produces_xlsx() {
        match run(VALID) {
            ExecutionOutcome::Success(artifact) => {
                assert!(!artifact.is_empty());
                assert_eq!(&artifact.as_bytes()[..2], b"PK");
            }
            ExecutionOutcome::Failure(fault) => panic!("unexpected fault: {}", fault),
        }
    }

    #[test]
    fn test_missing_output_variable() {
        let script = "import workbook\nworkbook wb\nsheet wb \"S\"\nwrite A1 1";
        assert_eq!(fault(script), MISSING_OUTPUT_DIAGNOSTIC);
    }

    #[test]
    fn test_saved_under_other_name_is_missing_output() {
        let script = "import workbook\nworkbook wb\nsheet wb \"S\"\nsave wb result";
        assert_eq!(fault(script), MISSING_OUTPUT_DIAGNOSTIC);
    }

    #[test]
    fn test_output_bound_to_workbook() {
        let script = "import workbook\nworkbook output_buffer\nsheet output_buffer \"S\"";
        let fault = fault(script);
        assert!(fault.contains("bound to a workbook"));
        assert_ne!(fault, MISSING_OUTPUT_DIAGNOSTIC);
    }

    #[test]
    fn test_missing_import() {
        let script = "import workbook\nworkbook wb\nsheet wb \"S\"\nstyle h bold";
        assert_eq!(fault(script), "line 4: `style` requires `import styles` at the top of the script");
    }

    #[test]
    fn test_undefined_workbook() {
        let fault = fault("import workbook\nsheet book \"S\"");
        assert!(fault.starts_with("line 2:"));
        assert!(fault.contains("'book' is not defined"));
    }

    #[test]
    fn test_write_before_sheet() {
        let fault = fault("import workbook\nworkbook wb\nwrite A1 1");
        assert!(fault.contains("no active sheet"));
    }

    #[test]
    fn test_undefined_style() {
        let fault = fault("import workbook\nimport styles\nworkbook wb\nsheet wb \"S\"\nwrite A1 1 money");
        assert!(fault.contains("style 'money' is not defined"));
    }

    #[test]
    fn test_save_without_sheets() {
        let fault = fault("import workbook\nworkbook wb\nsave wb output_buffer");
        assert!(fault.contains("has no sheets"));
    }

    #[test]
    fn test_parse_error_reported_before_running() {
        let fault = fault("import workbook\nworkbook wb\nsave wb \"out.xlsx\"");
        assert!(fault.starts_with("line 3:"));
        assert!(fault.contains("not permitted"));
    }

    #[test]
    fn test_out_of_range_layout_faults() {
        let tall = "import workbook\nimport layout\nworkbook wb\nsheet wb \"S\"\nheight 1 100000\nsave wb output_buffer";
        let fault = fault(tall);
        assert!(fault.starts_with("line 5:"));
        assert!(fault.contains("at most 409"));

        let huge_font = "import workbook\nimport styles\nworkbook wb\nsheet wb \"S\"\nstyle s font_size=1e300\nsave wb output_buffer";
        assert!(self::fault(huge_font).starts_with("line 5:"));
    }

    #[test]
    fn test_non_script_text() {
        let fault = fault("I'm sorry, I can't do that.");
        assert!(fault.contains("unknown statement"));
    }

    #[test]
    fn test_multiple_sheets_switch_active() {
        let script = "import workbook\nworkbook wb\nsheet wb \"One\"\nwrite A1 1\nsheet wb \"Two\"\nwrite A1 2\nsave wb output_buffer";
        assert!(run(script).is_success());
    }

    #[test]
    fn test_fresh_namespace_per_execution() {
        let executor = ScriptExecutor::new();
        assert!(executor.execute(&CandidateProgram::from(VALID)).is_success());

        // A second run that relies on names from the first must fail
        let dependent = "import workbook\nsave wb output_buffer";
        match executor.execute(&CandidateProgram::from(dependent)) {
            ExecutionOutcome::Failure(fault) => assert!(fault.contains("'wb' is not defined")),
            ExecutionOutcome::Success(_) => panic!("namespace leaked between runs"),
        }
    }
}
