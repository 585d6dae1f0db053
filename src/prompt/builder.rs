//! Prompt Builder - initial instruction text and repair feedback
//!
//! The instruction text is built once per request from the user's task and
//! then only ever grows: each failed attempt appends a feedback block.

use std::fmt;

use crate::executor::OUTPUT_VARIABLE;
use crate::program::{DENY_LIST, FENCE_OPEN};

/// Statement reference and hard rules for the script language
const RULES: &str = r##"RULES (all mandatory):
1. Imports: start the script with `import workbook`. Add `import styles` before any `style` line
   and `import layout` before any `merge`, `width`, `height`, `freeze` or `filter` line.
2. Workbook: create exactly one workbook with `workbook wb`, then add sheets with `sheet wb "Title"`.
3. Output: the only way to deliver the file is `save wb {output}` as the LAST line.
   The variable must be named exactly `{output}`.
4. Never save to a file path. `save wb "file.xlsx"` is forbidden.
5. Formulas: write every calculated cell as a live formula string with
   `formula <cell> "=..."`, for example `formula D12 "=SUM(D2:D11)"`.
   Never write the pre-computed number in its place.
6. Conditional formatting is not available. Do not use {denied}.
7. Output only the script, optionally wrapped in a {fence} ... ``` block. No explanations.

STATEMENTS:
  import <workbook|styles|layout>
  workbook <name>
  sheet <workbook> "<title>"             (becomes the active sheet)
  style <name> [bold] [italic] [underline] [wrap] [font_size=<1-409>] [font_color=#RRGGBB]
        [fill=#RRGGBB] [align=left|center|right] [border=thin|medium|thick] [num_format="<fmt>"]
  write <cell> <"text"|number|true|false> [<style>]
  formula <cell> "<=expression>" [<style>]
  merge <range> "<text>" [<style>]
  width <column> <n>                     (n at most 255)
  height <row> <n>                       (n at most 409 points)
  freeze <cell>
  filter <range>
  save <workbook> {output}

Cells use A1 notation (B7), ranges use A1:D1, columns use letters (C).
Text values must be double-quoted; use \" for a quote inside text.
Lines starting with # are comments."##;

/// Evolving prompt sent to the generation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionText(String);

impl InstructionText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append feedback about a failed attempt (the text never shrinks)
    pub fn append_failure(&mut self, attempt: u32, fault: &str) {
        self.0.push_str(&failure_block(attempt, fault));
    }
}

impl fmt::Display for InstructionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-format feedback block for one failed attempt
pub fn failure_block(attempt: u32, fault: &str) -> String {
    format!(
        "\n\n---\n## Attempt {} Failed\nThe previous script failed with this error:\n{}\nRewrite the COMPLETE script so this error cannot happen, and keep following every rule above.\n",
        attempt,
        fault.trim()
    )
}

/// Builds the initial instruction text for a task
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Pure; always succeeds
    pub fn build(&self, task: &str) -> InstructionText {
        let denied = DENY_LIST
            .iter()
            .map(|d| format!("`{}`", d))
            .collect::<Vec<_>>()
            .join(", ");

        let rules = RULES
            .replace("{output}", OUTPUT_VARIABLE)
            .replace("{denied}", &denied)
            .replace("{fence}", FENCE_OPEN);

        InstructionText(format!(
            "You are an expert spreadsheet author. Write a complete workbook script for this request:\n\"{}\"\n\n{}\n",
            task.trim(),
            rules
        ))
    }
}
