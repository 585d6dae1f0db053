//! Candidate programs: turning raw model output into script text
//!
//! - `extract` strips fences and leading prose
//! - `sanitize` drops lines that reference deny-listed statements

mod extract;
mod sanitize;

use std::fmt;

pub use extract::{FENCE_CLOSE, FENCE_OPEN, extract};
pub use sanitize::{DENY_LIST, Sanitized, sanitize, sanitize_report};

/// Extracted (and usually sanitized) script text for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateProgram(String);

impl CandidateProgram {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl fmt::Display for CandidateProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateProgram {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CandidateProgram {
    fn from(text: String) -> Self {
        Self(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_basics() {
        let program = CandidateProgram::from("import workbook\nworkbook wb");
        assert_eq!(program.line_count(), 2);
        assert!(!program.is_empty());
        assert_eq!(program.to_string(), "import workbook\nworkbook wb");
        assert!(CandidateProgram::new("  \n").is_empty());
    }
}
