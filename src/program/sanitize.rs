//! Drop lines that use the banned conditional-formatting group

use crate::program::CandidateProgram;

/// Substrings that mark a line as using conditional formatting
pub const DENY_LIST: [&str; 3] = ["conditional_format", "color_scale", "data_bar"];

/// Outcome of a sanitize pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub program: CandidateProgram,
    pub removed: usize,
}

/// Remove every line containing a deny-listed substring.
///
/// Nothing is repaired; a dropped line that something else depended on will
/// fault at execution time.
pub fn sanitize(candidate: &CandidateProgram) -> CandidateProgram {
    sanitize_report(candidate).program
}

/// Same as [`sanitize`], also counting the dropped lines
pub fn sanitize_report(candidate: &CandidateProgram) -> Sanitized {
    let mut removed = 0;
    let kept: Vec<&str> = candidate
        .as_str()
        .lines()
        .filter(|line| {
            let denied = DENY_LIST.iter().any(|pattern| line.contains(pattern));
            if denied {
                removed += 1;
            }
            !denied
        })
        .collect();

    Sanitized {
        program: CandidateProgram::new(kept.join("\n")),
        removed,
    }
}
