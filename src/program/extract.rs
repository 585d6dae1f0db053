//! Pull the script out of raw model output

use crate::program::CandidateProgram;

/// Opening fence the prompt asks the model to use
pub const FENCE_OPEN: &str = "```sheet";

/// Closing fence (also matches bare opening fences)
pub const FENCE_CLOSE: &str = "```";

const IMPORT_TOKEN: &str = "import";

/// Strip fence markers and any prose before the first `import`.
///
/// Never fails. Text with no `import` token is returned as-is (after fence
/// removal) and will fault later when it is executed.
pub fn extract(raw: &str) -> CandidateProgram {
    let unfenced = raw.replace(FENCE_OPEN, "").replace(FENCE_CLOSE, "");
    let trimmed = unfenced.trim();

    if trimmed.starts_with(IMPORT_TOKEN) {
        return CandidateProgram::new(trimmed);
    }

    match trimmed.find(IMPORT_TOKEN) {
        Some(pos) => CandidateProgram::new(&trimmed[pos..]),
        None => CandidateProgram::new(trimmed),
    }
}
