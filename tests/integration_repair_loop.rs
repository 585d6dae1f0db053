//! Repair loop integration tests
//!
//! Drives the full prompt → generate → extract → sanitize → execute flow with
//! a scripted LLM client and the real script executor.

use std::sync::Arc;

use sheetwright::executor::{MISSING_OUTPUT_DIAGNOSTIC, ScriptExecutor};
use sheetwright::llm::{Credential, MockLlmClient, MockReply};
use sheetwright::program::{CandidateProgram, extract, sanitize};
use sheetwright::repair::{GenerationRequest, RepairFailure, RepairLoop};

const EXPENSE_SHEET: &str = r##"import workbook
import styles
import layout
workbook wb
sheet wb "Expenses"
style header bold font_color=#FFFFFF fill=#1F4E78
style money num_format="$#,##0.00"
write A1 "Date" header
write B1 "Item" header
write C1 "Amount" header
write A2 "2025-01-02"
write B2 "Coffee"
write C2 3.5 money
write A3 "2025-01-03"
write B3 "Train"
write C3 12 money
write B4 "Total" header
formula C4 "=SUM(C2:C3)" money
width B 20
save wb output_buffer"##;

/// Runs cleanly but never binds output_buffer
const NO_OUTPUT: &str = "import workbook\nworkbook wb\nsheet wb \"Expenses\"\nwrite A1 \"Date\"";

fn runner(llm: &Arc<MockLlmClient>) -> RepairLoop<MockLlmClient, ScriptExecutor> {
    RepairLoop::new(llm.clone(), Arc::new(ScriptExecutor::new()))
}

fn request() -> GenerationRequest {
    GenerationRequest::new("build a 3-column expense sheet", "gemini-2.5-flash")
}

fn credential() -> Credential {
    Credential::new("test-key")
}

/// Scenario A: valid program on attempt 1
#[tokio::test]
async fn test_valid_program_first_attempt() {
    let llm = Arc::new(MockLlmClient::new(vec![MockReply::Text(format!(
        "Here you go:\n```sheet\n{}\n```",
        EXPENSE_SHEET
    ))]));

    let success = runner(&llm).run(&request(), &credential()).await.unwrap();

    assert_eq!(llm.call_count(), 1);
    assert_eq!(success.attempts, 1);
    assert!(!success.artifact.is_empty());
    assert_eq!(&success.artifact.as_bytes()[..2], b"PK");
    assert!(success.program.as_str().starts_with("import workbook"));
}

/// Scenario B: missing output twice, then a valid program
#[tokio::test]
async fn test_repairs_missing_output_variable() {
    let llm = Arc::new(MockLlmClient::new(vec![
        MockReply::Text(NO_OUTPUT.into()),
        MockReply::Text(NO_OUTPUT.into()),
        MockReply::Text(EXPENSE_SHEET.into()),
    ]));

    let success = runner(&llm).run(&request(), &credential()).await.unwrap();

    assert_eq!(llm.call_count(), 3);
    assert_eq!(success.attempts, 3);

    let prompts = llm.prompts();
    assert!(prompts[2].contains("## Attempt 2 Failed"));
    assert!(prompts[2].contains(MISSING_OUTPUT_DIAGNOSTIC));
}

/// Scenario C: rejection on the first call
#[tokio::test]
async fn test_rejection_on_first_call() {
    let llm = Arc::new(MockLlmClient::new(vec![
        MockReply::Rejected("prompt blocked by backend: SAFETY".into()),
        MockReply::Text(EXPENSE_SHEET.into()),
    ]));

    let failure = runner(&llm).run(&request(), &credential()).await.unwrap_err();

    assert_eq!(llm.call_count(), 1);
    match &failure {
        RepairFailure::BackendRejected { reason, attempts, .. } => {
            assert!(reason.contains("SAFETY"));
            assert_eq!(*attempts, 1);
        }
        other => panic!("expected BackendRejected, got {:?}", other),
    }
    assert!(failure.last_program().is_none());
}

/// Scenario D: deny-listed lines are dropped and the rest still runs
#[tokio::test]
async fn test_deny_listed_lines_are_removed() {
    let with_conditional = EXPENSE_SHEET.replace(
        "width B 20",
        "width B 20\nconditional_format C2:C3 \">10\" highlight\ncolor_scale C2:C3",
    );
    let llm = Arc::new(MockLlmClient::new(vec![MockReply::Text(with_conditional)]));

    let success = runner(&llm).run(&request(), &credential()).await.unwrap();

    assert_eq!(llm.call_count(), 1);
    assert!(!success.program.as_str().contains("conditional_format"));
    assert!(!success.program.as_str().contains("color_scale"));
    assert!(!success.artifact.is_empty());
}

/// P1: always-faulting output uses exactly the attempt budget
#[tokio::test]
async fn test_bounded_attempts() {
    let llm = Arc::new(MockLlmClient::repeating("import workbook\nchart A1:B2", 10));

    let failure = runner(&llm).run(&request(), &credential()).await.unwrap_err();

    assert_eq!(llm.call_count(), 3);
    match &failure {
        RepairFailure::AttemptsExhausted {
            attempts,
            last_fault,
            last_program,
        } => {
            assert_eq!(*attempts, 3);
            assert!(last_fault.contains("unknown statement 'chart'"));
            assert_eq!(last_program.as_str(), "import workbook\nchart A1:B2");
        }
        other => panic!("expected AttemptsExhausted, got {:?}", other),
    }
}

/// P2: no calls after the first success
#[tokio::test]
async fn test_stops_after_success() {
    let llm = Arc::new(MockLlmClient::new(vec![
        MockReply::Text("not a script".into()),
        MockReply::Text(EXPENSE_SHEET.into()),
        MockReply::Text(EXPENSE_SHEET.into()),
    ]));

    let success = runner(&llm).run(&request(), &credential()).await.unwrap();

    assert_eq!(success.attempts, 2);
    assert_eq!(llm.call_count(), 2);
}

/// P3: each retry prompt extends the previous one
#[tokio::test]
async fn test_instruction_grows_monotonically() {
    let llm = Arc::new(MockLlmClient::repeating(NO_OUTPUT, 3));

    let _ = runner(&llm).run(&request(), &credential()).await;

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 3);
    for pair in prompts.windows(2) {
        assert!(pair[1].len() > pair[0].len());
        assert!(pair[1].starts_with(&pair[0]));
    }
}

/// P4: sanitizing twice equals sanitizing once
#[test]
fn test_sanitizer_idempotent() {
    let candidate = CandidateProgram::from(
        "import workbook\ndata_bar A1:A9\nworkbook wb\n\nconditional_format x\nsave wb output_buffer\n",
    );
    let once = sanitize(&candidate);
    assert_eq!(sanitize(&once), once);
}

/// P5: fences and leading prose are stripped
#[test]
fn test_extractor_tolerates_formatting() {
    let raw = "Sure, here is the script you asked for.\n\n```sheet\nimport workbook\nworkbook wb\n```\n";
    let program = extract(raw);
    assert!(program.as_str().starts_with("import"));
    assert!(!program.as_str().contains("```"));
}

/// Transport failures never trigger another attempt
#[tokio::test]
async fn test_backend_unavailable_mid_loop_keeps_last_program() {
    let llm = Arc::new(MockLlmClient::new(vec![
        MockReply::Text(NO_OUTPUT.into()),
        MockReply::Error("Authentication failed (401)".into()),
    ]));

    let failure = runner(&llm).run(&request(), &credential()).await.unwrap_err();

    assert_eq!(llm.call_count(), 2);
    assert!(matches!(failure, RepairFailure::BackendUnavailable { .. }));
    assert_eq!(failure.last_program().unwrap().as_str(), NO_OUTPUT);
}
