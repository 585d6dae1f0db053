//! Repair loop - generate, execute, feed the fault back, try again.
//!
//! One `run` owns one instruction text. Attempts are strictly sequential
//! because each retry prompt carries the previous attempt's fault.

use std::sync::Arc;

use thiserror::Error;

use crate::artifact::Artifact;
use crate::executor::{ExecutionOutcome, ProgramExecutor};
use crate::llm::{Completion, CompletionRequest, Credential, LlmClient};
use crate::llm::types::DEFAULT_MAX_OUTPUT_TOKENS;
use crate::program::{CandidateProgram, extract, sanitize_report};
use crate::prompt::{InstructionText, PromptBuilder};

/// Default attempt budget per request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One user submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub task: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(task: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            model: model.into(),
        }
    }
}

/// Configuration for the RepairLoop
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Total generation attempts per run (at least 1)
    pub max_attempts: u32,
    /// Output cap for each generation
    pub max_output_tokens: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl RepairConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Working program and the file it produced
#[derive(Debug, Clone)]
pub struct RepairSuccess {
    pub program: CandidateProgram,
    pub artifact: Artifact,
    pub attempts: u32,
}

/// Terminal failures of a run
#[derive(Debug, Error)]
pub enum RepairFailure {
    /// Backend answered without generating anything
    #[error("Backend rejected the request: {reason}")]
    BackendRejected {
        reason: String,
        attempts: u32,
        last_program: Option<CandidateProgram>,
    },

    /// Transport, auth, or protocol failure
    #[error("Backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        attempts: u32,
        last_program: Option<CandidateProgram>,
    },

    /// Every attempt produced a faulty program
    #[error("Gave up after {attempts} attempts; last error: {last_fault}")]
    AttemptsExhausted {
        attempts: u32,
        last_fault: String,
        last_program: CandidateProgram,
    },
}

impl RepairFailure {
    /// Most recent candidate, for manual inspection
    pub fn last_program(&self) -> Option<&CandidateProgram> {
        match self {
            RepairFailure::BackendRejected { last_program, .. }
            | RepairFailure::BackendUnavailable { last_program, .. } => last_program.as_ref(),
            RepairFailure::AttemptsExhausted { last_program, .. } => Some(last_program),
        }
    }

    /// Number of generation calls made
    pub fn attempts(&self) -> u32 {
        match self {
            RepairFailure::BackendRejected { attempts, .. }
            | RepairFailure::BackendUnavailable { attempts, .. }
            | RepairFailure::AttemptsExhausted { attempts, .. } => *attempts,
        }
    }
}

/// Controller states
enum State {
    Attempting(u32),
    Terminal(Result<RepairSuccess, RepairFailure>),
}

/// Drives prompt → generate → extract → sanitize → execute with bounded retries
pub struct RepairLoop<L, E>
where
    L: LlmClient,
    E: ProgramExecutor,
{
    llm: Arc<L>,
    executor: Arc<E>,
    prompt_builder: PromptBuilder,
    config: RepairConfig,
}

impl<L, E> RepairLoop<L, E>
where
    L: LlmClient,
    E: ProgramExecutor,
{
    /// Create a new RepairLoop with the default attempt budget
    pub fn new(llm: Arc<L>, executor: Arc<E>) -> Self {
        Self::with_config(llm, executor, RepairConfig::default())
    }

    /// Create a new RepairLoop with custom configuration
    pub fn with_config(llm: Arc<L>, executor: Arc<E>, config: RepairConfig) -> Self {
        let max_attempts = config.max_attempts;
        Self {
            llm,
            executor,
            prompt_builder: PromptBuilder::new(),
            config: config.with_max_attempts(max_attempts),
        }
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Run the loop until a program works or the attempt budget is spent
    pub async fn run(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<RepairSuccess, RepairFailure> {
        let mut instruction = self.prompt_builder.build(&request.task);
        let mut last_program: Option<CandidateProgram> = None;
        let mut state = State::Attempting(1);

        log::info!(
            "Starting repair loop: backend={}, model={}, max_attempts={}",
            self.llm.name(),
            request.model,
            self.config.max_attempts
        );

        loop {
            state = match state {
                State::Attempting(n) => {
                    self.attempt(n, request, credential, &mut instruction, &mut last_program)
                        .await
                }
                State::Terminal(outcome) => return outcome,
            };
        }
    }

    async fn attempt(
        &self,
        n: u32,
        request: &GenerationRequest,
        credential: &Credential,
        instruction: &mut InstructionText,
        last_program: &mut Option<CandidateProgram>,
    ) -> State {
        let completion_request = CompletionRequest::new(instruction.as_str(), &request.model, credential.clone())
            .with_max_output_tokens(self.config.max_output_tokens);

        let raw = match self.llm.generate(completion_request).await {
            Ok(Completion::Text(raw)) => raw,
            Ok(Completion::Rejected(reason)) => {
                log::warn!("Attempt {}: backend rejected the request: {}", n, reason);
                return State::Terminal(Err(RepairFailure::BackendRejected {
                    reason,
                    attempts: n,
                    last_program: last_program.take(),
                }));
            }
            Err(e) => {
                log::error!("Attempt {}: backend unavailable: {}", n, e);
                return State::Terminal(Err(RepairFailure::BackendUnavailable {
                    message: e.to_string(),
                    attempts: n,
                    last_program: last_program.take(),
                }));
            }
        };

        let sanitized = sanitize_report(&extract(&raw));
        if sanitized.removed > 0 {
            log::warn!(
                "Attempt {}: removed {} deny-listed line(s) from the candidate",
                n,
                sanitized.removed
            );
        }
        let program = sanitized.program;

        match self.executor.execute(&program) {
            ExecutionOutcome::Success(artifact) => {
                log::info!("Attempt {} succeeded ({} bytes)", n, artifact.len());
                State::Terminal(Ok(RepairSuccess {
                    program,
                    artifact,
                    attempts: n,
                }))
            }
            ExecutionOutcome::Failure(fault) => {
                log::warn!("Attempt {} failed: {}", n, fault);
                if n < self.config.max_attempts {
                    instruction.append_failure(n, &fault);
                    *last_program = Some(program);
                    State::Attempting(n + 1)
                } else {
                    State::Terminal(Err(RepairFailure::AttemptsExhausted {
                        attempts: n,
                        last_fault: fault,
                        last_program: program,
                    }))
                }
            }
        }
    }
}
