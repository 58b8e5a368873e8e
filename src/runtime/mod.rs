//! Agent runtime boundary.
//!
//! Everything about how agents reason is behind [`AgentRuntime`]: the
//! research layer assembles role definitions and a task pipeline into a
//! [`CrewSpec`], requests strictly sequential execution, and takes the
//! structured output as-is. Swapping the runtime (or scripting it in tests)
//! never touches the orchestration or session code.

/// LLM-backed sequential runtime.
pub mod llm_crew;

pub use llm_crew::{LlmCrewRuntime, OpenAiRuntimeFactory};

use crate::tools::LiteratureSearch;
use crate::types::{Credentials, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// One agent role in the crew.
#[derive(Clone)]
pub struct RoleSpec {
    /// Display name, e.g. "Generation Agent". Also the task assignment key.
    pub name: String,
    /// Short role title, e.g. "Research Generation Specialist".
    pub role: String,
    pub goal: String,
    /// Persona text framing how the agent approaches its tasks.
    pub backstory: String,
    /// Literature search capability; None for coordination-only roles.
    pub search: Option<Arc<dyn LiteratureSearch>>,
}

/// One unit of work assigned to a role.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub description: String,
    /// Hint describing the shape of the expected output.
    pub expected_output: String,
    /// Name of the role this task is assigned to.
    pub agent: String,
}

/// How the runtime schedules tasks. Only sequential execution is supported:
/// each task consumes the previous task's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
}

/// A full crew submission: roles, tasks, scheduling mode.
#[derive(Clone)]
pub struct CrewSpec {
    pub agents: Vec<RoleSpec>,
    pub tasks: Vec<TaskSpec>,
    pub mode: ExecutionMode,
}

/// Output of one executed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub agent: String,
    pub description: String,
    pub output: String,
}

/// Structured result of a crew run. The last task's output doubles as the
/// overall result.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    pub final_output: String,
    pub task_outputs: Vec<TaskOutput>,
}

/// External multi-agent execution runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Execute the crew to completion, returning its structured result or
    /// a single consolidated failure.
    async fn kickoff(&self, crew: CrewSpec) -> Result<CrewOutput>;
}

impl std::fmt::Debug for dyn AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn AgentRuntime")
    }
}

/// Builds a runtime from per-session credentials.
///
/// A fresh runtime per session keeps one session's key out of every other
/// session's requests.
pub trait AgentRuntimeFactory: Send + Sync {
    fn create(&self, credentials: &Credentials) -> Result<Arc<dyn AgentRuntime>>;
}
