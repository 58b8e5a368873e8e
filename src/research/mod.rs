//! Multi-agent research pipeline.
//!
//! This module turns one research goal into one background job:
//!
//! - [`orchestrator::ResearchOrchestrator`] composes the fixed agent roles
//!   (generation, reflection, supervisor) and the two-task pipeline, then
//!   delegates execution to the agent runtime.
//! - [`runner::JobRunner`] owns the session lifecycle around that run: it
//!   spawns the job task, builds the session's private search tool and
//!   runtime from the request credentials, and performs the single terminal
//!   registry write no matter how the run ends.
//!
//! # Pipeline
//!
//! 1. **Generation** - survey literature, identify gaps, propose novel
//!    research directions.
//! 2. **Reflection** - critically analyze the proposals, validate against
//!    literature, prioritize.
//!
//! Tasks run strictly sequentially; reflection consumes generation's output.

/// Role/task composition and delegated execution.
pub mod orchestrator;
/// Background job lifecycle around one orchestrator run.
pub mod runner;

pub use orchestrator::ResearchOrchestrator;
pub use runner::JobRunner;
