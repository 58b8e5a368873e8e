//! Research orchestrator: fixed roles, fixed pipeline, delegated execution.

use crate::runtime::{AgentRuntime, CrewSpec, ExecutionMode, RoleSpec, TaskSpec};
use crate::session::ActivityLog;
use crate::tools::LiteratureSearch;
use crate::types::{AppError, Result};
use std::sync::Arc;

/// Agent name for the coordination entries in the activity log.
const SUPERVISOR: &str = "Supervisor";

/// Composes the research crew for one session and drives it to completion
/// through the agent runtime.
///
/// The orchestrator decides *who* works on *what* in *which order*; all
/// reasoning is the runtime's business. Search capability is bound per-role
/// so the supervisor stays a pure coordinator.
pub struct ResearchOrchestrator {
    session_id: String,
    runtime: Arc<dyn AgentRuntime>,
    search: Arc<dyn LiteratureSearch>,
    activity: Arc<ActivityLog>,
}

impl ResearchOrchestrator {
    pub fn new(
        session_id: &str,
        runtime: Arc<dyn AgentRuntime>,
        search: Arc<dyn LiteratureSearch>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            runtime,
            search,
            activity,
        }
    }

    fn agent_roles(&self) -> Vec<RoleSpec> {
        vec![
            RoleSpec {
                name: "Supervisor Agent".to_string(),
                role: "Research Coordination Manager".to_string(),
                goal: "Coordinate and manage research agents effectively".to_string(),
                backstory: "Senior research coordinator responsible for managing specialized \
                            research agents. Ensures all research directions are properly \
                            explored and validated."
                    .to_string(),
                search: None,
            },
            RoleSpec {
                name: "Generation Agent".to_string(),
                role: "Research Generation Specialist".to_string(),
                goal: "Generate novel research directions and hypotheses".to_string(),
                backstory: "Advanced AI specialized in generating innovative research \
                            directions. Use the literature search tool to gather information \
                            and generate novel hypotheses."
                    .to_string(),
                search: Some(Arc::clone(&self.search)),
            },
            RoleSpec {
                name: "Reflection Agent".to_string(),
                role: "Research Reflection Specialist".to_string(),
                goal: "Analyze and reflect on research approaches".to_string(),
                backstory: "Expert in critical analysis of research methodologies. Use the \
                            literature search tool to validate and expand upon findings."
                    .to_string(),
                search: Some(Arc::clone(&self.search)),
            },
        ]
    }

    fn research_tasks(&self, research_goal: &str) -> Vec<TaskSpec> {
        vec![
            TaskSpec {
                description: format!(
                    "Generate novel research directions for: {research_goal}\n\n\
                     Steps:\n\
                     1. Use the literature search tool to gather relevant research papers\n\
                     2. Analyze the current state of research in this area\n\
                     3. Identify gaps and opportunities\n\
                     4. Generate novel hypotheses and research directions\n\
                     5. Provide reasoning for each suggested direction"
                ),
                expected_output: "- A list of research directions with justification,\n\
                                  - Supporting literature for each direction,\n\
                                  - Potential impact and feasibility assessment"
                    .to_string(),
                agent: "Generation Agent".to_string(),
            },
            TaskSpec {
                description: "Analyze and reflect on the generated research directions\n\n\
                              Steps:\n\
                              1. Review the generated research directions\n\
                              2. Use the literature search tool to validate assumptions\n\
                              3. Identify potential challenges and limitations\n\
                              4. Suggest refinements and improvements\n\
                              5. Prioritize the most promising directions"
                    .to_string(),
                expected_output: "- Critical analysis of each research direction,\n\
                                  - Suggested improvements and refinements,\n\
                                  - Final prioritized list with recommendations"
                    .to_string(),
                agent: "Reflection Agent".to_string(),
            },
        ]
    }

    /// Execute the research pipeline for the given goal.
    ///
    /// Runtime failures are logged as a Process Error activity entry and
    /// re-raised as one consolidated orchestration error; this method never
    /// swallows a failure.
    pub async fn run(&self, research_goal: &str) -> Result<serde_json::Value> {
        let crew = CrewSpec {
            agents: self.agent_roles(),
            tasks: self.research_tasks(research_goal),
            mode: ExecutionMode::Sequential,
        };

        self.activity.append(
            &self.session_id,
            SUPERVISOR,
            "Process Started",
            &format!("Goal: {research_goal}"),
        );

        match self.runtime.kickoff(crew).await {
            Ok(output) => {
                self.activity.append(
                    &self.session_id,
                    SUPERVISOR,
                    "Process Completed",
                    "Research results generated",
                );
                serde_json::to_value(output)
                    .map_err(|e| AppError::Internal(format!("Failed to encode result: {e}")))
            }
            Err(e) => {
                let message = format!("Error in research process: {e}");
                self.activity
                    .append(&self.session_id, SUPERVISOR, "Process Error", &message);
                Err(AppError::Orchestration(message))
            }
        }
    }
}
