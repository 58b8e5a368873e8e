//! LLM-backed sequential crew runtime.
//!
//! Executes tasks strictly in order. Each task runs as its assigned agent:
//! the role's persona becomes the system prompt, literature gathered through
//! the role's search capability is injected into the user prompt, and the
//! previous task's output is carried forward as context.

use crate::llm::{LLMClient, OpenAIClient};
use crate::runtime::{
    AgentRuntime, AgentRuntimeFactory, CrewOutput, CrewSpec, RoleSpec, TaskOutput,
};
use crate::types::{AppError, Credentials, Result, SearchBundle};
use async_trait::async_trait;
use std::sync::Arc;

/// Queries planned per search-capable task.
const MAX_QUERIES_PER_TASK: usize = 3;
/// Summaries are clipped so a handful of papers does not crowd out the task.
const MAX_SUMMARY_CHARS: usize = 400;

pub struct LlmCrewRuntime {
    llm: Box<dyn LLMClient>,
}

impl LlmCrewRuntime {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn persona(role: &RoleSpec) -> String {
        format!(
            "You are {name}, a {role}. Your goal: {goal}.\n{backstory}",
            name = role.name,
            role = role.role,
            goal = role.goal,
            backstory = role.backstory,
        )
    }

    /// Ask the agent which literature queries would inform this task.
    async fn plan_queries(&self, persona: &str, task_description: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Before working on the task below, list up to {MAX_QUERIES_PER_TASK} short literature \
             search queries that would inform it. Return only the queries, one per line.\n\n\
             Task:\n{task_description}"
        );

        let response = self.llm.generate_with_system(persona, &prompt).await?;

        Ok(response
            .lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches(|c: char| c.is_numeric() || c == '.' || c == ')' || c == '-')
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .take(MAX_QUERIES_PER_TASK)
            .collect())
    }

    async fn gather_literature(&self, role: &RoleSpec, task_description: &str) -> Result<String> {
        let Some(search) = &role.search else {
            return Ok(String::new());
        };

        let queries = self.plan_queries(&Self::persona(role), task_description).await?;
        if queries.is_empty() {
            return Ok(String::new());
        }

        let mut sections = Vec::new();
        for query in &queries {
            let bundle = search.search(query).await;
            sections.push(format!(
                "### Results for \"{query}\"\n{}",
                format_bundle(&bundle)
            ));
        }

        Ok(format!("## Literature gathered\n\n{}", sections.join("\n\n")))
    }

    async fn execute_task(
        &self,
        role: &RoleSpec,
        description: &str,
        expected_output: &str,
        previous_output: &str,
    ) -> Result<String> {
        let literature = self.gather_literature(role, description).await?;

        let mut prompt = format!("## Task\n{description}\n\n## Expected output\n{expected_output}");
        if !previous_output.is_empty() {
            prompt.push_str(&format!("\n\n## Output of the previous task\n{previous_output}"));
        }
        if !literature.is_empty() {
            prompt.push_str(&format!("\n\n{literature}"));
        }

        self.llm.generate_with_system(&Self::persona(role), &prompt).await
    }
}

#[async_trait]
impl AgentRuntime for LlmCrewRuntime {
    async fn kickoff(&self, crew: CrewSpec) -> Result<CrewOutput> {
        let mut task_outputs: Vec<TaskOutput> = Vec::with_capacity(crew.tasks.len());
        let mut previous_output = String::new();

        for task in &crew.tasks {
            let role = crew
                .agents
                .iter()
                .find(|agent| agent.name == task.agent)
                .ok_or_else(|| {
                    AppError::Orchestration(format!("No agent named '{}' in crew", task.agent))
                })?;

            tracing::info!(agent = %role.name, model = self.llm.model_name(), "executing task");

            let output = self
                .execute_task(role, &task.description, &task.expected_output, &previous_output)
                .await?;

            previous_output.clone_from(&output);
            task_outputs.push(TaskOutput {
                agent: role.name.clone(),
                description: task.description.clone(),
                output,
            });
        }

        Ok(CrewOutput {
            final_output: previous_output,
            task_outputs,
        })
    }
}

fn format_bundle(bundle: &SearchBundle) -> String {
    if let Some(error) = &bundle.error {
        return format!("(search unavailable: {error})");
    }
    if bundle.academic.is_empty() && bundle.web.is_empty() {
        return "(no results)".to_string();
    }

    let mut lines = Vec::new();
    for paper in &bundle.academic {
        let mut summary = paper.summary.clone();
        if summary.len() > MAX_SUMMARY_CHARS {
            let mut cut = MAX_SUMMARY_CHARS;
            while !summary.is_char_boundary(cut) {
                cut -= 1;
            }
            summary.truncate(cut);
            summary.push_str("...");
        }
        lines.push(format!(
            "- [paper] {} ({}) by {}: {}",
            paper.title,
            paper.published.as_deref().unwrap_or("n.d."),
            paper.authors.join(", "),
            summary,
        ));
    }
    for result in &bundle.web {
        lines.push(format!(
            "- [web] {} <{}>{}",
            result.title,
            result.link,
            result
                .snippet
                .as_deref()
                .map(|s| format!(": {s}"))
                .unwrap_or_default(),
        ));
    }
    lines.join("\n")
}

/// Default factory: one OpenAI-backed runtime per session.
pub struct OpenAiRuntimeFactory {
    api_base: String,
    model: String,
}

impl OpenAiRuntimeFactory {
    pub fn new(api_base: &str, model: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
            model: model.to_string(),
        }
    }
}

impl AgentRuntimeFactory for OpenAiRuntimeFactory {
    fn create(&self, credentials: &Credentials) -> Result<Arc<dyn AgentRuntime>> {
        if credentials.openai_api_key.trim().is_empty() {
            return Err(AppError::LLM("OpenAI API key is empty".to_string()));
        }

        let client = OpenAIClient::new(
            credentials.openai_api_key.clone(),
            self.api_base.clone(),
            self.model.clone(),
        );
        Ok(Arc::new(LlmCrewRuntime::new(Box::new(client))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ExecutionMode, TaskSpec};
    use crate::tools::LiteratureSearch;
    use crate::types::PaperRecord;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// LLM stub that replays canned responses and records (system, prompt)
    /// pairs into a handle the test keeps after the runtime takes ownership.
    struct ScriptedLLM {
        responses: Mutex<VecDeque<String>>,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ScriptedLLM {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn prompts_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
            Arc::clone(&self.prompts)
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLLM {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.generate_with_system("", prompt).await
        }

        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .push((system.to_string(), prompt.to_string()));
            self.responses
                .lock()
                .pop_front()
                .ok_or_else(|| AppError::LLM("script exhausted".to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct RecordingSearch {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LiteratureSearch for RecordingSearch {
        async fn search(&self, query: &str) -> SearchBundle {
            self.queries.lock().push(query.to_string());
            SearchBundle {
                error: None,
                academic: vec![PaperRecord {
                    title: format!("Paper about {query}"),
                    authors: vec!["A. Author".to_string()],
                    summary: "summary".to_string(),
                    pdf_url: None,
                    published: Some("2024-01-01".to_string()),
                }],
                web: Vec::new(),
            }
        }
    }

    fn role(name: &str, search: Option<Arc<dyn LiteratureSearch>>) -> RoleSpec {
        RoleSpec {
            name: name.to_string(),
            role: "Specialist".to_string(),
            goal: "do the work".to_string(),
            backstory: "An expert.".to_string(),
            search,
        }
    }

    fn task(agent: &str, description: &str) -> TaskSpec {
        TaskSpec {
            description: description.to_string(),
            expected_output: "a list".to_string(),
            agent: agent.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sequential_tasks_chain_outputs() {
        // Two tool-less roles: one LLM call per task.
        let llm = ScriptedLLM::new(&["first output", "second output"]);
        let runtime = LlmCrewRuntime::new(Box::new(llm));

        let crew = CrewSpec {
            agents: vec![role("One", None), role("Two", None)],
            tasks: vec![task("One", "generate"), task("Two", "reflect")],
            mode: ExecutionMode::Sequential,
        };

        let output = runtime.kickoff(crew).await.unwrap();
        assert_eq!(output.final_output, "second output");
        assert_eq!(output.task_outputs.len(), 2);
        assert_eq!(output.task_outputs[0].agent, "One");
        assert_eq!(output.task_outputs[1].output, "second output");
    }

    #[tokio::test]
    async fn test_second_task_sees_first_output() {
        let llm = ScriptedLLM::new(&["alpha", "beta"]);
        let prompts = llm.prompts_handle();
        let runtime = LlmCrewRuntime::new(Box::new(llm));

        let crew = CrewSpec {
            agents: vec![role("One", None), role("Two", None)],
            tasks: vec![task("One", "generate"), task("Two", "reflect")],
            mode: ExecutionMode::Sequential,
        };
        runtime.kickoff(crew).await.unwrap();

        let prompts = prompts.lock();
        assert_eq!(prompts.len(), 2);
        // The reflection task's user prompt carries the generation output,
        // and runs under the second agent's persona.
        assert!(prompts[1].1.contains("alpha"));
        assert!(prompts[1].0.contains("Two"));
    }

    #[tokio::test]
    async fn test_search_capable_role_plans_and_runs_queries() {
        // Call order: plan queries, then the task completion.
        let llm = ScriptedLLM::new(&["1. quantum codes\n2. surface codes", "task output"]);
        let runtime = LlmCrewRuntime::new(Box::new(llm));
        let search = Arc::new(RecordingSearch {
            queries: Mutex::new(Vec::new()),
        });

        let crew = CrewSpec {
            agents: vec![role("Gen", Some(search.clone()))],
            tasks: vec![task("Gen", "generate directions")],
            mode: ExecutionMode::Sequential,
        };

        let output = runtime.kickoff(crew).await.unwrap();
        assert_eq!(output.final_output, "task output");

        let queries = search.queries.lock();
        assert_eq!(*queries, vec!["quantum codes", "surface codes"]);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_an_orchestration_error() {
        let runtime = LlmCrewRuntime::new(Box::new(ScriptedLLM::new(&[])));
        let crew = CrewSpec {
            agents: vec![role("One", None)],
            tasks: vec![task("Nobody", "generate")],
            mode: ExecutionMode::Sequential,
        };

        let err = runtime.kickoff(crew).await.unwrap_err();
        assert!(matches!(err, AppError::Orchestration(_)));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let runtime = LlmCrewRuntime::new(Box::new(ScriptedLLM::new(&[])));
        let crew = CrewSpec {
            agents: vec![role("One", None)],
            tasks: vec![task("One", "generate")],
            mode: ExecutionMode::Sequential,
        };

        assert!(runtime.kickoff(crew).await.is_err());
    }

    #[test]
    fn test_format_bundle_sentinel_and_empty() {
        let sentinel = SearchBundle {
            error: Some("Query limit reached".to_string()),
            academic: Vec::new(),
            web: Vec::new(),
        };
        assert!(format_bundle(&sentinel).contains("Query limit reached"));
        assert_eq!(format_bundle(&SearchBundle::default()), "(no results)");
    }

    #[test]
    fn test_factory_rejects_empty_key() {
        let factory = OpenAiRuntimeFactory::new("https://api.openai.com/v1", "gpt-4o-mini");
        let err = factory
            .create(&Credentials {
                openai_api_key: "  ".to_string(),
                serpapi_key: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
    }
}
