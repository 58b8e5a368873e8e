//! Background job execution for research sessions.

use crate::research::ResearchOrchestrator;
use crate::session::{ActivityLog, SessionRegistry};
use crate::tools::{
    AcademicSearchProvider, ArxivClient, LiteratureSearch, SearchConfig, SearchTool, SerpApiClient,
    WebSearchProvider,
};
use crate::runtime::AgentRuntimeFactory;
use crate::types::{AppError, Credentials, Result};
use crate::utils::config::ProviderConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Launches one research job per session as an independent tokio task.
///
/// The runner owns the session's terminal write: whatever happens inside the
/// job (orchestrator error, bad credentials, even a panic), exactly one of
/// `completed`/`error` is recorded and the process keeps serving.
///
/// There is deliberately no cap on concurrent sessions and no cancellation
/// or timeout once a job starts; jobs run to completion or failure.
pub struct JobRunner {
    sessions: Arc<SessionRegistry>,
    activity: Arc<ActivityLog>,
    runtime_factory: Arc<dyn AgentRuntimeFactory>,
    providers: ProviderConfig,
    search_config: SearchConfig,
}

impl JobRunner {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        activity: Arc<ActivityLog>,
        runtime_factory: Arc<dyn AgentRuntimeFactory>,
        providers: ProviderConfig,
        search_config: SearchConfig,
    ) -> Self {
        Self {
            sessions,
            activity,
            runtime_factory,
            providers,
            search_config,
        }
    }

    /// Fire-and-forget: returns as soon as the job task is spawned; progress
    /// and outcome are observed through the registry and activity log.
    pub fn start(&self, session_id: String, research_goal: String, credentials: Credentials) {
        let sessions = Arc::clone(&self.sessions);
        let activity = Arc::clone(&self.activity);
        let runtime_factory = Arc::clone(&self.runtime_factory);
        let providers = self.providers.clone();
        let search_config = self.search_config.clone();

        tokio::spawn(async move {
            sessions.set_running(&session_id);

            let job = run_research(
                &session_id,
                &research_goal,
                credentials,
                activity,
                runtime_factory,
                providers,
                search_config,
            );

            // Broad capture around the entire run: a panicking runtime still
            // gets a terminal write instead of a silently stuck session.
            match AssertUnwindSafe(job).catch_unwind().await {
                Ok(Ok(result)) => {
                    tracing::info!(session_id, "research session completed");
                    sessions.set_completed(&session_id, result);
                }
                Ok(Err(e)) => {
                    let message = match e {
                        AppError::Orchestration(msg) => msg,
                        other => other.to_string(),
                    };
                    tracing::error!(session_id, error = %message, "research session failed");
                    sessions.set_error(&session_id, &message);
                }
                Err(_) => {
                    tracing::error!(session_id, "research job panicked");
                    sessions.set_error(&session_id, "Error in research process: job panicked");
                }
            }
        });
    }
}

/// Build the session's private tool chain and run the orchestrator.
///
/// Everything constructed here is scoped to this one session: the search
/// tool's cache/budget and the runtime's credentials are never shared.
async fn run_research(
    session_id: &str,
    research_goal: &str,
    credentials: Credentials,
    activity: Arc<ActivityLog>,
    runtime_factory: Arc<dyn AgentRuntimeFactory>,
    providers: ProviderConfig,
    search_config: SearchConfig,
) -> Result<serde_json::Value> {
    let runtime = runtime_factory.create(&credentials)?;

    let academic: Arc<dyn AcademicSearchProvider> =
        Arc::new(ArxivClient::new(&providers.arxiv_base_url));
    let web: Option<Arc<dyn WebSearchProvider>> = credentials
        .serpapi_key
        .as_deref()
        .map(|key| {
            Arc::new(SerpApiClient::new(&providers.serpapi_base_url, key))
                as Arc<dyn WebSearchProvider>
        });

    let search: Arc<dyn LiteratureSearch> = Arc::new(SearchTool::new(
        session_id,
        search_config,
        academic,
        web,
        Arc::clone(&activity),
    ));

    let orchestrator = ResearchOrchestrator::new(session_id, runtime, search, activity);
    orchestrator.run(research_goal).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{AgentRuntime, CrewOutput, CrewSpec};
    use crate::types::SessionStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    enum Script {
        Succeed,
        Fail,
        Panic,
    }

    struct ScriptedRuntime(Script);

    #[async_trait]
    impl AgentRuntime for ScriptedRuntime {
        async fn kickoff(&self, _crew: CrewSpec) -> Result<CrewOutput> {
            match self.0 {
                Script::Succeed => Ok(CrewOutput {
                    final_output: "directions".to_string(),
                    task_outputs: Vec::new(),
                }),
                Script::Fail => Err(AppError::LLM("invalid api key".to_string())),
                Script::Panic => panic!("runtime bug"),
            }
        }
    }

    struct ScriptedFactory {
        script: fn() -> Script,
        reject: bool,
    }

    impl AgentRuntimeFactory for ScriptedFactory {
        fn create(&self, _credentials: &Credentials) -> Result<Arc<dyn AgentRuntime>> {
            if self.reject {
                return Err(AppError::LLM("OpenAI API key is empty".to_string()));
            }
            Ok(Arc::new(ScriptedRuntime((self.script)())))
        }
    }

    fn runner(factory: ScriptedFactory) -> (JobRunner, Arc<SessionRegistry>, Arc<ActivityLog>) {
        let sessions = Arc::new(SessionRegistry::new());
        let activity = Arc::new(ActivityLog::new());
        let runner = JobRunner::new(
            Arc::clone(&sessions),
            Arc::clone(&activity),
            Arc::new(factory),
            ProviderConfig::default(),
            SearchConfig::default(),
        );
        (runner, sessions, activity)
    }

    fn credentials() -> Credentials {
        Credentials {
            openai_api_key: "sk-test".to_string(),
            serpapi_key: None,
        }
    }

    async fn wait_terminal(sessions: &SessionRegistry, session_id: &str) -> SessionStatus {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let status = sessions.get(session_id).unwrap().status;
                if status.is_terminal() {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("job did not reach a terminal state")
    }

    #[tokio::test]
    async fn test_successful_job_records_result() {
        let (runner, sessions, activity) = runner(ScriptedFactory {
            script: || Script::Succeed,
            reject: false,
        });
        sessions.create("s1");
        runner.start("s1".to_string(), "goal".to_string(), credentials());

        assert_eq!(wait_terminal(&sessions, "s1").await, SessionStatus::Completed);
        let snap = sessions.get("s1").unwrap();
        assert_eq!(snap.result.unwrap()["final_output"], "directions");
        assert!(snap.error_message.is_none());

        let actions: Vec<String> = activity
            .entries("s1")
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["Process Started", "Process Completed"]);
    }

    #[tokio::test]
    async fn test_runtime_failure_records_error_message() {
        let (runner, sessions, _) = runner(ScriptedFactory {
            script: || Script::Fail,
            reject: false,
        });
        sessions.create("s1");
        runner.start("s1".to_string(), "goal".to_string(), credentials());

        assert_eq!(wait_terminal(&sessions, "s1").await, SessionStatus::Error);
        let snap = sessions.get("s1").unwrap();
        assert!(snap.result.is_none());
        let message = snap.error_message.unwrap();
        assert!(message.contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_rejected_credentials_record_error() {
        let (runner, sessions, _) = runner(ScriptedFactory {
            script: || Script::Succeed,
            reject: true,
        });
        sessions.create("s1");
        runner.start("s1".to_string(), "goal".to_string(), credentials());

        assert_eq!(wait_terminal(&sessions, "s1").await, SessionStatus::Error);
        assert!(sessions
            .get("s1")
            .unwrap()
            .error_message
            .unwrap()
            .contains("API key"));
    }

    #[tokio::test]
    async fn test_panicking_runtime_still_finalizes_session() {
        let (runner, sessions, _) = runner(ScriptedFactory {
            script: || Script::Panic,
            reject: false,
        });
        sessions.create("s1");
        runner.start("s1".to_string(), "goal".to_string(), credentials());

        assert_eq!(wait_terminal(&sessions, "s1").await, SessionStatus::Error);
        assert!(sessions
            .get("s1")
            .unwrap()
            .error_message
            .unwrap()
            .contains("panicked"));
    }

    #[tokio::test]
    async fn test_concurrent_sessions_finalize_independently() {
        let (runner, sessions, _) = runner(ScriptedFactory {
            script: || Script::Succeed,
            reject: false,
        });
        for id in ["a", "b", "c"] {
            sessions.create(id);
            runner.start(id.to_string(), format!("goal {id}"), credentials());
        }

        for id in ["a", "b", "c"] {
            assert_eq!(wait_terminal(&sessions, id).await, SessionStatus::Completed);
        }
    }
}
