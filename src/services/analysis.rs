// src/services/analysis.rs

//! Remote analysis over the assistants API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::models::AnalysisConfig;
use crate::services::PromptRequest;
use crate::utils::http::{create_async_client, ensure_success};

/// Run statuses that mean the run is still being worked on.
const PENDING_STATUSES: &[&str] = &["queued", "in_progress", "cancelling"];

const NO_RESPONSE: &str = "No response from assistant";

/// Submit a prompt, get analysis text back.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, request: &PromptRequest) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

/// Client for the assistants flow: assistant, thread, message, run, poll.
pub struct OpenAiAssistantClient {
    config: AnalysisConfig,
    client: Client,
    api_key: String,
}

impl OpenAiAssistantClient {
    /// Create a client with an explicit API key.
    pub fn new(config: AnalysisConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = create_async_client(&config)?;
        Ok(Self {
            config,
            client,
            api_key: api_key.into(),
        })
    }

    /// Create a client with the key taken from the configured environment variable.
    pub fn from_env(config: AnalysisConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
        action: &str,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        Ok(ensure_success(response, action).await?.json().await?)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, action: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Ok(ensure_success(response, action).await?.json().await?)
    }

    /// Poll a run until it leaves the pending states or attempts run out.
    async fn wait_for_run(&self, thread_id: &str, mut run: Run) -> Result<Run> {
        let mut attempts = 0;
        while PENDING_STATUSES.contains(&run.status.as_str()) {
            if attempts >= self.config.max_poll_attempts {
                log::warn!(
                    "Run {} still '{}' after {} polls",
                    run.id,
                    run.status,
                    attempts
                );
                break;
            }
            tokio::time::sleep(self.config.poll_interval()).await;
            run = self
                .get(&format!("threads/{thread_id}/runs/{}", run.id), "poll run")
                .await?;
            attempts += 1;
            log::debug!("Run {} status: {}", run.id, run.status);
        }
        Ok(run)
    }

    async fn first_assistant_reply(&self, thread_id: &str) -> Result<String> {
        let messages: MessageList = self
            .get(&format!("threads/{thread_id}/messages"), "list messages")
            .await?;
        Ok(messages
            .data
            .into_iter()
            .find(|message| message.role == "assistant")
            .and_then(|message| message.content.into_iter().next())
            .and_then(|content| content.text)
            .map(|text| text.value)
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

#[async_trait]
impl AnalysisClient for OpenAiAssistantClient {
    async fn analyze(&self, request: &PromptRequest) -> Result<String> {
        log::info!(
            "Requesting {} analysis of {} posts with {}",
            request.kind,
            request.post_count,
            request.model
        );

        let assistant: Created = self
            .post(
                "assistants",
                json!({
                    "name": self.config.assistant_name,
                    "instructions": self.config.assistant_instructions,
                    "model": request.model,
                }),
                "create assistant",
            )
            .await?;
        let thread: Created = self.post("threads", json!({}), "create thread").await?;
        let _: Created = self
            .post(
                &format!("threads/{}/messages", thread.id),
                json!({ "role": "user", "content": request.prompt }),
                "create message",
            )
            .await?;
        let run: Run = self
            .post(
                &format!("threads/{}/runs", thread.id),
                json!({
                    "assistant_id": assistant.id,
                    "instructions": request.instructions,
                }),
                "create run",
            )
            .await?;

        let run = self.wait_for_run(&thread.id, run).await?;
        if run.status != "completed" {
            log::warn!("{} analysis ended with status '{}'", request.kind, run.status);
            return Ok(format!("Run status: {}", run.status));
        }

        self.first_assistant_reply(&thread.id).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::AppError;
    use crate::models::AnalysisKind;

    fn prompt() -> PromptRequest {
        PromptRequest::build(
            AnalysisKind::MainTopics,
            "@alice",
            &["hello".to_string()],
            "English",
            "gpt-4o",
        )
    }

    fn client(server: &MockServer) -> OpenAiAssistantClient {
        let config = AnalysisConfig {
            api_base: server.uri(),
            poll_interval_ms: 0,
            max_poll_attempts: 3,
            ..AnalysisConfig::default()
        };
        OpenAiAssistantClient::new(config, "sk-test").unwrap()
    }

    async fn mount_setup(server: &MockServer, run_status: &str) {
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-beta", "assistants=v2"))
            .and(body_partial_json(json!({ "model": "gpt-4o" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_1" })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_partial_json(json!({ "role": "user" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_partial_json(json!({ "assistant_id": "asst_1" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "run_1", "status": run_status })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn completed_run_returns_assistant_text() {
        let server = MockServer::start().await;
        mount_setup(&server, "completed").await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "role": "assistant", "content": [{ "type": "text", "text": { "value": "Mostly Rust." } }] },
                    { "role": "user", "content": [{ "type": "text", "text": { "value": "prompt" } }] }
                ]
            })))
            .mount(&server)
            .await;

        let answer = client(&server).analyze(&prompt()).await.unwrap();
        assert_eq!(answer, "Mostly Rust.");
    }

    #[tokio::test]
    async fn pending_run_is_polled_until_done() {
        let server = MockServer::start().await;
        mount_setup(&server, "queued").await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "run_1", "status": "completed" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let answer = client(&server).analyze(&prompt()).await.unwrap();
        assert_eq!(answer, "No response from assistant");
    }

    #[tokio::test]
    async fn failed_run_degrades_to_status_text() {
        let server = MockServer::start().await;
        mount_setup(&server, "failed").await;

        let answer = client(&server).analyze(&prompt()).await.unwrap();
        assert_eq!(answer, "Run status: failed");
    }

    #[tokio::test]
    async fn run_still_pending_after_attempts_reports_status() {
        let server = MockServer::start().await;
        mount_setup(&server, "in_progress").await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "run_1", "status": "in_progress" })),
            )
            .expect(3)
            .mount(&server)
            .await;

        let answer = client(&server).analyze(&prompt()).await.unwrap();
        assert_eq!(answer, "Run status: in_progress");
    }

    #[tokio::test]
    async fn http_error_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client(&server).analyze(&prompt()).await.unwrap_err();
        assert!(matches!(err, AppError::Analysis(ref m) if m.contains("401")));
    }
}
