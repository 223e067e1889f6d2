//! HTTP client for an OpenAI-compatible assistants API (v2).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::GenerationService;
use crate::{
    config::ResolvedGeneration,
    error::{Result, RoutineError, TransportResultExt},
    models::{JobStatus, MessageRole, ThreadMessage},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const ASSISTANTS_BETA: &str = "assistants=v2";

/// [`GenerationService`] over the assistants HTTP API.
pub struct AssistantsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AssistantsClient {
    pub fn new(config: &ResolvedGeneration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .transport_context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T>(&self, builder: RequestBuilder, what: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .request(builder)
            .send()
            .await
            .transport_context(&format!("Failed to {what}"))?;
        let response = check_status(response, what).await?;
        response
            .json::<T>()
            .await
            .transport_context(&format!("Failed to parse response to {what}"))
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(RoutineError::transport(format!(
        "Failed to {what}: status {status}: {body}"
    )))
}

#[async_trait]
impl GenerationService for AssistantsClient {
    async fn create_thread(&self) -> Result<String> {
        let thread: IdObject = self
            .send(
                self.client.post(self.url("threads")).json(&serde_json::json!({})),
                "create thread",
            )
            .await?;
        Ok(thread.id)
    }

    async fn post_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let body = CreateMessage {
            role: "user",
            content: text,
        };
        let _message: IdObject = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{thread_id}/messages")))
                    .json(&body),
                "post message",
            )
            .await?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String> {
        let body = CreateRun { assistant_id };
        let run: IdObject = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{thread_id}/runs")))
                    .json(&body),
                "start run",
            )
            .await?;
        Ok(run.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<JobStatus> {
        let run: RunObject = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{thread_id}/runs/{run_id}"))),
                "fetch run status",
            )
            .await?;
        debug!("Run {run_id} reported status '{}'", run.status);
        run.status.parse().map_err(|e: String| RoutineError::transport(e))
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>> {
        let list: MessageList = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{thread_id}/messages")))
                    .query(&[("order", "desc"), ("limit", "1")]),
                "list messages",
            )
            .await?;
        Ok(list.data.into_iter().next().map(MessageObject::into_thread_message))
    }
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRun<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    status: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    role: MessageRole,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

impl MessageObject {
    /// Keeps only the first text part; images and files are dropped.
    fn into_thread_message(self) -> ThreadMessage {
        let text = self
            .content
            .into_iter()
            .find_map(|part| match part {
                ContentPart::Text { text } => Some(text.value),
                ContentPart::Other => None,
            })
            .unwrap_or_default();
        ThreadMessage {
            role: self.role,
            text,
        }
    }
}
