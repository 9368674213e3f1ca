//! Ollama client for the coaching flows.
//!
//! Both flows are single request/response calls against Ollama's chat API
//! in JSON mode. Transient failures (timeouts, refused connections, 5xx)
//! are retried with a linear backoff.

use crate::coach::prompts;
use crate::config::ModelConfig;
use crate::models::{FootageAnalysis, TargetLevel, TrainingPlan};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const RETRY_BACKOFF_MS: u64 = 500;

/// Errors from the coaching AI service.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to Ollama at {0}. Is Ollama running?")]
    Connection(String),

    #[error("Ollama API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Request(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("No coach feedback available to build a training plan")]
    NoFeedback,
}

impl CoachError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CoachError::Timeout(_) | CoachError::Connection(_) => true,
            CoachError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Connection settings for the coaching client.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub retries: usize,
}

impl From<&ModelConfig> for CoachConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            ollama_url: config.ollama_url.trim_end_matches('/').to_string(),
            model_name: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
            retries: config.retries,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: String,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for training plan and footage analysis requests.
pub struct CoachClient {
    config: CoachConfig,
    http_client: reqwest::Client,
}

impl CoachClient {
    /// Create a new client.
    pub fn new(config: CoachConfig) -> Result<Self, CoachError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CoachError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Name of the model requests are sent to.
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Generate a training plan from combined coach feedback.
    pub async fn generate_training_plan(
        &self,
        feedback: &str,
        position: &str,
    ) -> Result<TrainingPlan, CoachError> {
        if feedback.trim().is_empty() {
            return Err(CoachError::NoFeedback);
        }

        info!("Requesting training plan for position '{}'", position);
        let prompt = prompts::training_plan_prompt(feedback, position);
        let mut plan: TrainingPlan = self
            .chat_json(prompts::TRAINING_PLAN_SYSTEM_PROMPT, &prompt)
            .await?;

        if plan.actionable_steps.is_empty() {
            return Err(CoachError::InvalidResponse(
                "training plan contained no actionable steps".to_string(),
            ));
        }

        plan.suggested_videos.retain(|video| {
            let valid = video.url.starts_with("https://") || video.url.starts_with("http://");
            if !valid {
                warn!("Dropping suggested video with invalid URL: {}", video.url);
            }
            valid
        });

        Ok(plan)
    }

    /// Assess a player's highlight footage against their target level.
    pub async fn analyze_footage(
        &self,
        video_url: &str,
        target: TargetLevel,
        preferred_schools: &str,
    ) -> Result<FootageAnalysis, CoachError> {
        info!("Requesting footage analysis for {}", video_url);
        let prompt = prompts::footage_prompt(video_url, target, preferred_schools);
        self.chat_json(prompts::FOOTAGE_SYSTEM_PROMPT, &prompt).await
    }

    /// Send a prompt and decode the JSON reply, retrying transient failures.
    async fn chat_json<T: DeserializeOwned>(&self, system: &str, prompt: &str) -> Result<T, CoachError> {
        let mut attempt = 0;

        loop {
            match self.send_chat(system, prompt).await {
                Ok(content) => return parse_json_reply(&content),
                Err(e) if e.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying...",
                        attempt,
                        self.config.retries + 1,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send one chat request and return the assistant's message content.
    async fn send_chat(&self, system: &str, prompt: &str) -> Result<String, CoachError> {
        let url = format!("{}/api/chat", self.config.ollama_url);

        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            stream: false,
            format: "json".to_string(),
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending chat request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoachError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    CoachError::Connection(self.config.ollama_url.clone())
                } else {
                    CoachError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| CoachError::InvalidResponse(format!("unreadable chat response: {}", e)))?;

        Ok(chat_response.message.content)
    }
}

/// Decode a JSON object from model output, tolerating code fences and
/// chatter around it.
fn parse_json_reply<T: DeserializeOwned>(content: &str) -> Result<T, CoachError> {
    let start = content.find('{');
    let end = content.rfind('}');

    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(CoachError::InvalidResponse(
                "no JSON object in model output".to_string(),
            ))
        }
    };

    serde_json::from_str(json).map_err(|e| CoachError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::stub::{chat_body, serve};

    fn client(url: &str, retries: usize) -> CoachClient {
        CoachClient::new(CoachConfig {
            ollama_url: url.to_string(),
            model_name: "test-model".to_string(),
            temperature: 0.2,
            timeout_seconds: 10,
            retries,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_training_plan() {
        let plan = r#"{"actionableSteps": [{"title": "Footwork ladder", "description": "Daily ladder work."}], "suggestedVideos": [{"title": "Setter footwork", "url": "https://youtu.be/EXsMFJa-AEM"}, {"title": "Broken", "url": "youtube setter drills"}]}"#;
        let (url, requests) = serve(vec![(200, chat_body(plan))]);

        let plan = client(&url, 0)
            .generate_training_plan("Footwork is inconsistent.", "Setter")
            .await
            .unwrap();

        assert_eq!(plan.actionable_steps.len(), 1);
        assert_eq!(plan.actionable_steps[0].title, "Footwork ladder");
        assert_eq!(plan.suggested_videos.len(), 1);

        let request: serde_json::Value = serde_json::from_str(&requests.recv().unwrap()).unwrap();
        assert_eq!(request["model"], "test-model");
        assert_eq!(request["format"], "json");
        assert_eq!(request["stream"], false);
        assert!(request["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Footwork is inconsistent."));
    }

    #[tokio::test]
    async fn test_empty_feedback_skips_request() {
        let err = client("http://127.0.0.1:9", 0)
            .generate_training_plan("  \n", "Libero")
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::NoFeedback));
    }

    #[tokio::test]
    async fn test_analyze_footage_with_fenced_reply() {
        let reply = "```json\n{\"strengths\": \"Quick arm\", \"weaknesses\": \"Block timing\", \"overallAssessment\": \"Promising\"}\n```";
        let (url, _requests) = serve(vec![(200, chat_body(reply))]);

        let analysis = client(&url, 0)
            .analyze_footage("https://youtu.be/abc", TargetLevel::D2, "Tufts")
            .await
            .unwrap();

        assert_eq!(analysis.strengths, "Quick arm");
        assert_eq!(analysis.overall_assessment, "Promising");
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let plan = r#"{"actionableSteps": [{"title": "Serve zones", "description": "Target zone 1."}]}"#;
        let (url, requests) = serve(vec![
            (503, "busy".to_string()),
            (200, chat_body(plan)),
        ]);

        let plan = client(&url, 1)
            .generate_training_plan("Serve more aggressively.", "Opposite")
            .await
            .unwrap();

        assert_eq!(plan.actionable_steps[0].title, "Serve zones");
        assert!(plan.suggested_videos.is_empty());
        assert_eq!(requests.iter().take(2).count(), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, _requests) = serve(vec![(404, "model not found".to_string())]);

        let err = client(&url, 3)
            .generate_training_plan("Serve more aggressively.", "Opposite")
            .await
            .unwrap_err();

        match err {
            CoachError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_plan_without_steps_is_invalid() {
        let (url, _requests) = serve(vec![(200, chat_body(r#"{"actionableSteps": []}"#))]);

        let err = client(&url, 0)
            .generate_training_plan("Work on passing.", "Libero")
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_json_reply_without_object() {
        let result: Result<TrainingPlan, _> = parse_json_reply("I cannot help with that.");
        assert!(matches!(result, Err(CoachError::InvalidResponse(_))));
    }

    #[test]
    fn test_transient_errors() {
        assert!(CoachError::Timeout(30).is_transient());
        assert!(CoachError::Connection("http://x".to_string()).is_transient());
        assert!(CoachError::Api {
            status: 502,
            body: String::new()
        }
        .is_transient());
        assert!(!CoachError::Api {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!CoachError::NoFeedback.is_transient());
    }
}
