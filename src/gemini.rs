//! Gemini client implementing the assistant boundary
//!
//! Thin transport: prompts and response validation live in
//! `lockin_core::assistant`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use lockin_core::assistant::{self, BrainDump, Playlist, ROAST_NO_SCHEDULE, SubTaskCandidate, prompts};
use lockin_core::{Assistant, CoreError, ScheduleDraft, ScheduleItem, Task, UserProfile};

use crate::config::Config;
use crate::error::{CliError, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Checked when the configured variable is not set
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

pub struct GeminiAssistant {
    client: Client,
    api_key: String,
    model: String,
    image_model: String,
}

impl GeminiAssistant {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .or_else(|_| std::env::var(FALLBACK_API_KEY_ENV))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CliError::config(format!("{} not set", config.api_key_env)))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            model: config.model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: String,
        config: Option<GenerationConfig>,
        tools: Option<Vec<GeminiTool>>,
    ) -> lockin_core::Result<Vec<ResponsePart>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: config,
            tools,
        };

        let url = format!("{}/{}:generateContent?key={}", GEMINI_API_URL, model, self.api_key);
        debug!(model, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::assistant_with_source("Gemini request failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::assistant(format!("Gemini API error: {} - {}", status, body)));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CoreError::assistant_with_source("Invalid Gemini response", e))?;

        if let Some(error) = api_response.error {
            return Err(CoreError::assistant(format!("Gemini error: {}", error.message)));
        }

        Ok(api_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default())
    }

    /// Concatenated text of the first candidate
    async fn generate_text(
        &self,
        prompt: String,
        config: Option<GenerationConfig>,
        tools: Option<Vec<GeminiTool>>,
    ) -> lockin_core::Result<String> {
        let parts = self.generate(&self.model, prompt, config, tools).await?;
        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn generate_schedule(
        &self,
        tasks: &[Task],
        profile: &UserProfile,
        context: Option<&str>,
    ) -> lockin_core::Result<Vec<ScheduleDraft>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = prompts::schedule_prompt(tasks, profile, context)?;
        let config = GenerationConfig::json(prompts::schedule_schema(), Some(prompts::SCHEDULE_TEMPERATURE));
        let text = self.generate_text(prompt, Some(config), None).await?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        assistant::parse_schedule(&text)
    }

    async fn break_down_task(&self, title: &str) -> lockin_core::Result<Vec<SubTaskCandidate>> {
        let config = GenerationConfig::json(prompts::subtask_schema(), Some(prompts::BREAKDOWN_TEMPERATURE));
        let text = self
            .generate_text(prompts::breakdown_prompt(title), Some(config), None)
            .await?;
        assistant::parse_subtasks(&text)
    }

    async fn summarize_free_text(&self, text: &str) -> BrainDump {
        let config = GenerationConfig::json(prompts::brain_dump_schema(), None);
        let response = self
            .generate_text(prompts::brain_dump_prompt(text), Some(config), None)
            .await;
        assistant::brain_dump_or_fallback(response)
    }

    async fn motivational_line(&self, completed: usize, remaining: usize) -> String {
        let response = self
            .generate_text(prompts::nudge_prompt(completed, remaining), None, None)
            .await;
        assistant::nudge_or_fallback(response)
    }

    async fn roast_line(&self, schedule: &[ScheduleItem]) -> String {
        if schedule.is_empty() {
            return ROAST_NO_SCHEDULE.to_string();
        }

        let response = match prompts::roast_prompt(schedule) {
            Ok(prompt) => self.generate_text(prompt, None, None).await,
            Err(e) => Err(e),
        };
        assistant::roast_or_fallback(response)
    }

    async fn generate_infographic(&self, schedule: &[ScheduleItem]) -> lockin_core::Result<String> {
        let config = GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: prompts::INFOGRAPHIC_ASPECT_RATIO,
            }),
            ..GenerationConfig::default()
        };

        let parts = self
            .generate(&self.image_model, prompts::infographic_prompt(schedule), Some(config), None)
            .await?;

        parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .map(|data| assistant::data_uri(&data.mime_type, &data.data))
            .ok_or_else(|| CoreError::assistant("No image data found in response"))
    }

    async fn import_playlist(&self, url: &str) -> lockin_core::Result<Playlist> {
        let tools = vec![GeminiTool {
            google_search: json!({}),
        }];
        let text = self
            .generate_text(prompts::playlist_prompt(url), None, Some(tools))
            .await?;

        assistant::parse_playlist(&text).map_err(|e| {
            CoreError::assistant_with_source(
                "Failed to extract playlist data. Ensure it's a valid public URL.",
                e,
            )
        })
    }
}

// API types

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

impl GenerationConfig {
    fn json(schema: Value, temperature: Option<f32>) -> Self {
        Self {
            response_mime_type: Some("application/json"),
            response_schema: Some(schema),
            temperature,
            image_config: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Serialize)]
struct GeminiTool {
    #[serde(rename = "googleSearch")]
    google_search: Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}
