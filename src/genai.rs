use crate::config::Config;
use crate::story::ImageData;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Remote generation capabilities. Each call is attempted exactly once;
/// retry and timeout policy is whatever the transport provides.
#[async_trait]
pub trait GenAiClient: Send + Sync + Debug {
    /// Free-text generation.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
    /// Like `generate_text`, but asks the model for a JSON-typed response.
    async fn generate_json(&self, prompt: &str) -> Result<String>;
    /// Text-to-image generation.
    async fn generate_image(&self, prompt: &str) -> Result<ImageData>;
    /// Vision-to-text: describe the supplied image.
    async fn describe_image(&self, mime_type: &str, data: &[u8], prompt: &str) -> Result<String>;
}

pub fn create_client(config: &Config) -> Result<Box<dyn GenAiClient>> {
    match config.genai.provider.as_str() {
        "gemini" => {
            let cfg = config.genai.gemini.as_ref().context("Gemini config missing")?;
            if cfg.api_key.trim().is_empty() {
                anyhow::bail!(
                    "Gemini API key is empty. Set genai.gemini.api_key in config.yml before generating."
                );
            }
            Ok(Box::new(GeminiClient::new(
                &cfg.api_key,
                &cfg.text_model,
                &cfg.image_model,
            )))
        }
        other => Err(anyhow!("Unknown generation provider: {}", other)),
    }
}

// --- Gemini ---

#[derive(Debug)]
struct GeminiClient {
    api_key: String,
    text_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    fn new(api_key: &str, text_model: &str, image_model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn generate_content(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model, self.api_key
        );

        let resp = self.client.post(&url).json(request).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Gemini API error: {}", error_text));
        }

        // Keep the raw body around to debug malformed responses.
        let response_text = resp.text().await?;
        let result: GeminiResponse = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                return Err(anyhow!(
                    "Failed to parse Gemini response: {}. Body: {}",
                    e,
                    response_text
                ))
            }
        };

        if let Some(err) = result.error {
            return Err(anyhow!("Gemini API returned error: {}", err.message));
        }

        Ok(result)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    fn text(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        }
    }

    fn json(prompt: &str) -> Self {
        let mut request = Self::text(prompt);
        request.generation_config = Some(GeminiGenerationConfig {
            response_mime_type: "application/json".to_string(),
        });
        request
    }

    fn with_image(mime_type: &str, data: &[u8], prompt: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![
                    GeminiPart {
                        text: None,
                        inline_data: Some(GeminiInlineData {
                            mime_type: mime_type.to_string(),
                            data: encoded,
                        }),
                    },
                    GeminiPart {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: None,
        }
    }
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Serialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<GeminiInlineDataResponse>,
}

#[derive(Deserialize)]
struct GeminiInlineDataResponse {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(candidates) = response.candidates {
        if let Some(first) = candidates.first() {
            if let Some(content) = &first.content {
                if let Some(text) = content.parts.iter().find_map(|p| p.text.as_ref()) {
                    return Ok(text.clone());
                }
            }

            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(anyhow!("Gemini response empty. Finish reason: {}", reason));
        }
    }

    Err(anyhow!("Gemini response contained no candidates"))
}

fn extract_image(response: GeminiResponse) -> Result<ImageData> {
    if let Some(candidates) = response.candidates {
        if let Some(first) = candidates.first() {
            if let Some(content) = &first.content {
                if let Some(inline) = content.parts.iter().find_map(|p| p.inline_data.as_ref()) {
                    let data = base64::engine::general_purpose::STANDARD
                        .decode(&inline.data)
                        .context("Gemini inline image data is not valid base64")?;
                    return Ok(ImageData {
                        mime_type: inline.mime_type.clone(),
                        data,
                    });
                }
            }

            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(anyhow!("Gemini response contained no image data. Finish reason: {}", reason));
        }
    }

    Err(anyhow!("Gemini response contained no candidates"))
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let response = self
            .generate_content(&self.text_model, &GeminiRequest::text(prompt))
            .await?;
        extract_text(response)
    }

    async fn generate_json(&self, prompt: &str) -> Result<String> {
        let response = self
            .generate_content(&self.text_model, &GeminiRequest::json(prompt))
            .await?;
        extract_text(response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageData> {
        let response = self
            .generate_content(&self.image_model, &GeminiRequest::text(prompt))
            .await?;
        extract_image(response)
    }

    async fn describe_image(&self, mime_type: &str, data: &[u8], prompt: &str) -> Result<String> {
        let response = self
            .generate_content(
                &self.text_model,
                &GeminiRequest::with_image(mime_type, data, prompt),
            )
            .await?;
        extract_text(response)
    }
}
