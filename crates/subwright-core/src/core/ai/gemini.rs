//! Google Gemini Provider Implementation
//!
//! Implements the subtitle AI capabilities against the Gemini REST API:
//! transcription (inline audio upload + JSON-schema-constrained output),
//! cue translation, and speech synthesis (inline PCM payloads).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::ai::provider::{
    SourceCueText, SubtitleAiProvider, TranscriptionOutput, TranslatedCueText,
};
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Configuration
// =============================================================================

/// Gemini provider configuration
#[derive(Clone, Debug, Default)]
pub struct GeminiConfig {
    /// API key (required)
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Text/transcription model override
    pub model: Option<String>,
    /// Speech-synthesis model override
    pub tts_model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl GeminiConfig {
    /// Creates a config with an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Sets the text model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// =============================================================================
// Gemini Provider
// =============================================================================

/// Google Gemini API provider
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    tts_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Default Gemini API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default transcription/translation model
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Default speech-synthesis model
    pub const DEFAULT_TTS_MODEL: &'static str = "gemini-2.5-flash-preview-tts";

    /// Creates a new Gemini provider
    pub fn new(config: GeminiConfig) -> CoreResult<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| CoreError::ValidationError("Gemini API key is required".to_string()))?;
        if api_key.is_empty() {
            return Err(CoreError::ValidationError(
                "Gemini API key cannot be empty".to_string(),
            ));
        }

        let timeout_secs = config.timeout_secs.unwrap_or(120);
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config
                .base_url
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            model: config.model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            tts_model: config
                .tts_model
                .unwrap_or_else(|| Self::DEFAULT_TTS_MODEL.to_string()),
            client,
        })
    }

    /// POSTs a generateContent request and returns the parsed response.
    /// The API key travels in a header so it never leaks into logs.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> CoreResult<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CoreError::Internal(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| CoreError::Internal(format!("Failed to parse response: {}", e)))
    }

    fn first_text(response: &GenerateContentResponse) -> CoreResult<String> {
        response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or_else(|| CoreError::Internal("No text candidate returned".to_string()))
    }
}

// =============================================================================
// Gemini API Types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// JSON schema the transcription response must conform to
fn transcript_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "language": { "type": "string" },
            "entries": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "startTime": { "type": "string" },
                        "endTime": { "type": "string" },
                        "text": { "type": "string" },
                        "speaker": { "type": "string" }
                    },
                    "required": ["startTime", "endTime", "text"]
                }
            }
        },
        "required": ["language", "entries"]
    })
}

/// JSON schema the translation response must conform to
fn translation_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "translatedText": { "type": "string" }
            },
            "required": ["id", "translatedText"]
        }
    })
}

// =============================================================================
// SubtitleAiProvider Implementation
// =============================================================================

#[async_trait]
impl SubtitleAiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> CoreResult<TranscriptionOutput> {
        let prompt = "Transcribe this audio into subtitle entries. Use HH:MM:SS,mmm \
                      timestamps. Label speakers when more than one voice is present. \
                      Respond with JSON only.";

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(audio),
                        }),
                        ..Default::default()
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        ..Default::default()
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(transcript_schema()),
                response_modalities: None,
                speech_config: None,
            }),
        };

        let response = self
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| CoreError::TranscriptionFailed(e.to_string()))?;

        let text = Self::first_text(&response)
            .map_err(|e| CoreError::TranscriptionFailed(e.to_string()))?;

        serde_json::from_str::<TranscriptionOutput>(&text)
            .map_err(|e| CoreError::TranscriptionFailed(format!("bad transcript JSON: {}", e)))
    }

    async fn translate(
        &self,
        entries: Vec<SourceCueText>,
        target_language: &str,
    ) -> CoreResult<Vec<TranslatedCueText>> {
        let payload = serde_json::to_string(&entries)
            .map_err(|e| CoreError::TranslationFailed(e.to_string()))?;
        let prompt = format!(
            "Translate the \"text\" of each entry into {}. Keep ids unchanged. \
             Respond with JSON only.\n\n{}",
            target_language, payload
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt),
                    ..Default::default()
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(translation_schema()),
                response_modalities: None,
                speech_config: None,
            }),
        };

        let response = self
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| CoreError::TranslationFailed(e.to_string()))?;

        let text = Self::first_text(&response)
            .map_err(|e| CoreError::TranslationFailed(e.to_string()))?;

        serde_json::from_str::<Vec<TranslatedCueText>>(&text)
            .map_err(|e| CoreError::TranslationFailed(format!("bad translation JSON: {}", e)))
    }

    async fn synthesize_speech(&self, chunk: &str, voice: &str) -> CoreResult<Vec<u8>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(chunk.to_string()),
                    ..Default::default()
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
            }),
        };

        let response = self.generate_content(&self.tts_model, &request).await?;

        // Empty audio is not an error here - the batch pipeline's skip
        // policy owns that decision.
        let Some(data) = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.inline_data.as_ref())
            .map(|d| d.data.clone())
        else {
            return Ok(Vec::new());
        };

        BASE64
            .decode(data.as_bytes())
            .map_err(|e| CoreError::Internal(format!("bad audio payload: {}", e)))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
