//! HTTP speech server provider
//!
//! POST {base_url}/api/tts/infer
//! Request: {"model": "...", "text": "...", "voice": "...", "reference_audio": "...", "emotion": "..."}
//! Response: audio/wav body

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::{ModelError, Result};
use crate::provider::{SpeechRequest, SpeechSynthesizer, VoiceSelector};
use crate::waveform::Waveform;

pub const DEFAULT_SPEECH_SERVER_URL: &str = "http://localhost:8000";

/// Synthesizer that delegates to a speech server over HTTP
pub struct SpeechServerSynthesizer {
    model: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    model: &'a str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion: Option<&'static str>,
}

impl SpeechServerSynthesizer {
    pub fn new(
        model: &str,
        base_url: Option<&str>,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            model: model.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_SPEECH_SERVER_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client,
        })
    }

    fn infer_url(&self) -> String {
        format!("{}/api/tts/infer", self.base_url)
    }

    fn build_body<'a>(&'a self, request: &'a SpeechRequest) -> InferRequest<'a> {
        let (voice, reference_audio) = match &request.voice {
            VoiceSelector::Preset(id) => (Some(id.as_str()), None),
            VoiceSelector::Reference(path) => (None, Some(path.to_string_lossy().into_owned())),
            VoiceSelector::Prompt(_) => (None, None),
        };

        InferRequest {
            model: &self.model,
            text: request.rendered_text(),
            voice,
            reference_audio,
            emotion: request.emotion.map(|e| e.as_str()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechServerSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Waveform> {
        let body = self.build_body(request);

        log::debug!(
            "POST {} ({} chars, voice {:?})",
            self.infer_url(),
            body.text.chars().count(),
            request.voice
        );

        let mut http = self.client.post(self.infer_url()).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| ModelError::ApiError {
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => ModelError::RateLimited { retry_after: None },
                503 => ModelError::ModelLoading { message },
                code => ModelError::ApiError {
                    message,
                    status_code: Some(code),
                },
            });
        }

        let bytes = response.bytes().await.map_err(|e| ModelError::ApiError {
            message: format!("Failed to read audio: {}", e),
            status_code: None,
        })?;

        Waveform::from_wav_bytes(&bytes)
    }

    fn name(&self) -> &'static str {
        "speech server"
    }

    fn is_available(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ModelError::ProviderUnavailable(
                "speech server base_url is empty".to_string(),
            ));
        }
        Ok(())
    }
}
