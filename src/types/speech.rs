use serde::{Deserialize, Serialize};

use crate::error::LLMError;
use crate::types::ResponseError;

/// Text-to-speech voices offered by the OpenAI speech endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

/// Audio container formats accepted by the speech endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

/// Canonical text-to-speech request.
///
/// Construct one through [`SpeechRequest::builder`]; model, input, and voice are
/// required, and speed is bounded to `0.25..=4.0` (default 1.0 server-side).
///
/// # Examples
///
/// ```
/// use hanashi::types::{SpeechRequest, Voice};
///
/// let request = SpeechRequest::builder()
///     .model("tts-1")
///     .input("Hello there.")
///     .voice(Voice::Nova)
///     .build()
///     .unwrap();
/// assert_eq!(request.input, "Hello there.");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Speech model identifier such as `tts-1` or `tts-1-hd`.
    pub model: String,
    /// Text to synthesize.
    pub input: String,
    /// Voice preset.
    pub voice: Voice,
    /// Output container format.
    #[serde(rename = "response_format", skip_serializing_if = "Option::is_none")]
    pub format: Option<AudioFormat>,
    /// Playback speed multiplier, `0.25..=4.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl SpeechRequest {
    /// Starts a new builder.
    pub fn builder() -> SpeechBuilder {
        SpeechBuilder::default()
    }
}

/// Canonical text-to-speech result: raw audio bytes plus error/status metadata.
#[derive(Debug, Clone, Default)]
pub struct SpeechResponse {
    /// Encoded audio payload; empty on failure.
    pub audio: Vec<u8>,
    /// Provider-reported error, `None` when the provider sent a zero-valued object.
    pub error: Option<ResponseError>,
    /// HTTP status the response arrived with.
    pub status_code: u16,
}

/// Fluent builder for [`SpeechRequest`].
#[derive(Debug, Clone, Default)]
pub struct SpeechBuilder {
    model: Option<String>,
    input: Option<String>,
    voice: Option<Voice>,
    format: Option<AudioFormat>,
    speed: Option<f64>,
}

impl SpeechBuilder {
    /// Sets the speech model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the text to synthesize.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Sets the voice preset.
    pub fn voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Sets the output container format.
    pub fn format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the playback speed multiplier.
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Validates the request and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Validation`] naming the missing field or violated range.
    pub fn build(self) -> Result<SpeechRequest, LLMError> {
        let model = match self.model {
            Some(model) if !model.is_empty() => model,
            _ => return Err(LLMError::validation("missing speech model")),
        };
        let input = match self.input {
            Some(input) if !input.is_empty() => input,
            _ => return Err(LLMError::validation("missing speech input")),
        };
        let voice = self
            .voice
            .ok_or_else(|| LLMError::validation("missing speech voice"))?;
        if let Some(speed) = self.speed {
            if !(0.25..=4.0).contains(&speed) {
                return Err(LLMError::validation(
                    "speed must be between 0.25 and 4.0",
                ));
            }
        }

        Ok(SpeechRequest {
            model,
            input,
            voice,
            format: self.format,
            speed: self.speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> SpeechBuilder {
        SpeechRequest::builder()
            .model("tts-1")
            .input("Hello there.")
            .voice(Voice::Alloy)
    }

    #[test]
    fn build_requires_model_input_and_voice() {
        assert!(SpeechRequest::builder()
            .input("hi")
            .voice(Voice::Echo)
            .build()
            .is_err());
        assert!(SpeechRequest::builder()
            .model("tts-1")
            .voice(Voice::Echo)
            .build()
            .is_err());
        assert!(SpeechRequest::builder()
            .model("tts-1")
            .input("hi")
            .build()
            .is_err());
        assert!(minimal().build().is_ok());
    }

    #[test]
    fn empty_strings_are_missing() {
        assert!(minimal().model("").build().is_err());
        assert!(minimal().input("").build().is_err());
    }

    #[test]
    fn speed_bounds_are_inclusive() {
        assert!(minimal().speed(5.0).build().is_err());
        assert!(minimal().speed(0.2).build().is_err());
        assert!(minimal().speed(0.25).build().is_ok());
        assert!(minimal().speed(4.0).build().is_ok());
    }

    #[test]
    fn wire_serialization_uses_provider_field_names() {
        let request = minimal()
            .format(AudioFormat::Flac)
            .speed(1.5)
            .build()
            .expect("request should build");
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["voice"], "alloy");
        assert_eq!(json["response_format"], "flac");
        assert_eq!(json["speed"], 1.5);
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let request = minimal().build().expect("request should build");
        let json = serde_json::to_value(&request).expect("serialize");
        let object = json.as_object().expect("object");

        assert!(!object.contains_key("response_format"));
        assert!(!object.contains_key("speed"));
    }
}
