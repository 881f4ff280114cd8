//! Voice platform request and response envelopes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ENVELOPE_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Inbound envelope posted by the voice platform
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub context: Option<Context>,
    #[schema(value_type = Object)]
    pub request: SkillRequest,
}

impl RequestEnvelope {
    /// Application id carried by the envelope, session first
    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.application.as_ref())
            .or_else(|| {
                self.context
                    .as_ref()
                    .and_then(|c| c.system.as_ref())
                    .and_then(|s| s.application.as_ref())
            })
            .map(|a| a.application_id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    pub session_id: Option<String>,
    pub application: Option<Application>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "System")]
    pub system: Option<SystemState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    pub application: Option<Application>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

/// The request body, discriminated by its `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SkillRequest {
    LaunchRequest(LaunchDetails),
    IntentRequest(IntentDetails),
    SessionEndedRequest(SessionEndedDetails),
    #[serde(other)]
    Unknown,
}

impl SkillRequest {
    pub fn request_type(&self) -> &'static str {
        match self {
            SkillRequest::LaunchRequest(_) => "LaunchRequest",
            SkillRequest::IntentRequest(_) => "IntentRequest",
            SkillRequest::SessionEndedRequest(_) => "SessionEndedRequest",
            SkillRequest::Unknown => "Unknown",
        }
    }

    /// Intent name, for intent requests only
    pub fn intent_name(&self) -> Option<&str> {
        match self {
            SkillRequest::IntentRequest(details) => Some(details.intent.name.as_str()),
            _ => None,
        }
    }

    pub fn intent(&self) -> Option<&Intent> {
        match self {
            SkillRequest::IntentRequest(details) => Some(&details.intent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDetails {
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDetails {
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
    pub locale: Option<String>,
    pub dialog_state: Option<String>,
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedDetails {
    pub request_id: Option<String>,
    pub reason: Option<String>,
    pub error: Option<SessionError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// Raw slot value, `None` when the slot is absent or unfilled
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|s| s.value.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Outbound envelope returned to the voice platform
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: SkillResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OutputSpeech {
    /// Always `PlainText`
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: "PlainText".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Assembles a response envelope.
///
/// The session stays open when a reprompt is given unless told otherwise.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    speech: Option<String>,
    reprompt: Option<String>,
    end_session: Option<bool>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    pub fn reprompt(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(text.into());
        self
    }

    pub fn end_session(mut self, end: bool) -> Self {
        self.end_session = Some(end);
        self
    }

    pub fn build(self) -> ResponseEnvelope {
        let should_end_session = self.end_session.unwrap_or(self.reprompt.is_none());
        ResponseEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            response: SkillResponse {
                output_speech: self.speech.map(OutputSpeech::plain),
                reprompt: self.reprompt.map(|text| Reprompt {
                    output_speech: OutputSpeech::plain(text),
                }),
                should_end_session,
            },
        }
    }
}

impl ResponseEnvelope {
    /// Spoken text, if any
    pub fn speech(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(|s| s.text.as_str())
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.response
            .reprompt
            .as_ref()
            .map(|r| r.output_speech.text.as_str())
    }
}
