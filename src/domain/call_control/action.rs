//! Telephony platform actions
//!
//! Field names and nesting are the platform's wire contract; every action
//! serializes as `{"Type": ..., "Parameters": {...}}`.

use crate::domain::shared::value_objects::{CallLegId, JoinToken, MeetingId};
use serde::{Deserialize, Serialize};

/// Synthesized voice settings shared by every spoken prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceParams {
    pub engine: String,
    pub language_code: String,
    pub voice_id: String,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            engine: "neural".to_string(),
            language_code: "en-US".to_string(),
            voice_id: "Joanna".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    Text,
    Ssml,
}

/// Text plus the voice that speaks it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Speech {
    pub text: String,
    pub engine: String,
    pub language_code: String,
    pub text_type: TextType,
    pub voice_id: String,
}

impl Speech {
    pub fn new(voice: &VoiceParams, text_type: TextType, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            engine: voice.engine.clone(),
            language_code: voice.language_code.clone(),
            text_type,
            voice_id: voice.voice_id.clone(),
        }
    }

    pub fn text(voice: &VoiceParams, text: impl Into<String>) -> Self {
        Self::new(voice, TextType::Text, text)
    }

    pub fn ssml(voice: &VoiceParams, text: impl Into<String>) -> Self {
        Self::new(voice, TextType::Ssml, text)
    }
}

/// Speak a prompt and collect DTMF digits; the platform repeats on bad input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollectDigits {
    #[serde(rename = "MinNumberOfDigits")]
    pub min_digits: u32,
    #[serde(rename = "MaxNumberOfDigits")]
    pub max_digits: u32,
    pub repeat: u32,
    #[serde(rename = "RepeatDurationInMilliseconds")]
    pub repeat_duration_ms: u64,
    pub input_digits_regex: String,
    #[serde(rename = "InBetweenDigitsDurationInMilliseconds")]
    pub inter_digit_timeout_ms: u64,
    pub terminator_digits: Vec<String>,
    pub speech_parameters: Speech,
    pub failure_speech_parameters: Speech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Speak {
    #[serde(rename = "CallId")]
    pub call_leg: CallLegId,
    #[serde(flatten)]
    pub speech: Speech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hangup {
    #[serde(rename = "CallId")]
    pub call_leg: CallLegId,
    #[serde(rename = "SipResponseCode")]
    pub sip_response_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinMeeting {
    pub join_token: JoinToken,
    #[serde(rename = "CallId")]
    pub call_leg: CallLegId,
    pub meeting_id: MeetingId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Type", content = "Parameters")]
pub enum Action {
    SpeakAndGetDigits(CollectDigits),
    Speak(Speak),
    Hangup(Hangup),
    #[serde(rename = "JoinChimeMeeting")]
    JoinMeeting(JoinMeeting),
}

impl Action {
    pub fn collect_digits(collect: CollectDigits) -> Self {
        Action::SpeakAndGetDigits(collect)
    }

    pub fn speak(call_leg: &CallLegId, speech: Speech) -> Self {
        Action::Speak(Speak {
            call_leg: call_leg.clone(),
            speech,
        })
    }

    pub fn hangup(call_leg: &CallLegId) -> Self {
        Action::Hangup(Hangup {
            call_leg: call_leg.clone(),
            sip_response_code: "0".to_string(),
        })
    }

    pub fn join_meeting(call_leg: &CallLegId, join_token: &JoinToken, meeting_id: &MeetingId) -> Self {
        Action::JoinMeeting(JoinMeeting {
            join_token: join_token.clone(),
            call_leg: call_leg.clone(),
            meeting_id: meeting_id.clone(),
        })
    }

    /// Wire name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SpeakAndGetDigits(_) => "SpeakAndGetDigits",
            Action::Speak(_) => "Speak",
            Action::Hangup(_) => "Hangup",
            Action::JoinMeeting(_) => "JoinChimeMeeting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_speak_wire_shape() {
        let voice = VoiceParams::default();
        let action = Action::speak(&CallLegId::new("leg-1"), Speech::text(&voice, "Disconnecting you."));

        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "Type": "Speak",
                "Parameters": {
                    "Text": "Disconnecting you.",
                    "CallId": "leg-1",
                    "Engine": "neural",
                    "LanguageCode": "en-US",
                    "TextType": "text",
                    "VoiceId": "Joanna"
                }
            })
        );
    }

    #[test]
    fn test_hangup_wire_shape() {
        let action = Action::hangup(&CallLegId::new("leg-1"));
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"Type": "Hangup", "Parameters": {"CallId": "leg-1", "SipResponseCode": "0"}})
        );
    }

    #[test]
    fn test_join_meeting_wire_shape() {
        let action = Action::join_meeting(
            &CallLegId::new("leg-1"),
            &JoinToken::new("token"),
            &MeetingId::new("meeting"),
        );
        assert_eq!(action.kind(), "JoinChimeMeeting");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "Type": "JoinChimeMeeting",
                "Parameters": {"JoinToken": "token", "CallId": "leg-1", "MeetingId": "meeting"}
            })
        );
    }

    #[test]
    fn test_collect_digits_wire_shape() {
        let voice = VoiceParams::default();
        let action = Action::collect_digits(CollectDigits {
            min_digits: 6,
            max_digits: 6,
            repeat: 3,
            repeat_duration_ms: 7500,
            input_digits_regex: "[0-9]".to_string(),
            inter_digit_timeout_ms: 1000,
            terminator_digits: vec!["#".to_string()],
            speech_parameters: Speech::ssml(&voice, "<speak>prompt</speak>"),
            failure_speech_parameters: Speech::text(&voice, "retry"),
        });

        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["Type"], "SpeakAndGetDigits");

        let params = &value["Parameters"];
        assert_eq!(params["MinNumberOfDigits"], 6);
        assert_eq!(params["MaxNumberOfDigits"], 6);
        assert_eq!(params["Repeat"], 3);
        assert_eq!(params["RepeatDurationInMilliseconds"], 7500);
        assert_eq!(params["InputDigitsRegex"], "[0-9]");
        assert_eq!(params["InBetweenDigitsDurationInMilliseconds"], 1000);
        assert_eq!(params["TerminatorDigits"], json!(["#"]));
        assert_eq!(params["SpeechParameters"]["TextType"], "ssml");
        assert_eq!(params["SpeechParameters"]["Text"], "<speak>prompt</speak>");
        assert_eq!(params["FailureSpeechParameters"]["TextType"], "text");
        assert_eq!(params["FailureSpeechParameters"]["VoiceId"], "Joanna");
    }
}
