//! Caller-facing prompts

use super::action::{CollectDigits, Speech, VoiceParams};
use crate::domain::shared::value_objects::{EventId, PASSCODE_LEN};

pub const EVENT_ID_PROMPT: &str = "<speak>Please enter your 6 digit event i d</speak>";
pub const PASSCODE_PROMPT: &str =
    "<speak>Please enter your 6 digit passcode to join the meeting.</speak>";
pub const DIGITS_RETRY: &str = "Sorry, I didn't get that.  Please try again.";
pub const JOIN_CHOICE_RETRY: &str =
    "Sorry, I didn't get that.  Please press 1 to join, 2 to decline.";

pub const DISCONNECTING: &str = "Disconnecting you.";
pub const INVALID_PASSCODE: &str = "Invalid meeting passcode.";
pub const JOINED: &str = "You have been joined to the meeting.";
pub const JOIN_FAILED: &str = "Sorry, I could not connect you to the meeting";

/// Digit the paged participant presses to accept
pub const ACCEPT_DIGIT: &str = "1";

const DIGIT_REPEATS: u32 = 3;
const INTER_DIGIT_TIMEOUT_MS: u64 = 1000;
const TERMINATOR: &str = "#";

/// Six digit entry used for both the event id and the passcode
pub fn six_digit_entry(voice: &VoiceParams, prompt: &str) -> CollectDigits {
    CollectDigits {
        min_digits: PASSCODE_LEN as u32,
        max_digits: PASSCODE_LEN as u32,
        repeat: DIGIT_REPEATS,
        repeat_duration_ms: 7500,
        input_digits_regex: "[0-9]".to_string(),
        inter_digit_timeout_ms: INTER_DIGIT_TIMEOUT_MS,
        terminator_digits: vec![TERMINATOR.to_string()],
        speech_parameters: Speech::ssml(voice, prompt),
        failure_speech_parameters: Speech::text(voice, DIGITS_RETRY),
    }
}

/// Single digit accept/decline choice offered to a paged participant
pub fn join_choice(voice: &VoiceParams, event_id: &EventId) -> CollectDigits {
    let prompt = format!(
        "<speak>You are needed on a call for event <say-as interpret-as='digits'>{}</say-as>. \
         Press 1 to join, 2 to decline.</speak>",
        event_id
    );
    CollectDigits {
        min_digits: 1,
        max_digits: 1,
        repeat: DIGIT_REPEATS,
        repeat_duration_ms: 3000,
        input_digits_regex: "[1-2]".to_string(),
        inter_digit_timeout_ms: INTER_DIGIT_TIMEOUT_MS,
        terminator_digits: vec![TERMINATOR.to_string()],
        speech_parameters: Speech::ssml(voice, prompt),
        failure_speech_parameters: Speech::text(voice, JOIN_CHOICE_RETRY),
    }
}
