// Shared fixtures for store tests

use crate::store::{Chat, Message, Participant};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed base time plus `minutes`
pub fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn participant(id: &str) -> Participant {
    Participant::new(format!("user_{}", id), id.to_uppercase(), "Tester")
}

/// Chat `id` last updated at `ts(minutes)`
pub fn chat(id: &str, minutes: i64) -> Chat {
    Chat::new(id, participant(id), ts(minutes))
}

/// Message `id` in `room` created at `ts(minutes)`
pub fn message(id: &str, room: &str, minutes: i64) -> Message {
    Message::new(id, room, "user_peer", format!("content of {}", id), ts(minutes))
}

pub fn chat_ids(chats: &[&Chat]) -> Vec<String> {
    chats.iter().map(|c| c.id.to_string()).collect()
}

pub fn message_ids(messages: &[&Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.to_string()).collect()
}
