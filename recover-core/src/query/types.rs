// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rows handed to the UI.

use serde::{Deserialize, Serialize};

use super::timestamp::NormalizedTimestamp;

/// The most recent message of one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Handle identifier (phone number or email) of the other party.
    pub chat_id: String,
    /// 1 if the most recent message was sent from the device, 0 otherwise.
    pub is_from_me: i64,
    pub timestamp: NormalizedTimestamp,
    pub preview: Option<String>,
    pub display_name: String,
    pub initials: String,
}

/// A single message within a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub chat_id: String,
    pub is_from_me: i64,
    pub timestamp: NormalizedTimestamp,
    pub text: Option<String>,
    /// Transport, e.g. "SMS" or "iMessage".
    pub service: Option<String>,
    pub display_name: String,
    pub initials: String,
}

impl Message {
    pub fn is_outgoing(&self) -> bool {
        self.is_from_me != 0
    }
}

/// A voicemail left on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voicemail {
    pub row_id: i64,
    pub sender: Option<String>,
    /// Length in seconds.
    pub duration: i64,
    pub date: NormalizedTimestamp,
    pub display_name: String,
    pub initials: String,
}

/// One page of messages, newest first as returned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// No rows exist at the requested offset.
    pub is_end: bool,
}
