// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Export of loaded conversations and voicemails.

use serde::Serialize;

use crate::error::RecoverResult;
use crate::query::{ConversationCursor, Message, Voicemail};

/// Label used for messages sent from the device in text transcripts.
pub const OWN_LABEL: &str = "Me";

#[derive(Serialize)]
struct ConversationExport<'a> {
    chat_id: &'a str,
    display_name: Option<&'a str>,
    complete: bool,
    messages: &'a [Message],
}

/// Pretty JSON of the messages loaded in `cursor`, oldest first.
///
/// `complete` is true when every page of the conversation was loaded.
pub fn conversation_to_json(cursor: &ConversationCursor) -> RecoverResult<String> {
    let export = ConversationExport {
        chat_id: cursor.chat_id(),
        display_name: cursor.messages().first().map(|m| m.display_name.as_str()),
        complete: cursor.is_end(),
        messages: cursor.messages(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Pretty JSON of a voicemail list.
pub fn voicemails_to_json(voicemails: &[Voicemail]) -> RecoverResult<String> {
    Ok(serde_json::to_string_pretty(voicemails)?)
}

/// Plain-text transcript, one line per message:
/// `[2021-03-04T10:00:00Z] Jane Appleseed: text`.
pub fn conversation_to_text(cursor: &ConversationCursor) -> String {
    let mut out = String::new();
    for message in cursor.messages() {
        let sender = if message.is_outgoing() {
            OWN_LABEL
        } else {
            message.display_name.as_str()
        };
        out.push_str(&format!(
            "[{}] {}: {}\n",
            message.timestamp,
            sender,
            message.text.as_deref().unwrap_or("")
        ));
    }
    out
}
