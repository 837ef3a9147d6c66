// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation cursor
//!
//! Pages arrive newest first. The cursor keeps every loaded message in one
//! oldest-to-newest list, so older pages are prepended as the user scrolls
//! up.

use serde::{Deserialize, Serialize};

use super::types::{Message, MessagePage};

/// Pagination state for the currently selected conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCursor {
    chat_id: String,
    page: usize,
    is_end: bool,
    messages: Vec<Message>,
}

impl ConversationCursor {
    /// A fresh cursor: page 0, not at the end, no messages.
    pub fn new(chat_id: &str) -> Self {
        ConversationCursor {
            chat_id: chat_id.to_string(),
            page: 0,
            is_end: false,
            messages: Vec::new(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Index of the next page to request.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }

    /// Loaded messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Folds a fetched page into the cursor.
    ///
    /// An empty page marks the end and leaves the messages untouched.
    /// Otherwise the page is reversed and placed before the messages
    /// already loaded, and the page counter advances.
    pub fn apply(&mut self, page: MessagePage) {
        if page.is_end || page.messages.is_empty() {
            self.is_end = true;
            return;
        }
        let mut older = page.messages;
        older.reverse();
        older.append(&mut self.messages);
        self.messages = older;
        self.page += 1;
    }
}
