// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Query Engine
//!
//! Opens backup databases and runs the conversation, message and voicemail
//! queries. All values reach SQLite as bound parameters. Missing dates sort
//! as the oldest rows; they are never filtered out.

mod database;
mod pagination;
mod timestamp;
mod types;

pub use database::{open_database, LoadedDatabase};
pub use pagination::ConversationCursor;
pub use timestamp::{normalize_timestamp, NormalizedTimestamp, APPLE_EPOCH_OFFSET};
pub use types::{Conversation, Message, MessagePage, Voicemail};

use tracing::debug;

use crate::contact::ContactLookup;
use crate::error::RecoverResult;
use timestamp::raw_timestamp;

/// Display name for voicemails without a caller id.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Latest message per handle, newest chat first.
///
/// SQLite takes the bare columns from the row holding the `MAX()`.
const CONVERSATIONS_SQL: &str = "SELECT h.id, m.is_from_me, MAX(COALESCE(m.date, 0)) AS last_date, m.text
     FROM message m
     JOIN handle h ON h.ROWID = m.handle_id
     GROUP BY h.id
     ORDER BY last_date DESC, h.id ASC";

const MESSAGES_SQL: &str = "SELECT h.id, m.is_from_me, m.date, m.text, m.service
     FROM message m
     JOIN handle h ON h.ROWID = m.handle_id
     WHERE h.id = ?1
     ORDER BY COALESCE(m.date, 0) DESC, m.ROWID DESC
     LIMIT ?2 OFFSET ?3";

const VOICEMAILS_SQL: &str = "SELECT ROWID, sender, duration, date
     FROM voicemail
     ORDER BY COALESCE(date, 0) DESC, ROWID DESC";

struct ConversationRow {
    chat_id: String,
    is_from_me: i64,
    date: i64,
    text: Option<String>,
}

struct MessageRow {
    chat_id: String,
    is_from_me: i64,
    date: i64,
    text: Option<String>,
    service: Option<String>,
}

struct VoicemailRow {
    row_id: i64,
    sender: Option<String>,
    duration: i64,
    date: i64,
}

/// Lists one entry per chat, ordered by the most recent message.
///
/// Names are resolved one chat at a time; output order follows the query.
pub fn list_conversations(
    sms: &LoadedDatabase,
    contacts: &ContactLookup<'_>,
) -> RecoverResult<Vec<Conversation>> {
    let rows = sms.with_connection(|conn| {
        let mut stmt = conn.prepare(CONVERSATIONS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(ConversationRow {
                chat_id: row.get(0)?,
                is_from_me: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                date: raw_timestamp(row, 2)?,
                text: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?;

    let mut conversations = Vec::with_capacity(rows.len());
    for row in rows {
        let name = contacts.resolve(&row.chat_id)?;
        conversations.push(Conversation {
            chat_id: row.chat_id,
            is_from_me: row.is_from_me,
            timestamp: normalize_timestamp(row.date),
            preview: row.text,
            display_name: name.display_name,
            initials: name.initials,
        });
    }

    debug!(count = conversations.len(), "listed conversations");
    Ok(conversations)
}

/// Fetches page `page` of `chat_id`, newest message first.
///
/// An empty result reports `is_end`.
pub fn list_messages(
    sms: &LoadedDatabase,
    chat_id: &str,
    page: usize,
    page_size: usize,
    contacts: &ContactLookup<'_>,
) -> RecoverResult<MessagePage> {
    let limit = i64::try_from(page_size).unwrap_or(i64::MAX);
    let offset = limit.saturating_mul(i64::try_from(page).unwrap_or(i64::MAX));

    let rows = sms.with_connection(|conn| {
        let mut stmt = conn.prepare(MESSAGES_SQL)?;
        let rows = stmt.query_map(rusqlite::params![chat_id, limit, offset], |row| {
            Ok(MessageRow {
                chat_id: row.get(0)?,
                is_from_me: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                date: raw_timestamp(row, 2)?,
                text: row.get(3)?,
                service: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?;

    if rows.is_empty() {
        debug!(chat_id, page, "no more messages");
        return Ok(MessagePage {
            messages: Vec::new(),
            is_end: true,
        });
    }

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let name = contacts.resolve(&row.chat_id)?;
        messages.push(Message {
            chat_id: row.chat_id,
            is_from_me: row.is_from_me,
            timestamp: normalize_timestamp(row.date),
            text: row.text,
            service: row.service,
            display_name: name.display_name,
            initials: name.initials,
        });
    }

    debug!(chat_id, page, count = messages.len(), "listed messages");
    Ok(MessagePage {
        messages,
        is_end: false,
    })
}

/// Lists every voicemail, newest first.
pub fn list_voicemails(
    voicemails: &LoadedDatabase,
    contacts: &ContactLookup<'_>,
) -> RecoverResult<Vec<Voicemail>> {
    let rows = voicemails.with_connection(|conn| {
        let mut stmt = conn.prepare(VOICEMAILS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(VoicemailRow {
                row_id: row.get(0)?,
                sender: row.get(1)?,
                duration: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                date: raw_timestamp(row, 3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?;

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let (display_name, initials) = match row.sender.as_deref() {
            Some(sender) if !sender.trim().is_empty() => {
                let name = contacts.resolve(sender)?;
                (name.display_name, name.initials)
            }
            _ => (UNKNOWN_SENDER.to_string(), String::new()),
        };
        result.push(Voicemail {
            row_id: row.row_id,
            sender: row.sender,
            duration: row.duration,
            date: normalize_timestamp(row.date),
            display_name,
            initials,
        });
    }

    debug!(count = result.len(), "listed voicemails");
    Ok(result)
}
