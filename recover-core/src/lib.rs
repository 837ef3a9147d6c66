// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recover Core Library
//!
//! Reads messages, contacts and voicemails out of a local iOS device backup.
//! Databases are located by their hashed backup names, opened read-only in
//! memory and queried with bound parameters only.

pub mod backup;
pub mod cache;
pub mod config;
pub mod contact;
pub mod error;
pub mod export;
pub mod query;
pub mod session;

pub use backup::{
    resolve, BackupStore, DatabaseKind, DirectoryHandle, FsDirectory, LogicalFile,
    MockDirectory, ObfuscatedName, HOME_DOMAIN,
};
pub use cache::SessionCache;
pub use config::{SessionConfig, DEFAULT_PAGE_SIZE};
pub use contact::{
    initials, normalize_identifier, ContactLookup, ContactResolver, ResolvedName,
};
pub use error::{RecoverError, RecoverResult};
pub use query::{
    list_conversations, list_messages, list_voicemails, normalize_timestamp, open_database,
    Conversation, ConversationCursor, LoadedDatabase, Message, MessagePage, NormalizedTimestamp,
    Voicemail,
};
pub use session::{
    CallbackHandler, EventHandler, Operation, OperationState, RecoverEvent, Session,
};
