// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session
//!
//! Main entry point for a UI browsing one backup. It coordinates:
//! - The granted backup folder and its loaded databases
//! - Contact name resolution
//! - Paging through the selected conversation
//! - Loading and error state per operation, mirrored as events
//!
//! # Example
//!
//! ```ignore
//! use recover_core::{Session, SessionConfig};
//!
//! let session = Session::new(SessionConfig::default());
//! session.open_path("/path/to/Backup/00008030-001A")?;
//!
//! let conversations = session.conversations()?;
//! session.select_conversation(&conversations[0].chat_id);
//! let cursor = session.load_more_messages()?;
//! for message in cursor.messages() {
//!     println!("{} {:?}", message.timestamp, message.text);
//! }
//! ```

mod events;

pub use events::{CallbackHandler, EventHandler, RecoverEvent};

use events::EventDispatcher;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::backup::{BackupStore, DatabaseKind, DirectoryHandle, FsDirectory};
use crate::config::SessionConfig;
use crate::contact::{ContactLookup, ContactResolver};
use crate::error::{RecoverError, RecoverResult};
use crate::export;
use crate::query::{
    list_conversations, list_messages, list_voicemails, Conversation, ConversationCursor,
    LoadedDatabase, Voicemail,
};

/// User-triggered operations whose progress the UI displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Conversations,
    Messages,
    Voicemails,
}

/// Progress of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(RecoverError),
}

impl OperationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Loading)
    }

    pub fn error(&self) -> Option<&RecoverError> {
        match self {
            OperationState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The open conversation. The token changes on every selection so that a
/// page fetched for an earlier selection is never applied to a later one.
struct Selection {
    token: u64,
    cursor: ConversationCursor,
}

/// One browsing session over one backup folder.
pub struct Session {
    config: SessionConfig,
    store: BackupStore,
    contacts: ContactResolver,
    states: Mutex<HashMap<Operation, OperationState>>,
    selection: Mutex<Option<Selection>>,
    next_token: AtomicU64,
    events: EventDispatcher,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Creates a session with no folder granted yet.
    ///
    /// A page size of zero is raised to one.
    pub fn new(mut config: SessionConfig) -> Self {
        config.page_size = config.page_size.max(1);
        let store = BackupStore::new().with_scratch_dir(config.scratch_dir.clone());
        let contacts = ContactResolver::new(&config);
        Session {
            config,
            store,
            contacts,
            states: Mutex::new(HashMap::new()),
            selection: Mutex::new(None),
            next_token: AtomicU64::new(0),
            events: EventDispatcher::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &BackupStore {
        &self.store
    }

    pub fn contacts(&self) -> &ContactResolver {
        &self.contacts
    }

    // === Events ===

    /// Adds an event handler.
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.events.add(handler);
    }

    /// Clears all event handlers.
    pub fn clear_event_handlers(&mut self) {
        self.events.clear();
    }

    // === Directory ===

    /// Starts a new session on `root`, discarding everything from the
    /// previous folder.
    pub fn open_directory(&self, root: Arc<dyn DirectoryHandle>) {
        let name = root.name().to_string();
        self.clear_session_state();
        self.store.initialize(root);
        self.events.emit(RecoverEvent::DirectoryOpened { name });
    }

    /// Opens a backup folder on the local filesystem.
    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> RecoverResult<()> {
        let dir = FsDirectory::open(path)?;
        self.open_directory(Arc::new(dir));
        Ok(())
    }

    /// Forgets the folder, loaded databases, resolved names and the cursor.
    pub fn reset(&self) {
        self.store.reset();
        self.clear_session_state();
    }

    fn clear_session_state(&self) {
        self.contacts.reset();
        *self.selection.lock() = None;
        self.states.lock().clear();
        self.events.emit(RecoverEvent::SessionReset);
    }

    // === Operations ===

    /// Current state of `operation`.
    pub fn state(&self, operation: Operation) -> OperationState {
        self.states
            .lock()
            .get(&operation)
            .cloned()
            .unwrap_or_default()
    }

    /// Lists conversations, most recent first.
    pub fn conversations(&self) -> RecoverResult<Vec<Conversation>> {
        self.run(Operation::Conversations, || {
            let sms = self.store.load(DatabaseKind::Sms)?;
            let address_book = self.address_book()?;
            let lookup = ContactLookup::new(&self.contacts, address_book.as_deref());
            list_conversations(&sms, &lookup)
        })
    }

    /// Lists voicemails, most recent first.
    pub fn voicemails(&self) -> RecoverResult<Vec<Voicemail>> {
        self.run(Operation::Voicemails, || {
            let voicemails = self.store.load(DatabaseKind::Voicemails)?;
            let address_book = self.address_book()?;
            let lookup = ContactLookup::new(&self.contacts, address_book.as_deref());
            list_voicemails(&voicemails, &lookup)
        })
    }

    /// Opens `chat_id` with a fresh cursor. No messages are fetched yet.
    pub fn select_conversation(&self, chat_id: &str) -> ConversationCursor {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        let cursor = ConversationCursor::new(chat_id);
        *self.selection.lock() = Some(Selection {
            token,
            cursor: cursor.clone(),
        });
        self.states.lock().remove(&Operation::Messages);
        self.events.emit(RecoverEvent::ConversationSelected {
            chat_id: chat_id.to_string(),
        });
        cursor
    }

    /// Closes the conversation view and drops its cursor.
    pub fn back_to_list(&self) {
        *self.selection.lock() = None;
        self.states.lock().remove(&Operation::Messages);
        self.events.emit(RecoverEvent::ConversationClosed);
    }

    /// Snapshot of the open conversation's cursor.
    pub fn cursor(&self) -> Option<ConversationCursor> {
        self.selection
            .lock()
            .as_ref()
            .map(|selection| selection.cursor.clone())
    }

    /// Fetches the next older page of the open conversation.
    ///
    /// Returns the updated cursor. Once the end is reached no further
    /// queries are issued. If another conversation is selected while the
    /// page is loading, nothing from that fetch reaches the new selection.
    pub fn load_more_messages(&self) -> RecoverResult<ConversationCursor> {
        let (token, chat_id, page) = {
            let selection = self.selection.lock();
            let selection = selection
                .as_ref()
                .ok_or(RecoverError::NoConversationSelected)?;
            if selection.cursor.is_end() {
                return Ok(selection.cursor.clone());
            }
            (
                selection.token,
                selection.cursor.chat_id().to_string(),
                selection.cursor.page(),
            )
        };

        let fetched = self.run_for_selection(Operation::Messages, Some(token), || {
            let sms = self.store.load(DatabaseKind::Sms)?;
            let address_book = self.address_book()?;
            let lookup = ContactLookup::new(&self.contacts, address_book.as_deref());
            list_messages(&sms, &chat_id, page, self.config.page_size, &lookup)
        })?;

        let mut selection = self.selection.lock();
        let selection = selection
            .as_mut()
            .ok_or(RecoverError::NoConversationSelected)?;
        if selection.token == token && selection.cursor.page() == page {
            selection.cursor.apply(fetched);
        }
        Ok(selection.cursor.clone())
    }

    /// JSON transcript of the messages loaded for the open conversation.
    pub fn export_conversation_json(&self) -> RecoverResult<String> {
        let cursor = self.cursor().ok_or(RecoverError::NoConversationSelected)?;
        export::conversation_to_json(&cursor)
    }

    /// The address book, or `None` when it is missing or unreadable.
    fn address_book(&self) -> RecoverResult<Option<Arc<LoadedDatabase>>> {
        match self.store.load(DatabaseKind::AddressBook) {
            Ok(db) => Ok(Some(db)),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "address book unavailable, showing raw identifiers");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Records `state` unless `token` names a selection that is no longer open.
    ///
    /// Returns whether the state was recorded.
    fn publish_state(
        &self,
        operation: Operation,
        token: Option<u64>,
        state: OperationState,
    ) -> bool {
        let selection = self.selection.lock();
        if let Some(token) = token {
            if selection.as_ref().map(|current| current.token) != Some(token) {
                debug!(?operation, "dropping state of a superseded selection");
                return false;
            }
        }
        self.states.lock().insert(operation, state);
        true
    }

    /// Runs `f` with the loading flag set, leaving `Ready` or `Failed` behind.
    fn run<T, F>(&self, operation: Operation, f: F) -> RecoverResult<T>
    where
        F: FnOnce() -> RecoverResult<T>,
    {
        self.run_for_selection(operation, None, f)
    }

    /// Like [`run`](Self::run), but state and events are only published
    /// while the selection identified by `token` is still open.
    fn run_for_selection<T, F>(
        &self,
        operation: Operation,
        token: Option<u64>,
        f: F,
    ) -> RecoverResult<T>
    where
        F: FnOnce() -> RecoverResult<T>,
    {
        if self.publish_state(operation, token, OperationState::Loading) {
            self.events.emit(RecoverEvent::OperationStarted { operation });
        }

        match f() {
            Ok(value) => {
                if self.publish_state(operation, token, OperationState::Ready) {
                    self.events.emit(RecoverEvent::OperationCompleted { operation });
                }
                Ok(value)
            }
            Err(err) => {
                if err.is_recoverable() {
                    warn!(?operation, error = %err, "operation failed");
                } else {
                    error!(?operation, error = %err, "query rejected by database engine");
                }
                if self.publish_state(operation, token, OperationState::Failed(err.clone())) {
                    self.events.emit(RecoverEvent::OperationFailed {
                        operation,
                        error: err.clone(),
                    });
                }
                Err(err)
            }
        }
    }
}
