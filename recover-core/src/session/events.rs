// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks that let the UI follow loading and error states.

use std::sync::Arc;

use crate::error::RecoverError;

use super::Operation;

/// Events emitted by a [`Session`](super::Session).
#[derive(Debug, Clone, PartialEq)]
pub enum RecoverEvent {
    /// A backup folder was granted.
    DirectoryOpened {
        /// Name of the folder.
        name: String,
    },
    /// An operation started loading.
    OperationStarted { operation: Operation },
    /// An operation finished successfully.
    OperationCompleted { operation: Operation },
    /// An operation failed; the session stays usable.
    OperationFailed {
        operation: Operation,
        error: RecoverError,
    },
    /// A conversation was selected and its cursor reset.
    ConversationSelected { chat_id: String },
    /// The conversation view was closed.
    ConversationClosed,
    /// All caches and pagination state were discarded.
    SessionReset,
}

/// Receives session events, possibly from several threads.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: RecoverEvent);
}

/// Forwards events to a closure.
pub struct CallbackHandler<F>(F);

impl<F> CallbackHandler<F>
where
    F: Fn(RecoverEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        CallbackHandler(callback)
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(RecoverEvent) + Send + Sync,
{
    fn on_event(&self, event: RecoverEvent) {
        (self.0)(event);
    }
}

/// Handlers registered on a session, called in registration order.
#[derive(Default)]
pub(crate) struct EventDispatcher(Vec<Arc<dyn EventHandler>>);

impl EventDispatcher {
    pub(crate) fn add(&mut self, handler: Arc<dyn EventHandler>) {
        self.0.push(handler);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn emit(&self, event: RecoverEvent) {
        if let Some((last, rest)) = self.0.split_last() {
            for handler in rest {
                handler.on_event(event.clone());
            }
            last.on_event(event);
        }
    }
}
