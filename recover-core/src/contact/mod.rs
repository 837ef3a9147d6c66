// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact Name Resolution
//!
//! Turns message handles (phone numbers, emails) into display names using
//! the backup's address book. Results are cached per normalized identifier
//! for the whole session and shared by every listing.

mod normalize;

pub use normalize::{initials, is_email, normalize_identifier};

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::SessionCache;
use crate::config::SessionConfig;
use crate::error::RecoverResult;
use crate::query::LoadedDatabase;

/// Address book full-text index, matched on phone numbers.
const PHONE_LOOKUP_SQL: &str = "SELECT c0First, c1Last FROM ABPersonFullTextSearch_content
     WHERE c16Phone LIKE '%' || ?1 || '%' ESCAPE '\\'
     LIMIT 1";

/// Address book full-text index, matched on email addresses.
const EMAIL_LOOKUP_SQL: &str = "SELECT c0First, c1Last FROM ABPersonFullTextSearch_content
     WHERE c17Email LIKE '%' || ?1 || '%' ESCAPE '\\'
     LIMIT 1";

/// A display name and its initials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedName {
    pub display_name: String,
    /// Empty when the display name contains no letters.
    pub initials: String,
}

impl ResolvedName {
    /// Builds a name, deriving the initials.
    pub fn new(display_name: &str) -> Self {
        ResolvedName {
            display_name: display_name.to_string(),
            initials: initials(display_name),
        }
    }
}

/// Resolves handles to names, caching by normalized identifier.
pub struct ContactResolver {
    cache: SessionCache<String, ResolvedName>,
    strip_us_country_code: bool,
    resolve_emails: bool,
}

impl Default for ContactResolver {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl ContactResolver {
    pub fn new(config: &SessionConfig) -> Self {
        ContactResolver {
            cache: SessionCache::new(),
            strip_us_country_code: config.strip_us_country_code,
            resolve_emails: config.resolve_emails,
        }
    }

    /// Normalizes `identifier` with this resolver's settings.
    pub fn normalize(&self, identifier: &str) -> String {
        normalize_identifier(identifier, self.strip_us_country_code)
    }

    /// Resolves `identifier` against `address_book`.
    ///
    /// Falls back to the normalized identifier when no contact matches.
    /// Concurrent calls for the same identifier query the address book once.
    pub fn resolve_name(
        &self,
        identifier: &str,
        address_book: &LoadedDatabase,
    ) -> RecoverResult<ResolvedName> {
        let key = self.normalize(identifier);
        self.cache.get_or_try_insert_with(key.clone(), || {
            let name = self
                .lookup(&key, address_book)?
                .unwrap_or_else(|| ResolvedName::new(&key));
            debug!(identifier = %key, name = %name.display_name, "resolved contact");
            Ok(name)
        })
    }

    /// Name to show when the backup has no address book. Not cached.
    pub fn unresolved(&self, identifier: &str) -> ResolvedName {
        ResolvedName::new(&self.normalize(identifier))
    }

    /// Cached name for `identifier`, if it was resolved this session.
    pub fn cached(&self, identifier: &str) -> Option<ResolvedName> {
        self.cache.get(&self.normalize(identifier))
    }

    /// Number of identifiers resolved this session.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Forgets every resolved name.
    pub fn reset(&self) {
        self.cache.reset();
    }

    fn lookup(
        &self,
        key: &str,
        address_book: &LoadedDatabase,
    ) -> RecoverResult<Option<ResolvedName>> {
        if key.is_empty() {
            return Ok(None);
        }
        let sql = if is_email(key) {
            if !self.resolve_emails {
                return Ok(None);
            }
            EMAIL_LOOKUP_SQL
        } else {
            PHONE_LOOKUP_SQL
        };

        let pattern = normalize::escape_like(key);
        let row: Option<(Option<String>, Option<String>)> = address_book.with_connection(|conn| {
            conn.query_row(sql, [pattern.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()
        })?;

        Ok(row
            .and_then(|(first, last)| compose_display_name(first, last))
            .map(|name| ResolvedName::new(&name)))
    }
}

/// "first last", or "first" alone; `None` without a first name.
fn compose_display_name(first: Option<String>, last: Option<String>) -> Option<String> {
    let first = first.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
    match last.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(last) => Some(format!("{} {}", first, last)),
        None => Some(first),
    }
}

/// A resolver paired with the address book it should consult, if any.
#[derive(Clone, Copy)]
pub struct ContactLookup<'a> {
    resolver: &'a ContactResolver,
    address_book: Option<&'a LoadedDatabase>,
}

impl<'a> ContactLookup<'a> {
    pub fn new(resolver: &'a ContactResolver, address_book: Option<&'a LoadedDatabase>) -> Self {
        ContactLookup {
            resolver,
            address_book,
        }
    }

    /// Resolves `identifier`, or echoes it back when there is no address book.
    pub fn resolve(&self, identifier: &str) -> RecoverResult<ResolvedName> {
        match self.address_book {
            Some(db) => self.resolver.resolve_name(identifier, db),
            None => Ok(self.resolver.unresolved(identifier)),
        }
    }
}
