// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for a backup browsing session

use std::path::PathBuf;

/// Number of messages fetched per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Configuration for a [`Session`](crate::session::Session)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Messages per page when scrolling a conversation
    pub page_size: usize,

    /// Where database images are staged before being opened in memory
    /// (`None` uses the system temp directory)
    pub scratch_dir: Option<PathBuf>,

    /// Drop the leading `1` from 11-digit phone numbers
    pub strip_us_country_code: bool,

    /// Look up email identifiers in the address book, not only phone numbers
    pub resolve_emails: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scratch_dir: None,
            strip_us_country_code: true,
            resolve_emails: true,
        }
    }
}

impl SessionConfig {
    /// Use a custom page size (values below 1 are clamped to 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Stage database images in the given directory
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }

    /// Keep phone numbers exactly as stored apart from punctuation
    pub fn without_country_code_stripping(mut self) -> Self {
        self.strip_us_country_code = false;
        self
    }

    /// Only resolve phone numbers against the address book
    pub fn without_email_lookup(mut self) -> Self {
        self.resolve_emails = false;
        self
    }
}
