// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

#![allow(dead_code)]

use proptest::prelude::*;

// ============================================================
// Identifier Strategies
// ============================================================

/// Strategy for generating email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{3,10}", "[a-z]{2,8}", "[a-z]{2,4}")
        .prop_map(|(user, domain, tld)| format!("{}@{}.{}", user, domain, tld))
}

/// Strategy for generating international phone numbers.
pub fn phone_strategy() -> impl Strategy<Value = String> {
    "[0-9]{10,15}".prop_map(|n| format!("+{}", n))
}

/// Strategy for the ten national digits of a US number.
pub fn us_national_strategy() -> impl Strategy<Value = String> {
    "[2-9][0-9]{9}"
}

/// Strategy for a US number written the way an address book shows it.
pub fn formatted_us_phone_strategy() -> impl Strategy<Value = (String, String)> {
    us_national_strategy().prop_map(|digits| {
        let formatted = format!("+1 ({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]);
        (formatted, digits)
    })
}

/// Strategy for any handle a message row may carry.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        phone_strategy(),
        email_strategy(),
        formatted_us_phone_strategy().prop_map(|(formatted, _)| formatted),
        ".{0,30}",
    ]
}

// ============================================================
// Path Strategies
// ============================================================

/// Strategy for logical paths inside a backup domain.
pub fn logical_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9_]{1,12}", 1..5).prop_map(|parts| parts.join("/"))
}

/// Strategy for backup domain names.
pub fn domain_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("HomeDomain".to_string()),
        Just("MediaDomain".to_string()),
        "AppDomain-com\\.[a-z]{3,8}\\.[a-z]{3,8}",
    ]
}

// ============================================================
// Numeric Strategies
// ============================================================

/// Strategy for whole seconds since 2001 that are stored in nanoseconds.
pub fn apple_seconds_strategy() -> impl Strategy<Value = i64> {
    2i64..4_000_000_000
}
