//! Pagination Workflow Integration Tests
//!
//! Paging a conversation upward and switching between conversations.

use std::collections::HashSet;
use std::sync::Arc;

use recover_core::{
    list_messages, ContactLookup, ContactResolver, ConversationCursor, DatabaseKind,
    LoadedDatabase, Session, SessionConfig,
};

use super::fixtures::{mock_backup, sms_with_messages, sms_with_three_chats};

const CHAT: &str = "+15551234567";

fn assert_strictly_ascending(cursor: &ConversationCursor) {
    assert!(cursor
        .messages()
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

/// Test: page 0 then page 1 of 25 rows give one ascending list without duplicates
#[test]
fn test_two_pages_combine_oldest_first() {
    let sms = LoadedDatabase::open(&sms_with_messages(CHAT, 25)).unwrap();
    let resolver = ContactResolver::default();
    let lookup = ContactLookup::new(&resolver, None);
    let mut cursor = ConversationCursor::new(CHAT);

    let first = list_messages(&sms, CHAT, cursor.page(), 20, &lookup).unwrap();
    assert_eq!(first.messages.len(), 20);
    assert!(!first.is_end);
    assert_eq!(first.messages[0].text.as_deref(), Some("message 24"));
    cursor.apply(first);
    assert_strictly_ascending(&cursor);

    let second = list_messages(&sms, CHAT, cursor.page(), 20, &lookup).unwrap();
    assert_eq!(second.messages.len(), 5);
    assert!(!second.is_end);
    cursor.apply(second);

    assert_eq!(cursor.messages().len(), 25);
    assert_strictly_ascending(&cursor);
    let texts: HashSet<_> = cursor.messages().iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts.len(), 25);
    assert_eq!(cursor.messages()[0].text.as_deref(), Some("message 0"));
    assert_eq!(cursor.messages()[24].text.as_deref(), Some("message 24"));
    assert!(cursor.messages().iter().all(|m| m.chat_id == CHAT));
}

/// Test: a page past the end sets is_end and keeps the list
#[test]
fn test_page_beyond_rows_marks_end() {
    let sms = LoadedDatabase::open(&sms_with_messages(CHAT, 25)).unwrap();
    let resolver = ContactResolver::default();
    let lookup = ContactLookup::new(&resolver, None);
    let mut cursor = ConversationCursor::new(CHAT);

    for _ in 0..2 {
        let page = list_messages(&sms, CHAT, cursor.page(), 20, &lookup).unwrap();
        cursor.apply(page);
    }
    let before = cursor.messages().to_vec();

    let beyond = list_messages(&sms, CHAT, cursor.page(), 20, &lookup).unwrap();
    assert!(beyond.is_end);
    assert!(beyond.messages.is_empty());
    cursor.apply(beyond);

    assert!(cursor.is_end());
    assert_eq!(cursor.messages(), before.as_slice());
}

/// Test: service and direction are carried through
#[test]
fn test_message_fields() {
    let sms = LoadedDatabase::open(&sms_with_messages(CHAT, 3)).unwrap();
    let resolver = ContactResolver::default();
    let lookup = ContactLookup::new(&resolver, None);

    let page = list_messages(&sms, CHAT, 0, 20, &lookup).unwrap();
    assert_eq!(page.messages.len(), 3);
    // message 2 is newest and was sent from the device (even index)
    assert!(page.messages[0].is_outgoing());
    assert!(!page.messages[1].is_outgoing());
    assert_eq!(page.messages[0].service.as_deref(), Some("iMessage"));
    assert_eq!(page.messages[0].display_name, "5551234567");
}

/// Test: switching conversations never leaks the previous cursor
#[test]
fn test_switching_conversation_resets_cursor() {
    let root = mock_backup(vec![(DatabaseKind::Sms, sms_with_messages(CHAT, 45))]);
    let session = Session::new(SessionConfig::default());
    session.open_directory(Arc::new(root));

    session.select_conversation(CHAT);
    session.load_more_messages().unwrap();
    let after_two = session.load_more_messages().unwrap();
    assert_eq!(after_two.page(), 2);
    assert_eq!(after_two.messages().len(), 40);

    let fresh = session.select_conversation("+15550009999");
    assert_eq!(fresh.page(), 0);
    assert!(!fresh.is_end());
    assert!(fresh.messages().is_empty());

    let current = session.cursor().unwrap();
    assert_eq!(current.chat_id(), "+15550009999");
    assert_eq!(current.page(), 0);
    assert!(!current.is_end());
    assert!(current.messages().is_empty());

    let loaded = session.load_more_messages().unwrap();
    assert_eq!(loaded.messages().len(), 1);
    assert_eq!(loaded.messages()[0].text.as_deref(), Some("elsewhere"));
}

/// Test: backing out of a conversation drops its cursor
#[test]
fn test_back_to_list_clears_cursor() {
    let root = mock_backup(vec![(DatabaseKind::Sms, sms_with_three_chats())]);
    let session = Session::default();
    session.open_directory(Arc::new(root));

    session.select_conversation("+15551234567");
    session.load_more_messages().unwrap();
    session.back_to_list();
    assert!(session.cursor().is_none());
    assert!(session.load_more_messages().is_err());

    let reopened = session.select_conversation("+15551234567");
    assert_eq!(reopened.page(), 0);
    assert!(reopened.messages().is_empty());
}

/// Test: paging to the end through the session stops querying
#[test]
fn test_session_paging_reaches_end() {
    let root = mock_backup(vec![(DatabaseKind::Sms, sms_with_messages(CHAT, 25))]);
    let session = Session::new(SessionConfig::default().with_page_size(10));
    session.open_directory(Arc::new(root));
    session.select_conversation(CHAT);

    let mut cursor = session.load_more_messages().unwrap();
    while !cursor.is_end() {
        cursor = session.load_more_messages().unwrap();
    }

    assert_eq!(cursor.messages().len(), 25);
    assert_eq!(cursor.page(), 3);
    assert_strictly_ascending(&cursor);

    let again = session.load_more_messages().unwrap();
    assert_eq!(again, cursor);
}
