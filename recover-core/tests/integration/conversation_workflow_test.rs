//! Conversation Workflow Integration Tests
//!
//! Listing conversations and voicemails with names from the address book.

use std::sync::Arc;
use std::thread;

use recover_core::{
    list_conversations, list_voicemails, normalize_timestamp, BackupStore, ContactLookup,
    ContactResolver, DatabaseKind, LoadedDatabase,
};

use super::fixtures::{
    address_book_with_jane, mock_backup, nanos, sms_with_three_chats, voicemails,
};

/// Test: three chats, one known contact
#[test]
fn test_conversations_end_to_end() {
    let root = mock_backup(vec![
        (DatabaseKind::Sms, sms_with_three_chats()),
        (DatabaseKind::AddressBook, address_book_with_jane()),
    ]);
    let store = BackupStore::with_root(Arc::new(root));
    let sms = store.load(DatabaseKind::Sms).unwrap();
    let address_book = store.load(DatabaseKind::AddressBook).unwrap();
    let resolver = ContactResolver::default();
    let lookup = ContactLookup::new(&resolver, Some(&*address_book));

    let conversations = list_conversations(&sms, &lookup).unwrap();

    assert_eq!(conversations.len(), 3);
    assert!(conversations
        .windows(2)
        .all(|w| w[0].timestamp > w[1].timestamp));

    let jane = &conversations[0];
    assert_eq!(jane.chat_id, "+15551234567");
    assert_eq!(jane.display_name, "Jane Appleseed");
    assert_eq!(jane.initials, "JA");
    assert_eq!(jane.preview.as_deref(), Some("hello!"));
    assert_eq!(jane.is_from_me, 0);
    assert_eq!(jane.timestamp, normalize_timestamp(nanos(3_000)));

    // Non-US number: punctuation removed, digits kept
    assert_eq!(conversations[1].display_name, "447700900123");
    assert_eq!(conversations[1].initials, "");

    // Email without an address book entry
    assert_eq!(conversations[2].display_name, "pat@example.com");
    assert_eq!(conversations[2].initials, "P");
}

/// Test: names resolved while listing are reused by later listings
#[test]
fn test_contact_cache_shared_between_listings() {
    let root = mock_backup(vec![
        (DatabaseKind::Sms, sms_with_three_chats()),
        (DatabaseKind::AddressBook, address_book_with_jane()),
        (DatabaseKind::Voicemails, voicemails()),
    ]);
    let store = BackupStore::with_root(Arc::new(root));
    let sms = store.load(DatabaseKind::Sms).unwrap();
    let voicemail = store.load(DatabaseKind::Voicemails).unwrap();
    let address_book = store.load(DatabaseKind::AddressBook).unwrap();
    let resolver = ContactResolver::default();
    let lookup = ContactLookup::new(&resolver, Some(&*address_book));

    list_conversations(&sms, &lookup).unwrap();
    assert_eq!(resolver.cached_count(), 3);

    let list = list_voicemails(&voicemail, &lookup).unwrap();
    assert_eq!(resolver.cached_count(), 3);

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].display_name, "Unknown");
    assert_eq!(list[1].display_name, "Jane Appleseed");
    assert_eq!(list[1].duration, 42);
    assert_eq!(list[1].date, normalize_timestamp(500));
}

/// Test: concurrent lookups of one identifier agree and cache one entry
#[test]
fn test_concurrent_resolution_of_one_identifier() {
    let address_book: Arc<LoadedDatabase> =
        Arc::new(LoadedDatabase::open(&address_book_with_jane()).unwrap());
    let resolver = Arc::new(ContactResolver::default());

    let handles: Vec<_> = ["+1 (555) 123-4567", "5551234567", "15551234567", "555 123 4567"]
        .into_iter()
        .map(|identifier| {
            let resolver = Arc::clone(&resolver);
            let address_book = Arc::clone(&address_book);
            thread::spawn(move || resolver.resolve_name(identifier, &address_book).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().display_name, "Jane Appleseed");
    }
    assert_eq!(resolver.cached_count(), 1);
}
