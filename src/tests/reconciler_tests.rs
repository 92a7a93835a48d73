// Reconciler Tests - Testing event routing across registry, ledger and active chat

use super::helpers::{chat, chat_ids, message, message_ids, participant, ts};
use crate::reconciler::{FetchTarget, IgnoreReason, Outcome, SyncEvent};
use crate::store::{ChatId, ChatStore, LocalChat, Message, Settings};

/// Store with chats "a" and "b" loaded and "a" confirmed
fn store_with_open_chat() -> ChatStore {
    let mut store = ChatStore::new();
    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("a", 1), chat("b", 2)],
        total: Some(2),
    });
    store.apply(SyncEvent::ChatConfirmed { chat: chat("a", 1) });
    store
}

fn received(message: Message) -> SyncEvent {
    SyncEvent::MessageReceived { message }
}

#[test]
fn test_end_to_end_promotion_keeps_recency() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1), chat("b", 2)]);
    assert_eq!(chat_ids(&store.chats()), vec!["b", "a"]);

    let a = store.registry().get(&ChatId::from("a")).cloned().unwrap();
    store.set_current_chat(&a);
    assert!(store.promote_current_chat_to_first());

    // Promotion only reorders raw storage; "b" is still newer
    assert_eq!(chat_ids(&store.chats()), vec!["b", "a"]);
}

#[test]
fn test_promote_without_current_chat_is_noop() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1)]);

    assert!(!store.promote_current_chat_to_first());
    assert_eq!(
        store.apply(SyncEvent::ChatActivated),
        Outcome::Ignored(IgnoreReason::UnknownChat)
    );
}

#[test]
fn test_live_message_for_current_chat() {
    let mut store = store_with_open_chat();
    store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m2", "a", 2), message("m1", "a", 1)],
        total: Some(5),
    });

    assert_eq!(store.apply(received(message("m3", "a", 3))), Outcome::Applied);

    assert_eq!(store.total_messages(), Some(6));
    assert_eq!(message_ids(&store.messages()), vec!["m1", "m2", "m3"]);
}

#[test]
fn test_live_message_with_unknown_total() {
    let mut store = store_with_open_chat();
    assert_eq!(store.total_messages(), None);

    store.apply(received(message("m1", "a", 1)));

    assert_eq!(store.total_messages(), None);
    assert_eq!(store.messages().len(), 1);
}

#[test]
fn test_live_message_for_other_chat_is_ignored() {
    let mut store = store_with_open_chat();
    store.set_total_messages(Some(4));
    let version = store.ledger().version();

    let outcome = store.apply(received(message("m1", "b", 1)));

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::InactiveRoom));
    assert!(store.messages().is_empty());
    assert_eq!(store.total_messages(), Some(4));
    assert_eq!(store.ledger().version(), version);
}

#[test]
fn test_live_message_before_confirmation_is_dropped() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1)]);
    store.apply(SyncEvent::ChatOpened {
        local: LocalChat::existing(&chat("a", 1)),
    });

    let outcome = store.apply(received(message("m1", "a", 1)));

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::InactiveRoom));
    assert!(store.messages().is_empty());
}

#[test]
fn test_duplicate_live_message_does_not_bump_total() {
    let mut store = store_with_open_chat();
    store.set_total_messages(Some(1));

    store.apply(received(message("m1", "a", 1)));
    let outcome = store.apply(received(message("m1", "a", 1)));

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::DuplicateMessage));
    assert_eq!(store.total_messages(), Some(2));
    assert_eq!(store.messages().len(), 1);
}

#[test]
fn test_open_then_confirm_resets_ledger() {
    let mut store = store_with_open_chat();
    store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m1", "a", 1)],
        total: Some(1),
    });

    store.apply(SyncEvent::ChatOpened {
        local: LocalChat::existing(&chat("b", 2)),
    });
    assert!(store.current_chat_id().is_none());
    assert!(store.local_current_chat().is_some());

    store.apply(SyncEvent::ChatConfirmed { chat: chat("b", 2) });

    assert_eq!(store.current_chat_id(), Some(&ChatId::from("b")));
    assert!(store.messages().is_empty());
    assert_eq!(store.total_messages(), None);
    assert_eq!(
        store.local_current_chat().and_then(|l| l.chat_id.clone()),
        Some(ChatId::from("b"))
    );
}

#[test]
fn test_confirm_unseen_chat_adds_it_to_registry() {
    let mut store = ChatStore::new();
    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("a", 5)],
        total: Some(1),
    });
    store.apply(SyncEvent::ChatOpened {
        local: LocalChat::provisional(participant("new")),
    });

    store.apply(SyncEvent::ChatConfirmed {
        chat: chat("new", 5),
    });

    // Same timestamp as "a", inserted at the front
    assert_eq!(chat_ids(&store.chats()), vec!["new", "a"]);
    assert_eq!(store.current_chat().map(|c| c.id.to_string()), Some("new".to_string()));
}

#[test]
fn test_confirm_marks_chat_read() {
    let mut store = ChatStore::new();
    let mut unread = chat("a", 1);
    unread.unread_count = 4;
    store.append_chats(vec![unread.clone()]);

    store.apply(SyncEvent::ChatConfirmed { chat: unread });

    assert_eq!(store.current_chat().unwrap().unread_count, 0);
}

#[test]
fn test_stale_message_page_is_discarded() {
    let mut store = store_with_open_chat();
    store.apply(SyncEvent::MessagesRequested {
        chat_id: ChatId::from("a"),
    });
    assert!(store.loading_get_messages());

    // User switches to "b" while the page for "a" is in flight
    store.apply(SyncEvent::ChatConfirmed { chat: chat("b", 2) });
    store.apply(SyncEvent::MessagesRequested {
        chat_id: ChatId::from("b"),
    });

    let outcome = store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("old", "a", 1)],
        total: Some(1),
    });

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::StalePage));
    assert!(store.messages().is_empty());
    assert_eq!(store.total_messages(), None);
    // The fetch for "b" is still running
    assert!(store.loading_get_messages());
}

#[test]
fn test_stale_pages_kept_when_discarding_disabled() {
    let settings = Settings {
        discard_stale_pages: false,
        ..Settings::default()
    };
    let mut store = ChatStore::with_settings(settings);

    let outcome = store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m1", "a", 1)],
        total: Some(1),
    });

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(store.messages().len(), 1);
}

#[test]
fn test_chat_pages_and_loading_flag() {
    let mut store = ChatStore::new();
    store.apply(SyncEvent::ChatsRequested);
    assert!(store.registry().is_loading());

    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("a", 1), chat("b", 3)],
        total: Some(3),
    });
    assert!(!store.registry().is_loading());
    assert_eq!(store.total_chats(), Some(3));

    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("c", 2)],
        total: Some(3),
    });
    assert_eq!(chat_ids(&store.chats()), vec!["b", "c", "a"]);
}

#[test]
fn test_chats_refreshed_starts_over() {
    let mut store = ChatStore::new();
    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("a", 1)],
        total: Some(1),
    });

    store.apply(SyncEvent::ChatsRefreshed);

    assert!(store.chats().is_empty());
    assert_eq!(store.total_chats(), None);
}

#[test]
fn test_chat_started_goes_first_in_raw_order() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1)]);

    store.apply(SyncEvent::ChatStarted { chat: chat("n", 1) });

    assert_eq!(chat_ids(&store.chats()), vec!["n", "a"]);
}

#[test]
fn test_message_sent_promotes_and_touches_chat() {
    let mut store = store_with_open_chat();
    assert_eq!(chat_ids(&store.chats()), vec!["b", "a"]);

    let mut sent = Message::outgoing(ChatId::from("a"), "me", "hello");
    sent.created_at = ts(10);
    let outcome = store.apply(SyncEvent::MessageSent { message: sent });

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(chat_ids(&store.chats()), vec!["a", "b"]);
    assert_eq!(store.messages().len(), 1);
    assert!(store.messages()[0].is_from("me"));
}

#[test]
fn test_touch_on_inbound_setting() {
    let settings = Settings {
        touch_chat_on_inbound: true,
        ..Settings::default()
    };
    let mut store = ChatStore::with_settings(settings);
    store.append_chats(vec![chat("a", 1), chat("b", 2), chat("c", 3)]);
    store.apply(SyncEvent::ChatConfirmed { chat: chat("c", 3) });

    store.apply(received(message("m1", "a", 10)));

    // "a" jumps to the top and counts an unread message, ledger untouched
    assert_eq!(chat_ids(&store.chats()), vec!["a", "c", "b"]);
    assert_eq!(store.registry().unread_total(), 1);
    assert!(store.messages().is_empty());

    // A message for the open chat is not unread
    store.apply(received(message("m2", "c", 11)));
    assert_eq!(store.registry().unread_total(), 1);
    assert_eq!(chat_ids(&store.chats()), vec!["c", "a", "b"]);
}

#[test]
fn test_default_settings_do_not_touch_registry_on_inbound() {
    let mut store = store_with_open_chat();

    store.apply(received(message("m1", "b", 30)));

    assert_eq!(store.registry().get(&ChatId::from("b")).unwrap().updated_at, ts(2));
    assert_eq!(store.registry().unread_total(), 0);
}

#[test]
fn test_fetch_failed_clears_loading() {
    let mut store = store_with_open_chat();
    store.apply(SyncEvent::ChatsRequested);
    store.apply(SyncEvent::MessagesRequested {
        chat_id: ChatId::from("a"),
    });

    store.apply(SyncEvent::FetchFailed {
        target: FetchTarget::Chats,
    });
    assert!(!store.registry().is_loading());
    assert!(store.loading_get_messages());

    let stale = store.apply(SyncEvent::FetchFailed {
        target: FetchTarget::Messages {
            chat_id: ChatId::from("b"),
        },
    });
    assert_eq!(stale, Outcome::Ignored(IgnoreReason::StalePage));
    assert!(store.loading_get_messages());

    store.apply(SyncEvent::FetchFailed {
        target: FetchTarget::Messages {
            chat_id: ChatId::from("a"),
        },
    });
    assert!(!store.loading_get_messages());
}

#[test]
fn test_chat_closed() {
    let mut store = store_with_open_chat();
    store.apply(received(message("m1", "a", 1)));

    store.apply(SyncEvent::ChatClosed);

    assert!(!store.active().is_open());
    assert!(store.messages().is_empty());
    assert!(store.current_chat().is_none());
}

#[test]
fn test_next_page_requests() {
    let mut store = ChatStore::with_settings(Settings {
        chat_page_size: 2,
        message_page_size: 3,
        ..Settings::default()
    });

    let first = store.next_chats_page().unwrap();
    assert_eq!((first.chat_id, first.offset, first.limit), (None, 0, 2));

    // No history request until a chat is confirmed
    assert!(store.next_messages_page().is_none());

    store.apply(SyncEvent::ChatsPage {
        chats: vec![chat("a", 1), chat("b", 2)],
        total: Some(2),
    });
    assert!(store.next_chats_page().is_none());

    store.apply(SyncEvent::ChatConfirmed { chat: chat("a", 1) });
    let request = store.next_messages_page().unwrap();
    assert_eq!(request.chat_id, Some(ChatId::from("a")));
    assert_eq!((request.offset, request.limit), (0, 3));

    store.apply(SyncEvent::MessagesRequested {
        chat_id: ChatId::from("a"),
    });
    assert!(store.next_messages_page().is_none());

    store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m3", "a", 3), message("m2", "a", 2), message("m1", "a", 1)],
        total: Some(4),
    });
    assert_eq!(store.next_messages_page().unwrap().offset, 3);
}

#[test]
fn test_snapshot_copies_views() {
    let mut store = store_with_open_chat();
    store.apply(received(message("m1", "a", 1)));

    let snapshot = store.snapshot();

    assert_eq!(snapshot.current_chat.map(|c| c.id), Some(ChatId::from("a")));
    let ids: Vec<String> = snapshot.chat_list.chats.iter().map(|c| c.id.to_string()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(snapshot.chat_list.total, Some(2));
    assert_eq!(snapshot.message_list.messages.len(), 1);
    assert_eq!(snapshot.version, store.version());
}

#[test]
fn test_event_json_format() {
    let json = r#"{
        "type": "messages_page",
        "chat_id": "a",
        "messages": [{
            "id": "m1",
            "room": "a",
            "sender": "u1",
            "content": "hi",
            "created_at": "2024-01-01T12:00:00Z"
        }]
    }"#;

    let event: SyncEvent = serde_json::from_str(json).expect("Failed to parse event");

    match &event {
        SyncEvent::MessagesPage {
            chat_id,
            messages,
            total,
        } => {
            assert_eq!(chat_id.as_str(), "a");
            assert_eq!(messages[0].created_at, ts(0));
            assert_eq!(*total, None);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(event.name(), "messages_page");

    let closed = serde_json::to_string(&SyncEvent::ChatClosed).unwrap();
    assert_eq!(closed, r#"{"type":"chat_closed"}"#);
}

#[test]
fn test_apply_all_preserves_order() {
    let mut store = ChatStore::new();
    let outcomes = store.apply_all(vec![
        SyncEvent::ChatsPage {
            chats: vec![chat("a", 1)],
            total: Some(1),
        },
        received(message("early", "a", 2)),
        SyncEvent::ChatConfirmed { chat: chat("a", 1) },
        received(message("late", "a", 3)),
    ]);

    assert_eq!(
        outcomes,
        vec![
            Outcome::Applied,
            Outcome::Ignored(IgnoreReason::InactiveRoom),
            Outcome::Applied,
            Outcome::Applied,
        ]
    );
    assert_eq!(message_ids(&store.messages()), vec!["late"]);
}

#[test]
fn test_set_current_then_local_keeps_chat_open() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1)]);
    let a = store.registry().get(&ChatId::from("a")).cloned().unwrap();

    store.set_current_chat(&a);
    store.set_local_current_chat(Some(LocalChat::existing(&a)));

    assert_eq!(store.current_chat_id(), Some(&ChatId::from("a")));
    assert_eq!(store.apply(received(message("m1", "a", 2))), Outcome::Applied);
    assert_eq!(store.messages().len(), 1);
}

#[test]
fn test_set_local_then_current_keeps_chat_open() {
    let mut store = ChatStore::new();
    store.append_chats(vec![chat("a", 1)]);
    let a = store.registry().get(&ChatId::from("a")).cloned().unwrap();

    store.set_local_current_chat(Some(LocalChat::existing(&a)));
    store.set_current_chat(&a);

    assert_eq!(store.current_chat_id(), Some(&ChatId::from("a")));
    assert!(store.local_current_chat().is_some());
    assert_eq!(store.apply(received(message("m1", "a", 2))), Outcome::Applied);
}

#[test]
fn test_clearing_local_chat_keeps_confirmed_chat() {
    let mut store = store_with_open_chat();
    store.set_local_current_chat(Some(LocalChat::existing(&chat("a", 1))));

    store.set_local_current_chat(None);

    assert!(store.local_current_chat().is_none());
    assert_eq!(store.current_chat_id(), Some(&ChatId::from("a")));
    assert_eq!(store.apply(received(message("m1", "a", 2))), Outcome::Applied);
}

#[test]
fn test_version_tracks_active_chat_and_settings() {
    let mut store = ChatStore::new();

    let before = store.version();
    store.apply(SyncEvent::ChatOpened {
        local: LocalChat::provisional(participant("a")),
    });
    let opened = store.version();
    assert!(opened > before);

    store.set_current_chat(&chat("a", 1));
    let confirmed = store.version();
    assert!(confirmed > opened);

    store.set_settings(Settings {
        chat_page_size: 5,
        ..Settings::default()
    });
    assert!(store.version() > confirmed);
    assert_eq!(store.snapshot().version, store.version());
}

#[test]
fn test_chat_closed_during_history_fetch_clears_loading() {
    let mut store = store_with_open_chat();
    store.apply(SyncEvent::MessagesRequested {
        chat_id: ChatId::from("a"),
    });
    assert!(store.loading_get_messages());

    store.apply(SyncEvent::ChatClosed);
    let outcome = store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m1", "a", 1)],
        total: Some(1),
    });

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::StalePage));
    assert!(!store.loading_get_messages());
    assert!(store.messages().is_empty());
}

#[test]
fn test_message_page_skips_messages_of_other_chats() {
    let mut store = store_with_open_chat();

    let outcome = store.apply(SyncEvent::MessagesPage {
        chat_id: ChatId::from("a"),
        messages: vec![message("m2", "a", 2), message("x1", "b", 1), message("m1", "a", 1)],
        total: Some(2),
    });

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(message_ids(&store.messages()), vec!["m1", "m2"]);
    assert_eq!(store.total_messages(), Some(2));
}
