//! Chat sessions against a scripted backend

mod common;

use std::time::Duration;

use audit_client::{ChatPhase, ChatSession, ClientError, KeyValueStore, MemoryStore};
use audit_types::{ChatMessage, Role, CHAT_FALLBACK_REPLY};
use common::{init_tracing, FakeBackend};

fn seeded_session(store: &MemoryStore) -> ChatSession<MemoryStore> {
    let prior = vec![
        ChatMessage::user("Summarize the audit"),
        ChatMessage::assistant("The audit found twelve issues."),
    ];
    store
        .set(
            "chatMessages_abc123",
            &serde_json::to_string(&prior).unwrap(),
        )
        .unwrap();
    ChatSession::open("abc123", store.clone())
}

#[tokio::test]
async fn test_reply_extends_history() {
    init_tracing();
    let backend = FakeBackend::new();
    backend.reply_to_chat("Unpatched software.");
    let store = MemoryStore::new();
    let mut chat = seeded_session(&store);
    assert_eq!(chat.messages().len(), 2);

    let reply = chat
        .send(&backend, "What is the top risk?")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply, &ChatMessage::assistant("Unpatched software."));

    let messages = chat.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2], ChatMessage::user("What is the top risk?"));
    assert_eq!(messages[3].role, Role::Assistant);

    let request = &backend.chat_requests()[0];
    assert_eq!(request.id, "abc123");
    assert_eq!(request.query, "What is the top risk?");
    assert_eq!(request.history.len(), 3);
    assert_eq!(request.history[2], messages[2]);

    let reopened = ChatSession::open("abc123", store.clone());
    assert_eq!(reopened.messages(), messages);
}

#[tokio::test]
async fn test_transcript_grows_one_message_at_a_time() {
    let backend = FakeBackend::new();
    let gate = backend.gate("chat");
    let store = MemoryStore::new();
    let mut chat = ChatSession::open("abc123", store.clone());

    let request = chat.begin_send("Is MFA enforced?").unwrap().unwrap();
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.phase(), ChatPhase::AwaitingResponse);
    assert_eq!(
        ChatSession::open("abc123", store.clone()).messages().len(),
        1
    );

    // a second send while waiting is refused without touching the transcript
    assert_eq!(chat.begin_send("hello?"), Err(ClientError::Busy));
    assert_eq!(chat.messages().len(), 1);

    gate.add_permits(1);
    let reply = tokio::time::timeout(Duration::from_secs(5), async {
        use audit_client::AuditBackend;
        backend.chat(&request).await
    })
    .await
    .expect("chat did not finish");
    chat.complete(reply);

    assert_eq!(chat.messages().len(), 2);
    assert!(chat.can_send());
}

#[tokio::test]
async fn test_backend_failure_appends_fallback() {
    let backend = FakeBackend::new();
    backend.fail("chat");
    let store = MemoryStore::new();
    let mut chat = seeded_session(&store);

    let reply = chat.send(&backend, "Anything else?").await.unwrap().unwrap();
    assert_eq!(reply.content, CHAT_FALLBACK_REPLY);
    assert_eq!(chat.messages().len(), 4);
    assert_eq!(chat.phase(), ChatPhase::Idle);
}

#[tokio::test]
async fn test_blank_message_sends_nothing() {
    let backend = FakeBackend::new();
    let mut chat = ChatSession::open("abc123", MemoryStore::new());

    assert_eq!(chat.send(&backend, "  \t ").await, Ok(None));
    assert!(chat.messages().is_empty());
    assert!(backend.chat_requests().is_empty());
}

#[tokio::test]
async fn test_sessions_are_isolated_per_document() {
    let backend = FakeBackend::new();
    let store = MemoryStore::new();

    let mut first = ChatSession::open("doc-a", store.clone());
    first.send(&backend, "question a").await.unwrap();
    let mut second = ChatSession::open("doc-b", store.clone());
    second.send(&backend, "question b").await.unwrap();
    second.clear();

    assert_eq!(ChatSession::open("doc-a", store.clone()).messages().len(), 2);
    assert!(ChatSession::open("doc-b", store).messages().is_empty());
}
