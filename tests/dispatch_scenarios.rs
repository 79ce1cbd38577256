//! Dispatch and persistence scenarios exercised through the public API.

use factbot::commands::{CommandDescriptor, CommandRegistry, Matcher, Outcome};
use factbot::plugins::factoids::{FactoidStore, FactoidValue, store};
use factbot::{Outbox, PrivMsg, Signal};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// A command that counts its invocations and claims every match.
fn counting(name: &str, priority: i32, matcher: Matcher, calls: &Arc<AtomicUsize>) -> factbot::commands::BoundCommand {
    let calls = Arc::clone(calls);
    CommandDescriptor::<()>::new(name, priority, matcher, move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(Outcome::Handled) })
    })
    .bind(Arc::new(Mutex::new(Some(()))))
}

#[tokio::test]
async fn specific_command_outranks_catch_all() {
    let registry = CommandRegistry::new(5);
    let see = Arc::new(AtomicUsize::new(0));
    let factoid = Arc::new(AtomicUsize::new(0));
    registry.register("test", counting("factoid", 5, Matcher::prefix("!"), &factoid));
    registry.register("test", counting("see", 10, Matcher::prefix("see "), &see));
    let (outbox, _rx) = Outbox::channel(8);

    let report = registry
        .dispatch(&PrivMsg::new("alice", "#rust", "see foo"), &outbox)
        .await;
    assert_eq!(report.claimed_by.as_deref(), Some("see"));
    assert_eq!((see.load(Ordering::SeqCst), factoid.load(Ordering::SeqCst)), (1, 0));

    let report = registry
        .dispatch(&PrivMsg::new("alice", "#rust", "!foo"), &outbox)
        .await;
    assert_eq!(report.claimed_by.as_deref(), Some("factoid"));
    assert_eq!((see.load(Ordering::SeqCst), factoid.load(Ordering::SeqCst)), (1, 1));
}

#[tokio::test]
async fn increment_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("factoids.json");
    std::fs::write(&path, r#"{"x": 3}"#).unwrap();

    let mut facts = FactoidStore::open(&path).await;
    assert_eq!(facts.increment("x", 1).await.unwrap(), 4);

    let reread = store::load(&path).await.unwrap();
    assert_eq!(reread.len(), 1);
    assert_eq!(reread.get("x"), Some(&FactoidValue::Counter(4)));
}

#[tokio::test]
async fn derived_chat_signal_detaches_when_dropped() {
    let messages = Signal::<factbot_proto::Message>::new();
    let privmsg = messages.filter_map(|m: factbot_proto::Message| PrivMsg::from_message(&m));
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    privmsg.subscribe_forever(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });

    messages
        .publish(":a!a@h PRIVMSG #c :hi".parse().unwrap())
        .await;
    messages.publish("PING :x".parse().unwrap()).await;
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(messages.handler_count(), 1);

    drop(privmsg);
    assert_eq!(messages.handler_count(), 0);
}
