//! Channel Registry and Message Log Tests

use relay_server::application::services::{ChannelError, ChannelService, RemovalOutcome};
use relay_server::domain::{GLOBAL_CHANNEL, SYSTEM_AUTHOR};
use uuid::Uuid;

use crate::common::TestHarness;

async fn harness_with_users(names: &[&str]) -> TestHarness {
    let harness = TestHarness::new();
    for name in names {
        harness.seed_user(name).await;
    }
    harness
}

#[tokio::test]
async fn test_create_requires_registered_members() {
    let harness = harness_with_users(&["alice"]).await;

    let err = harness
        .channels
        .create("general", &["alice".into(), "ghost".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::UserNotFound(name) if name == "ghost"));
}

#[tokio::test]
async fn test_create_rejects_empty_member_list() {
    let harness = TestHarness::new();
    let err = harness.channels.create("general", &[]).await.unwrap_err();
    assert!(matches!(err, ChannelError::Validation(_)));
}

#[tokio::test]
async fn test_reserved_name_is_rejected_on_create() {
    let harness = harness_with_users(&["alice", "bob"]).await;

    // A user-created "Global" would be undeletable and depletion-exempt,
    // and could capture the registration join.
    let err = harness
        .channels
        .create(GLOBAL_CHANNEL, &["alice".into(), "bob".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::ReservedChannel));
}

#[tokio::test]
async fn test_create_treats_members_as_a_set() {
    let harness = harness_with_users(&["alice", "bob"]).await;

    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into(), "alice".into()])
        .await
        .unwrap();
    assert_eq!(channel.members, vec!["alice".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn test_non_member_reads_observe_not_found() {
    let harness = harness_with_users(&["alice", "bob", "mallory"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    // A member sees the channel.
    assert!(harness.channels.get("alice", channel.id).await.is_ok());

    // An outsider gets the same answer as for an absent channel.
    let err = harness
        .channels
        .get("mallory", channel.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));

    let err = harness
        .channels
        .get("alice", Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));
}

#[tokio::test]
async fn test_listing_is_scoped_to_the_requester() {
    let harness = harness_with_users(&["alice", "bob", "carol"]).await;
    harness
        .channels
        .create("one", &["alice".into(), "bob".into()])
        .await
        .unwrap();
    harness
        .channels
        .create("two", &["bob".into(), "carol".into()])
        .await
        .unwrap();

    let alice = harness.channels.list_for("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].name, "one");

    let bob = harness.channels.list_for("bob").await.unwrap();
    assert_eq!(bob.len(), 2);

    assert!(harness.channels.list_for("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_appends_the_join_notice() {
    let harness = harness_with_users(&["alice", "bob", "carol"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let updated = harness
        .channels
        .join(channel.id, "alice", "carol")
        .await
        .unwrap();

    assert!(updated.has_member("carol"));
    let last = updated.messages.last().unwrap();
    assert_eq!(last.author, SYSTEM_AUTHOR);
    assert_eq!(last.content, "carol has joined");
}

#[tokio::test]
async fn test_outsider_cannot_add_members() {
    let harness = harness_with_users(&["alice", "bob", "mallory", "carol"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let err = harness
        .channels
        .join(channel.id, "mallory", "carol")
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));
}

#[tokio::test]
async fn test_adding_an_existing_member_is_rejected() {
    let harness = harness_with_users(&["alice", "bob"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let err = harness
        .channels
        .join(channel.id, "alice", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::AlreadyMember));
}

#[tokio::test]
async fn test_messages_append_in_order() {
    let harness = harness_with_users(&["alice", "bob"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    harness
        .channels
        .post(channel.id, "alice", "first")
        .await
        .unwrap();
    harness
        .channels
        .post(channel.id, "bob", "second")
        .await
        .unwrap();
    let updated = harness
        .channels
        .post(channel.id, "alice", "third")
        .await
        .unwrap();

    let contents: Vec<&str> = updated.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    assert_eq!(updated.messages[0].author, "alice");
    assert_eq!(updated.messages[1].author, "bob");
}

#[tokio::test]
async fn test_non_member_cannot_post() {
    let harness = harness_with_users(&["alice", "bob", "mallory"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let err = harness
        .channels
        .post(channel.id, "mallory", "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));
}

#[tokio::test]
async fn test_empty_message_content_is_rejected() {
    let harness = harness_with_users(&["alice", "bob"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let err = harness
        .channels
        .post(channel.id, "alice", "")
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::Validation(_)));
}

#[tokio::test]
async fn test_leave_with_survivors_appends_the_leave_notice() {
    let harness = harness_with_users(&["alice", "bob", "carol"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into(), "carol".into()])
        .await
        .unwrap();

    let outcome = harness.channels.leave(channel.id, "carol").await.unwrap();
    let updated = match outcome {
        RemovalOutcome::Left(channel) => channel,
        RemovalOutcome::Deleted => panic!("channel should survive"),
    };

    assert!(!updated.has_member("carol"));
    let last = updated.messages.last().unwrap();
    assert_eq!(last.author, SYSTEM_AUTHOR);
    assert_eq!(last.content, "carol has left");
}

#[tokio::test]
async fn test_leave_below_threshold_deletes_the_channel() {
    let harness = harness_with_users(&["alice", "bob"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    let outcome = harness.channels.leave(channel.id, "bob").await.unwrap();
    assert_eq!(outcome, RemovalOutcome::Deleted);

    let err = harness.channels.get("alice", channel.id).await.unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));
}

#[tokio::test]
async fn test_leaving_a_channel_twice_is_rejected() {
    let harness = harness_with_users(&["alice", "bob", "carol"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into(), "carol".into()])
        .await
        .unwrap();

    harness.channels.leave(channel.id, "carol").await.unwrap();
    let err = harness.channels.leave(channel.id, "carol").await.unwrap_err();
    assert!(matches!(err, ChannelError::NotMember));
}

#[tokio::test]
async fn test_global_survives_depletion() {
    let harness = harness_with_users(&["alice"]).await;
    let global_id = harness.seed_global().await;

    harness.channels.admit(global_id, "alice").await.unwrap();
    let outcome = harness.channels.leave(global_id, "alice").await.unwrap();

    // Down to zero members, yet the channel stays.
    match outcome {
        RemovalOutcome::Left(channel) => assert!(channel.members.is_empty()),
        RemovalOutcome::Deleted => panic!("the reserved channel must survive"),
    }
}

#[tokio::test]
async fn test_global_cannot_be_deleted_explicitly() {
    let harness = TestHarness::new();
    let global_id = harness.seed_global().await;

    let err = harness.channels.delete(global_id).await.unwrap_err();
    assert!(matches!(err, ChannelError::ReservedChannel));
}

#[tokio::test]
async fn test_explicit_delete_removes_the_channel() {
    let harness = harness_with_users(&["alice", "bob"]).await;
    let channel = harness
        .channels
        .create("general", &["alice".into(), "bob".into()])
        .await
        .unwrap();

    harness.channels.delete(channel.id).await.unwrap();
    assert_eq!(harness.channel_repo.channel_count(), 0);

    let err = harness.channels.delete(channel.id).await.unwrap_err();
    assert!(matches!(err, ChannelError::NotFound));
}
