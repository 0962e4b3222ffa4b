//! User Directory and Relationship Graph Tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pretty_assertions::assert_eq;
use test_case::test_case;

use relay_server::application::services::{UserError, UserService};
use relay_server::domain::RelationshipAction;
use relay_server::shared::error::AppError;

use crate::common::TestHarness;

#[tokio::test]
async fn test_duplicate_registration_is_a_conflict() {
    let harness = TestHarness::new();
    harness.users.register("alice", "pw1").await.unwrap();

    let err = harness.users.register("alice", "pw2").await.unwrap_err();
    assert!(matches!(err, UserError::AlreadyExists));

    let status = AppError::from(err).into_response().status();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_user_lookup_is_not_found() {
    let harness = TestHarness::new();
    let err = harness.users.get_by_name("nobody").await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn test_listing_returns_names_only() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    let names = harness.users.list().await.unwrap();
    assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn test_empty_directory_lists_as_empty() {
    let harness = TestHarness::new();
    assert!(harness.users.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_friend_updates_only_the_friends_list() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    let user = harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap();

    assert!(user.is_friend("bob"));
    assert!(user.blocked.is_empty());

    // One-directional: bob's record is untouched.
    let bob = harness.users.get_by_name("bob").await.unwrap();
    assert!(bob.friends.is_empty());
}

#[tokio::test]
async fn test_duplicate_add_friend_is_rejected() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap();

    let err = harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::AlreadyInList("friends")));

    let status = AppError::from(err).into_response().status();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_removing_an_absent_friend_is_rejected() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    let err = harness
        .users
        .update_relationship("alice", RelationshipAction::RemoveFriend, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::NotInList("friends")));

    let status = AppError::from(err).into_response().status();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_case(RelationshipAction::AddFriend; "add friend")]
#[test_case(RelationshipAction::RemoveFriend; "remove friend")]
#[test_case(RelationshipAction::Block; "block")]
#[test_case(RelationshipAction::Unblock; "unblock")]
#[tokio::test]
async fn test_self_reference_is_rejected(action: RelationshipAction) {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;

    let err = harness
        .users
        .update_relationship("alice", action, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::SelfReference));
}

#[tokio::test]
async fn test_relationship_with_unknown_target_is_not_found() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;

    let err = harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn test_block_and_friend_lists_are_independent() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap();

    // Blocking a friend does not remove the friendship.
    let user = harness
        .users
        .update_relationship("alice", RelationshipAction::Block, "bob")
        .await
        .unwrap();
    assert!(user.is_friend("bob"));
    assert!(user.has_blocked("bob"));

    let user = harness
        .users
        .update_relationship("alice", RelationshipAction::Unblock, "bob")
        .await
        .unwrap();
    assert!(user.is_friend("bob"));
    assert!(!user.has_blocked("bob"));
}

#[tokio::test]
async fn test_remove_then_re_add_friend() {
    let harness = TestHarness::new();
    harness.seed_user("alice").await;
    harness.seed_user("bob").await;

    harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap();
    let user = harness
        .users
        .update_relationship("alice", RelationshipAction::RemoveFriend, "bob")
        .await
        .unwrap();
    assert!(!user.is_friend("bob"));

    let user = harness
        .users
        .update_relationship("alice", RelationshipAction::AddFriend, "bob")
        .await
        .unwrap();
    assert!(user.is_friend("bob"));
}
