//! Messaging Handlers
//!
//! Channel lifecycle, membership changes, and message posting. All of
//! these routes sit behind the session middleware, so every handler
//! receives a resolved `Identity` extension.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    AckResponse, AddUserRequest, ChannelResponse, ChannelSummaryResponse, CreateChannelRequest,
    CreateChannelResponse, DeleteChannelRequest, GetChannelQuery, LeaveChannelRequest,
    PostMessageRequest,
};
use crate::application::services::{
    ChannelService, ChannelServiceImpl, CredentialHasher, DomainService, DomainServiceImpl,
    RemovalOutcome, UserServiceImpl,
};
use crate::domain::Identity;
use crate::infrastructure::repositories::{PgChannelRepository, PgUserRepository};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn channel_service(
    state: &AppState,
) -> ChannelServiceImpl<PgChannelRepository, PgUserRepository> {
    ChannelServiceImpl::new(
        Arc::new(PgChannelRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

fn domain_service(
    state: &AppState,
) -> DomainServiceImpl<
    UserServiceImpl<PgUserRepository>,
    ChannelServiceImpl<PgChannelRepository, PgUserRepository>,
    PgChannelRepository,
> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let channel_repo = Arc::new(PgChannelRepository::new(state.db.clone()));
    DomainServiceImpl::new(
        Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            Arc::new(CredentialHasher::new()),
        )),
        Arc::new(ChannelServiceImpl::new(channel_repo.clone(), user_repo)),
        channel_repo,
    )
}

/// POST /messaging/create
///
/// The creator is always a member, whether or not they listed
/// themselves.
pub async fn create_channel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<CreateChannelResponse>), AppError> {
    request.validate().map_err(validation_error)?;

    let mut members = request.members;
    if !members.contains(&identity.name) {
        members.push(identity.name.clone());
    }

    let channel = channel_service(&state)
        .create(&request.name, &members)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateChannelResponse { id: channel.id }),
    ))
}

/// GET /messaging/get?id=...
///
/// Full channel state including the message log. Non-members get a 404,
/// never a membership hint.
pub async fn get_channel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<GetChannelQuery>,
) -> Result<Json<ChannelResponse>, AppError> {
    let channel = channel_service(&state)
        .get(&identity.name, query.id)
        .await?;
    Ok(Json(ChannelResponse::from(channel)))
}

/// GET /messaging/getList
///
/// Channels the caller belongs to, without message bodies. No
/// memberships is an empty array.
pub async fn get_channel_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ChannelSummaryResponse>>, AppError> {
    let summaries = channel_service(&state).list_for(&identity.name).await?;
    Ok(Json(
        summaries.into_iter().map(ChannelSummaryResponse::from).collect(),
    ))
}

/// POST /messaging/postMessage
pub async fn post_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<ChannelResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let channel = domain_service(&state)
        .post_message(request.channel, &identity.name, &request.content)
        .await?;

    Ok(Json(ChannelResponse::from(channel)))
}

/// POST /messaging/addUser
///
/// Add another registered user to a channel the caller belongs to.
pub async fn add_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<AddUserRequest>,
) -> Result<Json<ChannelResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let channel = channel_service(&state)
        .join(request.channel, &identity.name, &request.name)
        .await?;

    Ok(Json(ChannelResponse::from(channel)))
}

/// POST /messaging/leave
///
/// Leaving may delete the channel outright when membership depletes.
pub async fn leave_channel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<LeaveChannelRequest>,
) -> Result<Json<AckResponse>, AppError> {
    let outcome = channel_service(&state)
        .leave(request.channel, &identity.name)
        .await?;

    let ack = match outcome {
        RemovalOutcome::Left(_) => AckResponse::new("Left channel"),
        RemovalOutcome::Deleted => AckResponse::new("Left channel, channel deleted"),
    };
    Ok(Json(ack))
}

/// POST /messaging/delete
///
/// Explicit deletion, restricted to members of the channel.
pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<DeleteChannelRequest>,
) -> Result<Json<AckResponse>, AppError> {
    let service = channel_service(&state);

    // Membership check first so outsiders observe the same 404 as for an
    // absent channel.
    service.get(&identity.name, request.channel).await?;
    service.delete(request.channel).await?;

    Ok(Json(AckResponse::new("Channel deleted")))
}
