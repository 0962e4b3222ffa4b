//! User Handlers
//!
//! Registration, login/logout, directory lookups, account deletion, and
//! friend/block relationship transitions. Handlers stay thin: validate,
//! delegate to a service, convert the domain result to a response DTO.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use crate::application::dto::{
    AckResponse, CreateUserRequest, DeleteUserRequest, GetUserQuery, IsAuthResponse, LoginRequest,
    SessionResponse, UpdateRelationshipRequest, UserResponse,
};
use crate::application::services::{
    AuthService, AuthServiceImpl, ChannelServiceImpl, CredentialHasher, DomainService,
    DomainServiceImpl, UserService, UserServiceImpl,
};
use crate::domain::Identity;
use crate::infrastructure::repositories::{PgChannelRepository, PgUserRepository};
use crate::presentation::middleware::bearer_token;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(CredentialHasher::new()),
    )
}

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.sessions.clone(),
        Arc::new(CredentialHasher::new()),
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

/// POST /users/create
///
/// Register a new account and join it to the "Global" channel.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    request.validate().map_err(validation_error)?;

    let user = domain_service(&state)
        .register_user(&request.name, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/get?name=...
pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<GetUserQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_by_name(&query.name).await?;
    Ok(Json(UserResponse::from(user)))
}

/// GET /users/getList
///
/// Names only. An empty directory is an empty array, not an error.
pub async fn get_user_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let names = user_service(&state).list().await?;
    Ok(Json(names))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let session = auth_service(&state)
        .login(&request.name, &request.password)
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

/// POST /users/logout
///
/// Tolerant: a missing or stale token still gets a 200. Registered
/// outside the session middleware for that reason.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AckResponse> {
    if let Some(token) = bearer_token(&headers) {
        auth_service(&state).logout(token).await;
    }
    Json(AckResponse::new("Logged out"))
}

/// GET /users/isAuth
///
/// Reaching the handler means the session middleware accepted the token.
pub async fn is_auth(Extension(_identity): Extension<Identity>) -> Json<IsAuthResponse> {
    Json(IsAuthResponse { ok: true })
}

/// GET /users/getSelf
pub async fn get_self(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_by_name(&identity.name).await?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /users/delete
///
/// Deletes the account and cascades the removal through every channel
/// membership. Callers may only delete themselves.
// TODO: open deletion of other accounts to operators once a role model exists.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<DeleteUserRequest>,
) -> Result<Json<AckResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    if request.name != identity.name {
        return Err(AppError::Unauthorized(
            "Cannot delete another user's account".into(),
        ));
    }

    domain_service(&state).delete_user(&request.name).await?;

    // The record is gone; any outstanding sessions for it must go too.
    state.sessions.revoke_user(&request.name);

    Ok(Json(AckResponse::new("User deleted")))
}

/// POST /users/updateRelationship
///
/// One friend/block transition for the logged-in user.
pub async fn update_relationship(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<UpdateRelationshipRequest>,
) -> Result<Json<UserResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let user = user_service(&state)
        .update_relationship(&identity.name, request.action, &request.name)
        .await?;

    Ok(Json(UserResponse::from(user)))
}
