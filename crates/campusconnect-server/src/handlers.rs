//! Request handlers.
//!
//! Every mutating handler is two-phase: the store write commits and decides
//! the HTTP response, then the dispatcher runs and contributes only an
//! advisory `notified` summary. A notification failure never turns a
//! committed write into an error response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use serde_json::json;

use campusconnect_core::{
    EventChanges, MutationKind, NewEvent, NewRegistration, NewUser, normalize_email,
};
use campusconnect_storage::RegisterOutcome;

use crate::error::ApiError;
use crate::server::AppState;

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "CampusConnect Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

// ---- Events ----

pub async fn list_events(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.events.list().await?;
    Ok((StatusCode::OK, Json(events)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok((StatusCode::OK, Json(event)))
}

pub async fn add_event(
    State(state): State<AppState>,
    Json(draft): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
    draft.validate()?;
    let event = state.events.create(draft.into_event()).await?;

    // Write committed; dispatch is advisory from here on.
    let outcome = state.dispatcher.dispatch(&event, MutationKind::Created).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event added successfully",
            "event": event,
            "notified": outcome,
        })),
    ))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<EventChanges>,
) -> Result<impl IntoResponse, ApiError> {
    changes.validate()?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("no fields to update"));
    }
    let event = state.events.update(&id, &changes).await?;

    let outcome = state.dispatcher.dispatch(&event, MutationKind::Updated).await;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Event updated successfully",
            "event": event,
            "notified": outcome,
        })),
    ))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Registrations go first so a partial failure cannot leave orphans
    // pointing at a deleted event.
    let removed = state.registrations.delete_for_event(&id).await?;
    state.events.delete(&id).await?;

    tracing::info!(event_id = %id, registrations_removed = removed, "event deleted");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Event deleted successfully",
            "registrations_removed": removed,
        })),
    ))
}

/// Manual re-announcement of an existing event to all users.
pub async fn send_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    let outcome = state.dispatcher.dispatch(&event, MutationKind::Created).await;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Notifications sent",
            "notified": outcome,
        })),
    ))
}

// ---- Registrations ----

pub async fn register_event(
    State(state): State<AppState>,
    Json(draft): Json<NewRegistration>,
) -> Result<impl IntoResponse, ApiError> {
    draft.validate()?;

    let event = state
        .events
        .get(&draft.event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    match state.registrations.register(draft, &event.title).await? {
        RegisterOutcome::Created(registration) => {
            let outcome = state
                .dispatcher
                .send_registration_confirmation(&registration)
                .await;
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "Registration successful",
                    "registration": registration,
                    "notified": outcome,
                })),
            ))
        }
        // Duplicate attempts are a normal response, not an error.
        RegisterOutcome::AlreadyRegistered => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "already-registered",
                "message": "Already registered for this event",
            })),
        )),
    }
}

// ---- Accounts ----

pub async fn signup(
    State(state): State<AppState>,
    Json(draft): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    draft.validate()?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(draft.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?
        .to_string();

    let user = draft.into_user(hash);
    let user = state.users.create(user).await.map_err(|e| {
        if e.is_already_exists() {
            ApiError::conflict("User already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful",
            "user": user,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| ApiError::Internal(format!("stored password hash invalid: {e}")))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Signin successful",
            "user": user,
        })),
    ))
}
