//! User API endpoints

use api_types::user::{UserListResponse, UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        name: user.name,
    }
}

/// Registers a new user. Unauthenticated.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(engine::RegisterUserCmd {
            email: payload.email,
            name: payload.name,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

/// Lists every registered user.
pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<UserListResponse>, ServerError> {
    let users = state.engine.list_users().await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(view).collect(),
    }))
}
