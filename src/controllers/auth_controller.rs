//! Endpoints de autenticación (JSON y formulario)

use axum::{extract::State, http::StatusCode, Extension, Form, Json};
use validator::Validate;

use crate::dto::auth_dto::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

async fn register(state: &AppState, request: RegisterRequest) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            user,
            "Registration successful! Please login.",
        )),
    ))
}

async fn login(state: &AppState, request: LoginRequest) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let response = state.auth.login(request.username, request.password).await?;
    let message = format!("Welcome back, {}!", response.user.username);
    Ok(Json(ApiResponse::success_with_message(response, message)))
}

/// POST /api/auth/register
pub async fn register_json(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    register(&state, request).await
}

/// POST /register (formulario)
pub async fn register_form(
    State(state): State<AppState>,
    Form(request): Form<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    register(&state, request).await
}

/// POST /api/auth/login
pub async fn login_json(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    login(&state, request).await
}

/// POST /login (formulario)
pub async fn login_form(
    State(state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    login(&state, request).await
}

/// PUT /api/auth/password (Bearer JWT)
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    request.validate()?;
    state
        .auth
        .change_password(user.user_id, &request.old_password, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// GET /api/auth/me (Bearer JWT)
pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.auth.get_user(user.user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}
