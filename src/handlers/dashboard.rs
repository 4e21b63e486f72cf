// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, AuthenticatedUser},
    models::dashboard::{AdminDashboard, AmbassadorDashboard},
};

// GET /api/dashboard/admin
#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Visão geral: estatísticas, gráficos e ranking", body = AdminDashboard),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Somente admins")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_dashboard(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.dashboard_service.admin_dashboard().await?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// GET /api/dashboard/ambassador
#[utoipa::path(
    get,
    path = "/api/dashboard/ambassador",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Visão da embaixadora logada", body = AmbassadorDashboard),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn ambassador_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state
        .dashboard_service
        .ambassador_dashboard(user.id)
        .await?;

    Ok((StatusCode::OK, Json(dashboard)))
}
