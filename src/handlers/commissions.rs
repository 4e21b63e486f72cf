// src/handlers/commissions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, AuthenticatedUser},
    models::{
        auth::UserRole,
        commission::{Commission, CommissionInstallment, CommissionStatus, InstallmentStatus},
        dashboard::CommissionSummary,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstallmentFilterParams {
    pub status: Option<InstallmentStatus>,
    pub ambassador_id: Option<Uuid>,
    pub month: Option<i32>,
    pub year: Option<i32>,
}

// GET /api/commission-installments
#[utoipa::path(
    get,
    path = "/api/commission-installments",
    tag = "Comissões",
    params(InstallmentFilterParams),
    responses(
        (status = 200, description = "Parcelas filtradas (embaixadora só vê as suas)", body = Vec<CommissionInstallment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_installments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<InstallmentFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    // Embaixadora nunca enxerga parcela alheia, mesmo forçando o filtro.
    let ambassador_id = match user.role {
        UserRole::Admin => params.ambassador_id,
        UserRole::Embaixadora => Some(user.id),
    };

    let installments = app_state
        .commission_service
        .list_installments(params.status, ambassador_id, params.month, params.year)
        .await?;

    Ok((StatusCode::OK, Json(installments)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInstallmentStatusPayload {
    #[schema(example = "pago")]
    pub status: InstallmentStatus,
}

// PUT /api/commission-installments/{id}/status
#[utoipa::path(
    put,
    path = "/api/commission-installments/{id}/status",
    tag = "Comissões",
    request_body = UpdateInstallmentStatusPayload,
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela atualizada", body = CommissionInstallment),
        (status = 403, description = "Somente admins"),
        (status = 404, description = "Parcela não encontrada"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_installment_status(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInstallmentStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let installment = match payload.status {
        InstallmentStatus::Pago => app_state.commission_service.mark_paid(id).await?,
        InstallmentStatus::Pendente => app_state.commission_service.revert_payment(id).await?,
        InstallmentStatus::Atrasado => {
            return Err(AppError::InvalidTransition(
                "'atrasado' é aplicado pela verificação de atrasos, não manualmente.".into(),
            ));
        }
    };

    Ok((StatusCode::OK, Json(installment)))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub updated: usize,
    pub installments: Vec<CommissionInstallment>,
}

// POST /api/commission-installments/check-overdue
#[utoipa::path(
    post,
    path = "/api/commission-installments/check-overdue",
    tag = "Comissões",
    responses(
        (status = 200, description = "Parcelas pendentes vencidas movidas para 'atrasado'", body = SweepReport),
        (status = 403, description = "Somente admins")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_overdue(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let installments = app_state.commission_service.sweep_overdue().await?;

    Ok((
        StatusCode::OK,
        Json(SweepReport { updated: installments.len(), installments }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    pub ambassador_id: Option<Uuid>,
}

// GET /api/commission-installments/summary
#[utoipa::path(
    get,
    path = "/api/commission-installments/summary",
    tag = "Comissões",
    params(SummaryParams),
    responses(
        (status = 200, description = "Resumo das parcelas por status", body = CommissionSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, AppError> {
    let ambassador_id = match user.role {
        UserRole::Admin => params.ambassador_id,
        UserRole::Embaixadora => Some(user.id),
    };

    let summary = app_state
        .dashboard_service
        .installment_summary(ambassador_id)
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommissionStatusPayload {
    #[schema(example = "cancelado")]
    pub status: CommissionStatus,
}

// PUT /api/commissions/{id}/status
#[utoipa::path(
    put,
    path = "/api/commissions/{id}/status",
    tag = "Comissões",
    request_body = UpdateCommissionStatusPayload,
    params(("id" = Uuid, Path, description = "ID da comissão")),
    responses(
        (status = 200, description = "Comissão cancelada ou reativada", body = Commission),
        (status = 403, description = "Somente admins"),
        (status = 404, description = "Comissão não encontrada"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_commission_status(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommissionStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let commission = app_state
        .commission_service
        .set_commission_status(id, payload.status)
        .await?;

    Ok((StatusCode::OK, Json(commission)))
}
