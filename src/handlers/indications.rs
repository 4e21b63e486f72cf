// src/handlers/indications.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, AuthenticatedUser},
    models::indication::{Indication, IndicationStatus, Origin, Segment},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndicationPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "João Pereira")]
    pub client_name: String,

    #[validate(email(message = "O e-mail do cliente é inválido."))]
    #[schema(example = "joao@email.com")]
    pub client_email: String,

    #[validate(length(min = 1, message = "O telefone do cliente é obrigatório."))]
    #[schema(example = "(11) 99999-9999")]
    pub client_phone: String,

    pub origin: Origin,
    pub segment: Segment,

    // Texto livre quando o segmento é "outros".
    pub segment_other: Option<String>,

    pub observations: Option<String>,

    // Somente admins podem indicar em nome de outra embaixadora.
    pub ambassador_id: Option<Uuid>,
}

// POST /api/indications
#[utoipa::path(
    post,
    path = "/api/indications",
    tag = "Indicações",
    request_body = CreateIndicationPayload,
    responses(
        (status = 201, description = "Indicação criada com status 'agendado'", body = Indication),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_indication(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateIndicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let indication = app_state
        .indication_service
        .create(
            &user,
            &payload.client_name,
            &payload.client_email,
            &payload.client_phone,
            payload.origin,
            payload.segment,
            payload.segment_other,
            payload.observations,
            payload.ambassador_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(indication)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIndicationsParams {
    pub status: Option<IndicationStatus>,
}

// GET /api/indications
#[utoipa::path(
    get,
    path = "/api/indications",
    tag = "Indicações",
    params(ListIndicationsParams),
    responses(
        (status = 200, description = "Lista de indicações (admin vê todas, embaixadora só as suas)", body = Vec<Indication>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_indications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<ListIndicationsParams>,
) -> Result<impl IntoResponse, AppError> {
    let indications = app_state
        .indication_service
        .list(&user, params.status)
        .await?;

    Ok((StatusCode::OK, Json(indications)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateIndicationStatusPayload {
    #[schema(example = "aprovado")]
    pub status: IndicationStatus,
}

// PUT /api/indications/{id}/status
#[utoipa::path(
    put,
    path = "/api/indications/{id}/status",
    tag = "Indicações",
    request_body = UpdateIndicationStatusPayload,
    params(("id" = Uuid, Path, description = "ID da indicação")),
    responses(
        (status = 200, description = "Status atualizado; aprovação gera as parcelas", body = Indication),
        (status = 403, description = "Somente admins"),
        (status = 404, description = "Indicação não encontrada"),
        (status = 409, description = "Indicação já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_indication_status(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIndicationStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let indication = app_state
        .indication_service
        .set_status(id, payload.status)
        .await?;

    Ok((StatusCode::OK, Json(indication)))
}
