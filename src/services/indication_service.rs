// src/services/indication_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::IndicationRepository,
    models::{
        auth::{User, UserRole},
        indication::{Indication, IndicationStatus, Origin, Segment},
    },
    services::commission_service::CommissionService,
};

#[derive(Clone)]
pub struct IndicationService {
    repo: IndicationRepository,
    commission_service: CommissionService,
    pool: PgPool,
}

impl IndicationService {
    pub fn new(
        repo: IndicationRepository,
        commission_service: CommissionService,
        pool: PgPool,
    ) -> Self {
        Self { repo, commission_service, pool }
    }

    /// Cria uma indicação com status inicial `agendado`. Embaixadoras sempre
    /// indicam em nome próprio; um admin pode indicar em nome de outra
    /// embaixadora via `on_behalf_of`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        actor: &User,
        client_name: &str,
        client_email: &str,
        client_phone: &str,
        origin: Origin,
        segment: Segment,
        segment_other: Option<String>,
        observations: Option<String>,
        on_behalf_of: Option<Uuid>,
    ) -> Result<Indication, AppError> {
        let ambassador_id = match actor.role {
            UserRole::Admin => on_behalf_of.unwrap_or(actor.id),
            UserRole::Embaixadora => actor.id,
        };

        // Texto livre de segmento só faz sentido quando o segmento é "outros".
        let segment_other = if segment == Segment::Outros {
            segment_other.filter(|s| !s.trim().is_empty())
        } else {
            None
        };

        self.repo
            .create(
                &self.pool,
                ambassador_id,
                client_name,
                client_email,
                client_phone,
                origin,
                segment,
                segment_other.as_deref(),
                observations.as_deref(),
            )
            .await
    }

    pub async fn list(
        &self,
        actor: &User,
        status: Option<IndicationStatus>,
    ) -> Result<Vec<Indication>, AppError> {
        let ambassador_filter = match actor.role {
            UserRole::Admin => None,
            UserRole::Embaixadora => Some(actor.id),
        };

        self.repo.list(&self.pool, ambassador_filter, status).await
    }

    /// Decide uma indicação: `agendado → aprovado | recusado`. Os dois
    /// destinos são terminais; re-decidir é erro, nunca um segundo disparo
    /// do gerador de parcelas. A geração acontece dentro da mesma transação
    /// da aprovação.
    pub async fn set_status(
        &self,
        id: Uuid,
        new_status: IndicationStatus,
    ) -> Result<Indication, AppError> {
        if new_status == IndicationStatus::Agendado {
            return Err(AppError::InvalidTransition(
                "uma indicação não pode voltar para 'agendado'.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::IndicationNotFound)?;

        if current.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "a indicação já foi decidida e não aceita novo status.".into(),
            ));
        }

        let approval_date = (new_status == IndicationStatus::Aprovado).then(Utc::now);

        let updated = self
            .repo
            .set_status(&mut *tx, id, new_status, approval_date)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(
                    "a indicação foi decidida em outra sessão.".into(),
                )
            })?;

        if updated.status == IndicationStatus::Aprovado {
            self.commission_service
                .generate_for_indication(&mut *tx, &updated)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("📋 Indicação {} decidida: {:?}", updated.id, updated.status);

        Ok(updated)
    }
}
