// src/db/indication_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::indication::{Indication, IndicationStatus, Origin, Segment},
};

#[derive(Clone)]
pub struct IndicationRepository {
    pool: PgPool,
}

impl IndicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        ambassador_id: Uuid,
        client_name: &str,
        client_email: &str,
        client_phone: &str,
        origin: Origin,
        segment: Segment,
        segment_other: Option<&str>,
        observations: Option<&str>,
    ) -> Result<Indication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let indication = sqlx::query_as::<_, Indication>(
            r#"
            INSERT INTO indications (
                ambassador_id, client_name, client_email, client_phone,
                origin, segment, segment_other, observations
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ambassador_id)
        .bind(client_name)
        .bind(client_email)
        .bind(client_phone)
        .bind(origin)
        .bind(segment)
        .bind(segment_other)
        .bind(observations)
        .fetch_one(executor)
        .await?;

        Ok(indication)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Indication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let indication =
            sqlx::query_as::<_, Indication>("SELECT * FROM indications WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(indication)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        ambassador_id: Option<Uuid>,
        status: Option<IndicationStatus>,
    ) -> Result<Vec<Indication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let indications = sqlx::query_as::<_, Indication>(
            r#"
            SELECT * FROM indications
            WHERE ($1::uuid IS NULL OR ambassador_id = $1)
              AND ($2::indication_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(ambassador_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(indications)
    }

    // Transição compare-and-set: só sai de 'agendado'. Se outra sessão já
    // decidiu o status, nenhuma linha volta e o serviço trata como conflito.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: IndicationStatus,
        approval_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Indication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let indication = sqlx::query_as::<_, Indication>(
            r#"
            UPDATE indications
            SET status = $2, approval_date = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'agendado'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(approval_date)
        .fetch_optional(executor)
        .await?;

        Ok(indication)
    }
}
