// src/db/commission_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commission::{
        Commission, CommissionInstallment, CommissionStatus, InstallmentStatus,
    },
};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  COMISSÕES
    // =========================================================================

    // O UNIQUE em indication_id faz o trabalho pesado: com duas aprovações
    // concorrentes, só uma linha nasce e a outra sessão relê a existente.
    pub async fn insert_commission<'e, E>(
        &self,
        executor: E,
        indication_id: Uuid,
        ambassador_id: Uuid,
        total_value: Decimal,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions (indication_id, ambassador_id, total_value)
            VALUES ($1, $2, $3)
            ON CONFLICT (indication_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(indication_id)
        .bind(ambassador_id)
        .bind(total_value)
        .fetch_optional(executor)
        .await?;

        Ok(commission)
    }

    pub async fn find_commission<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission =
            sqlx::query_as::<_, Commission>("SELECT * FROM commissions WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(commission)
    }

    pub async fn find_commission_by_indication<'e, E>(
        &self,
        executor: E,
        indication_id: Uuid,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE indication_id = $1",
        )
        .bind(indication_id)
        .fetch_optional(executor)
        .await?;

        Ok(commission)
    }

    // Compare-and-set do override manual (cancelar / reativar).
    pub async fn cas_commission_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: CommissionStatus,
        to: CommissionStatus,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            r#"
            UPDATE commissions
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;

        Ok(commission)
    }

    // Grava o status derivado das parcelas. Uma comissão cancelada fica
    // congelada até o admin reativá-la.
    pub async fn write_rollup<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CommissionStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE commissions
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'cancelado'
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  PARCELAS
    // =========================================================================

    pub async fn insert_installment<'e, E>(
        &self,
        executor: E,
        commission_id: Uuid,
        ambassador_id: Uuid,
        installment_number: i16,
        value: Decimal,
        due_date: NaiveDate,
    ) -> Result<CommissionInstallment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            INSERT INTO commission_installments (
                commission_id, ambassador_id, installment_number, value, due_date
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(commission_id)
        .bind(ambassador_id)
        .bind(installment_number)
        .bind(value)
        .bind(due_date)
        .fetch_one(executor)
        .await?;

        Ok(installment)
    }

    pub async fn find_installment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, CommissionInstallment>(
            "SELECT * FROM commission_installments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(installment)
    }

    pub async fn installments_by_commission<'e, E>(
        &self,
        executor: E,
        commission_id: Uuid,
    ) -> Result<Vec<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            SELECT * FROM commission_installments
            WHERE commission_id = $1
            ORDER BY installment_number ASC
            "#,
        )
        .bind(commission_id)
        .fetch_all(executor)
        .await?;

        Ok(installments)
    }

    pub async fn list_installments<'e, E>(
        &self,
        executor: E,
        status: Option<InstallmentStatus>,
        ambassador_id: Option<Uuid>,
        month: Option<i32>,
        year: Option<i32>,
    ) -> Result<Vec<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            SELECT * FROM commission_installments
            WHERE ($1::installment_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR ambassador_id = $2)
              AND ($3::int IS NULL OR EXTRACT(MONTH FROM due_date) = $3)
              AND ($4::int IS NULL OR EXTRACT(YEAR FROM due_date) = $4)
            ORDER BY due_date DESC
            "#,
        )
        .bind(status)
        .bind(ambassador_id)
        .bind(month)
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(installments)
    }

    // Pagamento é legal a partir de 'pendente' ou 'atrasado'. O CAS garante
    // que dois admins clicando juntos não gravam duas vezes.
    pub async fn mark_installment_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payment_date: DateTime<Utc>,
    ) -> Result<Option<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            UPDATE commission_installments
            SET status = 'pago', payment_date = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('pendente', 'atrasado')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_date)
        .fetch_optional(executor)
        .await?;

        Ok(installment)
    }

    // Reversão só sai de 'pago'; o status de destino é decidido pelo serviço
    // comparando o vencimento com a data atual.
    pub async fn revert_installment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_status: InstallmentStatus,
    ) -> Result<Option<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            UPDATE commission_installments
            SET status = $2, payment_date = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pago'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_status)
        .fetch_optional(executor)
        .await?;

        Ok(installment)
    }

    // O pente de atrasos é um único UPDATE baseado em conjunto: idempotente e
    // seguro para rodar repetidamente ou em duas sessões ao mesmo tempo.
    pub async fn sweep_overdue<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<Vec<CommissionInstallment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, CommissionInstallment>(
            r#"
            UPDATE commission_installments
            SET status = 'atrasado', updated_at = NOW()
            WHERE status = 'pendente' AND due_date < $1
            RETURNING *
            "#,
        )
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(installments)
    }
}
