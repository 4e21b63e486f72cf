// src/services/commission_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CommissionRepository,
    models::{
        commission::{
            installment_schedule, rollup_status, status_after_revert, Commission,
            CommissionInstallment, CommissionStatus, InstallmentStatus,
        },
        indication::{Indication, IndicationStatus},
    },
};

#[derive(Clone)]
pub struct CommissionService {
    repo: CommissionRepository,
    pool: PgPool,

    // Valor total por indicação aprovada (padrão R$ 900,00).
    total_value: Decimal,
}

impl CommissionService {
    pub fn new(repo: CommissionRepository, pool: PgPool, total_value: Decimal) -> Self {
        Self { repo, pool, total_value }
    }

    /// Gera a comissão e as 3 parcelas de uma indicação aprovada.
    ///
    /// Idempotente: se a comissão já existe (inclusive criada por outra
    /// sessão no meio do caminho, graças ao UNIQUE em indication_id), a
    /// existente é devolvida sem criar linha nenhuma.
    pub async fn generate_for_indication(
        &self,
        conn: &mut PgConnection,
        indication: &Indication,
    ) -> Result<(Commission, Vec<CommissionInstallment>), AppError> {
        if indication.status != IndicationStatus::Aprovado {
            return Err(AppError::InvalidTransition(
                "somente indicações aprovadas geram comissão.".into(),
            ));
        }

        if let Some(existing) = self
            .repo
            .find_commission_by_indication(&mut *conn, indication.id)
            .await?
        {
            let installments = self
                .repo
                .installments_by_commission(&mut *conn, existing.id)
                .await?;
            return Ok((existing, installments));
        }

        let Some(commission) = self
            .repo
            .insert_commission(&mut *conn, indication.id, indication.ambassador_id, self.total_value)
            .await?
        else {
            // Outra sessão inseriu entre a leitura e o INSERT; relê.
            let existing = self
                .repo
                .find_commission_by_indication(&mut *conn, indication.id)
                .await?
                .ok_or(AppError::CommissionNotFound)?;
            let installments = self
                .repo
                .installments_by_commission(&mut *conn, existing.id)
                .await?;
            return Ok((existing, installments));
        };

        let approval_date = indication
            .approval_date
            .unwrap_or_else(Utc::now)
            .date_naive();

        let mut installments = Vec::with_capacity(3);
        for draft in installment_schedule(commission.total_value, approval_date) {
            let installment = self
                .repo
                .insert_installment(
                    &mut *conn,
                    commission.id,
                    commission.ambassador_id,
                    draft.installment_number,
                    draft.value,
                    draft.due_date,
                )
                .await?;
            installments.push(installment);
        }

        tracing::info!(
            "💰 Comissão de {} gerada para a indicação {} em {} parcelas",
            commission.total_value,
            indication.id,
            installments.len()
        );

        Ok((commission, installments))
    }

    pub async fn list_installments(
        &self,
        status: Option<InstallmentStatus>,
        ambassador_id: Option<Uuid>,
        month: Option<i32>,
        year: Option<i32>,
    ) -> Result<Vec<CommissionInstallment>, AppError> {
        self.repo
            .list_installments(&self.pool, status, ambassador_id, month, year)
            .await
    }

    /// Marca uma parcela como paga. Legal a partir de `pendente` e de
    /// `atrasado` (pagar com atraso é pagar). Recalcula o rollup da comissão
    /// na mesma transação.
    pub async fn mark_paid(&self, id: Uuid) -> Result<CommissionInstallment, AppError> {
        let mut tx = self.pool.begin().await?;

        let installment = self
            .repo
            .find_installment(&mut *tx, id)
            .await?
            .ok_or(AppError::InstallmentNotFound)?;

        self.ensure_commission_active(&mut tx, installment.commission_id).await?;

        if installment.status == InstallmentStatus::Pago {
            return Err(AppError::InvalidTransition("a parcela já está paga.".into()));
        }

        let updated = self
            .repo
            .mark_installment_paid(&mut *tx, id, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("a parcela mudou de status em outra sessão.".into())
            })?;

        self.refresh_rollup(&mut tx, updated.commission_id).await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Reverte o pagamento de uma parcela. O destino depende do vencimento:
    /// parcela vencida volta direto para `atrasado`, não para `pendente`.
    pub async fn revert_payment(&self, id: Uuid) -> Result<CommissionInstallment, AppError> {
        let mut tx = self.pool.begin().await?;

        let installment = self
            .repo
            .find_installment(&mut *tx, id)
            .await?
            .ok_or(AppError::InstallmentNotFound)?;

        self.ensure_commission_active(&mut tx, installment.commission_id).await?;

        if installment.status != InstallmentStatus::Pago {
            return Err(AppError::InvalidTransition(
                "somente parcelas pagas podem ser revertidas.".into(),
            ));
        }

        let new_status = status_after_revert(installment.due_date, Utc::now().date_naive());

        let updated = self
            .repo
            .revert_installment(&mut *tx, id, new_status)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("a parcela mudou de status em outra sessão.".into())
            })?;

        self.refresh_rollup(&mut tx, updated.commission_id).await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// "Verificar Atrasos": um único UPDATE baseado em conjunto move toda
    /// parcela pendente vencida para `atrasado`. Idempotente por construção;
    /// parcelas pagas nunca são tocadas. Disparado explicitamente pelo admin,
    /// sem agendador em segundo plano.
    pub async fn sweep_overdue(&self) -> Result<Vec<CommissionInstallment>, AppError> {
        let today = Utc::now().date_naive();
        let flipped = self.repo.sweep_overdue(&self.pool, today).await?;

        if !flipped.is_empty() {
            tracing::info!("⏰ {} parcelas marcadas como atrasadas", flipped.len());
        }

        Ok(flipped)
    }

    /// Override manual do admin: cancelar uma comissão ou reativá-la.
    /// `pago` nunca é aceito aqui porque é derivado das parcelas.
    pub async fn set_commission_status(
        &self,
        id: Uuid,
        target: CommissionStatus,
    ) -> Result<Commission, AppError> {
        match target {
            CommissionStatus::Pago => Err(AppError::InvalidTransition(
                "'pago' é derivado das parcelas e não pode ser definido manualmente.".into(),
            )),
            CommissionStatus::Cancelado => {
                let mut tx = self.pool.begin().await?;

                let commission = self
                    .repo
                    .find_commission(&mut *tx, id)
                    .await?
                    .ok_or(AppError::CommissionNotFound)?;

                if commission.status == CommissionStatus::Cancelado {
                    return Err(AppError::InvalidTransition(
                        "a comissão já está cancelada.".into(),
                    ));
                }

                let updated = self
                    .repo
                    .cas_commission_status(&mut *tx, id, commission.status, CommissionStatus::Cancelado)
                    .await?
                    .ok_or_else(|| {
                        AppError::InvalidTransition(
                            "a comissão mudou de status em outra sessão.".into(),
                        )
                    })?;

                tx.commit().await?;
                Ok(updated)
            }
            CommissionStatus::Pendente => {
                // Reativação: volta para o status derivado das parcelas.
                let mut tx = self.pool.begin().await?;

                let commission = self
                    .repo
                    .find_commission(&mut *tx, id)
                    .await?
                    .ok_or(AppError::CommissionNotFound)?;

                if commission.status != CommissionStatus::Cancelado {
                    return Err(AppError::InvalidTransition(
                        "somente comissões canceladas podem ser reativadas.".into(),
                    ));
                }

                let installments = self
                    .repo
                    .installments_by_commission(&mut *tx, id)
                    .await?;
                let derived = rollup_status(&installments);

                let updated = self
                    .repo
                    .cas_commission_status(&mut *tx, id, CommissionStatus::Cancelado, derived)
                    .await?
                    .ok_or_else(|| {
                        AppError::InvalidTransition(
                            "a comissão mudou de status em outra sessão.".into(),
                        )
                    })?;

                tx.commit().await?;
                Ok(updated)
            }
        }
    }

    // Comissão cancelada congela as parcelas até o admin reativar.
    async fn ensure_commission_active(
        &self,
        conn: &mut PgConnection,
        commission_id: Uuid,
    ) -> Result<(), AppError> {
        let commission = self
            .repo
            .find_commission(&mut *conn, commission_id)
            .await?
            .ok_or(AppError::CommissionNotFound)?;

        if commission.status == CommissionStatus::Cancelado {
            return Err(AppError::InvalidTransition(
                "a comissão está cancelada; reative-a antes de alterar parcelas.".into(),
            ));
        }

        Ok(())
    }

    async fn refresh_rollup(
        &self,
        conn: &mut PgConnection,
        commission_id: Uuid,
    ) -> Result<(), AppError> {
        let installments = self
            .repo
            .installments_by_commission(&mut *conn, commission_id)
            .await?;
        let status = rollup_status(&installments);
        self.repo.write_rollup(&mut *conn, commission_id, status).await
    }
}
