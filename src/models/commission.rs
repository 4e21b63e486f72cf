// src/models/commission.rs

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Toda comissão é paga em 3 parcelas mensais.
pub const INSTALLMENT_COUNT: u32 = 3;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pendente,  // Existe parcela não paga
    Pago,      // Derivado: as 3 parcelas estão pagas
    Cancelado, // Override manual do admin; bloqueia mutação das parcelas
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "installment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pendente,
    Pago,
    Atrasado, // Pendente com vencimento no passado; só o pente de atrasos chega aqui
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,

    // Exatamente uma comissão por indicação (UNIQUE no banco).
    pub indication_id: Uuid,

    // Cópia desnormalizada da dona da indicação, para consulta direta.
    pub ambassador_id: Uuid,

    #[schema(example = "900.00")]
    pub total_value: Decimal,

    pub status: CommissionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionInstallment {
    pub id: Uuid,

    pub commission_id: Uuid,
    pub ambassador_id: Uuid,

    // 1, 2 ou 3; único dentro da comissão.
    pub installment_number: i16,

    #[schema(example = "300.00")]
    pub value: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-02-15")]
    pub due_date: NaiveDate,

    pub status: InstallmentStatus,

    // Preenchida apenas enquanto a parcela está paga.
    pub payment_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Parcela ainda sem identidade, como sai do gerador e entra no banco.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentDraft {
    pub installment_number: i16,
    pub value: Decimal,
    pub due_date: NaiveDate,
}

// --- Regras puras do motor de parcelas ---

/// Gera o cronograma das 3 parcelas de uma comissão aprovada.
///
/// Divisão: as duas primeiras parcelas recebem `total / 3` truncado em
/// centavos; a última absorve o resto, de modo que a soma é sempre igual ao
/// total (ex.: 1000.00 vira 333.33 + 333.33 + 333.34). Vencimentos caem 1, 2
/// e 3 meses-calendário após a aprovação, com o dia ajustado para o fim do
/// mês quando necessário (31/01 vence 28/02).
pub fn installment_schedule(total_value: Decimal, approval_date: NaiveDate) -> Vec<InstallmentDraft> {
    let base = (total_value / Decimal::from(INSTALLMENT_COUNT))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);

    (1..=INSTALLMENT_COUNT)
        .map(|n| {
            let value = if n == INSTALLMENT_COUNT {
                total_value - base * Decimal::from(INSTALLMENT_COUNT - 1)
            } else {
                base
            };

            InstallmentDraft {
                installment_number: n as i16,
                value,
                due_date: approval_date + Months::new(n),
            }
        })
        .collect()
}

/// Decide o status de uma parcela cujo pagamento foi revertido: se o
/// vencimento já passou, ela volta direto para `atrasado`, não para
/// `pendente`.
pub fn status_after_revert(due_date: NaiveDate, today: NaiveDate) -> InstallmentStatus {
    if due_date < today {
        InstallmentStatus::Atrasado
    } else {
        InstallmentStatus::Pendente
    }
}

/// Status derivado da comissão: `pago` se e somente se as 3 parcelas estão
/// pagas. `cancelado` nunca sai daqui (é override manual, decidido fora).
pub fn rollup_status(installments: &[CommissionInstallment]) -> CommissionStatus {
    if !installments.is_empty()
        && installments.iter().all(|p| p.status == InstallmentStatus::Pago)
    {
        CommissionStatus::Pago
    } else {
        CommissionStatus::Pendente
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(number: i16, status: InstallmentStatus) -> CommissionInstallment {
        let created = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        CommissionInstallment {
            id: Uuid::new_v4(),
            commission_id: Uuid::nil(),
            ambassador_id: Uuid::nil(),
            installment_number: number,
            value: Decimal::new(30000, 2),
            due_date: date(2025, 1, 15) + Months::new(number as u32),
            status,
            payment_date: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn cronograma_de_900_gera_tres_parcelas_de_300() {
        let parcels = installment_schedule(Decimal::new(90000, 2), date(2025, 1, 15));

        assert_eq!(parcels.len(), 3);
        for (i, p) in parcels.iter().enumerate() {
            assert_eq!(p.installment_number, (i + 1) as i16);
            assert_eq!(p.value, Decimal::new(30000, 2));
        }
        assert_eq!(parcels[0].due_date, date(2025, 2, 15));
        assert_eq!(parcels[1].due_date, date(2025, 3, 15));
        assert_eq!(parcels[2].due_date, date(2025, 4, 15));
    }

    #[test]
    fn resto_da_divisao_vai_para_a_ultima_parcela() {
        let parcels = installment_schedule(Decimal::new(100000, 2), date(2025, 1, 15));

        assert_eq!(parcels[0].value, Decimal::new(33333, 2));
        assert_eq!(parcels[1].value, Decimal::new(33333, 2));
        assert_eq!(parcels[2].value, Decimal::new(33334, 2));
    }

    #[test]
    fn soma_das_parcelas_e_igual_ao_total() {
        for cents in [90000i64, 100000, 10001, 29999, 1] {
            let total = Decimal::new(cents, 2);
            let sum: Decimal = installment_schedule(total, date(2025, 1, 15))
                .iter()
                .map(|p| p.value)
                .sum();
            assert_eq!(sum, total, "total {} não conservado", total);
        }
    }

    #[test]
    fn vencimentos_no_fim_do_mes_sao_ajustados_e_crescentes() {
        let parcels = installment_schedule(Decimal::new(90000, 2), date(2025, 1, 31));

        assert_eq!(parcels[0].due_date, date(2025, 2, 28));
        assert_eq!(parcels[1].due_date, date(2025, 3, 31));
        assert_eq!(parcels[2].due_date, date(2025, 4, 30));
        assert!(parcels[0].due_date < parcels[1].due_date);
        assert!(parcels[1].due_date < parcels[2].due_date);
    }

    #[test]
    fn reversao_com_vencimento_passado_cai_em_atrasado() {
        let today = date(2025, 3, 1);
        assert_eq!(
            status_after_revert(date(2025, 2, 15), today),
            InstallmentStatus::Atrasado
        );
    }

    #[test]
    fn reversao_com_vencimento_hoje_ou_futuro_volta_para_pendente() {
        let today = date(2025, 3, 1);
        assert_eq!(
            status_after_revert(date(2025, 3, 1), today),
            InstallmentStatus::Pendente
        );
        assert_eq!(
            status_after_revert(date(2025, 4, 15), today),
            InstallmentStatus::Pendente
        );
    }

    #[test]
    fn rollup_fica_pago_somente_com_as_tres_parcelas_pagas() {
        let mut parcels = vec![
            installment(1, InstallmentStatus::Pago),
            installment(2, InstallmentStatus::Pago),
            installment(3, InstallmentStatus::Atrasado),
        ];
        assert_eq!(rollup_status(&parcels), CommissionStatus::Pendente);

        parcels[2].status = InstallmentStatus::Pago;
        assert_eq!(rollup_status(&parcels), CommissionStatus::Pago);

        // Reverter qualquer parcela derruba o rollup na hora.
        parcels[0].status = InstallmentStatus::Pendente;
        assert_eq!(rollup_status(&parcels), CommissionStatus::Pendente);
    }

    #[test]
    fn rollup_de_lista_vazia_e_pendente() {
        assert_eq!(rollup_status(&[]), CommissionStatus::Pendente);
    }
}
