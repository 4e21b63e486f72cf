// src/services/dashboard_service.rs
//
// Toda a agregação do sistema mora aqui, uma vez só: os dashboards antigos
// recalculavam esses números em cada tela, cada um de um jeito. As funções
// livres são transformações puras sobre coleções em memória; o serviço só
// busca as coleções e monta as views por papel.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CommissionRepository, IndicationRepository, UserRepository},
    models::{
        auth::UserRole,
        commission::{CommissionInstallment, InstallmentStatus},
        dashboard::{
            AdminDashboard, AdminStats, AmbassadorDashboard, AmbassadorStats,
            CommissionSummary, MonthlyBucket, OriginCount, SegmentConversion,
            TopAmbassadorEntry,
        },
        indication::{Indication, IndicationStatus, Origin, Segment},
    },
};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun",
    "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

// Janelas e limites das views, iguais para todo consumidor.
const MONTH_WINDOW: u32 = 12;
const TOP_AMBASSADORS_LIMIT: usize = 10;
const NEXT_PAYMENTS_LIMIT: usize = 5;
const ACTIVE_WINDOW_DAYS: i64 = 60;

// =============================================================================
//  TRANSFORMAÇÕES PURAS
// =============================================================================

/// Particiona as parcelas por status e soma contagens e valores.
pub fn summary(installments: &[CommissionInstallment]) -> CommissionSummary {
    let mut s = CommissionSummary::default();

    for p in installments {
        s.total_installments += 1;
        s.total_value += p.value;

        match p.status {
            InstallmentStatus::Pago => {
                s.paid_installments += 1;
                s.paid_value += p.value;
            }
            InstallmentStatus::Pendente => {
                s.pending_installments += 1;
                s.pending_value += p.value;
            }
            InstallmentStatus::Atrasado => {
                s.overdue_installments += 1;
                s.overdue_value += p.value;
            }
        }
    }

    s
}

/// Agrupa valores de parcela por mês de vencimento nos últimos `month_count`
/// meses (incluindo o corrente). Meses sem movimento entram zerados para o
/// eixo do gráfico ser contínuo.
pub fn monthly_buckets(
    installments: &[CommissionInstallment],
    today: NaiveDate,
    month_count: u32,
) -> Vec<MonthlyBucket> {
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 1..month_count {
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    let mut buckets = Vec::with_capacity(month_count as usize);
    for _ in 0..month_count {
        let mut bucket = MonthlyBucket {
            year,
            month,
            label: MONTH_LABELS[(month - 1) as usize].to_string(),
            paid_value: Decimal::ZERO,
            pending_value: Decimal::ZERO,
            overdue_value: Decimal::ZERO,
        };

        for p in installments
            .iter()
            .filter(|p| p.due_date.year() == year && p.due_date.month() == month)
        {
            match p.status {
                InstallmentStatus::Pago => bucket.paid_value += p.value,
                InstallmentStatus::Pendente => bucket.pending_value += p.value,
                InstallmentStatus::Atrasado => bucket.overdue_value += p.value,
            }
        }

        buckets.push(bucket);

        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }

    buckets
}

/// Taxa de conversão por segmento presente nas indicações.
pub fn conversion_by_segment(indications: &[Indication]) -> Vec<SegmentConversion> {
    let mut by_segment: BTreeMap<Segment, (i64, i64)> = BTreeMap::new();

    for i in indications {
        let entry = by_segment.entry(i.segment).or_default();
        entry.0 += 1;
        if i.status == IndicationStatus::Aprovado {
            entry.1 += 1;
        }
    }

    by_segment
        .into_iter()
        .map(|(segment, (total, approved))| SegmentConversion {
            segment,
            label: segment.label().to_string(),
            total,
            approved,
            rate: percentage(approved, total),
        })
        .collect()
}

/// Contagem de leads por origem.
pub fn leads_by_origin(indications: &[Indication]) -> Vec<OriginCount> {
    let mut by_origin: BTreeMap<Origin, i64> = BTreeMap::new();

    for i in indications {
        *by_origin.entry(i.origin).or_default() += 1;
    }

    by_origin
        .into_iter()
        .map(|(origin, total)| OriginCount {
            origin,
            label: origin.label().to_string(),
            total,
        })
        .collect()
}

/// Ranking de embaixadoras por volume de indicações, decrescente. Empates
/// são desfeitos pelo id ascendente para o resultado ser determinístico.
pub fn rank_ambassadors(indications: &[Indication], limit: usize) -> Vec<(Uuid, i64)> {
    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for i in indications {
        *counts.entry(i.ambassador_id).or_insert(0) += 1;
    }

    let mut ranked: Vec<(Uuid, i64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Próximos pagamentos de uma embaixadora: parcelas pendentes, por ordem de
/// vencimento.
pub fn next_payments(
    installments: &[CommissionInstallment],
    ambassador_id: Uuid,
    limit: usize,
) -> Vec<CommissionInstallment> {
    let mut upcoming: Vec<CommissionInstallment> = installments
        .iter()
        .filter(|p| p.ambassador_id == ambassador_id && p.status == InstallmentStatus::Pendente)
        .cloned()
        .collect();

    upcoming.sort_by_key(|p| (p.due_date, p.installment_number));
    upcoming.truncate(limit);
    upcoming
}

/// Embaixadoras distintas com indicação criada a partir de `since`.
pub fn active_ambassadors(indications: &[Indication], since: DateTime<Utc>) -> i64 {
    indications
        .iter()
        .filter(|i| i.created_at >= since)
        .map(|i| i.ambassador_id)
        .collect::<HashSet<_>>()
        .len() as i64
}

// Percentual com 1 casa decimal; divisor zero devolve 0, nunca NaN.
fn percentage(part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(part) * Decimal::from(100) / Decimal::from(whole)).round_dp(1)
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct DashboardService {
    indication_repo: IndicationRepository,
    commission_repo: CommissionRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(
        indication_repo: IndicationRepository,
        commission_repo: CommissionRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { indication_repo, commission_repo, user_repo, pool }
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, AppError> {
        let now = Utc::now();
        let today = now.date_naive();

        let indications = self.indication_repo.list(&self.pool, None, None).await?;
        let installments = self
            .commission_repo
            .list_installments(&self.pool, None, None, None, None)
            .await?;
        let ambassadors = self
            .user_repo
            .list_by_role(&self.pool, UserRole::Embaixadora)
            .await?;

        let total = indications.len() as i64;
        let approved = indications
            .iter()
            .filter(|i| i.status == IndicationStatus::Aprovado)
            .count() as i64;

        let buckets = monthly_buckets(&installments, today, MONTH_WINDOW);
        let monthly_commission_value = buckets
            .last()
            .map(|b| b.paid_value + b.pending_value + b.overdue_value)
            .unwrap_or(Decimal::ZERO);

        let names: HashMap<Uuid, String> =
            ambassadors.iter().map(|u| (u.id, u.name.clone())).collect();
        let top_ambassadors = rank_ambassadors(&indications, TOP_AMBASSADORS_LIMIT)
            .into_iter()
            .map(|(ambassador_id, count)| TopAmbassadorEntry {
                ambassador_id,
                name: names.get(&ambassador_id).cloned().unwrap_or_default(),
                indications: count,
            })
            .collect();

        let since = now - chrono::Duration::days(ACTIVE_WINDOW_DAYS);

        Ok(AdminDashboard {
            stats: AdminStats {
                total_indications: total,
                approved_indications: approved,
                total_ambassadors: ambassadors.len() as i64,
                active_ambassadors: active_ambassadors(&indications, since),
                conversion_rate: percentage(approved, total),
                monthly_commission_value,
            },
            summary: summary(&installments),
            monthly_commissions: buckets,
            leads_by_origin: leads_by_origin(&indications),
            conversion_by_segment: conversion_by_segment(&indications),
            top_ambassadors,
        })
    }

    pub async fn ambassador_dashboard(
        &self,
        ambassador_id: Uuid,
    ) -> Result<AmbassadorDashboard, AppError> {
        let today = Utc::now().date_naive();

        let indications = self
            .indication_repo
            .list(&self.pool, Some(ambassador_id), None)
            .await?;
        let installments = self
            .commission_repo
            .list_installments(&self.pool, None, Some(ambassador_id), None, None)
            .await?;

        let total = indications.len() as i64;
        let approved = indications
            .iter()
            .filter(|i| i.status == IndicationStatus::Aprovado)
            .count() as i64;

        let buckets = monthly_buckets(&installments, today, MONTH_WINDOW);
        let monthly_commission_value = buckets
            .last()
            .map(|b| b.paid_value + b.pending_value + b.overdue_value)
            .unwrap_or(Decimal::ZERO);

        Ok(AmbassadorDashboard {
            stats: AmbassadorStats {
                total_indications: total,
                approved_indications: approved,
                conversion_rate: percentage(approved, total),
                monthly_commission_value,
            },
            summary: summary(&installments),
            monthly_commissions: buckets,
            next_payments: next_payments(&installments, ambassador_id, NEXT_PAYMENTS_LIMIT),
        })
    }

    pub async fn installment_summary(
        &self,
        ambassador_id: Option<Uuid>,
    ) -> Result<CommissionSummary, AppError> {
        let installments = self
            .commission_repo
            .list_installments(&self.pool, None, ambassador_id, None, None)
            .await?;

        Ok(summary(&installments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(
        ambassador_id: Uuid,
        number: i16,
        cents: i64,
        due: NaiveDate,
        status: InstallmentStatus,
    ) -> CommissionInstallment {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        CommissionInstallment {
            id: Uuid::new_v4(),
            commission_id: Uuid::nil(),
            ambassador_id,
            installment_number: number,
            value: Decimal::new(cents, 2),
            due_date: due,
            status,
            payment_date: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn indication(
        ambassador_id: Uuid,
        segment: Segment,
        origin: Origin,
        status: IndicationStatus,
    ) -> Indication {
        let created = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        Indication {
            id: Uuid::new_v4(),
            ambassador_id,
            client_name: "Cliente".into(),
            client_email: "cliente@email.com".into(),
            client_phone: "(11) 99999-9999".into(),
            origin,
            segment,
            segment_other: None,
            observations: None,
            status,
            approval_date: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn resumo_particiona_por_status_e_fecha_os_totais() {
        let a = Uuid::new_v4();
        let installments = vec![
            installment(a, 1, 30000, date(2025, 2, 15), InstallmentStatus::Pago),
            installment(a, 2, 30000, date(2025, 3, 15), InstallmentStatus::Pendente),
            installment(a, 3, 30000, date(2025, 4, 15), InstallmentStatus::Atrasado),
        ];

        let s = summary(&installments);

        assert_eq!(s.total_installments, 3);
        assert_eq!(s.total_value, Decimal::new(90000, 2));
        assert_eq!(s.paid_installments, 1);
        assert_eq!(s.paid_value, Decimal::new(30000, 2));
        assert_eq!(s.pending_installments, 1);
        assert_eq!(s.overdue_installments, 1);
        assert_eq!(s.paid_value + s.pending_value + s.overdue_value, s.total_value);
    }

    #[test]
    fn resumo_de_lista_vazia_e_todo_zero() {
        let s = summary(&[]);
        assert_eq!(s.total_installments, 0);
        assert_eq!(s.total_value, Decimal::ZERO);
    }

    #[test]
    fn buckets_mensais_incluem_meses_sem_movimento() {
        let a = Uuid::new_v4();
        let installments = vec![
            installment(a, 1, 30000, date(2025, 2, 15), InstallmentStatus::Pago),
            installment(a, 3, 30000, date(2025, 4, 20), InstallmentStatus::Pendente),
        ];

        let buckets = monthly_buckets(&installments, date(2025, 4, 30), 3);

        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].year, buckets[0].month), (2025, 2));
        assert_eq!(buckets[0].paid_value, Decimal::new(30000, 2));

        // Março não tem parcela nenhuma e mesmo assim aparece, zerado.
        assert_eq!((buckets[1].year, buckets[1].month), (2025, 3));
        assert_eq!(buckets[1].paid_value, Decimal::ZERO);
        assert_eq!(buckets[1].pending_value, Decimal::ZERO);

        assert_eq!((buckets[2].year, buckets[2].month), (2025, 4));
        assert_eq!(buckets[2].pending_value, Decimal::new(30000, 2));
    }

    #[test]
    fn buckets_mensais_atravessam_a_virada_do_ano() {
        let buckets = monthly_buckets(&[], date(2025, 1, 31), 3);

        assert_eq!((buckets[0].year, buckets[0].month), (2024, 11));
        assert_eq!(buckets[0].label, "Nov");
        assert_eq!((buckets[1].year, buckets[1].month), (2024, 12));
        assert_eq!((buckets[2].year, buckets[2].month), (2025, 1));
        assert_eq!(buckets[2].label, "Jan");
    }

    #[test]
    fn conversao_por_segmento_calcula_a_taxa() {
        let a = Uuid::new_v4();
        let indications = vec![
            indication(a, Segment::Saude, Origin::Website, IndicationStatus::Aprovado),
            indication(a, Segment::Saude, Origin::Website, IndicationStatus::Aprovado),
            indication(a, Segment::Saude, Origin::Website, IndicationStatus::Recusado),
            indication(a, Segment::Juridico, Origin::Google, IndicationStatus::Agendado),
        ];

        let conversions = conversion_by_segment(&indications);

        let saude = conversions.iter().find(|c| c.segment == Segment::Saude).unwrap();
        assert_eq!(saude.total, 3);
        assert_eq!(saude.approved, 2);
        assert_eq!(saude.rate, Decimal::new(667, 1)); // 66.7

        let juridico = conversions.iter().find(|c| c.segment == Segment::Juridico).unwrap();
        assert_eq!(juridico.total, 1);
        assert_eq!(juridico.approved, 0);
        assert_eq!(juridico.rate, Decimal::ZERO);
    }

    #[test]
    fn percentual_com_divisor_zero_e_zero() {
        assert_eq!(percentage(0, 0), Decimal::ZERO);
        assert_eq!(percentage(5, 0), Decimal::ZERO);
    }

    #[test]
    fn ranking_ordena_por_volume_e_desempata_por_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let busy = Uuid::from_u128(3);

        let indications = vec![
            indication(busy, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
            indication(busy, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
            indication(high, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
            indication(low, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
        ];

        let ranked = rank_ambassadors(&indications, 10);
        assert_eq!(ranked[0], (busy, 2));
        // Empate em 1 indicação: id menor vem primeiro.
        assert_eq!(ranked[1], (low, 1));
        assert_eq!(ranked[2], (high, 1));

        // O limite trunca o ranking.
        let truncated = rank_ambassadors(&indications, 1);
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated[0].0, busy);
    }

    #[test]
    fn proximos_pagamentos_filtram_ordenam_e_truncam() {
        let mine = Uuid::from_u128(10);
        let other = Uuid::from_u128(20);

        let installments = vec![
            installment(mine, 2, 30000, date(2025, 3, 15), InstallmentStatus::Pendente),
            installment(mine, 1, 30000, date(2025, 2, 15), InstallmentStatus::Pendente),
            installment(mine, 3, 30000, date(2025, 4, 15), InstallmentStatus::Pago),
            installment(mine, 1, 30000, date(2025, 1, 10), InstallmentStatus::Atrasado),
            installment(other, 1, 30000, date(2025, 1, 5), InstallmentStatus::Pendente),
        ];

        let upcoming = next_payments(&installments, mine, 5);

        // Só as pendentes da embaixadora, em ordem de vencimento.
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].due_date, date(2025, 2, 15));
        assert_eq!(upcoming[1].due_date, date(2025, 3, 15));

        let only_one = next_payments(&installments, mine, 1);
        assert_eq!(only_one.len(), 1);
        assert_eq!(only_one[0].due_date, date(2025, 2, 15));
    }

    #[test]
    fn embaixadoras_ativas_conta_ids_distintos_na_janela() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        let mut old = indication(a, Segment::Saude, Origin::Website, IndicationStatus::Agendado);
        old.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let indications = vec![
            old,
            indication(a, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
            indication(a, Segment::Juridico, Origin::Google, IndicationStatus::Agendado),
            indication(b, Segment::Saude, Origin::Website, IndicationStatus::Agendado),
        ];

        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(active_ambassadors(&indications, since), 2);
    }
}
