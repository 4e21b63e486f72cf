// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::commission::CommissionInstallment;
use crate::models::indication::{Origin, Segment};

// 1. Resumo das parcelas (os cards do topo)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub total_installments: i64,
    pub total_value: Decimal,
    pub paid_installments: i64,
    pub paid_value: Decimal,
    pub pending_installments: i64,
    pub pending_value: Decimal,
    pub overdue_installments: i64,
    pub overdue_value: Decimal,
}

// 2. Um mês do gráfico de comissões. Meses sem movimento aparecem zerados
// para o eixo do gráfico ser contínuo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,

    #[schema(example = "Fev")]
    pub label: String,

    pub paid_value: Decimal,
    pub pending_value: Decimal,
    pub overdue_value: Decimal,
}

// 3. Conversão por segmento (indicações aprovadas / total)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConversion {
    pub segment: Segment,

    #[schema(example = "Saúde")]
    pub label: String,

    pub total: i64,
    pub approved: i64,

    // Percentual com 1 casa decimal; 0 quando não há indicações.
    #[schema(example = "66.7")]
    pub rate: Decimal,
}

// 4. Leads por origem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginCount {
    pub origin: Origin,

    #[schema(example = "Instagram")]
    pub label: String,

    pub total: i64,
}

// 5. Ranking de embaixadoras por volume de indicações
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopAmbassadorEntry {
    pub ambassador_id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub name: String,

    pub indications: i64,
}

// --- Dashboards por papel ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_indications: i64,
    pub approved_indications: i64,
    pub total_ambassadors: i64,

    // Embaixadoras com indicação nos últimos 60 dias.
    pub active_ambassadors: i64,

    #[schema(example = "41.7")]
    pub conversion_rate: Decimal,

    // Valor total das parcelas com vencimento no mês corrente.
    pub monthly_commission_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub summary: CommissionSummary,
    pub monthly_commissions: Vec<MonthlyBucket>,
    pub leads_by_origin: Vec<OriginCount>,
    pub conversion_by_segment: Vec<SegmentConversion>,
    pub top_ambassadors: Vec<TopAmbassadorEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorStats {
    pub total_indications: i64,
    pub approved_indications: i64,

    #[schema(example = "50.0")]
    pub conversion_rate: Decimal,

    pub monthly_commission_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorDashboard {
    pub stats: AmbassadorStats,
    pub summary: CommissionSummary,
    pub monthly_commissions: Vec<MonthlyBucket>,
    pub next_payments: Vec<CommissionInstallment>,
}
