// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Indicações ---
        handlers::indications::create_indication,
        handlers::indications::list_indications,
        handlers::indications::update_indication_status,

        // --- Comissões ---
        handlers::commissions::list_installments,
        handlers::commissions::update_installment_status,
        handlers::commissions::check_overdue,
        handlers::commissions::get_summary,
        handlers::commissions::update_commission_status,

        // --- Dashboard ---
        handlers::dashboard::admin_dashboard,
        handlers::dashboard::ambassador_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Indicações ---
            models::indication::IndicationStatus,
            models::indication::Origin,
            models::indication::Segment,
            models::indication::Indication,
            handlers::indications::CreateIndicationPayload,
            handlers::indications::UpdateIndicationStatusPayload,

            // --- Comissões ---
            models::commission::CommissionStatus,
            models::commission::InstallmentStatus,
            models::commission::Commission,
            models::commission::CommissionInstallment,
            handlers::commissions::UpdateInstallmentStatusPayload,
            handlers::commissions::UpdateCommissionStatusPayload,
            handlers::commissions::SweepReport,

            // --- Dashboard ---
            models::dashboard::CommissionSummary,
            models::dashboard::MonthlyBucket,
            models::dashboard::SegmentConversion,
            models::dashboard::OriginCount,
            models::dashboard::TopAmbassadorEntry,
            models::dashboard::AdminStats,
            models::dashboard::AdminDashboard,
            models::dashboard::AmbassadorStats,
            models::dashboard::AmbassadorDashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Indicações", description = "Indicações das Embaixadoras"),
        (name = "Comissões", description = "Comissões e Parcelas"),
        (name = "Dashboard", description = "Indicadores e Gráficos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
