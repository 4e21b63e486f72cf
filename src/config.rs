// src/config.rs

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CommissionRepository, IndicationRepository, UserRepository},
    services::{
        auth::AuthService, commission_service::CommissionService,
        dashboard_service::DashboardService, indication_service::IndicationService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub indication_service: IndicationService,
    pub commission_service: CommissionService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Valor total da comissão por indicação aprovada, em reais.
        // Padrão: R$ 900,00, pago em 3 parcelas de R$ 300,00.
        let commission_total = match env::var("COMMISSION_TOTAL") {
            Ok(raw) => raw
                .parse::<Decimal>()
                .map_err(|e| anyhow::anyhow!("COMMISSION_TOTAL inválido: {}", e))?,
            Err(_) => Decimal::new(90000, 2),
        };

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let indication_repo = IndicationRepository::new(db_pool.clone());
        let commission_repo = CommissionRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let commission_service =
            CommissionService::new(commission_repo.clone(), db_pool.clone(), commission_total);
        let indication_service = IndicationService::new(
            indication_repo.clone(),
            commission_service.clone(),
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(
            indication_repo,
            commission_repo,
            user_repo,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            indication_service,
            commission_service,
            dashboard_service,
        })
    }
}
