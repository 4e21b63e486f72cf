pub mod auth;
pub mod commission_service;
pub mod dashboard_service;
pub mod indication_service;
