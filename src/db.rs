pub mod commission_repo;
pub mod indication_repo;
pub mod user_repo;

pub use commission_repo::CommissionRepository;
pub use indication_repo::IndicationRepository;
pub use user_repo::UserRepository;
