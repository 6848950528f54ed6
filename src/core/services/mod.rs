pub mod aging_service;
pub mod analytics_service;
pub mod dashboard_service;
pub mod payment_service;
pub mod recognition_service;
pub mod status_service;

pub use aging_service::AgingService;
pub use analytics_service::AnalyticsService;
pub use dashboard_service::DashboardService;
pub use payment_service::PaymentService;
pub use recognition_service::RecognitionService;
pub use status_service::StatusService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
