pub mod account;
pub mod common;
pub mod invoice;
pub mod payment;
pub mod student;

pub use account::{Account, AccountKind};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use invoice::{DeferredRevenueSchedule, Invoice, InvoiceItem, InvoiceStatus};
pub use payment::{Payment, PaymentMethod};
pub use student::{RiskLevel, Student};
