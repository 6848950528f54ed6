use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// How a payment was received.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
        }
    }
}

/// Append-only record of money received from a student.
///
/// Once recorded a payment is never mutated or deleted. `invoice_id` links
/// the payment to the invoice it settled; lump sums allocated across several
/// invoices leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
}

impl Payment {
    pub fn new(amount: f64, date: NaiveDate, concept: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            concept: concept.into(),
            invoice_id: None,
        }
    }

    pub fn with_invoice(mut self, invoice_id: Uuid) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }
}

impl Identifiable for Payment {
    fn id(&self) -> Uuid {
        self.id
    }
}
