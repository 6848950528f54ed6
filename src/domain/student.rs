use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity};
use crate::domain::invoice::Invoice;
use crate::domain::payment::Payment;

/// Collections risk assessment for a student account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// An enrolled student, owning its invoices and payment history exclusively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub enrollment_date: NaiveDate,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub payment_history: Vec<Payment>,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        enrollment_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            enrollment_date,
            risk_level: RiskLevel::Low,
            invoices: Vec::new(),
            payment_history: Vec::new(),
        }
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoices.push(invoice);
        self
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment_history.push(payment);
        self
    }

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }

    pub fn invoice_mut(&mut self, id: Uuid) -> Option<&mut Invoice> {
        self.invoices.iter_mut().find(|invoice| invoice.id == id)
    }
}

impl Identifiable for Student {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Student {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Student {
    fn display_label(&self) -> String {
        format!("{} ({} risk)", self.name, self.risk_level.label())
    }
}
