use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};

/// Lifecycle states of an invoice.
///
/// `Overdue` is never written back to an invoice: it is derived at read time
/// from `(balance, due_date, as_of)` via [`Invoice::status_as_of`]. Stored
/// values only move Draft -> Sent -> {Paid, Cancelled}.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// Spreads an invoice's revenue over future periods instead of recognizing
/// it at sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeferredRevenueSchedule {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub recognition_months: u32,
}

impl DeferredRevenueSchedule {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, recognition_months: u32) -> Self {
        Self {
            start_date,
            end_date,
            recognition_months,
        }
    }

    /// Amount recognized in each month of the schedule.
    pub fn monthly_amount(&self, total_amount: f64) -> f64 {
        if self.recognition_months == 0 {
            return 0.0;
        }
        total_amount / self.recognition_months as f64
    }
}

/// A billed line item, allocated to one account of the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub account_id: String,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, amount: f64, account_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            account_id: account_id.into(),
        }
    }
}

/// A tuition invoice owned by exactly one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub folio: String,
    pub items: Vec<InvoiceItem>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred_revenue_schedule: Option<DeferredRevenueSchedule>,
}

impl Invoice {
    /// Creates a draft invoice; the total is derived from its items.
    pub fn new(
        folio: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        items: Vec<InvoiceItem>,
    ) -> Self {
        let total_amount: f64 = items.iter().map(|item| item.amount).sum();
        Self {
            id: Uuid::new_v4(),
            folio: folio.into(),
            items,
            issue_date,
            due_date,
            status: InvoiceStatus::Draft,
            total_amount,
            paid_amount: 0.0,
            balance: total_amount,
            deferred_revenue_schedule: None,
        }
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, schedule: DeferredRevenueSchedule) -> Self {
        self.deferred_revenue_schedule = Some(schedule);
        self
    }

    /// Effective status at a given date.
    ///
    /// Sent invoices with an outstanding balance past their due date read as
    /// Overdue; a stored Overdue (legacy snapshots) is re-derived the same
    /// way so stale values cannot leak into reports.
    pub fn status_as_of(&self, as_of: NaiveDate) -> InvoiceStatus {
        match self.status {
            InvoiceStatus::Draft | InvoiceStatus::Paid | InvoiceStatus::Cancelled => self.status,
            InvoiceStatus::Sent | InvoiceStatus::Overdue => {
                if self.balance > 0.0 && self.due_date < as_of {
                    InvoiceStatus::Overdue
                } else {
                    InvoiceStatus::Sent
                }
            }
        }
    }

    /// True when the invoice still counts toward the student's due amount.
    pub fn is_open(&self, as_of: NaiveDate) -> bool {
        !matches!(
            self.status_as_of(as_of),
            InvoiceStatus::Paid | InvoiceStatus::Cancelled
        )
    }

    /// Whole days past due; zero or negative means not yet due.
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days()
    }

    /// Applies as much of `amount` as the open balance allows and returns the
    /// applied portion. Fully covered invoices flip to Paid with an exact
    /// zero balance.
    pub fn apply_payment(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.balance <= 0.0 {
            return 0.0;
        }
        let applied = amount.min(self.balance);
        self.paid_amount += applied;
        self.balance -= applied;
        if self.balance <= f64::EPSILON {
            self.balance = 0.0;
            self.paid_amount = self.total_amount;
            self.status = InvoiceStatus::Paid;
        }
        applied
    }
}

impl Identifiable for Invoice {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Invoice {
    fn display_label(&self) -> String {
        format!("{} (${:.2})", self.folio, self.total_amount)
    }
}
