//! Cash flow forecast request/response contract.
//!
//! The engine ships an accounts receivable snapshot to the collaborator and
//! gets back a monthly projection. Field names are camelCase on the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::invoice::InvoiceStatus;
use crate::errors::LedgerError;
use crate::insight::notes::payment_history_notes;
use crate::ledger::Ledger;

use super::{GenerationError, TextGenerator};

/// One open invoice inside a student snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvoice {
    pub due_date: NaiveDate,
    pub balance: f64,
}

/// Receivables view of one student, as shipped to the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
    pub id: Uuid,
    pub risk_level: String,
    pub payment_history_notes: String,
    pub pending_invoices: Vec<PendingInvoice>,
}

/// Snapshot of the whole ledger's receivables at a reporting date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub as_of: NaiveDate,
    pub student_count: usize,
    pub total_outstanding: f64,
    pub students: Vec<StudentSnapshot>,
}

impl ForecastRequest {
    /// Builds the snapshot from a validated ledger.
    ///
    /// Pending means effectively `Sent` or `Overdue` at `as_of`; paid,
    /// cancelled and draft invoices never reach the collaborator.
    pub fn from_ledger(ledger: &Ledger, as_of: NaiveDate) -> Result<Self, LedgerError> {
        ledger.validate()?;

        let mut total_outstanding = 0.0;
        let students = ledger
            .students
            .iter()
            .map(|student| {
                let pending_invoices: Vec<PendingInvoice> = student
                    .invoices
                    .iter()
                    .filter(|invoice| {
                        matches!(
                            invoice.status_as_of(as_of),
                            InvoiceStatus::Sent | InvoiceStatus::Overdue
                        )
                    })
                    .map(|invoice| PendingInvoice {
                        due_date: invoice.due_date,
                        balance: invoice.balance,
                    })
                    .collect();
                total_outstanding += pending_invoices.iter().map(|p| p.balance).sum::<f64>();
                StudentSnapshot {
                    id: student.id,
                    risk_level: student.risk_level.label().to_string(),
                    payment_history_notes: payment_history_notes(student),
                    pending_invoices,
                }
            })
            .collect();

        Ok(Self {
            as_of,
            student_count: ledger.students.len(),
            total_outstanding,
            students,
        })
    }

    /// Instruction text plus the snapshot serialized as JSON.
    pub fn prompt(&self) -> Result<String, GenerationError> {
        let snapshot = serde_json::to_string_pretty(self)?;
        Ok(format!(
            "You are a financial analyst for a private school.\n\
             Below is a snapshot of the school's accounts receivable as of {}.\n\
             Project the expected cash income for the next three calendar \
             months, taking each student's risk level and payment history \
             into account. Do not assume the full balance will be collected; \
             apply a payment probability based on risk and history.\n\
             Respond only with JSON matching the provided schema; months use \
             the YYYY-MM format.\n\n\
             Accounts receivable snapshot:\n{}",
            self.as_of, snapshot
        ))
    }

    /// Schema the collaborator's structured output must satisfy.
    pub fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "forecast": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "month": {
                                "type": "string",
                                "description": "Calendar month in YYYY-MM format"
                            },
                            "predictedIncome": { "type": "number" },
                            "notes": { "type": "string" }
                        },
                        "required": ["month", "predictedIncome", "notes"]
                    }
                },
                "summary": { "type": "string" }
            },
            "required": ["forecast", "summary"]
        })
    }
}

/// One projected month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub month: String,
    pub predicted_income: f64,
    pub notes: String,
}

/// Validated collaborator response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowForecast {
    pub forecast: Vec<ForecastEntry>,
    pub summary: String,
}

impl CashFlowForecast {
    /// Parses and checks a structured response.
    ///
    /// Anything the projection code downstream could choke on is rejected
    /// here: missing fields, an empty projection, blank months, incomes
    /// that are negative or not finite, a blank summary.
    pub fn from_response(value: serde_json::Value) -> Result<Self, GenerationError> {
        let parsed: Self = serde_json::from_value(value)
            .map_err(|cause| GenerationError::InvalidResponse(cause.to_string()))?;
        parsed.check()?;
        Ok(parsed)
    }

    fn check(&self) -> Result<(), GenerationError> {
        if self.forecast.is_empty() {
            return Err(GenerationError::InvalidResponse(
                "forecast carries no entries".to_string(),
            ));
        }
        for entry in &self.forecast {
            if entry.month.trim().is_empty() {
                return Err(GenerationError::InvalidResponse(
                    "forecast entry is missing its month".to_string(),
                ));
            }
            if !entry.predicted_income.is_finite() || entry.predicted_income < 0.0 {
                return Err(GenerationError::InvalidResponse(format!(
                    "predicted income for {} is not a non-negative number",
                    entry.month
                )));
            }
        }
        if self.summary.trim().is_empty() {
            return Err(GenerationError::InvalidResponse(
                "summary is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds the prompt, runs the collaborator and validates its answer.
pub async fn generate_cash_flow_forecast(
    request: &ForecastRequest,
    generator: &dyn TextGenerator,
) -> Result<CashFlowForecast, GenerationError> {
    debug!(
        students = request.student_count,
        outstanding = request.total_outstanding,
        generator = generator.name(),
        "requesting cash flow forecast"
    );
    let response = generator
        .generate_structured(&request.prompt()?, &ForecastRequest::response_schema())
        .await?;
    CashFlowForecast::from_response(response)
}
