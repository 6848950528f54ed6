use tracing::warn;

use crate::domain::invoice::Invoice;
use crate::domain::student::Student;
use crate::errors::LedgerError;

use super::ledger::Ledger;

/// Tolerance for money comparisons; amounts are f64 and accumulate rounding.
pub const AMOUNT_TOLERANCE: f64 = 1e-6;

pub fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE
}

/// Checks every invariant a report relies on. Any failure aborts the
/// computation that requested it; nothing is coerced or repaired.
pub fn validate_ledger(ledger: &Ledger) -> Result<(), LedgerError> {
    let result = ledger
        .students
        .iter()
        .try_for_each(|student| validate_student(ledger, student));
    if let Err(error) = &result {
        warn!(%error, ledger = %ledger.name, "ledger snapshot failed validation");
    }
    result
}

fn validate_student(ledger: &Ledger, student: &Student) -> Result<(), LedgerError> {
    for invoice in &student.invoices {
        validate_invoice(ledger, invoice)?;
    }
    for payment in &student.payment_history {
        if payment.amount < 0.0 {
            return Err(LedgerError::validation(
                payment.id.to_string(),
                format!("payment amount {} is negative", payment.amount),
            ));
        }
    }
    Ok(())
}

fn validate_invoice(ledger: &Ledger, invoice: &Invoice) -> Result<(), LedgerError> {
    for item in &invoice.items {
        if item.amount < 0.0 {
            return Err(LedgerError::validation(
                &invoice.folio,
                format!("item `{}` has negative amount {}", item.description, item.amount),
            ));
        }
        if ledger.account(&item.account_id).is_none() {
            return Err(LedgerError::validation(
                &invoice.folio,
                format!("item `{}` references unknown account {}", item.description, item.account_id),
            ));
        }
    }

    let item_total: f64 = invoice.items.iter().map(|item| item.amount).sum();
    if !amounts_match(item_total, invoice.total_amount) {
        return Err(LedgerError::validation(
            &invoice.folio,
            format!(
                "total_amount {} does not match item sum {}",
                invoice.total_amount, item_total
            ),
        ));
    }
    if invoice.paid_amount < 0.0 {
        return Err(LedgerError::validation(
            &invoice.folio,
            format!("paid_amount {} is negative", invoice.paid_amount),
        ));
    }
    if invoice.balance < 0.0 && !amounts_match(invoice.balance, 0.0) {
        return Err(LedgerError::validation(
            &invoice.folio,
            format!("balance {} is negative", invoice.balance),
        ));
    }
    if !amounts_match(invoice.total_amount - invoice.paid_amount, invoice.balance) {
        return Err(LedgerError::validation(
            &invoice.folio,
            format!(
                "balance {} is not total_amount {} minus paid_amount {}",
                invoice.balance, invoice.total_amount, invoice.paid_amount
            ),
        ));
    }

    if let Some(schedule) = &invoice.deferred_revenue_schedule {
        if schedule.recognition_months == 0 {
            return Err(LedgerError::validation(
                &invoice.folio,
                "deferred revenue schedule must span at least one month",
            ));
        }
        if schedule.start_date > schedule.end_date {
            return Err(LedgerError::validation(
                &invoice.folio,
                format!(
                    "schedule start {} is after end {}",
                    schedule.start_date, schedule.end_date
                ),
            ));
        }
    }
    Ok(())
}
