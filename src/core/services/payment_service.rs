use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::domain::invoice::InvoiceStatus;
use crate::domain::payment::{Payment, PaymentMethod};
use crate::errors::LedgerError;
use crate::ledger::validate::amounts_match;
use crate::ledger::Ledger;

use super::{ServiceError, ServiceResult};

/// How much of a registered payment landed on one invoice.
#[derive(Debug, Clone)]
pub struct PaymentApplication {
    pub invoice_id: Uuid,
    pub folio: String,
    pub amount: f64,
}

/// Outcome of a payment registration. The mutated student is observable
/// through the ledger; the receipt records where the money went.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub payment_id: Uuid,
    pub student_id: Uuid,
    pub amount: f64,
    pub applied: Vec<PaymentApplication>,
    /// Portion exceeding every open balance; stays on the payment record.
    pub unallocated: f64,
}

pub struct PaymentService;

impl PaymentService {
    /// Registers a payment against a student, allocating oldest due date
    /// first across open invoices (ties break on invoice id) and appending
    /// one record to the student's payment history.
    pub fn register(
        ledger: &mut Ledger,
        student_id: Uuid,
        amount: f64,
        method: PaymentMethod,
        date: NaiveDate,
    ) -> ServiceResult<PaymentReceipt> {
        if amount <= 0.0 {
            return Err(ServiceError::Invalid(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        ledger.validate()?;

        let student = ledger
            .student_mut(student_id)
            .ok_or_else(|| LedgerError::UnknownStudent(student_id.to_string()))?;

        let mut order: Vec<(NaiveDate, Uuid)> = student
            .invoices
            .iter()
            .filter(|invoice| invoice.balance > 0.0 && invoice.status != InvoiceStatus::Cancelled)
            .map(|invoice| (invoice.due_date, invoice.id))
            .collect();
        order.sort();

        let mut remaining = amount;
        let mut applied = Vec::new();
        for (_, invoice_id) in order {
            if remaining <= 0.0 {
                break;
            }
            if let Some(invoice) = student.invoice_mut(invoice_id) {
                let portion = invoice.apply_payment(remaining);
                if portion > 0.0 {
                    remaining -= portion;
                    applied.push(PaymentApplication {
                        invoice_id,
                        folio: invoice.folio.clone(),
                        amount: portion,
                    });
                }
            }
        }

        let mut payment = Payment::new(
            amount,
            date,
            format!("Account payment ({})", method.label()),
        );
        if applied.len() == 1 && amounts_match(applied[0].amount, amount) {
            payment = payment.with_invoice(applied[0].invoice_id);
        }
        let payment_id = payment.id;
        student.payment_history.push(payment);
        ledger.touch();

        info!(
            student = %student_id,
            amount,
            method = method.label(),
            invoices_touched = applied.len(),
            unallocated = remaining,
            "payment registered"
        );
        Ok(PaymentReceipt {
            payment_id,
            student_id,
            amount,
            applied,
            unallocated: remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountKind};
    use crate::domain::invoice::{Invoice, InvoiceItem};
    use crate::domain::student::Student;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn invoice_due(folio: &str, amount: f64, due: NaiveDate) -> Invoice {
        Invoice::new(
            folio,
            due - Duration::days(15),
            due,
            vec![InvoiceItem::new("Tuition", amount, "400-01")],
        )
        .with_status(InvoiceStatus::Sent)
    }

    fn ledger_with_student(student: Student) -> (Ledger, Uuid) {
        let mut ledger = Ledger::new("Payments");
        ledger.add_account(Account::new("400-01", "Tuition", AccountKind::Income));
        let id = ledger.add_student(student);
        (ledger, id)
    }

    #[test]
    fn lump_sum_settles_oldest_invoice_first() {
        let student = Student::new("Carlos Mena", "carlos@example.com", date(2024, 2, 10))
            .with_invoice(invoice_due("INV-NEW", 3750.0, date(2024, 7, 5)))
            .with_invoice(invoice_due("INV-OLD", 2000.0, date(2024, 5, 5)));
        let (mut ledger, student_id) = ledger_with_student(student);

        let receipt = PaymentService::register(
            &mut ledger,
            student_id,
            3750.0,
            PaymentMethod::Transfer,
            date(2024, 7, 10),
        )
        .expect("registration succeeds");

        assert_eq!(receipt.applied.len(), 2);
        assert_eq!(receipt.applied[0].folio, "INV-OLD");
        assert_eq!(receipt.applied[0].amount, 2000.0);
        assert_eq!(receipt.applied[1].folio, "INV-NEW");
        assert_eq!(receipt.applied[1].amount, 1750.0);
        assert_eq!(receipt.unallocated, 0.0);

        let student = ledger.student(student_id).expect("student exists");
        let oldest = student
            .invoices
            .iter()
            .find(|invoice| invoice.folio == "INV-OLD")
            .expect("oldest invoice");
        assert_eq!(oldest.balance, 0.0);
        assert_eq!(oldest.status, InvoiceStatus::Paid);
        let newest = student
            .invoices
            .iter()
            .find(|invoice| invoice.folio == "INV-NEW")
            .expect("newest invoice");
        assert_eq!(newest.balance, 2000.0);
        assert_eq!(newest.status, InvoiceStatus::Sent);

        for invoice in &student.invoices {
            assert!(
                amounts_match(invoice.balance, invoice.total_amount - invoice.paid_amount),
                "balance identity broken for {}",
                invoice.folio
            );
            assert!(invoice.balance >= 0.0);
        }
    }

    #[test]
    fn payment_record_is_appended_once() {
        let student = Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15))
            .with_invoice(invoice_due("INV-001", 2000.0, date(2024, 6, 5)));
        let (mut ledger, student_id) = ledger_with_student(student);

        let receipt = PaymentService::register(
            &mut ledger,
            student_id,
            2000.0,
            PaymentMethod::Cash,
            date(2024, 6, 3),
        )
        .expect("registration succeeds");

        let history = &ledger.student(student_id).expect("student").payment_history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, receipt.payment_id);
        assert_eq!(history[0].amount, 2000.0);
        assert_eq!(
            history[0].invoice_id,
            Some(receipt.applied[0].invoice_id),
            "a payment consumed by one invoice links to it"
        );
    }

    #[test]
    fn overpayment_keeps_the_remainder_unallocated() {
        let student = Student::new("Luis Vega", "luis@example.com", date(2024, 1, 20))
            .with_invoice(invoice_due("INV-002", 1000.0, date(2024, 6, 5)));
        let (mut ledger, student_id) = ledger_with_student(student);

        let receipt = PaymentService::register(
            &mut ledger,
            student_id,
            1500.0,
            PaymentMethod::Card,
            date(2024, 6, 3),
        )
        .expect("registration succeeds");

        assert_eq!(receipt.unallocated, 500.0);
        let history = &ledger.student(student_id).expect("student").payment_history;
        assert_eq!(history[0].amount, 1500.0, "full amount stays on record");
        assert!(history[0].invoice_id.is_none(), "partially applied lump sum");
    }

    #[test]
    fn cancelled_invoices_take_no_allocation() {
        let cancelled = invoice_due("INV-003", 5000.0, date(2024, 5, 5))
            .with_status(InvoiceStatus::Cancelled);
        let student = Student::new("Sofia Reyes", "sofia@example.com", date(2024, 2, 1))
            .with_invoice(cancelled)
            .with_invoice(invoice_due("INV-004", 800.0, date(2024, 6, 5)));
        let (mut ledger, student_id) = ledger_with_student(student);

        let receipt = PaymentService::register(
            &mut ledger,
            student_id,
            800.0,
            PaymentMethod::Transfer,
            date(2024, 6, 1),
        )
        .expect("registration succeeds");

        assert_eq!(receipt.applied.len(), 1);
        assert_eq!(receipt.applied[0].folio, "INV-004");
        let student = ledger.student(student_id).expect("student");
        let cancelled = student
            .invoices
            .iter()
            .find(|invoice| invoice.folio == "INV-003")
            .expect("cancelled invoice");
        assert_eq!(cancelled.balance, 5000.0, "cancelled balances never move");
    }

    #[test]
    fn rejects_unknown_student_and_bad_amounts() {
        let student = Student::new("Elena Paz", "elena@example.com", date(2024, 3, 12));
        let (mut ledger, _) = ledger_with_student(student);

        let missing = Uuid::new_v4();
        let err = PaymentService::register(
            &mut ledger,
            missing,
            100.0,
            PaymentMethod::Cash,
            date(2024, 6, 1),
        )
        .expect_err("unknown student");
        assert!(format!("{err}").contains("unknown student"));

        let existing = ledger.students[0].id;
        let err = PaymentService::register(
            &mut ledger,
            existing,
            0.0,
            PaymentMethod::Cash,
            date(2024, 6, 1),
        )
        .expect_err("zero amount");
        assert!(format!("{err}").contains("positive"));
    }
}
