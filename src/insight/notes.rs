use crate::domain::student::Student;

/// One-line characterization of a student's payment behavior, used in
/// reminder prompts and forecast snapshots instead of raw payment data.
///
/// A payment counts as late when it links to an invoice and is dated after
/// that invoice's due date; unlinked lump sums carry no due date to compare
/// against.
pub fn payment_history_notes(student: &Student) -> String {
    if student.payment_history.is_empty() {
        return "No payment history recorded.".to_string();
    }
    let late = late_payment_count(student);
    match late {
        0 => "Generally pays on time.".to_string(),
        1 => "1 late payment on record.".to_string(),
        n => format!("{n} late payments on record."),
    }
}

pub fn late_payment_count(student: &Student) -> usize {
    student
        .payment_history
        .iter()
        .filter(|payment| {
            payment
                .invoice_id
                .and_then(|id| student.invoice(id))
                .map(|invoice| payment.date > invoice.due_date)
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::{Invoice, InvoiceItem, InvoiceStatus};
    use crate::domain::payment::Payment;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn student_with_history(payment_dates: Vec<NaiveDate>) -> Student {
        let mut invoice = Invoice::new(
            "INV-001",
            date(2024, 6, 1),
            date(2024, 6, 5),
            vec![InvoiceItem::new("Tuition", 3500.0, "400-01")],
        )
        .with_status(InvoiceStatus::Sent);
        invoice.apply_payment(3500.0);
        let invoice_id = invoice.id;

        let mut student =
            Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15)).with_invoice(invoice);
        for paid_on in payment_dates {
            student = student
                .with_payment(Payment::new(100.0, paid_on, "Tuition").with_invoice(invoice_id));
        }
        student
    }

    #[test]
    fn empty_history_is_called_out() {
        let student = Student::new("Luis Vega", "luis@example.com", date(2024, 1, 20));
        assert_eq!(payment_history_notes(&student), "No payment history recorded.");
    }

    #[test]
    fn on_time_payments_read_positively() {
        let student = student_with_history(vec![date(2024, 6, 3)]);
        assert_eq!(payment_history_notes(&student), "Generally pays on time.");
    }

    #[test]
    fn late_payments_are_counted() {
        let one_late = student_with_history(vec![date(2024, 6, 8)]);
        assert_eq!(payment_history_notes(&one_late), "1 late payment on record.");

        let two_late = student_with_history(vec![date(2024, 6, 8), date(2024, 6, 9)]);
        assert_eq!(
            payment_history_notes(&two_late),
            "2 late payments on record."
        );
    }

    #[test]
    fn unlinked_payments_are_never_late() {
        let mut student = student_with_history(vec![]);
        student = student.with_payment(Payment::new(500.0, date(2024, 6, 9), "Account payment"));
        assert_eq!(late_payment_count(&student), 0);
        assert_eq!(payment_history_notes(&student), "Generally pays on time.");
    }
}
