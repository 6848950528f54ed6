use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::student::Student;

/// Aggregate urgency of a student's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Paid,
    Pending,
    Overdue,
}

impl Standing {
    pub fn label(&self) -> &'static str {
        match self {
            Standing::Paid => "paid",
            Standing::Pending => "pending",
            Standing::Overdue => "overdue",
        }
    }
}

/// Resolved payment posture for one student at a given date.
#[derive(Debug, Clone)]
pub struct StudentStanding {
    pub standing: Standing,
    pub due_amount: f64,
    /// Earliest-due overdue invoice, set only when the standing is Overdue.
    pub most_urgent_invoice: Option<Uuid>,
}

pub struct StatusService;

impl StatusService {
    /// Derives `{standing, due_amount, most_urgent_invoice}` from the
    /// student's invoices. Pure; reads the clock only through `as_of`.
    pub fn payment_status(student: &Student, as_of: NaiveDate) -> StudentStanding {
        let open: Vec<&Invoice> = student
            .invoices
            .iter()
            .filter(|invoice| invoice.is_open(as_of))
            .collect();
        if open.is_empty() {
            return StudentStanding {
                standing: Standing::Paid,
                due_amount: 0.0,
                most_urgent_invoice: None,
            };
        }

        let due_amount = open.iter().map(|invoice| invoice.balance).sum();
        let most_urgent_overdue = open
            .iter()
            .filter(|invoice| invoice.status_as_of(as_of) == InvoiceStatus::Overdue)
            .min_by_key(|invoice| (invoice.due_date, invoice.id));

        match most_urgent_overdue {
            Some(invoice) => StudentStanding {
                standing: Standing::Overdue,
                due_amount,
                most_urgent_invoice: Some(invoice.id),
            },
            None => StudentStanding {
                standing: Standing::Pending,
                due_amount,
                most_urgent_invoice: None,
            },
        }
    }

    /// The invoice a reminder should talk about: the earliest-due overdue
    /// invoice if any, otherwise the earliest-due open one. Ties break on
    /// invoice id so repeated passes agree.
    pub fn most_urgent_open_invoice(student: &Student, as_of: NaiveDate) -> Option<&Invoice> {
        let open: Vec<&Invoice> = student
            .invoices
            .iter()
            .filter(|invoice| invoice.is_open(as_of))
            .collect();
        let overdue: Vec<&Invoice> = open
            .iter()
            .copied()
            .filter(|invoice| invoice.status_as_of(as_of) == InvoiceStatus::Overdue)
            .collect();
        let candidates = if overdue.is_empty() { &open } else { &overdue };
        candidates
            .iter()
            .copied()
            .min_by_key(|invoice| (invoice.due_date, invoice.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceItem;
    use crate::ledger::validate::amounts_match;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn sent_invoice(folio: &str, amount: f64, due: NaiveDate) -> Invoice {
        Invoice::new(
            folio,
            due - chrono::Duration::days(15),
            due,
            vec![InvoiceItem::new("Tuition", amount, "400-01")],
        )
        .with_status(InvoiceStatus::Sent)
    }

    #[test]
    fn student_with_no_open_invoices_is_paid() {
        let mut invoice = sent_invoice("INV-001", 3500.0, date(2024, 6, 5));
        invoice.apply_payment(3500.0);
        let student =
            Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15)).with_invoice(invoice);

        let standing = StatusService::payment_status(&student, date(2024, 7, 1));
        assert_eq!(standing.standing, Standing::Paid);
        assert_eq!(standing.due_amount, 0.0);
        assert!(standing.most_urgent_invoice.is_none());
    }

    #[test]
    fn open_but_not_due_invoices_are_pending() {
        let student = Student::new("Luis Vega", "luis@example.com", date(2024, 1, 20))
            .with_invoice(sent_invoice("INV-002", 3500.0, date(2024, 8, 5)));

        let standing = StatusService::payment_status(&student, date(2024, 7, 20));
        assert_eq!(standing.standing, Standing::Pending);
        assert_eq!(standing.due_amount, 3500.0);
        assert!(standing.most_urgent_invoice.is_none());
    }

    #[test]
    fn earliest_due_overdue_invoice_wins() {
        let older = sent_invoice("INV-003", 2000.0, date(2024, 5, 5));
        let newer = sent_invoice("INV-004", 3750.0, date(2024, 6, 5));
        let older_id = older.id;
        let student = Student::new("Sofia Reyes", "sofia@example.com", date(2024, 2, 1))
            .with_invoice(newer)
            .with_invoice(older);

        let standing = StatusService::payment_status(&student, date(2024, 7, 1));
        assert_eq!(standing.standing, Standing::Overdue);
        assert_eq!(standing.due_amount, 5750.0);
        assert_eq!(standing.most_urgent_invoice, Some(older_id));
    }

    #[test]
    fn due_amount_matches_open_balances() {
        let mut partial = sent_invoice("INV-005", 3000.0, date(2024, 6, 5));
        partial.apply_payment(1000.0);
        let student = Student::new("Carlos Mena", "carlos@example.com", date(2024, 3, 5))
            .with_invoice(partial)
            .with_invoice(sent_invoice("INV-006", 500.0, date(2024, 8, 5)));

        let as_of = date(2024, 7, 1);
        let standing = StatusService::payment_status(&student, as_of);
        let expected: f64 = student
            .invoices
            .iter()
            .filter(|invoice| invoice.is_open(as_of))
            .map(|invoice| invoice.balance)
            .sum();
        assert!(amounts_match(standing.due_amount, expected));
        assert!(amounts_match(standing.due_amount, 2500.0));
    }

    #[test]
    fn reminder_target_falls_back_to_open_invoices() {
        let student = Student::new("Elena Paz", "elena@example.com", date(2024, 3, 12))
            .with_invoice(sent_invoice("INV-007", 1200.0, date(2024, 9, 5)))
            .with_invoice(sent_invoice("INV-008", 800.0, date(2024, 8, 5)));

        let urgent = StatusService::most_urgent_open_invoice(&student, date(2024, 7, 15))
            .expect("open invoice");
        assert_eq!(urgent.folio, "INV-008", "earliest due open invoice");
    }
}
