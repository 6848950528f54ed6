use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::invoice::InvoiceStatus;
use crate::domain::student::RiskLevel;
use crate::ledger::Ledger;

use super::status_service::{Standing, StatusService};
use super::ServiceResult;

/// Headline collection figures for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub as_of: NaiveDate,
    pub total_collected: f64,
    pub total_billed: f64,
    pub total_due: f64,
    /// Collected share of billed, in percent. Zero when nothing is billed.
    pub collection_rate: f64,
    pub overdue_students: usize,
    pub high_risk_students: usize,
}

/// One entry of the "critical accounts" list: an overdue student and the
/// invoice driving the urgency.
#[derive(Debug, Clone)]
pub struct CriticalAccount {
    pub student_id: Uuid,
    pub student_name: String,
    pub due_amount: f64,
    pub most_urgent_due: NaiveDate,
}

pub struct DashboardService;

impl DashboardService {
    pub fn metrics(ledger: &Ledger, as_of: NaiveDate) -> ServiceResult<DashboardMetrics> {
        ledger.validate()?;

        let mut total_collected = 0.0;
        let mut total_billed = 0.0;
        let mut overdue_students = 0;
        let mut high_risk_students = 0;
        for student in &ledger.students {
            for invoice in &student.invoices {
                if invoice.status_as_of(as_of) == InvoiceStatus::Cancelled {
                    continue;
                }
                total_collected += invoice.paid_amount;
                total_billed += invoice.total_amount;
            }
            if StatusService::payment_status(student, as_of).standing == Standing::Overdue {
                overdue_students += 1;
            }
            if student.risk_level == RiskLevel::High {
                high_risk_students += 1;
            }
        }

        let collection_rate = if total_billed > 0.0 {
            total_collected / total_billed * 100.0
        } else {
            0.0
        };
        Ok(DashboardMetrics {
            as_of,
            total_collected,
            total_billed,
            total_due: total_billed - total_collected,
            collection_rate,
            overdue_students,
            high_risk_students,
        })
    }

    /// Overdue students ranked most recently due first, capped at `limit`.
    pub fn critical_accounts(
        ledger: &Ledger,
        as_of: NaiveDate,
        limit: usize,
    ) -> ServiceResult<Vec<CriticalAccount>> {
        ledger.validate()?;

        let mut entries: Vec<CriticalAccount> = ledger
            .students
            .iter()
            .filter_map(|student| {
                let standing = StatusService::payment_status(student, as_of);
                let urgent_id = standing.most_urgent_invoice?;
                let urgent = student.invoice(urgent_id)?;
                Some(CriticalAccount {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    due_amount: standing.due_amount,
                    most_urgent_due: urgent.due_date,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.most_urgent_due
                .cmp(&a.most_urgent_due)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountKind};
    use crate::domain::invoice::{Invoice, InvoiceItem};
    use crate::domain::student::Student;
    use crate::ledger::validate::amounts_match;
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

    fn base_ledger() -> Ledger {
        let mut ledger = Ledger::new("Dashboard");
        ledger.add_account(Account::new("400-01", "Tuition", AccountKind::Income));
        ledger
    }

    #[test]
    fn metrics_aggregate_collected_and_billed() {
        let as_of = date(2024, 7, 10);
        let mut ledger = base_ledger();
        let mut paid = invoice_due("INV-001", 3500.0, date(2024, 6, 5));
        paid.apply_payment(3500.0);
        let cancelled = invoice_due("INV-002", 9000.0, date(2024, 6, 5))
            .with_status(InvoiceStatus::Cancelled);
        ledger.add_student(
            Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15))
                .with_risk_level(RiskLevel::High)
                .with_invoice(paid)
                .with_invoice(cancelled)
                .with_invoice(invoice_due("INV-003", 3500.0, date(2024, 6, 5))),
        );
        ledger.add_student(
            Student::new("Luis Vega", "luis@example.com", date(2024, 1, 20))
                .with_invoice(invoice_due("INV-004", 1200.0, date(2024, 8, 5))),
        );

        let metrics = DashboardService::metrics(&ledger, as_of).expect("metrics");
        assert!(amounts_match(metrics.total_collected, 3500.0));
        assert!(amounts_match(metrics.total_billed, 8200.0), "cancelled excluded");
        assert!(amounts_match(metrics.total_due, 4700.0));
        assert!(amounts_match(metrics.collection_rate, 3500.0 / 8200.0 * 100.0));
        assert_eq!(metrics.overdue_students, 1);
        assert_eq!(metrics.high_risk_students, 1);
    }

    #[test]
    fn metrics_stay_finite_on_an_empty_ledger() {
        let ledger = base_ledger();
        let metrics = DashboardService::metrics(&ledger, date(2024, 7, 10)).expect("metrics");
        assert_eq!(metrics.total_billed, 0.0);
        assert_eq!(metrics.collection_rate, 0.0);
        assert_eq!(metrics.overdue_students, 0);
    }

    #[test]
    fn critical_accounts_rank_most_recent_debt_first() {
        let as_of = date(2024, 7, 10);
        let mut ledger = base_ledger();
        ledger.add_student(
            Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15))
                .with_invoice(invoice_due("INV-005", 2000.0, date(2024, 5, 5))),
        );
        ledger.add_student(
            Student::new("Luis Vega", "luis@example.com", date(2024, 1, 20))
                .with_invoice(invoice_due("INV-006", 3750.0, date(2024, 6, 5))),
        );
        ledger.add_student(
            Student::new("Elena Paz", "elena@example.com", date(2024, 3, 12))
                .with_invoice(invoice_due("INV-007", 800.0, date(2024, 8, 5))),
        );

        let critical =
            DashboardService::critical_accounts(&ledger, as_of, 5).expect("critical accounts");
        assert_eq!(critical.len(), 2, "pending students are not critical");
        assert_eq!(critical[0].student_name, "Luis Vega");
        assert_eq!(critical[1].student_name, "Ana Torres");
        assert!(amounts_match(critical[0].due_amount, 3750.0));

        let capped =
            DashboardService::critical_accounts(&ledger, as_of, 1).expect("critical accounts");
        assert_eq!(capped.len(), 1);
    }
}
