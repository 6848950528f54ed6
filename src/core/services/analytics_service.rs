use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::domain::invoice::InvoiceStatus;
use crate::domain::student::Student;
use crate::ledger::{Ledger, Month};

use super::ServiceResult;

const DSO_WINDOW_DAYS: i64 = 30;

/// Days-sales-outstanding snapshot.
#[derive(Debug, Clone)]
pub struct DsoReport {
    pub as_of: NaiveDate,
    pub total_outstanding: f64,
    pub invoiced_last_30_days: f64,
    /// Average days to collect. Zero when nothing was invoiced in the window.
    pub days: f64,
}

/// Cumulative average revenue per student for one enrollment cohort.
#[derive(Debug, Clone)]
pub struct CohortRow {
    pub cohort: Month,
    pub size: usize,
    /// One entry per offset month, non-decreasing.
    pub cumulative_revenue_per_student: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct CohortTable {
    pub max_months: usize,
    pub rows: Vec<CohortRow>,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// `(outstanding / invoiced in the trailing 30 days) * 30`, with the
    /// zero-invoiced window collapsing to 0 instead of dividing.
    pub fn days_sales_outstanding(ledger: &Ledger, as_of: NaiveDate) -> ServiceResult<DsoReport> {
        ledger.validate()?;

        let window_start = as_of - Duration::days(DSO_WINDOW_DAYS);
        let mut total_outstanding = 0.0;
        let mut invoiced_last_30_days = 0.0;
        for invoice in ledger.invoices() {
            if invoice.status_as_of(as_of) == InvoiceStatus::Cancelled {
                continue;
            }
            if invoice.balance > 0.0 {
                total_outstanding += invoice.balance;
            }
            if invoice.issue_date >= window_start && invoice.issue_date <= as_of {
                invoiced_last_30_days += invoice.total_amount;
            }
        }

        let days = if invoiced_last_30_days > 0.0 {
            total_outstanding / invoiced_last_30_days * DSO_WINDOW_DAYS as f64
        } else {
            0.0
        };
        Ok(DsoReport {
            as_of,
            total_outstanding,
            invoiced_last_30_days,
            days,
        })
    }

    /// Groups students by enrollment month and accumulates average revenue
    /// per student across the first `max_months` offset months.
    pub fn cohort_table(ledger: &Ledger, max_months: usize) -> ServiceResult<CohortTable> {
        ledger.validate()?;

        let mut cohorts: BTreeMap<Month, Vec<&Student>> = BTreeMap::new();
        for student in &ledger.students {
            cohorts
                .entry(Month::from_date(student.enrollment_date))
                .or_default()
                .push(student);
        }

        let rows = cohorts
            .into_iter()
            .map(|(cohort, members)| {
                let size = members.len();
                let mut cumulative = 0.0;
                let mut per_student = Vec::with_capacity(max_months);
                for offset in 0..max_months {
                    let window = cohort.plus(offset as i32);
                    let collected: f64 = members
                        .iter()
                        .flat_map(|student| student.payment_history.iter())
                        .filter(|payment| window.contains(payment.date))
                        .map(|payment| payment.amount)
                        .sum();
                    cumulative += collected;
                    let average = if size > 0 { cumulative / size as f64 } else { 0.0 };
                    per_student.push(average);
                }
                CohortRow {
                    cohort,
                    size,
                    cumulative_revenue_per_student: per_student,
                }
            })
            .collect();

        Ok(CohortTable { max_months, rows })
    }
}
