use chrono::NaiveDate;

use crate::domain::invoice::InvoiceStatus;
use crate::ledger::Ledger;

use super::ServiceResult;

/// Days-past-due buckets of the receivables aging report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }

    fn for_days_overdue(days: i64) -> Self {
        match days {
            d if d <= 0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    fn position(&self) -> usize {
        match self {
            AgingBucket::Current => 0,
            AgingBucket::Days1To30 => 1,
            AgingBucket::Days31To60 => 2,
            AgingBucket::Days61To90 => 3,
            AgingBucket::Over90 => 4,
        }
    }
}

/// One row of the aging report.
#[derive(Debug, Clone)]
pub struct AgingLine {
    pub bucket: AgingBucket,
    pub total_amount: f64,
    pub invoice_count: usize,
    /// Share of total outstanding, in percent. Zero when nothing is owed.
    pub share: f64,
}

#[derive(Debug, Clone)]
pub struct AgingReport {
    pub as_of: NaiveDate,
    pub lines: Vec<AgingLine>,
    pub total_outstanding: f64,
}

impl AgingReport {
    pub fn line(&self, bucket: AgingBucket) -> &AgingLine {
        &self.lines[bucket.position()]
    }
}

pub struct AgingService;

impl AgingService {
    /// Buckets every open balance by days past due at `as_of`. Bucket totals
    /// sum exactly to total outstanding; no invoice is counted twice.
    pub fn report(ledger: &Ledger, as_of: NaiveDate) -> ServiceResult<AgingReport> {
        ledger.validate()?;

        let mut amounts = [0.0_f64; 5];
        let mut counts = [0_usize; 5];
        for invoice in ledger.invoices() {
            if invoice.balance <= 0.0
                || invoice.status_as_of(as_of) == InvoiceStatus::Cancelled
            {
                continue;
            }
            let bucket = AgingBucket::for_days_overdue(invoice.days_overdue(as_of));
            amounts[bucket.position()] += invoice.balance;
            counts[bucket.position()] += 1;
        }

        let total_outstanding: f64 = amounts.iter().sum();
        let lines = AgingBucket::ALL
            .iter()
            .map(|bucket| {
                let position = bucket.position();
                let share = if total_outstanding > 0.0 {
                    amounts[position] / total_outstanding * 100.0
                } else {
                    0.0
                };
                AgingLine {
                    bucket: *bucket,
                    total_amount: amounts[position],
                    invoice_count: counts[position],
                    share,
                }
            })
            .collect();

        Ok(AgingReport {
            as_of,
            lines,
            total_outstanding,
        })
    }
}
