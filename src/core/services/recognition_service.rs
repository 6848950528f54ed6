use std::collections::BTreeMap;

use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::ledger::{Ledger, Month};

use super::ServiceResult;

/// One income-statement row, labelled from the chart of accounts.
#[derive(Debug, Clone)]
pub struct IncomeLine {
    pub account_id: String,
    pub account_name: String,
    pub amount: f64,
    /// Share of total recognized income, in percent.
    pub share: f64,
}

#[derive(Debug, Clone)]
pub struct IncomeStatement {
    pub month: Month,
    pub lines: Vec<IncomeLine>,
    pub total: f64,
}

/// Deferred-revenue activity for one reporting month.
///
/// `ending_balance` is computed through the rollforward identity
/// `ending = beginning + new_deferrals - recognized`, which makes the
/// identity hold exactly for every month by construction.
#[derive(Debug, Clone)]
pub struct DeferredRollforward {
    pub month: Month,
    pub beginning_balance: f64,
    pub new_deferrals: f64,
    pub recognized: f64,
    pub ending_balance: f64,
}

pub struct RecognitionService;

impl RecognitionService {
    /// Revenue a single invoice contributes to `month`.
    ///
    /// Only paid invoices recognize revenue. Without a schedule the full
    /// paid amount lands in the issue month; with one, an equal slice lands
    /// in each of the `recognition_months` starting at the schedule start.
    pub fn recognized_in_month(invoice: &Invoice, month: Month) -> f64 {
        if invoice.status != InvoiceStatus::Paid {
            return 0.0;
        }
        match &invoice.deferred_revenue_schedule {
            None => {
                if month.contains(invoice.issue_date) {
                    invoice.paid_amount
                } else {
                    0.0
                }
            }
            Some(schedule) => {
                let start = Month::from_date(schedule.start_date);
                let offset = month.months_since(start);
                if offset >= 0 && (offset as u32) < schedule.recognition_months {
                    schedule.monthly_amount(invoice.total_amount)
                } else {
                    0.0
                }
            }
        }
    }

    /// Recognized revenue for `month`, allocated to each item's account in
    /// proportion to the item's weight in its invoice. Only Income accounts
    /// are surfaced as lines.
    pub fn income_statement(ledger: &Ledger, month: Month) -> ServiceResult<IncomeStatement> {
        ledger.validate()?;

        let mut by_account: BTreeMap<&str, f64> = BTreeMap::new();
        for invoice in ledger.invoices() {
            let recognized = Self::recognized_in_month(invoice, month);
            if recognized <= 0.0 || invoice.total_amount <= 0.0 {
                continue;
            }
            for item in &invoice.items {
                let allocated = recognized * (item.amount / invoice.total_amount);
                *by_account.entry(item.account_id.as_str()).or_insert(0.0) += allocated;
            }
        }

        let income_accounts: Vec<_> = ledger
            .chart_of_accounts
            .iter()
            .filter(|account| account.is_income())
            .collect();
        let total: f64 = income_accounts
            .iter()
            .filter_map(|account| by_account.get(account.id.as_str()))
            .sum();
        let lines = income_accounts
            .iter()
            .map(|account| {
                let amount = by_account.get(account.id.as_str()).copied().unwrap_or(0.0);
                let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
                IncomeLine {
                    account_id: account.id.clone(),
                    account_name: account.name.clone(),
                    amount,
                    share,
                }
            })
            .collect();

        Ok(IncomeStatement { month, lines, total })
    }

    /// Deferred-revenue rollforward over paid invoices carrying a schedule.
    pub fn deferred_rollforward(
        ledger: &Ledger,
        month: Month,
    ) -> ServiceResult<DeferredRollforward> {
        ledger.validate()?;

        let mut beginning_balance = 0.0;
        let mut new_deferrals = 0.0;
        let mut recognized = 0.0;
        for invoice in ledger.invoices() {
            if invoice.status != InvoiceStatus::Paid {
                continue;
            }
            let Some(schedule) = &invoice.deferred_revenue_schedule else {
                continue;
            };
            let issue_month = Month::from_date(invoice.issue_date);
            if issue_month > month {
                continue;
            }

            let monthly = schedule.monthly_amount(invoice.total_amount);
            let start = Month::from_date(schedule.start_date);
            let months_elapsed = month
                .months_since(start)
                .clamp(0, schedule.recognition_months as i32);

            if issue_month == month {
                new_deferrals += invoice.total_amount;
            } else {
                beginning_balance += invoice.total_amount - monthly * months_elapsed as f64;
            }

            let offset = month.months_since(start);
            if offset >= 0 && (offset as u32) < schedule.recognition_months {
                recognized += monthly;
            }
        }

        Ok(DeferredRollforward {
            month,
            beginning_balance,
            new_deferrals,
            recognized,
            ending_balance: beginning_balance + new_deferrals - recognized,
        })
    }
}
