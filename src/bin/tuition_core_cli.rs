use std::{env, path::PathBuf, process};

use chrono::NaiveDate;
use colored::Colorize;

use tuition_core::config::ConfigManager;
use tuition_core::core::services::{
    AgingService, AnalyticsService, DashboardService, RecognitionService,
};
use tuition_core::demo;
use tuition_core::init;
use tuition_core::insight::{generate_dashboard_summary, GeminiClient};
use tuition_core::ledger::{Ledger, Month};
use tuition_core::snapshot;
use tuition_core::time::{Clock, SystemClock};

const CRITICAL_ACCOUNT_LIMIT: usize = 5;
const COHORT_MONTHS: usize = 12;

#[tokio::main]
async fn main() {
    init();

    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

struct CliArgs {
    as_of: Option<NaiveDate>,
    month: Option<Month>,
    snapshot: Option<PathBuf>,
    report: Option<String>,
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;

    // Without a snapshot the demo ledger is rendered at its own reference
    // date, so the output is stable regardless of when it runs.
    let (ledger, default_as_of) = match &args.snapshot {
        Some(path) => (snapshot::load_ledger_from_path(path)?, SystemClock.today()),
        None => (demo::demo_ledger(), demo::demo_reference_date()),
    };
    let as_of = args.as_of.unwrap_or(default_as_of);
    let month = args.month.unwrap_or_else(|| Month::from_date(as_of));

    match args.report.as_deref() {
        None | Some("all") => {
            render_dashboard(&ledger, as_of)?;
            render_aging(&ledger, as_of)?;
            render_income(&ledger, month)?;
            render_rollforward(&ledger, month)?;
            render_dso(&ledger, as_of)?;
            render_cohorts(&ledger)?;
        }
        Some("dashboard") => render_dashboard(&ledger, as_of)?,
        Some("aging") => render_aging(&ledger, as_of)?,
        Some("income") => render_income(&ledger, month)?,
        Some("rollforward") => render_rollforward(&ledger, month)?,
        Some("dso") => render_dso(&ledger, as_of)?,
        Some("cohorts") => render_cohorts(&ledger)?,
        Some("summary") => render_summary(&ledger, as_of).await?,
        Some(other) => {
            eprintln!("Unknown report `{other}`.");
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn parse_args() -> Result<CliArgs, Box<dyn std::error::Error>> {
    let mut parsed = CliArgs {
        as_of: None,
        month: None,
        snapshot: None,
        report: None,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--as-of" => {
                let raw = args.next().ok_or("--as-of needs a YYYY-MM-DD value")?;
                parsed.as_of = Some(raw.parse()?);
            }
            "--month" => {
                let raw = args.next().ok_or("--month needs a YYYY-MM value")?;
                parsed.month = Some(parse_month(&raw)?);
            }
            "--snapshot" => {
                let raw = args.next().ok_or("--snapshot needs a file path")?;
                parsed.snapshot = Some(PathBuf::from(raw));
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown flag `{other}`").into());
            }
            report => {
                if parsed.report.is_some() {
                    return Err("only one report may be named".into());
                }
                parsed.report = Some(report.to_string());
            }
        }
    }
    Ok(parsed)
}

fn parse_month(raw: &str) -> Result<Month, Box<dyn std::error::Error>> {
    let parts = raw
        .split_once('-')
        .ok_or_else(|| format!("`{raw}` is not a YYYY-MM month"))?;
    let year: i32 = parts.0.parse()?;
    let month: u32 = parts.1.parse()?;
    Month::new(year, month).ok_or_else(|| format!("`{raw}` is not a YYYY-MM month").into())
}

fn section(title: &str) {
    println!();
    println!("{}", format!("=== {title} ===").cyan().bold());
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn render_dashboard(ledger: &Ledger, as_of: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = DashboardService::metrics(ledger, as_of)?;
    section(&format!("Dashboard ({})", metrics.as_of));
    println!("{:<22}{:>14}", "Collected", money(metrics.total_collected));
    println!("{:<22}{:>14}", "Billed", money(metrics.total_billed));
    println!("{:<22}{:>14}", "Outstanding", money(metrics.total_due));
    println!("{:<22}{:>13.1}%", "Collection rate", metrics.collection_rate);
    println!("{:<22}{:>14}", "Overdue students", metrics.overdue_students);
    println!("{:<22}{:>14}", "High risk students", metrics.high_risk_students);

    let critical = DashboardService::critical_accounts(ledger, as_of, CRITICAL_ACCOUNT_LIMIT)?;
    if !critical.is_empty() {
        println!();
        println!("{}", "Critical accounts".bold());
        for account in critical {
            println!(
                "  {:<28} due {}  {:>12}",
                account.student_name,
                account.most_urgent_due,
                money(account.due_amount)
            );
        }
    }
    Ok(())
}

fn render_aging(ledger: &Ledger, as_of: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let report = AgingService::report(ledger, as_of)?;
    section(&format!("Receivables aging ({})", report.as_of));
    println!(
        "{:<10}{:>14}{:>10}{:>9}",
        "Bucket", "Amount", "Invoices", "Share"
    );
    for line in &report.lines {
        println!(
            "{:<10}{:>14}{:>10}{:>8.1}%",
            line.bucket.label(),
            money(line.total_amount),
            line.invoice_count,
            line.share
        );
    }
    println!("{:<10}{:>14}", "Total", money(report.total_outstanding));
    Ok(())
}

fn render_income(ledger: &Ledger, month: Month) -> Result<(), Box<dyn std::error::Error>> {
    let statement = RecognitionService::income_statement(ledger, month)?;
    section(&format!("Income statement ({month})"));
    if statement.lines.is_empty() {
        println!("No revenue recognized this month.");
        return Ok(());
    }
    for line in &statement.lines {
        println!(
            "{:<8}{:<26}{:>14}{:>8.1}%",
            line.account_id,
            line.account_name,
            money(line.amount),
            line.share
        );
    }
    println!("{:<34}{:>14}", "Total", money(statement.total));
    Ok(())
}

fn render_rollforward(ledger: &Ledger, month: Month) -> Result<(), Box<dyn std::error::Error>> {
    let roll = RecognitionService::deferred_rollforward(ledger, month)?;
    section(&format!("Deferred revenue rollforward ({month})"));
    println!("{:<20}{:>14}", "Beginning balance", money(roll.beginning_balance));
    println!("{:<20}{:>14}", "New deferrals", money(roll.new_deferrals));
    println!("{:<20}{:>14}", "Recognized", money(roll.recognized));
    println!("{:<20}{:>14}", "Ending balance", money(roll.ending_balance));
    Ok(())
}

fn render_dso(ledger: &Ledger, as_of: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let report = AnalyticsService::days_sales_outstanding(ledger, as_of)?;
    section(&format!("Days sales outstanding ({})", report.as_of));
    println!("{:<22}{:>14}", "Outstanding", money(report.total_outstanding));
    println!(
        "{:<22}{:>14}",
        "Invoiced (30 days)",
        money(report.invoiced_last_30_days)
    );
    println!("{:<22}{:>14.1}", "DSO (days)", report.days);
    Ok(())
}

fn render_cohorts(ledger: &Ledger) -> Result<(), Box<dyn std::error::Error>> {
    let table = AnalyticsService::cohort_table(ledger, COHORT_MONTHS)?;
    section("Cohort revenue per student");
    print!("{:<10}{:>6}", "Cohort", "Size");
    for offset in 0..table.max_months {
        print!("{:>10}", format!("M{offset}"));
    }
    println!();
    for row in &table.rows {
        print!("{:<10}{:>6}", row.cohort.to_string(), row.size);
        for value in &row.cumulative_revenue_per_student {
            print!("{:>10.2}", value);
        }
        println!();
    }
    Ok(())
}

async fn render_summary(
    ledger: &Ledger,
    as_of: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = DashboardService::metrics(ledger, as_of)?;
    let config = ConfigManager::new()?.load()?;
    let gemini = match config.gemini() {
        Some(gemini) => gemini,
        None => {
            eprintln!(
                "No Gemini API key configured. Set GEMINI_API_KEY or add \
                 `gemini_api_key` to the settings file."
            );
            process::exit(1);
        }
    };
    let client = GeminiClient::new(gemini)?;
    let summary = generate_dashboard_summary(&metrics, &client).await?;
    section(&format!("Executive summary ({as_of})"));
    println!("{summary}");
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Usage: tuition_core_cli [--as-of YYYY-MM-DD] [--month YYYY-MM] \
         [--snapshot FILE] [report]\n\
         Reports:\n  \
         all (default)\n  \
         dashboard | aging | income | rollforward | dso | cohorts\n  \
         summary   (needs a Gemini API key)\n\
         Without --snapshot the built-in demo ledger is rendered at its \
         reference date."
    );
}
