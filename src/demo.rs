//! Seeded demonstration ledger.
//!
//! Mirrors the shapes collections staff actually see: current and overdue
//! monthly tuition, a semester invoice recognized over five months, clean
//! payers next to chronically late ones. Every report has something to show
//! at the reference date.

use chrono::{Datelike, NaiveDate};

use crate::domain::account::{Account, AccountKind};
use crate::domain::invoice::{DeferredRevenueSchedule, Invoice, InvoiceItem, InvoiceStatus};
use crate::domain::payment::Payment;
use crate::domain::student::{RiskLevel, Student};
use crate::ledger::Ledger;

/// Date the demo data is arranged around: two tuition cycles are overdue,
/// the August cycle is billed but not yet due, the semester invoice is paid
/// but not yet recognized.
pub fn demo_reference_date() -> NaiveDate {
    ymd(2024, 7, 10)
}

/// Builds the demonstration ledger used by the CLI and integration tests.
pub fn demo_ledger() -> Ledger {
    let mut ledger = Ledger::new("Escuela de Enfermería");
    for account in chart_of_accounts() {
        ledger.add_account(account);
    }
    ledger.add_student(ana_garcia());
    ledger.add_student(luis_martinez());
    ledger.add_student(sofia_rodriguez());
    ledger.add_student(carlos_sanchez());
    ledger.add_student(valentina_gomez());
    ledger.add_student(javier_fernandez());
    ledger
}

fn chart_of_accounts() -> Vec<Account> {
    vec![
        Account::new("400-01", "Tuition income", AccountKind::Income),
        Account::new("400-02", "Enrollment income", AccountKind::Income),
        Account::new("400-03", "Materials income", AccountKind::Income),
        Account::new("400-04", "Late fee income", AccountKind::Income),
        Account::new("200-01", "Deferred revenue", AccountKind::Liability),
    ]
}

fn tuition_invoice(folio: &str, description: &str, amount: f64, issue: NaiveDate) -> Invoice {
    // Tuition falls due on the 5th of the billing month.
    let due = ymd(issue.year(), issue.month(), 5);
    Invoice::new(
        folio,
        issue,
        due,
        vec![InvoiceItem::new(description, amount, "400-01")],
    )
    .with_status(InvoiceStatus::Sent)
}

fn settled(mut invoice: Invoice) -> Invoice {
    invoice.apply_payment(invoice.total_amount);
    invoice
}

/// Pays monthly, but late; one cycle already overdue.
fn ana_garcia() -> Student {
    let june = settled(tuition_invoice(
        "F-2024-001",
        "Tuition June",
        3500.0,
        ymd(2024, 6, 1),
    ));
    let july = tuition_invoice("F-2024-002", "Tuition July", 3500.0, ymd(2024, 7, 1));

    let june_payment =
        Payment::new(3500.0, ymd(2024, 6, 8), "Tuition June").with_invoice(june.id);
    // History predating the snapshot window; no matching invoice on file.
    let may_payment = Payment::new(3500.0, ymd(2024, 5, 5), "Tuition May");

    Student::new("Ana García Pérez", "ana.garcia@example.com", ymd(2024, 1, 15))
        .with_risk_level(RiskLevel::High)
        .with_invoice(july)
        .with_invoice(june)
        .with_payment(june_payment)
        .with_payment(may_payment)
}

/// Reliable payer; current cycle billed, nothing overdue.
fn luis_martinez() -> Student {
    let july = settled(tuition_invoice(
        "F-2024-003",
        "Tuition July",
        3500.0,
        ymd(2024, 7, 1),
    ));
    let august = tuition_invoice("F-2024-005", "Tuition August", 3500.0, ymd(2024, 8, 1));

    let july_payment =
        Payment::new(3500.0, ymd(2024, 7, 1), "Tuition July").with_invoice(july.id);
    let june_payment = Payment::new(3500.0, ymd(2024, 6, 2), "Tuition June");

    Student::new("Luis Martínez Hernández", "luis.martinez@example.com", ymd(2024, 1, 20))
        .with_invoice(august)
        .with_invoice(july)
        .with_payment(july_payment)
        .with_payment(june_payment)
}

/// Paid the full semester up front; revenue recognizes August through
/// December.
fn sofia_rodriguez() -> Student {
    let mut semester = Invoice::new(
        "F-2024-SEM",
        ymd(2024, 8, 1),
        ymd(2024, 8, 5),
        vec![InvoiceItem::new(
            "Semester tuition Aug-Dec",
            21000.0,
            "400-01",
        )],
    )
    .with_status(InvoiceStatus::Sent)
    .with_schedule(DeferredRevenueSchedule::new(
        ymd(2024, 8, 1),
        ymd(2024, 12, 31),
        5,
    ));
    semester.apply_payment(21000.0);

    let july = settled(tuition_invoice(
        "F-2024-006",
        "Tuition July",
        3500.0,
        ymd(2024, 7, 1),
    ));
    let july_payment =
        Payment::new(3500.0, ymd(2024, 7, 5), "Tuition July").with_invoice(july.id);

    Student::new("Sofía Rodríguez López", "sofia.rodriguez@example.com", ymd(2024, 2, 1))
        .with_invoice(semester)
        .with_invoice(july)
        .with_payment(july_payment)
}

/// Paid June late with a surcharge; July (tuition plus late fee) is overdue.
fn carlos_sanchez() -> Student {
    let june = settled(tuition_invoice(
        "F-2024-008",
        "Tuition June",
        3500.0,
        ymd(2024, 6, 1),
    ));
    let july = tuition_invoice(
        "F-2024-009",
        "Tuition July + late fee",
        3750.0,
        ymd(2024, 7, 1),
    );

    let june_payment =
        Payment::new(3750.0, ymd(2024, 6, 10), "Tuition June (late)").with_invoice(june.id);

    Student::new("Carlos Sánchez González", "carlos.sanchez@example.com", ymd(2024, 2, 10))
        .with_risk_level(RiskLevel::Medium)
        .with_invoice(july)
        .with_invoice(june)
        .with_payment(june_payment)
}

/// On-time payer with the August cycle already billed.
fn valentina_gomez() -> Student {
    let july = settled(tuition_invoice(
        "F-2024-010",
        "Tuition July",
        3500.0,
        ymd(2024, 7, 1),
    ));
    let august = tuition_invoice("F-2024-011", "Tuition August", 3500.0, ymd(2024, 8, 1));

    let july_payment =
        Payment::new(3500.0, ymd(2024, 7, 3), "Tuition July").with_invoice(july.id);

    Student::new("Valentina Gómez Díaz", "valentina.gomez@example.com", ymd(2024, 3, 5))
        .with_invoice(august)
        .with_invoice(july)
        .with_payment(july_payment)
}

/// Two cycles overdue; has not paid since May.
fn javier_fernandez() -> Student {
    let may = settled(tuition_invoice(
        "F-2024-012",
        "Tuition May",
        3500.0,
        ymd(2024, 5, 1),
    ));
    let june = tuition_invoice("F-2024-013", "Tuition June", 3500.0, ymd(2024, 6, 1));
    let july = tuition_invoice("F-2024-014", "Tuition July", 3500.0, ymd(2024, 7, 1));

    let may_payment =
        Payment::new(3500.0, ymd(2024, 5, 5), "Tuition May").with_invoice(may.id);

    Student::new("Javier Fernández Cruz", "javier.fernandez@example.com", ymd(2024, 3, 12))
        .with_risk_level(RiskLevel::High)
        .with_invoice(july)
        .with_invoice(june)
        .with_invoice(may)
        .with_payment(may_payment)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
