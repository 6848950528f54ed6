//! Ledger snapshot load/save.
//!
//! The engine treats a ledger as one immutable JSON document. These helpers
//! are the ingestion interface, not a persistence layer: one file in, one
//! file out, staged through a `.tmp` sibling so a crash never leaves a
//! half-written snapshot behind.

use std::{fs, path::Path};

use tracing::debug;

use crate::errors::LedgerError;
use crate::ledger::Ledger;

/// Writes the ledger as pretty-printed JSON.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(
        path = %path.display(),
        students = ledger.student_count(),
        "ledger snapshot written"
    );
    Ok(())
}

/// Reads a snapshot back, rejecting inconsistent data before any report
/// ever sees it.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, LedgerError> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    ledger.validate()?;
    debug!(
        path = %path.display(),
        students = ledger.student_count(),
        "ledger snapshot loaded"
    );
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountKind};
    use crate::domain::invoice::{Invoice, InvoiceItem, InvoiceStatus};
    use crate::domain::student::Student;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new("Snapshot");
        ledger.add_account(Account::new("400-01", "Tuition", AccountKind::Income));
        ledger.add_student(
            Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15)).with_invoice(
                Invoice::new(
                    "INV-001",
                    date(2024, 5, 20),
                    date(2024, 6, 5),
                    vec![InvoiceItem::new("Tuition", 3500.0, "400-01")],
                )
                .with_status(InvoiceStatus::Sent),
            ),
        );
        ledger
    }

    #[test]
    fn round_trip_preserves_the_ledger() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("school.json");
        let ledger = sample_ledger();

        save_ledger_to_path(&ledger, &path).expect("save");
        let loaded = load_ledger_from_path(&path).expect("load");

        assert_eq!(loaded.id, ledger.id);
        assert_eq!(loaded.student_count(), 1);
        assert_eq!(loaded.students[0].invoices[0].balance, 3500.0);
        assert_eq!(loaded.schema_version, ledger.schema_version);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("deeper").join("school.json");

        save_ledger_to_path(&sample_ledger(), &path).expect("save");
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists(), "staging file is renamed away");
    }

    #[test]
    fn load_rejects_a_missing_file() {
        let dir = tempdir().expect("temp dir");
        let result = load_ledger_from_path(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }

    #[test]
    fn load_rejects_an_inconsistent_snapshot() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("school.json");
        let mut ledger = sample_ledger();
        // Break the balance identity, then write without validating.
        ledger.students[0].invoices[0].balance += 100.0;
        save_ledger_to_path(&ledger, &path).expect("save");

        let result = load_ledger_from_path(&path);
        assert!(matches!(result, Err(LedgerError::Validation { .. })));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("school.json");
        fs::write(&path, "{ not json").expect("write");

        let result = load_ledger_from_path(&path);
        assert!(matches!(result, Err(LedgerError::Serde(_))));
    }
}
