use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::invoice::Invoice;
use crate::domain::student::Student;
use crate::errors::LedgerError;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The full collections snapshot every report computes from.
///
/// Reports treat a `Ledger` as immutable; the only mutation the engine
/// performs is payment registration, which goes through
/// `PaymentService::register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub chart_of_accounts: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            students: Vec::new(),
            chart_of_accounts: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_student(&mut self, student: Student) -> Uuid {
        let id = student.id;
        self.students.push(student);
        self.touch();
        id
    }

    pub fn add_account(&mut self, account: Account) {
        self.chart_of_accounts.push(account);
        self.touch();
    }

    pub fn student(&self, id: Uuid) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn student_mut(&mut self, id: Uuid) -> Option<&mut Student> {
        self.students.iter_mut().find(|student| student.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.chart_of_accounts.iter().find(|account| account.id == id)
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// All invoices across all students, in ownership order.
    pub fn invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.students.iter().flat_map(|student| student.invoices.iter())
    }

    /// Checks the snapshot's internal consistency before any computation.
    pub fn validate(&self) -> Result<(), LedgerError> {
        super::validate::validate_ledger(self)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
