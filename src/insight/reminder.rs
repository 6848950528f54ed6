use chrono::NaiveDate;
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::services::dashboard_service::DashboardMetrics;
use crate::core::services::status_service::{Standing, StatusService};
use crate::domain::student::Student;
use crate::errors::LedgerError;
use crate::ledger::Ledger;

use super::notes::payment_history_notes;
use super::{GenerationError, TextGenerator};

/// Returned without consulting the collaborator when nothing is owed.
pub const NOTHING_DUE_MESSAGE: &str = "This student has no outstanding balance.";

/// Per-student result of a reminder batch run.
#[derive(Debug, Clone)]
pub enum ReminderOutcome {
    Sent {
        student_id: Uuid,
        student_name: String,
        message: String,
    },
    Failed {
        student_id: Uuid,
        student_name: String,
        error: String,
    },
}

impl ReminderOutcome {
    pub fn student_name(&self) -> &str {
        match self {
            ReminderOutcome::Sent { student_name, .. } => student_name,
            ReminderOutcome::Failed { student_name, .. } => student_name,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, ReminderOutcome::Sent { .. })
    }
}

/// Prompt handed to the collaborator for one student's reminder.
pub fn reminder_prompt(student: &Student, as_of: NaiveDate) -> String {
    let standing = StatusService::payment_status(student, as_of);
    let due_line = StatusService::most_urgent_open_invoice(student, as_of)
        .map(|invoice| invoice.due_date.to_string())
        .unwrap_or_else(|| "not yet due".to_string());
    format!(
        "Write a payment reminder for a school tuition account.\n\
         Student: {}\n\
         Total due: ${:.2}\n\
         Most urgent due date: {}\n\
         Payment history: {}\n\
         Tone: friendly but firm, professional. Maximum 80 words. Close by \
         inviting the family to contact the administration office.",
        student.name,
        standing.due_amount,
        due_line,
        payment_history_notes(student)
    )
}

/// Generates a reminder for one student, or returns the fixed
/// nothing-due text without calling the collaborator.
pub async fn generate_reminder(
    student: &Student,
    as_of: NaiveDate,
    generator: &dyn TextGenerator,
) -> Result<String, GenerationError> {
    let standing = StatusService::payment_status(student, as_of);
    if standing.standing == Standing::Paid {
        return Ok(NOTHING_DUE_MESSAGE.to_string());
    }
    debug!(
        student = %student.id,
        due = standing.due_amount,
        generator = generator.name(),
        "generating payment reminder"
    );
    generator.generate_text(&reminder_prompt(student, as_of)).await
}

/// Generates reminders for every overdue student, one at a time.
///
/// A failed generation becomes a `Failed` outcome for that student; it never
/// aborts the rest of the batch. Only an inconsistent ledger stops the run.
pub async fn run_reminder_batch(
    ledger: &Ledger,
    as_of: NaiveDate,
    generator: &dyn TextGenerator,
) -> Result<Vec<ReminderOutcome>, LedgerError> {
    ledger.validate()?;

    let mut outcomes = Vec::new();
    for student in &ledger.students {
        let standing = StatusService::payment_status(student, as_of);
        if standing.standing != Standing::Overdue {
            continue;
        }
        match generate_reminder(student, as_of, generator).await {
            Ok(message) => outcomes.push(ReminderOutcome::Sent {
                student_id: student.id,
                student_name: student.name.clone(),
                message,
            }),
            Err(cause) => {
                error!(student = %student.id, %cause, "reminder generation failed");
                outcomes.push(ReminderOutcome::Failed {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    error: cause.to_string(),
                });
            }
        }
    }
    Ok(outcomes)
}

/// Two-sentence executive summary of the dashboard metrics.
pub async fn generate_dashboard_summary(
    metrics: &DashboardMetrics,
    generator: &dyn TextGenerator,
) -> Result<String, GenerationError> {
    let prompt = format!(
        "Write a two-sentence executive summary of a school's tuition \
         collections status.\n\
         Total collected: ${:.2}\n\
         Outstanding balance: ${:.2}\n\
         Students with overdue invoices: {}\n\
         High-risk students: {}\n\
         Audience: the school director. Plain language, no bullet points.",
        metrics.total_collected,
        metrics.total_due,
        metrics.overdue_students,
        metrics.high_risk_students
    );
    generator.generate_text(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountKind};
    use crate::domain::invoice::{Invoice, InvoiceItem, InvoiceStatus};
    use crate::insight::StaticGenerator;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

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

    struct RecordingGenerator {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> Option<String> {
            self.last_prompt.lock().expect("prompt lock").clone()
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().expect("prompt lock") = Some(prompt.to_string());
            Ok("Dear family, please settle the pending balance.".to_string())
        }

        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, GenerationError> {
            Err(GenerationError::Unavailable("text only".to_string()))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Unavailable("connection refused".to_string()))
        }

        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, GenerationError> {
            Err(GenerationError::Unavailable("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn overdue_student(name: &str, folio: &str, amount: f64) -> Student {
        Student::new(name, "family@example.com", date(2024, 1, 15))
            .with_invoice(invoice_due(folio, amount, date(2024, 6, 5)))
    }

    fn batch_ledger() -> Ledger {
        let mut ledger = Ledger::new("Reminders");
        ledger.add_account(Account::new("400-01", "Tuition", AccountKind::Income));
        ledger.add_student(overdue_student("Ana Torres", "INV-001", 3500.0));
        ledger.add_student(overdue_student("Luis Vega", "INV-002", 3750.0));
        ledger.add_student(
            Student::new("Elena Paz", "elena@example.com", date(2024, 3, 12))
                .with_invoice(invoice_due("INV-003", 800.0, date(2024, 9, 5))),
        );
        ledger
    }

    #[tokio::test]
    async fn settled_students_skip_the_collaborator() {
        let student = Student::new("Ana Torres", "ana@example.com", date(2024, 1, 15));
        let generator = RecordingGenerator::new();

        let message = generate_reminder(&student, date(2024, 7, 10), &generator)
            .await
            .expect("reminder");
        assert_eq!(message, NOTHING_DUE_MESSAGE);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn prompt_carries_the_account_details() {
        let student = overdue_student("Sofia Reyes", "INV-009", 3750.0);
        let generator = RecordingGenerator::new();

        generate_reminder(&student, date(2024, 7, 10), &generator)
            .await
            .expect("reminder");
        let prompt = generator.last_prompt().expect("prompt captured");
        assert!(prompt.contains("Sofia Reyes"));
        assert!(prompt.contains("$3750.00"));
        assert!(prompt.contains("2024-06-05"));
        assert!(prompt.contains("No payment history recorded."));
    }

    #[tokio::test]
    async fn batch_covers_exactly_the_overdue_students() {
        let ledger = batch_ledger();
        let generator = RecordingGenerator::new();

        let outcomes = run_reminder_batch(&ledger, date(2024, 7, 10), &generator)
            .await
            .expect("batch runs");
        assert_eq!(outcomes.len(), 2, "pending students are skipped");
        assert!(outcomes.iter().all(ReminderOutcome::is_sent));
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let ledger = batch_ledger();

        let outcomes = run_reminder_batch(&ledger, date(2024, 7, 10), &FailingGenerator)
            .await
            .expect("batch still runs");
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            match outcome {
                ReminderOutcome::Failed { error, .. } => {
                    assert!(error.contains("connection refused"))
                }
                ReminderOutcome::Sent { .. } => panic!("generator always fails"),
            }
        }
    }

    #[tokio::test]
    async fn summary_prompt_reflects_the_metrics() {
        let metrics = DashboardMetrics {
            as_of: date(2024, 7, 10),
            total_collected: 46950.0,
            total_billed: 60200.0,
            total_due: 13250.0,
            collection_rate: 78.0,
            overdue_students: 3,
            high_risk_students: 2,
        };
        let generator = StaticGenerator::new("Collections are on track.");
        let summary = generate_dashboard_summary(&metrics, &generator)
            .await
            .expect("summary");
        assert_eq!(summary, "Collections are on track.");
    }
}
