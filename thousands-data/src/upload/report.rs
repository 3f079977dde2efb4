use thousands_core::TransferTask;

use super::error::TransferError;

/// Successful terminal state of a transfer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The asset was uploaded during this run.
    Uploaded,
    /// An object already existed under the key; nothing was sent.
    AlreadyPresent,
}

/// Terminal state of one task.
pub type TaskResult = Result<TaskOutcome, TransferError>;

/// Outcome of every distinct task handed to the uploader.
///
/// Transfers appear in completion order, followed by key conflicts.
#[derive(Debug, Default)]
pub struct UploadReport {
    outcomes: Vec<(TransferTask, TaskResult)>,
}

impl UploadReport {
    pub(crate) fn from_outcomes(outcomes: Vec<(TransferTask, TaskResult)>) -> Self {
        Self { outcomes }
    }

    /// Number of tasks resolved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report covers no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Tasks uploaded during this run.
    #[must_use]
    pub fn uploaded(&self) -> usize {
        self.count(TaskOutcome::Uploaded)
    }

    /// Tasks skipped because the object already existed.
    #[must_use]
    pub fn already_present(&self) -> usize {
        self.count(TaskOutcome::AlreadyPresent)
    }

    /// Tasks that ended in a [`TransferError`].
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Whether every task succeeded or was already satisfied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Iterate over the failed tasks and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&TransferTask, &TransferError)> {
        self.outcomes
            .iter()
            .filter_map(|(task, result)| result.as_ref().err().map(|err| (task, err)))
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    fn count(&self, wanted: TaskOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, result)| matches!(result, Ok(outcome) if *outcome == wanted))
            .count()
    }
}
