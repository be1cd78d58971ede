use serde::{Deserialize, Serialize};

/// Result of processing one item of a batch request (one participant to render,
/// one template to delete, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded { id: i64, message: String },
    Failed { id: i64, message: String },
}

impl ItemOutcome {
    pub fn id(&self) -> i64 {
        match self {
            ItemOutcome::Succeeded { id, .. } | ItemOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ItemOutcome::Succeeded { message, .. } | ItemOutcome::Failed { message, .. } => message,
        }
    }
}

/// Aggregated per-item results of a batch request.
///
/// A failing item never stops the batch; every requested id gets exactly one
/// entry in `items`, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for `id`. `Ok` carries the success message, `Err` the failure reason.
    pub fn record<E: ToString>(&mut self, id: i64, result: Result<String, E>) {
        let outcome = match result {
            Ok(message) => {
                self.succeeded += 1;
                ItemOutcome::Succeeded { id, message }
            }
            Err(e) => {
                self.failed += 1;
                ItemOutcome::Failed {
                    id,
                    message: e.to_string(),
                }
            }
        };
        self.items.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| !item.is_success())
    }
}
