use crate::stage::Stage;

/// Fallback shown when the server gives no parseable message.
pub const GENERIC_FAILURE: &str =
    "Something went wrong while submitting the request. Please try again.";

/// Bad or missing user input, caught before any network call is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Rejection remarks must not be empty")]
    EmptyRejectionRemarks,
    #[error("At least one revision remark is required")]
    EmptyRevisionRemarks,
    #[error("A transfer date is required before receiving")]
    MissingTransferDate,
}

/// Workflow-precondition refusals. These are informational outcomes shown to
/// the user, not failures; the dispatcher returns them inside `Outcome`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("This document is awaiting action from {assigned_name}")]
    NotAuthorized {
        assigned: String,
        assigned_name: String,
    },
    #[error("This document has already been processed (current stage: {stage})")]
    AlreadyProcessed { stage: Stage },
    #[error("This document has been rejected")]
    Rejected,
    #[error("Closing applies to {expected} transactions only, found {found}")]
    InvalidTransactionType { expected: String, found: String },
}

/// Failures talking to the remote document store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response from the document store: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("document {0} was not found")]
    NotFound(String),
}

#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
