//! Action dispatcher: validates an action against the workflow machine and
//! role gate, builds the transition, and submits it to the document store.
//!
//! Actions operate on a previously loaded [`WorkflowContext`] snapshot, so
//! every refusal and validation error is decided before a single network
//! call; only the approval update itself touches the store. Nothing is
//! mutated locally until the store confirms.
use crate::approval::{Approval, Document};
use crate::directory::{User, UserDirectory};
use crate::error::{Refusal, StoreError, ValidationError, WorkflowError};
use crate::gate;
use crate::remarks;
use crate::stage::{DocumentKind, Role, Stage};
use crate::store::DocumentStore;
use crate::utils;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

/// Transaction type whose cash advances get a close stage.
pub const PERSONAL_LOAN: &str = "Personal Loan";

/// Everything one page view works against: the document snapshot and the
/// user directory loaded alongside it.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub kind: DocumentKind,
    pub document: Document,
    pub users: UserDirectory,
}

/// Result of a dispatched action. Refusals are informational, not errors;
/// a completed action carries the approval as the store now has it and the
/// menu view to navigate to.
#[derive(Debug)]
pub enum Outcome {
    Completed { approval: Approval, redirect: String },
    Refused(Refusal),
}

impl Outcome {
    pub fn is_refused(&self) -> bool {
        matches!(self, Outcome::Refused(_))
    }
}

/// Relative path of the menu view for a role working a document kind. The
/// kind and role enums keep the set closed.
pub fn redirect_path(kind: DocumentKind, role: Role) -> String {
    format!("../{}/menu-{}.html", kind.menu_segment(), role.slug())
}

pub struct ApprovalService<S> {
    store: S,
}

impl<S: DocumentStore> ApprovalService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the document and the user directory concurrently. A failed
    /// users read degrades to an empty directory; it only costs display
    /// names, never the document.
    pub async fn load(&self, kind: DocumentKind, id: &str) -> Result<WorkflowContext, StoreError> {
        let (document, users) = tokio::join!(self.store.fetch(kind, id), self.store.fetch_users());
        let document = document?;
        let users = match users {
            Ok(users) => UserDirectory::new(users),
            Err(err) => {
                warn!(document = %document.document_number, "users fetch failed, name resolution degraded: {err}");
                UserDirectory::empty()
            }
        };
        Ok(WorkflowContext {
            kind,
            document,
            users,
        })
    }

    /// Advance the document through `acting_stage`: stamp the actor's
    /// triplet, move the status label to the successor, copy everything
    /// else forward unchanged.
    pub async fn approve(
        &self,
        ctx: &WorkflowContext,
        actor: &User,
        acting_stage: Stage,
    ) -> Result<Outcome, WorkflowError> {
        if let Err(refusal) = self.gate(ctx, acting_stage, actor) {
            return Ok(Outcome::Refused(refusal));
        }
        let plan = ctx.kind.plan();
        let mut approval = ctx.document.approval.clone();
        approval.record_stage(acting_stage, &actor.id, &actor.full_name, Utc::now());
        approval.approval_status = plan.next_stage(acting_stage).unwrap_or(acting_stage);

        self.submit(ctx, approval, acting_stage).await
    }

    /// Reject out of the normal sequence. Remarks arrive as full editor
    /// content and must carry text beyond the guarded prefix; validation
    /// runs before the gate so an empty submission never reaches the
    /// network.
    pub async fn reject(
        &self,
        ctx: &WorkflowContext,
        actor: &User,
        acting_stage: Stage,
        remarks: &str,
    ) -> Result<Outcome, WorkflowError> {
        if remarks::remark_body(remarks).trim().is_empty() {
            return Err(ValidationError::EmptyRejectionRemarks.into());
        }
        if let Err(refusal) = self.gate(ctx, acting_stage, actor) {
            return Ok(Outcome::Refused(refusal));
        }
        let mut approval = ctx.document.approval.clone();
        approval.record_rejection(remarks, Utc::now());

        self.submit(ctx, approval, acting_stage).await
    }

    /// Send the document back for correction: join the non-blank remark
    /// lines, bump the revision counter, leave the status label alone.
    pub async fn revise(
        &self,
        ctx: &WorkflowContext,
        actor: &User,
        acting_stage: Stage,
        remarks: &[&str],
    ) -> Result<Outcome, WorkflowError> {
        let lines: Vec<&str> = remarks
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(ValidationError::EmptyRevisionRemarks.into());
        }
        if let Err(refusal) = self.gate(ctx, acting_stage, actor) {
            return Ok(Outcome::Refused(refusal));
        }
        let mut approval = ctx.document.approval.clone();
        approval.record_revision(&lines.join("\n"), Utc::now());

        self.submit(ctx, approval, acting_stage).await
    }

    /// Close a cash advance. Only "Personal Loan" transactions have a close
    /// stage; anything else is refused before the gate even runs.
    pub async fn close(
        &self,
        ctx: &WorkflowContext,
        actor: &User,
    ) -> Result<Outcome, WorkflowError> {
        let found = ctx.document.transaction_type.as_deref().unwrap_or("");
        if found != PERSONAL_LOAN {
            return Ok(Outcome::Refused(Refusal::InvalidTransactionType {
                expected: PERSONAL_LOAN.to_string(),
                found: found.to_string(),
            }));
        }
        if let Err(refusal) = self.gate(ctx, Stage::Closed, actor) {
            return Ok(Outcome::Refused(refusal));
        }
        let mut approval = ctx.document.approval.clone();
        approval.record_stage(Stage::Closed, &actor.id, &actor.full_name, Utc::now());
        approval.approval_status = Stage::Closed;

        self.submit(ctx, approval, Stage::Closed).await
    }

    /// Confirm receipt of an outgoing payment. The transfer date is user
    /// input and must be present before anything else is considered.
    pub async fn receive(
        &self,
        ctx: &WorkflowContext,
        actor: &User,
        transfer_date: Option<NaiveDate>,
    ) -> Result<Outcome, WorkflowError> {
        let transfer_date = transfer_date.ok_or(ValidationError::MissingTransferDate)?;
        if let Err(refusal) = self.gate(ctx, Stage::Received, actor) {
            return Ok(Outcome::Refused(refusal));
        }
        let plan = ctx.kind.plan();
        let mut approval = ctx.document.approval.clone();
        approval.record_stage(Stage::Received, &actor.id, &actor.full_name, Utc::now());
        approval.transfer_date = Some(transfer_date);
        approval.approval_status = plan.next_stage(Stage::Received).unwrap_or(Stage::Received);

        self.submit(ctx, approval, Stage::Received).await
    }

    fn gate(&self, ctx: &WorkflowContext, acting_stage: Stage, actor: &User) -> Result<(), Refusal> {
        let plan = ctx.kind.plan();
        gate::clearance(&plan, &ctx.document.approval, acting_stage, &actor.id).map_err(
            |refusal| {
                warn!(
                    document = %ctx.document.document_number,
                    stage = %acting_stage,
                    actor = %actor.id,
                    "action refused: {refusal}"
                );
                match refusal {
                    Refusal::NotAuthorized { assigned, assigned_name } => {
                        let assigned_name = if assigned.is_empty() {
                            assigned_name
                        } else {
                            ctx.users.display_name(&assigned)
                        };
                        Refusal::NotAuthorized {
                            assigned,
                            assigned_name,
                        }
                    }
                    other => other,
                }
            },
        )
    }

    /// Persist the transition and, on success, hand back the redirect for
    /// the acting role's menu. On failure the snapshot stays untouched; the
    /// caller reports the message and may retry manually.
    async fn submit(
        &self,
        ctx: &WorkflowContext,
        approval: Approval,
        acting_stage: Stage,
    ) -> Result<Outcome, WorkflowError> {
        let request_id = utils::new_request_id();
        info!(
            %request_id,
            document = %ctx.document.document_number,
            stage = %acting_stage,
            "submitting approval transition"
        );
        self.store
            .save_approval(ctx.kind, &ctx.document.id, &approval)
            .await
            .map_err(|err| {
                tracing::error!(%request_id, document = %ctx.document.document_number, "transition rejected by store: {err}");
                err
            })?;

        let redirect = acting_stage
            .role()
            .map(|role| redirect_path(ctx.kind, role))
            .unwrap_or_else(|| "../index.html".to_string());
        Ok(Outcome::Completed { approval, redirect })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_paths_are_per_kind_and_role() {
        assert_eq!(
            redirect_path(DocumentKind::CashAdvance, Role::Checker),
            "../cash-advance/menu-checker.html"
        );
        assert_eq!(
            redirect_path(DocumentKind::OutgoingPayment, Role::Receiver),
            "../outgoing-payment/menu-receiver.html"
        );
    }
}
