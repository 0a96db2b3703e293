//! Workflow status machine: stages, roles, and the per-document-kind plans
//! that say which stages apply and in which order.
use crate::approval::Approval;
use serde::{Deserialize, Serialize};

/// A stage in the canonical approval sequence. `Draft` is the state before
/// any stage date is set; `Rejected` is reachable from any non-terminal
/// stage. Everything in between is an actionable stage slot with its own
/// by/by-name/date triplet on the approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Draft,
    Prepared,
    Checked,
    Acknowledged,
    Approved,
    Received,
    Closed,
    Rejected,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Draft
    }
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Draft => "Draft",
            Stage::Prepared => "Prepared",
            Stage::Checked => "Checked",
            Stage::Acknowledged => "Acknowledged",
            Stage::Approved => "Approved",
            Stage::Received => "Received",
            Stage::Closed => "Closed",
            Stage::Rejected => "Rejected",
        }
    }

    /// The workflow role that acts at this stage, if it is an actionable slot.
    pub fn role(self) -> Option<Role> {
        match self {
            Stage::Prepared => Some(Role::Preparer),
            Stage::Checked => Some(Role::Checker),
            Stage::Acknowledged => Some(Role::Acknowledger),
            Stage::Approved => Some(Role::Approver),
            Stage::Received => Some(Role::Receiver),
            Stage::Closed => Some(Role::Closer),
            Stage::Draft | Stage::Rejected => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Preparer,
    Checker,
    Acknowledger,
    Approver,
    Receiver,
    Closer,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Preparer => "Preparer",
            Role::Checker => "Checker",
            Role::Acknowledger => "Acknowledger",
            Role::Approver => "Approver",
            Role::Receiver => "Receiver",
            Role::Closer => "Closer",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Role::Preparer => "preparer",
            Role::Checker => "checker",
            Role::Acknowledger => "acknowledger",
            Role::Approver => "approver",
            Role::Receiver => "receiver",
            Role::Closer => "closer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    Reimbursement,
    Settlement,
    CashAdvance,
    OutgoingPayment,
}

impl DocumentKind {
    /// Path segment used by the REST document store.
    pub fn api_segment(self) -> &'static str {
        match self {
            DocumentKind::Reimbursement => "reimbursements",
            DocumentKind::Settlement => "settlements",
            DocumentKind::CashAdvance => "cash-advances",
            DocumentKind::OutgoingPayment => "outgoing-payments",
        }
    }

    /// Directory segment for the per-kind menu views.
    pub fn menu_segment(self) -> &'static str {
        match self {
            DocumentKind::Reimbursement => "reimbursement",
            DocumentKind::Settlement => "settlement",
            DocumentKind::CashAdvance => "cash-advance",
            DocumentKind::OutgoingPayment => "outgoing-payment",
        }
    }

    /// The stage plan for this kind. Each plan is a contiguous subset of the
    /// canonical order; outgoing payments skip `Acknowledged`, and only cash
    /// advances carry a `Closed` stage.
    pub fn plan(self) -> WorkflowPlan {
        match self {
            DocumentKind::Reimbursement => WorkflowPlan {
                kind: self,
                stages: &[
                    Stage::Prepared,
                    Stage::Checked,
                    Stage::Acknowledged,
                    Stage::Approved,
                ],
            },
            DocumentKind::Settlement => WorkflowPlan {
                kind: self,
                stages: &[
                    Stage::Prepared,
                    Stage::Checked,
                    Stage::Acknowledged,
                    Stage::Approved,
                    Stage::Received,
                ],
            },
            DocumentKind::CashAdvance => WorkflowPlan {
                kind: self,
                stages: &[
                    Stage::Prepared,
                    Stage::Checked,
                    Stage::Acknowledged,
                    Stage::Approved,
                    Stage::Received,
                    Stage::Closed,
                ],
            },
            DocumentKind::OutgoingPayment => WorkflowPlan {
                kind: self,
                stages: &[
                    Stage::Prepared,
                    Stage::Checked,
                    Stage::Approved,
                    Stage::Received,
                ],
            },
        }
    }
}

/// Ordered stage list for one document kind. The derived status is a function
/// of the recorded stage dates, never of the stored status label.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowPlan {
    pub kind: DocumentKind,
    stages: &'static [Stage],
}

impl WorkflowPlan {
    pub fn stages(&self) -> &'static [Stage] {
        self.stages
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn final_stage(&self) -> Stage {
        self.stages[self.stages.len() - 1]
    }

    /// Successor of `stage` in this plan. `Draft` precedes the first stage;
    /// the final stage and `Rejected` have none.
    pub fn next_stage(&self, stage: Stage) -> Option<Stage> {
        if stage == Stage::Draft {
            return self.stages.first().copied();
        }
        let pos = self.stages.iter().position(|s| *s == stage)?;
        self.stages.get(pos + 1).copied()
    }

    pub fn is_terminal(&self, stage: Stage) -> bool {
        stage == Stage::Rejected || stage == self.final_stage()
    }

    /// Derive the displayed stage. A set `rejected_date` always wins,
    /// whatever the stored status or stage dates say; otherwise the latest
    /// stage with a recorded date, walking the plan from the end; `Draft`
    /// when nothing has been recorded yet.
    pub fn current_stage(&self, approval: &Approval) -> Stage {
        if approval.rejected_date.is_some() {
            return Stage::Rejected;
        }
        self.stages
            .iter()
            .rev()
            .find(|stage| approval.stage_date(**stage).is_some())
            .copied()
            .unwrap_or(Stage::Draft)
    }

    /// The stage now awaiting action, or `None` when the document is done
    /// with this plan (terminal or rejected).
    pub fn pending_stage(&self, approval: &Approval) -> Option<Stage> {
        match self.current_stage(approval) {
            Stage::Rejected => None,
            current => self.next_stage(current),
        }
    }
}
