//! Role gate: may this user take the action implied by this stage, now?
use crate::approval::Approval;
use crate::error::Refusal;
use crate::stage::{Stage, WorkflowPlan};

/// Check that `user_id` may act at `acting_stage` given the approval's
/// derived state. A rejected document refuses everything; a document whose
/// pending stage is not `acting_stage` has already moved past the caller;
/// otherwise the assigned `<stage>By` actor must be the caller.
///
/// The `NotAuthorized` refusal carries the assigned actor's raw id; the
/// dispatcher swaps in a display name from the user directory.
pub fn clearance(
    plan: &WorkflowPlan,
    approval: &Approval,
    acting_stage: Stage,
    user_id: &str,
) -> Result<(), Refusal> {
    let current = plan.current_stage(approval);
    if current == Stage::Rejected {
        return Err(Refusal::Rejected);
    }
    let pending = match plan.pending_stage(approval) {
        Some(stage) => stage,
        None => return Err(Refusal::AlreadyProcessed { stage: current }),
    };
    if acting_stage != pending {
        return Err(Refusal::AlreadyProcessed { stage: current });
    }
    match approval.stage_actor(acting_stage) {
        Some(assigned) if assigned == user_id => Ok(()),
        Some(assigned) => Err(Refusal::NotAuthorized {
            assigned: assigned.to_string(),
            assigned_name: assigned.to_string(),
        }),
        // no actor assigned yet; the message still has to name someone
        None => Err(Refusal::NotAuthorized {
            assigned: String::new(),
            assigned_name: "another user".to_string(),
        }),
    }
}
