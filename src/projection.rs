//! Read-only view model derived from a document and its approval record.
//! A pure function of state; the rendering layer consumes it as-is.
use crate::approval::Document;
use crate::stage::{DocumentKind, Stage};
use chrono::{DateTime, NaiveDate, Utc};

/// The one store-mutating action the viewer could take right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Approve,
    Receive,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageRow {
    pub stage: Stage,
    pub role_label: &'static str,
    pub actor_name: Option<String>,
    pub acted_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectionInfo {
    pub date: DateTime<Utc>,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevisionInfo {
    pub number: u32,
    pub date: Option<DateTime<Utc>>,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub document_number: String,
    pub requester_name: String,
    pub currency: String,
    pub total_amount: u64,
    pub status: Stage,
    pub status_label: &'static str,
    pub stage_rows: Vec<StageRow>,
    pub pending_stage: Option<Stage>,
    /// Set when the viewer is the assigned actor of the pending stage.
    pub available_action: Option<ActionKind>,
    /// Reject and revise ride along with whatever primary action is open.
    pub can_reject: bool,
    pub rejection: Option<RejectionInfo>,
    pub revision: Option<RevisionInfo>,
    pub transfer_date: Option<NaiveDate>,
}

/// Build the render-ready view for `viewer_id`. Stage rows follow the
/// kind's plan, so skipped stages never show up.
pub fn project(kind: DocumentKind, document: &Document, viewer_id: &str) -> DocumentView {
    let plan = kind.plan();
    let approval = &document.approval;
    let status = plan.current_stage(approval);
    let pending_stage = plan.pending_stage(approval);

    let stage_rows = plan
        .stages()
        .iter()
        .map(|stage| StageRow {
            stage: *stage,
            role_label: stage.role().map(|role| role.label()).unwrap_or(""),
            actor_name: approval.stage_actor_name(*stage).map(str::to_string),
            acted_date: approval.stage_date(*stage),
        })
        .collect();

    let viewer_is_assigned = pending_stage
        .and_then(|stage| approval.stage_actor(stage))
        .is_some_and(|assigned| assigned == viewer_id);
    let available_action = match (viewer_is_assigned, pending_stage) {
        (false, _) | (_, None) => None,
        (true, Some(Stage::Received)) => Some(ActionKind::Receive),
        (true, Some(Stage::Closed)) => Some(ActionKind::Close),
        (true, Some(_)) => Some(ActionKind::Approve),
    };

    let rejection = approval.rejected_date.map(|date| RejectionInfo {
        date,
        remarks: approval.rejection_remarks.clone().unwrap_or_default(),
    });
    let revision = (approval.revision_number > 0).then(|| RevisionInfo {
        number: approval.revision_number,
        date: approval.revision_date,
        remarks: approval.revision_remarks.clone().unwrap_or_default(),
    });

    DocumentView {
        document_number: document.document_number.clone(),
        requester_name: document.requester_name.clone(),
        currency: document.currency.clone(),
        total_amount: document.total_amount(),
        status,
        status_label: status.label(),
        stage_rows,
        pending_stage,
        available_action,
        can_reject: available_action.is_some(),
        rejection,
        revision,
        transfer_date: approval.transfer_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::{Approval, LineItem};

    fn document(kind_total: &[u64]) -> Document {
        Document {
            id: "doc-1".into(),
            document_number: "RB-0001".into(),
            requester_id: "u1".into(),
            requester_name: "Ada Prepare".into(),
            transaction_type: None,
            currency: "IDR".into(),
            line_items: kind_total
                .iter()
                .map(|amount| LineItem {
                    description: "item".into(),
                    amount: *amount,
                })
                .collect(),
            remarks: None,
            submitted_date: Utc::now(),
            approval: Approval::default(),
        }
    }

    #[test]
    fn sums_line_items_and_labels_status() {
        let mut doc = document(&[1_500, 2_500]);
        doc.approval.record_stage(Stage::Prepared, "u1", "Ada Prepare", Utc::now());

        let view = project(DocumentKind::Reimbursement, &doc, "u9");
        assert_eq!(view.total_amount, 4_000);
        assert_eq!(view.status, Stage::Prepared);
        assert_eq!(view.status_label, "Prepared");
        assert_eq!(view.stage_rows.len(), 4);
        assert_eq!(view.available_action, None);
        assert!(!view.can_reject);
    }

    #[test]
    fn assigned_viewer_sees_the_pending_action() {
        let mut doc = document(&[100]);
        doc.approval.record_stage(Stage::Prepared, "u1", "Ada Prepare", Utc::now());
        doc.approval.checked_by = Some("u2".into());

        let view = project(DocumentKind::Reimbursement, &doc, "u2");
        assert_eq!(view.pending_stage, Some(Stage::Checked));
        assert_eq!(view.available_action, Some(ActionKind::Approve));
        assert!(view.can_reject);
    }

    #[test]
    fn rejected_document_projects_the_rejection_panel() {
        let mut doc = document(&[100]);
        doc.approval.record_stage(Stage::Prepared, "u1", "Ada Prepare", Utc::now());
        doc.approval.record_rejection("missing receipt", Utc::now());

        let view = project(DocumentKind::Reimbursement, &doc, "u1");
        assert_eq!(view.status, Stage::Rejected);
        assert_eq!(view.rejection.unwrap().remarks, "missing receipt");
        assert_eq!(view.available_action, None);
    }
}
