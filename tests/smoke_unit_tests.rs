//! Smoke-screen unit tests for the approval workflow components.
//!
//! These span the crate and test behavior in isolation from the full
//! scenarios; they generally cover the happy path plus the documented
//! refusal conditions.

use approval_flow::{
    approval::{Approval, Document, LineItem},
    dispatch::redirect_path,
    error::Refusal,
    gate::clearance,
    projection::{ActionKind, project},
    remarks::{Edit, RemarkEditor},
    stage::{DocumentKind, Role, Stage},
};
use chrono::Utc;

fn fixture_document(kind_currency: &str) -> Document {
    Document {
        id: "d1".to_string(),
        document_number: "DOC-1".to_string(),
        requester_id: "u1".to_string(),
        requester_name: "Ada Prepare".to_string(),
        transaction_type: None,
        currency: kind_currency.to_string(),
        line_items: vec![LineItem {
            description: "supplies".to_string(),
            amount: 42_000,
        }],
        remarks: None,
        submitted_date: Utc::now(),
        approval: Approval::default(),
    }
}

mod stage_machine_tests {
    use super::*;

    #[test]
    fn canonical_successors() {
        let plan = DocumentKind::CashAdvance.plan();
        assert_eq!(plan.next_stage(Stage::Prepared), Some(Stage::Checked));
        assert_eq!(plan.next_stage(Stage::Received), Some(Stage::Closed));
        assert_eq!(plan.next_stage(Stage::Closed), None);
    }

    #[test]
    fn derivation_walks_from_the_end() {
        let mut approval = Approval::default();
        approval.record_stage(Stage::Prepared, "u1", "One", Utc::now());
        approval.record_stage(Stage::Checked, "u2", "Two", Utc::now());

        let plan = DocumentKind::Settlement.plan();
        assert_eq!(plan.current_stage(&approval), Stage::Checked);
        assert_eq!(plan.pending_stage(&approval), Some(Stage::Acknowledged));
    }

    #[test]
    fn stored_status_label_is_ignored_on_read() {
        let mut approval = Approval::default();
        approval.approval_status = Stage::Approved; // stale or wrong label
        approval.record_stage(Stage::Prepared, "u1", "One", Utc::now());

        let plan = DocumentKind::Reimbursement.plan();
        assert_eq!(plan.current_stage(&approval), Stage::Prepared);
    }

    #[test]
    fn stage_roles_line_up() {
        assert_eq!(Stage::Checked.role(), Some(Role::Checker));
        assert_eq!(Stage::Closed.role(), Some(Role::Closer));
        assert_eq!(Stage::Draft.role(), None);
        assert_eq!(Stage::Rejected.role(), None);
    }
}

mod gate_tests {
    use super::*;

    #[test]
    fn draft_document_waits_for_its_preparer() {
        let mut approval = Approval::default();
        approval.prepared_by = Some("u1".to_string());

        let plan = DocumentKind::Reimbursement.plan();
        assert_eq!(clearance(&plan, &approval, Stage::Prepared, "u1"), Ok(()));
        assert!(matches!(
            clearance(&plan, &approval, Stage::Prepared, "u2"),
            Err(Refusal::NotAuthorized { .. })
        ));
    }

    #[test]
    fn acting_ahead_of_the_pending_stage_is_refused() {
        let mut approval = Approval::default();
        approval.prepared_by = Some("u1".to_string());
        approval.approved_by = Some("u4".to_string());

        let plan = DocumentKind::Reimbursement.plan();
        // the approver cannot jump the queue while the document sits in Draft
        assert!(matches!(
            clearance(&plan, &approval, Stage::Approved, "u4"),
            Err(Refusal::AlreadyProcessed { stage: Stage::Draft })
        ));
    }
}

mod projection_tests {
    use super::*;

    #[test]
    fn receiver_sees_a_receive_action() {
        let mut document = fixture_document("USD");
        for stage in [Stage::Prepared, Stage::Checked, Stage::Approved] {
            document.approval.record_stage(stage, "u0", "Earlier", Utc::now());
        }
        document.approval.received_by = Some("u4".to_string());

        let view = project(DocumentKind::OutgoingPayment, &document, "u4");
        assert_eq!(view.available_action, Some(ActionKind::Receive));
        assert!(view.can_reject);
    }

    #[test]
    fn closer_sees_a_close_action() {
        let mut document = fixture_document("IDR");
        for stage in [
            Stage::Prepared,
            Stage::Checked,
            Stage::Acknowledged,
            Stage::Approved,
            Stage::Received,
        ] {
            document.approval.record_stage(stage, "u0", "Earlier", Utc::now());
        }
        document.approval.closed_by = Some("u6".to_string());

        let view = project(DocumentKind::CashAdvance, &document, "u6");
        assert_eq!(view.available_action, Some(ActionKind::Close));
    }

    #[test]
    fn skipped_stages_produce_no_rows() {
        let document = fixture_document("USD");
        let view = project(DocumentKind::OutgoingPayment, &document, "u1");
        assert!(
            view.stage_rows
                .iter()
                .all(|row| row.stage != Stage::Acknowledged)
        );
    }

    #[test]
    fn revision_panel_appears_after_a_revision() {
        let mut document = fixture_document("USD");
        document.approval.record_revision("fix the total", Utc::now());

        let view = project(DocumentKind::Reimbursement, &document, "u1");
        let revision = view.revision.expect("revision panel");
        assert_eq!(revision.number, 1);
        assert_eq!(revision.remarks, "fix the total");
    }
}

mod remark_editor_tests {
    use super::*;

    #[test]
    fn prefix_carries_name_and_role() {
        let editor = RemarkEditor::seed("Ni Luh", Role::Approver);
        assert_eq!(editor.prefix(), "[Ni Luh - Approver]: ");
    }

    #[test]
    fn typing_appends_to_the_body() {
        let mut editor = RemarkEditor::seed("Ni Luh", Role::Approver);
        let proposed = format!("{}over budget", editor.prefix());
        assert_eq!(editor.apply_input(&proposed), Edit::Accepted);
        assert_eq!(editor.body(), "over budget");
    }

    #[test]
    fn deleting_into_the_prefix_is_reverted() {
        let mut editor = RemarkEditor::seed("Ni Luh", Role::Approver);
        let before = editor.content().to_string();
        let truncated = &before[..before.len() - 2];

        assert!(matches!(editor.apply_input(truncated), Edit::Reverted { .. }));
        assert_eq!(editor.content(), before);
    }
}

mod redirect_tests {
    use super::*;

    #[test]
    fn menu_paths_are_relative_and_closed() {
        assert_eq!(
            redirect_path(DocumentKind::Reimbursement, Role::Preparer),
            "../reimbursement/menu-preparer.html"
        );
        assert_eq!(
            redirect_path(DocumentKind::Settlement, Role::Approver),
            "../settlement/menu-approver.html"
        );
    }
}
