//! Document and approval records as the REST document store shapes them.
//!
//! The approval record carries one by/by-name/date triplet per stage slot.
//! Updates are destructive replaces against the store, so every transition
//! must copy the whole record forward and touch exactly one triplet; that
//! contract lives in [`Approval::record_stage`].
use crate::stage::Stage;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    /// Amount in minor units of the document currency.
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub document_number: String,
    pub requester_id: String,
    pub requester_name: String,
    #[serde(default)]
    pub transaction_type: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub remarks: Option<String>,
    pub submitted_date: DateTime<Utc>,
    pub approval: Approval,
}

impl Document {
    pub fn total_amount(&self) -> u64 {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Approval {
    /// Stored status label. Display logic derives its own stage from the
    /// recorded dates and ignores this on read.
    pub approval_status: Stage,

    pub prepared_by: Option<String>,
    pub prepared_by_name: Option<String>,
    pub prepared_date: Option<DateTime<Utc>>,

    pub checked_by: Option<String>,
    pub checked_by_name: Option<String>,
    pub checked_date: Option<DateTime<Utc>>,

    pub acknowledged_by: Option<String>,
    pub acknowledged_by_name: Option<String>,
    pub acknowledged_date: Option<DateTime<Utc>>,

    pub approved_by: Option<String>,
    pub approved_by_name: Option<String>,
    pub approved_date: Option<DateTime<Utc>>,

    pub received_by: Option<String>,
    pub received_by_name: Option<String>,
    pub received_date: Option<DateTime<Utc>>,

    pub closed_by: Option<String>,
    pub closed_by_name: Option<String>,
    pub closed_date: Option<DateTime<Utc>>,

    pub rejected_date: Option<DateTime<Utc>>,
    pub rejection_remarks: Option<String>,

    pub revision_number: u32,
    pub revision_date: Option<DateTime<Utc>>,
    pub revision_remarks: Option<String>,

    /// Outgoing payments only, entered when the receiver confirms transfer.
    pub transfer_date: Option<NaiveDate>,
}

impl Approval {
    /// The user assigned to act at `stage`.
    pub fn stage_actor(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Prepared => self.prepared_by.as_deref(),
            Stage::Checked => self.checked_by.as_deref(),
            Stage::Acknowledged => self.acknowledged_by.as_deref(),
            Stage::Approved => self.approved_by.as_deref(),
            Stage::Received => self.received_by.as_deref(),
            Stage::Closed => self.closed_by.as_deref(),
            Stage::Draft | Stage::Rejected => None,
        }
    }

    pub fn stage_actor_name(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Prepared => self.prepared_by_name.as_deref(),
            Stage::Checked => self.checked_by_name.as_deref(),
            Stage::Acknowledged => self.acknowledged_by_name.as_deref(),
            Stage::Approved => self.approved_by_name.as_deref(),
            Stage::Received => self.received_by_name.as_deref(),
            Stage::Closed => self.closed_by_name.as_deref(),
            Stage::Draft | Stage::Rejected => None,
        }
    }

    pub fn stage_date(&self, stage: Stage) -> Option<DateTime<Utc>> {
        match stage {
            Stage::Prepared => self.prepared_date,
            Stage::Checked => self.checked_date,
            Stage::Acknowledged => self.acknowledged_date,
            Stage::Approved => self.approved_date,
            Stage::Received => self.received_date,
            Stage::Closed => self.closed_date,
            Stage::Draft | Stage::Rejected => None,
        }
    }

    /// Write one stage triplet, leaving every other field as loaded. The
    /// caller clones the fetched record first; nothing else may be touched
    /// or the destructive replace loses it.
    pub fn record_stage(&mut self, stage: Stage, actor_id: &str, actor_name: &str, at: DateTime<Utc>) {
        let (by, by_name, date) = match stage {
            Stage::Prepared => (
                &mut self.prepared_by,
                &mut self.prepared_by_name,
                &mut self.prepared_date,
            ),
            Stage::Checked => (
                &mut self.checked_by,
                &mut self.checked_by_name,
                &mut self.checked_date,
            ),
            Stage::Acknowledged => (
                &mut self.acknowledged_by,
                &mut self.acknowledged_by_name,
                &mut self.acknowledged_date,
            ),
            Stage::Approved => (
                &mut self.approved_by,
                &mut self.approved_by_name,
                &mut self.approved_date,
            ),
            Stage::Received => (
                &mut self.received_by,
                &mut self.received_by_name,
                &mut self.received_date,
            ),
            Stage::Closed => (
                &mut self.closed_by,
                &mut self.closed_by_name,
                &mut self.closed_date,
            ),
            // not stage slots
            Stage::Draft | Stage::Rejected => return,
        };
        *by = Some(actor_id.to_string());
        *by_name = Some(actor_name.to_string());
        *date = Some(at);
    }

    pub fn record_rejection(&mut self, remarks: &str, at: DateTime<Utc>) {
        self.rejected_date = Some(at);
        self.rejection_remarks = Some(remarks.to_string());
    }

    /// Append revision remarks and bump the revision counter. The stage
    /// dates and status label stay as they are; the remote side routes the
    /// document back to the actor being asked for the correction.
    pub fn record_revision(&mut self, remarks: &str, at: DateTime<Utc>) {
        self.revision_number += 1;
        self.revision_date = Some(at);
        self.revision_remarks = Some(match self.revision_remarks.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{remarks}"),
            _ => remarks.to_string(),
        });
    }
}
