//! Client-side engine for a corporate document-approval workflow.
//!
//! Documents (reimbursements, settlements, cash advances, outgoing payments)
//! move through an ordered list of stages, each owned by an assigned actor.
//! The [`stage`] module defines the per-kind stage plans and status
//! derivation, [`gate`] decides who may act, and [`dispatch`] turns user
//! actions into validated transitions against the remote [`store`].

pub mod approval;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod projection;
pub mod remarks;
pub mod stage;
pub mod store;
pub mod utils;
