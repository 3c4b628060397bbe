//! `devgate-approvals` — the admin review side of the gate.
//!
//! Approving or rejecting a developer mutates that developer's approval
//! record in the record store; the applicant's own session picks the change
//! up on its next resolution. The workflow is deliberately decoupled from
//! the session pipeline.

pub mod overview;
pub mod workflow;

pub use overview::{load_overview, Overview, OverviewRow, OverviewStats};
pub use workflow::{approve, reject, Reviewer, WorkflowError};
