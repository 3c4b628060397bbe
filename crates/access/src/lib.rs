//! `devgate-access` — pure access model and navigation policy.
//!
//! This crate is intentionally decoupled from the identity provider, the
//! record store and the runtime: every function here is synchronous,
//! side-effect free and deterministic. The session layer produces an
//! [`AccessView`]; screens feed it to [`navigate::decide`] and act on the
//! returned decision.

pub mod approval;
pub mod navigate;
pub mod role;
pub mod view;

pub use approval::ApprovalStatus;
pub use navigate::{decide, Decision, Notice, Redirect, Screen};
pub use role::{effective_role, Role};
pub use view::AccessView;
