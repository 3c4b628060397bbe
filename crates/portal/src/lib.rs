//! `devgate-portal` — the screen layer over the access-gating core.
//!
//! Screens never decide navigation themselves: they feed the current
//! access view to the policy and follow whatever it returns. This crate
//! provides that driver, the sign-in/sign-up form handling with its
//! user-facing error messages, and telemetry setup for the binary.

pub mod forms;
pub mod screens;
pub mod telemetry;

pub use forms::{sign_in_error_message, sign_up_error_message, validate_sign_in, validate_sign_up};
pub use screens::{
    pending_view, submit_sign_in, submit_sign_up, Navigator, PendingView, Submission,
};
