//! `devgate-session` — session state and its two external boundaries.
//!
//! The identity provider (credential verification, token lifecycle) and the
//! record store holding role/approval rows (the "directory") are external
//! collaborators, consumed behind traits. This crate owns the machinery in
//! between: the access-profile resolver and the process-wide, subscribable
//! [`SessionStore`] every screen reads its state from.

pub mod directory;
pub mod identity;
pub mod provider;
pub mod resolver;
pub mod state;
pub mod store;

pub use directory::{ApprovalRecord, Directory, DirectoryError, Profile, ReviewUpdate};
pub use identity::{Identity, Session, SessionChange};
pub use provider::{IdentityProvider, ProviderError, SessionEvents, SignUpRequest};
pub use resolver::{resolve_profile, AccessProfile};
pub use state::AccessState;
pub use store::SessionStore;
