//! Process-wide session state store.
//!
//! Single authoritative holder of [`AccessState`], updated by two
//! independent triggers: the provider's change notifications and the
//! one-shot seed query issued at startup. Screens subscribe through a
//! `tokio::sync::watch` receiver and never mutate the state directly; all
//! writes funnel through the handlers in this module.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use devgate_access::Role;
use devgate_core::UserId;

use crate::directory::Directory;
use crate::identity::{Session, SessionChange};
use crate::provider::{IdentityProvider, ProviderError, SignUpRequest};
use crate::resolver::{resolve_profile, AccessProfile};
use crate::state::AccessState;

/// Identifies the session generation a resolution was issued for.
///
/// Every session assignment bumps the store epoch. A resolution result is
/// applied only while both the epoch and the user it was resolved for still
/// match, so a slow resolution finishing after a sign-out or a rapid
/// sign-out/sign-in cannot overwrite newer state.
#[derive(Debug, Copy, Clone)]
struct ResolutionTicket {
    epoch: u64,
    user: UserId,
}

/// Reactive session state store.
///
/// Create with [`SessionStore::start`]; tear down with
/// [`SessionStore::close`].
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    directory: Arc<dyn Directory>,
    state: watch::Sender<AccessState>,
    epoch: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Build the store and run the initialization protocol.
    ///
    /// Order matters: the change subscription is registered (and its
    /// listener task spawned) *before* the one-shot `current_session`
    /// query. Subscribing first guarantees a change emitted while the
    /// one-shot is in flight is still observed; the one-shot only seeds
    /// the initial value and yields to any notification that raced ahead.
    pub async fn start(
        provider: Arc<dyn IdentityProvider>,
        directory: Arc<dyn Directory>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(AccessState::default());
        let store = Arc::new(Self {
            provider,
            directory,
            state,
            epoch: AtomicU64::new(0),
            listener: Mutex::new(None),
        });

        let mut events = store.provider.subscribe();
        let weak = Arc::downgrade(&store);
        let handle = tokio::spawn(async move {
            while let Some(change) = events.next().await {
                let Some(store) = weak.upgrade() else { break };
                store.handle_change(change);
            }
            tracing::debug!("session change listener stopped");
        });
        if let Ok(mut slot) = store.listener.lock() {
            *slot = Some(handle);
        }

        match store.provider.current_session().await {
            Ok(session) => {
                if let Some(ticket) = store.apply_session(session, true) {
                    // Not invoked from inside a provider callback, so
                    // resolution is safe to run inline here.
                    store.resolve_and_apply(ticket).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "initial session query failed, starting anonymous");
                store.state.send_modify(|s| s.is_loading = false);
            }
        }

        store
    }

    /// Subscribe to state changes. The receiver always yields the current
    /// value first via `borrow`.
    pub fn subscribe(&self) -> watch::Receiver<AccessState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AccessState {
        self.state.borrow().clone()
    }

    /// Register a new developer account with the provider.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<(), ProviderError> {
        self.provider.sign_up(request).await
    }

    /// Authenticate with email and password. The resulting state change
    /// arrives through the provider's change notification.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ProviderError> {
        self.provider.sign_in_with_password(email, password).await
    }

    /// End the current session and clear local state immediately rather
    /// than waiting for the provider notification. The epoch bump inside
    /// the clear also invalidates any resolution still in flight.
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        self.provider.sign_out().await?;
        self.apply_session(None, false);
        Ok(())
    }

    /// Re-run profile resolution for the current user without touching the
    /// session. No-op when anonymous. Screens use this to poll for
    /// out-of-band changes such as an approval granted elsewhere.
    pub async fn refresh(&self) {
        let Some(user) = self.state.borrow().user_id() else {
            return;
        };
        let ticket = ResolutionTicket {
            epoch: self.epoch.load(Ordering::SeqCst),
            user,
        };
        self.resolve_and_apply(ticket).await;
    }

    /// Tear down the change subscription. Idempotent.
    pub fn close(&self) {
        if let Ok(mut slot) = self.listener.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    fn handle_change(self: &Arc<Self>, change: SessionChange) {
        if let Some(ticket) = self.apply_session(change.into_session(), false) {
            // Resolution is deliberately scheduled as a separate task, not
            // awaited inside the listener: the provider's internal locking
            // can deadlock when called back into from its own notification
            // path. The spawned task runs after this handler returns.
            self.schedule_resolution(ticket);
        }
    }

    /// Replace session/identity and return a resolution ticket when a user
    /// is present. With `seed` set, the assignment only happens while no
    /// change notification has been applied yet; a notification that raced
    /// ahead of the one-shot query wins.
    fn apply_session(&self, session: Option<Session>, seed: bool) -> Option<ResolutionTicket> {
        let mut ticket = None;
        self.state.send_modify(|state| {
            if seed && self.epoch.load(Ordering::SeqCst) != 0 {
                state.is_loading = false;
                return;
            }
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            state.identity = session.as_ref().map(|s| s.identity.clone());
            state.session = session.clone();
            match state.user_id() {
                Some(user) => {
                    ticket = Some(ResolutionTicket { epoch, user });
                }
                None => {
                    state.role = Role::None;
                    state.approval = None;
                }
            }
            state.is_loading = false;
        });
        ticket
    }

    fn schedule_resolution(self: &Arc<Self>, ticket: ResolutionTicket) {
        let weak = Arc::downgrade(self);
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move {
            let profile = resolve_profile(directory.as_ref(), ticket.user).await;
            if let (Some(store), Some(profile)) = (weak.upgrade(), profile) {
                store.apply_profile(ticket, profile);
            }
        });
    }

    async fn resolve_and_apply(&self, ticket: ResolutionTicket) {
        if let Some(profile) = resolve_profile(self.directory.as_ref(), ticket.user).await {
            self.apply_profile(ticket, profile);
        }
    }

    /// Apply a resolved profile as one atomic pair, unless the store moved
    /// on to another session generation or another user in the meantime.
    fn apply_profile(&self, ticket: ResolutionTicket, profile: AccessProfile) {
        self.state.send_modify(|state| {
            if self.epoch.load(Ordering::SeqCst) != ticket.epoch {
                tracing::debug!(user = %ticket.user, "discarding stale profile resolution");
                return;
            }
            if state.user_id() != Some(ticket.user) {
                return;
            }
            state.role = profile.role;
            state.approval = profile.approval;
        });
    }
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .field("epoch", &self.epoch.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
