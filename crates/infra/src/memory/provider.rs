//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use devgate_access::Role;
use devgate_core::UserId;
use devgate_session::{
    Identity, IdentityProvider, Profile, ProviderError, Session, SessionChange, SessionEvents,
    SignUpRequest,
};

use super::directory::InMemoryDirectory;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<String, Account>,
    current: Option<Session>,
    subscribers: Vec<mpsc::UnboundedSender<SessionChange>>,
}

/// In-memory identity provider.
///
/// Intended for tests/dev; credentials are compared in plain text because
/// hashing belongs to a real provider. Paired with an [`InMemoryDirectory`]
/// so that a developer sign-up seeds the profile, role row and pending
/// approval record the way the production trigger does.
pub struct InMemoryIdentityProvider {
    directory: Arc<InMemoryDirectory>,
    state: Mutex<ProviderState>,
    session_query_latency_ms: AtomicU64,
}

impl InMemoryIdentityProvider {
    pub fn new(directory: Arc<InMemoryDirectory>) -> Self {
        Self {
            directory,
            state: Mutex::new(ProviderState::default()),
            session_query_latency_ms: AtomicU64::new(0),
        }
    }

    /// Test knob: delay every `current_session` answer, widening the window
    /// between subscription and seed completion.
    pub fn set_session_query_latency(&self, latency: Duration) {
        self.session_query_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Provision an administrator account: admin role row, profile, and no
    /// approval record. Admins are never self-registered.
    pub fn seed_admin(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: UserId::new(),
            email: email.to_string(),
        };
        self.directory.insert_role_row(identity.id, Role::Admin);
        self.directory.insert_profile(Profile {
            id: identity.id,
            email: email.to_string(),
            full_name: None,
        });
        let mut state = self.lock();
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        identity
    }

    /// Test helper: drop the active session without a sign-out call, as a
    /// provider does on token expiry. Emits a change.
    pub fn expire_session(&self) {
        let mut state = self.lock();
        state.current = None;
        Self::emit(&mut state, SessionChange::Cleared);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(state: &mut ProviderState, change: SessionChange) {
        // Prune subscribers whose receiving end is gone.
        state
            .subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn subscribe(&self) -> SessionEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        SessionEvents::new(rx)
    }

    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        let latency = self.session_query_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        Ok(self.lock().current.clone())
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<(), ProviderError> {
        let identity = {
            let mut state = self.lock();
            if state.accounts.contains_key(&request.email) {
                return Err(ProviderError::AlreadyRegistered);
            }
            let identity = Identity {
                id: UserId::new(),
                email: request.email.clone(),
            };
            state.accounts.insert(
                request.email.clone(),
                Account {
                    password: request.password.clone(),
                    identity: identity.clone(),
                },
            );
            identity
        };

        // Mirror of the production sign-up trigger: profile, developer role
        // row and a single pending approval record.
        self.directory.insert_profile(Profile {
            id: identity.id,
            email: request.email,
            full_name: Some(request.full_name),
        });
        self.directory.insert_role_row(identity.id, Role::Developer);
        self.directory.create_approval(identity.id);
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        let account = state
            .accounts
            .get(email)
            .ok_or(ProviderError::InvalidCredentials)?;
        if account.password != password {
            return Err(ProviderError::InvalidCredentials);
        }
        let session = Session {
            access_token: Uuid::now_v7().to_string(),
            identity: account.identity.clone(),
        };
        state.current = Some(session.clone());
        Self::emit(&mut state, SessionChange::Established(session));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let mut state = self.lock();
        state.current = None;
        Self::emit(&mut state, SessionChange::Cleared);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devgate_session::Directory;

    fn fixture() -> (Arc<InMemoryDirectory>, InMemoryIdentityProvider) {
        let directory = Arc::new(InMemoryDirectory::new());
        let provider = InMemoryIdentityProvider::new(Arc::clone(&directory));
        (directory, provider)
    }

    fn request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            full_name: "Some Dev".to_string(),
        }
    }

    #[tokio::test]
    async fn sign_up_seeds_role_profile_and_one_approval() {
        let (directory, provider) = fixture();
        provider.sign_up(request("dev@example.com")).await.unwrap();

        let approvals = directory.list_approvals().await.unwrap();
        assert_eq!(approvals.len(), 1);
        let user = approvals[0].user_id;
        assert_eq!(directory.roles(user).await.unwrap(), vec![Role::Developer]);
        assert_eq!(directory.profiles(&[user]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_sign_up_fails_without_second_approval_record() {
        let (directory, provider) = fixture();
        provider.sign_up(request("dev@example.com")).await.unwrap();

        let result = provider.sign_up(request("dev@example.com")).await;

        assert_eq!(result, Err(ProviderError::AlreadyRegistered));
        assert_eq!(directory.list_approvals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (_directory, provider) = fixture();
        provider.sign_up(request("dev@example.com")).await.unwrap();

        let result = provider
            .sign_in_with_password("dev@example.com", "wrong")
            .await;
        assert_eq!(result, Err(ProviderError::InvalidCredentials));

        let result = provider
            .sign_in_with_password("nobody@example.com", "hunter22")
            .await;
        assert_eq!(result, Err(ProviderError::InvalidCredentials));
    }

    #[tokio::test]
    async fn sign_in_emits_change_in_order() {
        let (_directory, provider) = fixture();
        provider.sign_up(request("dev@example.com")).await.unwrap();

        let mut events = provider.subscribe();
        provider
            .sign_in_with_password("dev@example.com", "hunter22")
            .await
            .unwrap();
        provider.sign_out().await.unwrap();

        let first = events.next().await.unwrap();
        assert!(matches!(first, SessionChange::Established(_)));
        let second = events.next().await.unwrap();
        assert_eq!(second, SessionChange::Cleared);
    }

    #[tokio::test]
    async fn seed_admin_has_role_row_but_no_approval() {
        let (directory, provider) = fixture();
        let admin = provider.seed_admin("admin@example.com", "s3cret");

        assert_eq!(directory.roles(admin.id).await.unwrap(), vec![Role::Admin]);
        assert_eq!(directory.approval_status(admin.id).await.unwrap(), None);
        assert!(directory.approval_for_user(admin.id).is_none());
    }
}
