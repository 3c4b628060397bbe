//! Demo walkthrough of the access gate against the in-memory adapters.
//!
//! Seeds an administrator, registers a developer, and follows the
//! navigation policy from sign-up through approval to the developer
//! dashboard. Run with `RUST_LOG=debug` for the full trace.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use devgate_access::{Role, Screen};
use devgate_approvals::{approve, load_overview, Reviewer};
use devgate_infra::{InMemoryDirectory, InMemoryIdentityProvider};
use devgate_portal::{pending_view, submit_sign_in, submit_sign_up, telemetry, Navigator, Submission};
use devgate_session::{AccessState, SessionStore, SignUpRequest};

/// Wait until the store state satisfies `pred`.
async fn wait_for(store: &SessionStore, pred: impl Fn(&AccessState) -> bool) -> anyhow::Result<()> {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .context("timed out waiting for access state")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let directory = Arc::new(InMemoryDirectory::new());
    let provider = Arc::new(InMemoryIdentityProvider::new(Arc::clone(&directory)));
    let admin = provider.seed_admin("admin@devgate.example", "admin-password");
    tracing::info!(admin = %admin.email, "seeded administrator");

    let store = SessionStore::start(provider, Arc::clone(&directory) as _).await;

    // An anonymous visitor tries the developer dashboard.
    let mut nav = Navigator::new(Screen::DeveloperDashboard);
    nav.observe(store.state().view());
    tracing::info!(screen = %nav.current(), "anonymous visitor settled");

    // A developer registers and signs in.
    let request = SignUpRequest {
        email: "dev@devgate.example".to_string(),
        password: "hunter22".to_string(),
        full_name: "Dev Example".to_string(),
    };
    match submit_sign_up(&store, request).await {
        Submission::Accepted => tracing::info!("registration accepted, awaiting review"),
        Submission::Rejected(message) => bail!("registration failed: {message}"),
    }
    match submit_sign_in(&store, "dev@devgate.example", "hunter22").await {
        Submission::Accepted => {}
        Submission::Rejected(message) => bail!("sign-in failed: {message}"),
    }
    wait_for(&store, |s| s.role == Role::Developer).await?;

    nav.observe(store.state().view());
    tracing::info!(
        screen = %nav.current(),
        view = ?pending_view(store.state().view()),
        "developer settled"
    );

    // The administrator reviews the application in another session.
    let overview = load_overview(directory.as_ref()).await?;
    tracing::info!(
        total = overview.stats.total,
        pending = overview.stats.pending,
        "loaded review overview"
    );
    let application = overview
        .rows
        .first()
        .context("expected one pending application")?;
    let reviewer = Reviewer::new(admin.id, Role::Admin);
    approve(directory.as_ref(), &reviewer, application.record.id).await?;

    // The developer checks their status.
    store.refresh().await;
    nav.observe(store.state().view());
    tracing::info!(screen = %nav.current(), "developer settled after approval");

    store.sign_out().await?;
    nav.observe(store.state().view());
    tracing::info!(screen = %nav.current(), "signed out");

    store.close();
    Ok(())
}
