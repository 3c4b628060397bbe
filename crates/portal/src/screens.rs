//! Screen driver: applies the navigation policy and runs the auth forms.

use devgate_access::{decide, AccessView, ApprovalStatus, Decision, Notice, Redirect, Screen};
use devgate_session::{SessionStore, SignUpRequest};

use crate::forms;

/// Tracks which screen is showing and follows the policy's redirects.
///
/// Screens are passive: on every access-state change the surrounding shell
/// calls [`observe`](Navigator::observe) and renders whatever screen the
/// navigator settled on.
#[derive(Debug)]
pub struct Navigator {
    current: Screen,
}

impl Navigator {
    pub fn new(initial: Screen) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Re-evaluate the policy for the current screen, following redirects
    /// to their fixed point. Returns the redirects taken, in order.
    ///
    /// The loop is bounded by the screen count; the policy is cycle-free
    /// for every reachable state, so the bound is never hit in practice.
    pub fn observe(&mut self, view: AccessView) -> Vec<Redirect> {
        let mut hops = Vec::new();
        while let Decision::Redirect(redirect) = decide(view, self.current) {
            match redirect.notice {
                Some(Notice::AccessDenied) => {
                    tracing::warn!(from = %self.current, to = %redirect.to, "access denied");
                }
                None => {
                    tracing::info!(from = %self.current, to = %redirect.to, "redirecting");
                }
            }
            self.current = redirect.to;
            hops.push(redirect);
            if hops.len() > Screen::ALL.len() {
                tracing::error!(screen = %self.current, "navigation did not settle");
                break;
            }
        }
        hops
    }
}

/// What the pending-approval screen renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PendingView {
    /// Application still awaiting review; offers "check status" and
    /// sign-out actions.
    Waiting,
    /// Terminal rejection view, rendered in place with no further redirect.
    Rejected,
}

/// View selection for the pending-approval screen.
pub fn pending_view(view: AccessView) -> PendingView {
    if view.approval == Some(ApprovalStatus::Rejected) {
        PendingView::Rejected
    } else {
        PendingView::Waiting
    }
}

/// Outcome of an auth form submission, as rendered by the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    /// Advisory text for the user; the error never propagates further.
    Rejected(String),
}

/// Run the sign-up form: validate, submit, map failures to advisory text.
pub async fn submit_sign_up(store: &SessionStore, request: SignUpRequest) -> Submission {
    if let Err(e) = forms::validate_sign_up(&request) {
        return Submission::Rejected(e.to_string());
    }
    match store.sign_up(request).await {
        Ok(()) => Submission::Accepted,
        Err(e) => {
            tracing::debug!(error = %e, "sign-up rejected by provider");
            Submission::Rejected(forms::sign_up_error_message(&e))
        }
    }
}

/// Run the sign-in form: validate, submit, map failures to advisory text.
pub async fn submit_sign_in(store: &SessionStore, email: &str, password: &str) -> Submission {
    if let Err(e) = forms::validate_sign_in(email, password) {
        return Submission::Rejected(e.to_string());
    }
    match store.sign_in(email, password).await {
        Ok(()) => Submission::Accepted,
        Err(e) => {
            tracing::debug!(error = %e, "sign-in rejected by provider");
            Submission::Rejected(forms::sign_in_error_message(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devgate_access::Role;

    #[test]
    fn anonymous_on_dashboard_settles_on_sign_in() {
        let mut nav = Navigator::new(Screen::DeveloperDashboard);
        let hops = nav.observe(AccessView::anonymous());
        assert_eq!(hops.len(), 1);
        assert_eq!(nav.current(), Screen::SignIn);
    }

    #[test]
    fn denied_admin_access_chains_to_the_right_dashboard() {
        let view = AccessView::authenticated(Role::Developer, Some(ApprovalStatus::Approved));
        let mut nav = Navigator::new(Screen::AdminDashboard);
        let hops = nav.observe(view);

        // Denied off the admin screen, then routed on from sign-in.
        assert_eq!(hops[0].to, Screen::SignIn);
        assert_eq!(hops[0].notice, Some(Notice::AccessDenied));
        assert_eq!(nav.current(), Screen::DeveloperDashboard);
    }

    #[test]
    fn observe_is_idempotent_once_settled() {
        let view = AccessView::authenticated(Role::Developer, Some(ApprovalStatus::Pending));
        let mut nav = Navigator::new(Screen::DeveloperDashboard);
        nav.observe(view);
        assert_eq!(nav.current(), Screen::PendingApproval);

        let hops = nav.observe(view);
        assert!(hops.is_empty());
        assert_eq!(nav.current(), Screen::PendingApproval);
    }

    #[test]
    fn loading_view_keeps_the_screen() {
        let view = AccessView {
            is_loading: true,
            ..AccessView::anonymous()
        };
        let mut nav = Navigator::new(Screen::AdminDashboard);
        assert!(nav.observe(view).is_empty());
        assert_eq!(nav.current(), Screen::AdminDashboard);
    }

    #[test]
    fn rejected_application_renders_the_terminal_view() {
        let view = AccessView::authenticated(Role::Developer, Some(ApprovalStatus::Rejected));
        let mut nav = Navigator::new(Screen::PendingApproval);

        assert!(nav.observe(view).is_empty());
        assert_eq!(nav.current(), Screen::PendingApproval);
        assert_eq!(pending_view(view), PendingView::Rejected);
    }

    #[test]
    fn waiting_application_renders_the_waiting_view() {
        let view = AccessView::authenticated(Role::Developer, Some(ApprovalStatus::Pending));
        assert_eq!(pending_view(view), PendingView::Waiting);

        let no_record = AccessView::authenticated(Role::Developer, None);
        assert_eq!(pending_view(no_record), PendingView::Waiting);
    }
}
