//! Navigation policy: one redirect decision per screen per state change.
//!
//! Every protected screen evaluates [`decide`] against the current
//! [`AccessView`] whenever the access state changes. The rules form a
//! first-match-wins table transcribed screen by screen; following redirects
//! always terminates because each redirect target's own rules are satisfied
//! by the state that caused the redirect.
//!
//! - No IO
//! - No panics
//! - No business logic beyond the table itself

use serde::{Deserialize, Serialize};

use crate::approval::ApprovalStatus;
use crate::role::Role;
use crate::view::AccessView;

/// Screens participating in navigation decisions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// General sign-in / sign-up screen for developers.
    SignIn,
    /// Dedicated administrator sign-in screen.
    AdminSignIn,
    /// Admin-only review dashboard.
    AdminDashboard,
    /// Dashboard for approved developers.
    DeveloperDashboard,
    /// Waiting room for developers whose approval is not (yet) granted.
    PendingApproval,
}

impl Screen {
    /// Route path of the screen, as exposed to the surrounding application.
    pub fn path(&self) -> &'static str {
        match self {
            Screen::SignIn => "/auth",
            Screen::AdminSignIn => "/admin/login",
            Screen::AdminDashboard => "/admin",
            Screen::DeveloperDashboard => "/developer",
            Screen::PendingApproval => "/pending",
        }
    }

    pub const ALL: [Screen; 5] = [
        Screen::SignIn,
        Screen::AdminSignIn,
        Screen::AdminDashboard,
        Screen::DeveloperDashboard,
        Screen::PendingApproval,
    ];
}

impl core::fmt::Display for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Advisory message a redirect may carry for the target screen to surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The user reached an admin-only screen without the admin role.
    AccessDenied,
}

/// A required navigation to another screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Screen,
    pub notice: Option<Notice>,
}

/// Outcome of evaluating the policy for one screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Remain on the current screen. For a rejected developer on the
    /// pending-approval screen this is terminal: the screen renders the
    /// rejection view in place and no further redirect is issued.
    Stay,
    /// Navigate to another screen.
    Redirect(Redirect),
}

impl Decision {
    pub fn redirect_target(&self) -> Option<Screen> {
        match self {
            Decision::Stay => None,
            Decision::Redirect(r) => Some(r.to),
        }
    }
}

fn redirect(to: Screen) -> Decision {
    Decision::Redirect(Redirect { to, notice: None })
}

fn redirect_with(to: Screen, notice: Notice) -> Decision {
    Decision::Redirect(Redirect {
        to,
        notice: Some(notice),
    })
}

/// Decide whether `screen` may be shown under `view`.
///
/// First match wins within each screen's rule set. Evaluation is skipped
/// entirely while the view is still loading; deciding on a half-resolved
/// state would bounce users through sign-in on every page load.
pub fn decide(view: AccessView, screen: Screen) -> Decision {
    if view.is_loading {
        return Decision::Stay;
    }

    match screen {
        Screen::AdminDashboard => {
            if !view.is_authenticated {
                return redirect(Screen::AdminSignIn);
            }
            if view.role != Role::Admin {
                return redirect_with(Screen::SignIn, Notice::AccessDenied);
            }
            Decision::Stay
        }

        // The admin sign-in screen routes signed-in users exactly like the
        // general one; anonymous visitors stay and see the form.
        Screen::SignIn | Screen::AdminSignIn => {
            if !view.is_authenticated {
                return Decision::Stay;
            }
            match view.role {
                Role::Admin => redirect(Screen::AdminDashboard),
                Role::Developer if view.approval == Some(ApprovalStatus::Approved) => {
                    redirect(Screen::DeveloperDashboard)
                }
                Role::Developer => redirect(Screen::PendingApproval),
                Role::None => Decision::Stay,
            }
        }

        Screen::DeveloperDashboard => {
            if !view.is_authenticated {
                return redirect(Screen::SignIn);
            }
            match view.role {
                Role::Admin => redirect(Screen::AdminDashboard),
                Role::Developer if view.approval != Some(ApprovalStatus::Approved) => {
                    redirect(Screen::PendingApproval)
                }
                _ => Decision::Stay,
            }
        }

        Screen::PendingApproval => {
            if !view.is_authenticated {
                return redirect(Screen::SignIn);
            }
            if view.role == Role::Admin {
                return redirect(Screen::AdminDashboard);
            }
            if view.approval == Some(ApprovalStatus::Approved) {
                return redirect(Screen::DeveloperDashboard);
            }
            // Pending and rejected both stay; rejected renders the terminal
            // rejection view in place.
            Decision::Stay
        }
    }
}
