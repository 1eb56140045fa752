// Screen Router - which screen the front end shows and how it moves between them

use super::tracking::TrackingId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    Request,
    Track,
    /// Shown once after a submission, carrying the code to hand to the citizen
    Success { tracking_id: TrackingId },
    AdminLogin,
    AdminDashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    GoHome,
    OpenRequestForm,
    OpenTracking,
    Submitted(TrackingId),
    OpenAdmin,
    LoginSucceeded,
    Logout,
}

impl View {
    /// Apply a navigation event
    ///
    /// Returns `None` when the event is not valid from the current screen.
    pub fn apply(&self, event: Navigation) -> Option<View> {
        use Navigation::*;

        match (self, event) {
            (_, GoHome) => Some(View::Home),
            (View::Home | View::Success { .. } | View::Track, OpenRequestForm) => {
                Some(View::Request)
            }
            (View::Home | View::Success { .. } | View::Request, OpenTracking) => {
                Some(View::Track)
            }
            (View::Request, Submitted(tracking_id)) => Some(View::Success { tracking_id }),
            (View::Home, OpenAdmin) => Some(View::AdminLogin),
            (View::AdminLogin, LoginSucceeded) => Some(View::AdminDashboard),
            (View::AdminDashboard, Logout) => Some(View::Home),
            _ => None,
        }
    }

    pub fn requires_staff(&self) -> bool {
        matches!(self, View::AdminDashboard)
    }
}
