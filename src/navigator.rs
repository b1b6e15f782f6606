use axum::http::StatusCode;
use tracing::debug;

use crate::{
    guard::{self, AuthDecision, DASHBOARD_PATH, EMPLOYEE_DASHBOARD_PATH, LOGIN_PATH},
    models::{Role, Session},
    routes::table::{self, RouteTarget},
    views::ViewRef,
};

/// MountedView
///
/// Everything the renderer needs to mount an allowed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedView {
    pub view: ViewRef,
    pub params: Vec<(String, String)>,
    /// Landing path of the current session, used by the terminal pages' "back" link.
    pub home: &'static str,
    /// Message shown on the page itself (e.g. a failed login).
    pub notice: Option<String>,
    pub status: StatusCode,
}

impl MountedView {
    pub fn new(view: ViewRef, session: &Session) -> Self {
        Self {
            view,
            params: Vec::new(),
            home: resolve_root(session),
            notice: None,
            status: view.default_status(),
        }
    }

    pub fn with_notice(mut self, status: StatusCode, notice: impl Into<String>) -> Self {
        self.status = status;
        self.notice = Some(notice.into());
        self
    }
}

/// Navigation
///
/// The resolved outcome of a navigation request, consumed by `views::render`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Mount(MountedView),
    Redirect(&'static str),
}

/// resolve_root
///
/// The landing page for a session: the login page when signed out, the self-service dashboard
/// for employees, the HR dashboard for everyone else.
pub fn resolve_root(session: &Session) -> &'static str {
    if !session.is_authenticated {
        LOGIN_PATH
    } else if session.role == Role::Employee {
        EMPLOYEE_DASHBOARD_PATH
    } else {
        DASHBOARD_PATH
    }
}

/// navigate
///
/// Resolves a requested path for a session: route table lookup, root delegation, then the guard.
pub fn navigate(session: &Session, path: &str) -> Navigation {
    let matched = table::match_route(path);

    match guard::authorize(session, matched.route.capability) {
        AuthDecision::RedirectTo(target) => {
            debug!(
                path,
                target,
                role = session.role.as_str(),
                "navigation redirected by guard"
            );
            Navigation::Redirect(target)
        }
        AuthDecision::Allow => match matched.route.target {
            RouteTarget::RootRedirect => Navigation::Redirect(resolve_root(session)),
            RouteTarget::View(view) => {
                let mut mounted = MountedView::new(view, session);
                mounted.params = matched.params;
                Navigation::Mount(mounted)
            }
        },
    }
}
