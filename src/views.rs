//! Route renderer.
//!
//! Turns a `Navigation` into an HTTP response: an HTML shell that mounts the view's client
//! bundle, or a `303 See Other`. The screens themselves live in the client bundle; this module
//! only knows each view's id, title and layout.

use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::{Map, Value};

use crate::{
    config::AppConfig,
    navigator::{MountedView, Navigation},
};

/// Layout
///
/// The chrome a view is mounted inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Sidebar + navbar of the HR/admin console.
    Main,
    /// Sidebar of the employee self-service area.
    Employee,
    /// No chrome (login and terminal pages).
    Bare,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Main => "main",
            Layout::Employee => "employee",
            Layout::Bare => "bare",
        }
    }
}

/// ViewRef
///
/// Opaque reference to a console screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewRef {
    Login,
    AccessDenied,
    NotFound,
    Dashboard,
    Employees,
    Departments,
    Leaves,
    Salary,
    Resources,
    Training,
    Settings,
    AdminProfile,
    EmployeeProfileView,
    EditEmployee,
    AddEmployee,
    EmployeeDashboard,
    EmployeeProfile,
    EmployeeLeaves,
    EmployeeSalary,
    EmployeeResources,
    EmployeeTraining,
}

impl ViewRef {
    /// Stable identifier the client bundle mounts by.
    pub fn id(self) -> &'static str {
        match self {
            ViewRef::Login => "login",
            ViewRef::AccessDenied => "access-denied",
            ViewRef::NotFound => "not-found",
            ViewRef::Dashboard => "dashboard",
            ViewRef::Employees => "employees",
            ViewRef::Departments => "departments",
            ViewRef::Leaves => "leaves",
            ViewRef::Salary => "salary",
            ViewRef::Resources => "resources",
            ViewRef::Training => "training",
            ViewRef::Settings => "settings",
            ViewRef::AdminProfile => "admin-profile",
            ViewRef::EmployeeProfileView => "employee-profile-view",
            ViewRef::EditEmployee => "edit-employee",
            ViewRef::AddEmployee => "add-employee",
            ViewRef::EmployeeDashboard => "employee-dashboard",
            ViewRef::EmployeeProfile => "employee-profile",
            ViewRef::EmployeeLeaves => "employee-leaves",
            ViewRef::EmployeeSalary => "employee-salary",
            ViewRef::EmployeeResources => "employee-resources",
            ViewRef::EmployeeTraining => "employee-training",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewRef::Login => "Sign in",
            ViewRef::AccessDenied => "Access Denied",
            ViewRef::NotFound => "Page Not Found",
            ViewRef::Dashboard => "Dashboard",
            ViewRef::Employees => "Employees",
            ViewRef::Departments => "Departments",
            ViewRef::Leaves => "Leaves",
            ViewRef::Salary => "Salary",
            ViewRef::Resources => "Resources",
            ViewRef::Training => "Training",
            ViewRef::Settings => "Settings",
            ViewRef::AdminProfile => "My Profile",
            ViewRef::EmployeeProfileView => "Employee Profile",
            ViewRef::EditEmployee => "Edit Employee",
            ViewRef::AddEmployee => "Add Employee",
            ViewRef::EmployeeDashboard => "My Dashboard",
            ViewRef::EmployeeProfile => "My Profile",
            ViewRef::EmployeeLeaves => "My Leaves",
            ViewRef::EmployeeSalary => "My Salary",
            ViewRef::EmployeeResources => "My Resources",
            ViewRef::EmployeeTraining => "My Training",
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            ViewRef::Login | ViewRef::AccessDenied | ViewRef::NotFound => Layout::Bare,
            ViewRef::EmployeeDashboard
            | ViewRef::EmployeeProfile
            | ViewRef::EmployeeLeaves
            | ViewRef::EmployeeSalary
            | ViewRef::EmployeeResources
            | ViewRef::EmployeeTraining => Layout::Employee,
            _ => Layout::Main,
        }
    }

    pub fn default_status(self) -> StatusCode {
        match self {
            ViewRef::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        }
    }

    /// Server-side copy for pages that must read correctly before the bundle loads.
    fn body_copy(self) -> Option<&'static str> {
        match self {
            ViewRef::AccessDenied => {
                Some("Sorry, you don't have permission to access this page.")
            }
            ViewRef::NotFound => Some("The page you are looking for does not exist."),
            _ => None,
        }
    }
}

/// render
///
/// Mounts the view or redirects. Redirects use `303 See Other`, so the denied URL is replaced
/// rather than kept in the browser history.
pub fn render(navigation: Navigation, config: &AppConfig) -> Response {
    match navigation {
        Navigation::Redirect(path) => Redirect::to(path).into_response(),
        Navigation::Mount(mounted) => {
            let status = mounted.status;
            let page = shell(&mounted, &config.asset_base_url);
            (status, [(header::CACHE_CONTROL, "no-store")], Html(page)).into_response()
        }
    }
}

fn shell(mounted: &MountedView, asset_base_url: &str) -> String {
    let view = mounted.view;
    let params: Map<String, Value> = mounted
        .params
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    let params = Value::Object(params).to_string();
    let assets = asset_base_url.trim_end_matches('/');

    let mut content = String::new();
    if let Some(copy) = view.body_copy() {
        content.push_str(&format!(
            "<main class=\"terminal\"><h1>{}</h1><p>{}</p><a href=\"{}\">Back to Dashboard</a></main>",
            escape_html(view.title()),
            escape_html(copy),
            escape_html(mounted.home),
        ));
    }
    if view == ViewRef::Login {
        content.push_str(&login_form(mounted.notice.as_deref()));
    } else if let Some(notice) = &mounted.notice {
        content.push_str(&format!(
            "<p class=\"notice\" role=\"alert\">{}</p>",
            escape_html(notice)
        ));
    }

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | EMS</title>\n\
         <link rel=\"stylesheet\" href=\"{assets}/console.css\">\n</head>\n\
         <body>\n<div id=\"root\" data-view=\"{id}\" data-layout=\"{layout}\" \
         data-home=\"{home}\" data-params=\"{params}\">{content}</div>\n\
         <script type=\"module\" src=\"{assets}/console.js\"></script>\n</body>\n</html>\n",
        title = escape_html(view.title()),
        assets = escape_html(assets),
        id = view.id(),
        layout = view.layout().as_str(),
        home = escape_html(mounted.home),
        params = escape_html(&params),
        content = content,
    )
}

fn login_form(notice: Option<&str>) -> String {
    let alert = notice
        .map(|message| {
            format!(
                "<p class=\"notice\" role=\"alert\">{}</p>",
                escape_html(message)
            )
        })
        .unwrap_or_default();
    format!(
        "<form class=\"login\" method=\"post\" action=\"/login\">{alert}\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Sign in</button></form>"
    )
}

/// escape_html
///
/// Escapes text for both element content and double-quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
