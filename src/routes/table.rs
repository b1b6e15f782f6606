use crate::{guard::Capability, views::ViewRef};

/// RouteTarget
///
/// What a matched route resolves to: a view, or the role-dependent landing redirect at `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewRef),
    RootRedirect,
}

/// RouteDefinition
///
/// One row of the console's route table. Path segments starting with `:` capture a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: &'static str,
    pub capability: Capability,
    pub target: RouteTarget,
}

const fn view(path: &'static str, capability: Capability, view: ViewRef) -> RouteDefinition {
    RouteDefinition {
        path,
        capability,
        target: RouteTarget::View(view),
    }
}

/// ROUTE_TABLE
///
/// Every console route with the capability it requires. Fixed at build time.
pub const ROUTE_TABLE: &[RouteDefinition] = &[
    RouteDefinition {
        path: "/",
        capability: Capability::Public,
        target: RouteTarget::RootRedirect,
    },
    view("/login", Capability::Public, ViewRef::Login),
    view("/access-denied", Capability::Public, ViewRef::AccessDenied),
    // HR and admin screens (main layout)
    view("/dashboard", Capability::HrOrAdmin, ViewRef::Dashboard),
    view("/employees", Capability::HrOrAdmin, ViewRef::Employees),
    view("/departments", Capability::HrOrAdmin, ViewRef::Departments),
    view("/leaves", Capability::HrOrAdmin, ViewRef::Leaves),
    view("/salary", Capability::HrOrAdmin, ViewRef::Salary),
    view("/resources", Capability::HrOrAdmin, ViewRef::Resources),
    view("/training", Capability::HrOrAdmin, ViewRef::Training),
    view("/settings", Capability::Admin, ViewRef::Settings),
    view("/admin-profile/:id", Capability::HrOrAdmin, ViewRef::AdminProfile),
    view("/profile/:eid", Capability::HrOrAdmin, ViewRef::EmployeeProfileView),
    view("/employees/edit/:eid", Capability::HrOrAdmin, ViewRef::EditEmployee),
    view("/add-employee", Capability::HrOrAdmin, ViewRef::AddEmployee),
    // Employee self-service screens (employee layout)
    view("/employee-dashboard", Capability::Employee, ViewRef::EmployeeDashboard),
    view("/employee-profile", Capability::Employee, ViewRef::EmployeeProfile),
    view("/employee-leaves", Capability::Employee, ViewRef::EmployeeLeaves),
    view("/employee-salary", Capability::Employee, ViewRef::EmployeeSalary),
    view("/employee-resources", Capability::Employee, ViewRef::EmployeeResources),
    view("/employee-training", Capability::Employee, ViewRef::EmployeeTraining),
];

/// The catch-all row applied when nothing in the table matches.
pub const UNMATCHED_ROUTE: RouteDefinition = RouteDefinition {
    path: "*",
    capability: Capability::Public,
    target: RouteTarget::View(ViewRef::NotFound),
};

/// RouteMatch
///
/// A table row together with the parameters captured from the requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDefinition,
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// normalize_path
///
/// Drops the query string and a single trailing slash (except on the root path).
pub fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() {
        return "/";
    }
    match path.strip_suffix('/') {
        Some("") | None => path,
        Some(trimmed) => trimmed,
    }
}

/// match_route
///
/// Finds the first table row whose pattern matches `path` segment by segment, falling back to
/// `UNMATCHED_ROUTE`. Parameter segments must be non-empty.
pub fn match_route(path: &str) -> RouteMatch {
    let path = normalize_path(path);
    let requested: Vec<&str> = path.split('/').collect();

    for route in ROUTE_TABLE {
        let pattern: Vec<&str> = route.path.split('/').collect();
        if pattern.len() != requested.len() {
            continue;
        }

        let mut params = Vec::new();
        let matched = pattern.iter().zip(&requested).all(|(expected, actual)| {
            match expected.strip_prefix(':') {
                Some(name) if !actual.is_empty() => {
                    params.push((name.to_string(), actual.to_string()));
                    true
                }
                Some(_) => false,
                None => expected == actual,
            }
        });

        if matched {
            return RouteMatch {
                route: *route,
                params,
            };
        }
    }

    RouteMatch {
        route: UNMATCHED_ROUTE,
        params: Vec::new(),
    }
}

/// capability_for
///
/// Capability of the route that would serve `path`.
pub fn capability_for(path: &str) -> Capability {
    match_route(path).route.capability
}
