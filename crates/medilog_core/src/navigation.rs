//! crates/medilog_core/src/navigation.rs
//!
//! Role-based menus and the route guard evaluated on every path change.

use crate::domain::{Role, User};
use serde::Serialize;

pub const LANDING_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
}

const fn item(title: &'static str, href: &'static str) -> NavItem {
    NavItem { title, href }
}

static PATIENT_MENU: [NavItem; 6] = [
    item("Dashboard", "/dashboard/patient"),
    item("Record Interaction", "/record"),
    item("Create Flashcards", "/flashcards/create"),
    item("Review Flashcards", "/flashcards/review"),
    item("Medicine Reminders", "/medicine-reminder"),
    item("Search Records", "/search"),
];

static CAREGIVER_MENU: [NavItem; 6] = [
    item("Dashboard", "/dashboard/caregiver"),
    item("Record Interaction", "/record"),
    item("Patient Records", "/patient-records"),
    item("Add New Patient Log", "/patient-log/new"),
    item("Search Records", "/search"),
    item("Settings", "/settings"),
];

impl Role {
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Patient => "/dashboard/patient",
            Role::Caregiver => "/dashboard/caregiver",
        }
    }
}

/// The fixed menu of feature destinations for `role`.
pub fn menu(role: Role) -> &'static [NavItem] {
    match role {
        Role::Patient => &PATIENT_MENU,
        Role::Caregiver => &CAREGIVER_MENU,
    }
}

pub fn is_auth_route(path: &str) -> bool {
    path.contains("/auth")
}

/// Returns where to redirect for `path`, or `None` to stay.
///
/// Signed-in users are bounced off auth routes to their dashboard; anonymous
/// users are sent to login from anything but auth routes and the landing page.
pub fn guard(session: Option<&User>, path: &str) -> Option<String> {
    let auth_route = is_auth_route(path);
    match session {
        Some(user) if auth_route => Some(user.role.dashboard_path().to_string()),
        None if !auth_route && path != LANDING_PATH => Some(LOGIN_PATH.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellItem {
    #[serde(flatten)]
    pub item: NavItem,
    pub active: bool,
}

/// Header and sidebar chrome for a page.
#[derive(Debug, Clone, Serialize)]
pub struct Shell {
    pub user: User,
    pub menu: Vec<ShellItem>,
}

impl Shell {
    pub fn new(user: User, path: &str) -> Self {
        let menu = menu(user.role)
            .iter()
            .map(|item| ShellItem {
                item: item.clone(),
                active: item.href == path,
            })
            .collect();
        Self { user, menu }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn signed_in_users_leave_auth_routes_for_their_dashboard() {
        let patient = user(Role::Patient);
        let caregiver = user(Role::Caregiver);

        assert_eq!(guard(Some(&patient), "/auth/login").as_deref(), Some("/dashboard/patient"));
        assert_eq!(
            guard(Some(&caregiver), "/auth/register").as_deref(),
            Some("/dashboard/caregiver")
        );
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        assert_eq!(guard(None, "/record").as_deref(), Some(LOGIN_PATH));
        assert_eq!(guard(None, "/dashboard/patient").as_deref(), Some(LOGIN_PATH));
    }

    #[test]
    fn landing_and_auth_routes_are_open() {
        assert_eq!(guard(None, "/"), None);
        assert_eq!(guard(None, "/auth/login"), None);
        assert_eq!(guard(Some(&user(Role::Patient)), "/"), None);
        assert_eq!(guard(Some(&user(Role::Patient)), "/flashcards/review"), None);
    }

    #[test]
    fn menus_differ_by_role() {
        let patient: Vec<_> = menu(Role::Patient).iter().map(|i| i.title).collect();
        assert_eq!(
            patient,
            [
                "Dashboard",
                "Record Interaction",
                "Create Flashcards",
                "Review Flashcards",
                "Medicine Reminders",
                "Search Records"
            ]
        );
        assert_eq!(menu(Role::Caregiver)[0].href, "/dashboard/caregiver");
        assert_eq!(menu(Role::Caregiver)[5].title, "Settings");
    }

    #[test]
    fn shell_marks_the_active_item() {
        let shell = Shell::new(user(Role::Caregiver), "/patient-records");
        let active: Vec<_> = shell.menu.iter().filter(|i| i.active).map(|i| i.item.href).collect();
        assert_eq!(active, ["/patient-records"]);
    }
}
