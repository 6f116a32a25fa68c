use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;

/// Permission names granted by the API.
pub mod permissions {
    pub const MANAGE_PRODUCTS: &str = "manage_products";
    pub const MANAGE_LOCATIONS: &str = "manage_locations";
    pub const MANAGE_INVOICES: &str = "manage_invoices";
    pub const VIEW_REPORTS: &str = "view_reports";
    pub const MANAGE_SETTINGS: &str = "manage_settings";
    pub const MANAGE_USERS: &str = "manage_users";
    pub const MANAGE_CART: &str = "manage_cart";

    /// Every permission an administrator can assign, in display order.
    pub const ALL: [&str; 7] = [
        MANAGE_PRODUCTS,
        MANAGE_LOCATIONS,
        MANAGE_INVOICES,
        VIEW_REPORTS,
        MANAGE_SETTINGS,
        MANAGE_USERS,
        MANAGE_CART,
    ];
}

/// Roles that may administer users.
pub const ADMIN_ROLES: [&str; 3] = ["admin", "owner", "superadmin"];

/// Roles offered when creating a user or changing a role.
pub const ASSIGNABLE_ROLES: [&str; 4] = ["staff", "admin", "owner", "client"];

#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub password: Secret<String>,
}

/// Response of `/auth/login` and `/auth/demo-login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Response of `/auth/me/permissions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyPermissions {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl MyPermissions {
    pub fn can_administer_users(&self) -> bool {
        self.roles.iter().any(|r| ADMIN_ROLES.contains(&r.as_str()))
    }
}

/// A user as listed by `/auth/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedUser {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ManagedUser {
    pub fn roles_display(&self) -> String {
        if self.roles.is_empty() {
            "Custom".to_string()
        } else {
            self.roles.join(", ")
        }
    }

    pub fn primary_role(&self) -> &str {
        self.roles.first().map(String::as_str).unwrap_or("staff")
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Form and payload for `POST /auth/users`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUserForm {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// Repeated `permission` checkboxes.
#[derive(Debug, Deserialize)]
pub struct PermissionsForm {
    #[serde(default)]
    pub permission: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdate {
    pub user_id: i64,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PermissionUpdate {
    pub user_id: i64,
    pub permissions: Vec<String>,
}
