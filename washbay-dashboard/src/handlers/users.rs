use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use super::{finish_mutation, render, PageContext, SelectOption, ViewError};
use crate::models::user::{
    permissions, ManagedUser, NewUserForm, PermissionUpdate, PermissionsForm, RoleForm,
    RoleUpdate, ASSIGNABLE_ROLES,
};
use crate::models::SessionContext;
use crate::AppState;

const BACK: &str = "/users";

/// A managed user with the checkboxes and role options of its row.
pub struct UserRow {
    pub user: ManagedUser,
    pub role_options: Vec<SelectOption>,
    pub permission_boxes: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/users.html")]
pub struct UsersTemplate {
    pub ctx: PageContext,
    pub rows: Vec<UserRow>,
    pub roles: Vec<SelectOption>,
}

fn require_user_admin(context: &SessionContext) -> Result<(), ViewError> {
    if context.is_admin() || context.has_permission(permissions::MANAGE_USERS) {
        Ok(())
    } else {
        tracing::warn!(user = %context.email, "User administration denied");
        Err(ViewError::Forbidden("manage users"))
    }
}

fn role_options(selected: &str) -> Vec<SelectOption> {
    ASSIGNABLE_ROLES
        .iter()
        .map(|role| SelectOption::new(*role, capitalize(role), *role == selected))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn user_row(user: ManagedUser) -> UserRow {
    let permission_boxes = permissions::ALL
        .iter()
        .map(|p| SelectOption::new(*p, p.replace('_', " "), user.has_permission(p)))
        .collect();
    UserRow {
        role_options: role_options(user.primary_role()),
        permission_boxes,
        user,
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    require_user_admin(&context)?;

    let users = state.api.list_users(&context.token).await?;
    let rows = users.into_iter().map(user_row).collect();

    render(&UsersTemplate {
        ctx: PageContext::new(&session, context, "users").await?,
        rows,
        roles: role_options("staff"),
    })
}

pub async fn create_user(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<NewUserForm>,
) -> Result<Response, ViewError> {
    require_user_admin(&context)?;

    let outcome = async move {
        form.validate()?;
        if !ASSIGNABLE_ROLES.contains(&form.role.as_str()) {
            return Err(ViewError::Validation(format!("Unknown role '{}'", form.role)));
        }
        state.api.create_user(&context.token, &form).await?;
        tracing::info!(user = %context.email, new_user = %form.email, role = %form.role, "User created");
        Ok::<_, ViewError>(())
    }
    .await;
    finish_mutation(&session, outcome, BACK, "User created").await
}

pub async fn update_role(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(user_id): Path<i64>,
    Form(form): Form<RoleForm>,
) -> Result<Response, ViewError> {
    require_user_admin(&context)?;

    let outcome = async move {
        if !ASSIGNABLE_ROLES.contains(&form.role.as_str()) {
            return Err(ViewError::Validation(format!("Unknown role '{}'", form.role)));
        }
        let update = RoleUpdate {
            user_id,
            roles: vec![form.role],
        };
        state.api.update_user_roles(&context.token, &update).await?;
        tracing::info!(user = %context.email, target = user_id, "User role changed");
        Ok::<_, ViewError>(())
    }
    .await;
    finish_mutation(&session, outcome, BACK, "Role updated").await
}

pub async fn update_permissions(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(user_id): Path<i64>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<PermissionsForm>,
) -> Result<Response, ViewError> {
    require_user_admin(&context)?;

    let outcome = async move {
        let granted: Vec<String> = form
            .permission
            .into_iter()
            .filter(|p| permissions::ALL.contains(&p.as_str()))
            .collect();
        let update = PermissionUpdate {
            user_id,
            permissions: granted,
        };
        state
            .api
            .update_user_permissions(&context.token, &update)
            .await?;
        tracing::info!(user = %context.email, target = user_id, "User permissions changed");
        Ok::<_, ViewError>(())
    }
    .await;
    finish_mutation(&session, outcome, BACK, "Permissions updated").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_tick_granted_permissions() {
        let row = user_row(ManagedUser {
            user_id: 4,
            email: "staff@carwash.test".to_string(),
            roles: vec!["staff".to_string()],
            permissions: vec!["view_reports".to_string()],
        });

        let ticked: Vec<_> = row
            .permission_boxes
            .iter()
            .filter(|b| b.selected)
            .map(|b| b.value.as_str())
            .collect();
        assert_eq!(ticked, vec!["view_reports"]);
        assert_eq!(row.permission_boxes[3].label, "view reports");
        assert!(row.role_options.iter().any(|o| o.selected && o.value == "staff"));
    }

    #[test]
    fn staff_without_manage_users_is_refused() {
        let mut context = SessionContext::new("t".to_string(), "s@carwash.test".to_string());
        context.roles = vec!["staff".to_string()];
        assert!(require_user_admin(&context).is_err());

        context.roles = vec!["owner".to_string()];
        assert!(require_user_admin(&context).is_ok());
    }

    #[test]
    fn capitalizes_role_labels() {
        assert_eq!(capitalize("owner"), "Owner");
        assert_eq!(capitalize(""), "");
    }
}
