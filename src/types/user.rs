use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::error::AppError;
use crate::types::permission::{can, Permission, Role};

const MAX_FIELD: usize = 64;

fn required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required.")));
    }
    // the raw value is what gets stored, padding included
    if value.chars().count() > MAX_FIELD {
        return Err(AppError::Validation(format!(
            "{field} must be at most {MAX_FIELD} characters."
        )));
    }
    Ok(())
}

fn email(value: &str) -> Result<(), AppError> {
    required("Email", value)?;
    let plausible = value
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        })
        .unwrap_or(false);
    if !plausible {
        return Err(AppError::Validation("Invalid email address.".to_string()));
    }
    Ok(())
}

fn password_pair(password: &str, confirm: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required.".to_string()));
    }
    if password != confirm {
        return Err(AppError::Validation("Passwords must match.".to_string()));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RRegister {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RRegister {
    pub fn validate(&self) -> Result<(), AppError> {
        required("First name", &self.first_name)?;
        required("Last name", &self.last_name)?;
        email(&self.email)?;
        password_pair(&self.password, &self.password2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RLogin {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRes {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub confirmed: bool,
    /// Landing point of the user's role.
    pub index: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RResetPasswordRequest {
    pub email: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RResetPassword {
    pub email: String,
    pub new_password: String,
    pub new_password2: String,
}

impl RResetPassword {
    pub fn validate(&self) -> Result<(), AppError> {
        email(&self.email)?;
        password_pair(&self.new_password, &self.new_password2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RChangePassword {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

impl RChangePassword {
    pub fn validate(&self) -> Result<(), AppError> {
        password_pair(&self.new_password, &self.new_password2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RChangeEmail {
    pub email: String,
    pub password: String,
}

impl RChangeEmail {
    pub fn validate(&self) -> Result<(), AppError> {
        email(&self.email)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RCreatePassword {
    pub password: String,
    pub password2: String,
}

impl RCreatePassword {
    pub fn validate(&self) -> Result<(), AppError> {
        password_pair(&self.password, &self.password2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RNewUser {
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RNewUser {
    pub fn validate(&self) -> Result<(), AppError> {
        required("Account type", &self.role)?;
        required("First name", &self.first_name)?;
        required("Last name", &self.last_name)?;
        email(&self.email)?;
        password_pair(&self.password, &self.password2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RInviteUser {
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RInviteUser {
    pub fn validate(&self) -> Result<(), AppError> {
        required("Account type", &self.role)?;
        required("First name", &self.first_name)?;
        required("Last name", &self.last_name)?;
        email(&self.email)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RChangeUserEmail {
    pub email: String,
}

impl RChangeUserEmail {
    pub fn validate(&self) -> Result<(), AppError> {
        email(&self.email)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RChangeAccountType {
    pub role: String,
}

/// Insert payload for the store. `role_id` is resolved by the caller; the
/// password is hashed on insert, and `None` leaves the account unusable until
/// an invite is redeemed.
#[derive(Debug, Clone)]
pub struct DBUserCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub confirmed: bool,
    pub role_id: Option<i32>,
}

/// The authenticated principal attached to a request by the bearer guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub confirmed: bool,
    pub role: Option<Role>,
}

impl CurrentUser {
    pub fn permissions(&self) -> Permission {
        self.role.as_ref().map(|r| r.permissions).unwrap_or(Permission::NONE)
    }

    pub fn can(&self, required: Permission) -> bool {
        can(self.permissions(), required)
    }

    pub fn is_admin(&self) -> bool {
        self.can(Permission::ADMINISTER)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub confirmed: bool,
    pub role: Option<String>,
    pub index: Option<String>,
}

impl UserInfo {
    pub fn new(user: &entity::user::Model, role: Option<&entity::role::Model>) -> Self {
        UserInfo {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            confirmed: user.confirmed,
            role: role.map(|r| r.name.clone()),
            index: role.map(|r| r.index.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::permission::RoleKind;

    fn register() -> RRegister {
        RRegister {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "engine".into(),
            password2: "engine".into(),
        }
    }

    #[test]
    fn register_validation() {
        assert!(register().validate().is_ok());

        let mut r = register();
        r.password2 = "other".into();
        assert!(matches!(r.validate(), Err(AppError::Validation(m)) if m == "Passwords must match."));

        let mut r = register();
        r.email = "not-an-email".into();
        assert!(r.validate().is_err());

        let mut r = register();
        r.first_name = "  ".into();
        assert!(r.validate().is_err());

        let mut r = register();
        r.last_name = "x".repeat(65);
        assert!(r.validate().is_err());
    }

    #[test]
    fn padding_counts_toward_the_column_limit() {
        let mut r = register();
        r.first_name = "a".repeat(MAX_FIELD);
        assert!(r.validate().is_ok());

        r.first_name = format!("{} ", "a".repeat(MAX_FIELD));
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));

        let mut r = register();
        r.last_name = format!("  {}", "b".repeat(MAX_FIELD - 1));
        assert!(r.validate().is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(email("a@b.co").is_ok());
        assert!(email("a@b").is_err());
        assert!(email("@b.co").is_err());
        assert!(email("a b@c.de").is_err());
        assert!(email("a@.de").is_err());
    }

    #[test]
    fn principal_without_role_has_no_permissions() {
        let mut user = CurrentUser {
            id: 1,
            email: "a@b.co".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            confirmed: true,
            role: None,
        };
        assert_eq!(user.permissions(), Permission::NONE);
        assert!(!user.can(Permission::GENERAL));

        user.role = Some(Role {
            id: 2,
            kind: RoleKind::Administrator,
            permissions: Permission::ADMINISTER,
            index: "admin".into(),
        });
        assert!(user.is_admin());
        assert!(user.can(Permission::GENERAL));
    }
}
