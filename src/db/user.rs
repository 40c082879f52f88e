use crate::db::postgres_service::PostgresService;
use crate::types::{
    error::{is_unique_violation, AppError},
    permission::Role as RoleInfo,
    token::ActionKind,
    user::{CurrentUser, DBUserCreate},
};
use crate::utils::{
    password::{hash_password, verify_password},
    token::{TokenError, TokenSigner},
};
use chrono::Utc;
use entity::role::{Entity as Role, Model as RoleModel};
use entity::user::{ActiveModel as UserActive, Entity as User, Model as UserModel};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use tracing::{debug, info};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

impl PostgresService {
    pub async fn user_exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(User::find()
            .filter(entity::user::Column::Email.eq(email))
            .count(&self.database_connection)
            .await?
            > 0)
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<UserModel, AppError> {
        Ok(User::find_by_id(id)
            .one(&self.database_connection)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User does not exist".into()))?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserModel, AppError> {
        Ok(User::find()
            .filter(entity::user::Column::Email.eq(email))
            .one(&self.database_connection)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User does not exist".into()))?)
    }

    pub async fn get_user_with_role(&self, id: i32) -> Result<(UserModel, Option<RoleModel>), AppError> {
        Ok(User::find_by_id(id)
            .find_also_related(Role)
            .one(&self.database_connection)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User does not exist".into()))?)
    }

    pub async fn list_users_with_roles(&self) -> Result<Vec<(UserModel, Option<RoleModel>)>, AppError> {
        Ok(User::find()
            .find_also_related(Role)
            .order_by_asc(entity::user::Column::Id)
            .all(&self.database_connection)
            .await?)
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        Ok(User::find().count(&self.database_connection).await?)
    }

    /// Signup and admin creation. A duplicate email becomes `AlreadyExists`,
    /// whether caught by the pre-check or by the unique index.
    pub async fn create_user(&self, payload: DBUserCreate) -> Result<UserModel, AppError> {
        if self.user_exists_by_email(&payload.email).await? {
            return Err(AppError::AlreadyExists);
        }
        let password_hash = payload.password.as_deref().map(hash).transpose()?;
        let now = Utc::now();
        let txn = self.database_connection.begin().await?;

        let user = UserActive {
            confirmed: Set(payload.confirmed),
            first_name: Set(payload.first_name),
            last_name: Set(payload.last_name),
            email: Set(payload.email),
            password_hash: Set(password_hash),
            role_id: Set(payload.role_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created user {} <{}>", user.id, user.email);
        Ok(user)
    }

    /// Same error for unknown email, missing password and wrong password.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserModel, AppError> {
        let user = match self.get_user_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound) => return Err(AppError::Unauthorized(BAD_CREDENTIALS.into())),
            Err(e) => return Err(e),
        };
        let Some(stored) = user.password_hash.as_deref() else {
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        };
        let ok = verify_password(password, stored)
            .map_err(|e| AppError::Internal(format!("stored hash unreadable: {e}")))?;
        if !ok {
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        }
        Ok(user)
    }

    pub async fn load_current_user(&self, id: i32) -> Result<CurrentUser, AppError> {
        let (user, role) = self.get_user_with_role(id).await?;
        let role = role.as_ref().map(RoleInfo::from_model).transpose()?;
        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            confirmed: user.confirmed,
            role,
        })
    }

    pub async fn set_password(&self, user_id: i32, password: &str) -> Result<(), AppError> {
        let password_hash = hash(password)?;
        let mut am: UserActive = self.get_user_by_id(user_id).await?.into();
        am.password_hash = Set(Some(password_hash));
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.database_connection).await.map(|_| ())?)
    }

    pub async fn set_email(&self, user_id: i32, email: String) -> Result<(), AppError> {
        if self.user_exists_by_email(&email).await? {
            return Err(AppError::Validation("Email already registered.".into()));
        }
        let mut am: UserActive = self.get_user_by_id(user_id).await?.into();
        am.email = Set(email);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.database_connection).await.map(|_| ())?)
    }

    pub async fn set_role(&self, user_id: i32, role_id: i32) -> Result<(), AppError> {
        let mut am: UserActive = self.get_user_by_id(user_id).await?.into();
        am.role_id = Set(Some(role_id));
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.database_connection).await.map(|_| ())?)
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        let res = User::delete_by_id(user_id)
            .exec(&self.database_connection)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        info!("Deleted user {user_id}");
        Ok(())
    }

    // Token redemption. The signer only says yes or no; the state change happens here.

    pub async fn confirm_account(&self, signer: &TokenSigner, user_id: i32, token: &str) -> Result<(), AppError> {
        signer.redeem(token, ActionKind::Confirm, user_id)?;
        let mut am: UserActive = self.get_user_by_id(user_id).await?.into();
        am.confirmed = Set(true);
        am.updated_at = Set(Utc::now());
        am.update(&self.database_connection).await?;
        debug!("Confirmed user {user_id}");
        Ok(())
    }

    /// Unknown email is reported like a bad token so the endpoint does not reveal accounts.
    pub async fn reset_password(
        &self,
        signer: &TokenSigner,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = match self.get_user_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound) => return Err(AppError::InvalidToken),
            Err(e) => return Err(e),
        };
        signer.redeem(token, ActionKind::Reset, user.id)?;
        self.set_password(user.id, new_password).await
    }

    pub async fn change_email(&self, signer: &TokenSigner, user_id: i32, token: &str) -> Result<String, AppError> {
        let claims = signer.redeem_with(token, ActionKind::ChangeEmail, user_id, |c| {
            c.new_email.as_deref().is_some_and(|e| !e.is_empty())
        })?;
        let new_email = claims.new_email.ok_or(TokenError::Rejected)?;

        if self.user_exists_by_email(&new_email).await? {
            return Err(TokenError::Rejected.into());
        }

        let mut am: UserActive = self.get_user_by_id(user_id).await?.into();
        am.email = Set(new_email.clone());
        am.updated_at = Set(Utc::now());
        match am.update(&self.database_connection).await {
            Ok(_) => Ok(new_email),
            // lost a race with another signup for the same address
            Err(err) if is_unique_violation(&err) => Err(TokenError::Rejected.into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Confirms an invited account and sets its first password in one update.
    pub async fn join_from_invite(
        &self,
        signer: &TokenSigner,
        user_id: i32,
        token: &str,
        password: &str,
    ) -> Result<(), AppError> {
        let user = self.get_user_by_id(user_id).await?;
        if user.password_hash.is_some() {
            return Err(AppError::Conflict("You have already joined.".into()));
        }
        signer.redeem(token, ActionKind::Confirm, user.id)?;

        let password_hash = hash(password)?;
        let mut am: UserActive = user.into();
        am.confirmed = Set(true);
        am.password_hash = Set(Some(password_hash));
        am.updated_at = Set(Utc::now());
        am.update(&self.database_connection).await?;
        Ok(())
    }
}
