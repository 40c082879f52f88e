use crate::db::postgres_service::PostgresService;
use crate::types::{error::AppError, permission::{Permission, RoleKind}};
use entity::role::{ActiveModel as RoleActive, Entity as Role, Model as RoleModel};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

impl PostgresService {
    /// Seeds every `RoleKind`, updating rows that already exist by name. Safe to rerun.
    pub async fn insert_roles(&self) -> Result<Vec<RoleModel>, AppError> {
        let txn = self.database_connection.begin().await?;
        let mut seeded = Vec::with_capacity(RoleKind::ALL.len());

        for kind in RoleKind::ALL {
            let existing = Role::find()
                .filter(entity::role::Column::Name.eq(kind.name()))
                .one(&txn)
                .await?;

            let model = match existing {
                Some(role) => {
                    let mut am: RoleActive = role.into();
                    am.permissions = Set(kind.permissions().bits());
                    am.index = Set(kind.index().to_string());
                    am.is_default = Set(kind.is_default());
                    am.update(&txn).await?
                }
                None => {
                    RoleActive {
                        name: Set(kind.name().to_string()),
                        index: Set(kind.index().to_string()),
                        is_default: Set(kind.is_default()),
                        permissions: Set(kind.permissions().bits()),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?
                }
            };
            seeded.push(model);
        }

        txn.commit().await?;
        info!("Seeded {} roles.", seeded.len());
        Ok(seeded)
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleModel>, AppError> {
        Ok(Role::find()
            .order_by_asc(entity::role::Column::Permissions)
            .all(&self.database_connection)
            .await?)
    }

    pub async fn get_role(&self, id: i32) -> Result<RoleModel, AppError> {
        Ok(Role::find_by_id(id)
            .one(&self.database_connection)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Role not found".into()))?)
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<RoleModel, AppError> {
        Role::find()
            .filter(entity::role::Column::Name.eq(name))
            .one(&self.database_connection)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown account type {name:?}.")))
    }

    pub async fn default_role(&self) -> Result<Option<RoleModel>, AppError> {
        Ok(Role::find()
            .filter(entity::role::Column::IsDefault.eq(true))
            .one(&self.database_connection)
            .await?)
    }

    async fn role_with_permissions(&self, permissions: Permission) -> Result<Option<RoleModel>, AppError> {
        Ok(Role::find()
            .filter(entity::role::Column::Permissions.eq(permissions.bits()))
            .one(&self.database_connection)
            .await?)
    }

    /// The configured admin address gets the administrator role, everyone else the default one.
    pub async fn role_for_new_user(
        &self,
        email: &str,
        admin_email: Option<&str>,
    ) -> Result<Option<RoleModel>, AppError> {
        if admin_email.is_some_and(|admin| admin.eq_ignore_ascii_case(email)) {
            if let Some(role) = self.role_with_permissions(Permission::ADMINISTER).await? {
                return Ok(Some(role));
            }
        }
        self.default_role().await
    }
}
