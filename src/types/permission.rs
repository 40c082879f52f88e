//! Bitmask permissions and the fixed set of roles that carry them.
//!
//! Each capability is a power-of-two flag; a role's mask is the OR of the
//! flags it grants. A role grants a capability when every bit of the
//! capability is present in its mask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

use crate::types::error::AppError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(i32);

impl Permission {
    /// What an anonymous principal holds.
    pub const NONE: Permission = Permission(0);
    pub const GENERAL: Permission = Permission(0x01);
    /// Every bit set, so administrators pass any check.
    pub const ADMINISTER: Permission = Permission(0xff);

    pub const fn from_bits(bits: i32) -> Self {
        Permission(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, required: Permission) -> bool {
        self.0 & required.0 == required.0
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        Permission(self.0 | rhs.0)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// True iff every bit of `required` is set in `role_mask`.
pub fn can(role_mask: Permission, required: Permission) -> bool {
    role_mask.contains(required)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    General,
    Administrator,
}

impl RoleKind {
    pub const ALL: [RoleKind; 2] = [RoleKind::General, RoleKind::Administrator];

    pub fn name(self) -> &'static str {
        match self {
            RoleKind::General => "User",
            RoleKind::Administrator => "Administrator",
        }
    }

    pub fn permissions(self) -> Permission {
        match self {
            RoleKind::General => Permission::GENERAL,
            RoleKind::Administrator => Permission::ADMINISTER,
        }
    }

    pub fn index(self) -> &'static str {
        match self {
            RoleKind::General => "main",
            RoleKind::Administrator => "admin",
        }
    }

    pub fn is_default(self) -> bool {
        matches!(self, RoleKind::General)
    }

    pub fn from_name(name: &str) -> Option<RoleKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored role checked against the kind its name claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: i32,
    pub kind: RoleKind,
    pub permissions: Permission,
    pub index: String,
}

impl Role {
    pub fn from_model(model: &entity::role::Model) -> Result<Role, AppError> {
        let kind = RoleKind::from_name(&model.name)
            .ok_or_else(|| AppError::Internal(format!("unknown role {:?}", model.name)))?;
        let permissions = Permission::from_bits(model.permissions);
        if permissions != kind.permissions() {
            return Err(AppError::Internal(format!(
                "role {} has mask {permissions}, expected {}",
                kind,
                kind.permissions()
            )));
        }
        Ok(Role { id: model.id, kind, permissions, index: model.index.clone() })
    }

    pub fn can(&self, required: Permission) -> bool {
        can(self.permissions, required)
    }
}
