//! Staff accounts: profile projection, role and feature permissions.
//!
//! ## Invariants
//! - Every account holds exactly one [`Role`].
//! - Stored permissions are only consulted for non-admin roles; admins pass
//!   every permission check.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DisplayName, EmailAddress, Error, UserId};

/// Error returned when a role or permission string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownAccountValue {
    kind: &'static str,
    value: String,
}

/// Workshop role; one per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Mechanic working on bikes.
    Monteur,
    /// Administrator; implies every permission.
    Admin,
    /// Front-of-house: customer contact and repair approval.
    Foh,
}

impl Role {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monteur => "monteur",
            Self::Admin => "admin",
            Self::Foh => "foh",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownAccountValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monteur" => Ok(Self::Monteur),
            "admin" => Ok(Self::Admin),
            "foh" => Ok(Self::Foh),
            other => Err(UnknownAccountValue {
                kind: "role",
                value: other.to_owned(),
            }),
        }
    }
}

/// Feature permission granted to non-admin staff.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Inventory,
    Pricelist,
    TvAnnouncements,
    Warranty,
    CallStatus,
    Availability,
}

impl Permission {
    /// Every known permission, in storage order.
    pub const ALL: [Self; 6] = [
        Self::Inventory,
        Self::Pricelist,
        Self::TvAnnouncements,
        Self::Warranty,
        Self::CallStatus,
        Self::Availability,
    ];

    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Pricelist => "pricelist",
            Self::TvAnnouncements => "tv_announcements",
            Self::Warranty => "warranty",
            Self::CallStatus => "call_status",
            Self::Availability => "availability",
        }
    }
}

impl FromStr for Permission {
    type Err = UnknownAccountValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownAccountValue {
                kind: "permission",
                value: s.to_owned(),
            })
    }
}

/// Identity projection of a staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub email: EmailAddress,
    pub active: bool,
    pub approved: bool,
}

/// Profile plus role and permission assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub profile: Profile,
    pub role: Role,
    pub permissions: BTreeSet<Permission>,
}

impl Account {
    /// Identifier of the account owner.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.profile.user_id
    }

    /// Whether the account may act at all (approved and not deactivated).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.profile.active && self.profile.approved
    }

    /// Whether the account holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Permission check; admins hold every permission implicitly.
    ///
    /// # Examples
    /// ```
    /// # use std::collections::BTreeSet;
    /// # use workshop::domain::{Account, DisplayName, EmailAddress, Permission, Profile, Role, UserId};
    /// let account = Account {
    ///     profile: Profile {
    ///         user_id: UserId::random(),
    ///         display_name: DisplayName::new("Admin").unwrap(),
    ///         email: EmailAddress::new("admin@werkplaats.nl").unwrap(),
    ///         active: true,
    ///         approved: true,
    ///     },
    ///     role: Role::Admin,
    ///     permissions: BTreeSet::new(),
    /// };
    /// assert!(account.has_permission(Permission::Pricelist));
    /// ```
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_admin() || self.permissions.contains(&permission)
    }

    /// Fail with `403` unless the account is enabled.
    pub fn require_enabled(&self) -> Result<(), Error> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(Error::forbidden("account is not approved or has been deactivated"))
        }
    }

    /// Fail with `403` unless the account is an enabled admin.
    pub fn require_admin(&self) -> Result<(), Error> {
        self.require_enabled()?;
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }

    /// Fail with `403` unless the account is enabled and holds `permission`.
    pub fn require_permission(&self, permission: Permission) -> Result<(), Error> {
        self.require_enabled()?;
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "permission '{}' required",
                permission.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn monteur() -> Account {
        Account {
            profile: Profile {
                user_id: UserId::random(),
                display_name: DisplayName::new("Piet").expect("name"),
                email: EmailAddress::new("piet@werkplaats.nl").expect("email"),
                active: true,
                approved: true,
            },
            role: Role::Monteur,
            permissions: BTreeSet::from([Permission::Availability]),
        }
    }

    #[rstest]
    fn non_admin_uses_stored_permissions(monteur: Account) {
        assert!(monteur.has_permission(Permission::Availability));
        assert!(!monteur.has_permission(Permission::Pricelist));
    }

    #[rstest]
    fn admin_implies_every_permission(mut monteur: Account) {
        monteur.role = Role::Admin;
        monteur.permissions.clear();
        assert!(Permission::ALL.iter().all(|p| monteur.has_permission(*p)));
    }

    #[rstest]
    fn disabled_accounts_fail_every_gate(mut monteur: Account) {
        monteur.profile.approved = false;
        let error = monteur
            .require_permission(Permission::Availability)
            .expect_err("unapproved account");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case("monteur", Role::Monteur)]
    #[case("admin", Role::Admin)]
    #[case("foh", Role::Foh)]
    fn roles_round_trip_storage_names(#[case] raw: &str, #[case] role: Role) {
        assert_eq!(raw.parse::<Role>().expect("role"), role);
        assert_eq!(role.as_str(), raw);
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let error = "superpowers".parse::<Permission>().expect_err("unknown");
        assert_eq!(error.to_string(), "unknown permission: superpowers");
    }
}
