//! Domain types for the identity subsystem with strong typing.
//!
//! Identities, credentials and groups are all keyed by `i32` rows; the newtypes
//! below keep those keys from being mixed up at call sites.

pub mod context;

pub use crate::entities::sea_orm_active_enums::{ActiveState, UserEvent};
pub use context::AuthContext;

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

row_id!(
    /// Key of an `auth_id` row: one logical person.
    ///
    /// ```rust
    /// use gatekeep::domain::IdentityId;
    ///
    /// let id = IdentityId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    IdentityId
);

row_id!(
    /// Key of an `auth_users` row: one credential binding.
    UserId
);

row_id!(
    /// Key of an `auth_groups` row.
    GroupId
);

/// Selects the credential to verify.
///
/// When both fields are set the login lookup runs last and its result wins,
/// even if it finds nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialQuery {
    pub id: Option<UserId>,
    pub login: Option<String>,
}

impl CredentialQuery {
    #[must_use]
    pub const fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            login: None,
        }
    }

    #[must_use]
    pub fn by_login(login: impl Into<String>) -> Self {
        Self {
            id: None,
            login: Some(login.into()),
        }
    }
}
