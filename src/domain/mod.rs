//! Domain types for vaults and warranty items.
//!
//! Ids are newtypes so a vault id cannot be handed to an item lookup by
//! accident. The access and expiry rules live in their own submodules and are
//! pure: they take loaded rows and a date, never a connection.

pub mod access;
pub mod expiry;
pub mod money;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::users::UserRole;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
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

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                i32::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a vault.
    ///
    /// ```rust
    /// use warrantree::domain::VaultId;
    ///
    /// let id = VaultId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    VaultId
);

id_newtype!(
    /// Identifier of a warranty item.
    ItemId
);

id_newtype!(
    /// Identifier of a registered user.
    UserId
);

/// The authenticated user an operation runs on behalf of.
///
/// Produced by the auth middleware and passed explicitly into every service
/// call; nothing reads the current user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip_as_plain_numbers() {
        let id = ItemId::new(12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
        let back: ItemId = serde_json::from_str("12").unwrap();
        assert_eq!(back, id);
        assert_eq!(i32::from(VaultId::from(3)), 3);
    }

    #[test]
    fn test_actor_admin_flag() {
        let mut actor = Actor {
            id: UserId::new(1),
            email: "alice@example.com".into(),
            name: "Alice".into(),
            role: UserRole::User,
        };
        assert!(!actor.is_admin());
        actor.role = UserRole::Admin;
        assert!(actor.is_admin());
    }
}
