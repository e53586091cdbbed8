//! Vault access evaluation.
//!
//! A vault is visible to its owner and to anyone holding a membership row.
//! Everybody else gets the same answer as for a vault that does not exist.

use crate::domain::UserId;
use crate::entities::vault_members::{self, VaultRole};
use crate::entities::vaults;

impl VaultRole {
    /// OWNER and EDITOR may mutate items, attachments, reminders and vault details.
    #[must_use]
    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }

    #[must_use]
    pub const fn can_manage_members(self) -> bool {
        matches!(self, Self::Owner)
    }

    #[must_use]
    pub const fn can_delete(self) -> bool {
        matches!(self, Self::Owner)
    }
}

/// A vault together with its membership rows, as seen by one user.
#[derive(Debug, Clone)]
pub struct VaultAccess {
    pub vault: vaults::Model,
    pub members: Vec<vault_members::Model>,
    user: UserId,
}

impl VaultAccess {
    /// Returns `Some` only when `user` owns the vault or is one of its members.
    #[must_use]
    pub fn resolve(
        vault: vaults::Model,
        members: Vec<vault_members::Model>,
        user: UserId,
    ) -> Option<Self> {
        let visible = vault.owner_user_id == user.value()
            || members.iter().any(|m| m.user_id == user.value());

        visible.then_some(Self {
            vault,
            members,
            user,
        })
    }

    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Membership role of the resolving user. The owner is looked up through
    /// their OWNER row like everyone else.
    #[must_use]
    pub fn role(&self) -> Option<VaultRole> {
        self.role_of(self.user)
    }

    #[must_use]
    pub fn role_of(&self, user: UserId) -> Option<VaultRole> {
        self.members
            .iter()
            .find(|m| m.user_id == user.value())
            .map(|m| m.role)
    }

    /// Raw identity match against the vault owner.
    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.vault.owner_user_id == self.user.value()
    }

    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.role().is_some_and(VaultRole::can_edit)
    }

    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        self.role().is_some_and(VaultRole::can_manage_members)
    }

    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.role().is_some_and(VaultRole::can_delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(owner: i32) -> vaults::Model {
        vaults::Model {
            id: 1,
            name: "Family".into(),
            description: None,
            owner_user_id: owner,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn member(id: i32, user: i32, role: VaultRole) -> vault_members::Model {
        vault_members::Model {
            id,
            vault_id: 1,
            user_id: user,
            role,
            joined_at: String::new(),
        }
    }

    fn family() -> Vec<vault_members::Model> {
        vec![
            member(1, 1, VaultRole::Owner),
            member(2, 2, VaultRole::Editor),
            member(3, 3, VaultRole::Viewer),
        ]
    }

    #[test]
    fn test_outsider_cannot_resolve() {
        assert!(VaultAccess::resolve(vault(1), family(), UserId::new(9)).is_none());
    }

    #[test]
    fn test_owner_capabilities() {
        let access = VaultAccess::resolve(vault(1), family(), UserId::new(1)).unwrap();
        assert!(access.is_owner());
        assert!(access.can_edit());
        assert!(access.can_manage_members());
        assert!(access.can_delete());
    }

    #[test]
    fn test_editor_capabilities() {
        let access = VaultAccess::resolve(vault(1), family(), UserId::new(2)).unwrap();
        assert!(!access.is_owner());
        assert!(access.can_edit());
        assert!(!access.can_manage_members());
        assert!(!access.can_delete());
    }

    #[test]
    fn test_viewer_is_read_only() {
        let access = VaultAccess::resolve(vault(1), family(), UserId::new(3)).unwrap();
        assert_eq!(access.role(), Some(VaultRole::Viewer));
        assert!(!access.can_edit());
        assert!(!access.can_manage_members());
    }

    #[test]
    fn test_owner_without_member_row_is_visible_but_cannot_edit() {
        let access = VaultAccess::resolve(vault(1), Vec::new(), UserId::new(1)).unwrap();
        assert!(access.is_owner());
        assert!(!access.can_edit());
    }
}
