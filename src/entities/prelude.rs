pub use super::attachments::Entity as Attachments;
pub use super::categories::Entity as Categories;
pub use super::items::Entity as Items;
pub use super::reminder_schedules::Entity as ReminderSchedules;
pub use super::users::Entity as Users;
pub use super::vault_members::Entity as VaultMembers;
pub use super::vaults::Entity as Vaults;
