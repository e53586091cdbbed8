pub mod prelude;

pub mod attachments;
pub mod categories;
pub mod items;
pub mod reminder_schedules;
pub mod users;
pub mod vault_members;
pub mod vaults;
