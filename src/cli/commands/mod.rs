mod add_user;
mod categories;

pub use add_user::cmd_add_user;
pub use categories::cmd_list_categories;
