pub mod attachment;
pub mod category;
pub mod item;
pub mod member;
pub mod reminder;
pub mod user;
pub mod vault;
