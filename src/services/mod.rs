pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, RegisterRequest};
pub use auth_service_impl::SeaOrmAuthService;

pub mod vault_service;
pub mod vault_service_impl;
pub use vault_service::{
    AddMemberRequest, UpdateMemberRequest, VaultError, VaultRequest, VaultService,
};
pub use vault_service_impl::SeaOrmVaultService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{
    AttachmentRequest, ItemError, ItemRequest, ItemService, ReminderRequest, StatusRequest,
};
pub use item_service_impl::SeaOrmItemService;

pub mod category_service;
pub mod category_service_impl;
pub use category_service::{CategoryError, CategoryRequest, CategoryService};
pub use category_service_impl::SeaOrmCategoryService;
