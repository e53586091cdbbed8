//! Create user command handler

use std::sync::Arc;

use crate::config::Config;
use crate::domain::expiry::SystemClock;
use crate::entities::users::UserRole;
use crate::services::RegisterRequest;
use crate::state::SharedState;

pub async fn cmd_add_user(
    config: &Config,
    email: &str,
    name: &str,
    password: &str,
    admin: bool,
) -> anyhow::Result<()> {
    let state = SharedState::with_clock(config.clone(), Arc::new(SystemClock)).await?;

    let role = if admin { UserRole::Admin } else { UserRole::User };
    let request = RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    let result = state.auth_service.create_user(&request, role).await?;

    println!("Created user {} <{}>", result.user.name, result.user.email);
    println!("  ID: {} | Role: {:?}", result.user.id, result.user.role);
    println!("  API key: {}", result.api_key);

    Ok(())
}
