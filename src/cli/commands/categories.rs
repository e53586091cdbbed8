//! List categories command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_categories(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let categories = store.category_repo().list().await?;

    if categories.is_empty() {
        println!("No categories defined.");
        return Ok(());
    }

    println!("Categories ({} total)", categories.len());
    println!("{:-<60}", "");

    for category in categories {
        let icon = category.icon.as_deref().unwrap_or("-");
        println!(
            "[{}] {} ({icon}) | reminder {} days before expiry",
            category.id, category.name, category.reminder_days_default
        );
        if let Some(description) = &category.description {
            println!("    {description}");
        }
    }

    Ok(())
}
