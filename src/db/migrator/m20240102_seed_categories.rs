use crate::entities::categories;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Reference categories: (name, description, icon, reminder lead days).
const DEFAULT_CATEGORIES: &[(&str, &str, &str, i32)] = &[
    (
        "Electronics",
        "Electronic devices and gadgets",
        "computer-desktop",
        30,
    ),
    ("Appliances", "Home and kitchen appliances", "home", 60),
    (
        "Insurance",
        "Insurance policies and coverage",
        "shield-check",
        90,
    ),
    (
        "Documents",
        "Important documents and certificates",
        "document-text",
        30,
    ),
    (
        "Vehicles",
        "Cars, motorcycles, and other vehicles",
        "truck",
        30,
    ),
    (
        "Home & Garden",
        "Home improvement and garden tools",
        "wrench-screwdriver",
        60,
    ),
    ("Health & Beauty", "Health and beauty products", "heart", 30),
    ("Other", "Other items", "squares-plus", 30),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Categories)
            .columns([
                categories::Column::Name,
                categories::Column::Description,
                categories::Column::Icon,
                categories::Column::ReminderDaysDefault,
            ])
            .on_conflict(
                OnConflict::column(categories::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        for (name, description, icon, days) in DEFAULT_CATEGORIES {
            insert.values_panic([
                (*name).into(),
                (*description).into(),
                (*icon).into(),
                (*days).into(),
            ]);
        }

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|c| c.0).collect();
        let delete = Query::delete()
            .from_table(Categories)
            .and_where(Expr::col(categories::Column::Name).is_in(names))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
