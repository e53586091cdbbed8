//! Service-level tests against a throwaway sqlite file and a pinned clock.

use std::sync::Arc;

use chrono::NaiveDate;
use warrantree::config::Config;
use warrantree::db::Store;
use warrantree::domain::expiry::FixedClock;
use warrantree::domain::{Actor, ItemId, UserId, VaultId};
use warrantree::entities::attachments::AttachmentKind;
use warrantree::entities::items::ItemStatus;
use warrantree::entities::reminder_schedules::ReminderChannel;
use warrantree::entities::users::UserRole;
use warrantree::entities::vault_members::VaultRole;
use warrantree::services::{
    AddMemberRequest, AttachmentRequest, AuthError, CategoryError, CategoryRequest, ItemError, ItemRequest,
    RegisterRequest, ReminderRequest, VaultError, VaultRequest,
};
use warrantree::state::SharedState;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn spawn_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("warrantree-service-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let store = Store::new(&config.general.database_path)
        .await
        .expect("failed to open store");

    SharedState::from_store(store, config, Arc::new(FixedClock(date(2025, 1, 15))))
}

async fn register(state: &SharedState, name: &str, role: UserRole) -> Actor {
    let request = RegisterRequest {
        name: name.to_string(),
        email: format!("{name}@example.com"),
        password: "correct-horse".to_string(),
    };
    let result = state
        .auth_service
        .create_user(&request, role)
        .await
        .expect("failed to create user");

    state
        .auth_service
        .find_actor(UserId::new(result.user.id))
        .await
        .unwrap()
        .expect("actor missing")
}

fn vault_request(name: &str) -> VaultRequest {
    VaultRequest {
        name: name.to_string(),
        description: None,
    }
}

fn item_request(vault: Option<VaultId>, title: &str, purchase: NaiveDate, months: i32) -> ItemRequest {
    ItemRequest {
        title: title.to_string(),
        vault_id: vault,
        category_id: None,
        brand: None,
        model: None,
        serial_number: None,
        purchase_date: purchase,
        price: None,
        warranty_months: Some(months),
        notes: None,
    }
}

async fn add_member(state: &SharedState, vault: VaultId, owner: &Actor, who: &Actor, role: VaultRole) {
    state
        .vault_service
        .add_member(
            vault,
            &AddMemberRequest {
                email: who.email.clone(),
                role,
            },
            owner,
        )
        .await
        .expect("failed to add member");
}

async fn add_children(state: &SharedState, item: ItemId, actor: &Actor) {
    state
        .item_service
        .add_attachment(
            item,
            &AttachmentRequest {
                file_url: "https://files.example.com/receipt.pdf".to_string(),
                file_name: "receipt.pdf".to_string(),
                file_size: Some(2048),
                file_type: Some("application/pdf".to_string()),
                kind: AttachmentKind::Receipt,
            },
            actor,
        )
        .await
        .expect("failed to add attachment");
    state
        .item_service
        .add_reminder(
            item,
            &ReminderRequest {
                reminder_days: Some(14),
                channel: ReminderChannel::Email,
                is_active: true,
            },
            actor,
        )
        .await
        .expect("failed to add reminder");
}

async fn assert_children_gone(state: &SharedState, item: ItemId) {
    let attachments = state
        .store
        .attachment_repo()
        .list_by_item(item.value())
        .await
        .unwrap();
    assert!(attachments.is_empty(), "attachments left: {attachments:?}");

    let reminders = state
        .store
        .reminder_repo()
        .list_by_item(item.value())
        .await
        .unwrap();
    assert!(reminders.is_empty(), "reminders left: {reminders:?}");
}

#[tokio::test]
async fn test_family_fridge_scenario() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let bob = register(&state, "bob", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Family"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);

    let item = state
        .item_service
        .create_item(
            &item_request(Some(vault_id), "Fridge", date(2023, 1, 1), 24),
            &alice,
        )
        .await
        .unwrap();

    assert_eq!(item.expiry_date, Some(date(2025, 1, 1)));
    assert_eq!(item.status, ItemStatus::Active);
    assert!(item.is_expired);
    assert!(!item.is_expiring_soon);
    assert_eq!(item.days_until_expiry, Some(-14));

    let err = state
        .item_service
        .get_item(ItemId::new(item.id), &bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::NotFound(_)));

    let expiring = state
        .item_service
        .list_expiring_soon(&alice, 30)
        .await
        .unwrap();
    assert!(expiring.is_empty());
}

#[tokio::test]
async fn test_create_vault_adds_single_owner_membership() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Home"), &alice)
        .await
        .unwrap();

    assert_eq!(vault.owner.id, alice.id.value());
    assert_eq!(vault.members.len(), 1);
    assert_eq!(vault.members[0].role, VaultRole::Owner);
    assert_eq!(vault.members[0].user.id, alice.id.value());

    let err = state
        .vault_service
        .create_vault(&vault_request("Home"), &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::DuplicateName(_)));
}

#[tokio::test]
async fn test_missing_and_foreign_vault_look_the_same() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let bob = register(&state, "bob", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Private"), &alice)
        .await
        .unwrap();

    let foreign = state
        .vault_service
        .get_vault(VaultId::new(vault.id), &bob)
        .await
        .unwrap_err();
    let missing = state
        .vault_service
        .get_vault(VaultId::new(vault.id + 1000), &bob)
        .await
        .unwrap_err();

    assert!(matches!(foreign, VaultError::NotFound(_)));
    assert!(matches!(missing, VaultError::NotFound(_)));
}

#[tokio::test]
async fn test_viewer_cannot_mutate_editor_can() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let victor = register(&state, "victor", UserRole::User).await;
    let erin = register(&state, "erin", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Shared"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);
    add_member(&state, vault_id, &alice, &victor, VaultRole::Viewer).await;
    add_member(&state, vault_id, &alice, &erin, VaultRole::Editor).await;

    let item = state
        .item_service
        .create_item(&item_request(Some(vault_id), "TV", date(2024, 6, 1), 12), &alice)
        .await
        .unwrap();
    let item_id = ItemId::new(item.id);
    add_children(&state, item_id, &alice).await;

    // Viewers can read
    assert!(state.item_service.get_item(item_id, &victor).await.is_ok());

    let mut update = item_request(None, "Living room TV", date(2024, 6, 1), 24);
    let err = state
        .item_service
        .update_item(item_id, &update, &victor)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::InsufficientPermission(_)));

    let err = state
        .item_service
        .delete_item(item_id, &victor)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::InsufficientPermission(_)));

    update.notes = Some("wall mounted".to_string());
    let updated = state
        .item_service
        .update_item(item_id, &update, &erin)
        .await
        .unwrap();
    assert_eq!(updated.title, "Living room TV");
    assert_eq!(updated.expiry_date, Some(date(2026, 6, 1)));
    assert_eq!(updated.vault_id, vault.id);

    state.item_service.delete_item(item_id, &erin).await.unwrap();
    let err = state
        .item_service
        .get_item(item_id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::NotFound(_)));
    assert_children_gone(&state, item_id).await;
}

#[tokio::test]
async fn test_only_owner_deletes_vault() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let erin = register(&state, "erin", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Garage"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);
    add_member(&state, vault_id, &alice, &erin, VaultRole::Editor).await;

    let item = state
        .item_service
        .create_item(&item_request(Some(vault_id), "Drill", date(2024, 3, 1), 36), &alice)
        .await
        .unwrap();
    let item_id = ItemId::new(item.id);
    add_children(&state, item_id, &alice).await;

    let err = state
        .vault_service
        .delete_vault(vault_id, &erin)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InsufficientPermission(_)));

    state.vault_service.delete_vault(vault_id, &alice).await.unwrap();

    let err = state
        .vault_service
        .get_vault(vault_id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));

    let items = state
        .item_service
        .list_items_by_vault(vault_id)
        .await
        .unwrap();
    assert!(items.is_empty());
    assert!(state.store.item_repo().get(item_id.value()).await.unwrap().is_none());
    assert_children_gone(&state, item_id).await;

    for member in [&alice, &erin] {
        let row = state
            .store
            .member_repo()
            .find(vault_id.value(), member.id.value())
            .await
            .unwrap();
        assert!(row.is_none(), "membership left for {}", member.name);
    }
}

#[tokio::test]
async fn test_member_management_rules() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let bob = register(&state, "bob", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Office"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);

    let owner_role = state
        .vault_service
        .add_member(
            vault_id,
            &AddMemberRequest {
                email: bob.email.clone(),
                role: VaultRole::Owner,
            },
            &alice,
        )
        .await
        .unwrap_err();
    assert!(matches!(owner_role, VaultError::Validation(_)));

    add_member(&state, vault_id, &alice, &bob, VaultRole::Viewer).await;

    let duplicate = state
        .vault_service
        .add_member(
            vault_id,
            &AddMemberRequest {
                email: bob.email.clone(),
                role: VaultRole::Editor,
            },
            &alice,
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, VaultError::AlreadyMember));

    let denied = state
        .vault_service
        .remove_member(vault_id, alice.id, &bob)
        .await
        .unwrap_err();
    assert!(matches!(denied, VaultError::InsufficientPermission(_)));

    let member = state
        .vault_service
        .update_member_role(vault_id, bob.id, VaultRole::Editor, &alice)
        .await
        .unwrap();
    assert_eq!(member.role, VaultRole::Editor);

    let owner_removal = state
        .vault_service
        .remove_member(vault_id, alice.id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(owner_removal, VaultError::Validation(_)));

    state
        .vault_service
        .remove_member(vault_id, bob.id, &alice)
        .await
        .unwrap();
    let err = state
        .vault_service
        .get_vault(vault_id, &bob)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[tokio::test]
async fn test_owned_listing_excludes_memberships() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let bob = register(&state, "bob", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Kitchen"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);
    add_member(&state, vault_id, &alice, &bob, VaultRole::Editor).await;
    state
        .item_service
        .create_item(&item_request(Some(vault_id), "Kettle", date(2024, 12, 1), 12), &alice)
        .await
        .unwrap();

    let owned = state.vault_service.list_owned_vaults(&alice).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].item_count, 1);
    assert_eq!(owned[0].member_count, 2);

    let owned = state.vault_service.list_owned_vaults(&bob).await.unwrap();
    assert!(owned.is_empty());

    // Membership still counts for the expiring-soon query.
    let expiring = state
        .item_service
        .list_expiring_soon(&bob, 365)
        .await
        .unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].vault_name, "Kitchen");
}

#[tokio::test]
async fn test_expiring_soon_and_due_reminders() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Electronics"), &alice)
        .await
        .unwrap();
    let vault_id = VaultId::new(vault.id);

    // Expires 2025-02-01, 17 days after the pinned date.
    let laptop = state
        .item_service
        .create_item(&item_request(Some(vault_id), "Laptop", date(2024, 2, 1), 12), &alice)
        .await
        .unwrap();
    // Expires 2026-01-01.
    let phone = state
        .item_service
        .create_item(&item_request(Some(vault_id), "Phone", date(2024, 1, 1), 24), &alice)
        .await
        .unwrap();

    assert!(laptop.is_expiring_soon);
    assert!(!phone.is_expiring_soon);

    let detail = state
        .vault_service
        .get_vault(vault_id, &alice)
        .await
        .unwrap();
    assert_eq!(detail.item_count, 2);
    assert_eq!(detail.expiring_soon_count, 1);

    let expiring = state
        .item_service
        .list_expiring_soon(&alice, 30)
        .await
        .unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].title, "Laptop");

    let everything = state
        .item_service
        .list_expiring_soon(&alice, i64::MAX)
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);

    for (item, days) in [(laptop.id, 30), (phone.id, 30)] {
        state
            .item_service
            .add_reminder(
                ItemId::new(item),
                &ReminderRequest {
                    reminder_days: Some(days),
                    channel: ReminderChannel::Push,
                    is_active: true,
                },
                &alice,
            )
            .await
            .unwrap();
    }

    let due = state.item_service.list_due_reminders(&alice).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].item_id, laptop.id);
    assert_eq!(due[0].due_date, date(2025, 1, 2));
}

#[tokio::test]
async fn test_reminder_lead_falls_back_to_category_default() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let categories = state.category_service.list_categories().await.unwrap();
    assert_eq!(categories.len(), 8);
    let category = categories
        .iter()
        .find(|c| c.name == "Electronics")
        .expect("seeded category");

    let vault = state
        .vault_service
        .create_vault(&vault_request("Desk"), &alice)
        .await
        .unwrap();

    let mut request = item_request(Some(VaultId::new(vault.id)), "Monitor", date(2024, 5, 10), 24);
    request.category_id = Some(category.id);
    let item = state
        .item_service
        .create_item(&request, &alice)
        .await
        .unwrap();

    let reminder = state
        .item_service
        .add_reminder(
            ItemId::new(item.id),
            &ReminderRequest {
                reminder_days: None,
                channel: ReminderChannel::Email,
                is_active: true,
            },
            &alice,
        )
        .await
        .unwrap();
    assert_eq!(reminder.reminder_days, category.reminder_days_default);

    let in_use = state
        .category_service
        .list_categories_with_items()
        .await
        .unwrap();
    assert_eq!(in_use.len(), 1);
    assert_eq!(in_use[0].name, "Electronics");
}

#[tokio::test]
async fn test_create_item_checks_vault_and_category_exist() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let bob = register(&state, "bob", UserRole::User).await;

    let err = state
        .item_service
        .create_item(&item_request(Some(VaultId::new(999)), "Ghost", date(2024, 1, 1), 12), &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::VaultNotFound(_)));

    let vault = state
        .vault_service
        .create_vault(&vault_request("Alice's"), &alice)
        .await
        .unwrap();

    let mut request = item_request(Some(VaultId::new(vault.id)), "Bike", date(2024, 1, 1), 12);
    request.category_id = Some(999);
    let err = state
        .item_service
        .create_item(&request, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::CategoryNotFound(999)));

    // Creation only requires the vault to exist.
    request.category_id = None;
    let item = state.item_service.create_item(&request, &bob).await.unwrap();
    assert_eq!(item.vault_id, vault.id);
}

#[tokio::test]
async fn test_price_is_stored_as_exact_cents() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Kitchen"), &alice)
        .await
        .unwrap();

    let mut request = item_request(Some(VaultId::new(vault.id)), "Fridge", date(2024, 1, 1), 24);
    request.price = Some(899.99);
    let created = state.item_service.create_item(&request, &alice).await.unwrap();

    let row = state.store.item_repo().get(created.id).await.unwrap().unwrap();
    assert_eq!(row.price_cents, Some(89_999));

    let detail = state
        .item_service
        .get_item(ItemId::new(created.id), &alice)
        .await
        .unwrap();
    assert_eq!(detail.price.map(|p| p.to_string()).as_deref(), Some("899.99"));

    request.price = None;
    let cleared = state
        .item_service
        .update_item(ItemId::new(created.id), &request, &alice)
        .await
        .unwrap();
    assert_eq!(cleared.price, None);
}

#[tokio::test]
async fn test_status_is_set_manually() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let vault = state
        .vault_service
        .create_vault(&vault_request("Misc"), &alice)
        .await
        .unwrap();
    let item = state
        .item_service
        .create_item(
            &item_request(Some(VaultId::new(vault.id)), "Old phone", date(2020, 1, 1), 12),
            &alice,
        )
        .await
        .unwrap();
    assert!(item.is_expired);
    assert_eq!(item.status, ItemStatus::Active);

    let claimed = state
        .item_service
        .set_item_status(ItemId::new(item.id), ItemStatus::Claimed, &alice)
        .await
        .unwrap();
    assert_eq!(claimed.status, ItemStatus::Claimed);
}

#[tokio::test]
async fn test_category_creation_requires_admin() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;
    let root = register(&state, "root", UserRole::Admin).await;

    let request = CategoryRequest {
        name: "Tools".to_string(),
        description: None,
        icon: None,
        reminder_days_default: None,
    };

    let err = state
        .category_service
        .create_category(&request, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, CategoryError::InsufficientPermission(_)));

    let category = state
        .category_service
        .create_category(&request, &root)
        .await
        .unwrap();
    assert_eq!(category.reminder_days_default, 30);

    let err = state
        .category_service
        .create_category(&request, &root)
        .await
        .unwrap_err();
    assert!(matches!(err, CategoryError::DuplicateName(_)));
}

#[tokio::test]
async fn test_register_and_login() {
    let state = spawn_state().await;
    let alice = register(&state, "alice", UserRole::User).await;

    let duplicate = state
        .auth_service
        .register(&RegisterRequest {
            name: "Alice Again".to_string(),
            email: "ALICE@example.com".to_string(),
            password: "another-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AuthError::DuplicateName(_)));

    let login = state
        .auth_service
        .login("alice@example.com", "correct-horse")
        .await
        .unwrap();
    assert_eq!(login.user.id, alice.id.value());
    assert_eq!(login.api_key.len(), 64);

    let bad = state
        .auth_service
        .login("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(bad, AuthError::InvalidCredentials));

    let actor = state
        .auth_service
        .verify_api_key(&login.api_key)
        .await
        .unwrap()
        .expect("api key should resolve");
    assert_eq!(actor.id, alice.id);
}
