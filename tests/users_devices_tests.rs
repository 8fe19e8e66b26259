use itlab_sync::errors::AppError;
use itlab_sync::models::devices::Device;
use itlab_sync::models::users::{User, UserProperty};
use itlab_sync::remote::models::devices::DeviceCreateRequest;
use itlab_sync::remote::models::users::UserEditRequest;
use itlab_sync::store::entity::Table;

mod common;
use common::{MockRemote, app_with, device, equipment_type, user};

#[tokio::test]
async fn test_users_are_stored_with_properties() {
    let remote = MockRemote::new();
    *remote.users.lock().unwrap() = vec![user("u1"), user("u2")];
    let (_dir, app) = app_with(&remote);

    assert!(app.users.update_all_users().await.is_success());

    assert_eq!(app.users.get_all_users().current().unwrap().len(), 2);
    assert_eq!(app.store().count(Table::PropertyTypes).unwrap(), 1);
    assert_eq!(app.users.get_properties().unwrap().len(), 2);

    let u1 = app.users.get_user_by_id("u1").unwrap().unwrap();
    assert_eq!(u1.property("VK"), Some("@ivan"));
    assert_eq!(u1.user.full_name(), "Petrov-u1 Ivan");

    let current = app.users.get_current_user().unwrap().unwrap();
    assert_eq!(current.user.id, "u1");
    assert_eq!(app.users.get_properties_with_types().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_users_matches_email() {
    let remote = MockRemote::new();
    *remote.users.lock().unwrap() = vec![user("alice"), user("bob")];
    let (_dir, app) = app_with(&remote);
    assert!(app.users.update_all_users().await.is_success());

    let found = app.users.search_users("bob@").current().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "bob");
}

#[tokio::test]
async fn test_local_user_writes_respect_foreign_keys() {
    let remote = MockRemote::new();
    let (_dir, app) = app_with(&remote);

    let local = User {
        id: "local".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Ivanova".to_string(),
        middle_name: None,
        email: "anna@rtuitlab.dev".to_string(),
        phone_number: None,
    };
    let orphan = UserProperty {
        id: "prop".to_string(),
        user_id: "local".to_string(),
        type_id: "no-such-type".to_string(),
        value: "x".to_string(),
        status: None,
    };

    let err = app.users.insert_user(&local, &[orphan]).unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation { .. }));
    assert!(app.users.get_user_by_id("local").unwrap().is_none());

    app.users.insert_user(&local, &[]).unwrap();
    assert_eq!(app.users.delete_user("local").unwrap(), 1);
}

#[tokio::test]
async fn test_delete_user_removes_properties_first() {
    let remote = MockRemote::new();
    *remote.users.lock().unwrap() = vec![user("u1")];
    let (_dir, app) = app_with(&remote);
    assert!(app.users.update_user("u1").await.is_success());

    app.users.delete_user("u1").unwrap();
    assert_eq!(app.store().count(Table::Users).unwrap(), 0);
    assert_eq!(app.store().count(Table::UserProperties).unwrap(), 0);
    // Types stay for other users.
    assert_eq!(app.store().count(Table::PropertyTypes).unwrap(), 1);
}

#[tokio::test]
async fn test_user_edits_do_not_patch_cache() {
    let remote = MockRemote::new();
    *remote.users.lock().unwrap() = vec![user("u1")];
    let (_dir, app) = app_with(&remote);
    assert!(app.users.update_all_users().await.is_success());

    let request = UserEditRequest {
        first_name: Some("Pyotr".to_string()),
        ..Default::default()
    };
    let edited = app.users.edit_user_info(&request).await;
    assert_eq!(edited.data().map(|u| u.first_name.as_str()), Some("Pyotr"));
    assert!(app.users.edit_user_property("prop-u1", "@petr").await.is_success());

    let cached = app.users.get_user_by_id("u1").unwrap().unwrap();
    assert_eq!(cached.user.first_name, "Ivan");
    assert_eq!(cached.property("vk"), Some("@ivan"));
}

#[tokio::test]
async fn test_devices_fetch_missing_owners() {
    let remote = MockRemote::new();
    *remote.users.lock().unwrap() = vec![user("u2")];
    *remote.devices.lock().unwrap() = vec![device("d1", 1, Some("u2")), device("d2", 2, None)];
    let (_dir, app) = app_with(&remote);

    assert!(app.devices.update_devices().await.is_success());
    assert_eq!(remote.count_calls("get_user"), 1);

    let owned = app.devices.get_user_devices("u2").current().unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].device.id, "d1");

    let free = app.devices.get_free_devices().current().unwrap();
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].device.id, "d2");

    // Second sync: owner already cached.
    assert!(app.devices.update_devices().await.is_success());
    assert_eq!(remote.count_calls("get_user"), 1);
}

#[tokio::test]
async fn test_nested_devices_keep_parent_links() {
    let remote = MockRemote::new();
    let mut parent = device("d1", 1, None);
    parent.children = vec![device("d1-a", 2, None), device("d1-b", 3, None)];
    *remote.devices.lock().unwrap() = vec![parent];
    let (_dir, app) = app_with(&remote);

    assert!(app.devices.update_devices().await.is_success());

    let view = app.devices.get_device("d1").current().unwrap().unwrap();
    assert_eq!(view.children.len(), 2);
    assert!(view.children.iter().all(|c| c.parent_id.as_deref() == Some("d1")));
    assert_eq!(view.equipment_type.id, "eq1");
}

#[tokio::test]
async fn test_unknown_parent_is_detached() {
    let remote = MockRemote::new();
    let mut orphan = device("d5", 5, None);
    orphan.parent_id = Some("ghost".to_string());
    *remote.devices.lock().unwrap() = vec![orphan];
    let (_dir, app) = app_with(&remote);

    assert!(app.devices.update_devices().await.is_success());
    let stored: Device = app.store().get("d5".to_string()).unwrap().unwrap();
    assert!(stored.parent_id.is_none());
}

#[tokio::test]
async fn test_delete_device_detaches_children() {
    let remote = MockRemote::new();
    let mut parent = device("d1", 1, None);
    parent.children = vec![device("d1-a", 2, None)];
    *remote.devices.lock().unwrap() = vec![parent];
    let (_dir, app) = app_with(&remote);
    assert!(app.devices.update_devices().await.is_success());

    assert!(app.devices.delete_device("d1").await.is_success());

    assert!(app.devices.get_device("d1").current().unwrap().is_none());
    let child: Device = app.store().get("d1-a".to_string()).unwrap().unwrap();
    assert!(child.parent_id.is_none());
}

#[tokio::test]
async fn test_failed_delete_keeps_device() {
    let remote = MockRemote::new();
    *remote.devices.lock().unwrap() = vec![device("d1", 1, None)];
    let (_dir, app) = app_with(&remote);
    assert!(app.devices.update_devices().await.is_success());

    remote.set_offline(true);
    assert!(app.devices.delete_device("d1").await.is_error());
    assert!(app.devices.get_device("d1").current().unwrap().is_some());
}

#[tokio::test]
async fn test_equipment_types_and_device_search() {
    let remote = MockRemote::new();
    *remote.equipment_types.lock().unwrap() = vec![equipment_type("eq1"), equipment_type("eq2")];
    *remote.devices.lock().unwrap() = vec![device("d1", 1, None), device("d2", 2, None)];
    let (_dir, app) = app_with(&remote);

    assert!(app.devices.update_equipment_types().await.is_success());
    assert!(app.devices.update_devices().await.is_success());

    assert_eq!(app.devices.get_equipment_types().current().unwrap().len(), 2);
    let found = app.devices.search_devices("SN-d2").current().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].device.number, 2);
    assert_eq!(app.devices.search_devices("laptop").current().unwrap().len(), 2);

    let created = app
        .devices
        .create_device(&DeviceCreateRequest {
            equipment_type_id: "eq2".to_string(),
            serial_number: Some("NEW".to_string()),
            description: None,
            parent_id: None,
        })
        .await;
    assert!(created.is_success());
    // Server-side changes reach the cache only through a sync.
    assert_eq!(app.store().count(Table::Devices).unwrap(), 2);
}
