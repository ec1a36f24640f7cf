//! Folder hierarchy, sharing, and selection through the HTTP surface.

mod helpers;

use http::StatusCode;
use serde_json::{Value, json};

use helpers::TestApp;
use portal_core::types::{FolderId, UserId};

async fn create(app: &TestApp, user: UserId, page: &str, name: &str, parent: Option<FolderId>) -> Value {
    let res = app
        .post_json(
            user,
            "/api/folders",
            json!({"page": page, "name": name, "parent_id": parent}),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "create {name}: {}", res.body);
    res.body["data"].clone()
}

fn id_of(folder: &Value) -> FolderId {
    FolderId(folder["id"].as_i64().unwrap())
}

#[tokio::test]
async fn test_depth_cap_rejects_fourth_level() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let a = id_of(&create(&app, alice, "notes", "A", None).await);
    let b = id_of(&create(&app, alice, "notes", "B", Some(a)).await);
    let c = id_of(&create(&app, alice, "notes", "C", Some(b)).await);

    let res = app
        .post_json(
            alice,
            "/api/folders",
            json!({"page": "notes", "name": "D", "parent_id": c}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cycle_is_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let a = id_of(&create(&app, alice, "tasks", "A", None).await);
    let b = id_of(&create(&app, alice, "tasks", "B", Some(a)).await);

    let res = app
        .put_json(alice, &format!("/api/folders/{a}/parent"), json!({"parent_id": b}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put_json(alice, &format!("/api/folders/{a}/parent"), json!({"parent_id": a}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parent_must_be_on_same_page() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let note = id_of(&create(&app, alice, "notes", "Note root", None).await);

    let res = app
        .post_json(
            alice,
            "/api/folders",
            json!({"page": "contacts", "name": "Stray", "parent_id": note}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shared_folder_and_nested_folder_are_exclusive() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let shared = id_of(&create(&app, alice, "favorites", "Shared", None).await);
    let other = id_of(&create(&app, alice, "favorites", "Other", None).await);
    let nested = id_of(&create(&app, alice, "favorites", "Nested", Some(other)).await);

    let res = app
        .post_json(
            alice,
            &format!("/api/folders/{shared}/editors"),
            json!({"user_id": bob}),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["value"], true);

    let res = app
        .put_json(
            alice,
            &format!("/api/folders/{shared}/parent"),
            json!({"parent_id": other}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post_json(
            alice,
            &format!("/api/folders/{nested}/editors"),
            json!({"user_id": bob}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_editor_access_follows_reparent() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let shared = id_of(&create(&app, alice, "favorites", "Shared", None).await);
    let child = id_of(&create(&app, alice, "favorites", "Child", Some(shared)).await);
    let elsewhere = id_of(&create(&app, alice, "favorites", "Elsewhere", None).await);
    app.post_json(
        alice,
        &format!("/api/folders/{shared}/editors"),
        json!({"user_id": bob}),
    )
    .await;

    let bob_sees = |body: Value, id: FolderId| {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["id"].as_i64() == Some(id.get()))
    };

    let res = app.get(bob, "/api/pages/favorites/folders").await;
    assert!(bob_sees(res.body, child));

    let res = app
        .put_json(
            alice,
            &format!("/api/folders/{child}/parent"),
            json!({"parent_id": elsewhere}),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["path"], json!([elsewhere, child]));
    assert_eq!(res.body["data"]["editors"]["removed"], json!([bob]));
    let res = app.get(bob, "/api/pages/favorites/folders").await;
    assert!(!bob_sees(res.body, child));

    app.put_json(
        alice,
        &format!("/api/folders/{child}/parent"),
        json!({"parent_id": shared}),
    )
    .await;
    let res = app.get(bob, "/api/pages/favorites/folders").await;
    assert!(bob_sees(res.body, child));

    let res = app
        .get(alice, &format!("/api/folders/{child}/editors"))
        .await;
    assert_eq!(
        res.body["data"],
        json!([{"user_id": bob, "inherited": true}])
    );
}

#[tokio::test]
async fn test_delete_removes_subtree_and_clears_selection() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let root = id_of(&create(&app, alice, "contacts", "Root", None).await);
    let child = id_of(&create(&app, alice, "contacts", "Child", Some(root)).await);

    let res = app
        .post_json(
            alice,
            "/api/pages/contacts/selection",
            json!({"folder_id": child}),
        )
        .await;
    assert_eq!(res.body["data"]["folder_path"], json!([root, child]));

    let res = app.delete(alice, &format!("/api/folders/{root}")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["deleted"], json!([root, child]));

    let res = app.get(alice, &format!("/api/folders/{child}")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get(alice, "/api/pages/contacts/selection").await;
    assert!(res.body["data"]["selected_folder"].is_null());
}

#[tokio::test]
async fn test_tree_follows_selection() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let a = id_of(&create(&app, alice, "notes", "A", None).await);
    let b = id_of(&create(&app, alice, "notes", "B", Some(a)).await);
    let c = id_of(&create(&app, alice, "notes", "C", Some(b)).await);
    create(&app, alice, "notes", "Z", None).await;

    let res = app.get(alice, "/api/pages/notes/tree").await;
    let names: Vec<&str> = res.body["data"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["folder"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "Z"]);

    app.post_json(alice, "/api/pages/notes/selection", json!({"folder_id": b}))
        .await;
    let res = app.get(alice, "/api/pages/notes/tree").await;
    let levels: Vec<(i64, u64)> = res.body["data"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["folder"]["id"].as_i64().unwrap(),
                e["level"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(levels, vec![(a.get(), 0), (b.get(), 1), (c.get(), 2)]);

    let res = app
        .get(alice, &format!("/api/pages/notes/breadcrumbs/{c}"))
        .await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_task_selection_toggles_and_tracks_active_folder() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let inbox = id_of(&create(&app, alice, "tasks", "Inbox", None).await);
    let later = id_of(&create(&app, alice, "tasks", "Later", None).await);

    app.post_json(alice, "/api/pages/tasks/selection", json!({"folder_id": inbox}))
        .await;
    let res = app
        .post_json(alice, "/api/pages/tasks/selection", json!({"folder_id": later}))
        .await;
    assert_eq!(res.body["data"]["selected_tasks"], json!([inbox, later]));

    let res = app
        .post_json(alice, "/api/tasks/active-folder", json!({"folder_id": inbox}))
        .await;
    assert_eq!(res.body["data"]["active_task_folder"], json!(inbox));

    let res = app
        .post_json(alice, "/api/pages/tasks/selection", json!({"folder_id": inbox}))
        .await;
    assert_eq!(res.body["data"]["selected_tasks"], json!([later]));
    assert!(res.body["data"]["active_task_folder"].is_null());

    let res = app
        .post_json(alice, &format!("/api/pages/tasks/expanded/{later}"), json!({}))
        .await;
    assert_eq!(res.body["data"]["value"], true);
}

#[tokio::test]
async fn test_update_and_validation_errors() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let folder = id_of(&create(&app, alice, "notes", "Draft", None).await);

    let res = app
        .put_json(alice, &format!("/api/folders/{folder}"), json!({"name": "Final"}))
        .await;
    assert_eq!(res.body["data"]["name"], "Final");

    let res = app
        .put_json(alice, &format!("/api/folders/{folder}"), json!({"name": ""}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get(alice, "/api/pages/calendar/folders").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "MALFORMED_INPUT");
}

#[tokio::test]
async fn test_update_moves_folder_on_home_grid() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let folder = app.pinned_folder(alice, "Reading", 1, 1).await;
    let neighbour = app.pinned_folder(alice, "Queue", 1, 2).await;
    let resident = app.pinned_folder(alice, "Resident", 2, 1).await;

    let res = app
        .put_json(
            alice,
            &format!("/api/folders/{}", folder.id),
            json!({"home_column": 2, "home_rank": 1}),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["home_column"], 2);
    assert_eq!(res.body["data"]["home_rank"], 1);
    assert_eq!(app.slot(folder.id).await, (Some(2), Some(1)));
    assert_eq!(app.slot(resident.id).await, (Some(2), Some(2)));
    assert_eq!(app.slot(neighbour.id).await, (Some(1), Some(1)));

    let res = app
        .put_json(
            alice,
            &format!("/api/folders/{}", folder.id),
            json!({"home_column": 7}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.slot(folder.id).await, (Some(2), Some(1)));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let res = app
        .request(http::Method::GET, "/health", None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["status"], "ok");
}
