//! Shared test helpers for integration tests.
//!
//! Every test gets its own in-memory store and router. Fixtures are
//! written straight through the store so that tests exercise exactly one
//! HTTP call path at a time.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use portal_api::{AppState, build_app};
use portal_core::config::AppConfig;
use portal_core::types::{FavoriteId, FolderId, Page, UserId};
use portal_database::{MemoryStore, PortalStore};
use portal_entity::favorite::{CreateFavorite, Favorite};
use portal_entity::folder::{CreateFolder, Folder};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store for direct fixture setup and assertions
    pub store: Arc<dyn PortalStore>,
}

/// A response with its body parsed as JSON (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestApp {
    /// Create a new test application with the default four-column grid
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application with custom settings
    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn PortalStore> = Arc::new(MemoryStore::new());
        let router = build_app(AppState::new(config, Arc::clone(&store)));
        Self { router, store }
    }

    pub async fn user(&self, username: &str) -> UserId {
        let mut tx = self.store.begin().await.unwrap();
        let user = tx.insert_user(username).await.unwrap();
        tx.commit().await.unwrap();
        user.id
    }

    /// Insert a folder pinned at `(column, rank)` on the favorites page.
    pub async fn pinned_folder(&self, owner: UserId, name: &str, column: i32, rank: i32) -> Folder {
        self.insert_folder(owner, Page::Favorites, name, None, Some((column, rank)))
            .await
    }

    pub async fn insert_folder(
        &self,
        owner: UserId,
        page: Page,
        name: &str,
        parent_id: Option<FolderId>,
        pin: Option<(i32, i32)>,
    ) -> Folder {
        let mut tx = self.store.begin().await.unwrap();
        let folder = tx
            .insert_folder(&CreateFolder {
                user_id: owner,
                page,
                name: name.to_string(),
                parent_id,
                home_column: pin.map(|(column, _)| column),
                home_rank: pin.map(|(_, rank)| rank),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        folder
    }

    pub async fn favorite(&self, owner: UserId, folder: FolderId, name: &str, rank: i32) -> Favorite {
        let mut tx = self.store.begin().await.unwrap();
        let favorite = tx
            .insert_favorite(&CreateFavorite {
                user_id: owner,
                folder_id: Some(folder),
                name: name.to_string(),
                url: format!("https://example.com/{name}"),
                home_rank: Some(rank),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        favorite
    }

    /// Current `(column, rank)` of a folder.
    pub async fn slot(&self, id: FolderId) -> (Option<i32>, Option<i32>) {
        let mut tx = self.store.begin().await.unwrap();
        let folder = tx.find_folder(id).await.unwrap().unwrap();
        (folder.home_column, folder.home_rank)
    }

    pub async fn favorite_rank(&self, id: FavoriteId) -> Option<i32> {
        let mut tx = self.store.begin().await.unwrap();
        tx.find_favorite(id).await.unwrap().unwrap().home_rank
    }

    pub async fn get(&self, user: UserId, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post_json(&self, user: UserId, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(user), Some(body.to_string()))
            .await
    }

    pub async fn put_json(&self, user: UserId, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(user), Some(body.to_string()))
            .await
    }

    pub async fn delete(&self, user: UserId, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Send a request with an arbitrary body and optional caller.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<UserId>,
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            location,
            body,
        }
    }
}
