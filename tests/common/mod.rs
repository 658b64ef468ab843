#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware,
    Router,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use branchmove_api::{
    config::AppConfig,
    db,
    entities::{branch, product},
    events,
    handlers::AppServices,
    middleware_helpers::request_id::request_id_middleware,
    uploads::EvidenceStore,
    AppState,
};

/// Helper harness for spinning up an application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _uploads_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:");
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_sender, event_rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let uploads_dir = TempDir::new().expect("create uploads tempdir");
        let evidence_store = Arc::new(EvidenceStore::new(uploads_dir.path().to_path_buf()));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            evidence_store,
            services,
        };

        let router = branchmove_api::api_routes()
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self {
            router,
            state,
            _uploads_dir: uploads_dir,
            _event_task: event_task,
        }
    }

    /// Send a JSON (or empty-body) request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a multipart/form-data request with a driver name and an
    /// evidence file part.
    pub async fn request_multipart(
        &self,
        method: Method,
        uri: &str,
        driver_field: Option<(&str, &str)>,
        file: Option<(&str, &[u8])>,
    ) -> axum::response::Response {
        let boundary = "----branchmove-test-boundary";
        let mut body = Vec::new();

        if let Some((field_name, driver_name)) = driver_field {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(driver_name.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        if let Some((file_name, bytes)) = file {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("failed to build multipart request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Number of evidence files currently on disk.
    pub fn stored_evidence_count(&self) -> usize {
        match std::fs::read_dir(self.state.evidence_store.root()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub async fn seed_branch(&self, id: i32, name: &str) -> branch::Model {
        branch::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            location: Set(format!("{name} HQ")),
            latitude: Set(-23.55),
            longitude: Set(-46.63),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed branch")
    }

    pub async fn seed_product(
        &self,
        id: i32,
        name: &str,
        quantity: i32,
        branch_id: i32,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            quantity: Set(quantity),
            branch_id: Set(branch_id),
            image_url: Set(None),
            description: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }
}
