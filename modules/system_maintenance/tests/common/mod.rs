//! Common test utilities: in-memory database and a small seeded catalog
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use system_maintenance::contract::*;
use system_maintenance::domain::Service;
use system_maintenance::{Config, SystemMaintenanceModule};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery staple";

/// Fresh in-memory SQLite database with all migrations applied
///
/// One connection only: every new in-memory connection would open an empty database.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    SystemMaintenanceModule::migrate(&db).await.unwrap();
    Arc::new(db)
}

/// Seeded catalog: "System 1", "Type A" and three accounts
///
/// - `nonsysadmin`: active account without a SysAdmin profile
/// - `alice`: SysAdmin without superuser rights
/// - `supersysadmin`: SysAdmin and superuser
pub struct TestWorld {
    pub module: SystemMaintenanceModule,
    pub service: Arc<Service>,
    pub system: System,
    pub maintenance_type: MaintenanceType,
    pub alice: SysAdmin,
    pub super_admin: SysAdmin,
}

impl TestWorld {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = setup_db().await;
        let module = SystemMaintenanceModule::new(config, db);
        let service = module.service();

        let system = service
            .create_system(SystemInput {
                name: "System 1".to_string(),
                description: "Primary web host".to_string(),
            })
            .await
            .unwrap();
        let maintenance_type = service
            .create_maintenance_type(MaintenanceTypeInput {
                maintenance_type: "Type A".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        create_account(&service, "nonsysadmin", false).await;
        let alice = create_account(&service, "alice", false).await;
        let alice = service.create_sys_admin(alice.id).await.unwrap();
        let root = create_account(&service, "supersysadmin", true).await;
        let super_admin = service.create_sys_admin(root.id).await.unwrap();

        Self {
            module,
            service,
            system,
            maintenance_type,
            alice,
            super_admin,
        }
    }

    pub fn router(&self) -> Router {
        self.module.router()
    }

    /// Record by alice against "System 1" / "Type A"
    pub fn record_input(&self, datetime: Option<DateTime<Utc>>) -> MaintenanceRecordInput {
        MaintenanceRecordInput {
            system_id: self.system.id,
            sys_admin_id: self.alice.id,
            maintenance_type_id: self.maintenance_type.id,
            hardware_ids: vec![],
            software_ids: vec![],
            documentation_record_ids: vec![],
            status: Some(MaintenanceStatus::InProgress),
            datetime,
            description: MarkupInput::new("Patched **nginx**", MarkupType::Markdown),
            procedure: MarkupInput::new("apt upgrade", MarkupType::PlainText),
            problems: MarkupInput::default(),
        }
    }

    pub async fn create_record(&self, datetime: Option<DateTime<Utc>>) -> MaintenanceRecord {
        self.service
            .create_record(self.record_input(datetime))
            .await
            .unwrap()
    }

    pub fn documentation_input(&self, title: &str) -> DocumentationInput {
        DocumentationInput {
            title: title.to_string(),
            maintenance_type_id: self.maintenance_type.id,
            documentation: MarkupInput::new("Steps:\n\n1. backup\n2. upgrade", MarkupType::Markdown),
            maintenance_record_ids: None,
        }
    }

    /// Session cookie header value for `username`
    pub async fn login_cookie(&self, username: &str) -> String {
        let session = self.service.login(username, PASSWORD).await.unwrap();
        format!("sysmaint_session={}", session.token)
    }
}

pub async fn create_account(service: &Service, username: &str, is_superuser: bool) -> Account {
    service
        .create_account(NewAccount {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: format!("{}@example.com", username),
            is_active: true,
            is_superuser,
        })
        .await
        .unwrap()
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

// ===== HTTP helpers =====

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}
