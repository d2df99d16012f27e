//! Admin console JSON API tests

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{at, body_json, get, json_request, send, TestWorld};

#[tokio::test]
async fn test_admin_requires_super_admin() {
    let world = TestWorld::new().await;
    let router = world.router();

    let response = send(&router, get("/admin/systems", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let problem = body_json(response).await;
    assert_eq!(problem["status"], 401);

    for username in ["nonsysadmin", "alice"] {
        let cookie = world.login_cookie(username).await;
        let response = send(&router, get("/admin/systems", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", username);
    }

    let cookie = world.login_cookie("supersysadmin").await;
    let response = send(&router, get("/admin/systems", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_system_crud() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/systems",
            &cookie,
            json!({ "name": "db01", "description": "Postgres primary" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "db01");

    let response = send(
        &router,
        json_request(
            "PUT",
            &format!("/admin/systems/{}", id),
            &cookie,
            json!({ "name": "db01", "description": "Postgres replica" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["description"], "Postgres replica");

    let listed = body_json(send(&router, get("/admin/systems?q=db", Some(&cookie))).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = send(
        &router,
        json_request("DELETE", &format!("/admin/systems/{}", id), &cookie, json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, get(&format!("/admin/systems/{}", id), Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_and_conflict_problems() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;

    let response = send(
        &router,
        json_request("POST", "/admin/hardware", &cookie, json!({ "name": "  " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "name");

    let response = send(
        &router,
        json_request("POST", "/admin/systems", &cookie, json!({ "name": "System 1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_protected_delete_is_conflict() {
    let world = TestWorld::new().await;
    let router = world.router();
    world.create_record(None).await;
    let cookie = world.login_cookie("supersysadmin").await;

    let response = send(
        &router,
        json_request(
            "DELETE",
            &format!("/admin/systems/{}", world.system.id),
            &cookie,
            json!({}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let problem = body_json(response).await;
    assert_eq!(problem["title"], "Protected");
    assert!(problem["detail"]
        .as_str()
        .unwrap()
        .contains("maintenance record"));
}

#[tokio::test]
async fn test_maintenance_record_crud_and_filters() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;
    world.create_record(Some(at(1, 9))).await;

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/maintenance-records",
            &cookie,
            json!({
                "system_id": world.system.id,
                "sys_admin_id": world.super_admin.id,
                "maintenance_type_id": world.maintenance_type.id,
                "status": "Failed",
                "datetime": "2024-03-05T10:00:00Z",
                "problems": { "raw": "disk *full*", "markup_type": "Markdown" }
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "Failed");
    assert!(created["problems"]["rendered"]
        .as_str()
        .unwrap()
        .contains("<em>full</em>"));

    let page = body_json(
        send(
            &router,
            get("/admin/maintenance-records?status=Failed", Some(&cookie)),
        )
        .await,
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], created["id"]);

    let all = body_json(send(&router, get("/admin/maintenance-records", Some(&cookie))).await).await;
    assert_eq!(all["total"], 2);
    // 2024-03-05 is more recent than 2024-03-01
    assert_eq!(all["items"][0]["id"], created["id"]);

    let response = send(
        &router,
        get("/admin/maintenance-records?status=Done", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &router,
        get(
            "/admin/maintenance-records?page=9223372036854775807",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_relationship_endpoints() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;
    let a = world.create_record(Some(at(1, 9))).await;
    let b = world.create_record(Some(at(2, 9))).await;

    let edge = json!({ "referencing_record_id": a.id, "referenced_record_id": b.id });
    let response = send(
        &router,
        json_request("POST", "/admin/relationships", &cookie, edge.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &router,
        json_request("POST", "/admin/relationships", &cookie, edge),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/relationships",
            &cookie,
            json!({ "referencing_record_id": a.id, "referenced_record_id": a.id }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listed = body_json(send(&router, get("/admin/relationships", Some(&cookie))).await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0]["label"].as_str().unwrap().contains("System 1"));
}

#[tokio::test]
async fn test_documentation_links_returned() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;
    let record = world.create_record(None).await;

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/documentation-records",
            &cookie,
            json!({
                "title": "Rotate certificates",
                "maintenance_type_id": world.maintenance_type.id,
                "documentation": { "raw": "Run `certbot renew`" },
                "maintenance_record_ids": [record.id]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["maintenance_record_ids"], json!([record.id]));
    assert!(created["documentation"]["rendered"]
        .as_str()
        .unwrap()
        .contains("<code>certbot renew</code>"));
}

#[tokio::test]
async fn test_accounts_and_sys_admins() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/accounts",
            &cookie,
            json!({ "username": "carol", "password": "s3cret" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = body_json(response).await;
    assert!(account.get("password_hash").is_none());

    let response = send(
        &router,
        json_request(
            "POST",
            "/admin/sys-admins",
            &cookie,
            json!({ "account_id": account["id"] }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["username"], "carol");

    let admins = body_json(send(&router, get("/admin/sys-admins", Some(&cookie))).await).await;
    assert_eq!(admins.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_openapi_document() {
    let world = TestWorld::new().await;
    let router = world.router();
    let cookie = world.login_cookie("supersysadmin").await;

    let response = send(&router, get("/admin/openapi.json", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["components"]["schemas"]["SystemDto"].is_object());
}
