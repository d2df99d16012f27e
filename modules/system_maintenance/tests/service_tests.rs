//! Integration tests for the system maintenance service over SQLite

use system_maintenance::contract::*;
use system_maintenance::{Config, SystemMaintenanceModule};

mod common;
use common::{at, create_account, setup_db, TestWorld, PASSWORD};

fn print_test_header(test_name: &str, purpose: &str) {
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}

// ===== Relationships =====

#[tokio::test]
async fn test_self_relationship_rejected_and_not_persisted() {
    print_test_header(
        "test_self_relationship_rejected_and_not_persisted",
        "A record may not reference itself",
    );
    let world = TestWorld::new().await;
    let record = world.create_record(None).await;

    let err = world
        .service
        .add_relationship(record.id, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation { .. }));
    assert!(world.service.list_relationships().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_relationship_rejected() {
    print_test_header(
        "test_duplicate_relationship_rejected",
        "At most one edge a -> b may exist",
    );
    let world = TestWorld::new().await;
    let a = world.create_record(Some(at(1, 9))).await;
    let b = world.create_record(Some(at(2, 9))).await;

    world.service.add_relationship(a.id, b.id).await.unwrap();
    let err = world.service.add_relationship(a.id, b.id).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Conflict { .. }));

    // The reverse direction is a different edge
    world.service.add_relationship(b.id, a.id).await.unwrap();
    assert_eq!(world.service.list_relationships().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_relationship_to_unknown_record_rejected() {
    let world = TestWorld::new().await;
    let a = world.create_record(None).await;
    let err = world.service.add_relationship(a.id, a.id + 100).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation { .. }));
}

#[tokio::test]
async fn test_deleting_record_cascades_edges() {
    print_test_header(
        "test_deleting_record_cascades_edges",
        "Edges disappear with either endpoint",
    );
    let world = TestWorld::new().await;
    let a = world.create_record(Some(at(1, 9))).await;
    let b = world.create_record(Some(at(2, 9))).await;
    let c = world.create_record(Some(at(3, 9))).await;
    world.service.add_relationship(a.id, b.id).await.unwrap();
    world.service.add_relationship(c.id, b.id).await.unwrap();
    world.service.add_relationship(a.id, c.id).await.unwrap();

    world.service.delete_record(b.id).await.unwrap();

    let remaining = world.service.list_relationships().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].relationship.referencing_record_id, a.id);
    assert_eq!(remaining[0].relationship.referenced_record_id, c.id);
}

#[tokio::test]
async fn test_record_detail_lists_both_edge_directions() {
    let world = TestWorld::new().await;
    let a = world.create_record(Some(at(1, 9))).await;
    let b = world.create_record(Some(at(2, 9))).await;
    world.service.add_relationship(a.id, b.id).await.unwrap();

    let detail = world.service.record_detail(a.id).await.unwrap();
    assert_eq!(detail.references.len(), 1);
    assert_eq!(detail.references[0].id, b.id);
    assert!(detail.referenced_by.is_empty());

    let detail = world.service.record_detail(b.id).await.unwrap();
    assert_eq!(detail.referenced_by[0].id, a.id);
}

// ===== Records =====

#[tokio::test]
async fn test_records_listed_most_recent_first() {
    print_test_header(
        "test_records_listed_most_recent_first",
        "Listing is ordered by datetime descending",
    );
    let world = TestWorld::new().await;
    let middle = world.create_record(Some(at(10, 12))).await;
    let oldest = world.create_record(Some(at(1, 8))).await;
    let newest = world.create_record(Some(at(20, 17))).await;

    let page = world
        .service
        .list_records(&RecordFilter::default(), PageRequest::new(1, 10))
        .await
        .unwrap();
    let ids: Vec<Id> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
    assert!(page
        .items
        .windows(2)
        .all(|pair| pair[0].datetime >= pair[1].datetime));
}

#[tokio::test]
async fn test_record_defaults_and_rendering() {
    let world = TestWorld::new().await;
    let mut input = world.record_input(None);
    input.status = None;
    let record = world.service.create_record(input).await.unwrap();

    assert_eq!(record.status, MaintenanceStatus::InProgress);
    assert!(record.description.rendered.contains("<strong>nginx</strong>"));
    assert_eq!(record.procedure.markup_type, "Plain Text");
}

#[tokio::test]
async fn test_record_update_keeps_unset_status_and_replaces_links() {
    let world = TestWorld::new().await;
    let disk = world.service.create_hardware("SSD 1TB").await.unwrap();
    let ram = world.service.create_hardware("DDR4 32GB").await.unwrap();

    let mut input = world.record_input(Some(at(5, 10)));
    input.status = Some(MaintenanceStatus::Complete);
    input.hardware_ids = vec![disk.id];
    let record = world.service.create_record(input).await.unwrap();
    assert_eq!(record.hardware_ids, vec![disk.id]);

    let mut update = world.record_input(None);
    update.status = None;
    update.hardware_ids = vec![ram.id, ram.id];
    let updated = world.service.update_record(record.id, update).await.unwrap();

    assert_eq!(updated.status, MaintenanceStatus::Complete);
    assert_eq!(updated.datetime, at(5, 10));
    assert_eq!(updated.hardware_ids, vec![ram.id]);
}

#[tokio::test]
async fn test_record_with_unknown_dimension_rejected() {
    let world = TestWorld::new().await;
    let mut input = world.record_input(None);
    input.system_id = 9999;
    let err = world.service.create_record(input).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation { ref field, .. } if field == "system_id"));

    let mut input = world.record_input(None);
    input.software_ids = vec![42];
    let err = world.service.create_record(input).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation { ref field, .. } if field == "software_ids"));
}

#[tokio::test]
async fn test_invalid_markup_type_rejected() {
    let world = TestWorld::new().await;
    let mut input = world.record_input(None);
    input.problems = MarkupInput {
        raw: "none".to_string(),
        markup_type: "textile".to_string(),
    };
    let err = world.service.create_record(input).await.unwrap_err();
    assert!(
        matches!(err, MaintenanceError::Validation { ref field, .. } if field == "problems_markup_type")
    );
}

#[tokio::test]
async fn test_record_filters() {
    let world = TestWorld::new().await;
    let nginx = world.service.create_software("nginx").await.unwrap();
    let mut input = world.record_input(Some(at(2, 9)));
    input.software_ids = vec![nginx.id];
    input.status = Some(MaintenanceStatus::Failed);
    let failed = world.service.create_record(input).await.unwrap();
    world.create_record(Some(at(3, 9))).await;

    let by_software = world
        .service
        .list_records(
            &RecordFilter {
                software_id: Some(nginx.id),
                ..Default::default()
            },
            PageRequest::new(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(by_software.total, 1);
    assert_eq!(by_software.items[0].id, failed.id);

    let by_status = world
        .service
        .list_records(
            &RecordFilter {
                status: Some(MaintenanceStatus::InProgress),
                ..Default::default()
            },
            PageRequest::new(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(by_status.total, 1);
    assert_ne!(by_status.items[0].id, failed.id);
}

#[tokio::test]
async fn test_page_past_end_not_found() {
    let world = TestWorld::new().await;
    world.create_record(None).await;
    let err = world
        .service
        .list_records(&RecordFilter::default(), PageRequest::new(2, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::NotFound { .. }));
}

#[tokio::test]
async fn test_huge_page_number_not_found() {
    print_test_header(
        "test_huge_page_number_not_found",
        "Page numbers whose offset overflows are treated as past the end",
    );
    let world = TestWorld::new().await;
    world.create_record(None).await;
    world
        .service
        .create_documentation(world.documentation_input("Runbook"))
        .await
        .unwrap();

    for page in [u64::MAX / 4, u64::MAX] {
        let err = world
            .service
            .list_records(&RecordFilter::default(), PageRequest::new(page, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, MaintenanceError::NotFound { .. }), "page={}", page);

        let err = world
            .service
            .list_documentation(&DocumentationFilter::default(), PageRequest::new(page, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, MaintenanceError::NotFound { .. }), "page={}", page);
    }
}

// ===== Protected deletes =====

#[tokio::test]
async fn test_referenced_dimensions_cannot_be_deleted() {
    print_test_header(
        "test_referenced_dimensions_cannot_be_deleted",
        "System, SysAdmin and MaintenanceType are protected while records use them",
    );
    let world = TestWorld::new().await;
    let record = world.create_record(None).await;

    let err = world.service.delete_system(world.system.id).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Protected { .. }));
    let err = world.service.delete_sys_admin(world.alice.id).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Protected { .. }));
    let err = world
        .service
        .delete_maintenance_type(world.maintenance_type.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Protected { .. }));

    world.service.delete_record(record.id).await.unwrap();
    world.service.delete_system(world.system.id).await.unwrap();
    world.service.delete_sys_admin(world.alice.id).await.unwrap();
}

#[tokio::test]
async fn test_deleting_hardware_unlinks_records() {
    let world = TestWorld::new().await;
    let disk = world.service.create_hardware("SSD 1TB").await.unwrap();
    let mut input = world.record_input(None);
    input.hardware_ids = vec![disk.id];
    let record = world.service.create_record(input).await.unwrap();

    world.service.delete_hardware(disk.id).await.unwrap();
    let record = world.service.get_record(record.id).await.unwrap();
    assert!(record.hardware_ids.is_empty());
}

#[tokio::test]
async fn test_duplicate_names_conflict() {
    let world = TestWorld::new().await;
    let err = world
        .service
        .create_system(SystemInput {
            name: "System 1".to_string(),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Conflict { .. }));

    let err = world
        .service
        .create_sys_admin(world.alice.account_id)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Conflict { .. }));
}

// ===== Documentation =====

#[tokio::test]
async fn test_documentation_back_references_replaced() {
    print_test_header(
        "test_documentation_back_references_replaced",
        "Saving a document with record ids replaces the records linking to it",
    );
    let world = TestWorld::new().await;
    let a = world.create_record(Some(at(1, 9))).await;
    let b = world.create_record(Some(at(2, 9))).await;

    let mut input = world.documentation_input("Upgrade nginx");
    input.maintenance_record_ids = Some(vec![a.id]);
    let doc = world.service.create_documentation(input).await.unwrap();
    assert_eq!(
        world.service.documentation_record_links(doc.id).await.unwrap(),
        vec![a.id]
    );

    let mut input = world.documentation_input("Upgrade nginx");
    input.maintenance_record_ids = Some(vec![b.id]);
    world.service.update_documentation(doc.id, input).await.unwrap();

    assert_eq!(
        world.service.documentation_record_links(doc.id).await.unwrap(),
        vec![b.id]
    );
    let a = world.service.get_record(a.id).await.unwrap();
    assert!(a.documentation_record_ids.is_empty());
    let b = world.service.get_record(b.id).await.unwrap();
    assert_eq!(b.documentation_record_ids, vec![doc.id]);

    // Without ids the links are left alone
    world
        .service
        .update_documentation(doc.id, world.documentation_input("Upgrade nginx safely"))
        .await
        .unwrap();
    assert_eq!(
        world.service.documentation_record_links(doc.id).await.unwrap(),
        vec![b.id]
    );
}

#[tokio::test]
async fn test_documentation_title_unique() {
    let world = TestWorld::new().await;
    world
        .service
        .create_documentation(world.documentation_input("Runbook"))
        .await
        .unwrap();
    let err = world
        .service
        .create_documentation(world.documentation_input("Runbook"))
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Conflict { .. }));
}

#[tokio::test]
async fn test_raw_field_lookup() {
    let world = TestWorld::new().await;
    let record = world.create_record(None).await;

    let raw = world
        .service
        .raw_field(RawRecordKind::Maintenance, "description", record.id)
        .await
        .unwrap();
    assert_eq!(raw.raw, "Patched **nginx**");
    assert_eq!(raw.markup_type, "Markdown");

    let err = world
        .service
        .raw_field(RawRecordKind::Maintenance, "title", record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::NotFound { .. }));
}

// ===== Accounts and sessions =====

#[tokio::test]
async fn test_login_and_session_resolution() {
    let world = TestWorld::new().await;

    let err = world.service.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err, MaintenanceError::InvalidCredentials);

    let session = world.service.login("alice", PASSWORD).await.unwrap();
    let principal = world
        .service
        .resolve_session(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.account.username, "alice");
    assert_eq!(principal.sys_admin.map(|s| s.id), Some(world.alice.id));

    world.service.logout(&session.token).await.unwrap();
    assert!(world
        .service
        .resolve_session(&session.token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_inactive_account_cannot_log_in() {
    let world = TestWorld::new().await;
    let bob = create_account(&world.service, "bob", false).await;
    world
        .service
        .update_account(
            bob.id,
            AccountUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = world.service.login("bob", PASSWORD).await.unwrap_err();
    assert_eq!(err, MaintenanceError::InactiveAccount);
}

#[tokio::test]
async fn test_account_with_sys_admin_profile_is_protected() {
    let world = TestWorld::new().await;
    let err = world
        .service
        .delete_account(world.alice.account_id)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Protected { .. }));
}

#[tokio::test]
async fn test_entity_counts() {
    let world = TestWorld::new().await;
    world.create_record(None).await;
    let counts = world.service.entity_counts().await.unwrap();
    assert_eq!(counts.systems, 1);
    assert_eq!(counts.maintenance_types, 1);
    assert_eq!(counts.sys_admins, 2);
    assert_eq!(counts.maintenance_records, 1);
    assert_eq!(counts.documentation_records, 0);
}

// ===== Schema =====

#[tokio::test]
async fn test_migrate_twice_keeps_data() {
    print_test_header(
        "test_migrate_twice_keeps_data",
        "Running migrations on an up-to-date database changes nothing",
    );
    let db = setup_db().await;
    let module = SystemMaintenanceModule::new(Config::default(), db.clone());
    module
        .service()
        .create_system(SystemInput {
            name: "web01".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    SystemMaintenanceModule::migrate(&db).await.unwrap();

    let counts = module.service().entity_counts().await.unwrap();
    assert_eq!(counts.systems, 1);
}
