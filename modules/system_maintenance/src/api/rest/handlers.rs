//! Admin console handlers - thin layer that delegates to the domain service

use super::mapper::parse_status;
use super::{
    dto::*,
    error::{map_domain_error, Problem},
    AdminState,
};
use crate::contract::{
    DocumentationFilter, Id, MaintenanceRecordInput, PageRequest, RecordFilter,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

type Admin = Extension<Arc<AdminState>>;

/// Optional `?q=` substring search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ===== Systems =====

pub async fn list_systems(
    Extension(state): Admin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SystemDto>>, Problem> {
    let systems = state
        .service
        .list_systems(query.q.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(systems.into_iter().map(Into::into).collect()))
}

pub async fn create_system(
    Extension(state): Admin,
    Json(req): Json<SystemRequest>,
) -> Result<(StatusCode, Json<SystemDto>), Problem> {
    let system = state
        .service
        .create_system(req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(system.into())))
}

pub async fn get_system(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<SystemDto>, Problem> {
    let system = state.service.get_system(id).await.map_err(map_domain_error)?;
    Ok(Json(system.into()))
}

pub async fn update_system(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<SystemRequest>,
) -> Result<Json<SystemDto>, Problem> {
    let system = state
        .service
        .update_system(id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(system.into()))
}

pub async fn delete_system(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_system(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Hardware =====

pub async fn list_hardware(
    Extension(state): Admin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NamedItemDto>>, Problem> {
    let items = state
        .service
        .list_hardware(query.q.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn create_hardware(
    Extension(state): Admin,
    Json(req): Json<NamedItemRequest>,
) -> Result<(StatusCode, Json<NamedItemDto>), Problem> {
    let item = state
        .service
        .create_hardware(&req.name)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get_hardware(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<NamedItemDto>, Problem> {
    let item = state.service.get_hardware(id).await.map_err(map_domain_error)?;
    Ok(Json(item.into()))
}

pub async fn update_hardware(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<NamedItemRequest>,
) -> Result<Json<NamedItemDto>, Problem> {
    let item = state
        .service
        .update_hardware(id, &req.name)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(item.into()))
}

pub async fn delete_hardware(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_hardware(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Software =====

pub async fn list_software(
    Extension(state): Admin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NamedItemDto>>, Problem> {
    let items = state
        .service
        .list_software(query.q.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn create_software(
    Extension(state): Admin,
    Json(req): Json<NamedItemRequest>,
) -> Result<(StatusCode, Json<NamedItemDto>), Problem> {
    let item = state
        .service
        .create_software(&req.name)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get_software(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<NamedItemDto>, Problem> {
    let item = state.service.get_software(id).await.map_err(map_domain_error)?;
    Ok(Json(item.into()))
}

pub async fn update_software(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<NamedItemRequest>,
) -> Result<Json<NamedItemDto>, Problem> {
    let item = state
        .service
        .update_software(id, &req.name)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(item.into()))
}

pub async fn delete_software(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_software(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Maintenance Types =====

pub async fn list_maintenance_types(
    Extension(state): Admin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MaintenanceTypeDto>>, Problem> {
    let types = state
        .service
        .list_maintenance_types(query.q.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

pub async fn create_maintenance_type(
    Extension(state): Admin,
    Json(req): Json<MaintenanceTypeRequest>,
) -> Result<(StatusCode, Json<MaintenanceTypeDto>), Problem> {
    let created = state
        .service
        .create_maintenance_type(req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_maintenance_type(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<MaintenanceTypeDto>, Problem> {
    let found = state
        .service
        .get_maintenance_type(id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(found.into()))
}

pub async fn update_maintenance_type(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<MaintenanceTypeRequest>,
) -> Result<Json<MaintenanceTypeDto>, Problem> {
    let updated = state
        .service
        .update_maintenance_type(id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(updated.into()))
}

pub async fn delete_maintenance_type(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_maintenance_type(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Accounts =====

pub async fn list_accounts(Extension(state): Admin) -> Result<Json<Vec<AccountDto>>, Problem> {
    let accounts = state.service.list_accounts().await.map_err(map_domain_error)?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

pub async fn create_account(
    Extension(state): Admin,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountDto>), Problem> {
    let account = state
        .service
        .create_account(req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn get_account(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<AccountDto>, Problem> {
    let account = state.service.get_account(id).await.map_err(map_domain_error)?;
    Ok(Json(account.into()))
}

pub async fn update_account(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountDto>, Problem> {
    let account = state
        .service
        .update_account(id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(account.into()))
}

pub async fn delete_account(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_account(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Sys Admins =====

pub async fn list_sys_admins(Extension(state): Admin) -> Result<Json<Vec<SysAdminDto>>, Problem> {
    let admins = state
        .service
        .list_sys_admins()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(admins.into_iter().map(Into::into).collect()))
}

pub async fn create_sys_admin(
    Extension(state): Admin,
    Json(req): Json<CreateSysAdminRequest>,
) -> Result<(StatusCode, Json<SysAdminDto>), Problem> {
    let admin = state
        .service
        .create_sys_admin(req.account_id)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}

pub async fn get_sys_admin(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<SysAdminDto>, Problem> {
    let admin = state
        .service
        .get_sys_admin(id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(admin.into()))
}

pub async fn delete_sys_admin(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_sys_admin(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Documentation Records =====

#[derive(Debug, Deserialize)]
pub struct DocumentationListQuery {
    pub page: Option<u64>,
    pub q: Option<String>,
    pub maintenance_type_id: Option<Id>,
}

pub async fn list_documentation(
    Extension(state): Admin,
    Query(query): Query<DocumentationListQuery>,
) -> Result<Json<DocumentationRecordPage>, Problem> {
    let filter = DocumentationFilter {
        maintenance_type_id: query.maintenance_type_id,
        search: query.q,
    };
    let page = state
        .service
        .list_documentation(
            &filter,
            PageRequest::new(query.page.unwrap_or(1), state.paginate_by),
        )
        .await
        .map_err(map_domain_error)?;
    Ok(Json(page.into()))
}

/// Documentation record with its linking maintenance records attached
async fn documentation_with_links(
    state: &AdminState,
    record: crate::contract::DocumentationRecord,
) -> Result<DocumentationRecordDto, Problem> {
    let links = state
        .service
        .documentation_record_links(record.id)
        .await
        .map_err(map_domain_error)?;
    Ok(DocumentationRecordDto {
        maintenance_record_ids: Some(links),
        ..record.into()
    })
}

pub async fn create_documentation(
    Extension(state): Admin,
    Json(req): Json<DocumentationRecordRequest>,
) -> Result<(StatusCode, Json<DocumentationRecordDto>), Problem> {
    let record = state
        .service
        .create_documentation(req.into())
        .await
        .map_err(map_domain_error)?;
    let dto = documentation_with_links(&state, record).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

pub async fn get_documentation(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<DocumentationRecordDto>, Problem> {
    let record = state
        .service
        .get_documentation(id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(documentation_with_links(&state, record).await?))
}

pub async fn update_documentation(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<DocumentationRecordRequest>,
) -> Result<Json<DocumentationRecordDto>, Problem> {
    let record = state
        .service
        .update_documentation(id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(documentation_with_links(&state, record).await?))
}

pub async fn delete_documentation(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_documentation(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Maintenance Records =====

#[derive(Debug, Deserialize)]
pub struct RecordListQuery {
    pub page: Option<u64>,
    pub status: Option<String>,
    pub system_id: Option<Id>,
    pub maintenance_type_id: Option<Id>,
    pub sys_admin_id: Option<Id>,
    pub hardware_id: Option<Id>,
    pub software_id: Option<Id>,
    pub q: Option<String>,
}

pub async fn list_records(
    Extension(state): Admin,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<MaintenanceRecordPage>, Problem> {
    let status = query
        .status
        .as_deref()
        .map(parse_status)
        .transpose()
        .map_err(map_domain_error)?;
    let filter = RecordFilter {
        status,
        system_id: query.system_id,
        maintenance_type_id: query.maintenance_type_id,
        sys_admin_id: query.sys_admin_id,
        hardware_id: query.hardware_id,
        software_id: query.software_id,
        search: query.q,
    };
    let page = state
        .service
        .list_records(
            &filter,
            PageRequest::new(query.page.unwrap_or(1), state.paginate_by),
        )
        .await
        .map_err(map_domain_error)?;
    Ok(Json(page.into()))
}

pub async fn create_record(
    Extension(state): Admin,
    Json(req): Json<MaintenanceRecordRequest>,
) -> Result<(StatusCode, Json<MaintenanceRecordDto>), Problem> {
    let input = MaintenanceRecordInput::try_from(req).map_err(map_domain_error)?;
    let record = state
        .service
        .create_record(input)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn get_record(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<MaintenanceRecordDto>, Problem> {
    let record = state.service.get_record(id).await.map_err(map_domain_error)?;
    Ok(Json(record.into()))
}

pub async fn update_record(
    Extension(state): Admin,
    Path(id): Path<Id>,
    Json(req): Json<MaintenanceRecordRequest>,
) -> Result<Json<MaintenanceRecordDto>, Problem> {
    let input = MaintenanceRecordInput::try_from(req).map_err(map_domain_error)?;
    let record = state
        .service
        .update_record(id, input)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(record.into()))
}

pub async fn delete_record(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_record(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Relationships =====

pub async fn list_relationships(
    Extension(state): Admin,
) -> Result<Json<Vec<RelationshipDto>>, Problem> {
    let edges = state
        .service
        .list_relationships()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(edges.into_iter().map(Into::into).collect()))
}

pub async fn create_relationship(
    Extension(state): Admin,
    Json(req): Json<CreateRelationshipRequest>,
) -> Result<(StatusCode, Json<RelationshipDto>), Problem> {
    let edge = state
        .service
        .add_relationship(req.referencing_record_id, req.referenced_record_id)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(edge.into())))
}

pub async fn get_relationship(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<Json<RelationshipDto>, Problem> {
    let edge = state
        .service
        .get_relationship(id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(edge.into()))
}

pub async fn delete_relationship(
    Extension(state): Admin,
    Path(id): Path<Id>,
) -> Result<StatusCode, Problem> {
    state
        .service
        .delete_relationship(id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}
