//! OpenAPI document for the admin console schemas

use super::{dto::*, error::Problem};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "System Maintenance Admin API",
        description = "Super-admin console for systems, records and documentation"
    ),
    components(schemas(
        SystemDto,
        SystemRequest,
        NamedItemDto,
        NamedItemRequest,
        MaintenanceTypeDto,
        MaintenanceTypeRequest,
        AccountDto,
        CreateAccountRequest,
        UpdateAccountRequest,
        SysAdminDto,
        CreateSysAdminRequest,
        MarkupDto,
        MarkupRequest,
        DocumentationRecordDto,
        DocumentationRecordRequest,
        DocumentationRecordPage,
        MaintenanceRecordDto,
        MaintenanceRecordRequest,
        MaintenanceRecordPage,
        RelationshipDto,
        CreateRelationshipRequest,
        Problem,
    )),
    tags((name = "admin", description = "System maintenance administration"))
)]
pub struct AdminApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_record_schemas() {
        let doc = AdminApiDoc::openapi();
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("MaintenanceRecordDto"));
        assert!(schemas.contains_key("Problem"));
    }
}
