//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the five `/functions/v1` RPCs
//! and the health probes, plus the bearer token security scheme. The
//! document backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Approval, Availability, AvailabilityDraft, AvailabilityStatus, Bike, BikeModel, BoardOccupant,
    BoardRegistration, BoardSlot, Error, ErrorCode, FrameNumberReading, Language, Permission,
    RepairType, RepairTypeDraft, Role, TableBoard, TvAnnouncement, WorkRegistration,
    WorkflowStatus, WorkflowStatusInfo,
};
use crate::inbound::http::{
    accounts, announcements, availability, bikes, functions, health, price_list, registrations, tv,
};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque access token issued by the identity provider."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API and RPC functions.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Workshop backend API",
        description = "Bikes, repair workflow, staff administration and the TV board."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        functions::verify_admin_password,
        functions::promote_to_admin,
        functions::hash_password,
        functions::delete_user,
        functions::ocr_frame_number,
        accounts::current_account,
        accounts::list_accounts,
        accounts::update_account_flags,
        accounts::set_account_role,
        accounts::set_account_permissions,
        bikes::list_bikes,
        bikes::intake_bike,
        bikes::get_bike,
        bikes::update_status,
        bikes::assign_table,
        bikes::assign_mechanic,
        bikes::list_registrations,
        bikes::propose_registration,
        registrations::decide_registration,
        registrations::complete_registration,
        price_list::list_repair_types,
        price_list::create_repair_type,
        price_list::update_repair_type,
        price_list::set_repair_type_active,
        availability::submit_availability,
        availability::list_availability,
        availability::decide_availability,
        announcements::visible_announcements,
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::set_announcement_active,
        announcements::delete_announcement,
        tv::table_board,
        tv::workflow_statuses,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Permission,
        Language,
        WorkflowStatus,
        WorkflowStatusInfo,
        Bike,
        BikeModel,
        WorkRegistration,
        Approval,
        RepairType,
        RepairTypeDraft,
        Availability,
        AvailabilityDraft,
        AvailabilityStatus,
        TvAnnouncement,
        TableBoard,
        BoardSlot,
        BoardOccupant,
        BoardRegistration,
        FrameNumberReading,
        accounts::AccountResponse,
        functions::VerifyAdminPasswordRequest,
        functions::VerifyAdminPasswordResponse,
        functions::PasswordRequest,
        functions::PromoteToAdminResponse,
        functions::HashPasswordResponse,
        functions::DeleteUserRequest,
        functions::DeleteUserResponse,
        functions::OcrFrameNumberRequest,
    )),
    tags(
        (name = "functions", description = "Privileged RPC functions"),
        (name = "accounts", description = "Staff accounts, roles and permissions"),
        (name = "bikes", description = "Bike intake and the repair workflow"),
        (name = "price_list", description = "Repair types and prices"),
        (name = "availability", description = "Staff availability"),
        (name = "tv", description = "TV board and announcements"),
        (name = "workflow", description = "Workflow reference data"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "Error";

    #[test]
    fn error_schema_has_payload_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let Some(RefOr::T(Schema::Object(error))) = schemas.get(ERROR_SCHEMA_NAME) else {
            panic!("expected Error object schema");
        };
        for field in ["code", "message", "traceId", "details"] {
            assert!(error.properties.contains_key(field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/functions/v1/verify-admin-password")]
    #[case("/functions/v1/promote-to-admin")]
    #[case("/functions/v1/hash-password")]
    #[case("/functions/v1/delete-user")]
    #[case("/functions/v1/ocr-frame-number")]
    #[case("/api/v1/tv/board")]
    #[case("/health/ready")]
    fn documents_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
