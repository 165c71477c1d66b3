use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::middlewares::ADMIN_PASSPHRASE_HEADER;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_passphrase",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_PASSPHRASE_HEADER))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::promotion::get_catalog,
        handlers::promotion::register,
        handlers::admin::list_grand,
        handlers::admin::list_instant_wins,
        handlers::admin::set_redeemed,
        handlers::admin::set_note,
        handlers::admin::prize_counts,
        handlers::admin::clear_all,
    ),
    components(
        schemas(
            PrizeKind,
            AssignedPrize,
            PrizeResponse,
            PrizeCountResponse,
            BranchResponse,
            ScratchSettingsResponse,
            CatalogResponse,
            Order,
            RegisterOrderRequest,
            RegisterOrderResponse,
            UpdateRedeemedRequest,
            UpdateNoteRequest,
            ClearAllRequest,
            ClearAllResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "promotion", description = "Scratch card registration API"),
        (name = "admin", description = "Campaign administration API"),
    ),
    info(
        title = "Scratch Promotion API",
        version = "1.0.0",
        description = "Venue scratch-card promotion REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
