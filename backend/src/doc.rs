//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the schema wrappers that document domain types without coupling them
//! to utoipa. The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::goats::{RegisterGoatRequestBody, RegisterGoatResponseBody};
use crate::inbound::http::orders::{
    FinalizeOrderRequestBody, FinalizeOrderResponseBody, VerifyOrderRequestBody,
    VerifyOrderResponseBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, MessageSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatekeeper API",
        description = "Idempotent request admission in front of goat registration and order workflows."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::goats::register_goat,
        crate::inbound::http::orders::verify_order,
        crate::inbound::http::orders::finalize_order,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MessageSchema,
        RegisterGoatRequestBody,
        RegisterGoatResponseBody,
        VerifyOrderRequestBody,
        VerifyOrderResponseBody,
        FinalizeOrderRequestBody,
        FinalizeOrderResponseBody,
    )),
    tags(
        (name = "goats", description = "Goat registration behind the admission gate"),
        (name = "workflow", description = "Order workflow idempotency steps"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
