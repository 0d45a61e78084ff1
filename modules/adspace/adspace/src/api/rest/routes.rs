use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::api::rest::auth::TokenVerifier;
use crate::api::rest::{dto, handlers, problem};
use crate::domain::service::Service;

/// Headroom for the non-file parts of a multipart body.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "Adspace API", description = "Ad-placement marketplace"),
    components(schemas(
        dto::StatusSnapshotDto,
        dto::ActivateSubscriptionReq,
        dto::MediaDto,
        dto::AgencyDto,
        dto::ListingDto,
        dto::SetListingActiveReq,
        dto::BookingDto,
        dto::CreateBookingReq,
        dto::SetBookingStatusReq,
        dto::RankedAgencyDto,
        problem::Problem,
        problem::ValidationViolation,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the `/adspace/v1` router with the service and token verifier attached.
pub fn router(service: Arc<Service>, verifier: Arc<TokenVerifier>) -> Router {
    let body_limit = service.config().media.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let api = Router::new()
        .route(
            "/agencies/me/subscription",
            get(handlers::get_subscription).post(handlers::activate_subscription),
        )
        .route("/agencies/me/profile", patch(handlers::update_profile))
        .route(
            "/agencies/me/verification-document",
            put(handlers::upload_verification_document),
        )
        .route("/agencies/top", get(handlers::top_agencies))
        .route("/listings", post(handlers::create_listing))
        .route(
            "/listings/{id}",
            patch(handlers::update_listing).delete(handlers::delete_listing),
        )
        .route("/listings/{id}/active", put(handlers::set_listing_active))
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/{id}", delete(handlers::cancel_booking))
        .route("/bookings/{id}/status", put(handlers::set_booking_status))
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .nest("/adspace/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(service))
        .layer(Extension(verifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_problem_and_dto_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.unwrap().schemas;
        for name in ["Problem", "ListingDto", "BookingDto", "StatusSnapshotDto"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
