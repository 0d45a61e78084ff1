use std::sync::Arc;

use adspace_sdk::{BookingStatusChange, MediaUpload};
use axum::Json;
use axum::extract::{Extension, Multipart, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::field::Empty;
use uuid::Uuid;

use super::auth::{AgencyPrincipal, CompanyPrincipal};
use super::dto::{
    ActivateSubscriptionReq, AgencyDto, BookingDto, CreateBookingReq, DEFAULT_TOP_LIMIT,
    FormFields, ListingDto, RankedAgencyDto, SetBookingStatusReq, SetListingActiveReq,
    StatusSnapshotDto, TopAgenciesQuery,
};
use super::problem::{ApiResult, Problem};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// A multipart body split into text parts and the single file part named `file_part`.
struct MultipartForm {
    fields: FormFields,
    file: Option<MediaUpload>,
}

async fn read_multipart(mut multipart: Multipart, file_part: &str) -> ApiResult<MultipartForm> {
    let mut form = MultipartForm {
        fields: FormFields::default(),
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Problem::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        if name == file_part {
            let file_name = field.file_name().map(ToOwned::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Problem::bad_request(format!("Failed to read '{name}': {e}")))?;
            form.file = Some(MediaUpload {
                bytes: bytes.to_vec(),
                file_name,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| Problem::bad_request(format!("Failed to read '{name}': {e}")))?;
            form.fields.0.insert(name, text);
        }
    }

    Ok(form)
}

fn required_file(file: Option<MediaUpload>, part: &str) -> Result<MediaUpload, DomainError> {
    file.ok_or_else(|| DomainError::validation(part, "file is required"))
}

#[tracing::instrument(skip(svc), fields(agency_id = %agency_id))]
pub async fn get_subscription(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
) -> ApiResult<Json<StatusSnapshotDto>> {
    let snapshot = svc.get_subscription_status(agency_id).await?;
    Ok(Json(snapshot.into()))
}

#[tracing::instrument(skip(svc, req), fields(agency_id = %agency_id))]
pub async fn activate_subscription(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    Json(req): Json<ActivateSubscriptionReq>,
) -> ApiResult<Json<StatusSnapshotDto>> {
    let snapshot = svc
        .activate_subscription(agency_id, &req.plan_name)
        .await?;
    Ok(Json(snapshot.into()))
}

#[tracing::instrument(skip(svc, multipart), fields(agency_id = %agency_id))]
pub async fn update_profile(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    multipart: Multipart,
) -> ApiResult<Json<AgencyDto>> {
    let form = read_multipart(multipart, "logo").await?;
    let agency = svc
        .update_agency_profile(agency_id, form.fields.profile_patch(), form.file)
        .await?;
    Ok(Json(agency.into()))
}

#[tracing::instrument(skip(svc, multipart), fields(agency_id = %agency_id))]
pub async fn upload_verification_document(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    multipart: Multipart,
) -> ApiResult<Json<AgencyDto>> {
    let form = read_multipart(multipart, "document").await?;
    let document = required_file(form.file, "document")?;
    let agency = svc
        .upload_verification_document(agency_id, document)
        .await?;
    Ok(Json(agency.into()))
}

pub async fn top_agencies(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<TopAgenciesQuery>,
) -> ApiResult<Json<Vec<RankedAgencyDto>>> {
    let ranked = svc
        .top_agencies_by_bookings(query.limit.unwrap_or(DEFAULT_TOP_LIMIT))
        .await?;
    Ok(Json(ranked.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(svc, multipart), fields(agency_id = %agency_id, listing_id = Empty))]
pub async fn create_listing(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_multipart(multipart, "image").await?;
    let new_listing = form.fields.new_listing()?;
    let image = required_file(form.file, "image")?;

    let listing = svc.create_listing(agency_id, new_listing, image).await?;
    tracing::Span::current().record("listing_id", tracing::field::display(listing.id));

    let dto: ListingDto = listing.into();
    Ok((StatusCode::CREATED, Json(dto)))
}

#[tracing::instrument(
    skip(svc, multipart),
    fields(agency_id = %agency_id, listing_id = %listing_id)
)]
pub async fn update_listing(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    Path(listing_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ListingDto>> {
    let form = read_multipart(multipart, "image").await?;
    let patch = form.fields.listing_patch()?;
    let listing = svc
        .update_listing(listing_id, agency_id, patch, form.file)
        .await?;
    Ok(Json(listing.into()))
}

#[tracing::instrument(skip(svc, req), fields(agency_id = %agency_id, listing_id = %listing_id))]
pub async fn set_listing_active(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<SetListingActiveReq>,
) -> ApiResult<Json<ListingDto>> {
    let listing = svc
        .set_listing_active(listing_id, agency_id, req.is_active)
        .await?;
    Ok(Json(listing.into()))
}

#[tracing::instrument(skip(svc), fields(agency_id = %agency_id, listing_id = %listing_id))]
pub async fn delete_listing(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    svc.delete_listing(listing_id, agency_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    skip(svc, req),
    fields(company_id = %company_id, listing_id = %req.listing_id)
)]
pub async fn create_booking(
    Extension(svc): Extension<Arc<Service>>,
    CompanyPrincipal(company_id): CompanyPrincipal,
    Json(req): Json<CreateBookingReq>,
) -> ApiResult<impl IntoResponse> {
    let booking = svc.create_booking(company_id, req.into()).await?;
    let dto: BookingDto = booking.into();
    Ok((StatusCode::CREATED, Json(dto)))
}

#[tracing::instrument(skip(svc, req), fields(agency_id = %agency_id, booking_id = %booking_id))]
pub async fn set_booking_status(
    Extension(svc): Extension<Arc<Service>>,
    AgencyPrincipal(agency_id): AgencyPrincipal,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<SetBookingStatusReq>,
) -> ApiResult<Json<BookingDto>> {
    let change = BookingStatusChange::try_from(req)?;
    let booking = svc
        .set_booking_status(booking_id, agency_id, change)
        .await?;
    Ok(Json(booking.into()))
}

#[tracing::instrument(skip(svc), fields(company_id = %company_id, booking_id = %booking_id))]
pub async fn cancel_booking(
    Extension(svc): Extension<Arc<Service>>,
    CompanyPrincipal(company_id): CompanyPrincipal,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    svc.cancel_booking(booking_id, company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
