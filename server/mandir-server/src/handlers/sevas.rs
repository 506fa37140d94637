//! Seva catalog and bookings.
//!
//! Bookings post to the ledger through the seva income account configured on
//! the seva, falling back to the default seva income code.

use accounting_service::posting::{PostingService, SevaPosting};
use accounting_service::sequence::next_document_number;
use accounting_service::JournalService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::donations::PAYMENT_MODES;
use crate::middleware::{AuthContext, ROLE_ADMIN};
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_one_of, validate_positive, validate_required};

pub const BOOKING_STATUSES: [&str; 3] = ["booked", "performed", "cancelled"];

/// Seva catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Seva {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    /// Income account override for ledger postings
    pub income_account_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seva booking record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SevaBooking {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub booking_number: String,
    pub seva_id: Uuid,
    pub devotee_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub seva_date: NaiveDate,
    pub devotee_name: String,
    pub gotra: Option<String>,
    pub sankalpa: Option<String>,
    pub amount: Decimal,
    pub payment_mode: String,
    pub status: String,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Seva Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSevaRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub income_account_id: Option<Uuid>,
}

impl RequestValidation for CreateSevaRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.code, "Seva code is required");
        validate_required!(self.name, "Seva name is required");
        validate_positive!(self.amount, "Seva amount must be positive");
        Ok(())
    }
}

/// Update Seva Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSevaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub income_account_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Create Seva Booking Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub seva_id: Uuid,
    pub devotee_id: Option<Uuid>,
    pub seva_date: NaiveDate,
    pub devotee_name: String,
    pub gotra: Option<String>,
    pub sankalpa: Option<String>,
    /// Defaults to the seva catalog amount when omitted
    pub amount: Option<Decimal>,
    pub payment_mode: String,
}

impl RequestValidation for CreateBookingRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.devotee_name, "Devotee name is required");
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        if let Some(amount) = self.amount {
            validate_field!(amount, amount > Decimal::ZERO, "Amount must be positive");
        }
        Ok(())
    }
}

/// List Bookings Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsParams {
    pub seva_id: Option<Uuid>,
    pub status: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Booking write response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub booking: SevaBooking,
    pub accounting_posted: bool,
}

/// Add a seva to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/sevas",
    request_body = CreateSevaRequest,
    responses(
        (status = 201, description = "Seva created", body = Seva),
        (status = 400, description = "Invalid request")
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn create_seva(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateSevaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Seva>>), ApiError> {
    request.validate()?;

    let duplicate: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM sevas WHERE temple_id = $1 AND code = $2")
            .bind(auth.temple_id)
            .bind(request.code.trim())
            .fetch_optional(&server.db_pool)
            .await?;
    if duplicate.is_some() {
        return Err(ApiError::validation(format!(
            "Seva code {} already exists",
            request.code.trim()
        )));
    }

    let seva = sqlx::query_as::<_, Seva>(
        r#"
        INSERT INTO sevas (
            id, temple_id, code, name, description, amount, income_account_id,
            is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, true, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(request.code.trim())
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(request.amount)
    .bind(request.income_account_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(api_success(seva))))
}

/// List the seva catalog
#[utoipa::path(
    get,
    path = "/api/v1/sevas",
    responses(
        (status = 200, description = "Sevas retrieved", body = Vec<Seva>)
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn list_sevas(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Seva>>>, ApiError> {
    let sevas = sqlx::query_as::<_, Seva>(
        "SELECT * FROM sevas WHERE temple_id = $1 AND is_active = true ORDER BY code",
    )
    .bind(auth.temple_id)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(sevas)))
}

/// Update a seva
#[utoipa::path(
    put,
    path = "/api/v1/sevas/{seva_id}",
    params(("seva_id" = Uuid, Path, description = "Seva ID")),
    request_body = UpdateSevaRequest,
    responses(
        (status = 200, description = "Seva updated", body = Seva),
        (status = 404, description = "Seva not found")
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn update_seva(
    State(server): State<MandirServer>,
    Path(seva_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<UpdateSevaRequest>,
) -> Result<Json<ApiResponse<Seva>>, ApiError> {
    if let Some(amount) = request.amount {
        validate_field!(amount, amount > Decimal::ZERO, "Amount must be positive");
    }

    let seva = sqlx::query_as::<_, Seva>(
        r#"
        UPDATE sevas
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            amount = COALESCE($3, amount),
            income_account_id = COALESCE($4, income_account_id),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $6 AND temple_id = $7
        RETURNING *
        "#,
    )
    .bind(&request.name)
    .bind(&request.description)
    .bind(request.amount)
    .bind(request.income_account_id)
    .bind(request.is_active)
    .bind(seva_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("seva"))?;

    Ok(Json(api_success(seva)))
}

/// Book a seva and post the collection to the ledger
#[utoipa::path(
    post,
    path = "/api/v1/sevas/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Seva booked", body = BookingResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Seva not found")
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), ApiError> {
    request.validate()?;

    let seva = sqlx::query_as::<_, Seva>(
        "SELECT * FROM sevas WHERE id = $1 AND temple_id = $2 AND is_active = true",
    )
    .bind(request.seva_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("seva"))?;

    let amount = request.amount.unwrap_or(seva.amount);

    let mut tx = server.db_pool.begin().await?;
    let booking_number = next_document_number(
        &mut *tx,
        auth.temple_id,
        "seva_bookings",
        "booking_number",
        "SEV",
    )
    .await?;

    let booking = sqlx::query_as::<_, SevaBooking>(
        r#"
        INSERT INTO seva_bookings (
            id, temple_id, booking_number, seva_id, devotee_id, booking_date,
            seva_date, devotee_name, gotra, sankalpa, amount, payment_mode,
            status, journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, CURRENT_DATE, $6, $7, $8, $9, $10, $11,
                  'booked', NULL, $12, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&booking_number)
    .bind(seva.id)
    .bind(request.devotee_id)
    .bind(request.seva_date)
    .bind(request.devotee_name.trim())
    .bind(&request.gotra)
    .bind(&request.sankalpa)
    .bind(amount)
    .bind(&request.payment_mode)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_seva_booking(
            auth.temple_id,
            auth.user_id,
            &SevaPosting {
                booking_id: booking.id,
                booking_number: booking.booking_number.clone(),
                seva_name: seva.name.clone(),
                booking_date: booking.booking_date,
                amount: booking.amount,
                payment_mode: booking.payment_mode.clone(),
                income_account_id: seva.income_account_id,
            },
        )
        .await;

    let booking = match &entry {
        Some(journal) => sqlx::query_as::<_, SevaBooking>(
            "UPDATE seva_bookings SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(booking.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => booking,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "seva_booking", booking.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(BookingResponse {
            accounting_posted: entry.is_some(),
            booking,
        })),
    ))
}

/// List seva bookings
#[utoipa::path(
    get,
    path = "/api/v1/sevas/bookings",
    params(ListBookingsParams),
    responses(
        (status = 200, description = "Bookings retrieved", body = Vec<SevaBooking>)
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    State(server): State<MandirServer>,
    Query(params): Query<ListBookingsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<SevaBooking>>>, ApiError> {
    if let Some(ref status) = params.status {
        validate_one_of!(
            status,
            BOOKING_STATUSES,
            format!("Status must be one of: {}", BOOKING_STATUSES.join(", "))
        );
    }

    let mut count_query = PaginatedQuery::new("SELECT COUNT(*) FROM seva_bookings WHERE 1=1");
    count_query
        .filter_temple(auth.temple_id)
        .filter_eq("seva_id", params.seva_id)
        .filter_eq("status", params.status.as_deref())
        .filter_date_range("seva_date", params.from_date, params.to_date);
    let total: i64 = count_query.build_scalar().fetch_one(&server.db_pool).await?;

    let mut query = PaginatedQuery::new("SELECT * FROM seva_bookings WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("seva_id", params.seva_id)
        .filter_eq("status", params.status.as_deref())
        .filter_date_range("seva_date", params.from_date, params.to_date)
        .order_by("seva_date", "DESC")
        .paginate(&params.pagination);
    let bookings: Vec<SevaBooking> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(params.pagination.wrap_response(bookings, total)))
}

/// Mark a booking as performed
#[utoipa::path(
    put,
    path = "/api/v1/sevas/bookings/{booking_id}/perform",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking marked performed", body = SevaBooking),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Booking not found")
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn mark_booking_performed(
    State(server): State<MandirServer>,
    Path(booking_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<SevaBooking>>, ApiError> {
    let booking = fetch_booking(&server, auth.temple_id, booking_id).await?;
    if booking.status != "booked" {
        return Err(ApiError::validation(format!(
            "Only booked sevas can be marked performed, {} is {}",
            booking.booking_number, booking.status
        )));
    }

    let booking = sqlx::query_as::<_, SevaBooking>(
        "UPDATE seva_bookings SET status = 'performed' WHERE id = $1 AND temple_id = $2 RETURNING *",
    )
    .bind(booking_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(booking)))
}

/// Cancel Booking Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelBookingRequest {
    pub reason: String,
}

/// Cancel a booking (admin only). The ledger entry, if any, is reversed.
#[utoipa::path(
    put,
    path = "/api/v1/sevas/bookings/{booking_id}/cancel",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = SevaBooking),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "sevas",
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(server): State<MandirServer>,
    Path(booking_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<ApiResponse<SevaBooking>>, ApiError> {
    auth.require_role(ROLE_ADMIN)?;

    let booking = fetch_booking(&server, auth.temple_id, booking_id).await?;
    if booking.status == "cancelled" {
        return Err(ApiError::validation(format!(
            "Booking {} is already cancelled",
            booking.booking_number
        )));
    }

    // Reverse the ledger entry first so a failed reversal leaves the
    // booking untouched
    if let Some(journal_entry_id) = booking.journal_entry_id {
        let journal = JournalService::new(server.db_pool.clone());
        journal
            .cancel_entry(auth.temple_id, journal_entry_id, auth.user_id, &request.reason)
            .await?;
    }

    let booking = sqlx::query_as::<_, SevaBooking>(
        "UPDATE seva_bookings SET status = 'cancelled' WHERE id = $1 AND temple_id = $2 RETURNING *",
    )
    .bind(booking_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "seva_booking",
            booking_id,
            "cancel",
            Some(serde_json::json!({"reason": request.reason})),
        )
        .await;

    Ok(Json(api_success(booking)))
}

async fn fetch_booking(
    server: &MandirServer,
    temple_id: Uuid,
    booking_id: Uuid,
) -> Result<SevaBooking, ApiError> {
    sqlx::query_as::<_, SevaBooking>(
        "SELECT * FROM seva_bookings WHERE id = $1 AND temple_id = $2",
    )
    .bind(booking_id)
    .bind(temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("seva_booking"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_request_validation() {
        let req = CreateBookingRequest {
            seva_id: Uuid::new_v4(),
            devotee_id: None,
            seva_date: NaiveDate::from_ymd_opt(2026, 4, 20).unwrap(),
            devotee_name: "Lakshmi Devi".to_string(),
            gotra: Some("Kashyapa".to_string()),
            sankalpa: None,
            amount: None,
            payment_mode: "upi".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_booking_negative_amount_rejected() {
        let req = CreateBookingRequest {
            seva_id: Uuid::new_v4(),
            devotee_id: None,
            seva_date: NaiveDate::from_ymd_opt(2026, 4, 20).unwrap(),
            devotee_name: "Lakshmi Devi".to_string(),
            gotra: None,
            sankalpa: None,
            amount: Some(Decimal::new(-100, 0)),
            payment_mode: "cash".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_seva_request_validation() {
        let req = CreateSevaRequest {
            code: "ABHI01".to_string(),
            name: "Abhishekam".to_string(),
            description: None,
            amount: Decimal::new(116000, 2),
            income_account_id: None,
        };
        assert!(req.validate().is_ok());
    }
}
