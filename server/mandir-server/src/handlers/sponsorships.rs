//! Sponsorship commitments and payments.
//!
//! A commitment raises a receivable against sponsorship income; each payment
//! clears part of the receivable. Status rolls committed → partially_paid →
//! fulfilled as money arrives.

use accounting_service::posting::PostingService;
use accounting_service::sequence::next_document_number;
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
use crate::middleware::AuthContext;
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_one_of, validate_positive, validate_required};

/// Sponsorship record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Sponsorship {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub sponsorship_number: String,
    pub devotee_id: Option<Uuid>,
    pub sponsor_name: String,
    pub program_name: String,
    pub commitment_date: NaiveDate,
    pub commitment_amount: Decimal,
    pub received_amount: Decimal,
    pub status: String,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Sponsorship Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSponsorshipRequest {
    pub devotee_id: Option<Uuid>,
    pub sponsor_name: String,
    pub program_name: String,
    pub commitment_date: NaiveDate,
    pub commitment_amount: Decimal,
}

impl RequestValidation for CreateSponsorshipRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.sponsor_name, "Sponsor name is required");
        validate_required!(self.program_name, "Program name is required");
        validate_positive!(self.commitment_amount, "Commitment amount must be positive");
        Ok(())
    }
}

/// Record Sponsorship Payment Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SponsorshipPaymentRequest {
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
}

impl RequestValidation for SponsorshipPaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_positive!(self.amount, "Payment amount must be positive");
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        Ok(())
    }
}

/// List Sponsorships Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSponsorshipsParams {
    pub status: Option<String>,
    pub devotee_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Sponsorship write response
#[derive(Debug, Serialize, ToSchema)]
pub struct SponsorshipResponse {
    pub sponsorship: Sponsorship,
    pub accounting_posted: bool,
}

/// Next status after applying a payment.
pub fn rolled_status(commitment: Decimal, received: Decimal) -> &'static str {
    if received >= commitment {
        "fulfilled"
    } else if received > Decimal::ZERO {
        "partially_paid"
    } else {
        "committed"
    }
}

/// Record a sponsorship commitment
#[utoipa::path(
    post,
    path = "/api/v1/sponsorships",
    request_body = CreateSponsorshipRequest,
    responses(
        (status = 201, description = "Sponsorship recorded", body = SponsorshipResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "sponsorships",
    security(("bearer_auth" = []))
)]
pub async fn create_sponsorship(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateSponsorshipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SponsorshipResponse>>), ApiError> {
    request.validate()?;

    let mut tx = server.db_pool.begin().await?;
    let sponsorship_number = next_document_number(
        &mut *tx,
        auth.temple_id,
        "sponsorships",
        "sponsorship_number",
        "SP",
    )
    .await?;

    let sponsorship = sqlx::query_as::<_, Sponsorship>(
        r#"
        INSERT INTO sponsorships (
            id, temple_id, sponsorship_number, devotee_id, sponsor_name,
            program_name, commitment_date, commitment_amount, received_amount,
            status, journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 'committed', NULL, $9, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&sponsorship_number)
    .bind(request.devotee_id)
    .bind(request.sponsor_name.trim())
    .bind(request.program_name.trim())
    .bind(request.commitment_date)
    .bind(request.commitment_amount)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_sponsorship_commitment(
            auth.temple_id,
            auth.user_id,
            sponsorship.id,
            &sponsorship.sponsorship_number,
            sponsorship.commitment_date,
            sponsorship.commitment_amount,
        )
        .await;

    let sponsorship = match &entry {
        Some(journal) => sqlx::query_as::<_, Sponsorship>(
            "UPDATE sponsorships SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(sponsorship.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => sponsorship,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "sponsorship", sponsorship.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(SponsorshipResponse {
            accounting_posted: entry.is_some(),
            sponsorship,
        })),
    ))
}

/// Record a payment against a sponsorship
#[utoipa::path(
    post,
    path = "/api/v1/sponsorships/{sponsorship_id}/payments",
    params(("sponsorship_id" = Uuid, Path, description = "Sponsorship ID")),
    request_body = SponsorshipPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = SponsorshipResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Sponsorship not found")
    ),
    tag = "sponsorships",
    security(("bearer_auth" = []))
)]
pub async fn record_sponsorship_payment(
    State(server): State<MandirServer>,
    Path(sponsorship_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<SponsorshipPaymentRequest>,
) -> Result<Json<ApiResponse<SponsorshipResponse>>, ApiError> {
    request.validate()?;

    let sponsorship = sqlx::query_as::<_, Sponsorship>(
        "SELECT * FROM sponsorships WHERE id = $1 AND temple_id = $2",
    )
    .bind(sponsorship_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("sponsorship"))?;

    if sponsorship.status == "cancelled" {
        return Err(ApiError::validation(format!(
            "Sponsorship {} is cancelled",
            sponsorship.sponsorship_number
        )));
    }

    let new_received = sponsorship.received_amount + request.amount;
    if new_received > sponsorship.commitment_amount {
        return Err(ApiError::validation(format!(
            "Payment would exceed commitment: {} received of {} committed",
            sponsorship.received_amount, sponsorship.commitment_amount
        )));
    }

    let status = rolled_status(sponsorship.commitment_amount, new_received);
    let sponsorship = sqlx::query_as::<_, Sponsorship>(
        "UPDATE sponsorships SET received_amount = $1, status = $2 \
         WHERE id = $3 AND temple_id = $4 RETURNING *",
    )
    .bind(new_received)
    .bind(status)
    .bind(sponsorship_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_sponsorship_payment(
            auth.temple_id,
            auth.user_id,
            sponsorship.id,
            &sponsorship.sponsorship_number,
            request.payment_date,
            request.amount,
            &request.payment_mode,
        )
        .await;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "sponsorship",
            sponsorship_id,
            "payment",
            Some(serde_json::json!({"amount": request.amount})),
        )
        .await;

    Ok(Json(api_success(SponsorshipResponse {
        accounting_posted: entry.is_some(),
        sponsorship,
    })))
}

/// List sponsorships
#[utoipa::path(
    get,
    path = "/api/v1/sponsorships",
    params(ListSponsorshipsParams),
    responses(
        (status = 200, description = "Sponsorships retrieved", body = Vec<Sponsorship>)
    ),
    tag = "sponsorships",
    security(("bearer_auth" = []))
)]
pub async fn list_sponsorships(
    State(server): State<MandirServer>,
    Query(params): Query<ListSponsorshipsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Sponsorship>>>, ApiError> {
    let mut count_query = PaginatedQuery::new("SELECT COUNT(*) FROM sponsorships WHERE 1=1");
    count_query
        .filter_temple(auth.temple_id)
        .filter_eq("status", params.status.as_deref())
        .filter_eq("devotee_id", params.devotee_id);
    let total: i64 = count_query.build_scalar().fetch_one(&server.db_pool).await?;

    let mut query = PaginatedQuery::new("SELECT * FROM sponsorships WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("status", params.status.as_deref())
        .filter_eq("devotee_id", params.devotee_id)
        .order_by("commitment_date", "DESC")
        .paginate(&params.pagination);
    let sponsorships: Vec<Sponsorship> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(params.pagination.wrap_response(sponsorships, total)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rolls_with_payments() {
        let commitment = Decimal::new(100000, 2);
        assert_eq!(rolled_status(commitment, Decimal::ZERO), "committed");
        assert_eq!(rolled_status(commitment, Decimal::new(40000, 2)), "partially_paid");
        assert_eq!(rolled_status(commitment, Decimal::new(100000, 2)), "fulfilled");
    }

    #[test]
    fn test_payment_request_validation() {
        let req = SponsorshipPaymentRequest {
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            amount: Decimal::new(25000, 2),
            payment_mode: "cheque".to_string(),
        };
        assert!(req.validate().is_ok());

        let bad = SponsorshipPaymentRequest {
            amount: Decimal::ZERO,
            ..req
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_commitment_request_validation() {
        let req = CreateSponsorshipRequest {
            devotee_id: None,
            sponsor_name: "Sri Venkatesh".to_string(),
            program_name: "Brahmotsavam".to_string(),
            commitment_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            commitment_amount: Decimal::new(5000000, 2),
        };
        assert!(req.validate().is_ok());
    }
}
