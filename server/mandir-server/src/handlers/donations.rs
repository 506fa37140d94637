//! Donation receipting, CSV import/export and hundi collections.
//!
//! Every donation write attempts a ledger posting through the journal
//! engine. Posting is best-effort: the receipt is saved even when the
//! posting fails, and the response carries `accounting_posted: false`.

use accounting_service::posting::{DonationPosting, PostingService};
use accounting_service::sequence::next_document_number;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{TenantContext, TransactionManager};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::csv_io::{column_index, parse_amount, parse_flexible_date, read_csv_records, to_csv_string};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_one_of, validate_positive, validate_required};

pub const DONATION_CATEGORIES: [&str; 5] =
    ["general", "annadanam", "construction", "corpus", "other"];
pub const PAYMENT_MODES: [&str; 5] = ["cash", "bank", "upi", "cheque", "card"];

/// Donation record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub receipt_number: String,
    pub devotee_id: Option<Uuid>,
    pub donation_date: NaiveDate,
    pub category: String,
    pub payment_mode: String,
    pub amount: Decimal,
    pub purpose: Option<String>,
    pub pan_number: Option<String>,
    pub eligible_80g: bool,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Hundi collection record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct HundiCollection {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub hundi_code: String,
    pub collection_number: String,
    pub opened_date: NaiveDate,
    pub counted_amount: Decimal,
    pub counted_by: String,
    pub witness_names: Option<String>,
    pub remarks: Option<String>,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Donation Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDonationRequest {
    pub devotee_id: Option<Uuid>,
    pub donation_date: NaiveDate,
    pub category: String,
    pub payment_mode: String,
    pub amount: Decimal,
    pub purpose: Option<String>,
    pub pan_number: Option<String>,
    /// Request an 80G-eligible receipt; requires a PAN
    #[serde(default)]
    pub eligible_80g: bool,
}

impl RequestValidation for CreateDonationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_positive!(self.amount, "Donation amount must be positive");
        validate_one_of!(
            self.category,
            DONATION_CATEGORIES,
            format!("Category must be one of: {}", DONATION_CATEGORIES.join(", "))
        );
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        if self.eligible_80g {
            validate_field!(
                self.pan_number,
                self.pan_number.as_deref().is_some_and(|p| p.len() == 10),
                "80G receipts require a 10-character PAN"
            );
        }
        Ok(())
    }
}

/// Create Hundi Collection Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateHundiCollectionRequest {
    pub hundi_code: String,
    pub opened_date: NaiveDate,
    pub counted_amount: Decimal,
    pub counted_by: String,
    pub witness_names: Option<String>,
    pub remarks: Option<String>,
}

impl RequestValidation for CreateHundiCollectionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.hundi_code, "Hundi code is required");
        validate_field!(
            self.hundi_code,
            self.hundi_code.chars().all(|c| c.is_ascii_alphanumeric()),
            "Hundi code must be alphanumeric"
        );
        validate_positive!(self.counted_amount, "Counted amount must be positive");
        validate_required!(self.counted_by, "Counted-by name is required");
        Ok(())
    }
}

/// List Donations Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDonationsParams {
    pub devotee_id: Option<Uuid>,
    pub category: Option<String>,
    pub payment_mode: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Donation write response: the receipt plus the posting outcome
#[derive(Debug, Serialize, ToSchema)]
pub struct DonationResponse {
    pub donation: Donation,
    /// False when the ledger posting failed; the receipt is still recorded
    pub accounting_posted: bool,
}

/// Hundi collection write response
#[derive(Debug, Serialize, ToSchema)]
pub struct HundiCollectionResponse {
    pub collection: HundiCollection,
    pub accounting_posted: bool,
}

/// Bulk donation import summary
#[derive(Debug, Serialize, ToSchema)]
pub struct DonationImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub accounting_posted: usize,
    pub errors: Vec<String>,
}

/// Record a donation and post it to the ledger
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Devotee not found")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn create_donation(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DonationResponse>>), ApiError> {
    request.validate()?;

    if let Some(devotee_id) = request.devotee_id {
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM devotees WHERE id = $1 AND temple_id = $2")
                .bind(devotee_id)
                .bind(auth.temple_id)
                .fetch_optional(&server.db_pool)
                .await?;
        if exists.is_none() {
            return Err(ApiError::not_found("devotee"));
        }
    }

    let donation = insert_donation(&server, &auth, &request).await?;

    // Ledger posting after the domain commit, best-effort
    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_donation(
            auth.temple_id,
            auth.user_id,
            &DonationPosting {
                donation_id: donation.id,
                receipt_number: donation.receipt_number.clone(),
                donation_date: donation.donation_date,
                amount: donation.amount,
                category: donation.category.clone(),
                payment_mode: donation.payment_mode.clone(),
            },
        )
        .await;

    let donation = attach_journal_entry(&server, "donations", donation, &entry).await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "donation",
            donation.id,
            "create",
            Some(serde_json::json!({
                "receipt_number": donation.receipt_number,
                "amount": donation.amount,
            })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(DonationResponse {
            accounting_posted: entry.is_some(),
            donation,
        })),
    ))
}

/// Get a donation by id
#[utoipa::path(
    get,
    path = "/api/v1/donations/{donation_id}",
    params(("donation_id" = Uuid, Path, description = "Donation ID")),
    responses(
        (status = 200, description = "Donation retrieved", body = Donation),
        (status = 404, description = "Donation not found")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn get_donation(
    State(server): State<MandirServer>,
    Path(donation_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Donation>>, ApiError> {
    let donation = sqlx::query_as::<_, Donation>(
        "SELECT * FROM donations WHERE id = $1 AND temple_id = $2",
    )
    .bind(donation_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("donation"))?;

    Ok(Json(api_success(donation)))
}

/// List donations with filters
#[utoipa::path(
    get,
    path = "/api/v1/donations",
    params(ListDonationsParams),
    responses(
        (status = 200, description = "Donations retrieved", body = Vec<Donation>)
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn list_donations(
    State(server): State<MandirServer>,
    Query(params): Query<ListDonationsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Donation>>>, ApiError> {
    let mut count_query = PaginatedQuery::new("SELECT COUNT(*) FROM donations WHERE 1=1");
    count_query
        .filter_temple(auth.temple_id)
        .filter_eq("devotee_id", params.devotee_id)
        .filter_eq("category", params.category.as_deref())
        .filter_eq("payment_mode", params.payment_mode.as_deref())
        .filter_date_range("donation_date", params.from_date, params.to_date);
    let total: i64 = count_query.build_scalar().fetch_one(&server.db_pool).await?;

    let mut query = PaginatedQuery::new("SELECT * FROM donations WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("devotee_id", params.devotee_id)
        .filter_eq("category", params.category.as_deref())
        .filter_eq("payment_mode", params.payment_mode.as_deref())
        .filter_date_range("donation_date", params.from_date, params.to_date)
        .order_by("donation_date", "DESC")
        .paginate(&params.pagination);
    let donations: Vec<Donation> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(params.pagination.wrap_response(donations, total)))
}

/// Bulk import donations from CSV
///
/// Expected columns: Date, Amount, Category, Payment Mode, Purpose, Phone.
/// Rows with validation errors are accumulated; valid rows are saved and
/// posted to the ledger best-effort.
#[utoipa::path(
    post,
    path = "/api/v1/donations/import",
    request_body = String,
    responses(
        (status = 200, description = "Import summary", body = DonationImportSummary),
        (status = 400, description = "Invalid CSV")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn import_donations_csv(
    State(server): State<MandirServer>,
    auth: AuthContext,
    body: String,
) -> Result<Json<ApiResponse<DonationImportSummary>>, ApiError> {
    let (headers, records) = read_csv_records(&body)?;

    let date_col =
        column_index(&headers, "Date").ok_or_else(|| ApiError::bad_request("Missing Date column"))?;
    let amount_col = column_index(&headers, "Amount")
        .ok_or_else(|| ApiError::bad_request("Missing Amount column"))?;
    let category_col = column_index(&headers, "Category");
    let mode_col = column_index(&headers, "Payment Mode");
    let purpose_col = column_index(&headers, "Purpose");
    let phone_col = column_index(&headers, "Phone");

    let posting = PostingService::new(server.db_pool.clone());
    let mut imported = 0;
    let mut accounting_posted = 0;
    let mut errors = Vec::new();

    for (row_no, record) in records.iter().enumerate() {
        let line = row_no + 2;
        let cell = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty())
        };

        let Some(donation_date) = cell(Some(date_col)).and_then(parse_flexible_date) else {
            errors.push(format!("Line {}: unparseable date", line));
            continue;
        };
        let Some(amount) = cell(Some(amount_col)).and_then(parse_amount) else {
            errors.push(format!("Line {}: unparseable amount", line));
            continue;
        };

        let devotee_id: Option<Uuid> = match cell(phone_col) {
            Some(phone) => {
                sqlx::query_scalar("SELECT id FROM devotees WHERE temple_id = $1 AND phone = $2")
                    .bind(auth.temple_id)
                    .bind(phone)
                    .fetch_optional(&server.db_pool)
                    .await?
            }
            None => None,
        };

        let request = CreateDonationRequest {
            devotee_id,
            donation_date,
            category: cell(category_col).unwrap_or("general").to_lowercase(),
            payment_mode: cell(mode_col).unwrap_or("cash").to_lowercase(),
            amount,
            purpose: cell(purpose_col).map(str::to_string),
            pan_number: None,
            eligible_80g: false,
        };

        if let Err(e) = request.validate() {
            errors.push(format!("Line {}: {}", line, e));
            continue;
        }

        match insert_donation(&server, &auth, &request).await {
            Ok(donation) => {
                imported += 1;
                let entry = posting
                    .post_donation(
                        auth.temple_id,
                        auth.user_id,
                        &DonationPosting {
                            donation_id: donation.id,
                            receipt_number: donation.receipt_number.clone(),
                            donation_date: donation.donation_date,
                            amount: donation.amount,
                            category: donation.category.clone(),
                            payment_mode: donation.payment_mode.clone(),
                        },
                    )
                    .await;
                if entry.is_some() {
                    accounting_posted += 1;
                }
                let _ = attach_journal_entry(&server, "donations", donation, &entry).await;
            }
            Err(e) => errors.push(format!("Line {}: {}", line, e)),
        }
    }

    Ok(Json(api_success(DonationImportSummary {
        imported,
        failed: errors.len(),
        accounting_posted,
        errors,
    })))
}

/// Export donations as CSV for a date range
#[utoipa::path(
    get,
    path = "/api/v1/donations/export",
    params(
        ("from_date" = Option<NaiveDate>, Query, description = "Start date"),
        ("to_date" = Option<NaiveDate>, Query, description = "End date")
    ),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn export_donations_csv(
    State(server): State<MandirServer>,
    Query(params): Query<ListDonationsParams>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    #[derive(Serialize)]
    struct ExportRow {
        receipt_number: String,
        donation_date: NaiveDate,
        category: String,
        payment_mode: String,
        amount: Decimal,
        purpose: Option<String>,
        eligible_80g: bool,
    }

    let mut query = PaginatedQuery::new("SELECT * FROM donations WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_date_range("donation_date", params.from_date, params.to_date)
        .order_by("donation_date", "ASC");
    let donations: Vec<Donation> = query.build().fetch_all(&server.db_pool).await?;

    let rows: Vec<ExportRow> = donations
        .into_iter()
        .map(|d| ExportRow {
            receipt_number: d.receipt_number,
            donation_date: d.donation_date,
            category: d.category,
            payment_mode: d.payment_mode,
            amount: d.amount,
            purpose: d.purpose,
            eligible_80g: d.eligible_80g,
        })
        .collect();

    let csv = to_csv_string(&rows)?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/csv")], csv))
}

/// Record a hundi opening (cash counting) and post it to the ledger
#[utoipa::path(
    post,
    path = "/api/v1/donations/hundi",
    request_body = CreateHundiCollectionRequest,
    responses(
        (status = 201, description = "Hundi collection recorded", body = HundiCollectionResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn create_hundi_collection(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateHundiCollectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HundiCollectionResponse>>), ApiError> {
    request.validate()?;

    let hundi_code = request.hundi_code.to_uppercase();
    let mut tx = server.db_pool.begin().await?;
    let collection_number = next_document_number(
        &mut *tx,
        auth.temple_id,
        "hundi_collections",
        "collection_number",
        &format!("HUNDI/{}", hundi_code),
    )
    .await?;

    let collection = sqlx::query_as::<_, HundiCollection>(
        r#"
        INSERT INTO hundi_collections (
            id, temple_id, hundi_code, collection_number, opened_date,
            counted_amount, counted_by, witness_names, remarks,
            journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&hundi_code)
    .bind(&collection_number)
    .bind(request.opened_date)
    .bind(request.counted_amount)
    .bind(request.counted_by.trim())
    .bind(&request.witness_names)
    .bind(&request.remarks)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_hundi_collection(
            auth.temple_id,
            auth.user_id,
            collection.id,
            &collection.collection_number,
            collection.opened_date,
            collection.counted_amount,
        )
        .await;

    let collection = match &entry {
        Some(journal) => sqlx::query_as::<_, HundiCollection>(
            "UPDATE hundi_collections SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(collection.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => collection,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "hundi_collection", collection.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(HundiCollectionResponse {
            accounting_posted: entry.is_some(),
            collection,
        })),
    ))
}

/// List hundi collections
#[utoipa::path(
    get,
    path = "/api/v1/donations/hundi",
    params(
        ("hundi_code" = Option<String>, Query, description = "Filter by hundi code")
    ),
    responses(
        (status = 200, description = "Hundi collections retrieved", body = Vec<HundiCollection>)
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn list_hundi_collections(
    State(server): State<MandirServer>,
    Query(params): Query<ListHundiParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<HundiCollection>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM hundi_collections WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("hundi_code", params.hundi_code.map(|c| c.to_uppercase()))
        .order_by("opened_date", "DESC")
        .paginate(&params.pagination);
    let collections: Vec<HundiCollection> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(collections)))
}

/// List Hundi Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListHundiParams {
    pub hundi_code: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

async fn insert_donation(
    server: &MandirServer,
    auth: &AuthContext,
    request: &CreateDonationRequest,
) -> Result<Donation, ApiError> {
    // Receipt writes run under the tenant context so database-side policies
    // see the acting user
    let manager = TransactionManager::new(server.database.clone()).with_tenant_context(
        TenantContext::new(auth.user_id, auth.temple_id).with_roles(auth.roles.clone()),
    );
    let mut tx = manager.begin().await?;
    let receipt_number =
        next_document_number(&mut *tx, auth.temple_id, "donations", "receipt_number", "DON")
            .await?;

    let donation = sqlx::query_as::<_, Donation>(
        r#"
        INSERT INTO donations (
            id, temple_id, receipt_number, devotee_id, donation_date, category,
            payment_mode, amount, purpose, pan_number, eligible_80g,
            journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL, $12, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&receipt_number)
    .bind(request.devotee_id)
    .bind(request.donation_date)
    .bind(&request.category)
    .bind(&request.payment_mode)
    .bind(request.amount)
    .bind(&request.purpose)
    .bind(&request.pan_number)
    .bind(request.eligible_80g)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(donation)
}

async fn attach_journal_entry(
    server: &MandirServer,
    table: &str,
    donation: Donation,
    entry: &Option<accounting_service::JournalEntryWithLines>,
) -> Result<Donation, ApiError> {
    match entry {
        Some(journal) => {
            let sql = format!(
                "UPDATE {} SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
                table
            );
            let updated = sqlx::query_as::<_, Donation>(&sql)
                .bind(journal.entry.id)
                .bind(donation.id)
                .fetch_one(&server.db_pool)
                .await?;
            Ok(updated)
        }
        None => Ok(donation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateDonationRequest {
        CreateDonationRequest {
            devotee_id: None,
            donation_date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
            category: "general".to_string(),
            payment_mode: "cash".to_string(),
            amount: Decimal::new(50000, 2),
            purpose: Some("Temple maintenance".to_string()),
            pan_number: None,
            eligible_80g: false,
        }
    }

    #[test]
    fn test_valid_donation_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut req = valid_request();
        req.amount = Decimal::ZERO;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut req = valid_request();
        req.category = "festival".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_80g_without_pan_rejected() {
        let mut req = valid_request();
        req.eligible_80g = true;
        assert!(req.validate().is_err());

        req.pan_number = Some("ABCDE1234F".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_hundi_request_validation() {
        let req = CreateHundiCollectionRequest {
            hundi_code: "MAIN".to_string(),
            opened_date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
            counted_amount: Decimal::new(1250000, 2),
            counted_by: "Head Priest".to_string(),
            witness_names: Some("Trustee A, Trustee B".to_string()),
            remarks: None,
        };
        assert!(req.validate().is_ok());

        let mut bad = CreateHundiCollectionRequest {
            counted_amount: Decimal::ZERO,
            ..req
        };
        assert!(bad.validate().is_err());
        bad.counted_amount = Decimal::ONE;
        bad.hundi_code = "MAIN BOX".to_string();
        assert!(bad.validate().is_err());
    }
}
