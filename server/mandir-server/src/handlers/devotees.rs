//! Devotee CRM: CRUD, search and CSV bulk import/export.

use accounting_service::sequence::next_document_number;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::csv_io::{column_index, read_csv_records, to_csv_string};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_required};

/// Devotee record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Devotee {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub devotee_number: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gotra: Option<String>,
    pub nakshatra: Option<String>,
    pub rashi: Option<String>,
    /// Needed for 80G donation receipts
    pub pan_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create Devotee Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDevoteeRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gotra: Option<String>,
    pub nakshatra: Option<String>,
    pub rashi: Option<String>,
    pub pan_number: Option<String>,
}

impl RequestValidation for CreateDevoteeRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Name is required");
        validate_length!(self.name, 2, 200, "Name must be between 2 and 200 characters");
        validate_required!(self.phone, "Phone is required");
        validate_field!(
            self.phone,
            self.phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10,
            "Phone must contain at least 10 digits"
        );
        if let Some(ref email) = self.email {
            validate_field!(email, email.contains('@'), "Invalid email format");
        }
        if let Some(ref pan) = self.pan_number {
            validate_field!(pan, pan.len() == 10, "PAN must be 10 characters");
        }
        Ok(())
    }
}

/// Update Devotee Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDevoteeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gotra: Option<String>,
    pub nakshatra: Option<String>,
    pub rashi: Option<String>,
    pub pan_number: Option<String>,
}

/// List Devotees Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDevoteesParams {
    /// Substring search over name and phone
    pub search: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Bulk import summary
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Register a new devotee
#[utoipa::path(
    post,
    path = "/api/v1/devotees",
    request_body = CreateDevoteeRequest,
    responses(
        (status = 201, description = "Devotee registered", body = Devotee),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn create_devotee(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateDevoteeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Devotee>>), ApiError> {
    request.validate()?;

    let duplicate: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM devotees WHERE temple_id = $1 AND phone = $2")
            .bind(auth.temple_id)
            .bind(request.phone.trim())
            .fetch_optional(&server.db_pool)
            .await?;
    if duplicate.is_some() {
        return Err(ApiError::validation(format!(
            "A devotee with phone {} already exists",
            request.phone.trim()
        )));
    }

    let devotee = insert_devotee(&server, auth.temple_id, &request).await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "devotee", devotee.id, "create", None)
        .await;

    Ok((StatusCode::CREATED, Json(api_success(devotee))))
}

/// Get a devotee by id
#[utoipa::path(
    get,
    path = "/api/v1/devotees/{devotee_id}",
    params(("devotee_id" = Uuid, Path, description = "Devotee ID")),
    responses(
        (status = 200, description = "Devotee retrieved", body = Devotee),
        (status = 404, description = "Devotee not found")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn get_devotee(
    State(server): State<MandirServer>,
    Path(devotee_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Devotee>>, ApiError> {
    let devotee = sqlx::query_as::<_, Devotee>(
        "SELECT * FROM devotees WHERE id = $1 AND temple_id = $2",
    )
    .bind(devotee_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("devotee"))?;

    Ok(Json(api_success(devotee)))
}

/// List devotees with search and pagination
#[utoipa::path(
    get,
    path = "/api/v1/devotees",
    params(ListDevoteesParams),
    responses(
        (status = 200, description = "Devotees retrieved", body = Vec<Devotee>)
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn list_devotees(
    State(server): State<MandirServer>,
    Query(params): Query<ListDevoteesParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Devotee>>>, ApiError> {
    let mut count_query = PaginatedQuery::new("SELECT COUNT(*) FROM devotees WHERE 1=1");
    count_query
        .filter_temple(auth.temple_id)
        .filter_eq("is_active", params.is_active)
        .search_ilike(&["name", "phone"], params.search.as_deref());
    let total: i64 = count_query.build_scalar().fetch_one(&server.db_pool).await?;

    let mut query = PaginatedQuery::new("SELECT * FROM devotees WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("is_active", params.is_active)
        .search_ilike(&["name", "phone"], params.search.as_deref())
        .order_by("name", "ASC")
        .paginate(&params.pagination);
    let devotees: Vec<Devotee> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(params.pagination.wrap_response(devotees, total)))
}

/// Update a devotee
#[utoipa::path(
    put,
    path = "/api/v1/devotees/{devotee_id}",
    params(("devotee_id" = Uuid, Path, description = "Devotee ID")),
    request_body = UpdateDevoteeRequest,
    responses(
        (status = 200, description = "Devotee updated", body = Devotee),
        (status = 404, description = "Devotee not found")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn update_devotee(
    State(server): State<MandirServer>,
    Path(devotee_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<UpdateDevoteeRequest>,
) -> Result<Json<ApiResponse<Devotee>>, ApiError> {
    let devotee = sqlx::query_as::<_, Devotee>(
        r#"
        UPDATE devotees
        SET name = COALESCE($1, name),
            email = COALESCE($2, email),
            address = COALESCE($3, address),
            gotra = COALESCE($4, gotra),
            nakshatra = COALESCE($5, nakshatra),
            rashi = COALESCE($6, rashi),
            pan_number = COALESCE($7, pan_number),
            updated_at = NOW()
        WHERE id = $8 AND temple_id = $9
        RETURNING *
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.address)
    .bind(&request.gotra)
    .bind(&request.nakshatra)
    .bind(&request.rashi)
    .bind(&request.pan_number)
    .bind(devotee_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("devotee"))?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "devotee", devotee_id, "update", None)
        .await;

    Ok(Json(api_success(devotee)))
}

/// Deactivate a devotee (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/devotees/{devotee_id}",
    params(("devotee_id" = Uuid, Path, description = "Devotee ID")),
    responses(
        (status = 200, description = "Devotee deactivated", body = Devotee),
        (status = 404, description = "Devotee not found")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_devotee(
    State(server): State<MandirServer>,
    Path(devotee_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Devotee>>, ApiError> {
    let devotee = sqlx::query_as::<_, Devotee>(
        "UPDATE devotees SET is_active = false, updated_at = NOW() \
         WHERE id = $1 AND temple_id = $2 RETURNING *",
    )
    .bind(devotee_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("devotee"))?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "devotee", devotee_id, "deactivate", None)
        .await;

    Ok(Json(api_success(devotee)))
}

/// Bulk import devotees from CSV
///
/// Expected columns: Name, Phone, Email, Address, Gotra. Rows that fail
/// validation are collected into the error list; valid rows are inserted.
#[utoipa::path(
    post,
    path = "/api/v1/devotees/import",
    request_body = String,
    responses(
        (status = 200, description = "Import summary", body = ImportSummary),
        (status = 400, description = "Invalid CSV")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn import_devotees_csv(
    State(server): State<MandirServer>,
    auth: AuthContext,
    body: String,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let (headers, records) = read_csv_records(&body)?;

    let name_col =
        column_index(&headers, "Name").ok_or_else(|| ApiError::bad_request("Missing Name column"))?;
    let phone_col = column_index(&headers, "Phone")
        .ok_or_else(|| ApiError::bad_request("Missing Phone column"))?;
    let email_col = column_index(&headers, "Email");
    let address_col = column_index(&headers, "Address");
    let gotra_col = column_index(&headers, "Gotra");

    let mut imported = 0;
    let mut errors = Vec::new();

    for (row_no, record) in records.iter().enumerate() {
        let line = row_no + 2; // header is line 1
        let get = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let request = CreateDevoteeRequest {
            name: get(Some(name_col)).unwrap_or_default(),
            phone: get(Some(phone_col)).unwrap_or_default(),
            email: get(email_col),
            address: get(address_col),
            gotra: get(gotra_col),
            nakshatra: None,
            rashi: None,
            pan_number: None,
        };

        if let Err(e) = request.validate() {
            errors.push(format!("Line {}: {}", line, e));
            continue;
        }

        let duplicate: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM devotees WHERE temple_id = $1 AND phone = $2")
                .bind(auth.temple_id)
                .bind(&request.phone)
                .fetch_optional(&server.db_pool)
                .await?;
        if duplicate.is_some() {
            errors.push(format!("Line {}: phone {} already exists", line, request.phone));
            continue;
        }

        match insert_devotee(&server, auth.temple_id, &request).await {
            Ok(_) => imported += 1,
            Err(e) => errors.push(format!("Line {}: {}", line, e)),
        }
    }

    Ok(Json(api_success(ImportSummary {
        imported,
        failed: errors.len(),
        errors,
    })))
}

/// Export devotees as CSV
#[utoipa::path(
    get,
    path = "/api/v1/devotees/export",
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv")
    ),
    tag = "devotees",
    security(("bearer_auth" = []))
)]
pub async fn export_devotees_csv(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    #[derive(Serialize)]
    struct ExportRow {
        devotee_number: String,
        name: String,
        phone: String,
        email: Option<String>,
        address: Option<String>,
        gotra: Option<String>,
        pan_number: Option<String>,
        registered_on: NaiveDate,
    }

    let devotees = sqlx::query_as::<_, Devotee>(
        "SELECT * FROM devotees WHERE temple_id = $1 AND is_active = true ORDER BY name",
    )
    .bind(auth.temple_id)
    .fetch_all(&server.db_pool)
    .await?;

    let rows: Vec<ExportRow> = devotees
        .into_iter()
        .map(|d| ExportRow {
            devotee_number: d.devotee_number,
            name: d.name,
            phone: d.phone,
            email: d.email,
            address: d.address,
            gotra: d.gotra,
            pan_number: d.pan_number,
            registered_on: d.created_at.date_naive(),
        })
        .collect();

    let csv = to_csv_string(&rows)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv")],
        csv,
    ))
}

async fn insert_devotee(
    server: &MandirServer,
    temple_id: Uuid,
    request: &CreateDevoteeRequest,
) -> Result<Devotee, ApiError> {
    let mut tx = server.db_pool.begin().await?;
    let devotee_number =
        next_document_number(&mut *tx, temple_id, "devotees", "devotee_number", "DEV").await?;

    let devotee = sqlx::query_as::<_, Devotee>(
        r#"
        INSERT INTO devotees (
            id, temple_id, devotee_number, name, phone, email, address,
            gotra, nakshatra, rashi, pan_number, is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, true, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(temple_id)
    .bind(&devotee_number)
    .bind(request.name.trim())
    .bind(request.phone.trim())
    .bind(&request.email)
    .bind(&request.address)
    .bind(&request.gotra)
    .bind(&request.nakshatra)
    .bind(&request.rashi)
    .bind(&request.pan_number)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(devotee)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateDevoteeRequest {
        CreateDevoteeRequest {
            name: "Ramachandra Sharma".to_string(),
            phone: "9845012345".to_string(),
            email: Some("ram@example.org".to_string()),
            address: None,
            gotra: Some("Bharadwaja".to_string()),
            nakshatra: None,
            rashi: None,
            pan_number: Some("ABCDE1234F".to_string()),
        }
    }

    #[test]
    fn test_valid_devotee_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut req = valid_request();
        req.phone = "12345".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_pan_rejected() {
        let mut req = valid_request();
        req.pan_number = Some("SHORT".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = valid_request();
        req.email = Some("not-an-email".to_string());
        assert!(req.validate().is_err());
    }
}
