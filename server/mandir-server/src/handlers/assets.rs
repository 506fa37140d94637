//! Fixed assets: purchase, CWIP projects with capitalization, disposals.
//!
//! Disposal approval is an admin action. Capitalization converts accumulated
//! construction cost into a fixed asset and moves the balance from the CWIP
//! account into fixed assets.

use accounting_service::posting::{AssetPosting, PostingService};
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
use crate::middleware::{AuthContext, ROLE_ADMIN};
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_one_of, validate_positive, validate_required};

pub const ASSET_CATEGORIES: [&str; 6] =
    ["land", "building", "vehicle", "equipment", "furniture", "other"];

/// Fixed asset record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub asset_number: String,
    pub name: String,
    pub category: String,
    pub purchase_date: NaiveDate,
    pub purchase_cost: Decimal,
    pub payment_mode: String,
    pub location: Option<String>,
    pub status: String,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Capital work-in-progress project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CwipProject {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub project_name: String,
    pub description: Option<String>,
    pub total_expenditure: Decimal,
    pub status: String,
    pub capitalized_asset_id: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Asset disposal request record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct AssetDisposal {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub asset_id: Uuid,
    pub disposal_date: NaiveDate,
    pub proceeds: Decimal,
    pub reason: String,
    pub status: String,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Create Asset Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssetRequest {
    pub name: String,
    pub category: String,
    pub purchase_date: NaiveDate,
    pub purchase_cost: Decimal,
    pub payment_mode: String,
    pub location: Option<String>,
}

impl RequestValidation for CreateAssetRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Asset name is required");
        validate_one_of!(
            self.category,
            ASSET_CATEGORIES,
            format!("Category must be one of: {}", ASSET_CATEGORIES.join(", "))
        );
        validate_positive!(self.purchase_cost, "Purchase cost must be positive");
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        Ok(())
    }
}

/// Create CWIP Project Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCwipRequest {
    pub project_name: String,
    pub description: Option<String>,
}

impl RequestValidation for CreateCwipRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.project_name, "Project name is required");
        Ok(())
    }
}

/// Add CWIP Expenditure Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CwipExpenditureRequest {
    pub expense_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
    pub description: Option<String>,
}

impl RequestValidation for CwipExpenditureRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_positive!(self.amount, "Expenditure amount must be positive");
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        Ok(())
    }
}

/// Capitalize CWIP Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CapitalizeCwipRequest {
    pub asset_name: String,
    pub category: String,
    pub capitalization_date: NaiveDate,
    pub location: Option<String>,
}

impl RequestValidation for CapitalizeCwipRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.asset_name, "Asset name is required");
        validate_one_of!(
            self.category,
            ASSET_CATEGORIES,
            format!("Category must be one of: {}", ASSET_CATEGORIES.join(", "))
        );
        Ok(())
    }
}

/// Request Asset Disposal
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestDisposalRequest {
    pub disposal_date: NaiveDate,
    pub proceeds: Decimal,
    pub reason: String,
}

impl RequestValidation for RequestDisposalRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(
            self.proceeds,
            self.proceeds >= Decimal::ZERO,
            "Proceeds cannot be negative"
        );
        validate_required!(self.reason, "Disposal reason is required");
        Ok(())
    }
}

/// Asset write response
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    pub asset: Asset,
    pub accounting_posted: bool,
}

/// CWIP write response
#[derive(Debug, Serialize, ToSchema)]
pub struct CwipResponse {
    pub project: CwipProject,
    pub accounting_posted: bool,
}

/// Capitalization response
#[derive(Debug, Serialize, ToSchema)]
pub struct CapitalizationResponse {
    pub project: CwipProject,
    pub asset: Asset,
    pub accounting_posted: bool,
}

/// Disposal response
#[derive(Debug, Serialize, ToSchema)]
pub struct DisposalResponse {
    pub disposal: AssetDisposal,
    pub accounting_posted: bool,
}

/// Register an asset purchase
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset registered", body = AssetResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn create_asset(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    request.validate()?;

    let asset = insert_asset(
        &server,
        &auth,
        &request.name,
        &request.category,
        request.purchase_date,
        request.purchase_cost,
        &request.payment_mode,
        request.location.as_deref(),
    )
    .await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_asset_purchase(
            auth.temple_id,
            auth.user_id,
            &AssetPosting {
                asset_id: asset.id,
                asset_number: asset.asset_number.clone(),
                asset_name: asset.name.clone(),
                transaction_date: asset.purchase_date,
                amount: asset.purchase_cost,
                payment_mode: asset.payment_mode.clone(),
            },
        )
        .await;

    let asset = attach_entry(&server, asset, &entry).await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit.log_action(&auth, "asset", asset.id, "create", None).await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(AssetResponse {
            accounting_posted: entry.is_some(),
            asset,
        })),
    ))
}

/// List assets
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    params(ListAssetsParams),
    responses(
        (status = 200, description = "Assets retrieved", body = Vec<Asset>)
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(server): State<MandirServer>,
    Query(params): Query<ListAssetsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Asset>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM assets WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("category", params.category.as_deref())
        .filter_eq("status", params.status.as_deref())
        .order_by("asset_number", "ASC")
        .paginate(&params.pagination);
    let assets: Vec<Asset> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(assets)))
}

/// List Assets Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAssetsParams {
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Get an asset by id
#[utoipa::path(
    get,
    path = "/api/v1/assets/{asset_id}",
    params(("asset_id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset retrieved", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn get_asset(
    State(server): State<MandirServer>,
    Path(asset_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Asset>>, ApiError> {
    let asset = fetch_asset(&server, auth.temple_id, asset_id).await?;
    Ok(Json(api_success(asset)))
}

/// Open a CWIP project
#[utoipa::path(
    post,
    path = "/api/v1/assets/cwip",
    request_body = CreateCwipRequest,
    responses(
        (status = 201, description = "CWIP project created", body = CwipProject),
        (status = 400, description = "Invalid request")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn create_cwip_project(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateCwipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CwipProject>>), ApiError> {
    request.validate()?;

    let project = sqlx::query_as::<_, CwipProject>(
        r#"
        INSERT INTO cwip_projects (
            id, temple_id, project_name, description, total_expenditure,
            status, capitalized_asset_id, journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, 0, 'in_progress', NULL, NULL, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(request.project_name.trim())
    .bind(&request.description)
    .bind(auth.user_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(api_success(project))))
}

/// List CWIP projects
#[utoipa::path(
    get,
    path = "/api/v1/assets/cwip",
    responses(
        (status = 200, description = "CWIP projects retrieved", body = Vec<CwipProject>)
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn list_cwip_projects(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<CwipProject>>>, ApiError> {
    let projects = sqlx::query_as::<_, CwipProject>(
        "SELECT * FROM cwip_projects WHERE temple_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.temple_id)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(projects)))
}

/// Record expenditure on a CWIP project
#[utoipa::path(
    post,
    path = "/api/v1/assets/cwip/{project_id}/expenditure",
    params(("project_id" = Uuid, Path, description = "CWIP project ID")),
    request_body = CwipExpenditureRequest,
    responses(
        (status = 200, description = "Expenditure recorded", body = CwipResponse),
        (status = 400, description = "Invalid request or capitalized project"),
        (status = 404, description = "Project not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn add_cwip_expenditure(
    State(server): State<MandirServer>,
    Path(project_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<CwipExpenditureRequest>,
) -> Result<Json<ApiResponse<CwipResponse>>, ApiError> {
    request.validate()?;

    let project = fetch_cwip(&server, auth.temple_id, project_id).await?;
    if project.status != "in_progress" {
        return Err(ApiError::validation(format!(
            "Project {} is already capitalized",
            project.project_name
        )));
    }

    let project = sqlx::query_as::<_, CwipProject>(
        "UPDATE cwip_projects SET total_expenditure = total_expenditure + $1 \
         WHERE id = $2 AND temple_id = $3 RETURNING *",
    )
    .bind(request.amount)
    .bind(project_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_cwip_expenditure(
            auth.temple_id,
            auth.user_id,
            project.id,
            &project.project_name,
            request.expense_date,
            request.amount,
            &request.payment_mode,
        )
        .await;

    Ok(Json(api_success(CwipResponse {
        accounting_posted: entry.is_some(),
        project,
    })))
}

/// Capitalize a CWIP project into a fixed asset
#[utoipa::path(
    post,
    path = "/api/v1/assets/cwip/{project_id}/capitalize",
    params(("project_id" = Uuid, Path, description = "CWIP project ID")),
    request_body = CapitalizeCwipRequest,
    responses(
        (status = 200, description = "Project capitalized", body = CapitalizationResponse),
        (status = 400, description = "Zero expenditure or already capitalized"),
        (status = 404, description = "Project not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn capitalize_cwip(
    State(server): State<MandirServer>,
    Path(project_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<CapitalizeCwipRequest>,
) -> Result<Json<ApiResponse<CapitalizationResponse>>, ApiError> {
    request.validate()?;

    let project = fetch_cwip(&server, auth.temple_id, project_id).await?;
    if project.status != "in_progress" {
        return Err(ApiError::validation(format!(
            "Project {} is already capitalized",
            project.project_name
        )));
    }
    if project.total_expenditure <= Decimal::ZERO {
        return Err(ApiError::validation(
            "Cannot capitalize CWIP with zero expenditure",
        ));
    }

    let asset = insert_asset(
        &server,
        &auth,
        &request.asset_name,
        &request.category,
        request.capitalization_date,
        project.total_expenditure,
        "cwip",
        request.location.as_deref(),
    )
    .await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_cwip_capitalization(
            auth.temple_id,
            auth.user_id,
            project.id,
            &project.project_name,
            request.capitalization_date,
            project.total_expenditure,
        )
        .await;

    let project = sqlx::query_as::<_, CwipProject>(
        "UPDATE cwip_projects SET status = 'capitalized', capitalized_asset_id = $1, \
         journal_entry_id = $2 WHERE id = $3 AND temple_id = $4 RETURNING *",
    )
    .bind(asset.id)
    .bind(entry.as_ref().map(|e| e.entry.id))
    .bind(project_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "cwip_project", project.id, "capitalize", None)
        .await;

    Ok(Json(api_success(CapitalizationResponse {
        accounting_posted: entry.is_some(),
        project,
        asset,
    })))
}

/// Request disposal of an asset
#[utoipa::path(
    post,
    path = "/api/v1/assets/{asset_id}/disposals",
    params(("asset_id" = Uuid, Path, description = "Asset ID")),
    request_body = RequestDisposalRequest,
    responses(
        (status = 201, description = "Disposal requested", body = AssetDisposal),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Asset not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn request_disposal(
    State(server): State<MandirServer>,
    Path(asset_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<RequestDisposalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssetDisposal>>), ApiError> {
    request.validate()?;

    let asset = fetch_asset(&server, auth.temple_id, asset_id).await?;
    if asset.status != "active" {
        return Err(ApiError::validation(format!(
            "Asset {} is already {}",
            asset.asset_number, asset.status
        )));
    }

    let disposal = sqlx::query_as::<_, AssetDisposal>(
        r#"
        INSERT INTO asset_disposals (
            id, temple_id, asset_id, disposal_date, proceeds, reason, status,
            requested_by, approved_by, journal_entry_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, NULL, NULL, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(asset_id)
    .bind(request.disposal_date)
    .bind(request.proceeds)
    .bind(request.reason.trim())
    .bind(auth.user_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(api_success(disposal))))
}

/// Approve a disposal (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/assets/disposals/{disposal_id}/approve",
    params(("disposal_id" = Uuid, Path, description = "Disposal ID")),
    responses(
        (status = 200, description = "Disposal approved", body = DisposalResponse),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Disposal not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn approve_disposal(
    State(server): State<MandirServer>,
    Path(disposal_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<DisposalResponse>>, ApiError> {
    auth.require_role(ROLE_ADMIN)?;

    let disposal = fetch_disposal(&server, auth.temple_id, disposal_id).await?;
    if disposal.status != "pending" {
        return Err(ApiError::validation(format!(
            "Disposal is already {}",
            disposal.status
        )));
    }
    let asset = fetch_asset(&server, auth.temple_id, disposal.asset_id).await?;

    let mut tx = server.db_pool.begin().await?;
    let disposal = sqlx::query_as::<_, AssetDisposal>(
        "UPDATE asset_disposals SET status = 'approved', approved_by = $1 \
         WHERE id = $2 AND temple_id = $3 RETURNING *",
    )
    .bind(auth.user_id)
    .bind(disposal_id)
    .bind(auth.temple_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE assets SET status = 'disposed' WHERE id = $1 AND temple_id = $2")
        .bind(asset.id)
        .bind(auth.temple_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    // Proceeds post against cash/bank; a zero-proceeds disposal writes the
    // book value off to the disposal-loss account
    let posting = PostingService::new(server.db_pool.clone());
    let asset_posting = AssetPosting {
        asset_id: asset.id,
        asset_number: asset.asset_number.clone(),
        asset_name: asset.name.clone(),
        transaction_date: disposal.disposal_date,
        amount: if disposal.proceeds > Decimal::ZERO {
            disposal.proceeds
        } else {
            asset.purchase_cost
        },
        payment_mode: "bank".to_string(),
    };
    let entry = if disposal.proceeds > Decimal::ZERO {
        posting
            .post_asset_disposal(auth.temple_id, auth.user_id, &asset_posting)
            .await
    } else {
        posting
            .post_asset_writeoff(auth.temple_id, auth.user_id, &asset_posting)
            .await
    };

    let disposal = match &entry {
        Some(journal) => sqlx::query_as::<_, AssetDisposal>(
            "UPDATE asset_disposals SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(disposal.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => disposal,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "asset_disposal", disposal_id, "approve", None)
        .await;

    Ok(Json(api_success(DisposalResponse {
        accounting_posted: entry.is_some(),
        disposal,
    })))
}

/// Reject a disposal (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/assets/disposals/{disposal_id}/reject",
    params(("disposal_id" = Uuid, Path, description = "Disposal ID")),
    responses(
        (status = 200, description = "Disposal rejected", body = AssetDisposal),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Disposal not found")
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn reject_disposal(
    State(server): State<MandirServer>,
    Path(disposal_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<AssetDisposal>>, ApiError> {
    auth.require_role(ROLE_ADMIN)?;

    let disposal = fetch_disposal(&server, auth.temple_id, disposal_id).await?;
    if disposal.status != "pending" {
        return Err(ApiError::validation(format!(
            "Disposal is already {}",
            disposal.status
        )));
    }

    let disposal = sqlx::query_as::<_, AssetDisposal>(
        "UPDATE asset_disposals SET status = 'rejected', approved_by = $1 \
         WHERE id = $2 AND temple_id = $3 RETURNING *",
    )
    .bind(auth.user_id)
    .bind(disposal_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(disposal)))
}

/// List disposals
#[utoipa::path(
    get,
    path = "/api/v1/assets/disposals",
    params(("status" = Option<String>, Query, description = "Filter by status")),
    responses(
        (status = 200, description = "Disposals retrieved", body = Vec<AssetDisposal>)
    ),
    tag = "assets",
    security(("bearer_auth" = []))
)]
pub async fn list_disposals(
    State(server): State<MandirServer>,
    Query(params): Query<ListDisposalsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<AssetDisposal>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM asset_disposals WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("status", params.status.as_deref())
        .order_by("created_at", "DESC")
        .paginate(&params.pagination);
    let disposals: Vec<AssetDisposal> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(disposals)))
}

/// List Disposals Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDisposalsParams {
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[allow(clippy::too_many_arguments)]
async fn insert_asset(
    server: &MandirServer,
    auth: &AuthContext,
    name: &str,
    category: &str,
    purchase_date: NaiveDate,
    purchase_cost: Decimal,
    payment_mode: &str,
    location: Option<&str>,
) -> Result<Asset, ApiError> {
    let mut tx = server.db_pool.begin().await?;
    let asset_number =
        next_document_number(&mut *tx, auth.temple_id, "assets", "asset_number", "AST").await?;

    let asset = sqlx::query_as::<_, Asset>(
        r#"
        INSERT INTO assets (
            id, temple_id, asset_number, name, category, purchase_date,
            purchase_cost, payment_mode, location, status, journal_entry_id,
            created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', NULL, $10, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&asset_number)
    .bind(name.trim())
    .bind(category)
    .bind(purchase_date)
    .bind(purchase_cost)
    .bind(payment_mode)
    .bind(location)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(asset)
}

async fn attach_entry(
    server: &MandirServer,
    asset: Asset,
    entry: &Option<accounting_service::JournalEntryWithLines>,
) -> Result<Asset, ApiError> {
    match entry {
        Some(journal) => {
            let updated = sqlx::query_as::<_, Asset>(
                "UPDATE assets SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
            )
            .bind(journal.entry.id)
            .bind(asset.id)
            .fetch_one(&server.db_pool)
            .await?;
            Ok(updated)
        }
        None => Ok(asset),
    }
}

async fn fetch_asset(
    server: &MandirServer,
    temple_id: Uuid,
    asset_id: Uuid,
) -> Result<Asset, ApiError> {
    sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 AND temple_id = $2")
        .bind(asset_id)
        .bind(temple_id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("asset"))
}

async fn fetch_cwip(
    server: &MandirServer,
    temple_id: Uuid,
    project_id: Uuid,
) -> Result<CwipProject, ApiError> {
    sqlx::query_as::<_, CwipProject>(
        "SELECT * FROM cwip_projects WHERE id = $1 AND temple_id = $2",
    )
    .bind(project_id)
    .bind(temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("cwip_project"))
}

async fn fetch_disposal(
    server: &MandirServer,
    temple_id: Uuid,
    disposal_id: Uuid,
) -> Result<AssetDisposal, ApiError> {
    sqlx::query_as::<_, AssetDisposal>(
        "SELECT * FROM asset_disposals WHERE id = $1 AND temple_id = $2",
    )
    .bind(disposal_id)
    .bind(temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("asset_disposal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_request_validation() {
        let req = CreateAssetRequest {
            name: "Temple Van".to_string(),
            category: "vehicle".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            purchase_cost: Decimal::new(85000000, 2),
            payment_mode: "bank".to_string(),
            location: None,
        };
        assert!(req.validate().is_ok());

        let bad_category = CreateAssetRequest {
            category: "artwork".to_string(),
            ..req
        };
        assert!(bad_category.validate().is_err());
    }

    #[test]
    fn test_disposal_request_validation() {
        let req = RequestDisposalRequest {
            disposal_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            proceeds: Decimal::ZERO,
            reason: "Beyond repair".to_string(),
        };
        assert!(req.validate().is_ok());

        let negative = RequestDisposalRequest {
            proceeds: Decimal::new(-1, 0),
            reason: "x".to_string(),
            disposal_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_cwip_expenditure_validation() {
        let req = CwipExpenditureRequest {
            expense_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            amount: Decimal::new(20000000, 2),
            payment_mode: "bank".to_string(),
            description: Some("Gopuram stonework".to_string()),
        };
        assert!(req.validate().is_ok());

        let zero = CwipExpenditureRequest {
            amount: Decimal::ZERO,
            expense_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            payment_mode: "cash".to_string(),
            description: None,
        };
        assert!(zero.validate().is_err());
    }
}
