//! Inventory: item master, purchase receipts and stock issues.
//!
//! Receipts carry a PUR + GRN number pair and increase stock at a moving
//! average cost; issues carry ISS + GIN numbers and are rejected when they
//! would overdraw the stock balance.

use accounting_service::posting::{InventoryPosting, PostingService};
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
use crate::{validate_field, validate_one_of, validate_positive, validate_required};

/// Inventory item master record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub category: Option<String>,
    pub stock_quantity: Decimal,
    pub unit_cost: Decimal,
    pub reorder_level: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase receipt (goods receipt note)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub purchase_number: String,
    pub po_number: String,
    pub grn_number: String,
    pub item_id: Uuid,
    pub vendor_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub payment_mode: String,
    pub received_date: NaiveDate,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Stock issue (goods issue note)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct StockIssue {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub issue_number: String,
    pub gin_number: String,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub issue_value: Decimal,
    pub purpose: String,
    pub department: Option<String>,
    pub issue_date: NaiveDate,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Item Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub category: Option<String>,
    #[serde(default)]
    pub reorder_level: Decimal,
}

impl RequestValidation for CreateItemRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.code, "Item code is required");
        validate_required!(self.name, "Item name is required");
        validate_required!(self.unit, "Unit is required");
        validate_field!(
            self.reorder_level,
            self.reorder_level >= Decimal::ZERO,
            "Reorder level cannot be negative"
        );
        Ok(())
    }
}

/// Create Purchase Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub item_id: Uuid,
    pub vendor_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub payment_mode: String,
    pub received_date: NaiveDate,
}

impl RequestValidation for CreatePurchaseRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.vendor_name, "Vendor name is required");
        validate_positive!(self.quantity, "Quantity must be positive");
        validate_field!(
            self.unit_cost,
            self.unit_cost >= Decimal::ZERO,
            "Unit cost cannot be negative"
        );
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        Ok(())
    }
}

/// Create Issue Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIssueRequest {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub purpose: String,
    pub department: Option<String>,
    pub issue_date: NaiveDate,
}

impl RequestValidation for CreateIssueRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_positive!(self.quantity, "Quantity must be positive");
        validate_required!(self.purpose, "Purpose is required");
        Ok(())
    }
}

/// Purchase write response
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub purchase: Purchase,
    pub accounting_posted: bool,
}

/// Issue write response
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueResponse {
    pub issue: StockIssue,
    pub accounting_posted: bool,
}

/// Moving-average unit cost after a receipt.
pub fn moving_average_cost(
    current_qty: Decimal,
    current_cost: Decimal,
    received_qty: Decimal,
    received_cost: Decimal,
) -> Decimal {
    let total_qty = current_qty + received_qty;
    if total_qty <= Decimal::ZERO {
        return received_cost;
    }
    (current_qty * current_cost + received_qty * received_cost) / total_qty
}

/// Add an item to the master
#[utoipa::path(
    post,
    path = "/api/v1/inventory/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = InventoryItem),
        (status = 400, description = "Invalid request")
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn create_item(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItem>>), ApiError> {
    request.validate()?;

    let duplicate: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM inventory_items WHERE temple_id = $1 AND code = $2")
            .bind(auth.temple_id)
            .bind(request.code.trim())
            .fetch_optional(&server.db_pool)
            .await?;
    if duplicate.is_some() {
        return Err(ApiError::validation(format!(
            "Item code {} already exists",
            request.code.trim()
        )));
    }

    let item = sqlx::query_as::<_, InventoryItem>(
        r#"
        INSERT INTO inventory_items (
            id, temple_id, code, name, unit, category, stock_quantity,
            unit_cost, reorder_level, is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, true, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(request.code.trim())
    .bind(request.name.trim())
    .bind(request.unit.trim())
    .bind(&request.category)
    .bind(request.reorder_level)
    .fetch_one(&server.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(api_success(item))))
}

/// List items with stock balances
#[utoipa::path(
    get,
    path = "/api/v1/inventory/items",
    params(ListItemsParams),
    responses(
        (status = 200, description = "Items retrieved", body = Vec<InventoryItem>)
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(server): State<MandirServer>,
    Query(params): Query<ListItemsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM inventory_items WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("category", params.category.as_deref())
        .filter_active();
    if params.below_reorder.unwrap_or(false) {
        // Reorder alert listing
        query.push_raw(" AND stock_quantity <= reorder_level");
    }
    query
        .order_by("code", "ASC")
        .paginate(&params.pagination);
    let items: Vec<InventoryItem> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(items)))
}

/// List Items Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListItemsParams {
    pub category: Option<String>,
    /// Only items at or below their reorder level
    pub below_reorder: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Receive a purchase: stock increases at moving-average cost
#[utoipa::path(
    post,
    path = "/api/v1/inventory/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase received", body = PurchaseResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Item not found")
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn create_purchase(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PurchaseResponse>>), ApiError> {
    request.validate()?;

    let item = fetch_item(&server, auth.temple_id, request.item_id).await?;
    let total_cost = request.quantity * request.unit_cost;
    let new_cost = moving_average_cost(
        item.stock_quantity,
        item.unit_cost,
        request.quantity,
        request.unit_cost,
    );

    let mut tx = server.db_pool.begin().await?;
    let purchase_number =
        next_document_number(&mut *tx, auth.temple_id, "purchases", "purchase_number", "PUR")
            .await?;
    let po_number =
        next_document_number(&mut *tx, auth.temple_id, "purchases", "po_number", "PO").await?;
    let grn_number =
        next_document_number(&mut *tx, auth.temple_id, "purchases", "grn_number", "GRN").await?;

    let purchase = sqlx::query_as::<_, Purchase>(
        r#"
        INSERT INTO purchases (
            id, temple_id, purchase_number, po_number, grn_number, item_id,
            vendor_name, quantity, unit_cost, total_cost, payment_mode,
            received_date, journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NULL, $13, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&purchase_number)
    .bind(&po_number)
    .bind(&grn_number)
    .bind(item.id)
    .bind(request.vendor_name.trim())
    .bind(request.quantity)
    .bind(request.unit_cost)
    .bind(total_cost)
    .bind(&request.payment_mode)
    .bind(request.received_date)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE inventory_items SET stock_quantity = stock_quantity + $1, unit_cost = $2, \
         updated_at = NOW() WHERE id = $3 AND temple_id = $4",
    )
    .bind(request.quantity)
    .bind(new_cost)
    .bind(item.id)
    .bind(auth.temple_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_inventory_purchase(
            auth.temple_id,
            auth.user_id,
            &InventoryPosting {
                movement_id: purchase.id,
                document_number: purchase.grn_number.clone(),
                movement_date: purchase.received_date,
                amount: purchase.total_cost,
                item_name: item.name.clone(),
                payment_mode: Some(purchase.payment_mode.clone()),
            },
        )
        .await;

    let purchase = match &entry {
        Some(journal) => sqlx::query_as::<_, Purchase>(
            "UPDATE purchases SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(purchase.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => purchase,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "purchase", purchase.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(PurchaseResponse {
            accounting_posted: entry.is_some(),
            purchase,
        })),
    ))
}

/// Issue stock: rejected when it would overdraw the balance
#[utoipa::path(
    post,
    path = "/api/v1/inventory/issues",
    request_body = CreateIssueRequest,
    responses(
        (status = 201, description = "Stock issued", body = IssueResponse),
        (status = 400, description = "Invalid request or insufficient stock"),
        (status = 404, description = "Item not found")
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn create_issue(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateIssueRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IssueResponse>>), ApiError> {
    request.validate()?;

    let item = fetch_item(&server, auth.temple_id, request.item_id).await?;

    let mut tx = server.db_pool.begin().await?;

    // The guard on stock_quantity makes the decrement atomic under
    // concurrent issues
    let updated = sqlx::query(
        "UPDATE inventory_items SET stock_quantity = stock_quantity - $1, updated_at = NOW() \
         WHERE id = $2 AND temple_id = $3 AND stock_quantity >= $1",
    )
    .bind(request.quantity)
    .bind(item.id)
    .bind(auth.temple_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::validation(format!(
            "Insufficient stock for {}: {} available, {} requested",
            item.name, item.stock_quantity, request.quantity
        )));
    }

    let issue_number =
        next_document_number(&mut *tx, auth.temple_id, "stock_issues", "issue_number", "ISS")
            .await?;
    let gin_number =
        next_document_number(&mut *tx, auth.temple_id, "stock_issues", "gin_number", "GIN")
            .await?;
    let issue_value = request.quantity * item.unit_cost;

    let issue = sqlx::query_as::<_, StockIssue>(
        r#"
        INSERT INTO stock_issues (
            id, temple_id, issue_number, gin_number, item_id, quantity,
            issue_value, purpose, department, issue_date, journal_entry_id,
            created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, $11, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&issue_number)
    .bind(&gin_number)
    .bind(item.id)
    .bind(request.quantity)
    .bind(issue_value)
    .bind(request.purpose.trim())
    .bind(&request.department)
    .bind(request.issue_date)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    let entry = if issue_value > Decimal::ZERO {
        let posting = PostingService::new(server.db_pool.clone());
        posting
            .post_inventory_issue(
                auth.temple_id,
                auth.user_id,
                &InventoryPosting {
                    movement_id: issue.id,
                    document_number: issue.gin_number.clone(),
                    movement_date: issue.issue_date,
                    amount: issue.issue_value,
                    item_name: item.name.clone(),
                    payment_mode: None,
                },
            )
            .await
    } else {
        None
    };

    let issue = match &entry {
        Some(journal) => sqlx::query_as::<_, StockIssue>(
            "UPDATE stock_issues SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(issue.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => issue,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "stock_issue", issue.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(IssueResponse {
            accounting_posted: entry.is_some(),
            issue,
        })),
    ))
}

/// List purchases
#[utoipa::path(
    get,
    path = "/api/v1/inventory/purchases",
    params(ListMovementsParams),
    responses(
        (status = 200, description = "Purchases retrieved", body = Vec<Purchase>)
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn list_purchases(
    State(server): State<MandirServer>,
    Query(params): Query<ListMovementsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Purchase>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM purchases WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("item_id", params.item_id)
        .filter_date_range("received_date", params.from_date, params.to_date)
        .order_by("received_date", "DESC")
        .paginate(&params.pagination);
    let purchases: Vec<Purchase> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(purchases)))
}

/// List stock issues
#[utoipa::path(
    get,
    path = "/api/v1/inventory/issues",
    params(ListMovementsParams),
    responses(
        (status = 200, description = "Issues retrieved", body = Vec<StockIssue>)
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn list_issues(
    State(server): State<MandirServer>,
    Query(params): Query<ListMovementsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<StockIssue>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM stock_issues WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("item_id", params.item_id)
        .filter_date_range("issue_date", params.from_date, params.to_date)
        .order_by("issue_date", "DESC")
        .paginate(&params.pagination);
    let issues: Vec<StockIssue> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(issues)))
}

/// Direct payment to a vendor outside a purchase order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct VendorPayment {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub vendor_name: String,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
    pub purpose: Option<String>,
    /// Expense account override; falls back to vendor & service charges
    pub expense_account_id: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Vendor Payment Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVendorPaymentRequest {
    pub vendor_name: String,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
    pub purpose: Option<String>,
    pub expense_account_id: Option<Uuid>,
}

impl RequestValidation for CreateVendorPaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.vendor_name, "Vendor name is required");
        validate_positive!(self.amount, "Payment amount must be positive");
        validate_one_of!(
            self.payment_mode,
            PAYMENT_MODES,
            format!("Payment mode must be one of: {}", PAYMENT_MODES.join(", "))
        );
        Ok(())
    }
}

/// Vendor payment write response
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorPaymentResponse {
    pub payment: VendorPayment,
    pub accounting_posted: bool,
}

/// Record a direct payment to a vendor
#[utoipa::path(
    post,
    path = "/api/v1/inventory/vendor-payments",
    request_body = CreateVendorPaymentRequest,
    responses(
        (status = 201, description = "Vendor payment recorded", body = VendorPaymentResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "inventory",
    security(("bearer_auth" = []))
)]
pub async fn create_vendor_payment(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateVendorPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VendorPaymentResponse>>), ApiError> {
    request.validate()?;

    let payment = sqlx::query_as::<_, VendorPayment>(
        r#"
        INSERT INTO vendor_payments (
            id, temple_id, vendor_name, payment_date, amount, payment_mode,
            purpose, expense_account_id, journal_entry_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, $9, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(request.vendor_name.trim())
    .bind(request.payment_date)
    .bind(request.amount)
    .bind(&request.payment_mode)
    .bind(&request.purpose)
    .bind(request.expense_account_id)
    .bind(auth.user_id)
    .fetch_one(&server.db_pool)
    .await?;

    let posting = PostingService::new(server.db_pool.clone());
    let entry = posting
        .post_vendor_payment(
            auth.temple_id,
            auth.user_id,
            payment.id,
            &payment.vendor_name,
            payment.payment_date,
            payment.amount,
            &payment.payment_mode,
            payment.expense_account_id,
        )
        .await;

    let payment = match &entry {
        Some(journal) => sqlx::query_as::<_, VendorPayment>(
            "UPDATE vendor_payments SET journal_entry_id = $1 WHERE id = $2 RETURNING *",
        )
        .bind(journal.entry.id)
        .bind(payment.id)
        .fetch_one(&server.db_pool)
        .await?,
        None => payment,
    };

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "vendor_payment", payment.id, "create", None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(VendorPaymentResponse {
            accounting_posted: entry.is_some(),
            payment,
        })),
    ))
}

/// List Movements Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMovementsParams {
    pub item_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

async fn fetch_item(
    server: &MandirServer,
    temple_id: Uuid,
    item_id: Uuid,
) -> Result<InventoryItem, ApiError> {
    sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items WHERE id = $1 AND temple_id = $2 AND is_active = true",
    )
    .bind(item_id)
    .bind(temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("inventory_item"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_cost() {
        // 10 units @ 5.00 + 10 units @ 7.00 = 20 units @ 6.00
        let cost = moving_average_cost(
            Decimal::new(10, 0),
            Decimal::new(500, 2),
            Decimal::new(10, 0),
            Decimal::new(700, 2),
        );
        assert_eq!(cost, Decimal::new(600, 2));
    }

    #[test]
    fn test_moving_average_first_receipt() {
        let cost = moving_average_cost(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(5, 0),
            Decimal::new(1200, 2),
        );
        assert_eq!(cost, Decimal::new(1200, 2));
    }

    #[test]
    fn test_purchase_request_validation() {
        let req = CreatePurchaseRequest {
            item_id: Uuid::new_v4(),
            vendor_name: "Sri Traders".to_string(),
            quantity: Decimal::new(25, 0),
            unit_cost: Decimal::new(4500, 2),
            payment_mode: "bank".to_string(),
            received_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
        };
        assert!(req.validate().is_ok());

        let bad = CreatePurchaseRequest {
            quantity: Decimal::ZERO,
            ..req
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_issue_request_validation() {
        let req = CreateIssueRequest {
            item_id: Uuid::new_v4(),
            quantity: Decimal::new(5, 0),
            purpose: "Annadanam kitchen".to_string(),
            department: None,
            issue_date: NaiveDate::from_ymd_opt(2026, 4, 11).unwrap(),
        };
        assert!(req.validate().is_ok());
    }
}
