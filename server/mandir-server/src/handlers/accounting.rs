//! Accounting endpoints: chart of accounts, journal entries and reports.
//!
//! These are thin HTTP shims over `accounting-service`; every rule (balance
//! validation, status transitions, reversal semantics, report assembly)
//! lives in the service crate.

use accounting_service::{
    AccountLedger, BalanceSheetReport, CashBankBookReport, ChartOfAccountsService, CreateAccount,
    CreateJournalEntry, DayBookReport, JournalEntryFilter, JournalService, JournalStatus,
    ProfitLossReport, ReportsService, TrialBalanceReport, UpdateAccount,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::{AuthContext, ROLE_ADMIN};
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::validation::RequestValidation;
use crate::validate_required;

type Account = accounting_service::Account;
type AccountTreeNode = accounting_service::AccountTreeNode;
type JournalEntry = accounting_service::JournalEntry;
type JournalEntryWithLines = accounting_service::JournalEntryWithLines;

// ============================================================================
// Chart of Accounts
// ============================================================================

/// Create a ledger account
#[utoipa::path(
    post,
    path = "/api/v1/accounting/accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Invalid request or duplicate code")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn create_account(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateAccount>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let account = chart.create_account(auth.temple_id, request).await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "account", account.id, "create", None)
        .await;

    Ok((StatusCode::CREATED, Json(api_success(account))))
}

/// List ledger accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounting/accounts",
    params(ListAccountsParams),
    responses(
        (status = 200, description = "Accounts retrieved", body = Vec<Account>)
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn list_accounts(
    State(server): State<MandirServer>,
    Query(params): Query<ListAccountsParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    let account_type = match params.account_type.as_deref() {
        Some(s) => Some(
            accounting_service::AccountType::parse(s)
                .ok_or_else(|| ApiError::validation(format!("Unknown account type '{}'", s)))?,
        ),
        None => None,
    };

    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let accounts = chart
        .list_accounts(
            auth.temple_id,
            account_type,
            params.include_inactive.unwrap_or(false),
        )
        .await?;

    Ok(Json(api_success(accounts)))
}

/// List Accounts Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAccountsParams {
    pub account_type: Option<String>,
    pub include_inactive: Option<bool>,
}

/// Chart of accounts as a tree
#[utoipa::path(
    get,
    path = "/api/v1/accounting/accounts/tree",
    responses(
        (status = 200, description = "Account tree retrieved", body = Vec<AccountTreeNode>)
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn account_tree(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<AccountTreeNode>>>, ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let tree = chart.account_tree(auth.temple_id).await?;
    Ok(Json(api_success(tree)))
}

/// Get a ledger account
#[utoipa::path(
    get,
    path = "/api/v1/accounting/accounts/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account retrieved", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn get_account(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let account = chart.get_account(auth.temple_id, account_id).await?;
    Ok(Json(api_success(account)))
}

/// Update a ledger account
#[utoipa::path(
    put,
    path = "/api/v1/accounting/accounts/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateAccount,
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<UpdateAccount>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let account = chart
        .update_account(auth.temple_id, account_id, request)
        .await?;
    Ok(Json(api_success(account)))
}

/// Deactivate a ledger account
#[utoipa::path(
    delete,
    path = "/api/v1/accounting/accounts/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deactivated", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_account(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let account = chart.deactivate_account(auth.temple_id, account_id).await?;
    Ok(Json(api_success(account)))
}

/// Seed the default chart of accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounting/accounts/seed-defaults",
    responses(
        (status = 200, description = "Missing default accounts created", body = Vec<Account>)
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn seed_default_accounts(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    let chart = ChartOfAccountsService::new(server.db_pool.clone());
    let created = chart.seed_default_chart(auth.temple_id).await?;
    Ok(Json(api_success(created)))
}

// ============================================================================
// Journal entries
// ============================================================================

/// Create a journal entry (draft, or posted with `post_immediately`)
#[utoipa::path(
    post,
    path = "/api/v1/accounting/journal-entries",
    request_body = CreateJournalEntry,
    responses(
        (status = 201, description = "Journal entry created", body = JournalEntryWithLines),
        (status = 400, description = "Unbalanced or malformed entry"),
        (status = 404, description = "Referenced account not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn create_journal_entry(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateJournalEntry>,
) -> Result<(StatusCode, Json<ApiResponse<JournalEntryWithLines>>), ApiError> {
    let journal = JournalService::new(server.db_pool.clone());
    let entry = journal
        .create_entry(auth.temple_id, auth.user_id, request)
        .await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "journal_entry",
            entry.entry.id,
            "create",
            Some(serde_json::json!({"entry_number": entry.entry.entry_number})),
        )
        .await;

    Ok((StatusCode::CREATED, Json(api_success(entry))))
}

/// Get a journal entry with its lines
#[utoipa::path(
    get,
    path = "/api/v1/accounting/journal-entries/{entry_id}",
    params(("entry_id" = Uuid, Path, description = "Journal entry ID")),
    responses(
        (status = 200, description = "Journal entry retrieved", body = JournalEntryWithLines),
        (status = 404, description = "Journal entry not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn get_journal_entry(
    State(server): State<MandirServer>,
    Path(entry_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<JournalEntryWithLines>>, ApiError> {
    let journal = JournalService::new(server.db_pool.clone());
    let entry = journal.get_entry(auth.temple_id, entry_id).await?;
    Ok(Json(api_success(entry)))
}

/// List journal entries
#[utoipa::path(
    get,
    path = "/api/v1/accounting/journal-entries",
    params(ListJournalEntriesParams),
    responses(
        (status = 200, description = "Journal entries retrieved", body = Vec<JournalEntry>)
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn list_journal_entries(
    State(server): State<MandirServer>,
    Query(params): Query<ListJournalEntriesParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<JournalEntry>>>, ApiError> {
    let status = match params.status.as_deref() {
        Some(s) => Some(
            JournalStatus::parse(s)
                .ok_or_else(|| ApiError::validation(format!("Unknown status '{}'", s)))?,
        ),
        None => None,
    };

    let journal = JournalService::new(server.db_pool.clone());
    let entries = journal
        .list_entries(
            auth.temple_id,
            JournalEntryFilter {
                status,
                reference_type: params.reference_type.clone(),
                from_date: params.from_date,
                to_date: params.to_date,
                limit: params.pagination.limit(),
                offset: params.pagination.offset(),
            },
        )
        .await?;

    Ok(Json(api_success(entries)))
}

/// List Journal Entries Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListJournalEntriesParams {
    pub status: Option<String>,
    pub reference_type: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Post a draft journal entry
#[utoipa::path(
    post,
    path = "/api/v1/accounting/journal-entries/{entry_id}/post",
    params(("entry_id" = Uuid, Path, description = "Journal entry ID")),
    responses(
        (status = 200, description = "Journal entry posted", body = JournalEntryWithLines),
        (status = 400, description = "Not a draft entry"),
        (status = 404, description = "Journal entry not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn post_journal_entry(
    State(server): State<MandirServer>,
    Path(entry_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<JournalEntryWithLines>>, ApiError> {
    let journal = JournalService::new(server.db_pool.clone());
    let entry = journal
        .post_entry(auth.temple_id, entry_id, auth.user_id)
        .await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(&auth, "journal_entry", entry_id, "post", None)
        .await;

    Ok(Json(api_success(entry)))
}

/// Cancel Journal Entry Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelJournalEntryRequest {
    pub reason: String,
}

impl RequestValidation for CancelJournalEntryRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.reason, "Cancellation reason is required");
        Ok(())
    }
}

/// Cancellation outcome: the cancelled original and its reversal
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct CancellationResponse {
    pub cancelled: JournalEntry,
    pub reversal: JournalEntryWithLines,
}

/// Cancel a posted entry (admin only); creates a posted reversing entry
#[utoipa::path(
    post,
    path = "/api/v1/accounting/journal-entries/{entry_id}/cancel",
    params(("entry_id" = Uuid, Path, description = "Journal entry ID")),
    request_body = CancelJournalEntryRequest,
    responses(
        (status = 200, description = "Entry cancelled with reversal", body = CancellationResponse),
        (status = 400, description = "Not a posted entry"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Journal entry not found")
    ),
    tag = "accounting",
    security(("bearer_auth" = []))
)]
pub async fn cancel_journal_entry(
    State(server): State<MandirServer>,
    Path(entry_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<CancelJournalEntryRequest>,
) -> Result<Json<ApiResponse<CancellationResponse>>, ApiError> {
    auth.require_role(ROLE_ADMIN)?;
    request.validate()?;

    let journal = JournalService::new(server.db_pool.clone());
    let (cancelled, reversal) = journal
        .cancel_entry(auth.temple_id, entry_id, auth.user_id, &request.reason)
        .await?;

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "journal_entry",
            entry_id,
            "cancel",
            Some(serde_json::json!({
                "reason": request.reason,
                "reversal": reversal.entry.entry_number,
            })),
        )
        .await;

    Ok(Json(api_success(CancellationResponse { cancelled, reversal })))
}

// ============================================================================
// Reports
// ============================================================================

/// Report date-range query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportRangeParams {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Report as-of query; defaults to today
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportAsOfParams {
    pub as_of_date: Option<NaiveDate>,
}

/// Account ledger query
#[derive(Debug, Deserialize, IntoParams)]
pub struct LedgerParams {
    pub account_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Trial balance
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/trial-balance",
    params(ReportAsOfParams),
    responses(
        (status = 200, description = "Trial balance", body = TrialBalanceReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn trial_balance(
    State(server): State<MandirServer>,
    Query(params): Query<ReportAsOfParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<TrialBalanceReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .trial_balance(
            auth.temple_id,
            params.as_of_date.unwrap_or_else(|| Utc::now().date_naive()),
        )
        .await?;
    Ok(Json(api_success(report)))
}

/// Account ledger statement
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/ledger",
    params(LedgerParams),
    responses(
        (status = 200, description = "Account ledger", body = AccountLedger),
        (status = 404, description = "Account not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn account_ledger(
    State(server): State<MandirServer>,
    Query(params): Query<LedgerParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<AccountLedger>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .account_ledger(
            auth.temple_id,
            params.account_id,
            params.from_date,
            params.to_date,
        )
        .await?;
    Ok(Json(api_success(report)))
}

/// Profit & loss statement
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/profit-loss",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Profit & loss", body = ProfitLossReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn profit_and_loss(
    State(server): State<MandirServer>,
    Query(params): Query<ReportRangeParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<ProfitLossReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .profit_and_loss(auth.temple_id, params.from_date, params.to_date)
        .await?;
    Ok(Json(api_success(report)))
}

/// Balance sheet
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/balance-sheet",
    params(ReportAsOfParams),
    responses(
        (status = 200, description = "Balance sheet", body = BalanceSheetReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn balance_sheet(
    State(server): State<MandirServer>,
    Query(params): Query<ReportAsOfParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<BalanceSheetReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .balance_sheet(
            auth.temple_id,
            params.as_of_date.unwrap_or_else(|| Utc::now().date_naive()),
        )
        .await?;
    Ok(Json(api_success(report)))
}

/// Day book: every posted journal line in the range
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/day-book",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Day book", body = DayBookReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn day_book(
    State(server): State<MandirServer>,
    Query(params): Query<ReportRangeParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<DayBookReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .day_book(auth.temple_id, params.from_date, params.to_date)
        .await?;
    Ok(Json(api_success(report)))
}

/// Cash book: receipts and payments on cash accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/cash-book",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Cash book", body = CashBankBookReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn cash_book(
    State(server): State<MandirServer>,
    Query(params): Query<ReportRangeParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<CashBankBookReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .cash_book(auth.temple_id, params.from_date, params.to_date)
        .await?;
    Ok(Json(api_success(report)))
}

/// Bank book: receipts and payments on bank accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounting/reports/bank-book",
    params(ReportRangeParams),
    responses(
        (status = 200, description = "Bank book", body = CashBankBookReport)
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn bank_book(
    State(server): State<MandirServer>,
    Query(params): Query<ReportRangeParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<CashBankBookReport>>, ApiError> {
    let reports = ReportsService::new(server.db_pool.clone());
    let report = reports
        .bank_book(auth.temple_id, params.from_date, params.to_date)
        .await?;
    Ok(Json(api_success(report)))
}
