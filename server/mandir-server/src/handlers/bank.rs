//! Bank accounts, statement import and reconciliation.
//!
//! Statement CSV columns: Date, Value Date, Description, Debit, Credit,
//! Balance, Reference. Rows without a parseable date are skipped silently,
//! matching how bank exports pad statements with section headers and blank
//! separator rows.

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
use crate::middleware::AuthContext;
use crate::server::MandirServer;
use crate::services::AuditService;
use crate::types::pagination::PaginationParams;
use crate::utils::csv_io::{column_index, parse_amount, parse_flexible_date, read_csv_records};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

/// Bank account record, linked to its ledger account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub branch: Option<String>,
    pub ifsc_code: Option<String>,
    /// Ledger account backing this bank account
    pub ledger_account_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One imported bank statement line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct BankStatementLine {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub bank_account_id: Uuid,
    pub txn_date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Option<Decimal>,
    pub reference: Option<String>,
    pub reconciled: bool,
    pub matched_journal_line_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Reconciliation summary record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct BankReconciliation {
    pub id: Uuid,
    pub temple_id: Uuid,
    pub verification_number: String,
    pub bank_account_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub book_balance: Decimal,
    pub statement_balance: Decimal,
    pub difference: Decimal,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create Bank Account Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBankAccountRequest {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub branch: Option<String>,
    pub ifsc_code: Option<String>,
    pub ledger_account_id: Option<Uuid>,
}

impl RequestValidation for CreateBankAccountRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.account_name, "Account name is required");
        validate_required!(self.account_number, "Account number is required");
        validate_required!(self.bank_name, "Bank name is required");
        if let Some(ref ifsc) = self.ifsc_code {
            validate_field!(ifsc, ifsc.len() == 11, "IFSC code must be 11 characters");
        }
        Ok(())
    }
}

/// Match Statement Line Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct MatchLineRequest {
    pub journal_line_id: Uuid,
}

/// Create Reconciliation Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReconciliationRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub statement_balance: Decimal,
}

/// Statement import summary: rows without a parseable date are skipped,
/// not errors
#[derive(Debug, Serialize, ToSchema)]
pub struct StatementImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Register a bank account
#[utoipa::path(
    post,
    path = "/api/v1/bank/accounts",
    request_body = CreateBankAccountRequest,
    responses(
        (status = 201, description = "Bank account registered", body = BankAccount),
        (status = 400, description = "Invalid request")
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn create_bank_account(
    State(server): State<MandirServer>,
    auth: AuthContext,
    Json(request): Json<CreateBankAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BankAccount>>), ApiError> {
    request.validate()?;

    if let Some(ledger_account_id) = request.ledger_account_id {
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 AND temple_id = $2")
                .bind(ledger_account_id)
                .bind(auth.temple_id)
                .fetch_optional(&server.db_pool)
                .await?;
        if exists.is_none() {
            return Err(ApiError::not_found("ledger account"));
        }
    }

    let account = sqlx::query_as::<_, BankAccount>(
        r#"
        INSERT INTO bank_accounts (
            id, temple_id, account_name, account_number, bank_name, branch,
            ifsc_code, ledger_account_id, is_active, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(request.account_name.trim())
    .bind(request.account_number.trim())
    .bind(request.bank_name.trim())
    .bind(&request.branch)
    .bind(&request.ifsc_code)
    .bind(request.ledger_account_id)
    .fetch_one(&server.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(api_success(account))))
}

/// List bank accounts
#[utoipa::path(
    get,
    path = "/api/v1/bank/accounts",
    responses(
        (status = 200, description = "Bank accounts retrieved", body = Vec<BankAccount>)
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn list_bank_accounts(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<BankAccount>>>, ApiError> {
    let accounts = sqlx::query_as::<_, BankAccount>(
        "SELECT * FROM bank_accounts WHERE temple_id = $1 AND is_active = true ORDER BY account_name",
    )
    .bind(auth.temple_id)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(accounts)))
}

/// Import a bank statement CSV for an account
#[utoipa::path(
    post,
    path = "/api/v1/bank/accounts/{account_id}/statement",
    params(("account_id" = Uuid, Path, description = "Bank account ID")),
    request_body = String,
    responses(
        (status = 200, description = "Import summary", body = StatementImportSummary),
        (status = 400, description = "Invalid CSV"),
        (status = 404, description = "Bank account not found")
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn import_statement_csv(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
    body: String,
) -> Result<Json<ApiResponse<StatementImportSummary>>, ApiError> {
    let account = fetch_bank_account(&server, auth.temple_id, account_id).await?;

    let (headers, records) = read_csv_records(&body)?;
    let date_col =
        column_index(&headers, "Date").ok_or_else(|| ApiError::bad_request("Missing Date column"))?;
    let value_date_col = column_index(&headers, "Value Date");
    let description_col = column_index(&headers, "Description");
    let debit_col = column_index(&headers, "Debit");
    let credit_col = column_index(&headers, "Credit");
    let balance_col = column_index(&headers, "Balance");
    let reference_col = column_index(&headers, "Reference");

    let mut imported = 0;
    let mut skipped = 0;

    for record in &records {
        let cell = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty())
        };

        // Unparseable dates: section headers, footers, separator rows
        let Some(txn_date) = cell(Some(date_col)).and_then(parse_flexible_date) else {
            skipped += 1;
            continue;
        };

        let debit = cell(debit_col).and_then(parse_amount).unwrap_or(Decimal::ZERO);
        let credit = cell(credit_col).and_then(parse_amount).unwrap_or(Decimal::ZERO);

        sqlx::query(
            r#"
            INSERT INTO bank_statement_lines (
                id, temple_id, bank_account_id, txn_date, value_date, description,
                debit, credit, balance, reference, reconciled,
                matched_journal_line_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, false, NULL, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(auth.temple_id)
        .bind(account.id)
        .bind(txn_date)
        .bind(cell(value_date_col).and_then(parse_flexible_date))
        .bind(cell(description_col))
        .bind(debit)
        .bind(credit)
        .bind(cell(balance_col).and_then(parse_amount))
        .bind(cell(reference_col))
        .execute(&server.db_pool)
        .await?;
        imported += 1;
    }

    let audit = AuditService::new(server.db_pool.clone());
    let _ = audit
        .log_action(
            &auth,
            "bank_account",
            account.id,
            "statement_import",
            Some(serde_json::json!({"imported": imported, "skipped": skipped})),
        )
        .await;

    Ok(Json(api_success(StatementImportSummary { imported, skipped })))
}

/// List statement lines for an account
#[utoipa::path(
    get,
    path = "/api/v1/bank/accounts/{account_id}/lines",
    params(
        ("account_id" = Uuid, Path, description = "Bank account ID"),
        ListStatementLinesParams
    ),
    responses(
        (status = 200, description = "Statement lines retrieved", body = Vec<BankStatementLine>)
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn list_statement_lines(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<ListStatementLinesParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<BankStatementLine>>>, ApiError> {
    let mut query = PaginatedQuery::new("SELECT * FROM bank_statement_lines WHERE 1=1");
    query
        .filter_temple(auth.temple_id)
        .filter_eq("bank_account_id", Some(account_id))
        .filter_eq("reconciled", params.reconciled)
        .filter_date_range("txn_date", params.from_date, params.to_date)
        .order_by("txn_date", "ASC")
        .paginate(&params.pagination);
    let lines: Vec<BankStatementLine> = query.build().fetch_all(&server.db_pool).await?;

    Ok(Json(api_success(lines)))
}

/// List Statement Lines Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListStatementLinesParams {
    pub reconciled: Option<bool>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Match a statement line to a journal line
#[utoipa::path(
    post,
    path = "/api/v1/bank/lines/{line_id}/match",
    params(("line_id" = Uuid, Path, description = "Statement line ID")),
    request_body = MatchLineRequest,
    responses(
        (status = 200, description = "Line matched", body = BankStatementLine),
        (status = 404, description = "Line not found")
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn match_statement_line(
    State(server): State<MandirServer>,
    Path(line_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<MatchLineRequest>,
) -> Result<Json<ApiResponse<BankStatementLine>>, ApiError> {
    // The journal line must belong to a posted entry of this temple
    let journal_line_exists: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT jl.id FROM journal_lines jl
        JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE jl.id = $1 AND je.temple_id = $2 AND je.status = 'posted'
        "#,
    )
    .bind(request.journal_line_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?;
    if journal_line_exists.is_none() {
        return Err(ApiError::not_found("journal line"));
    }

    let line = sqlx::query_as::<_, BankStatementLine>(
        "UPDATE bank_statement_lines SET reconciled = true, matched_journal_line_id = $1 \
         WHERE id = $2 AND temple_id = $3 RETURNING *",
    )
    .bind(request.journal_line_id)
    .bind(line_id)
    .bind(auth.temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("statement line"))?;

    Ok(Json(api_success(line)))
}

/// Create a reconciliation summary for a period
///
/// Book balance comes from the ledger account linked to the bank account
/// (opening balance plus posted movements through the period end).
#[utoipa::path(
    post,
    path = "/api/v1/bank/accounts/{account_id}/reconciliations",
    params(("account_id" = Uuid, Path, description = "Bank account ID")),
    request_body = CreateReconciliationRequest,
    responses(
        (status = 201, description = "Reconciliation created", body = BankReconciliation),
        (status = 400, description = "No linked ledger account"),
        (status = 404, description = "Bank account not found")
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn create_reconciliation(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
    Json(request): Json<CreateReconciliationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BankReconciliation>>), ApiError> {
    if request.to_date < request.from_date {
        return Err(ApiError::validation("to_date must not be before from_date"));
    }

    let account = fetch_bank_account(&server, auth.temple_id, account_id).await?;
    let ledger_account_id = account.ledger_account_id.ok_or_else(|| {
        ApiError::validation("Bank account has no linked ledger account to reconcile against")
    })?;

    let (opening_debit, opening_credit): (Decimal, Decimal) = sqlx::query_as(
        "SELECT opening_balance_debit, opening_balance_credit FROM accounts \
         WHERE id = $1 AND temple_id = $2",
    )
    .bind(ledger_account_id)
    .bind(auth.temple_id)
    .fetch_one(&server.db_pool)
    .await?;

    let (total_debit, total_credit): (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(jl.debit_amount), 0), COALESCE(SUM(jl.credit_amount), 0)
        FROM journal_lines jl
        JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE je.temple_id = $1 AND je.status = 'posted'
          AND jl.account_id = $2 AND je.entry_date <= $3
        "#,
    )
    .bind(auth.temple_id)
    .bind(ledger_account_id)
    .bind(request.to_date)
    .fetch_one(&server.db_pool)
    .await?;

    let book_balance = opening_debit - opening_credit + total_debit - total_credit;
    let difference = request.statement_balance - book_balance;
    let status = if difference.abs() < Decimal::new(1, 2) {
        "balanced"
    } else {
        "open"
    };

    let mut tx = server.db_pool.begin().await?;
    let verification_number = next_document_number(
        &mut *tx,
        auth.temple_id,
        "bank_reconciliations",
        "verification_number",
        "VER",
    )
    .await?;

    let reconciliation = sqlx::query_as::<_, BankReconciliation>(
        r#"
        INSERT INTO bank_reconciliations (
            id, temple_id, verification_number, bank_account_id, from_date,
            to_date, book_balance, statement_balance, difference, status,
            created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.temple_id)
    .bind(&verification_number)
    .bind(account.id)
    .bind(request.from_date)
    .bind(request.to_date)
    .bind(book_balance)
    .bind(request.statement_balance)
    .bind(difference)
    .bind(status)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(api_success(reconciliation))))
}

/// List reconciliations for an account
#[utoipa::path(
    get,
    path = "/api/v1/bank/accounts/{account_id}/reconciliations",
    params(("account_id" = Uuid, Path, description = "Bank account ID")),
    responses(
        (status = 200, description = "Reconciliations retrieved", body = Vec<BankReconciliation>)
    ),
    tag = "bank",
    security(("bearer_auth" = []))
)]
pub async fn list_reconciliations(
    State(server): State<MandirServer>,
    Path(account_id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<BankReconciliation>>>, ApiError> {
    let reconciliations = sqlx::query_as::<_, BankReconciliation>(
        "SELECT * FROM bank_reconciliations WHERE temple_id = $1 AND bank_account_id = $2 \
         ORDER BY to_date DESC",
    )
    .bind(auth.temple_id)
    .bind(account_id)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(reconciliations)))
}

async fn fetch_bank_account(
    server: &MandirServer,
    temple_id: Uuid,
    account_id: Uuid,
) -> Result<BankAccount, ApiError> {
    sqlx::query_as::<_, BankAccount>(
        "SELECT * FROM bank_accounts WHERE id = $1 AND temple_id = $2",
    )
    .bind(account_id)
    .bind(temple_id)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::not_found("bank_account"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_account_request_validation() {
        let req = CreateBankAccountRequest {
            account_name: "Temple Operations".to_string(),
            account_number: "1234567890".to_string(),
            bank_name: "State Bank".to_string(),
            branch: Some("Mylapore".to_string()),
            ifsc_code: Some("SBIN0001234".to_string()),
            ledger_account_id: None,
        };
        assert!(req.validate().is_ok());

        let bad_ifsc = CreateBankAccountRequest {
            ifsc_code: Some("SBIN".to_string()),
            ..req
        };
        assert!(bad_ifsc.validate().is_err());
    }
}
