use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Ledger account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Income => "income",
            AccountType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(AccountType::Asset),
            "liability" => Some(AccountType::Liability),
            "equity" => Some(AccountType::Equity),
            "income" | "revenue" => Some(AccountType::Income),
            "expense" => Some(AccountType::Expense),
            _ => None,
        }
    }

    /// True for types whose balance normally sits on the debit side.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Chart of Accounts entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub temple_id: Uuid,
    /// 4-5 digit account code, unique per temple, e.g. "1101"
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub parent_account_id: Option<Uuid>,
    pub opening_balance_debit: Decimal,
    pub opening_balance_credit: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn account_type(&self) -> Option<AccountType> {
        AccountType::parse(&self.account_type)
    }

    /// Opening balance netted to a signed figure (debit positive).
    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance_debit - self.opening_balance_credit
    }
}

/// Journal entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    Draft,
    Posted,
    Cancelled,
}

impl JournalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalStatus::Draft => "draft",
            JournalStatus::Posted => "posted",
            JournalStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(JournalStatus::Draft),
            "posted" => Some(JournalStatus::Posted),
            "cancelled" => Some(JournalStatus::Cancelled),
            _ => None,
        }
    }
}

/// Journal entry header (double-entry bookkeeping)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub temple_id: Uuid,
    /// Sequential per temple and year, format "JE/YYYY/NNNN"
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub narration: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub status: String,
    /// Set on the reversing entry, pointing at the cancelled original
    pub reversal_of: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub posted_by: Option<Uuid>,
    pub posted_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    pub fn status(&self) -> Option<JournalStatus> {
        JournalStatus::parse(&self.status)
    }
}

/// One debit-or-credit row within a journal entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct JournalLine {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub account_id: Uuid,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub description: Option<String>,
    pub line_order: i32,
}

/// Journal entry with its lines, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalEntryWithLines {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub lines: Vec<JournalLine>,
}

/// Input for one journal line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineInput {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit_amount: Decimal,
    #[serde(default)]
    pub credit_amount: Decimal,
    pub description: Option<String>,
}

impl LineInput {
    pub fn debit(account_id: Uuid, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: Some(description.into()),
        }
    }

    pub fn credit(account_id: Uuid, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: Some(description.into()),
        }
    }
}

/// Input for creating a journal entry
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateJournalEntry {
    pub entry_date: NaiveDate,
    pub narration: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub lines: Vec<LineInput>,
    /// Create directly as posted instead of draft
    #[serde(default)]
    pub post_immediately: bool,
}

// ============================================================================
// Report models
// ============================================================================

/// One account row in the trial balance
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub debit_balance: Decimal,
    pub credit_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrialBalanceReport {
    pub as_of_date: NaiveDate,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub is_balanced: bool,
}

/// One movement line in an account ledger statement
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerLine {
    pub entry_date: NaiveDate,
    pub entry_number: String,
    pub narration: String,
    pub description: Option<String>,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub running_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountLedger {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub lines: Vec<LedgerLine>,
}

/// Account amount within a profit & loss group
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlAccountRow {
    pub code: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlGroup {
    pub group_name: String,
    pub accounts: Vec<PlAccountRow>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfitLossReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub income_groups: Vec<PlGroup>,
    pub expense_groups: Vec<PlGroup>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_surplus: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceSheetRow {
    pub code: String,
    pub name: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceSheetSection {
    pub section_name: String,
    pub rows: Vec<BalanceSheetRow>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceSheetReport {
    pub as_of_date: NaiveDate,
    pub fixed_assets: BalanceSheetSection,
    pub current_assets: BalanceSheetSection,
    pub corpus_funds: BalanceSheetSection,
    pub designated_funds: BalanceSheetSection,
    pub current_liabilities: BalanceSheetSection,
    pub accumulated_surplus: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities_and_funds: Decimal,
    pub is_balanced: bool,
}

/// One journal line in the day book
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct DayBookRow {
    pub entry_date: NaiveDate,
    pub entry_number: String,
    pub narration: String,
    pub account_code: String,
    pub account_name: String,
    pub account_subtype: Option<String>,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayBookReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub rows: Vec<DayBookRow>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
}

/// Receipt/payment classification for cash and bank books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Receipt,
    Payment,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookLine {
    pub entry_date: NaiveDate,
    pub entry_number: String,
    pub narration: String,
    pub account_code: String,
    pub account_name: String,
    pub side: BookSide,
    pub amount: Decimal,
    pub running_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashBankBookReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_receipts: Decimal,
    pub total_payments: Decimal,
    pub lines: Vec<BookLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parse_roundtrip() {
        for t in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Income,
            AccountType::Expense,
        ] {
            assert_eq!(AccountType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AccountType::parse("revenue"), Some(AccountType::Income));
        assert_eq!(AccountType::parse("bogus"), None);
    }

    #[test]
    fn test_normal_balance_side() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Income.is_debit_normal());
        assert!(!AccountType::Equity.is_debit_normal());
    }

    #[test]
    fn test_journal_status_parse() {
        assert_eq!(JournalStatus::parse("POSTED"), Some(JournalStatus::Posted));
        assert_eq!(JournalStatus::parse("draft"), Some(JournalStatus::Draft));
        assert_eq!(JournalStatus::parse("void"), None);
    }

    #[test]
    fn test_line_input_helpers() {
        let id = Uuid::new_v4();
        let d = LineInput::debit(id, Decimal::new(50000, 2), "Cash received");
        assert_eq!(d.debit_amount, Decimal::new(50000, 2));
        assert_eq!(d.credit_amount, Decimal::ZERO);

        let c = LineInput::credit(id, Decimal::new(50000, 2), "Donation income");
        assert_eq!(c.debit_amount, Decimal::ZERO);
        assert_eq!(c.credit_amount, Decimal::new(50000, 2));
    }
}
