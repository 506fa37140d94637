//! Chart of Accounts management.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::models::{Account, AccountType};

/// Default ledger accounts seeded for a new temple.
///
/// Posting adapters fall back to these codes when no entity-linked account
/// is configured; see `posting::default_codes`.
pub const DEFAULT_CHART: &[(&str, &str, AccountType, Option<&str>)] = &[
    ("1101", "Cash in Hand", AccountType::Asset, Some("cash")),
    ("1102", "Bank Accounts", AccountType::Asset, Some("bank")),
    ("1103", "Hundi Cash", AccountType::Asset, Some("cash")),
    ("1201", "Inventory & Stores", AccountType::Asset, Some("stock")),
    ("1301", "Sponsorship Receivable", AccountType::Asset, Some("receivable")),
    ("1501", "Fixed Assets", AccountType::Asset, Some("fixed_asset")),
    ("1601", "Capital Work in Progress", AccountType::Asset, Some("cwip")),
    ("2101", "Vendor Payables", AccountType::Liability, Some("payable")),
    ("2102", "Salary Payable", AccountType::Liability, Some("payable")),
    ("3101", "Corpus Fund", AccountType::Equity, Some("corpus")),
    ("3201", "Annadanam Fund", AccountType::Equity, Some("fund")),
    ("4101", "General Donation Income", AccountType::Income, None),
    ("4102", "Hundi Collections", AccountType::Income, None),
    ("4103", "Annadanam Income", AccountType::Income, None),
    ("4104", "Construction Donations", AccountType::Income, None),
    ("4201", "Seva Income", AccountType::Income, None),
    ("4301", "Sponsorship Income", AccountType::Income, None),
    ("4901", "Gain on Asset Disposal", AccountType::Income, None),
    ("5101", "Salaries & Wages", AccountType::Expense, None),
    ("5201", "Materials Consumed", AccountType::Expense, None),
    ("5301", "Vendor & Service Charges", AccountType::Expense, None),
    ("5901", "Loss on Asset Disposal", AccountType::Expense, None),
];

/// Account codes are 4-5 digit numeric strings.
pub fn is_valid_account_code(code: &str) -> bool {
    (4..=5).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
}

/// Input for creating a ledger account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub account_subtype: Option<String>,
    pub parent_account_id: Option<Uuid>,
    #[serde(default)]
    pub opening_balance_debit: Decimal,
    #[serde(default)]
    pub opening_balance_credit: Decimal,
}

/// Input for updating a ledger account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub account_subtype: Option<String>,
    pub parent_account_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Account with its children, for the chart-of-accounts tree view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountTreeNode {
    #[serde(flatten)]
    pub account: Account,
    pub children: Vec<AccountTreeNode>,
}

/// Arrange a flat account list into a parent/child tree, sorted by code.
pub fn build_account_tree(accounts: Vec<Account>) -> Vec<AccountTreeNode> {
    fn attach(parent_id: Option<Uuid>, pool: &mut Vec<Account>) -> Vec<AccountTreeNode> {
        let (mine, rest): (Vec<Account>, Vec<Account>) = std::mem::take(pool)
            .into_iter()
            .partition(|a| a.parent_account_id == parent_id);
        *pool = rest;

        let mut nodes: Vec<AccountTreeNode> = mine
            .into_iter()
            .map(|account| {
                let id = account.id;
                AccountTreeNode {
                    account,
                    children: attach(Some(id), pool),
                }
            })
            .collect();
        nodes.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        nodes
    }

    let mut pool = accounts;
    attach(None, &mut pool)
}

/// Chart of Accounts service
#[derive(Clone)]
pub struct ChartOfAccountsService {
    pool: PgPool,
}

impl ChartOfAccountsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a ledger account. Account codes are unique per temple.
    pub async fn create_account(
        &self,
        temple_id: Uuid,
        input: CreateAccount,
    ) -> AccountingResult<Account> {
        if !is_valid_account_code(&input.code) {
            return Err(AccountingError::validation(format!(
                "Account code must be a 4-5 digit number, got '{}'",
                input.code
            )));
        }
        if input.name.trim().is_empty() {
            return Err(AccountingError::validation("Account name is required"));
        }

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM accounts WHERE temple_id = $1 AND code = $2",
        )
        .bind(temple_id)
        .bind(&input.code)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(AccountingError::validation(format!(
                "Account code {} already exists",
                input.code
            )));
        }

        if let Some(parent_id) = input.parent_account_id {
            let parent: Option<Uuid> = sqlx::query_scalar(
                "SELECT id FROM accounts WHERE id = $1 AND temple_id = $2",
            )
            .bind(parent_id)
            .bind(temple_id)
            .fetch_optional(&self.pool)
            .await?;
            if parent.is_none() {
                return Err(AccountingError::not_found("Parent account"));
            }
        }

        let now = Utc::now();
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                id, temple_id, code, name, account_type, account_subtype,
                parent_account_id, opening_balance_debit, opening_balance_credit,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(temple_id)
        .bind(&input.code)
        .bind(input.name.trim())
        .bind(input.account_type.as_str())
        .bind(&input.account_subtype)
        .bind(input.parent_account_id)
        .bind(input.opening_balance_debit)
        .bind(input.opening_balance_credit)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(code = %account.code, name = %account.name, "Ledger account created");
        Ok(account)
    }

    pub async fn update_account(
        &self,
        temple_id: Uuid,
        account_id: Uuid,
        input: UpdateAccount,
    ) -> AccountingResult<Account> {
        let current = self.get_account(temple_id, account_id).await?;

        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET name = $1, account_subtype = $2, parent_account_id = $3,
                is_active = $4, updated_at = $5
            WHERE id = $6 AND temple_id = $7
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(current.name))
        .bind(input.account_subtype.or(current.account_subtype))
        .bind(input.parent_account_id.or(current.parent_account_id))
        .bind(input.is_active.unwrap_or(current.is_active))
        .bind(Utc::now())
        .bind(account_id)
        .bind(temple_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    /// Deactivate rather than delete: posted lines may reference the account.
    pub async fn deactivate_account(
        &self,
        temple_id: Uuid,
        account_id: Uuid,
    ) -> AccountingResult<Account> {
        self.update_account(
            temple_id,
            account_id,
            UpdateAccount {
                name: None,
                account_subtype: None,
                parent_account_id: None,
                is_active: Some(false),
            },
        )
        .await
    }

    pub async fn get_account(&self, temple_id: Uuid, account_id: Uuid) -> AccountingResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 AND temple_id = $2")
            .bind(account_id)
            .bind(temple_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AccountingError::not_found("Account"))
    }

    pub async fn get_account_by_code(
        &self,
        temple_id: Uuid,
        code: &str,
    ) -> AccountingResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE temple_id = $1 AND code = $2",
        )
        .bind(temple_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn list_accounts(
        &self,
        temple_id: Uuid,
        account_type: Option<AccountType>,
        include_inactive: bool,
    ) -> AccountingResult<Vec<Account>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "SELECT * FROM accounts WHERE temple_id = ",
        );
        builder.push_bind(temple_id);
        if let Some(t) = account_type {
            builder.push(" AND account_type = ").push_bind(t.as_str());
        }
        if !include_inactive {
            builder.push(" AND is_active = true");
        }
        builder.push(" ORDER BY code");

        let accounts = builder
            .build_query_as::<Account>()
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    pub async fn account_tree(&self, temple_id: Uuid) -> AccountingResult<Vec<AccountTreeNode>> {
        let accounts = self.list_accounts(temple_id, None, true).await?;
        Ok(build_account_tree(accounts))
    }

    /// Insert any missing default accounts. Existing codes are left alone.
    pub async fn seed_default_chart(&self, temple_id: Uuid) -> AccountingResult<Vec<Account>> {
        let mut created = Vec::new();
        for (code, name, account_type, subtype) in DEFAULT_CHART {
            if self.get_account_by_code(temple_id, code).await?.is_some() {
                continue;
            }
            let account = self
                .create_account(
                    temple_id,
                    CreateAccount {
                        code: (*code).to_string(),
                        name: (*name).to_string(),
                        account_type: *account_type,
                        account_subtype: subtype.map(|s| s.to_string()),
                        parent_account_id: None,
                        opening_balance_debit: Decimal::ZERO,
                        opening_balance_credit: Decimal::ZERO,
                    },
                )
                .await?;
            created.push(account);
        }
        info!(count = created.len(), "Default chart of accounts seeded");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(code: &str, parent: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            temple_id: Uuid::new_v4(),
            code: code.to_string(),
            name: format!("Account {}", code),
            account_type: "asset".to_string(),
            account_subtype: None,
            parent_account_id: parent,
            opening_balance_debit: Decimal::ZERO,
            opening_balance_credit: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_account_code_validation() {
        assert!(is_valid_account_code("1101"));
        assert!(is_valid_account_code("41015"));
        assert!(!is_valid_account_code("110"));
        assert!(!is_valid_account_code("110155"));
        assert!(!is_valid_account_code("11A1"));
        assert!(!is_valid_account_code(""));
    }

    #[test]
    fn test_build_account_tree() {
        let root = account("1100", None);
        let root_id = root.id;
        let child_a = account("1101", Some(root_id));
        let child_b = account("1102", Some(root_id));
        let other_root = account("4101", None);

        let tree = build_account_tree(vec![child_b, other_root, root, child_a]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].account.code, "1100");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].account.code, "1101");
        assert_eq!(tree[0].children[1].account.code, "1102");
        assert_eq!(tree[1].account.code, "4101");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_default_chart_codes_are_valid_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for (code, _, _, _) in DEFAULT_CHART {
            assert!(is_valid_account_code(code), "bad code {}", code);
            assert!(seen.insert(*code), "duplicate code {}", code);
        }
    }
}
