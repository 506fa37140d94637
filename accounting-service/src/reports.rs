//! Financial reports.
//!
//! Every report aggregates posted `journal_lines` at request time; there is
//! no pre-aggregation or caching. The SQL layer fetches per-account debit
//! and credit totals, the classification into report sections happens in
//! plain functions below so the rules stay testable without a database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::models::{
    Account, AccountLedger, AccountType, BalanceSheetReport, BalanceSheetRow, BalanceSheetSection,
    BookLine, BookSide, CashBankBookReport, DayBookReport, DayBookRow, LedgerLine, PlAccountRow,
    PlGroup, ProfitLossReport, TrialBalanceReport, TrialBalanceRow,
};
use crate::validation::balance_tolerance;

/// Per-account activity as fetched from the database
#[derive(Debug, Clone, FromRow)]
pub struct AccountActivity {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub opening_balance_debit: Decimal,
    pub opening_balance_credit: Decimal,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl AccountActivity {
    /// Net balance, debit positive: opening + debits - credits.
    pub fn net_balance(&self) -> Decimal {
        self.opening_balance_debit - self.opening_balance_credit + self.total_debit
            - self.total_credit
    }

    /// Period movement only, ignoring opening balances.
    pub fn period_movement(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

// ============================================================================
// Classification rules
// ============================================================================

/// Profit & loss sub-range for an income account code.
pub fn income_group_name(code: &str) -> &'static str {
    match code.get(..2) {
        Some("41") => "Donation Income",
        Some("42") => "Seva Income",
        Some("43") => "Sponsorship Income",
        _ => "Other Income",
    }
}

/// Profit & loss sub-range for an expense account code.
pub fn expense_group_name(code: &str) -> &'static str {
    match code.get(..2) {
        Some("51") => "Salaries & Wages",
        Some("52") => "Materials Consumed",
        Some("53") => "Vendor & Services",
        _ => "Other Expenses",
    }
}

/// Fixed vs current asset classification, by subtype then name substring.
pub fn is_fixed_asset(name: &str, subtype: Option<&str>) -> bool {
    if matches!(subtype, Some("fixed_asset") | Some("cwip")) {
        return true;
    }
    let name = name.to_lowercase();
    ["land", "building", "vehicle", "equipment", "furniture"]
        .iter()
        .any(|kw| name.contains(kw))
}

/// Liability/fund section on the balance sheet, by name substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundSection {
    Corpus,
    DesignatedFund,
    CurrentLiability,
}

pub fn fund_section(name: &str) -> FundSection {
    let name = name.to_lowercase();
    if name.contains("corpus") {
        FundSection::Corpus
    } else if name.contains("fund") {
        FundSection::DesignatedFund
    } else {
        FundSection::CurrentLiability
    }
}

// ============================================================================
// Report assembly (pure)
// ============================================================================

/// Build the trial balance from per-account activity as of a date.
pub fn build_trial_balance(as_of_date: NaiveDate, activity: &[AccountActivity]) -> TrialBalanceReport {
    let mut rows = Vec::new();
    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;

    for account in activity {
        let net = account.net_balance();
        if net == Decimal::ZERO {
            continue;
        }
        let (debit_balance, credit_balance) = if net > Decimal::ZERO {
            (net, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -net)
        };
        total_debits += debit_balance;
        total_credits += credit_balance;
        rows.push(TrialBalanceRow {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type.clone(),
            debit_balance,
            credit_balance,
        });
    }

    let is_balanced = (total_debits - total_credits).abs() < balance_tolerance();
    TrialBalanceReport {
        as_of_date,
        rows,
        total_debits,
        total_credits,
        is_balanced,
    }
}

/// Build the profit & loss statement from period activity.
///
/// Income accounts carry credit-normal balances so their contribution is the
/// negated period movement; expenses contribute the movement directly.
pub fn build_profit_loss(
    from_date: NaiveDate,
    to_date: NaiveDate,
    activity: &[AccountActivity],
) -> ProfitLossReport {
    let mut income_groups: Vec<PlGroup> = Vec::new();
    let mut expense_groups: Vec<PlGroup> = Vec::new();

    fn push_row(groups: &mut Vec<PlGroup>, group_name: &str, row: PlAccountRow) {
        if let Some(group) = groups.iter_mut().find(|g| g.group_name == group_name) {
            group.total += row.amount;
            group.accounts.push(row);
        } else {
            groups.push(PlGroup {
                group_name: group_name.to_string(),
                total: row.amount,
                accounts: vec![row],
            });
        }
    }

    for account in activity {
        let movement = account.period_movement();
        if movement == Decimal::ZERO {
            continue;
        }
        match AccountType::parse(&account.account_type) {
            Some(AccountType::Income) => {
                let row = PlAccountRow {
                    code: account.code.clone(),
                    name: account.name.clone(),
                    amount: -movement,
                };
                push_row(&mut income_groups, income_group_name(&account.code), row);
            }
            Some(AccountType::Expense) => {
                let row = PlAccountRow {
                    code: account.code.clone(),
                    name: account.name.clone(),
                    amount: movement,
                };
                push_row(&mut expense_groups, expense_group_name(&account.code), row);
            }
            _ => {}
        }
    }

    income_groups.sort_by(|a, b| a.group_name.cmp(&b.group_name));
    expense_groups.sort_by(|a, b| a.group_name.cmp(&b.group_name));

    let total_income: Decimal = income_groups.iter().map(|g| g.total).sum();
    let total_expense: Decimal = expense_groups.iter().map(|g| g.total).sum();

    ProfitLossReport {
        from_date,
        to_date,
        income_groups,
        expense_groups,
        total_income,
        total_expense,
        net_surplus: total_income - total_expense,
    }
}

/// Build the balance sheet from through-date activity.
///
/// Income and expense accounts do not appear directly; their net effect is
/// carried as accumulated surplus on the funds side.
pub fn build_balance_sheet(as_of_date: NaiveDate, activity: &[AccountActivity]) -> BalanceSheetReport {
    let mut fixed_assets = section("Fixed Assets");
    let mut current_assets = section("Current Assets");
    let mut corpus_funds = section("Corpus Fund");
    let mut designated_funds = section("Designated Funds");
    let mut current_liabilities = section("Current Liabilities");
    let mut accumulated_surplus = Decimal::ZERO;

    for account in activity {
        let net = account.net_balance();
        match AccountType::parse(&account.account_type) {
            Some(AccountType::Asset) => {
                if net == Decimal::ZERO {
                    continue;
                }
                let target = if is_fixed_asset(&account.name, account.account_subtype.as_deref()) {
                    &mut fixed_assets
                } else {
                    &mut current_assets
                };
                push_balance_row(target, account, net);
            }
            Some(AccountType::Liability) | Some(AccountType::Equity) => {
                // Credit-normal: report the credit balance as positive
                let balance = -net;
                if balance == Decimal::ZERO {
                    continue;
                }
                let target = match fund_section(&account.name) {
                    FundSection::Corpus => &mut corpus_funds,
                    FundSection::DesignatedFund => &mut designated_funds,
                    FundSection::CurrentLiability => &mut current_liabilities,
                };
                push_balance_row(target, account, balance);
            }
            Some(AccountType::Income) => accumulated_surplus += -net,
            Some(AccountType::Expense) => accumulated_surplus -= net,
            None => {}
        }
    }

    let total_assets = fixed_assets.total + current_assets.total;
    let total_liabilities_and_funds = corpus_funds.total
        + designated_funds.total
        + current_liabilities.total
        + accumulated_surplus;
    let is_balanced = (total_assets - total_liabilities_and_funds).abs() < balance_tolerance();

    BalanceSheetReport {
        as_of_date,
        fixed_assets,
        current_assets,
        corpus_funds,
        designated_funds,
        current_liabilities,
        accumulated_surplus,
        total_assets,
        total_liabilities_and_funds,
        is_balanced,
    }
}

fn section(name: &str) -> BalanceSheetSection {
    BalanceSheetSection {
        section_name: name.to_string(),
        rows: Vec::new(),
        total: Decimal::ZERO,
    }
}

fn push_balance_row(target: &mut BalanceSheetSection, account: &AccountActivity, balance: Decimal) {
    target.total += balance;
    target.rows.push(BalanceSheetRow {
        code: account.code.clone(),
        name: account.name.clone(),
        balance,
    });
}

// ============================================================================
// Service
// ============================================================================

#[derive(Debug, Clone, FromRow)]
struct MovementRow {
    entry_date: NaiveDate,
    entry_number: String,
    narration: String,
    description: Option<String>,
    debit_amount: Decimal,
    credit_amount: Decimal,
}

#[derive(Debug, Clone, FromRow)]
struct BookRow {
    entry_date: NaiveDate,
    entry_number: String,
    narration: String,
    account_code: String,
    account_name: String,
    debit_amount: Decimal,
    credit_amount: Decimal,
}

/// Financial reports service
#[derive(Clone)]
pub struct ReportsService {
    pool: PgPool,
}

impl ReportsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trial balance: every active account with a non-zero balance as of the
    /// given date, netted to a single debit-or-credit column.
    pub async fn trial_balance(
        &self,
        temple_id: Uuid,
        as_of_date: NaiveDate,
    ) -> AccountingResult<TrialBalanceReport> {
        let activity = self.activity_through(temple_id, as_of_date).await?;
        Ok(build_trial_balance(as_of_date, &activity))
    }

    /// Account ledger: opening balance at `from_date`, then chronological
    /// movements with a running balance.
    pub async fn account_ledger(
        &self,
        temple_id: Uuid,
        account_id: Uuid,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<AccountLedger> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE id = $1 AND temple_id = $2",
        )
        .bind(account_id)
        .bind(temple_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AccountingError::not_found("Account"))?;

        let (prior_debit, prior_credit): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(jl.debit_amount), 0), COALESCE(SUM(jl.credit_amount), 0)
            FROM journal_lines jl
            JOIN journal_entries je ON je.id = jl.journal_entry_id
            WHERE je.temple_id = $1 AND je.status = 'posted'
              AND jl.account_id = $2 AND je.entry_date < $3
            "#,
        )
        .bind(temple_id)
        .bind(account_id)
        .bind(from_date)
        .fetch_one(&self.pool)
        .await?;

        let opening_balance = account.opening_balance() + prior_debit - prior_credit;

        let movements = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT je.entry_date, je.entry_number, je.narration,
                   jl.description, jl.debit_amount, jl.credit_amount
            FROM journal_lines jl
            JOIN journal_entries je ON je.id = jl.journal_entry_id
            WHERE je.temple_id = $1 AND je.status = 'posted'
              AND jl.account_id = $2 AND je.entry_date BETWEEN $3 AND $4
            ORDER BY je.entry_date, je.entry_number, jl.line_order
            "#,
        )
        .bind(temple_id)
        .bind(account_id)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await?;

        let mut running = opening_balance;
        let lines: Vec<LedgerLine> = movements
            .into_iter()
            .map(|m| {
                running += m.debit_amount - m.credit_amount;
                LedgerLine {
                    entry_date: m.entry_date,
                    entry_number: m.entry_number,
                    narration: m.narration,
                    description: m.description,
                    debit_amount: m.debit_amount,
                    credit_amount: m.credit_amount,
                    running_balance: running,
                }
            })
            .collect();

        Ok(AccountLedger {
            account_id: account.id,
            code: account.code,
            name: account.name,
            from_date,
            to_date,
            opening_balance,
            closing_balance: running,
            lines,
        })
    }

    /// Profit & loss over a period, grouped into the standard sub-ranges.
    pub async fn profit_and_loss(
        &self,
        temple_id: Uuid,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<ProfitLossReport> {
        let activity = self.activity_between(temple_id, from_date, to_date).await?;
        Ok(build_profit_loss(from_date, to_date, &activity))
    }

    /// Balance sheet as of a date.
    pub async fn balance_sheet(
        &self,
        temple_id: Uuid,
        as_of_date: NaiveDate,
    ) -> AccountingResult<BalanceSheetReport> {
        let activity = self.activity_through(temple_id, as_of_date).await?;
        Ok(build_balance_sheet(as_of_date, &activity))
    }

    /// Day book: every posted journal line in the range, in order.
    pub async fn day_book(
        &self,
        temple_id: Uuid,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<DayBookReport> {
        let rows = sqlx::query_as::<_, DayBookRow>(
            r#"
            SELECT je.entry_date, je.entry_number, je.narration,
                   a.code AS account_code, a.name AS account_name,
                   a.account_subtype, jl.debit_amount, jl.credit_amount
            FROM journal_lines jl
            JOIN journal_entries je ON je.id = jl.journal_entry_id
            JOIN accounts a ON a.id = jl.account_id
            WHERE je.temple_id = $1 AND je.status = 'posted'
              AND je.entry_date BETWEEN $2 AND $3
            ORDER BY je.entry_date, je.entry_number, jl.line_order
            "#,
        )
        .bind(temple_id)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await?;

        let total_debits = rows.iter().map(|r| r.debit_amount).sum();
        let total_credits = rows.iter().map(|r| r.credit_amount).sum();

        Ok(DayBookReport {
            from_date,
            to_date,
            rows,
            total_debits,
            total_credits,
        })
    }

    /// Cash book: movements on accounts with subtype `cash`.
    pub async fn cash_book(
        &self,
        temple_id: Uuid,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<CashBankBookReport> {
        self.subtype_book(temple_id, "cash", from_date, to_date).await
    }

    /// Bank book: movements on accounts with subtype `bank`.
    pub async fn bank_book(
        &self,
        temple_id: Uuid,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<CashBankBookReport> {
        self.subtype_book(temple_id, "bank", from_date, to_date).await
    }

    async fn subtype_book(
        &self,
        temple_id: Uuid,
        subtype: &str,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> AccountingResult<CashBankBookReport> {
        let (opening_account, prior_debit, prior_credit): (Decimal, Decimal, Decimal) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE((SELECT SUM(opening_balance_debit - opening_balance_credit)
                              FROM accounts
                              WHERE temple_id = $1 AND account_subtype = $2), 0),
                    COALESCE(SUM(jl.debit_amount), 0),
                    COALESCE(SUM(jl.credit_amount), 0)
                FROM journal_lines jl
                JOIN journal_entries je ON je.id = jl.journal_entry_id
                JOIN accounts a ON a.id = jl.account_id
                WHERE je.temple_id = $1 AND je.status = 'posted'
                  AND a.account_subtype = $2 AND je.entry_date < $3
                "#,
            )
            .bind(temple_id)
            .bind(subtype)
            .bind(from_date)
            .fetch_one(&self.pool)
            .await?;

        let opening_balance = opening_account + prior_debit - prior_credit;

        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT je.entry_date, je.entry_number, je.narration,
                   a.code AS account_code, a.name AS account_name,
                   jl.debit_amount, jl.credit_amount
            FROM journal_lines jl
            JOIN journal_entries je ON je.id = jl.journal_entry_id
            JOIN accounts a ON a.id = jl.account_id
            WHERE je.temple_id = $1 AND je.status = 'posted'
              AND a.account_subtype = $2 AND je.entry_date BETWEEN $3 AND $4
            ORDER BY je.entry_date, je.entry_number, jl.line_order
            "#,
        )
        .bind(temple_id)
        .bind(subtype)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await?;

        let mut running = opening_balance;
        let mut total_receipts = Decimal::ZERO;
        let mut total_payments = Decimal::ZERO;
        let lines: Vec<BookLine> = rows
            .into_iter()
            .map(|r| {
                let (side, amount) = if r.debit_amount > Decimal::ZERO {
                    total_receipts += r.debit_amount;
                    (BookSide::Receipt, r.debit_amount)
                } else {
                    total_payments += r.credit_amount;
                    (BookSide::Payment, r.credit_amount)
                };
                running += r.debit_amount - r.credit_amount;
                BookLine {
                    entry_date: r.entry_date,
                    entry_number: r.entry_number,
                    narration: r.narration,
                    account_code: r.account_code,
                    account_name: r.account_name,
                    side,
                    amount,
                    running_balance: running,
                }
            })
            .collect();

        Ok(CashBankBookReport {
            from_date,
            to_date,
            opening_balance,
            closing_balance: running,
            total_receipts,
            total_payments,
            lines,
        })
    }

    /// Activity per active account through a date (opening included).
    async fn activity_through(
        &self,
        temple_id: Uuid,
        through: NaiveDate,
    ) -> AccountingResult<Vec<AccountActivity>> {
        let rows = sqlx::query_as::<_, AccountActivity>(
            r#"
            SELECT a.id, a.code, a.name, a.account_type, a.account_subtype,
                   a.opening_balance_debit, a.opening_balance_credit,
                   COALESCE(t.total_debit, 0) AS total_debit,
                   COALESCE(t.total_credit, 0) AS total_credit
            FROM accounts a
            LEFT JOIN (
                SELECT jl.account_id,
                       SUM(jl.debit_amount) AS total_debit,
                       SUM(jl.credit_amount) AS total_credit
                FROM journal_lines jl
                JOIN journal_entries je ON je.id = jl.journal_entry_id
                WHERE je.temple_id = $1 AND je.status = 'posted' AND je.entry_date <= $2
                GROUP BY jl.account_id
            ) t ON t.account_id = a.id
            WHERE a.temple_id = $1 AND a.is_active = true
            ORDER BY a.code
            "#,
        )
        .bind(temple_id)
        .bind(through)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Activity per active account within a period (opening excluded).
    async fn activity_between(
        &self,
        temple_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AccountingResult<Vec<AccountActivity>> {
        let rows = sqlx::query_as::<_, AccountActivity>(
            r#"
            SELECT a.id, a.code, a.name, a.account_type, a.account_subtype,
                   a.opening_balance_debit, a.opening_balance_credit,
                   COALESCE(t.total_debit, 0) AS total_debit,
                   COALESCE(t.total_credit, 0) AS total_credit
            FROM accounts a
            LEFT JOIN (
                SELECT jl.account_id,
                       SUM(jl.debit_amount) AS total_debit,
                       SUM(jl.credit_amount) AS total_credit
                FROM journal_lines jl
                JOIN journal_entries je ON je.id = jl.journal_entry_id
                WHERE je.temple_id = $1 AND je.status = 'posted'
                  AND je.entry_date BETWEEN $2 AND $3
                GROUP BY jl.account_id
            ) t ON t.account_id = a.id
            WHERE a.temple_id = $1 AND a.is_active = true
            ORDER BY a.code
            "#,
        )
        .bind(temple_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(
        code: &str,
        name: &str,
        account_type: &str,
        subtype: Option<&str>,
        debit: i64,
        credit: i64,
    ) -> AccountActivity {
        AccountActivity {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            account_type: account_type.to_string(),
            account_subtype: subtype.map(|s| s.to_string()),
            opening_balance_debit: Decimal::ZERO,
            opening_balance_credit: Decimal::ZERO,
            total_debit: Decimal::new(debit, 2),
            total_credit: Decimal::new(credit, 2),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trial_balance_cash_donation_example() {
        // 500 cash donation: debit 1101, credit 4101
        let rows = vec![
            activity("1101", "Cash in Hand", "asset", Some("cash"), 50000, 0),
            activity("4101", "General Donation Income", "income", None, 0, 50000),
        ];
        let tb = build_trial_balance(date(2026, 4, 1), &rows);

        assert_eq!(tb.rows.len(), 2);
        assert_eq!(tb.rows[0].code, "1101");
        assert_eq!(tb.rows[0].debit_balance, Decimal::new(50000, 2));
        assert_eq!(tb.rows[1].code, "4101");
        assert_eq!(tb.rows[1].credit_balance, Decimal::new(50000, 2));
        assert_eq!(tb.total_debits, tb.total_credits);
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_trial_balance_excludes_zero_accounts() {
        let rows = vec![
            activity("1101", "Cash in Hand", "asset", Some("cash"), 10000, 10000),
            activity("4101", "Donations", "income", None, 0, 0),
        ];
        let tb = build_trial_balance(date(2026, 4, 1), &rows);
        assert!(tb.rows.is_empty());
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_trial_balance_includes_opening_balances() {
        let mut cash = activity("1101", "Cash in Hand", "asset", Some("cash"), 0, 0);
        cash.opening_balance_debit = Decimal::new(25000, 2);
        let mut corpus = activity("3101", "Corpus Fund", "equity", Some("corpus"), 0, 0);
        corpus.opening_balance_credit = Decimal::new(25000, 2);

        let tb = build_trial_balance(date(2026, 4, 1), &[cash, corpus]);
        assert_eq!(tb.total_debits, Decimal::new(25000, 2));
        assert_eq!(tb.total_credits, Decimal::new(25000, 2));
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_income_group_ranges() {
        assert_eq!(income_group_name("4101"), "Donation Income");
        assert_eq!(income_group_name("4199"), "Donation Income");
        assert_eq!(income_group_name("4201"), "Seva Income");
        assert_eq!(income_group_name("4301"), "Sponsorship Income");
        assert_eq!(income_group_name("4901"), "Other Income");
    }

    #[test]
    fn test_expense_group_ranges() {
        assert_eq!(expense_group_name("5101"), "Salaries & Wages");
        assert_eq!(expense_group_name("5201"), "Materials Consumed");
        assert_eq!(expense_group_name("5301"), "Vendor & Services");
        assert_eq!(expense_group_name("5901"), "Other Expenses");
    }

    #[test]
    fn test_profit_loss_grouping_and_net() {
        let rows = vec![
            activity("4101", "General Donations", "income", None, 0, 100000),
            activity("4103", "Annadanam", "income", None, 0, 50000),
            activity("4201", "Seva Income", "income", None, 0, 30000),
            activity("5101", "Salaries", "expense", None, 60000, 0),
            // asset movement must not appear in P&L
            activity("1101", "Cash in Hand", "asset", Some("cash"), 120000, 0),
        ];
        let pl = build_profit_loss(date(2026, 4, 1), date(2026, 4, 30), &rows);

        assert_eq!(pl.total_income, Decimal::new(180000, 2));
        assert_eq!(pl.total_expense, Decimal::new(60000, 2));
        assert_eq!(pl.net_surplus, Decimal::new(120000, 2));

        let donation_group = pl
            .income_groups
            .iter()
            .find(|g| g.group_name == "Donation Income")
            .unwrap();
        assert_eq!(donation_group.accounts.len(), 2);
        assert_eq!(donation_group.total, Decimal::new(150000, 2));
    }

    #[test]
    fn test_fixed_asset_classification() {
        assert!(is_fixed_asset("Temple Land", None));
        assert!(is_fixed_asset("Main Building", None));
        assert!(is_fixed_asset("Kitchen Equipment", None));
        assert!(is_fixed_asset("Anything", Some("fixed_asset")));
        assert!(is_fixed_asset("Gopuram Works", Some("cwip")));
        assert!(!is_fixed_asset("Cash in Hand", Some("cash")));
        assert!(!is_fixed_asset("Sponsorship Receivable", Some("receivable")));
    }

    #[test]
    fn test_fund_section_classification() {
        assert_eq!(fund_section("Corpus Fund"), FundSection::Corpus);
        assert_eq!(fund_section("Annadanam Fund"), FundSection::DesignatedFund);
        assert_eq!(fund_section("Vendor Payables"), FundSection::CurrentLiability);
    }

    #[test]
    fn test_balance_sheet_balances() {
        // Cash 800 = corpus 500 + surplus 300 (donations 400 - salaries 100)
        let rows = vec![
            activity("1101", "Cash in Hand", "asset", Some("cash"), 80000, 0),
            activity("3101", "Corpus Fund", "equity", Some("corpus"), 0, 50000),
            activity("4101", "Donations", "income", None, 0, 40000),
            activity("5101", "Salaries", "expense", None, 10000, 0),
        ];
        let bs = build_balance_sheet(date(2026, 4, 30), &rows);

        assert_eq!(bs.total_assets, Decimal::new(80000, 2));
        assert_eq!(bs.corpus_funds.total, Decimal::new(50000, 2));
        assert_eq!(bs.accumulated_surplus, Decimal::new(30000, 2));
        assert_eq!(bs.total_liabilities_and_funds, Decimal::new(80000, 2));
        assert!(bs.is_balanced);
    }

    #[test]
    fn test_balance_sheet_fixed_vs_current_split() {
        let rows = vec![
            activity("1501", "Temple Building", "asset", Some("fixed_asset"), 500000, 0),
            activity("1101", "Cash in Hand", "asset", Some("cash"), 20000, 0),
            activity("3101", "Corpus Fund", "equity", Some("corpus"), 0, 520000),
        ];
        let bs = build_balance_sheet(date(2026, 4, 30), &rows);

        assert_eq!(bs.fixed_assets.rows.len(), 1);
        assert_eq!(bs.current_assets.rows.len(), 1);
        assert_eq!(bs.fixed_assets.total, Decimal::new(500000, 2));
        assert_eq!(bs.current_assets.total, Decimal::new(20000, 2));
        assert!(bs.is_balanced);
    }
}
