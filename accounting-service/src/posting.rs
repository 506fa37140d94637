//! Domain posting adapters.
//!
//! Each adapter translates one business document (donation, seva booking,
//! purchase, payroll row, ...) into a two-line posted journal entry. The
//! debit and credit accounts resolve through the same priority chain:
//! entity-linked account, then category/payment-mode code, then the
//! fallback code from [`default_codes`].
//!
//! Posting is best-effort by design: any failure is logged at warn level and
//! the adapter returns `None`, so the caller's domain transaction is never
//! blocked by a missing ledger account. The domain row then simply has no
//! `journal_entry_id` and reconciliation becomes a reporting concern.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::journal::JournalService;
use crate::models::{Account, CreateJournalEntry, JournalEntryWithLines, LineInput};

/// Fallback ledger account codes used when no entity-linked account exists.
pub mod default_codes {
    pub const CASH_IN_HAND: &str = "1101";
    pub const BANK: &str = "1102";
    pub const HUNDI_CASH: &str = "1103";
    pub const INVENTORY_STOCK: &str = "1201";
    pub const SPONSORSHIP_RECEIVABLE: &str = "1301";
    pub const FIXED_ASSETS: &str = "1501";
    pub const CWIP: &str = "1601";
    pub const SALARY_PAYABLE: &str = "2102";
    pub const CORPUS_FUND: &str = "3101";
    pub const DONATION_INCOME: &str = "4101";
    pub const HUNDI_INCOME: &str = "4102";
    pub const ANNADANAM_INCOME: &str = "4103";
    pub const CONSTRUCTION_INCOME: &str = "4104";
    pub const SEVA_INCOME: &str = "4201";
    pub const SPONSORSHIP_INCOME: &str = "4301";
    pub const SALARY_EXPENSE: &str = "5101";
    pub const CONSUMPTION_EXPENSE: &str = "5201";
    pub const VENDOR_EXPENSE: &str = "5301";
    pub const DISPOSAL_LOSS: &str = "5901";
}

/// Ledger account code for a payment mode.
pub fn payment_mode_account_code(payment_mode: &str) -> &'static str {
    match payment_mode.to_lowercase().as_str() {
        "cash" => default_codes::CASH_IN_HAND,
        // bank, upi, cheque, card and anything else settle through the bank
        _ => default_codes::BANK,
    }
}

/// Credit-side account code for a donation category.
///
/// Corpus donations credit the Corpus Fund rather than income.
pub fn donation_category_account_code(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "annadanam" => default_codes::ANNADANAM_INCOME,
        "construction" => default_codes::CONSTRUCTION_INCOME,
        "corpus" => default_codes::CORPUS_FUND,
        _ => default_codes::DONATION_INCOME,
    }
}

/// Parameters for posting a donation
#[derive(Debug, Clone)]
pub struct DonationPosting {
    pub donation_id: Uuid,
    pub receipt_number: String,
    pub donation_date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub payment_mode: String,
}

/// Parameters for posting a seva booking
#[derive(Debug, Clone)]
pub struct SevaPosting {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub seva_name: String,
    pub booking_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
    /// Seva-linked income account, preferred over the fallback code
    pub income_account_id: Option<Uuid>,
}

/// Parameters for posting inventory movements
#[derive(Debug, Clone)]
pub struct InventoryPosting {
    pub movement_id: Uuid,
    pub document_number: String,
    pub movement_date: NaiveDate,
    pub amount: Decimal,
    pub item_name: String,
    /// Purchase side only
    pub payment_mode: Option<String>,
}

/// Parameters for posting an asset transaction
#[derive(Debug, Clone)]
pub struct AssetPosting {
    pub asset_id: Uuid,
    pub asset_number: String,
    pub asset_name: String,
    pub transaction_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: String,
}

/// Posting service wrapping the journal engine
#[derive(Clone)]
pub struct PostingService {
    pool: PgPool,
    journal: JournalService,
}

impl PostingService {
    pub fn new(pool: PgPool) -> Self {
        let journal = JournalService::new(pool.clone());
        Self { pool, journal }
    }

    // ------------------------------------------------------------------
    // Adapters. All best-effort: log and return None on failure.
    // ------------------------------------------------------------------

    pub async fn post_donation(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &DonationPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("donation", &posting.receipt_number, async {
            let debit = self
                .resolve_account(temple_id, None, payment_mode_account_code(&posting.payment_mode))
                .await?;
            let credit = self
                .resolve_account(
                    temple_id,
                    None,
                    donation_category_account_code(&posting.category),
                )
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.donation_date,
                format!("Donation receipt {}", posting.receipt_number),
                "donation",
                posting.donation_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    pub async fn post_hundi_collection(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        collection_id: Uuid,
        collection_number: &str,
        opened_date: NaiveDate,
        amount: Decimal,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("hundi_collection", collection_number, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::CASH_IN_HAND)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::HUNDI_INCOME)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                opened_date,
                format!("Hundi opening {}", collection_number),
                "hundi_collection",
                collection_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    pub async fn post_seva_booking(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &SevaPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("seva_booking", &posting.booking_number, async {
            let debit = self
                .resolve_account(temple_id, None, payment_mode_account_code(&posting.payment_mode))
                .await?;
            let credit = self
                .resolve_account(temple_id, posting.income_account_id, default_codes::SEVA_INCOME)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.booking_date,
                format!("Seva booking {} ({})", posting.booking_number, posting.seva_name),
                "seva_booking",
                posting.booking_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    pub async fn post_sponsorship_commitment(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        sponsorship_id: Uuid,
        sponsorship_number: &str,
        commitment_date: NaiveDate,
        amount: Decimal,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("sponsorship", sponsorship_number, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::SPONSORSHIP_RECEIVABLE)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::SPONSORSHIP_INCOME)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                commitment_date,
                format!("Sponsorship commitment {}", sponsorship_number),
                "sponsorship",
                sponsorship_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    pub async fn post_sponsorship_payment(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        sponsorship_id: Uuid,
        sponsorship_number: &str,
        payment_date: NaiveDate,
        amount: Decimal,
        payment_mode: &str,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("sponsorship_payment", sponsorship_number, async {
            let debit = self
                .resolve_account(temple_id, None, payment_mode_account_code(payment_mode))
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::SPONSORSHIP_RECEIVABLE)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                payment_date,
                format!("Sponsorship payment against {}", sponsorship_number),
                "sponsorship_payment",
                sponsorship_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    pub async fn post_inventory_purchase(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &InventoryPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("inventory_purchase", &posting.document_number, async {
            let mode = posting.payment_mode.as_deref().unwrap_or("cash");
            let debit = self
                .resolve_account(temple_id, None, default_codes::INVENTORY_STOCK)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, payment_mode_account_code(mode))
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.movement_date,
                format!("Purchase {} ({})", posting.document_number, posting.item_name),
                "purchase",
                posting.movement_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    pub async fn post_inventory_issue(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &InventoryPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("inventory_issue", &posting.document_number, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::CONSUMPTION_EXPENSE)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::INVENTORY_STOCK)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.movement_date,
                format!("Stock issue {} ({})", posting.document_number, posting.item_name),
                "issue",
                posting.movement_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    /// Salary accrual for a payroll run: expense against salary payable.
    pub async fn post_salary_accrual(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        payroll_run_id: Uuid,
        period: &str,
        run_date: NaiveDate,
        net_total: Decimal,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("payroll", period, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::SALARY_EXPENSE)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::SALARY_PAYABLE)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                run_date,
                format!("Salary accrual for {}", period),
                "payroll",
                payroll_run_id,
                &debit,
                &credit,
                net_total,
            )
            .await
        })
        .await
    }

    /// Salary disbursement: clears the payable through cash/bank.
    pub async fn post_salary_payment(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        payroll_run_id: Uuid,
        period: &str,
        payment_date: NaiveDate,
        net_total: Decimal,
        payment_mode: &str,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("payroll_payment", period, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::SALARY_PAYABLE)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, payment_mode_account_code(payment_mode))
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                payment_date,
                format!("Salary payment for {}", period),
                "payroll_payment",
                payroll_run_id,
                &debit,
                &credit,
                net_total,
            )
            .await
        })
        .await
    }

    pub async fn post_asset_purchase(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &AssetPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("asset", &posting.asset_number, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::FIXED_ASSETS)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, payment_mode_account_code(&posting.payment_mode))
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.transaction_date,
                format!("Asset purchase {} ({})", posting.asset_number, posting.asset_name),
                "asset",
                posting.asset_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    /// Construction spend accumulates on the CWIP account until the project
    /// is capitalized.
    pub async fn post_cwip_expenditure(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        project_id: Uuid,
        project_name: &str,
        expense_date: NaiveDate,
        amount: Decimal,
        payment_mode: &str,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("cwip_expenditure", project_name, async {
            let debit = self.resolve_account(temple_id, None, default_codes::CWIP).await?;
            let credit = self
                .resolve_account(temple_id, None, payment_mode_account_code(payment_mode))
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                expense_date,
                format!("CWIP expenditure on {}", project_name),
                "cwip_expenditure",
                project_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    /// Capitalization moves accumulated CWIP cost into fixed assets.
    pub async fn post_cwip_capitalization(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        project_id: Uuid,
        project_name: &str,
        capitalization_date: NaiveDate,
        amount: Decimal,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("cwip_capitalization", project_name, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::FIXED_ASSETS)
                .await?;
            let credit = self.resolve_account(temple_id, None, default_codes::CWIP).await?;
            self.post_two_line(
                temple_id,
                user_id,
                capitalization_date,
                format!("Capitalization of {}", project_name),
                "cwip_capitalization",
                project_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    /// Disposal proceeds received against the asset account at book value.
    /// Two-line entries only; any gain/loss is adjusted manually through
    /// accounts 4901/5901.
    pub async fn post_asset_disposal(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &AssetPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("asset_disposal", &posting.asset_number, async {
            let debit = self
                .resolve_account(temple_id, None, payment_mode_account_code(&posting.payment_mode))
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::FIXED_ASSETS)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.transaction_date,
                format!("Disposal of asset {} ({})", posting.asset_number, posting.asset_name),
                "asset_disposal",
                posting.asset_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    /// Write-off for a disposal with no proceeds: the book value moves to
    /// the disposal-loss account.
    pub async fn post_asset_writeoff(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        posting: &AssetPosting,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("asset_writeoff", &posting.asset_number, async {
            let debit = self
                .resolve_account(temple_id, None, default_codes::DISPOSAL_LOSS)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, default_codes::FIXED_ASSETS)
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                posting.transaction_date,
                format!("Write-off of asset {} ({})", posting.asset_number, posting.asset_name),
                "asset_disposal",
                posting.asset_id,
                &debit,
                &credit,
                posting.amount,
            )
            .await
        })
        .await
    }

    pub async fn post_vendor_payment(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        reference_id: Uuid,
        vendor_name: &str,
        payment_date: NaiveDate,
        amount: Decimal,
        payment_mode: &str,
        expense_account_id: Option<Uuid>,
    ) -> Option<JournalEntryWithLines> {
        self.best_effort("vendor_payment", vendor_name, async {
            let debit = self
                .resolve_account(temple_id, expense_account_id, default_codes::VENDOR_EXPENSE)
                .await?;
            let credit = self
                .resolve_account(temple_id, None, payment_mode_account_code(payment_mode))
                .await?;
            self.post_two_line(
                temple_id,
                user_id,
                payment_date,
                format!("Payment to {}", vendor_name),
                "vendor_payment",
                reference_id,
                &debit,
                &credit,
                amount,
            )
            .await
        })
        .await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn best_effort<F>(
        &self,
        kind: &str,
        document: &str,
        fut: F,
    ) -> Option<JournalEntryWithLines>
    where
        F: std::future::Future<Output = AccountingResult<JournalEntryWithLines>>,
    {
        match fut.await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    kind = kind,
                    document = document,
                    error = %e,
                    "Accounting posting failed, domain record left without ledger entry"
                );
                None
            }
        }
    }

    /// Resolve through the priority chain: entity-linked account id first,
    /// then the fallback code.
    async fn resolve_account(
        &self,
        temple_id: Uuid,
        preferred: Option<Uuid>,
        fallback_code: &str,
    ) -> AccountingResult<Account> {
        if let Some(id) = preferred {
            let linked = sqlx::query_as::<_, Account>(
                "SELECT * FROM accounts WHERE id = $1 AND temple_id = $2 AND is_active = true",
            )
            .bind(id)
            .bind(temple_id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(account) = linked {
                return Ok(account);
            }
        }

        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE temple_id = $1 AND code = $2",
        )
        .bind(temple_id)
        .bind(fallback_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AccountingError::not_found(format!("Account {}", fallback_code)))?;

        if !account.is_active {
            return Err(AccountingError::InactiveAccount {
                code: account.code,
            });
        }
        Ok(account)
    }

    #[allow(clippy::too_many_arguments)]
    async fn post_two_line(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        entry_date: NaiveDate,
        narration: String,
        reference_type: &str,
        reference_id: Uuid,
        debit: &Account,
        credit: &Account,
        amount: Decimal,
    ) -> AccountingResult<JournalEntryWithLines> {
        if amount <= Decimal::ZERO {
            return Err(AccountingError::validation(format!(
                "Posting amount must be positive, got {}",
                amount
            )));
        }

        self.journal
            .create_entry(
                temple_id,
                user_id,
                CreateJournalEntry {
                    entry_date,
                    narration: narration.clone(),
                    reference_type: Some(reference_type.to_string()),
                    reference_id: Some(reference_id),
                    lines: vec![
                        LineInput::debit(debit.id, amount, narration.clone()),
                        LineInput::credit(credit.id, amount, narration),
                    ],
                    post_immediately: true,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_mode_resolution() {
        assert_eq!(payment_mode_account_code("cash"), "1101");
        assert_eq!(payment_mode_account_code("CASH"), "1101");
        assert_eq!(payment_mode_account_code("bank"), "1102");
        assert_eq!(payment_mode_account_code("upi"), "1102");
        assert_eq!(payment_mode_account_code("cheque"), "1102");
        assert_eq!(payment_mode_account_code("card"), "1102");
    }

    #[test]
    fn test_donation_category_resolution() {
        assert_eq!(donation_category_account_code("general"), "4101");
        assert_eq!(donation_category_account_code("annadanam"), "4103");
        assert_eq!(donation_category_account_code("construction"), "4104");
        assert_eq!(donation_category_account_code("corpus"), "3101");
        assert_eq!(donation_category_account_code("other"), "4101");
    }

    #[test]
    fn test_fallback_codes_exist_in_default_chart() {
        use crate::chart::DEFAULT_CHART;
        let codes: Vec<&str> = DEFAULT_CHART.iter().map(|(c, _, _, _)| *c).collect();
        for code in [
            default_codes::CASH_IN_HAND,
            default_codes::BANK,
            default_codes::HUNDI_CASH,
            default_codes::INVENTORY_STOCK,
            default_codes::SPONSORSHIP_RECEIVABLE,
            default_codes::FIXED_ASSETS,
            default_codes::CWIP,
            default_codes::SALARY_PAYABLE,
            default_codes::CORPUS_FUND,
            default_codes::DONATION_INCOME,
            default_codes::HUNDI_INCOME,
            default_codes::ANNADANAM_INCOME,
            default_codes::CONSTRUCTION_INCOME,
            default_codes::SEVA_INCOME,
            default_codes::SPONSORSHIP_INCOME,
            default_codes::SALARY_EXPENSE,
            default_codes::CONSUMPTION_EXPENSE,
            default_codes::VENDOR_EXPENSE,
            default_codes::DISPOSAL_LOSS,
        ] {
            assert!(codes.contains(&code), "code {} missing from default chart", code);
        }
    }
}
