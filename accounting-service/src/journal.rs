//! Journal Engine: create, post and cancel balanced journal entries.
//!
//! Lifecycle: `draft → posted → cancelled`. No other transitions are
//! permitted. Cancellation never deletes: it creates a posted reversing
//! entry with debit and credit swapped per line, preserving the audit trail.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::models::{
    CreateJournalEntry, JournalEntry, JournalEntryWithLines, JournalLine, JournalStatus, LineInput,
};
use crate::sequence::{is_unique_violation, next_document_number};
use crate::validation::{validate_accounts, validate_lines};

/// Filters for listing journal entries
#[derive(Debug, Default, Clone)]
pub struct JournalEntryFilter {
    pub status: Option<JournalStatus>,
    pub reference_type: Option<String>,
    pub from_date: Option<chrono::NaiveDate>,
    pub to_date: Option<chrono::NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

/// Swap debit and credit on each line, producing inputs for a reversing entry.
pub fn reversed_lines(lines: &[JournalLine]) -> Vec<LineInput> {
    lines
        .iter()
        .map(|line| LineInput {
            account_id: line.account_id,
            debit_amount: line.credit_amount,
            credit_amount: line.debit_amount,
            description: Some(format!(
                "Reversal: {}",
                line.description.clone().unwrap_or_default()
            )),
        })
        .collect()
}

/// Journal entry service
#[derive(Clone)]
pub struct JournalService {
    pool: PgPool,
}

impl JournalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a journal entry, as draft or directly posted.
    ///
    /// # Errors
    ///
    /// Validation errors for unbalanced or malformed lines, missing or
    /// inactive accounts; database errors otherwise.
    pub async fn create_entry(
        &self,
        temple_id: Uuid,
        user_id: Uuid,
        input: CreateJournalEntry,
    ) -> AccountingResult<JournalEntryWithLines> {
        validate_lines(&input.lines)?;
        validate_accounts(&self.pool, temple_id, &input.lines).await?;

        let total_amount: Decimal = input.lines.iter().map(|l| l.debit_amount).sum();
        let status = if input.post_immediately {
            JournalStatus::Posted
        } else {
            JournalStatus::Draft
        };

        // Two attempts, each in a fresh transaction: a concurrent writer can
        // take the same number, in which case the unique constraint aborts
        // the first transaction and the number is regenerated once.
        for attempt in 0..2 {
            let mut tx = self.pool.begin().await.map_err(AccountingError::Database)?;
            let entry_number =
                next_document_number(&mut *tx, temple_id, "journal_entries", "entry_number", "JE")
                    .await?;

            let now = Utc::now();
            let result = sqlx::query_as::<_, JournalEntry>(
                r#"
                INSERT INTO journal_entries (
                    id, temple_id, entry_number, entry_date, narration,
                    reference_type, reference_id, total_amount, status, reversal_of,
                    created_by, created_at, posted_by, posted_at,
                    cancelled_by, cancelled_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10, $11, $12, $13, NULL, NULL
                ) RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(temple_id)
            .bind(&entry_number)
            .bind(input.entry_date)
            .bind(&input.narration)
            .bind(&input.reference_type)
            .bind(input.reference_id)
            .bind(total_amount)
            .bind(status.as_str())
            .bind(user_id)
            .bind(now)
            .bind(input.post_immediately.then_some(user_id))
            .bind(input.post_immediately.then_some(now))
            .fetch_one(&mut *tx)
            .await;

            let entry = match result {
                Ok(row) => row,
                Err(e) if attempt == 0 && is_unique_violation(&e) => {
                    drop(tx);
                    continue;
                }
                Err(e) => return Err(AccountingError::Database(e)),
            };

            let lines = insert_lines(&mut tx, entry.id, &input.lines).await?;

            tx.commit().await.map_err(AccountingError::Database)?;

            info!(
                entry_number = %entry.entry_number,
                status = %entry.status,
                total = %entry.total_amount,
                "Journal entry created"
            );

            return Ok(JournalEntryWithLines { entry, lines });
        }

        Err(AccountingError::validation(
            "Could not allocate a journal entry number",
        ))
    }

    /// Fetch a journal entry with its lines.
    pub async fn get_entry(
        &self,
        temple_id: Uuid,
        entry_id: Uuid,
    ) -> AccountingResult<JournalEntryWithLines> {
        let entry = self.fetch_entry(temple_id, entry_id).await?;
        let lines = self.fetch_lines(entry_id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// List journal entries with optional filters, newest first.
    pub async fn list_entries(
        &self,
        temple_id: Uuid,
        filter: JournalEntryFilter,
    ) -> AccountingResult<Vec<JournalEntry>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "SELECT * FROM journal_entries WHERE temple_id = ",
        );
        builder.push_bind(temple_id);
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(reference_type) = &filter.reference_type {
            builder
                .push(" AND reference_type = ")
                .push_bind(reference_type.clone());
        }
        if let Some(from) = filter.from_date {
            builder.push(" AND entry_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to_date {
            builder.push(" AND entry_date <= ").push_bind(to);
        }
        builder.push(" ORDER BY entry_date DESC, entry_number DESC LIMIT ");
        builder.push_bind(if filter.limit > 0 { filter.limit } else { 50 });
        builder.push(" OFFSET ").push_bind(filter.offset.max(0));

        let entries = builder
            .build_query_as::<JournalEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Post a draft entry. Draft is the only status this accepts.
    pub async fn post_entry(
        &self,
        temple_id: Uuid,
        entry_id: Uuid,
        user_id: Uuid,
    ) -> AccountingResult<JournalEntryWithLines> {
        let entry = self.fetch_entry(temple_id, entry_id).await?;
        if entry.status() != Some(JournalStatus::Draft) {
            return Err(AccountingError::InvalidStatus(format!(
                "Only draft entries can be posted, {} is {}",
                entry.entry_number, entry.status
            )));
        }

        let lines = self.fetch_lines(entry_id).await?;
        let line_inputs: Vec<LineInput> = lines
            .iter()
            .map(|l| LineInput {
                account_id: l.account_id,
                debit_amount: l.debit_amount,
                credit_amount: l.credit_amount,
                description: l.description.clone(),
            })
            .collect();
        validate_lines(&line_inputs)?;
        validate_accounts(&self.pool, temple_id, &line_inputs).await?;

        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE journal_entries
            SET status = 'posted', posted_by = $1, posted_at = $2
            WHERE id = $3 AND temple_id = $4
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(entry_id)
        .bind(temple_id)
        .fetch_one(&self.pool)
        .await?;

        info!(entry_number = %entry.entry_number, "Journal entry posted");
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Cancel a posted entry by creating a posted reversing entry.
    ///
    /// Returns the cancelled original and the reversal. The caller is
    /// responsible for the admin-role check.
    pub async fn cancel_entry(
        &self,
        temple_id: Uuid,
        entry_id: Uuid,
        user_id: Uuid,
        reason: &str,
    ) -> AccountingResult<(JournalEntry, JournalEntryWithLines)> {
        let original = self.fetch_entry(temple_id, entry_id).await?;
        if original.status() != Some(JournalStatus::Posted) {
            return Err(AccountingError::InvalidStatus(format!(
                "Only posted entries can be cancelled, {} is {}",
                original.entry_number, original.status
            )));
        }

        let original_lines = self.fetch_lines(entry_id).await?;
        let reversal_inputs = reversed_lines(&original_lines);

        // Same retry shape as create_entry: each attempt is a fresh
        // transaction covering both the status flip and the reversing entry.
        for attempt in 0..2 {
            let mut tx = self.pool.begin().await.map_err(AccountingError::Database)?;

            let now = Utc::now();
            let cancelled = sqlx::query_as::<_, JournalEntry>(
                r#"
                UPDATE journal_entries
                SET status = 'cancelled', cancelled_by = $1, cancelled_at = $2
                WHERE id = $3 AND temple_id = $4
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(now)
            .bind(entry_id)
            .bind(temple_id)
            .fetch_one(&mut *tx)
            .await?;

            let entry_number =
                next_document_number(&mut *tx, temple_id, "journal_entries", "entry_number", "JE")
                    .await?;
            let result = sqlx::query_as::<_, JournalEntry>(
                r#"
                INSERT INTO journal_entries (
                    id, temple_id, entry_number, entry_date, narration,
                    reference_type, reference_id, total_amount, status, reversal_of,
                    created_by, created_at, posted_by, posted_at,
                    cancelled_by, cancelled_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, 'posted', $9, $10, $11, $10, $11, NULL, NULL
                ) RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(temple_id)
            .bind(&entry_number)
            .bind(original.entry_date)
            .bind(format!(
                "Reversal of {}: {}",
                original.entry_number, reason
            ))
            .bind(&original.reference_type)
            .bind(original.reference_id)
            .bind(original.total_amount)
            .bind(original.id)
            .bind(user_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await;

            let reversal = match result {
                Ok(row) => row,
                Err(e) if attempt == 0 && is_unique_violation(&e) => {
                    drop(tx);
                    continue;
                }
                Err(e) => return Err(AccountingError::Database(e)),
            };

            let reversal_lines = insert_lines(&mut tx, reversal.id, &reversal_inputs).await?;

            tx.commit().await.map_err(AccountingError::Database)?;

            info!(
                original = %cancelled.entry_number,
                reversal = %reversal.entry_number,
                "Journal entry cancelled with reversal"
            );

            return Ok((
                cancelled,
                JournalEntryWithLines {
                    entry: reversal,
                    lines: reversal_lines,
                },
            ));
        }

        Err(AccountingError::validation(
            "Could not allocate a journal entry number",
        ))
    }

    async fn fetch_entry(&self, temple_id: Uuid, entry_id: Uuid) -> AccountingResult<JournalEntry> {
        sqlx::query_as::<_, JournalEntry>(
            "SELECT * FROM journal_entries WHERE id = $1 AND temple_id = $2",
        )
        .bind(entry_id)
        .bind(temple_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AccountingError::not_found("Journal entry"))
    }

    async fn fetch_lines(&self, entry_id: Uuid) -> AccountingResult<Vec<JournalLine>> {
        let lines = sqlx::query_as::<_, JournalLine>(
            "SELECT * FROM journal_lines WHERE journal_entry_id = $1 ORDER BY line_order",
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }
}

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry_id: Uuid,
    inputs: &[LineInput],
) -> AccountingResult<Vec<JournalLine>> {
    let mut lines = Vec::with_capacity(inputs.len());
    for (order, input) in inputs.iter().enumerate() {
        let line = sqlx::query_as::<_, JournalLine>(
            r#"
            INSERT INTO journal_lines (
                id, journal_entry_id, account_id, debit_amount, credit_amount,
                description, line_order
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(input.account_id)
        .bind(input.debit_amount)
        .bind(input.credit_amount)
        .bind(&input.description)
        .bind(order as i32)
        .fetch_one(&mut **tx)
        .await?;
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(debit: i64, credit: i64, description: &str) -> JournalLine {
        JournalLine {
            id: Uuid::new_v4(),
            journal_entry_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            debit_amount: Decimal::new(debit, 2),
            credit_amount: Decimal::new(credit, 2),
            description: Some(description.to_string()),
            line_order: 0,
        }
    }

    #[test]
    fn test_reversed_lines_swap_sides() {
        let original = vec![line(50000, 0, "Cash received"), line(0, 50000, "Donation")];
        let reversed = reversed_lines(&original);

        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].debit_amount, Decimal::ZERO);
        assert_eq!(reversed[0].credit_amount, Decimal::new(50000, 2));
        assert_eq!(reversed[1].debit_amount, Decimal::new(50000, 2));
        assert_eq!(reversed[1].credit_amount, Decimal::ZERO);
    }

    #[test]
    fn test_reversed_lines_preserve_accounts_and_amounts() {
        let original = vec![line(12345, 0, "a"), line(0, 12345, "b")];
        let reversed = reversed_lines(&original);

        for (orig, rev) in original.iter().zip(&reversed) {
            assert_eq!(orig.account_id, rev.account_id);
            assert_eq!(orig.debit_amount, rev.credit_amount);
            assert_eq!(orig.credit_amount, rev.debit_amount);
            assert!(rev.description.as_ref().unwrap().starts_with("Reversal: "));
        }
    }

    #[test]
    fn test_reversal_nets_to_zero_per_account() {
        let account = Uuid::new_v4();
        let mut original = vec![line(70000, 0, "x"), line(0, 70000, "y")];
        original[0].account_id = account;

        let reversed = reversed_lines(&original);
        let net = original[0].debit_amount - original[0].credit_amount + reversed[0].debit_amount
            - reversed[0].credit_amount;
        assert_eq!(net, Decimal::ZERO);
    }

    #[test]
    fn test_reversal_still_balances() {
        let original = vec![
            line(30000, 0, "a"),
            line(20000, 0, "b"),
            line(0, 50000, "c"),
        ];
        let reversed = reversed_lines(&original);
        assert!(validate_lines(&reversed).is_ok());
    }
}
