//! Business rule validation for journal entries.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::models::{Account, LineInput};

/// Amounts are considered equal when they differ by less than this.
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Validates the shape of a set of journal lines.
///
/// Rules:
/// - at least two lines
/// - each line carries exactly one of debit/credit, greater than zero
/// - total debits equal total credits within the tolerance
///
/// # Errors
///
/// Returns [`AccountingError::TooFewLines`], [`AccountingError::InvalidLine`]
/// or [`AccountingError::Unbalanced`] on violation.
pub fn validate_lines(lines: &[LineInput]) -> AccountingResult<()> {
    if lines.len() < 2 {
        return Err(AccountingError::TooFewLines);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;

    for line in lines {
        let has_debit = line.debit_amount > Decimal::ZERO;
        let has_credit = line.credit_amount > Decimal::ZERO;
        if has_debit == has_credit || line.debit_amount < Decimal::ZERO || line.credit_amount < Decimal::ZERO {
            return Err(AccountingError::InvalidLine);
        }
        total_debits += line.debit_amount;
        total_credits += line.credit_amount;
    }

    if (total_debits - total_credits).abs() >= balance_tolerance() {
        return Err(AccountingError::Unbalanced {
            debits: total_debits.normalize(),
            credits: total_credits.normalize(),
        });
    }

    Ok(())
}

/// Validates every referenced account: it must exist, belong to the temple
/// and be active. Returns the accounts keyed by id for reuse.
pub async fn validate_accounts(
    pool: &PgPool,
    temple_id: Uuid,
    lines: &[LineInput],
) -> AccountingResult<HashMap<Uuid, Account>> {
    let ids: Vec<Uuid> = lines.iter().map(|l| l.account_id).collect();

    let accounts = sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts WHERE temple_id = $1 AND id = ANY($2)",
    )
    .bind(temple_id)
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let by_id: HashMap<Uuid, Account> = accounts.into_iter().map(|a| (a.id, a)).collect();

    for line in lines {
        match by_id.get(&line.account_id) {
            None => {
                return Err(AccountingError::not_found(format!(
                    "Account {}",
                    line.account_id
                )))
            }
            Some(account) if !account.is_active => {
                return Err(AccountingError::InactiveAccount {
                    code: account.code.clone(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(by_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debit(amount: Decimal) -> LineInput {
        LineInput::debit(Uuid::new_v4(), amount, "debit")
    }

    fn credit(amount: Decimal) -> LineInput {
        LineInput::credit(Uuid::new_v4(), amount, "credit")
    }

    #[test]
    fn test_balanced_lines() {
        let lines = vec![debit(Decimal::new(50000, 2)), credit(Decimal::new(50000, 2))];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_unbalanced_lines_report_both_totals() {
        let lines = vec![debit(Decimal::new(10000, 2)), credit(Decimal::new(9000, 2))];
        let err = validate_lines(&lines).unwrap_err();
        assert_eq!(err.to_string(), "Debits (100) must equal credits (90)");
    }

    #[test]
    fn test_within_tolerance_passes() {
        // 100.005 vs 100.00 differs by less than 0.01
        let lines = vec![
            debit(Decimal::new(100005, 3)),
            credit(Decimal::new(10000, 2)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![debit(Decimal::new(10000, 2))];
        assert!(matches!(
            validate_lines(&lines),
            Err(AccountingError::TooFewLines)
        ));
    }

    #[test]
    fn test_line_with_both_sides_rejected() {
        let mut line = debit(Decimal::new(10000, 2));
        line.credit_amount = Decimal::new(10000, 2);
        let lines = vec![line, credit(Decimal::new(10000, 2))];
        assert!(matches!(
            validate_lines(&lines),
            Err(AccountingError::InvalidLine)
        ));
    }

    #[test]
    fn test_line_with_no_side_rejected() {
        let mut line = debit(Decimal::ZERO);
        line.debit_amount = Decimal::ZERO;
        let lines = vec![line, credit(Decimal::new(10000, 2))];
        assert!(matches!(
            validate_lines(&lines),
            Err(AccountingError::InvalidLine)
        ));
    }

    #[test]
    fn test_multi_line_entry_balances() {
        let lines = vec![
            debit(Decimal::new(30000, 2)),
            debit(Decimal::new(20000, 2)),
            credit(Decimal::new(50000, 2)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }
}
