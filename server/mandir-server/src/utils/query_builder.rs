//! Query builder utilities for consistent SQL query construction
//!
//! Wraps `sqlx::QueryBuilder` with the filter patterns every list endpoint
//! shares: tenant scope, optional equality filters, date ranges, search and
//! pagination.

use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::types::PaginationParams;

/// Paginated query builder for list endpoints
///
/// Example:
/// ```rust,ignore
/// let mut query = PaginatedQuery::new("SELECT * FROM donations WHERE 1=1");
/// query
///     .filter_temple(auth.temple_id)
///     .filter_eq("payment_mode", params.payment_mode.as_deref())
///     .filter_date_range("donation_date", params.from_date, params.to_date)
///     .order_by("donation_date", "DESC")
///     .paginate(&params.pagination);
/// let rows: Vec<Donation> = query.build().fetch_all(&server.db_pool).await?;
/// ```
pub struct PaginatedQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
}

impl<'a> PaginatedQuery<'a> {
    /// Create a new builder. The base query must already carry a WHERE
    /// clause (`WHERE 1=1` works) so filters can append `AND ...`.
    pub fn new(base_query: &str) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
        }
    }

    /// Filter by temple_id (tenant scope, always first)
    pub fn filter_temple(&mut self, temple_id: Uuid) -> &mut Self {
        self.query.push(" AND temple_id = ");
        self.query.push_bind(temple_id);
        self
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {} = ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Filter for active records
    pub fn filter_active(&mut self) -> &mut Self {
        self.query.push(" AND is_active = true");
        self
    }

    /// Add an inclusive date-range filter on a DATE column
    pub fn filter_date_range(
        &mut self,
        column: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> &mut Self {
        if let Some(from) = from {
            self.query.push(format!(" AND {} >= ", column));
            self.query.push_bind(from);
        }
        if let Some(to) = to {
            self.query.push(format!(" AND {} <= ", column));
            self.query.push_bind(to);
        }
        self
    }

    /// Case-insensitive substring search over one or more columns
    pub fn search_ilike(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        if let Some(term) = term {
            let trimmed = term.trim();
            if !trimmed.is_empty() {
                let pattern = format!("%{}%", trimmed);
                self.query.push(" AND (");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        self.query.push(" OR ");
                    }
                    self.query.push(format!("{} ILIKE ", column));
                    self.query.push_bind(pattern.clone());
                }
                self.query.push(")");
            }
        }
        self
    }

    /// Append a raw SQL fragment (code literal, never user input)
    pub fn push_raw(&mut self, fragment: &str) -> &mut Self {
        self.query.push(fragment);
        self
    }

    /// Add ORDER BY clause. Column and direction are code literals.
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.query.push(format!(" ORDER BY {} {}", column, direction));
        self
    }

    /// Apply LIMIT/OFFSET from pagination params
    pub fn paginate(&mut self, params: &PaginationParams) -> &mut Self {
        self.query.push(" LIMIT ");
        self.query.push_bind(params.limit());
        self.query.push(" OFFSET ");
        self.query.push_bind(params.offset());
        self
    }

    /// Build the final query
    pub fn build<T>(&mut self) -> sqlx::query::QueryAs<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_as()
    }

    /// Build a scalar query (e.g. COUNT(*))
    pub fn build_scalar<T>(
        &mut self,
    ) -> sqlx::query::QueryScalar<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_scalar()
    }

    /// Current SQL text (for assertions in tests)
    pub fn sql(&self) -> &str {
        self.query.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_append_in_order() {
        let mut query = PaginatedQuery::new("SELECT * FROM donations WHERE 1=1");
        query
            .filter_temple(Uuid::new_v4())
            .filter_eq("payment_mode", Some("cash"))
            .filter_date_range(
                "donation_date",
                NaiveDate::from_ymd_opt(2026, 4, 1),
                NaiveDate::from_ymd_opt(2026, 4, 30),
            )
            .order_by("donation_date", "DESC")
            .paginate(&PaginationParams::default());

        let sql = query.sql();
        assert!(sql.contains("temple_id ="));
        assert!(sql.contains("payment_mode ="));
        assert!(sql.contains("donation_date >="));
        assert!(sql.contains("donation_date <="));
        assert!(sql.contains("ORDER BY donation_date DESC"));
        assert!(sql.contains("LIMIT"));
    }

    #[test]
    fn test_none_filters_are_skipped() {
        let mut query = PaginatedQuery::new("SELECT * FROM devotees WHERE 1=1");
        query
            .filter_eq("phone", None::<String>)
            .filter_date_range("created_at", None, None)
            .search_ilike(&["name", "phone"], None);
        assert_eq!(query.sql(), "SELECT * FROM devotees WHERE 1=1");
    }

    #[test]
    fn test_search_covers_all_columns() {
        let mut query = PaginatedQuery::new("SELECT * FROM devotees WHERE 1=1");
        query.search_ilike(&["name", "phone"], Some("ram"));
        let sql = query.sql();
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("phone ILIKE"));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn test_blank_search_is_skipped() {
        let mut query = PaginatedQuery::new("SELECT * FROM devotees WHERE 1=1");
        query.search_ilike(&["name"], Some("   "));
        assert_eq!(query.sql(), "SELECT * FROM devotees WHERE 1=1");
    }
}
