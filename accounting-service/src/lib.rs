//! Accounting service for Mandir ERP
//!
//! Provides the double-entry general ledger behind every money-touching
//! module of the platform:
//!
//! - Chart of Accounts management (5-level tree, per-temple account codes)
//! - Journal Engine: balanced debit/credit entries with a
//!   draft → posted → cancelled lifecycle and reversing entries
//! - Domain posting adapters (donations, sevas, sponsorships, inventory,
//!   payroll, assets) that translate business documents into two-line
//!   journal entries, best-effort
//! - Financial reports: trial balance, account ledger, profit & loss,
//!   balance sheet, day/cash/bank book

pub mod chart;
pub mod error;
pub mod journal;
pub mod models;
pub mod posting;
pub mod reports;
pub mod sequence;
pub mod validation;

pub use chart::*;
pub use error::*;
pub use journal::*;
pub use models::*;
pub use posting::*;
pub use reports::*;
pub use sequence::*;
pub use validation::*;
