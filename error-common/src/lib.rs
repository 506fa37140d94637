//! Common error handling utilities for Mandir ERP
//!
//! This module provides standardized error types, error codes, and utilities
//! used across all Mandir ERP modules. It ensures consistent error handling
//! and secure error reporting for a multi-tenant temple management platform.
//!
//! # Error Categories
//!
//! - **ValidationError**: Input validation and data format errors
//! - **AuthError**: Authentication and session errors
//! - **DatabaseError**: Database connection and query errors
//! - **AccountingError**: Ledger and journal-posting rule violations
//! - **BusinessError**: Domain-specific business rule violations
//! - **InternalError**: Infrastructure and system-level errors

pub mod codes;
pub mod types;

pub use codes::*;
pub use types::*;
