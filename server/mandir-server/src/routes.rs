use crate::{
    handlers::{
        accounting, assets, auth, bank, devotees, donations, health, hr, inventory, sevas,
        sponsorships,
    },
    openapi,
    server::MandirServer,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Create health check routes
pub fn health_routes() -> Router<MandirServer> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/version", get(health::version_info))
}

/// Create authentication routes
pub fn auth_routes() -> Router<MandirServer> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
}

/// Create devotee CRM routes
pub fn devotee_routes() -> Router<MandirServer> {
    Router::new()
        .route("/devotees", get(devotees::list_devotees))
        .route("/devotees", post(devotees::create_devotee))
        .route("/devotees/import", post(devotees::import_devotees_csv))
        .route("/devotees/export", get(devotees::export_devotees_csv))
        .route("/devotees/:devotee_id", get(devotees::get_devotee))
        .route("/devotees/:devotee_id", put(devotees::update_devotee))
        .route("/devotees/:devotee_id", delete(devotees::deactivate_devotee))
}

/// Create donation routes (receipts + hundi collections)
pub fn donation_routes() -> Router<MandirServer> {
    Router::new()
        .route("/donations", get(donations::list_donations))
        .route("/donations", post(donations::create_donation))
        .route("/donations/import", post(donations::import_donations_csv))
        .route("/donations/export", get(donations::export_donations_csv))
        .route("/donations/hundi", get(donations::list_hundi_collections))
        .route("/donations/hundi", post(donations::create_hundi_collection))
        .route("/donations/:donation_id", get(donations::get_donation))
}

/// Create seva catalog and booking routes
pub fn seva_routes() -> Router<MandirServer> {
    Router::new()
        .route("/sevas", get(sevas::list_sevas))
        .route("/sevas", post(sevas::create_seva))
        .route("/sevas/bookings", get(sevas::list_bookings))
        .route("/sevas/bookings", post(sevas::create_booking))
        .route(
            "/sevas/bookings/:booking_id/perform",
            put(sevas::mark_booking_performed),
        )
        .route(
            "/sevas/bookings/:booking_id/cancel",
            put(sevas::cancel_booking),
        )
        .route("/sevas/:seva_id", put(sevas::update_seva))
}

/// Create sponsorship routes
pub fn sponsorship_routes() -> Router<MandirServer> {
    Router::new()
        .route("/sponsorships", get(sponsorships::list_sponsorships))
        .route("/sponsorships", post(sponsorships::create_sponsorship))
        .route(
            "/sponsorships/:sponsorship_id/payments",
            post(sponsorships::record_sponsorship_payment),
        )
}

/// Create HR and payroll routes
pub fn hr_routes() -> Router<MandirServer> {
    Router::new()
        .route("/hr/employees", get(hr::list_employees))
        .route("/hr/employees", post(hr::create_employee))
        .route("/hr/employees/:employee_id", put(hr::update_employee))
        .route("/hr/payroll-runs", get(hr::list_payroll_runs))
        .route("/hr/payroll-runs", post(hr::create_payroll_run))
        .route("/hr/payroll-runs/:run_id", get(hr::get_payroll_run))
        .route("/hr/payroll-runs/:run_id/pay", post(hr::pay_payroll_run))
}

/// Create inventory routes
pub fn inventory_routes() -> Router<MandirServer> {
    Router::new()
        .route("/inventory/items", get(inventory::list_items))
        .route("/inventory/items", post(inventory::create_item))
        .route("/inventory/purchases", get(inventory::list_purchases))
        .route("/inventory/purchases", post(inventory::create_purchase))
        .route("/inventory/issues", get(inventory::list_issues))
        .route("/inventory/issues", post(inventory::create_issue))
        .route(
            "/inventory/vendor-payments",
            post(inventory::create_vendor_payment),
        )
}

/// Create fixed-asset routes (assets, CWIP, disposals)
pub fn asset_routes() -> Router<MandirServer> {
    Router::new()
        .route("/assets", get(assets::list_assets))
        .route("/assets", post(assets::create_asset))
        .route("/assets/cwip", get(assets::list_cwip_projects))
        .route("/assets/cwip", post(assets::create_cwip_project))
        .route(
            "/assets/cwip/:project_id/expenditure",
            post(assets::add_cwip_expenditure),
        )
        .route(
            "/assets/cwip/:project_id/capitalize",
            post(assets::capitalize_cwip),
        )
        .route("/assets/disposals", get(assets::list_disposals))
        .route(
            "/assets/disposals/:disposal_id/approve",
            post(assets::approve_disposal),
        )
        .route(
            "/assets/disposals/:disposal_id/reject",
            post(assets::reject_disposal),
        )
        .route("/assets/:asset_id", get(assets::get_asset))
        .route("/assets/:asset_id/disposals", post(assets::request_disposal))
}

/// Create bank reconciliation routes
pub fn bank_routes() -> Router<MandirServer> {
    Router::new()
        .route("/bank/accounts", get(bank::list_bank_accounts))
        .route("/bank/accounts", post(bank::create_bank_account))
        .route(
            "/bank/accounts/:account_id/statement",
            post(bank::import_statement_csv),
        )
        .route(
            "/bank/accounts/:account_id/lines",
            get(bank::list_statement_lines),
        )
        .route(
            "/bank/accounts/:account_id/reconciliations",
            get(bank::list_reconciliations),
        )
        .route(
            "/bank/accounts/:account_id/reconciliations",
            post(bank::create_reconciliation),
        )
        .route("/bank/lines/:line_id/match", post(bank::match_statement_line))
}

/// Create accounting routes (chart, journal entries, reports)
pub fn accounting_routes() -> Router<MandirServer> {
    Router::new()
        // Chart of accounts
        .route("/accounting/accounts", get(accounting::list_accounts))
        .route("/accounting/accounts", post(accounting::create_account))
        .route("/accounting/accounts/tree", get(accounting::account_tree))
        .route(
            "/accounting/accounts/seed-defaults",
            post(accounting::seed_default_accounts),
        )
        .route(
            "/accounting/accounts/:account_id",
            get(accounting::get_account),
        )
        .route(
            "/accounting/accounts/:account_id",
            put(accounting::update_account),
        )
        .route(
            "/accounting/accounts/:account_id",
            delete(accounting::deactivate_account),
        )
        // Journal entries
        .route(
            "/accounting/journal-entries",
            get(accounting::list_journal_entries),
        )
        .route(
            "/accounting/journal-entries",
            post(accounting::create_journal_entry),
        )
        .route(
            "/accounting/journal-entries/:entry_id",
            get(accounting::get_journal_entry),
        )
        .route(
            "/accounting/journal-entries/:entry_id/post",
            post(accounting::post_journal_entry),
        )
        .route(
            "/accounting/journal-entries/:entry_id/cancel",
            post(accounting::cancel_journal_entry),
        )
        // Reports
        .route(
            "/accounting/reports/trial-balance",
            get(accounting::trial_balance),
        )
        .route("/accounting/reports/ledger", get(accounting::account_ledger))
        .route(
            "/accounting/reports/profit-loss",
            get(accounting::profit_and_loss),
        )
        .route(
            "/accounting/reports/balance-sheet",
            get(accounting::balance_sheet),
        )
        .route("/accounting/reports/day-book", get(accounting::day_book))
        .route("/accounting/reports/cash-book", get(accounting::cash_book))
        .route("/accounting/reports/bank-book", get(accounting::bank_book))
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<MandirServer> {
    Router::new()
        .merge(auth_routes())
        .merge(devotee_routes())
        .merge(donation_routes())
        .merge(seva_routes())
        .merge(sponsorship_routes())
        .merge(hr_routes())
        .merge(inventory_routes())
        .merge(asset_routes())
        .merge(bank_routes())
        .merge(accounting_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<MandirServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        // API v1 routes (authentication required)
        .nest("/api/v1", api_v1_routes())
}
