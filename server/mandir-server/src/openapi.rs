use crate::server::MandirServer;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Authentication endpoints
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        // Devotee endpoints
        crate::handlers::devotees::create_devotee,
        crate::handlers::devotees::get_devotee,
        crate::handlers::devotees::list_devotees,
        crate::handlers::devotees::update_devotee,
        crate::handlers::devotees::deactivate_devotee,
        crate::handlers::devotees::import_devotees_csv,
        crate::handlers::devotees::export_devotees_csv,

        // Donation endpoints
        crate::handlers::donations::create_donation,
        crate::handlers::donations::get_donation,
        crate::handlers::donations::list_donations,
        crate::handlers::donations::import_donations_csv,
        crate::handlers::donations::export_donations_csv,
        crate::handlers::donations::create_hundi_collection,
        crate::handlers::donations::list_hundi_collections,

        // Seva endpoints
        crate::handlers::sevas::create_seva,
        crate::handlers::sevas::list_sevas,
        crate::handlers::sevas::update_seva,
        crate::handlers::sevas::create_booking,
        crate::handlers::sevas::list_bookings,
        crate::handlers::sevas::mark_booking_performed,
        crate::handlers::sevas::cancel_booking,

        // Sponsorship endpoints
        crate::handlers::sponsorships::create_sponsorship,
        crate::handlers::sponsorships::record_sponsorship_payment,
        crate::handlers::sponsorships::list_sponsorships,

        // HR endpoints
        crate::handlers::hr::create_employee,
        crate::handlers::hr::list_employees,
        crate::handlers::hr::update_employee,
        crate::handlers::hr::create_payroll_run,
        crate::handlers::hr::pay_payroll_run,
        crate::handlers::hr::get_payroll_run,
        crate::handlers::hr::list_payroll_runs,

        // Inventory endpoints
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::list_items,
        crate::handlers::inventory::create_purchase,
        crate::handlers::inventory::create_issue,
        crate::handlers::inventory::list_purchases,
        crate::handlers::inventory::list_issues,
        crate::handlers::inventory::create_vendor_payment,

        // Asset endpoints
        crate::handlers::assets::create_asset,
        crate::handlers::assets::list_assets,
        crate::handlers::assets::get_asset,
        crate::handlers::assets::create_cwip_project,
        crate::handlers::assets::list_cwip_projects,
        crate::handlers::assets::add_cwip_expenditure,
        crate::handlers::assets::capitalize_cwip,
        crate::handlers::assets::request_disposal,
        crate::handlers::assets::approve_disposal,
        crate::handlers::assets::reject_disposal,
        crate::handlers::assets::list_disposals,

        // Bank endpoints
        crate::handlers::bank::create_bank_account,
        crate::handlers::bank::list_bank_accounts,
        crate::handlers::bank::import_statement_csv,
        crate::handlers::bank::list_statement_lines,
        crate::handlers::bank::match_statement_line,
        crate::handlers::bank::create_reconciliation,
        crate::handlers::bank::list_reconciliations,

        // Accounting endpoints
        crate::handlers::accounting::create_account,
        crate::handlers::accounting::list_accounts,
        crate::handlers::accounting::account_tree,
        crate::handlers::accounting::get_account,
        crate::handlers::accounting::update_account,
        crate::handlers::accounting::deactivate_account,
        crate::handlers::accounting::seed_default_accounts,
        crate::handlers::accounting::create_journal_entry,
        crate::handlers::accounting::get_journal_entry,
        crate::handlers::accounting::list_journal_entries,
        crate::handlers::accounting::post_journal_entry,
        crate::handlers::accounting::cancel_journal_entry,
        crate::handlers::accounting::trial_balance,
        crate::handlers::accounting::account_ledger,
        crate::handlers::accounting::profit_and_loss,
        crate::handlers::accounting::balance_sheet,
        crate::handlers::accounting::day_book,
        crate::handlers::accounting::cash_book,
        crate::handlers::accounting::bank_book,
    ),
    components(
        schemas(
            crate::handlers::health::HealthStatus,
            crate::handlers::health::VersionInfo,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::UserInfo,
            crate::handlers::devotees::Devotee,
            crate::handlers::devotees::CreateDevoteeRequest,
            crate::handlers::devotees::UpdateDevoteeRequest,
            crate::handlers::devotees::ImportSummary,
            crate::handlers::donations::Donation,
            crate::handlers::donations::CreateDonationRequest,
            crate::handlers::donations::DonationResponse,
            crate::handlers::donations::DonationImportSummary,
            crate::handlers::donations::HundiCollection,
            crate::handlers::donations::CreateHundiCollectionRequest,
            crate::handlers::donations::HundiCollectionResponse,
            crate::handlers::sevas::Seva,
            crate::handlers::sevas::SevaBooking,
            crate::handlers::sevas::CreateSevaRequest,
            crate::handlers::sevas::UpdateSevaRequest,
            crate::handlers::sevas::CreateBookingRequest,
            crate::handlers::sevas::CancelBookingRequest,
            crate::handlers::sevas::BookingResponse,
            crate::handlers::sponsorships::Sponsorship,
            crate::handlers::sponsorships::CreateSponsorshipRequest,
            crate::handlers::sponsorships::SponsorshipPaymentRequest,
            crate::handlers::sponsorships::SponsorshipResponse,
            crate::handlers::hr::Employee,
            crate::handlers::hr::PayrollRun,
            crate::handlers::hr::PayrollItem,
            crate::handlers::hr::CreateEmployeeRequest,
            crate::handlers::hr::UpdateEmployeeRequest,
            crate::handlers::hr::CreatePayrollRunRequest,
            crate::handlers::hr::PayrollDeduction,
            crate::handlers::hr::PayPayrollRunRequest,
            crate::handlers::hr::PayrollRunResponse,
            crate::handlers::inventory::InventoryItem,
            crate::handlers::inventory::Purchase,
            crate::handlers::inventory::StockIssue,
            crate::handlers::inventory::CreateItemRequest,
            crate::handlers::inventory::CreatePurchaseRequest,
            crate::handlers::inventory::CreateIssueRequest,
            crate::handlers::inventory::PurchaseResponse,
            crate::handlers::inventory::IssueResponse,
            crate::handlers::inventory::VendorPayment,
            crate::handlers::inventory::CreateVendorPaymentRequest,
            crate::handlers::inventory::VendorPaymentResponse,
            crate::handlers::assets::Asset,
            crate::handlers::assets::CwipProject,
            crate::handlers::assets::AssetDisposal,
            crate::handlers::assets::CreateAssetRequest,
            crate::handlers::assets::CreateCwipRequest,
            crate::handlers::assets::CwipExpenditureRequest,
            crate::handlers::assets::CapitalizeCwipRequest,
            crate::handlers::assets::RequestDisposalRequest,
            crate::handlers::assets::AssetResponse,
            crate::handlers::assets::CwipResponse,
            crate::handlers::assets::CapitalizationResponse,
            crate::handlers::assets::DisposalResponse,
            crate::handlers::bank::BankAccount,
            crate::handlers::bank::BankStatementLine,
            crate::handlers::bank::BankReconciliation,
            crate::handlers::bank::CreateBankAccountRequest,
            crate::handlers::bank::MatchLineRequest,
            crate::handlers::bank::CreateReconciliationRequest,
            crate::handlers::bank::StatementImportSummary,
            crate::handlers::accounting::CancelJournalEntryRequest,
            crate::handlers::accounting::CancellationResponse,
            accounting_service::Account,
            accounting_service::JournalEntry,
            accounting_service::JournalLine,
            accounting_service::JournalEntryWithLines,
            accounting_service::LineInput,
            accounting_service::CreateJournalEntry,
            accounting_service::CreateAccount,
            accounting_service::UpdateAccount,
            accounting_service::AccountType,
            accounting_service::JournalStatus,
            accounting_service::TrialBalanceReport,
            accounting_service::TrialBalanceRow,
            accounting_service::AccountLedger,
            accounting_service::LedgerLine,
            accounting_service::ProfitLossReport,
            accounting_service::PlGroup,
            accounting_service::PlAccountRow,
            accounting_service::BalanceSheetReport,
            accounting_service::BalanceSheetSection,
            accounting_service::BalanceSheetRow,
            accounting_service::DayBookReport,
            accounting_service::DayBookRow,
            accounting_service::CashBankBookReport,
            accounting_service::BookLine,
            accounting_service::BookSide,
        )
    ),
    tags(
        (name = "health", description = "System health endpoints"),
        (name = "auth", description = "User authentication"),
        (name = "devotees", description = "Devotee CRM"),
        (name = "donations", description = "Donation receipting and hundi collections"),
        (name = "sevas", description = "Seva catalog and bookings"),
        (name = "sponsorships", description = "Sponsorship commitments and payments"),
        (name = "hr", description = "Employees and payroll"),
        (name = "inventory", description = "Stores, purchases and issues"),
        (name = "assets", description = "Fixed assets, CWIP and disposals"),
        (name = "bank", description = "Bank accounts and reconciliation"),
        (name = "accounting", description = "Chart of accounts and journal engine"),
        (name = "reports", description = "Financial reports"),
    ),
    info(
        title = "Mandir ERP API",
        version = "0.1.0",
        description = "Temple management platform API: devotee CRM, donations, sevas, HR, inventory, assets and a double-entry general ledger.",
        contact(
            name = "Mandir ERP Team",
            email = "api@mandirerp.dev",
            url = "https://mandirerp.dev"
        ),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
)]
pub struct ApiDoc;

/// Create documentation routes (Swagger UI + raw JSON)
pub fn create_docs_routes() -> Router<MandirServer> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
