//! OpenAPI documentation
//!
//! The generated document is served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::gateway::handlers::CreateWalletRequest;
use crate::gateway::types::{
    BalanceResponse, ErrorBody, HealthResponse, HistoryResponse, TransactionView,
    TransferResponse, WalletResponse,
};

/// Main API documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Ledger API",
        version = "1.0.0",
        description = "Idempotent atomic money transfers between internally managed wallets.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::get_transfer,
        crate::gateway::handlers::wallet::get_balance,
        crate::gateway::handlers::wallet::get_transactions,
        crate::gateway::handlers::wallet::create_wallet,
    ),
    components(
        schemas(
            TransferResponse,
            BalanceResponse,
            HistoryResponse,
            TransactionView,
            WalletResponse,
            CreateWalletRequest,
            HealthResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Transfer", description = "Idempotent money transfers"),
        (name = "Wallet", description = "Balance and history queries, wallet administration"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Wallet Ledger API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/transfer"));
        assert!(paths.contains_key("/api/wallet/{id}/balance"));
        assert!(paths.contains_key("/api/wallet/{id}/transactions"));
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Wallet Ledger API"));
    }
}
