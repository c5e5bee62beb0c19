use std::sync::Arc;

use crate::account::AccountService;
use crate::config::AppConfig;
use crate::db::Database;
use crate::ledger::LedgerStore;
use crate::transfer::{TransferEngine, TransferService};
use crate::user_auth::{UserAuthService, UserStore};

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub transfers: Arc<TransferService>,
    pub user_auth: Arc<UserAuthService>,
    /// Present when running against Postgres; used by the health check
    pub db: Option<Arc<Database>>,
    /// Ledger store name, reported by the health check
    pub store_name: &'static str,
}

impl AppState {
    /// Wire every service on top of the given stores
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        users: Arc<dyn UserStore>,
        config: &AppConfig,
        db: Option<Arc<Database>>,
    ) -> Self {
        let store_name = ledger.name();
        let engine = Arc::new(TransferEngine::with_config(
            Arc::clone(&ledger),
            config.engine_config(),
        ));

        Self {
            accounts: Arc::new(AccountService::new(
                ledger,
                config.ledger.supported_currencies.clone(),
            )),
            transfers: Arc::new(TransferService::new(engine)),
            user_auth: Arc::new(UserAuthService::new(
                users,
                config.auth.jwt_secret.clone(),
                config.token_ttl(),
            )),
            db,
            store_name,
        }
    }
}
