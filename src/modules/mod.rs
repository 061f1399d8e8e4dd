pub mod accounts;
pub mod catalog;
pub mod reviews;

use std::sync::Arc;

use bookshop_auth::{SessionConfig, SessionIssuer};
use bookshop_kernel::{settings::Settings, ModuleRegistry};

/// Construct the shared stores and register all feature modules.
/// Stores are built once here and handed to modules by reference-counted
/// handle; nothing lives in module-level globals.
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) {
    let catalog = Arc::new(catalog::store::CatalogStore::seeded());
    let reviews = Arc::new(reviews::ledger::ReviewLedger::new(Arc::clone(&catalog)));
    let accounts = Arc::new(accounts::registry::AccountRegistry::new());
    let sessions = Arc::new(SessionIssuer::new(SessionConfig::new(
        settings.session.secret.clone(),
        settings.session.token_ttl_secs,
    )));

    registry.register(catalog::create_module(
        catalog,
        Arc::clone(&reviews),
        settings.catalog.browse_delay_ms,
    ));
    registry.register(accounts::create_module(accounts, Arc::clone(&sessions)));
    registry.register(reviews::create_module(reviews, sessions));
}
