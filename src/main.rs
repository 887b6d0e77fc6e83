use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use driver_dispatch::config::{ServiceConfig, StoreKind};
use driver_dispatch::couchdb::CouchDbStore;
use driver_dispatch::memory::MemoryStore;
use driver_dispatch::server::{self, AppState};
use driver_dispatch::traits::DriverStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env()?;

    // Built before the runtime and dropped after it: the CouchDB client is
    // blocking and must not be torn down on an async worker.
    let store: Arc<dyn DriverStore> = match &config.store {
        StoreKind::CouchDb(couch) => {
            info!(url = %couch.base_url, database = %couch.database, "using CouchDB driver store");
            Arc::new(CouchDbStore::new(couch.clone())?)
        }
        StoreKind::Memory { seed_file } => {
            info!(seed = ?seed_file, "using in-memory driver store");
            match seed_file {
                Some(path) => Arc::new(MemoryStore::from_seed_file(path)?),
                None => Arc::new(MemoryStore::default()),
            }
        }
    };

    info!(
        supplier = ?config.shipment.supplier,
        retailer = ?config.shipment.retailer,
        current_weight = config.shipment.current_weight,
        max_headroom = config.select.max_headroom,
        "shipment context loaded"
    );

    let static_dir = config.static_dir.is_dir().then(|| config.static_dir.clone());
    let state = AppState::new(Arc::clone(&store), config.shipment, config.select.clone());
    let router = server::create_router(state, static_dir);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(server::serve(config.bind, router))?;
    drop(runtime);
    drop(store);

    info!("driver dispatch stopped");
    Ok(())
}
