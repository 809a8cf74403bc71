use ecoscore::config::{AppConfig, StorageBackend, StorageConfig};
use ecoscore::products::{
    InMemoryProductRepository, JsonLinesProductRepository, NewProduct, ProductRepository,
    ProductScoringService, RepositoryError, ScoredProduct,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) static_dir: Arc<PathBuf>,
}

/// Record store selected by `APP_STORE`.
pub(crate) enum ProductStore {
    Memory(InMemoryProductRepository),
    File(JsonLinesProductRepository),
}

impl ProductStore {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("using in-memory product store");
                Ok(Self::Memory(InMemoryProductRepository::default()))
            }
            StorageBackend::File => {
                let store = JsonLinesProductRepository::open(&config.data_path)?;
                info!(path = %config.data_path.display(), "using file product store");
                Ok(Self::File(store))
            }
        }
    }

    fn inner(&self) -> &dyn ProductRepository {
        match self {
            ProductStore::Memory(store) => store,
            ProductStore::File(store) => store,
        }
    }
}

impl ProductRepository for ProductStore {
    fn append(&self, product: NewProduct) -> Result<ScoredProduct, RepositoryError> {
        self.inner().append(product)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ScoredProduct>, RepositoryError> {
        self.inner().list_recent(limit)
    }

    fn list_all(&self) -> Result<Vec<ScoredProduct>, RepositoryError> {
        self.inner().list_all()
    }
}

pub(crate) fn build_service(
    config: &AppConfig,
) -> Result<Arc<ProductScoringService<ProductStore>>, RepositoryError> {
    let store = Arc::new(ProductStore::open(&config.storage)?);
    Ok(Arc::new(ProductScoringService::new(
        store,
        config.scoring.clone(),
    )))
}
