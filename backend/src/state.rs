use crate::config::AppConfig;
use crate::error::AppError;
use crate::job_controller::flusher::Flusher;
use crate::job_controller::queue::SubmissionQueue;
use crate::services::drive::google::GoogleDriveBackend;
use crate::services::drive::DriveBackend;
use crate::services::registrations::repository::CsvRepository;
use crate::services::settings::store::ConfigStore;
use common::responses::AdminCredentials;
use std::sync::Arc;

/// Everything a request handler needs, built once in `main` and shared with
/// every actix worker as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub repository: Arc<CsvRepository>,
    pub flusher: Arc<Flusher>,
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let drive = GoogleDriveBackend::new(&config.drive_api_base, &config.drive_access_token)?;
        let store = Arc::new(ConfigStore::new(&config.data_dir));
        store.init().await?;
        Ok(Self::assemble(Arc::new(drive), store, config))
    }

    pub fn assemble(
        drive: Arc<dyn DriveBackend>,
        store: Arc<ConfigStore>,
        config: &AppConfig,
    ) -> Self {
        let repository = Arc::new(CsvRepository::new(drive, store.clone()));
        let flusher = Flusher::new(
            Arc::new(SubmissionQueue::new()),
            repository.clone(),
            store.clone(),
            config.flush.clone(),
        );
        Self {
            store,
            repository,
            flusher,
            admin: config.admin.clone(),
        }
    }
}
