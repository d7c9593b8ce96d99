//! Wiring shared by the unit and HTTP tests: a temporary data directory, an
//! in-memory drive and a fast flush configuration.

use crate::config::AppConfig;
use crate::job_controller::flusher::{FlushConfig, Flusher, RetryPolicy};
use crate::services::drive::memory::MemoryDrive;
use crate::services::registrations::repository::CsvRepository;
use crate::services::settings::store::ConfigStore;
use crate::state::AppState;
use actix_web::web;
use common::model::registration::RegistrationRecord;
use common::responses::AdminCredentials;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FOLDER: &str = "folder-1";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret";

pub struct TestEnv {
    _dir: TempDir,
    pub drive: Arc<MemoryDrive>,
    pub store: Arc<ConfigStore>,
    pub repository: Arc<CsvRepository>,
    pub flusher: Arc<Flusher>,
    pub state: web::Data<AppState>,
}

impl TestEnv {
    pub fn flush_config() -> FlushConfig {
        FlushConfig {
            interval: Duration::from_millis(20),
            fast_interval: Duration::from_millis(5),
            max_batch_size: 50,
            immediate_threshold: 10,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
            },
        }
    }

    pub async fn new() -> Self {
        Self::with_flush_config(Self::flush_config()).await
    }

    pub async fn with_flush_config(flush: FlushConfig) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: PathBuf::from(dir.path()),
            admin: Some(AdminCredentials {
                username: ADMIN_USER.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
            drive_api_base: String::new(),
            drive_access_token: String::new(),
            flush,
        };

        let store = Arc::new(ConfigStore::new(&config.data_dir));
        store.init().await.expect("init store");
        store.set_folder_id(FOLDER).await.expect("folder id");

        let drive = Arc::new(MemoryDrive::default());
        let state = AppState::assemble(drive.clone(), store.clone(), &config);

        Self {
            _dir: dir,
            drive,
            store,
            repository: state.repository.clone(),
            flusher: state.flusher.clone(),
            state: web::Data::new(state),
        }
    }
}

/// A registration for the default schema, distinguishable by `name` and `n`.
pub fn record(name: &str, n: usize) -> RegistrationRecord {
    RegistrationRecord {
        values: [
            ("name", name.to_string()),
            ("email", format!("{}@example.com", name.to_lowercase())),
            ("phone", format!("555-{n:04}")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        date: format!("2024-01-01T00:{:02}:{:02}.000Z", n / 60 % 60, n % 60),
    }
}
