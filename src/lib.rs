pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod progress;
pub mod quiet;
pub mod report;
pub mod runner;
pub mod work;

/// Default log filter; progress output owns stdout, logs go to stderr.
pub const DEFAULT_LOG_FILTER: &str = "nb_batch=warn";

// Load env from NB_BATCH_ENV_FILE when set, otherwise ./.env if present.
pub fn load_env() {
    if let Ok(env_path) = std::env::var("NB_BATCH_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::dotenv();
    }
}
