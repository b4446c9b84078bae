use crate::config::settings::AppConfig;
use crate::modules::spot::service::KeyService;
use crate::workers::transcoder::TranscodeQueue;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub transcoder: TranscodeQueue,
    pub keys: KeyService,
}

impl AppState {
    pub fn new(config: AppConfig, transcoder: TranscodeQueue, keys: KeyService) -> Self {
        Self {
            config,
            transcoder,
            keys,
        }
    }
}
