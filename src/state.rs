use std::sync::Arc;

use crate::access::{AccessBroker, SignedUrlBroker};
use crate::attachments::{AttachmentRegistrar, AttachmentRegistry};
use crate::blob::{BlobDownloader, BlobUploader};
use crate::cases::CaseService;
use crate::client::{ApiClient, ApiClientError};
use crate::config::Config;
use crate::observability::TransferMetrics;
use crate::workflow::{AttachmentFetcher, UploadOrchestrator};

/// Every component wired from one loaded [`Config`]
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cases: CaseService,
    pub uploads: Arc<UploadOrchestrator>,
    pub fetcher: Arc<AttachmentFetcher>,
    pub metrics: Arc<TransferMetrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ApiClientError> {
        let metrics = Arc::new(TransferMetrics::new());
        let client = ApiClient::new(&config.api)?;

        let broker: Arc<dyn AccessBroker> =
            Arc::new(SignedUrlBroker::new(client.clone(), &config.api.access_path));
        let registry: Arc<dyn AttachmentRegistry> = Arc::new(AttachmentRegistrar::new(
            client.clone(),
            config.upload.attachment_source,
        ));

        let uploader = BlobUploader::new(&config.upload, &config.api.user_agent, metrics.clone())?;
        let uploads = UploadOrchestrator::new(
            broker.clone(),
            Arc::new(uploader),
            registry,
            config.upload.limits(),
            &config.upload.container,
            metrics.clone(),
        );

        let downloader = BlobDownloader::new(
            &config.upload.container,
            &config.api.user_agent,
            config.upload.transfer_timeout(),
        )?;
        let fetcher = AttachmentFetcher::new(
            broker,
            downloader,
            &config.upload.container,
            &config.download.directory,
            metrics.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            cases: CaseService::new(client),
            uploads: Arc::new(uploads),
            fetcher: Arc::new(fetcher),
            metrics,
        })
    }

    /// Bearer token from the environment, if one was provided
    pub fn token(&self) -> Option<&str> {
        self.config.api.token.as_deref()
    }
}
