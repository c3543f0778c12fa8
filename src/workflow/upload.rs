use super::error::UploadError;
use crate::access::{AccessBroker, AccessOperation};
use crate::attachments::{Attachment, AttachmentRegistry};
use crate::blob::{BlobUploader, UploadFile, UploadOptions};
use crate::config::UploadLimits;
use crate::observability::TransferMetrics;
use crate::validation;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Linear progress of one upload batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Start,
    BrokerRequested,
    FilesUploading,
    AttachmentsRegistering,
    Done,
    Failed,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Start => "START",
            UploadStage::BrokerRequested => "BROKER_REQUESTED",
            UploadStage::FilesUploading => "FILES_UPLOADING",
            UploadStage::AttachmentsRegistering => "ATTACHMENTS_REGISTERING",
            UploadStage::Done => "DONE",
            UploadStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Broker, then parallel transfers, then one registration call
///
/// Invocations share nothing but the metrics counters; two panels uploading
/// at once run fully independently.
pub struct UploadOrchestrator {
    broker: Arc<dyn AccessBroker>,
    uploader: Arc<BlobUploader>,
    registry: Arc<dyn AttachmentRegistry>,
    limits: UploadLimits,
    container: String,
    metrics: Arc<TransferMetrics>,
}

impl UploadOrchestrator {
    pub fn new(
        broker: Arc<dyn AccessBroker>,
        uploader: Arc<BlobUploader>,
        registry: Arc<dyn AttachmentRegistry>,
        limits: UploadLimits,
        container: impl Into<String>,
        metrics: Arc<TransferMetrics>,
    ) -> Self {
        Self {
            broker,
            uploader,
            registry,
            limits,
            container: container.into(),
            metrics,
        }
    }

    /// Upload `files` under `case_id` and register them as attachments
    ///
    /// Returns attachments in `files` order, each with `status = WAIT`.
    /// Retrying after a failure starts over from the broker; blobs stored by
    /// the failed attempt are not reused.
    pub async fn upload_case_files(
        &self,
        case_id: &str,
        files: &[UploadFile],
        memo: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Attachment>, UploadError> {
        let batch_id = Uuid::now_v7();
        let span = info_span!("upload_batch", %batch_id, case_id, files = files.len());

        async move {
            let mut stage = UploadStage::Start;
            let result = self
                .run(&mut stage, case_id, files, memo, auth_token)
                .await;

            match &result {
                Ok(attachments) => {
                    info!(attachments = attachments.len(), "Upload batch done");
                }
                Err(e) => {
                    let failed_at = fail(&mut stage);
                    if failed_at != UploadStage::Start {
                        self.metrics.batch_failed();
                    }
                    error!(%failed_at, error = %e, "Upload batch failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        stage: &mut UploadStage,
        case_id: &str,
        files: &[UploadFile],
        memo: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Attachment>, UploadError> {
        validation::check_batch(case_id, files, &self.limits)?;
        self.metrics.batch_started();

        advance(stage, UploadStage::BrokerRequested);
        let access = self
            .broker
            .request_access(AccessOperation::Upload, &self.container, auth_token)
            .await?;

        advance(stage, UploadStage::FilesUploading);
        let options = UploadOptions::builder()
            .path_prefix(case_id.trim())
            .access(access)
            .build();
        let records = self.uploader.upload(files, &options).await?;

        advance(stage, UploadStage::AttachmentsRegistering);
        let memo = memo.filter(|m| !m.trim().is_empty());
        let attachments = self
            .registry
            .register(case_id.trim(), &records, memo, auth_token)
            .await?;

        advance(stage, UploadStage::Done);
        Ok(attachments)
    }
}

fn advance(stage: &mut UploadStage, next: UploadStage) {
    debug!(from = %stage, to = %next, "Upload stage");
    *stage = next;
}

/// Move to `Failed` and return the stage the batch failed in
fn fail(stage: &mut UploadStage) -> UploadStage {
    let failed_at = *stage;
    advance(stage, UploadStage::Failed);
    failed_at
}
