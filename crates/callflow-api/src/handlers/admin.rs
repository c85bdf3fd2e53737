//! Admin trigger handlers
//!
//! Each trigger runs the pipeline synchronously for one sink kind and
//! returns success only if the entire run completed. A failed run surfaces
//! a non-success response whose error code identifies the failed phase.

use crate::dto::{ApiResponse, TriggerResponse};
use actix_web::{
    web::{self, Data, Json},
    Result,
};
use callflow_services::{PipelineRunner, SinkKind};
use tracing::{info, instrument};

/// Run the internal pipeline: eligible calls are upserted into the
/// persistent CDR store
///
/// POST /admin/trigger-cdr-upload
#[instrument(skip(runner))]
pub async fn trigger_cdr_upload(
    runner: Data<PipelineRunner>,
) -> Result<Json<ApiResponse<TriggerResponse>>> {
    info!("Internal CDR upload triggered");

    let report = runner.run(SinkKind::Internal).await?;

    Ok(Json(ApiResponse::with_message(
        report.into(),
        "internal CDR upload completed",
    )))
}

/// Run the external pipeline: eligible calls are posted to the remote
/// receiver as one batch
///
/// POST /admin/trigger-external-cdr-upload
#[instrument(skip(runner))]
pub async fn trigger_external_cdr_upload(
    runner: Data<PipelineRunner>,
) -> Result<Json<ApiResponse<TriggerResponse>>> {
    info!("External CDR upload triggered");

    let report = runner.run(SinkKind::External).await?;

    Ok(Json(ApiResponse::with_message(
        report.into(),
        "external CDR upload completed",
    )))
}

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/trigger-cdr-upload", web::post().to(trigger_cdr_upload))
            .route(
                "/trigger-external-cdr-upload",
                web::post().to(trigger_external_cdr_upload),
            ),
    );
}
