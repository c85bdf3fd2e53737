//! Stored-CDR query handlers
//!
//! Read-only endpoints over the persistent sink: paginated listing, lookup
//! by call identifier, and summary statistics.

use crate::dto::{ApiResponse, CdrResponse, CdrStatsResponse, PaginationParams};
use actix_web::{
    web::{self, Data, Json, Path, Query},
    Result,
};
use callflow_core::{
    traits::{CdrRepository, PaginatedResponse},
    AppError,
};
use callflow_db::repositories::PgCdrRepository;
use sqlx::PgPool;
use tracing::{debug, instrument};

/// List stored CDRs, newest first
///
/// GET /cdrs?page=1&per_page=50
#[instrument(skip(db, query))]
pub async fn list_cdrs(
    query: Query<PaginationParams>,
    db: Data<PgPool>,
) -> Result<Json<PaginatedResponse<CdrResponse>>> {
    let repo = PgCdrRepository::new(db.get_ref().clone());
    let pagination = query.clamped();

    debug!(
        "Listing CDRs: page={}, per_page={}",
        pagination.page, pagination.per_page
    );

    let (cdrs, total) = repo.list(pagination.limit(), pagination.offset()).await?;
    let data: Vec<CdrResponse> = cdrs.into_iter().map(CdrResponse::from).collect();

    Ok(Json(query.paginate(data, total)))
}

/// Get a single stored CDR by call identifier
///
/// GET /cdrs/{call_id}
#[instrument(skip(db))]
pub async fn get_cdr(
    path: Path<String>,
    db: Data<PgPool>,
) -> Result<Json<ApiResponse<CdrResponse>>> {
    let call_id = path.into_inner();
    debug!("Fetching CDR for call: {}", call_id);

    let repo = PgCdrRepository::new(db.get_ref().clone());

    let cdr = repo
        .find_by_call_id(&call_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CDR for call {} not found", call_id)))?;

    Ok(Json(ApiResponse::success(CdrResponse::from(cdr))))
}

/// Summary statistics over all stored CDRs
///
/// GET /cdrs/stats
#[instrument(skip(db))]
pub async fn get_cdr_stats(db: Data<PgPool>) -> Result<Json<ApiResponse<CdrStatsResponse>>> {
    debug!("Computing stored CDR statistics");

    let repo = PgCdrRepository::new(db.get_ref().clone());
    let summary = repo.summary_stats().await?;

    Ok(Json(ApiResponse::success(summary.into())))
}

/// Configure CDR query routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cdrs")
            .route("", web::get().to(list_cdrs))
            .route("/stats", web::get().to(get_cdr_stats))
            .route("/{call_id}", web::get().to(get_cdr)),
    );
}
