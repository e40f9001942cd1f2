use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::controllers::report_controller::ReportController;
use crate::dto::report_dto::{ReportFormat, ReportRequest};
use crate::models::report::ReportEntity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new().route("/:entity", post(generate_report))
}

/// `<entity>-report-<YYYY-MM-DD>.csv`
pub fn report_filename(entity: ReportEntity) -> String {
    format!("{}-report-{}.csv", entity, Utc::now().date_naive())
}

async fn generate_report(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let format = request.format;
    let controller = ReportController::new(&state);
    let rows = controller.generate(&entity, request).await?;

    match format {
        ReportFormat::Json => Ok(Json(rows.to_json()?).into_response()),
        ReportFormat::Csv => {
            let filename = report_filename(rows.entity());
            let csv = rows.to_csv()?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                csv,
            )
                .into_response())
        }
    }
}
