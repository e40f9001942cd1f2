use crate::dto::report_dto::ReportRequest;
use crate::models::report::{ReportEntity, ReportFilters};
use crate::services::report_service::{ReportRows, ReportService};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct ReportController {
    reports: ReportService,
}

impl ReportController {
    pub fn new(state: &AppState) -> Self {
        Self {
            reports: state.report_service(),
        }
    }

    /// Resolves the entity named in the path, checks the filters against
    /// that entity and builds the rows.
    pub async fn generate(&self, entity: &str, request: ReportRequest) -> AppResult<ReportRows> {
        let entity: ReportEntity = entity
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::InvalidInput(e.to_string()))?;
        let filters = ReportFilters::parse(entity, request.filters)?;
        self.reports.generate(request.date_range, &filters).await
    }
}
