use serde::Serialize;

use crate::runner::CollectionSummary;

#[derive(Serialize)]
pub struct CollectionRunResponse {
    pub job_id: i64,
    pub summary: CollectionSummaryView,
}

#[derive(Serialize)]
pub struct CollectionSummaryView {
    pub total_actors: usize,
    pub processed: usize,
    pub scanned: usize,
    pub skipped: usize,
    pub errors: usize,
    pub countries_evaluated: usize,
}

impl From<&CollectionSummary> for CollectionSummaryView {
    fn from(s: &CollectionSummary) -> Self {
        Self {
            total_actors: s.total_actors,
            processed: s.processed,
            scanned: s.scanned,
            skipped: s.skipped,
            errors: s.errors,
            countries_evaluated: s.countries_evaluated,
        }
    }
}

#[derive(Serialize)]
pub struct MitreSyncResponse {
    pub job_id: i64,
    pub total: usize,
    pub created: u32,
    pub updated: u32,
}
