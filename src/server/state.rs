use axum::extract::FromRef;

use crate::chart_store::ChartStore;
use crate::series::SeriesAssembler;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedChartStore = Arc<dyn ChartStore>;
pub type GuardedSeriesAssembler = Arc<SeriesAssembler>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub chart_store: GuardedChartStore,
    pub series_assembler: GuardedSeriesAssembler,
}

impl FromRef<ServerState> for GuardedChartStore {
    fn from_ref(input: &ServerState) -> Self {
        input.chart_store.clone()
    }
}

impl FromRef<ServerState> for GuardedSeriesAssembler {
    fn from_ref(input: &ServerState) -> Self {
        input.series_assembler.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
