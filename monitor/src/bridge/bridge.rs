use crate::bridge::model::SpectrumModel;
use scancore::{IngestHandle, SpectrumSink};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9100))
}

/// Passive observer of the ingest loop.
///
/// Keeps the latest per-channel statistics in shared state and can host
/// a local HTTP endpoint for observers: `GET /spectrum` returns the
/// model, `GET /metrics` the session counters, and `POST /reset` zeroes
/// the running maxima through the ingest handle.
pub struct SpectrumBridge {
    state: Arc<RwLock<SpectrumModel>>,
}

impl SpectrumBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SpectrumModel::default())),
        }
    }

    pub fn snapshot(&self) -> SpectrumModel {
        self.state.read().unwrap().clone()
    }

    pub fn publish_status(&self, message: &str) {
        println!("[monitor] {}", message);
    }

    /// Serves the model over HTTP on a background thread.
    pub fn serve(&self, handle: IngestHandle) {
        let state = self.state.clone();
        thread::spawn(move || {
            let state_filter = warp::any().map(move || state.clone());
            let reset_handle = handle.clone();
            let reset_filter = warp::any().map(move || reset_handle.clone());
            let metrics_filter = warp::any().map(move || handle.clone());

            let spectrum_route = warp::path("spectrum")
                .and(warp::get())
                .and(state_filter)
                .map(|state: Arc<RwLock<SpectrumModel>>| {
                    warp::reply::json(&*state.read().unwrap())
                });

            let metrics_route = warp::path("metrics")
                .and(warp::get())
                .and(metrics_filter)
                .map(|handle: IngestHandle| warp::reply::json(&handle.metrics_snapshot()));

            let reset_route = warp::path("reset")
                .and(warp::post())
                .and(reset_filter)
                .map(|handle: IngestHandle| {
                    handle.reset_maxima();
                    warp::reply::json(&json!({"status": "reset"}))
                });

            let routes = spectrum_route.or(metrics_route).or(reset_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(bridge_bind_address()).await;
            });
        });
    }
}

impl Default for SpectrumBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumSink for SpectrumBridge {
    fn on_average_update(&self, channel_mhz: u32, average_percent: f64) {
        let mut guard = self.state.write().unwrap();
        guard.channels.entry(channel_mhz).or_default().average_percent = average_percent;
        guard.updates += 1;
    }

    fn on_max_update(&self, channel_mhz: u32, max_percent: f64) {
        let mut guard = self.state.write().unwrap();
        guard.channels.entry(channel_mhz).or_default().max_percent = max_percent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_updates_flow_into_the_model() {
        let bridge = SpectrumBridge::new();
        bridge.on_average_update(2400, 50.0);
        bridge.on_max_update(2400, 50.0);
        bridge.on_average_update(2400, 62.5);

        let model = bridge.snapshot();
        assert_eq!(model.updates, 2);
        let report = model.channels[&2400];
        assert_eq!(report.average_percent, 62.5);
        assert_eq!(report.max_percent, 50.0);
    }

    #[test]
    fn metrics_snapshot_serializes_for_the_bridge() {
        let snapshot = scancore::telemetry::MetricsSnapshot {
            lines_read: 3,
            lines_skipped: 1,
            readings_recorded: 2,
        };
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(value["lines_read"], 3);
        assert_eq!(value["lines_skipped"], 1);
        assert_eq!(value["readings_recorded"], 2);
    }

    #[test]
    fn max_reset_to_zero_keeps_last_average() {
        let bridge = SpectrumBridge::new();
        bridge.on_average_update(2410, 30.0);
        bridge.on_max_update(2410, 30.0);
        bridge.on_max_update(2410, 0.0);

        let report = bridge.snapshot().channels[&2410];
        assert_eq!(report.average_percent, 30.0);
        assert_eq!(report.max_percent, 0.0);
    }
}
