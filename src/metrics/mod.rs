// metrics/mod.rs
use crate::events::{ACTION_DISPATCHED, ACTION_FAILED, DEVICE_CHANGE, EventBus};
use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Turns bus events into counters. Without an installed recorder the
/// counters are no-ops.
pub fn count_events(events: &EventBus) {
    events.subscribe(DEVICE_CHANGE, |event| {
        let device = label(&event, "device");
        counter!("powerd_device_changes_total", "device" => device).increment(1);
    });
    events.subscribe(ACTION_DISPATCHED, |event| {
        let action = label(&event, "action");
        counter!("powerd_actions_dispatched_total", "action" => action).increment(1);
    });
    events.subscribe(ACTION_FAILED, |event| {
        let action = label(&event, "action");
        counter!("powerd_action_failures_total", "action" => action).increment(1);
    });
}

fn label(event: &serde_json::Value, key: &str) -> String {
    event
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}
