//! Gauge sink for the monitor
//!
//! [`PrometheusSink`] owns a dedicated [`Registry`] that the `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Label set attached to a gauge, ordered by label name
pub type Labels = BTreeMap<String, String>;

pub trait MetricsSink: Send + Sync {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64);

    /// Stop exporting the series for this label set until it is set again
    fn remove_gauge(&self, name: &str, labels: &Labels);
}

pub struct PrometheusSink {
    registry: Registry,
    gauges: Mutex<HashMap<String, GaugeVec>>,
}

impl PrometheusSink {
    pub fn new(namespace: &str) -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some(namespace.to_string()), None)?;
        Ok(Self {
            registry,
            gauges: Mutex::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode every registered gauge in text exposition format
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn gauge_vec(&self, name: &str, labels: &Labels) -> prometheus::Result<GaugeVec> {
        let mut gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(gauge) = gauges.get(name) {
            return Ok(gauge.clone());
        }

        let label_names: Vec<&str> = labels.keys().map(String::as_str).collect();
        let gauge = GaugeVec::new(Opts::new(name, format!("Node monitor gauge {}", name)), &label_names)?;
        self.registry.register(Box::new(gauge.clone()))?;
        gauges.insert(name.to_string(), gauge.clone());
        Ok(gauge)
    }
}

impl MetricsSink for PrometheusSink {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64) {
        let gauge = match self.gauge_vec(name, labels) {
            Ok(gauge) => gauge,
            Err(e) => {
                warn!("Failed to register gauge {}: {}", name, e);
                return;
            }
        };

        match gauge.get_metric_with(&label_values(labels)) {
            Ok(metric) => metric.set(value),
            Err(e) => warn!("Failed to set gauge {}: {}", name, e),
        }
    }

    fn remove_gauge(&self, name: &str, labels: &Labels) {
        let gauge = {
            let gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
            match gauges.get(name) {
                Some(gauge) => gauge.clone(),
                None => return,
            }
        };

        // A series that was never set has nothing to remove
        if let Err(e) = gauge.remove(&label_values(labels)) {
            debug!("Gauge {} has no series to remove: {}", name, e);
        }
    }
}

fn label_values(labels: &Labels) -> HashMap<&str, &str> {
    labels
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}
