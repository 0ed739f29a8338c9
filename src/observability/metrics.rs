use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_created_total: IntCounter,
    pub delivery_accepts_total: IntCounterVec,
    pub status_updates_total: IntCounterVec,
    pub list_requests_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_created_total = IntCounter::new(
            "deliveries_created_total",
            "Total deliveries posted by businesses",
        )
        .expect("valid deliveries_created_total metric");

        let delivery_accepts_total = IntCounterVec::new(
            Opts::new(
                "delivery_accepts_total",
                "Accept attempts by outcome (won, lost, error)",
            ),
            &["outcome"],
        )
        .expect("valid delivery_accepts_total metric");

        let status_updates_total = IntCounterVec::new(
            Opts::new("status_updates_total", "Status updates by outcome"),
            &["outcome"],
        )
        .expect("valid status_updates_total metric");

        let list_requests_total = IntCounter::new(
            "list_requests_total",
            "Total delivery listing requests served",
        )
        .expect("valid list_requests_total metric");

        registry
            .register(Box::new(deliveries_created_total.clone()))
            .expect("register deliveries_created_total");
        registry
            .register(Box::new(delivery_accepts_total.clone()))
            .expect("register delivery_accepts_total");
        registry
            .register(Box::new(status_updates_total.clone()))
            .expect("register status_updates_total");
        registry
            .register(Box::new(list_requests_total.clone()))
            .expect("register list_requests_total");

        Self {
            registry,
            deliveries_created_total,
            delivery_accepts_total,
            status_updates_total,
            list_requests_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
