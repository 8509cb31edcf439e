use prometheus::{Counter, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub claims_total: IntCounterVec,
    pub transitions_total: IntCounterVec,
    pub orders_in_queue: IntGauge,
    pub wallet_credited_total: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let claims_total = IntCounterVec::new(
            Opts::new("claims_total", "Total claim attempts by outcome"),
            &["outcome"],
        )
        .expect("valid claims_total metric");

        let transitions_total = IntCounterVec::new(
            Opts::new("transitions_total", "Total committed status transitions"),
            &["status"],
        )
        .expect("valid transitions_total metric");

        let orders_in_queue = IntGauge::new(
            "orders_in_queue",
            "Current number of orders in the dispatch queue",
        )
        .expect("valid orders_in_queue metric");

        let wallet_credited_total = Counter::new(
            "wallet_credited_total",
            "Total amount credited to wallets in rupees",
        )
        .expect("valid wallet_credited_total metric");

        registry
            .register(Box::new(claims_total.clone()))
            .expect("register claims_total");
        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(orders_in_queue.clone()))
            .expect("register orders_in_queue");
        registry
            .register(Box::new(wallet_credited_total.clone()))
            .expect("register wallet_credited_total");

        Self {
            registry,
            claims_total,
            transitions_total,
            orders_in_queue,
            wallet_credited_total,
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
