use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "relay.requests",
    metric_type: MetricType::Counter,
    description: "Relay invocations. Tagged with outcome.",
};

pub const DELIVERIES: MetricDef = MetricDef {
    name: "relay.delivery",
    metric_type: MetricType::Counter,
    description: "Per-destination deliveries. Tagged with outcome.",
};

pub const DELIVERY_DURATION: MetricDef = MetricDef {
    name: "relay.delivery.duration",
    metric_type: MetricType::Histogram,
    description: "Time for one messaging API call in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUESTS, DELIVERIES, DELIVERY_DURATION];
