use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "content.request.duration",
    metric_type: MetricType::Histogram,
    description: "Content request duration in seconds. Tagged with status.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "content.requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of content requests currently being processed",
};

pub const PROVIDER_FAILURES: MetricDef = MetricDef {
    name: "content.provider.failures",
    metric_type: MetricType::Counter,
    description: "Failed provider fetches. Tagged with provider.",
};

pub const FALLBACK_USED: MetricDef = MetricDef {
    name: "content.fallback.used",
    metric_type: MetricType::Counter,
    description: "Positions served by a fallback provider. Tagged with the serving provider.",
};

pub const POSITIONS_TRUNCATED: MetricDef = MetricDef {
    name: "content.positions.truncated",
    metric_type: MetricType::Counter,
    description: "Requested positions dropped at or after the first unrecoverable position",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REQUESTS_INFLIGHT,
    PROVIDER_FAILURES,
    FALLBACK_USED,
    POSITIONS_TRUNCATED,
];
