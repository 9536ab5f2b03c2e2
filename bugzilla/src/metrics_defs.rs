//! Metrics definitions for the Bugzilla client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RPC_DURATION: MetricDef = MetricDef {
    name: "bugzilla.rpc.duration",
    metric_type: MetricType::Histogram,
    description: "Duration of a Bugzilla remote procedure call in seconds. Tagged with method.",
};

pub const RPC_FAILURES: MetricDef = MetricDef {
    name: "bugzilla.rpc.failures",
    metric_type: MetricType::Counter,
    description: "Number of failed Bugzilla remote procedure calls. Tagged with method.",
};

pub const ALL_METRICS: &[MetricDef] = &[RPC_DURATION, RPC_FAILURES];
