/// Source label stamped on canonical rows produced from county dashboards.
pub const DASHBOARD_SOURCE: &str = "county level dashboards";

/// Default directory holding per-county mode configuration files.
pub const DEFAULT_REGISTRY_DIR: &str = "registry/counties";
