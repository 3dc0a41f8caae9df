//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the annotation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Session cookie and lifetime.
    pub session: SessionConfig,

    /// Attribute catalog, items and workload sizing.
    pub annotations: AnnotationsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    pub cookie_name: String,

    /// Session lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            ttl_secs: 24 * 60 * 60,
        }
    }
}

/// A labelling dimension annotators choose a value for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttributeConfig {
    /// Unique attribute name.
    pub name: String,

    /// Human readable description shown to annotators.
    #[serde(default)]
    pub description: String,

    /// Allowed values.
    pub values: Vec<String>,
}

/// Annotation catalog and workload sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    /// Attributes annotators label items with.
    pub attributes: Vec<AttributeConfig>,

    /// Item ids to annotate, in the order they are handed out.
    pub items: Vec<String>,

    /// Maximum number of items returned per workload request.
    pub batch_size: usize,

    /// Distinct annotators required before an item counts as complete.
    pub annotations_per_item: usize,

    /// Optional JSON snapshot file, loaded at startup and written on shutdown.
    pub snapshot_path: Option<String>,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            attributes: vec![AttributeConfig {
                name: "sentiment".to_string(),
                description: "Overall tone of the item".to_string(),
                values: vec![
                    "positive".to_string(),
                    "neutral".to_string(),
                    "negative".to_string(),
                ],
            }],
            items: (1..=20).map(|i| format!("item-{i}")).collect(),
            batch_size: 5,
            annotations_per_item: 3,
            snapshot_path: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
