//! Configuration validation.
//!
//! Serde handles syntax; this module checks what serde cannot: value ranges,
//! uniqueness of attribute and item ids, and parseable addresses. All errors
//! are collected rather than stopping at the first one.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty() || !cookie.chars().all(is_cookie_name_char) {
        errors.push(ValidationError::new(
            "session.cookie_name",
            "must be a non-empty token (letters, digits, '-', '_', '.')",
        ));
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::new("session.ttl_secs", "must be greater than 0"));
    }

    let annotations = &config.annotations;
    if annotations.attributes.is_empty() {
        errors.push(ValidationError::new("annotations.attributes", "at least one attribute is required"));
    }
    let mut names = HashSet::new();
    for attribute in &annotations.attributes {
        let field = format!("annotations.attributes.{}", attribute.name);
        if attribute.name.trim().is_empty() {
            errors.push(ValidationError::new("annotations.attributes", "attribute name must not be empty"));
        } else if !names.insert(attribute.name.as_str()) {
            errors.push(ValidationError::new(field.clone(), "duplicate attribute name"));
        }
        if attribute.values.is_empty() {
            errors.push(ValidationError::new(field.clone(), "at least one value is required"));
        }
        let mut values = HashSet::new();
        for value in &attribute.values {
            if !values.insert(value.as_str()) {
                errors.push(ValidationError::new(field.clone(), format!("duplicate value '{value}'")));
            }
        }
    }

    let mut items = HashSet::new();
    for item in &annotations.items {
        if item.trim().is_empty() {
            errors.push(ValidationError::new("annotations.items", "item id must not be empty"));
        } else if !items.insert(item.as_str()) {
            errors.push(ValidationError::new("annotations.items", format!("duplicate item '{item}'")));
        }
    }

    if annotations.batch_size == 0 {
        errors.push(ValidationError::new("annotations.batch_size", "must be greater than 0"));
    }
    if annotations.annotations_per_item == 0 {
        errors.push(ValidationError::new("annotations.annotations_per_item", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_cookie_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
