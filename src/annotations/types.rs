//! Request and response bodies for the annotation endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AttributeConfig;

/// A stored annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub item_id: String,
    pub attribute: String,
    pub value: String,
    pub annotator: String,
    /// Seconds since epoch.
    pub created_at: u64,
}

/// One annotation as submitted by a client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotationInput {
    pub item_id: String,
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostAnnotations {
    pub annotations: Vec<AnnotationInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostAnnotationsResponse {
    pub stored: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttributesResponse {
    pub attributes: Vec<AttributeConfig>,
}

/// The next batch of items for one annotator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Workload {
    pub user: String,
    pub items: Vec<String>,
    /// Eligible items in total, including those beyond this batch.
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct OverallStats {
    pub total_items: usize,
    pub completed_items: usize,
    pub total_annotations: usize,
    pub annotators: usize,
    /// attribute → value → count
    pub per_attribute: BTreeMap<String, BTreeMap<String, usize>>,
}
