//! Annotation storage and snapshot persistence.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::annotations::types::{Annotation, OverallStats, Workload};
use crate::config::AnnotationsConfig;
use crate::observability::metrics;

/// Thread-safe annotation storage keyed by item id.
#[derive(Clone, Default)]
pub struct AnnotationStore {
    inner: Arc<DashMap<String, Vec<Annotation>>>,
    snapshot_path: Option<PathBuf>,
}

impl AnnotationStore {
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            snapshot_path,
        }
    }

    /// Load from a snapshot file if it exists; the store keeps saving to `path`.
    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<String, Vec<Annotation>> = serde_json::from_reader(reader)?;
            for (item, annotations) in map {
                store.inner.insert(item, annotations);
            }
            tracing::info!(
                path = %path.display(),
                annotations = store.len(),
                "Loaded annotation snapshot"
            );
        }
        Ok(store)
    }

    /// Write the snapshot file. No-op without a snapshot path.
    ///
    /// The snapshot is written next to the target and renamed over it, so an
    /// interrupted save leaves the previous snapshot intact.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.snapshot_path {
            let map: BTreeMap<String, Vec<Annotation>> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();

            let tmp = path.with_extension("json.tmp");
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            drop(writer);
            fs::rename(&tmp, path)?;

            tracing::info!(path = %path.display(), annotations = self.len(), "Saved annotation snapshot");
        }
        Ok(())
    }

    /// Append already validated annotations.
    pub fn insert_batch(&self, annotations: Vec<Annotation>) -> usize {
        let count = annotations.len();
        for annotation in annotations {
            self.inner
                .entry(annotation.item_id.clone())
                .or_default()
                .push(annotation);
        }
        metrics::record_annotations_stored(count);
        count
    }

    /// Total number of stored annotations.
    pub fn len(&self) -> usize {
        self.inner.iter().map(|r| r.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn annotations_for(&self, item_id: &str) -> Vec<Annotation> {
        self.inner
            .get(item_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Whether `annotator` already labelled `attribute` on `item_id`.
    pub fn has_annotation(&self, item_id: &str, attribute: &str, annotator: &str) -> bool {
        self.inner
            .get(item_id)
            .map(|r| {
                r.value()
                    .iter()
                    .any(|a| a.attribute == attribute && a.annotator == annotator)
            })
            .unwrap_or(false)
    }

    fn annotators_of(&self, item_id: &str) -> HashSet<String> {
        self.inner
            .get(item_id)
            .map(|r| r.value().iter().map(|a| a.annotator.clone()).collect())
            .unwrap_or_default()
    }

    /// Items `user` should annotate next, in configured order.
    pub fn workload(&self, config: &AnnotationsConfig, user: &str) -> Workload {
        let eligible: Vec<&String> = config
            .items
            .iter()
            .filter(|item| {
                let annotators = self.annotators_of(item);
                !annotators.contains(user) && annotators.len() < config.annotations_per_item
            })
            .collect();

        Workload {
            user: user.to_string(),
            items: eligible
                .iter()
                .take(config.batch_size)
                .map(|item| item.to_string())
                .collect(),
            remaining: eligible.len(),
        }
    }

    pub fn overall_stats(&self, config: &AnnotationsConfig) -> OverallStats {
        let mut per_attribute: BTreeMap<String, BTreeMap<String, usize>> = config
            .attributes
            .iter()
            .map(|attribute| {
                let values = attribute.values.iter().map(|v| (v.clone(), 0)).collect();
                (attribute.name.clone(), values)
            })
            .collect();

        let mut annotators = HashSet::new();
        let mut total_annotations = 0;
        for entry in self.inner.iter() {
            for annotation in entry.value() {
                total_annotations += 1;
                annotators.insert(annotation.annotator.clone());
                *per_attribute
                    .entry(annotation.attribute.clone())
                    .or_default()
                    .entry(annotation.value.clone())
                    .or_default() += 1;
            }
        }

        let completed_items = config
            .items
            .iter()
            .filter(|item| self.annotators_of(item).len() >= config.annotations_per_item)
            .count();

        OverallStats {
            total_items: config.items.len(),
            completed_items,
            total_annotations,
            annotators: annotators.len(),
            per_attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeConfig;

    fn config() -> AnnotationsConfig {
        AnnotationsConfig {
            attributes: vec![AttributeConfig {
                name: "color".to_string(),
                description: String::new(),
                values: vec!["red".to_string(), "blue".to_string()],
            }],
            items: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            batch_size: 2,
            annotations_per_item: 2,
            snapshot_path: None,
        }
    }

    fn annotation(item: &str, user: &str, value: &str) -> Annotation {
        Annotation {
            item_id: item.to_string(),
            attribute: "color".to_string(),
            value: value.to_string(),
            annotator: user.to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn test_workload_skips_own_and_completed_items() {
        let store = AnnotationStore::new(None);
        let config = config();

        let fresh = store.workload(&config, "alice");
        assert_eq!(fresh.items, vec!["a", "b"]);
        assert_eq!(fresh.remaining, 3);

        store.insert_batch(vec![
            annotation("a", "alice", "red"),
            annotation("b", "bob", "red"),
            annotation("b", "carol", "blue"),
        ]);

        let workload = store.workload(&config, "alice");
        assert_eq!(workload.items, vec!["c"]);
        assert_eq!(workload.remaining, 1);

        let workload = store.workload(&config, "dave");
        assert_eq!(workload.items, vec!["a", "c"]);
        assert_eq!(workload.remaining, 2);
    }

    #[test]
    fn test_overall_stats() {
        let store = AnnotationStore::new(None);
        let config = config();
        store.insert_batch(vec![
            annotation("a", "alice", "red"),
            annotation("a", "bob", "red"),
            annotation("b", "bob", "blue"),
        ]);

        let stats = store.overall_stats(&config);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.completed_items, 1);
        assert_eq!(stats.total_annotations, 3);
        assert_eq!(stats.annotators, 2);
        assert_eq!(stats.per_attribute["color"]["red"], 2);
        assert_eq!(stats.per_attribute["color"]["blue"], 1);
    }

    #[test]
    fn test_stats_list_every_configured_value() {
        let stats = AnnotationStore::new(None).overall_stats(&config());
        assert_eq!(stats.total_annotations, 0);
        assert_eq!(stats.per_attribute["color"].len(), 2);
        assert_eq!(stats.per_attribute["color"]["blue"], 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let store = AnnotationStore::load_from_file(&path).unwrap();
        assert!(store.is_empty());
        store.insert_batch(vec![annotation("a", "alice", "red")]);
        store.save_to_file().unwrap();

        let loaded = AnnotationStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.annotations_for("a"), vec![annotation("a", "alice", "red")]);
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let store = AnnotationStore::load_from_file(&path).unwrap();
        store.insert_batch(vec![annotation("a", "alice", "red")]);
        store.save_to_file().unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        // A directory in the temp file's place makes the next write fail.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();
        store.insert_batch(vec![annotation("b", "bob", "blue")]);
        assert!(store.save_to_file().is_err());

        let loaded = AnnotationStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.annotations_for("a"), vec![annotation("a", "alice", "red")]);
    }

    #[test]
    fn test_has_annotation() {
        let store = AnnotationStore::new(None);
        store.insert_batch(vec![annotation("a", "alice", "red")]);

        assert!(store.has_annotation("a", "color", "alice"));
        assert!(!store.has_annotation("a", "color", "bob"));
        assert!(!store.has_annotation("b", "color", "alice"));
    }

    #[test]
    fn test_save_without_path_is_noop() {
        let store = AnnotationStore::new(None);
        store.insert_batch(vec![annotation("a", "alice", "red")]);
        assert!(store.save_to_file().is_ok());
    }
}
