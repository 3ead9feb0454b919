//! Live classifier/model filtering
//!
//! [`FilterState`] is the only mutable piece of a review session. It is seeded
//! once from the loaded set and afterwards changes one entry per toggle.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::model::{Annotation, AnnotationSet};
use super::{AnnotationError, Result};

/// Which of the two filter maps a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Classifier,
    Model,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier => f.write_str("classifier"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// Enable/disable flags for classifiers and source models
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    classifier_enabled: BTreeMap<String, bool>,
    model_enabled: BTreeMap<String, bool>,
}

impl FilterState {
    /// Seed every observed classifier and model as enabled
    #[must_use]
    pub fn seed(set: &AnnotationSet) -> Self {
        Self {
            classifier_enabled: set.classifiers().iter().map(|c| (c.clone(), true)).collect(),
            model_enabled: set.models().iter().map(|m| (m.clone(), true)).collect(),
        }
    }

    /// `true` if the annotation passes both filters.
    ///
    /// Annotations without a model skip the model check. Keys that were never
    /// seeded read as disabled.
    #[must_use]
    pub fn is_active(&self, annotation: &Annotation) -> bool {
        let classifier_on = self
            .classifier_enabled
            .get(&annotation.classifier)
            .copied()
            .unwrap_or(false);

        let model_on = match annotation.model_name().filter(|m| !m.is_empty()) {
            Some(model) => self.model_enabled.get(model).copied().unwrap_or(false),
            None => true,
        };

        classifier_on && model_on
    }

    /// Active annotations from `items`, in order
    pub fn active<'a, I>(&self, items: I) -> Vec<Arc<Annotation>>
    where
        I: IntoIterator<Item = &'a Arc<Annotation>>,
    {
        items
            .into_iter()
            .filter(|a| self.is_active(a))
            .cloned()
            .collect()
    }

    /// Flip one classifier, returning its new value
    pub fn toggle_classifier(&mut self, classifier: &str) -> Result<bool> {
        flip(&mut self.classifier_enabled, FilterKind::Classifier, classifier)
    }

    /// Flip one model, returning its new value
    pub fn toggle_model(&mut self, model: &str) -> Result<bool> {
        flip(&mut self.model_enabled, FilterKind::Model, model)
    }

    pub fn set_classifier(&mut self, classifier: &str, enabled: bool) -> Result<()> {
        set(&mut self.classifier_enabled, FilterKind::Classifier, classifier, enabled)
    }

    pub fn set_model(&mut self, model: &str, enabled: bool) -> Result<()> {
        set(&mut self.model_enabled, FilterKind::Model, model, enabled)
    }

    /// Current flag for a classifier, `None` if it was never seeded
    #[must_use]
    pub fn classifier_enabled(&self, classifier: &str) -> Option<bool> {
        self.classifier_enabled.get(classifier).copied()
    }

    /// Current flag for a model, `None` if it was never seeded
    #[must_use]
    pub fn model_enabled(&self, model: &str) -> Option<bool> {
        self.model_enabled.get(model).copied()
    }

    /// All classifier flags, sorted by name
    pub fn classifiers(&self) -> impl Iterator<Item = (&str, bool)> {
        self.classifier_enabled.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// All model flags, sorted by name
    pub fn models(&self) -> impl Iterator<Item = (&str, bool)> {
        self.model_enabled.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn flip(map: &mut BTreeMap<String, bool>, kind: FilterKind, key: &str) -> Result<bool> {
    let flag = map.get_mut(key).ok_or_else(|| AnnotationError::UnknownFilterKey {
        kind,
        key: key.to_string(),
    })?;
    *flag = !*flag;
    debug!("Toggled {kind} '{key}' -> {}", *flag);
    Ok(*flag)
}

fn set(map: &mut BTreeMap<String, bool>, kind: FilterKind, key: &str, enabled: bool) -> Result<()> {
    let flag = map.get_mut(key).ok_or_else(|| AnnotationError::UnknownFilterKey {
        kind,
        key: key.to_string(),
    })?;
    *flag = enabled;
    Ok(())
}
