//! Per-invocation pipeline state

use serde_json::Value;

use crate::indexing::{Configurations, RollupEntry};
use crate::inference::{FieldSchema, SchemaPath};
use crate::reconcile::{Conflict, FlattenedField, OccurrenceTable, Suggestion};

/// Stages of a schema generation run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Infer one schema per sample
    Infer,
    /// Deep-union the per-sample schemas
    Merge,
    /// Degrade arrays with divergent item shapes
    ValidateArrays,
    /// Flatten per-sample schemas and group them by path
    Tabulate,
    /// Derive conflicts from the occurrence histograms
    Classify,
    /// Measure value repetition of unique-format fields
    Cardinality,
    /// Write resolutions onto the merged schema
    ApplyResolutions,
    /// Render conflicts as suggestions
    ComposeSuggestions,
    /// Rewrite types into the storage taxonomy
    MapTypes,
    /// Package rollup and dedup suggestions
    SuggestConfig,
}

impl PipelineStage {
    /// Get all stages in execution order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Infer,
            Self::Merge,
            Self::ValidateArrays,
            Self::Tabulate,
            Self::Classify,
            Self::Cardinality,
            Self::ApplyResolutions,
            Self::ComposeSuggestions,
            Self::MapTypes,
            Self::SuggestConfig,
        ]
    }

    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Infer => "infer",
            Self::Merge => "merge",
            Self::ValidateArrays => "validate_arrays",
            Self::Tabulate => "tabulate",
            Self::Classify => "classify",
            Self::Cardinality => "cardinality",
            Self::ApplyResolutions => "apply_resolutions",
            Self::ComposeSuggestions => "compose_suggestions",
            Self::MapTypes => "map_types",
            Self::SuggestConfig => "suggest_config",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scratch state threaded through the stages of one run.
///
/// Every run owns its own context, so concurrent runs never share state.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Samples after batch extraction
    pub samples: Vec<Value>,
    pub per_sample: Vec<FieldSchema>,
    /// Merged schema; finalized once every stage has run
    pub merged: Option<FieldSchema>,
    pub degraded_arrays: Vec<SchemaPath>,
    pub flattened: Vec<Vec<FlattenedField>>,
    pub occurrences: OccurrenceTable,
    pub conflicts: Vec<Conflict>,
    pub rollup: Vec<RollupEntry>,
    pub suggestions: Vec<Suggestion>,
    pub configurations: Option<Configurations>,
}

impl PipelineContext {
    pub fn new(samples: Vec<Value>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
