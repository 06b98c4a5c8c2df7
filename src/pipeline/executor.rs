//! Schema generation pipeline

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span};

use super::context::{PipelineContext, PipelineStage};
use crate::indexing::{CardinalityAnalyser, Configurations, suggest_config};
use crate::inference::{
    FieldSchema, GeneratorConfig, InferenceResult, SampleConfig, SchemaInferrer, merge_schemas,
    prepare_samples,
};
use crate::mapping::{
    DataMappings, DenormField, FieldDescriptor, MappingResult, NamingConvention,
    TransformationField, generate_ingestion_fields, map_types,
};
use crate::reconcile::{
    Conflict, OccurrenceTable, Suggestion, apply_resolutions, classify_conflicts,
    compose_suggestions, flatten_schema, validate_arrays,
};

/// Result of a schema generation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchema {
    /// Type-mapped JSON Schema of the dataset
    pub schema: Value,
    pub configurations: Configurations,
    pub data_mappings: DataMappings,
    /// Conflicts found across the samples, in path order
    #[serde(skip)]
    pub conflicts: Vec<Conflict>,
    #[serde(skip)]
    pub suggestions: Vec<Suggestion>,
}

impl GeneratedSchema {
    /// Flatten the generated schema into ingestion field descriptors
    pub fn ingestion_fields(
        &self,
        transformations: &[TransformationField],
        denorms: &[DenormField],
        naming: NamingConvention,
    ) -> MappingResult<Vec<FieldDescriptor>> {
        generate_ingestion_fields(&self.schema, transformations, denorms, naming)
    }
}

/// Schema generation engine.
///
/// Holds only read-only configuration; every call to [`SchemaGenerator::generate`]
/// works on its own [`PipelineContext`].
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    config: GeneratorConfig,
    mappings: DataMappings,
}

impl SchemaGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            mappings: DataMappings::standard(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the schema, conflicts, suggestions and configuration for a
    /// set of samples
    pub fn generate(
        &self,
        samples: &[Value],
        sample_config: &SampleConfig,
    ) -> InferenceResult<GeneratedSchema> {
        let context = self.run(samples, sample_config)?;

        let schema = context
            .merged
            .as_ref()
            .map(FieldSchema::to_json_schema)
            .unwrap_or(Value::Null);
        let configurations = context
            .configurations
            .unwrap_or_else(|| suggest_config(&context.conflicts, &context.rollup));

        Ok(GeneratedSchema {
            schema,
            configurations,
            data_mappings: self.mappings.clone(),
            conflicts: context.conflicts,
            suggestions: context.suggestions,
        })
    }

    /// Run every stage and return the final context
    pub fn run(
        &self,
        samples: &[Value],
        sample_config: &SampleConfig,
    ) -> InferenceResult<PipelineContext> {
        let _span = info_span!(
            "generate_schema",
            dataset = %sample_config.dataset,
            samples = samples.len(),
            batch = sample_config.is_batch
        )
        .entered();

        let mut context = PipelineContext::new(prepare_samples(samples, sample_config)?);
        info!(
            dataset = %sample_config.dataset,
            samples = context.sample_count(),
            "Starting schema generation"
        );

        for stage in PipelineStage::all() {
            self.run_stage(stage, &mut context)?;
        }

        info!(
            dataset = %sample_config.dataset,
            conflicts = context.conflicts.len(),
            suggestions = context.suggestions.len(),
            rollup_fields = context.rollup.len(),
            "Schema generation completed"
        );

        Ok(context)
    }

    fn run_stage(
        &self,
        stage: PipelineStage,
        context: &mut PipelineContext,
    ) -> InferenceResult<()> {
        match stage {
            PipelineStage::Infer => {
                let inferrer = SchemaInferrer::with_config(self.config.clone());
                context.per_sample = inferrer.infer_samples(&context.samples)?;
                debug!(stage = stage.name(), schemas = context.per_sample.len(), "Stage completed");
            }
            PipelineStage::Merge => {
                context.merged = merge_schemas(&context.per_sample);
                debug!(stage = stage.name(), "Stage completed");
            }
            PipelineStage::ValidateArrays => {
                if let Some(merged) = context.merged.as_mut() {
                    context.degraded_arrays = validate_arrays(&mut context.per_sample, merged);
                }
                debug!(
                    stage = stage.name(),
                    degraded = context.degraded_arrays.len(),
                    "Stage completed"
                );
            }
            PipelineStage::Tabulate => {
                context.flattened = context.per_sample.iter().map(flatten_schema).collect();
                context.occurrences = OccurrenceTable::tabulate(&context.flattened);
                debug!(stage = stage.name(), paths = context.occurrences.len(), "Stage completed");
            }
            PipelineStage::Classify => {
                context.conflicts = classify_conflicts(&context.occurrences);
                debug!(
                    stage = stage.name(),
                    conflicts = context.conflicts.len(),
                    "Stage completed"
                );
            }
            PipelineStage::Cardinality => {
                if let Some(merged) = context.merged.as_ref() {
                    let analyser = CardinalityAnalyser::from_config(&self.config);
                    context.rollup = analyser.analyse(&context.samples, merged);
                }
                debug!(stage = stage.name(), fields = context.rollup.len(), "Stage completed");
            }
            PipelineStage::ApplyResolutions => {
                if let Some(merged) = context.merged.as_mut() {
                    apply_resolutions(
                        merged,
                        &context.conflicts,
                        &context.per_sample,
                        &self.mappings,
                    );
                }
                debug!(stage = stage.name(), "Stage completed");
            }
            PipelineStage::ComposeSuggestions => {
                if let Some(merged) = context.merged.as_mut() {
                    context.suggestions =
                        compose_suggestions(merged, &context.conflicts, &self.mappings);
                }
                debug!(
                    stage = stage.name(),
                    suggestions = context.suggestions.len(),
                    "Stage completed"
                );
            }
            PipelineStage::MapTypes => {
                if let Some(merged) = context.merged.as_mut() {
                    map_types(merged);
                }
                debug!(stage = stage.name(), "Stage completed");
            }
            PipelineStage::SuggestConfig => {
                let configurations = suggest_config(&context.conflicts, &context.rollup);
                debug!(
                    stage = stage.name(),
                    dedup_keys = configurations.processing.dedup_keys.len(),
                    "Stage completed"
                );
                context.configurations = Some(configurations);
            }
        }
        Ok(())
    }
}
