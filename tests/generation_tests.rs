//! End-to-end tests for schema generation
//!
//! Runs the full pipeline over small sample sets and checks the rendered
//! schema, conflicts and configuration suggestions.

use serde_json::{Value, json};

use dataset_schema_core::inference::{GeneratorConfig, SampleConfig, SchemaGenerationError};
use dataset_schema_core::mapping::{DenormField, FieldKind, NamingConvention, TransformationField};
use dataset_schema_core::pipeline::{GeneratedSchema, SchemaGenerator, generate_schema};
use dataset_schema_core::reconcile::{Conflict, ConflictKind, Resolution, Severity};
use dataset_schema_core::JsonType;

const UUID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
const UUID_B: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

fn generate(samples: &[Value]) -> GeneratedSchema {
    generate_schema(samples, &SampleConfig::new("test")).expect("generation failed")
}

fn conflicts_of(generated: &GeneratedSchema, kind: ConflictKind) -> Vec<&Conflict> {
    generated.conflicts.iter().filter(|c| c.kind == kind).collect()
}

#[test]
fn test_type_conflict_between_integer_and_string() {
    let generated = generate(&[json!({"a": 1}), json!({"a": "1"})]);

    let conflicts = conflicts_of(&generated, ConflictKind::DataType);
    assert_eq!(conflicts.len(), 1);
    let conflict = conflicts[0];
    assert_eq!(conflict.display_path(), "a");
    assert!(conflict.values.contains(&"integer".to_string()));
    assert!(conflict.values.contains(&"string".to_string()));
    assert_eq!(conflict.severity, Severity::MustFix);

    let rendered = serde_json::to_value(conflict).unwrap();
    assert_eq!(rendered["type"], "DATA_TYPE");
    assert_eq!(rendered["path"], "a");
    assert_eq!(rendered["absolutePath"], "$.properties.a");
    assert_eq!(rendered["conflicts"], json!({"integer": 1, "string": 1}));
    assert_eq!(rendered["resolution"]["type"], "DATA_TYPE");
}

#[test]
fn test_null_only_field() {
    let generated = generate(&[json!({"a": null}), json!({"a": null})]);

    let conflicts = conflicts_of(&generated, ConflictKind::NullField);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].display_path(), "a");
    assert_eq!(conflicts[0].resolution, Resolution::NullField);
    assert!(conflicts_of(&generated, ConflictKind::DataType).is_empty());

    let a = &generated.schema["properties"]["a"];
    assert_eq!(a["type"], "null");
    assert!(a["oneof"].as_array().is_some_and(|types| types.len() > 1));
    assert!(a.get("arrival_format").is_none());
}

#[test]
fn test_uuid_rollup_threshold() {
    let config = GeneratorConfig::builder().rollup_ratio(60.0).build();
    let samples = vec![json!({"id": UUID_A}), json!({"id": UUID_B}), json!({"id": UUID_A})];
    let generated = SchemaGenerator::new(config)
        .generate(&samples, &SampleConfig::new("users"))
        .unwrap();

    let rollup = &generated.configurations.index_configuration.rollup_suggestions;
    assert_eq!(rollup.len(), 1);
    assert_eq!(rollup[0].path, "id");
    assert!(rollup[0].index);
    assert!((rollup[0].cardinality - 33.33).abs() < 0.01);

    // Indexed fields are not dedup candidates
    assert!(generated.configurations.processing.dedup_keys.is_empty());
}

#[test]
fn test_distinct_uuids_become_dedup_keys() {
    let samples = vec![json!({"id": UUID_A}), json!({"id": UUID_B})];
    let generated = generate(&samples);

    let keys = &generated.configurations.processing.dedup_keys;
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].path, "id");
    assert_eq!(keys[0].cardinality, 50.0);
}

#[test]
fn test_datetime_mapped_to_storage_type() {
    let generated = generate(&[json!({"ts": "2023-07-03 00:00:00"})]);

    let ts = &generated.schema["properties"]["ts"];
    assert_eq!(ts["type"], "string");
    assert_eq!(ts["arrival_format"], "text");
    assert_eq!(ts["data_type"], "date-time");
    assert!(ts.get("format").is_none());
}

#[test]
fn test_nested_type_conflict_sets_oneof() {
    let generated = generate(&[json!({"a": {"b": 1}}), json!({"a": {"b": "x"}})]);

    let conflicts = conflicts_of(&generated, ConflictKind::DataType);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].display_path(), "a.b");

    let b = &generated.schema["properties"]["a"]["properties"]["b"];
    assert_eq!(b["oneof"], json!([{"type": "number"}, {"type": "string"}]));
    assert!(b["suggestions"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_generation_is_deterministic() {
    let samples = vec![
        json!({"id": UUID_A, "n": 1, "tags": ["a"], "ctx": {"ip": "10.0.0.1"}}),
        json!({"id": UUID_B, "n": "two", "tags": [1], "ctx": {"ip": "10.0.0.2", "extra": null}}),
        json!({"id": UUID_A, "n": 3.5, "when": "2024-01-15T10:30:00Z"}),
    ];

    let first = serde_json::to_string(&generate(&samples)).unwrap();
    let second = serde_json::to_string(&generate(&samples)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_histogram_counts_bounded_by_samples() {
    let samples = vec![
        json!({"a": 1, "o": {"x": true}}),
        json!({"a": "s", "o": {"x": 1}}),
        json!({"a": null}),
        json!({"b": [1, 2]}),
    ];
    let generated = generate(&samples);
    assert!(!generated.conflicts.is_empty());

    for conflict in &generated.conflicts {
        let total: usize = conflict.histogram.values().sum();
        assert!(total <= samples.len(), "{} counted {}", conflict.display_path(), total);
    }
}

#[test]
fn test_null_never_a_type_candidate() {
    let generated = generate(&[json!({"a": null}), json!({"a": 1}), json!({"a": "x"})]);

    assert!(conflicts_of(&generated, ConflictKind::NullField).is_empty());
    let conflicts = conflicts_of(&generated, ConflictKind::DataType);
    assert_eq!(conflicts.len(), 1);
    assert!(!conflicts[0].values.contains(&"null".to_string()));
    assert_eq!(conflicts[0].histogram.get("null"), Some(&1));
    assert!(matches!(conflicts[0].resolution, Resolution::DataType(t) if t != JsonType::Null));
}

#[test]
fn test_uniform_samples_have_no_conflicts() {
    let generated = generate(&[
        json!({"a": 1, "b": "x", "c": {"d": false}}),
        json!({"a": 2, "b": "y", "c": {"d": true}}),
    ]);

    assert!(generated.conflicts.is_empty());
    assert!(generated.suggestions.is_empty());
    assert_eq!(generated.schema["required"], json!(["a", "b", "c"]));
}

#[test]
fn test_optional_fields_follow_their_container() {
    let generated = generate(&[
        json!({"o": {"x": 1}}),
        json!({"o": {"x": 2}}),
        json!({"p": 1}),
    ]);

    let optional: Vec<String> = conflicts_of(&generated, ConflictKind::OptionalType)
        .iter()
        .map(|c| c.display_path())
        .collect();
    assert_eq!(optional, vec!["o".to_string(), "p".to_string()]);

    // `x` appeared in every sample that carried `o`
    assert_eq!(generated.schema["properties"]["o"]["required"], json!(["x"]));
    assert!(generated.schema.get("required").is_none());
}

#[test]
fn test_optional_histogram() {
    let generated = generate(&[json!({"a": 1, "b": 1}), json!({"a": 2})]);

    let optional = conflicts_of(&generated, ConflictKind::OptionalType);
    assert_eq!(optional.len(), 1);
    assert_eq!(optional[0].property, "b");
    assert_eq!(optional[0].resolution, Resolution::Optional(false));
    assert_eq!(optional[0].histogram.get("present"), Some(&1));
    assert_eq!(optional[0].histogram.get("absent"), Some(&1));
    assert_eq!(generated.schema["required"], json!(["a"]));
}

#[test]
fn test_mixed_array_items_degrade() {
    let generated = generate(&[json!({"xs": [1, 2]}), json!({"xs": ["a"]})]);

    let xs = &generated.schema["properties"]["xs"];
    assert_eq!(xs["type"], "array");
    assert_eq!(xs["additionalProperties"], false);
    assert!(xs.get("items").is_none());
    assert_eq!(xs["data_type"], "array");
}

#[test]
fn test_mixed_elements_within_one_sample() {
    let generated = generate(&[json!({"xs": [{"a": 1}, {"a": "x"}]})]);

    let conflicts = conflicts_of(&generated, ConflictKind::DataType);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].display_path(), "xs[*].a");
    assert_eq!(conflicts[0].histogram.get("integer"), Some(&1));
    assert_eq!(conflicts[0].histogram.get("string"), Some(&1));

    let a = &generated.schema["properties"]["xs"]["items"]["properties"]["a"];
    assert_eq!(a["oneof"], json!([{"type": "number"}, {"type": "string"}]));
    assert!(a["suggestions"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_element_keys_required_only_when_shared() {
    let generated = generate(&[json!({"xs": [{"a": 1, "c": true}, {"b": 2, "c": false}]})]);

    let items = &generated.schema["properties"]["xs"]["items"];
    assert_eq!(items["required"], json!(["c"]));
    assert!(items["properties"]["a"].is_object());
    assert!(items["properties"]["b"].is_object());
}

#[test]
fn test_cardinality_stays_in_range() {
    let samples: Vec<Value> = (0..9)
        .map(|i| json!({"site": format!("https://site{}.example.com", i % 4)}))
        .collect();

    for ratio in [0.0, 25.0, 50.0, 100.0] {
        let config = GeneratorConfig::builder().rollup_ratio(ratio).build();
        let generated = SchemaGenerator::new(config)
            .generate(&samples, &SampleConfig::new("sites"))
            .unwrap();
        for entry in &generated.configurations.index_configuration.rollup_suggestions {
            assert!((0.0..=100.0).contains(&entry.cardinality));
        }
    }
}

#[test]
fn test_batch_extraction() {
    let envelopes = vec![
        json!({"meta": {"events": [{"id": 1}, {"id": 2}]}}),
        json!({"meta": {"events": [{"id": 3}]}}),
    ];
    let context = SchemaGenerator::default()
        .run(&envelopes, &SampleConfig::batch("d", "meta.events"))
        .unwrap();
    assert_eq!(context.sample_count(), 3);
    assert!(context.conflicts.is_empty());
}

#[test]
fn test_request_errors_are_client_errors() {
    let generator = SchemaGenerator::default();

    let no_samples = generator.generate(&[], &SampleConfig::new("d")).unwrap_err();
    assert_eq!(no_samples, SchemaGenerationError::NoSamples);

    let mut missing_key = SampleConfig::new("d");
    missing_key.is_batch = true;
    let missing_config = generator.generate(&[json!({})], &missing_key).unwrap_err();
    assert!(matches!(missing_config, SchemaGenerationError::MissingExtractionConfig { .. }));

    let absent = generator
        .generate(&[json!({"other": []})], &SampleConfig::batch("d", "events"))
        .unwrap_err();
    assert!(matches!(absent, SchemaGenerationError::MissingExtractionKey { sample: 0, .. }));

    let scalar = generator
        .generate(&[json!({"events": "nope"})], &SampleConfig::batch("d", "events"))
        .unwrap_err();
    assert!(matches!(scalar, SchemaGenerationError::NotExtractable { .. }));

    let not_object = generator.generate(&[json!([1, 2])], &SampleConfig::new("d")).unwrap_err();
    assert!(matches!(not_object, SchemaGenerationError::InvalidStructure(_)));

    for err in [no_samples, missing_config, absent, scalar, not_object] {
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn test_ingestion_fields_end_to_end() {
    let generated = generate(&[json!({
        "id": 7,
        "user": {"email": "a@example.com", "geo": {"country": "DE"}},
        "tags": ["x"]
    })]);

    let transformations = vec![
        TransformationField::new("email_hash", "sha256(user.email)").with_data_type("string"),
    ];
    let denorms = vec![DenormField::new(
        "account",
        json!({"type": "object", "properties": {"tier": {"type": "string"}}}),
    )];

    let fields = generated
        .ingestion_fields(&transformations, &denorms, NamingConvention::Dotted)
        .unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["account.tier", "email_hash", "id", "tags", "user.email", "user.geo.country"]
    );

    let country = fields.iter().find(|f| f.name == "user.geo.country").unwrap();
    assert_eq!(country.expr, "$.user.geo.country");
    assert_eq!(country.kind, FieldKind::Path);

    let hash = fields.iter().find(|f| f.name == "email_hash").unwrap();
    assert_eq!(hash.kind, FieldKind::Expr);
    assert_eq!(hash.expr, "$.email_hash");

    let tags = fields.iter().find(|f| f.name == "tags").unwrap();
    assert_eq!(tags.data_type.as_deref(), Some("array"));
}

#[test]
fn test_generated_document_shape() {
    let generated = generate(&[json!({"a": 1})]);
    let document = serde_json::to_value(&generated).unwrap();

    assert_eq!(document["schema"]["$schema"], "https://json-schema.org/draft/2020-12/schema");
    assert_eq!(document["configurations"]["processing"]["dropDuplicates"], json!(["Yes", "No"]));
    assert!(document["dataMappings"]["text"].is_object());
}
