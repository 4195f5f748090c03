//! Customer Record Tests
//!
//! End-to-end checks against the customer fixture schema:
//! - Records are built and validated through RecordBuilder
//! - Unset fields take declared defaults
//! - Missing required fields and unknown fields are rejected
//! - Written records read back identical to what was appended

use aerorecord::{
    ContainerReader, ContainerWriter, FieldType, Record, RecordBuilder, RecordError, Schema, Value,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn customer_schema() -> Arc<Schema> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/customer.json");
    Arc::new(Schema::from_file(&path).expect("fixture schema must parse"))
}

fn john(schema: &Arc<Schema>) -> RecordBuilder {
    let mut builder = RecordBuilder::new(schema.clone());
    builder
        .set("uid", "c-0001")
        .unwrap()
        .set("first_name", "John")
        .unwrap()
        .set("last_name", "Smith")
        .unwrap()
        .set("age", 42)
        .unwrap()
        .set("height", 181.5f32)
        .unwrap()
        .set("weight", 82.0f32)
        .unwrap()
        .set("creation_ts", Value::TimestampMillis(1_700_000_000_000))
        .unwrap();
    builder
}

fn jane(schema: &Arc<Schema>) -> Record {
    let mut builder = RecordBuilder::new(schema.clone());
    builder
        .set("uid", "c-0002")
        .unwrap()
        .set("first_name", "Jane")
        .unwrap()
        .set("last_name", "Doe")
        .unwrap()
        .set("age", 35)
        .unwrap()
        .set("height", 165.0f32)
        .unwrap()
        .set("weight", 58.5f32)
        .unwrap()
        .set("automated_email", false)
        .unwrap()
        .set("emails", vec!["jane@example.com", "jd@example.org"])
        .unwrap()
        // int64 promotes to timestamp-millis
        .set("creation_ts", 1_700_000_123_456i64)
        .unwrap()
        .set("nickname", "JD")
        .unwrap();
    builder.build().unwrap()
}

// =============================================================================
// Schema Fixture
// =============================================================================

#[test]
fn test_fixture_resolves_aliases() {
    let schema = customer_schema();

    assert_eq!(schema.full_name(), "com.example.Customer");
    assert_eq!(schema.len(), 10);
    assert_eq!(schema.field("age").unwrap().field_type, FieldType::Int32);
    assert_eq!(schema.field("height").unwrap().field_type, FieldType::Float32);
    assert_eq!(schema.field("emails").unwrap().field_type, FieldType::StringArray);
    assert_eq!(
        schema.field("creation_ts").unwrap().field_type,
        FieldType::TimestampMillis
    );
    assert!(schema.field("nickname").unwrap().optional);
}

// =============================================================================
// Building Records
// =============================================================================

#[test]
fn test_defaults_fill_unset_fields() {
    let schema = customer_schema();
    let record = john(&schema).build().unwrap();

    assert_eq!(record.get("automated_email"), Some(&Value::Boolean(true)));
    assert_eq!(record.get("emails"), Some(&Value::StringArray(vec![])));
    assert_eq!(record.get("nickname"), Some(&Value::Null));
    assert_eq!(record.get("first_name").and_then(Value::as_str), Some("John"));
}

#[test]
fn test_missing_last_name_fails_validation() {
    let schema = customer_schema();
    let mut builder = john(&schema);
    builder.unset("last_name").unwrap();

    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        RecordError::Validation {
            missing_field: "last_name".into()
        }
    );
}

#[test]
fn test_unknown_field_rejected_at_set() {
    let schema = customer_schema();
    let mut builder = RecordBuilder::new(schema);

    let err = builder.set("middle_name", "Q").err().unwrap();
    assert!(matches!(err, RecordError::UnknownField { .. }));
    assert_eq!(err.field(), "middle_name");
}

#[test]
fn test_wrong_type_rejected_at_build() {
    let schema = customer_schema();
    let mut builder = john(&schema);
    builder.set("age", "forty-two").unwrap();

    let err = builder.build().unwrap_err();
    assert!(matches!(err, RecordError::TypeMismatch { ref field, .. } if field == "age"));
}

#[test]
fn test_to_builder_edits_copy() {
    let schema = customer_schema();
    let original = john(&schema).build().unwrap();

    let mut builder = original.to_builder();
    builder.set("age", 43).unwrap();
    let older = builder.build().unwrap();

    assert_eq!(original.get("age"), Some(&Value::Int32(42)));
    assert_eq!(older.get("age"), Some(&Value::Int32(43)));
}

// =============================================================================
// Container Round Trip
// =============================================================================

#[test]
fn test_customers_round_trip_through_container() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("customers.arc");
    let schema = customer_schema();

    let john = john(&schema).build().unwrap();
    let jane = jane(&schema);

    {
        let mut writer = ContainerWriter::create(&path, schema.clone()).unwrap();
        writer.append(&john).unwrap();
        writer.append(&jane).unwrap();
        writer.close().unwrap();
    }

    let mut reader = ContainerReader::open(&path).unwrap();
    assert_eq!(**reader.schema(), *schema);

    let records = reader.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], john);
    assert_eq!(records[1], jane);
    assert_eq!(records[0].get("first_name").and_then(Value::as_str), Some("John"));
    assert_eq!(
        records[1].get("creation_ts").and_then(Value::as_timestamp_millis),
        Some(1_700_000_123_456)
    );
}

#[test]
fn test_record_display_is_json() {
    let schema = customer_schema();
    let jane = jane(&schema);

    let rendered: serde_json::Value = serde_json::from_str(&jane.to_string()).unwrap();
    assert_eq!(rendered["first_name"], "Jane");
    assert_eq!(rendered["emails"][1], "jd@example.org");
    assert_eq!(rendered["nickname"], "JD");
}
