use std::path::Path;

use query_plan_audit::Operation;

use crate::operations::{parse_operations, OperationsFormat};

#[test]
fn invalid_records_are_skipped() {
    let raw = r#"[
        { "queryId": "1a2b3c4d", "queryName": "GetMissions", "querySignature": "{ missions { id } }" },
        { "queryId": "5e6f7a8b", "querySignature": "" },
        { "queryName": "NoId", "querySignature": "{ missions { id } }" },
        "not a record",
        { "queryId": "9c0d1e2f", "queryName": null, "querySignature": "{ missions { name } }" }
    ]"#;

    let loaded = parse_operations(raw, OperationsFormat::Json).expect("list should parse");

    assert_eq!(loaded.skipped, 3);
    assert_eq!(
        loaded.operations,
        vec![
            Operation::new(
                "1a2b3c4d",
                Some("GetMissions".to_string()),
                "{ missions { id } }"
            ),
            Operation::new("9c0d1e2f", None, "{ missions { name } }"),
        ]
    );
}

#[test]
fn yaml_lists_are_accepted() {
    let raw = r#"
- queryId: 1a2b3c4d
  queryName: GetMissions
  querySignature: "{ missions { id } }"
- queryId: 5e6f7a8b
  querySignature: "{ missions { name } }"
"#;

    let loaded = parse_operations(raw, OperationsFormat::Yaml).expect("list should parse");

    assert_eq!(loaded.skipped, 0);
    assert_eq!(loaded.operations.len(), 2);
    assert_eq!(loaded.operations[0].display_name(), "GetMissions");
    assert_eq!(loaded.operations[1].display_name(), "Unnamed");
}

#[test]
fn a_single_record_is_not_a_list() {
    let raw = r#"{ "queryId": "1a2b3c4d", "querySignature": "{ missions { id } }" }"#;

    let err = parse_operations(raw, OperationsFormat::Json).expect_err("object should be refused");

    assert_eq!(err, "expected a list of operation records");
}

#[test]
fn format_follows_the_extension() {
    assert_eq!(
        OperationsFormat::from_path(Path::new("ops/operations.JSON")),
        OperationsFormat::Json
    );
    assert_eq!(
        OperationsFormat::from_path(Path::new("operations.yaml")),
        OperationsFormat::Yaml
    );
    assert_eq!(
        OperationsFormat::from_path(Path::new("operations")),
        OperationsFormat::Yaml
    );
}
