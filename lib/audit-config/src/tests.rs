use crate::{
    load_config,
    log::{LogFormat, LogLevel},
    parse_yaml_config,
    subgraphs::SchemaSource,
};

const FULL_CONFIG: &str = r#"
log:
  level: debug
  format: json
subgraphs:
  products:
    routing_url: http://localhost:4001/graphql
    schema:
      file: subgraphs/products.graphql
  reviews:
    routing_url: http://localhost:4002/graphql
    schema:
      graphref: mygraph@current
      subgraph: reviews
  inventory:
    schema:
      subgraph_url: http://localhost:4003/graphql
operations:
  file: operations.json
engines:
  fed1:
    command: node
    args: [engines/fed1.mjs]
  fed2:
    command: ./fed2-engine
audit:
  hybrid_comparison: true
  include_diagrams: true
  out: results
experimental_fed2readiness:
  graph_ref: mygraph@staging
"#;

#[test]
fn parses_a_full_config() {
    let config = parse_yaml_config(FULL_CONFIG.to_string()).expect("config should parse");

    assert_eq!(config.log.level, LogLevel::Debug);
    assert_eq!(config.log.format, LogFormat::Json);
    assert_eq!(config.log.env_filter_str(), "debug");

    assert_eq!(
        config.subgraphs.keys().collect::<Vec<_>>(),
        vec!["inventory", "products", "reviews"]
    );
    let products = &config.subgraphs["products"];
    assert_eq!(
        products.routing_url.as_deref(),
        Some("http://localhost:4001/graphql")
    );
    let SchemaSource::File(file) = &products.schema else {
        panic!("expected a file source, got {:?}", products.schema);
    };
    assert_eq!(file.file.relative, "subgraphs/products.graphql");
    assert_eq!(
        file.file.absolute,
        config.root_directory().join("subgraphs/products.graphql")
    );

    let SchemaSource::GraphRef(reviews) = &config.subgraphs["reviews"].schema else {
        panic!("expected a graph ref source");
    };
    assert_eq!(reviews.graph_ref, "mygraph@current");
    assert_eq!(config.subgraphs["inventory"].schema.kind(), "subgraph_url");
    assert_eq!(config.subgraphs["inventory"].routing_url, None);

    assert_eq!(
        config.operations.file.as_ref().map(|file| file.relative.as_str()),
        Some("operations.json")
    );
    assert_eq!(config.engines.fed1.args, vec!["engines/fed1.mjs"]);
    assert_eq!(config.engines.fed2.command, "./fed2-engine");
    assert!(config.engines.fed2.args.is_empty());

    assert!(config.audit.hybrid_comparison);
    assert!(config.audit.include_diagrams);
    let out = config.audit.out.as_ref().expect("out is set");
    assert_eq!(out.relative, "results");
    assert_eq!(out.absolute, config.root_directory().join("results"));

    let readiness = config.graph_ref().expect("graph ref is set");
    assert_eq!(readiness.graph_and_variant(), ("mygraph", "staging"));
}

#[test]
fn out_dir_is_relative_to_the_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_dir = dir.path().join("audit");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    let config_path = config_dir.join("fed2-audit.config.yaml");
    std::fs::write(&config_path, "audit:\n  out: reports\n").expect("config file");

    let config = load_config(Some(config_path.display().to_string())).expect("config should load");

    let out = config.audit.out.expect("out is set");
    assert_eq!(out.relative, "reports");
    assert_eq!(out.absolute, config_dir.join("reports"));
}

#[test]
fn sections_have_defaults() {
    let config = parse_yaml_config("log:\n  filter: fed2_audit=trace\n".to_string())
        .expect("config should parse");

    assert_eq!(config.log.level, LogLevel::Info);
    assert_eq!(config.log.format, LogFormat::Text);
    assert_eq!(config.log.env_filter_str(), "fed2_audit=trace");
    assert!(config.subgraphs.is_empty());
    assert!(config.operations.file.is_none());
    assert_eq!(config.engines.fed1.command, "node");
    assert_eq!(config.engines.fed2.args, vec!["engines/fed2.mjs"]);
    assert!(!config.audit.hybrid_comparison);
    assert!(config.audit.out.is_none());
    assert!(config.graph_ref().is_none());
}

#[test]
fn unknown_fields_are_rejected() {
    let result = parse_yaml_config("audit:\n  hybrid: true\n".to_string());

    assert!(result.is_err());
}

#[test]
fn json_schema_describes_every_section() {
    let schema = serde_json::to_value(crate::config_json_schema()).expect("schema serializes");
    let properties = schema["properties"]
        .as_object()
        .expect("schema has properties");

    for section in [
        "log",
        "subgraphs",
        "operations",
        "engines",
        "audit",
        "experimental_fed2readiness",
    ] {
        assert!(properties.contains_key(section), "missing {section}");
    }
}
