use pretty_assertions::assert_eq;
use route_compass::cli::{self, CliArgs};
use route_compass::config::CompassConfig;
use route_compass::declaration::model::DeclarationModel;
use route_compass::declaration::source::SourceCollector;
use route_compass::error::Warning;
use route_compass::parser::AstParser;
use route_compass::pass;
use route_compass::scanner::FileScanner;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn shop_model() -> DeclarationModel {
    let root = fixture("shop");
    let scan_result = FileScanner::new(root.clone()).scan().unwrap();
    let parsed_files = AstParser::parse_files(&scan_result.rust_files);
    assert_eq!(parsed_files.len(), 3, "All fixture files should parse");
    SourceCollector::new(root).collect(&parsed_files)
}

const SHOP_REPORT: &str = "\
crate::admin::AdminController:
\t- [DELETE] [/admin/cache]
crate::orders::OrderController:
\t- [GET] [/orders/{id}] (returns: application/json)
\t\t- bool expand (default: false)
\t\toutput: Json
\t\t\t- u64 id
\t\t\t- Vec<String> items
\t\t\t- String created_by
\t- [POST] [/orders] (expects: application/json) (returns: application/json)
\t\tinput: Json
\t\t\t- Vec<String> items
\t\toutput: Json
\t\t\t- u64 id
\t\t\t- Vec<String> items
\t\t\t- String created_by
\t- [DEPRECATED] [GET|HEAD] [/orders/legacy|/orders/old] (returns: application/json)
";

const CATALOG_REPORT: &str = "\
com.example.api.CatalogController:
\t- [GET] [/catalog/search|/v1/catalog/search]
\t\t- java.lang.String q
\t\toutput: ResponseEntity
\t\t\t- java.util.List<java.lang.String> items
\t\t\t- long total
com.example.api.CatalogController.Admin:
\t- [DELETE] [/catalog/admin/items|/v1/catalog/admin/items]
";

#[test]
fn test_rust_project_end_to_end() {
    let model = shop_model();
    let output = pass::run(&model, &CompassConfig::default()).unwrap();

    assert_eq!(output.render(), SHOP_REPORT);
    assert_eq!(output.registry.route_count(), 4);
    assert!(output.warnings.is_empty());
}

#[test]
fn test_declaration_model_end_to_end() {
    let model = DeclarationModel::load(&fixture("catalog.yaml")).unwrap();
    let output = pass::run(&model, &CompassConfig::default()).unwrap();

    assert_eq!(output.render(), CATALOG_REPORT);
}

#[test]
fn test_ambiguous_mapping_is_warned_once() {
    let model = DeclarationModel::load(&fixture("catalog.yaml")).unwrap();
    let output = pass::run(&model, &CompassConfig::default()).unwrap();

    assert_eq!(output.warnings.len(), 1);
    let Warning::AmbiguousAnnotation { declaration, .. } = &output.warnings[0];
    assert_eq!(declaration, "com.example.api.CatalogController::search");
    assert!(output.warnings[0]
        .to_string()
        .contains("only get_mapping will be considered"));
}

#[test]
fn test_second_pass_appends_to_report() {
    let temp_dir = TempDir::new().unwrap();
    let config = CompassConfig::default();

    let shop = shop_model();
    let catalog = DeclarationModel::load(&fixture("catalog.yaml")).unwrap();

    let (_, first) = pass::run_and_write(&shop, &config, temp_dir.path()).unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), SHOP_REPORT);

    let (_, second) = pass::run_and_write(&catalog, &config, temp_dir.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        format!("{}{}", SHOP_REPORT, CATALOG_REPORT)
    );
}

#[test]
fn test_envelope_configuration_changes_output_dto() {
    let config = CompassConfig {
        envelope_types: vec!["HttpEntity".to_string()],
        ..CompassConfig::default()
    };

    let output = pass::run(&shop_model(), &config).unwrap();
    let find = &output.registry.groups()[1].routes[0];

    // `Json` is no longer unwrapped and is not a declared type either
    assert_eq!(find.handler_name, "find");
    assert!(find.return_type.is_none());
}

#[test]
fn test_cli_writes_report_with_custom_name() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("compass.json");
    fs::write(&config_path, r#"{ "report_file_name": "endpoints.txt" }"#).unwrap();

    let args = CliArgs {
        input: fixture("catalog.yaml"),
        output_dir: Some(temp_dir.path().join("out")),
        config: Some(config_path),
        file_name: None,
        verbose: false,
    };
    cli::run(cli::parse_args_from_parsed(args).unwrap()).unwrap();

    let report = fs::read_to_string(temp_dir.path().join("out").join("endpoints.txt")).unwrap();
    assert_eq!(report, CATALOG_REPORT);
}

#[test]
fn test_unresolvable_method_aborts_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("lib.rs"),
        r#"
        pub struct Broken;

        impl Broken {
            #[request_mapping(method = GET)]
            pub fn nowhere(&self) {}
        }
        "#,
    )
    .unwrap();

    let args = CliArgs {
        input: temp_dir.path().to_path_buf(),
        output_dir: Some(temp_dir.path().join("out")),
        config: None,
        file_name: None,
        verbose: false,
    };
    let err = cli::run(args).unwrap_err();

    assert!(err.to_string().contains("crate::Broken::nowhere"));
    assert!(!temp_dir.path().join("out").join("routes").exists());
}
