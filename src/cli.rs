use crate::config::CompassConfig;
use crate::declaration::model::DeclarationModel;
use crate::declaration::source::SourceCollector;
use crate::parser::AstParser;
use crate::pass;
use crate::scanner::{FileScanner, InputKind};
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Route Compass - Extract route metadata from annotated handler declarations
#[derive(Parser, Debug)]
#[command(name = "route-compass")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Rust project directory, or a .yaml/.yml/.json declaration model
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory receiving the report (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report file name inside the output directory, overrides the configuration
    #[arg(long = "file-name", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    if let Some(ref name) = args.file_name {
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("Report file name must be a plain file name: {:?}", name);
        }
    }

    info!("Input: {}", args.input.display());
    match args.output_dir {
        Some(ref dir) => info!("Output directory: {}", dir.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Loads the configuration named on the command line, or the defaults.
pub fn load_config(args: &CliArgs) -> Result<CompassConfig> {
    let mut config = match &args.config {
        Some(path) => CompassConfig::load(path)?,
        None => CompassConfig::default(),
    };
    if let Some(name) = &args.file_name {
        config.report_file_name = name.clone();
    }
    Ok(config)
}

/// Builds the declaration tree for an input path.
pub fn load_declarations(input: &Path) -> Result<DeclarationModel> {
    match InputKind::detect(input)? {
        InputKind::ModelFile(path) => {
            info!("Loading declaration model...");
            DeclarationModel::load(&path)
        }
        InputKind::SourceTree(root) => {
            info!("Scanning project directory...");
            let scan_result = FileScanner::new(root.clone()).scan()?;
            info!("Found {} Rust files", scan_result.rust_files.len());

            if scan_result.rust_files.is_empty() {
                anyhow::bail!("No Rust files found in the project directory");
            }

            info!("Parsing Rust files...");
            let parsed_files = AstParser::parse_files(&scan_result.rust_files);
            info!("Successfully parsed {} files", parsed_files.len());

            if parsed_files.is_empty() {
                anyhow::bail!("No files could be parsed successfully");
            }

            Ok(SourceCollector::new(root).collect(&parsed_files))
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    let model = load_declarations(&args.input)?;
    info!(
        "Loaded {} classes with {} methods",
        model.classes.len(),
        model.method_count()
    );

    let output = match &args.output_dir {
        Some(dir) => {
            let (output, path) = pass::run_and_write(&model, &config, dir)?;
            info!("Wrote report to {}", path.display());
            output
        }
        None => {
            let output = pass::run(&model, &config)?;
            print!("{}", output.render());
            output
        }
    };

    for warning in &output.warnings {
        warn!("{}", warning);
    }

    if output.registry.is_empty() {
        warn!("No mapped methods found");
    }

    info!("Summary:");
    info!("  - Classes: {}", output.registry.groups().len());
    info!("  - Routes: {}", output.registry.route_count());
    info!("  - Warnings: {}", output.warnings.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(input: PathBuf) -> CliArgs {
        CliArgs {
            input,
            output_dir: None,
            config: None,
            file_name: None,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_parses_all_options() {
        let parsed = CliArgs::try_parse_from([
            "route-compass",
            "./service",
            "-o",
            "generated",
            "-c",
            "compass.yaml",
            "--file-name",
            "endpoints",
            "-v",
        ])
        .unwrap();

        assert_eq!(parsed.input, PathBuf::from("./service"));
        assert_eq!(parsed.output_dir, Some(PathBuf::from("generated")));
        assert_eq!(parsed.config, Some(PathBuf::from("compass.yaml")));
        assert_eq!(parsed.file_name.as_deref(), Some("endpoints"));
        assert!(parsed.verbose);
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let err = parse_args_from_parsed(args(PathBuf::from("/nonexistent/project"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_file_name_must_be_plain() {
        let temp_dir = TempDir::new().unwrap();
        let mut a = args(temp_dir.path().to_path_buf());
        a.file_name = Some("nested/routes".to_string());
        assert!(parse_args_from_parsed(a).is_err());
    }

    #[test]
    fn test_file_name_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("compass.yaml");
        fs::write(&config_path, "report_file_name: from-config\n").unwrap();

        let mut a = args(temp_dir.path().to_path_buf());
        a.config = Some(config_path);
        assert_eq!(load_config(&a).unwrap().report_file_name, "from-config");

        a.file_name = Some("from-cli".to_string());
        assert_eq!(load_config(&a).unwrap().report_file_name, "from-cli");
    }

    #[test]
    fn test_source_tree_without_rust_files_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.md"), "# nothing").unwrap();

        let err = load_declarations(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("No Rust files"));
    }
}
