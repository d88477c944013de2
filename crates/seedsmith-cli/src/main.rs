mod error;
mod logging;
mod workspace;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{error, info, warn};

use seedsmith_core::{EntityDescriptor, resolve_dependency_order, validate_descriptors};
use seedsmith_generate::{
    DocumentTextSink, GenerateOptions, InsertionAnchor, SourceStyle, generate,
};
use seedsmith_introspect::{
    ExtractOptions, InMemoryCatalog, InferenceOptions, analyze_entities, discover_entities,
    infer_relationships,
};
use seedsmith_plan::{
    GenerationPlan, OutputFormat, plan_json_schema, scaffold_configs, validate_plan,
};

use error::CliError;
use logging::init_logging;
use workspace::{
    AnalysisArtifact, DEFAULT_SETTINGS_FILE, FileTextSink, Settings, load_settings, read_json,
    save_settings, write_bytes_atomic, write_json,
};

#[derive(Parser, Debug)]
#[command(name = "seedsmith", version, about = "Relationship-aware seed data generator")]
struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract entities from a metadata export and infer their relationships.
    Analyze(AnalyzeArgs),
    /// Scaffold a generation plan from an analysis.
    Plan(PlanArgs),
    /// Generate seed data for a plan.
    Generate(GenerateArgs),
    /// Generate source code and insert it into a type's body.
    Insert(InsertArgs),
    /// Print the JSON Schema of an artifact.
    Schema(SchemaArgs),
    /// Write a settings file with default values.
    Init,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Metadata export (`{"types": [...]}` or a bare array).
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Type names to analyze; every entity in the catalog when omitted.
    #[arg(long = "type", value_name = "NAME")]
    types: Vec<String>,
    /// Enable the declared-type/key-type detector.
    #[arg(long, default_value_t = false)]
    type_key_matching: bool,
    /// Output path for the analysis; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Analysis written by `analyze`.
    #[arg(long, value_name = "PATH")]
    analysis: PathBuf,
    /// Record count for root entities.
    #[arg(long)]
    record_count: Option<u64>,
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerationInputs {
    /// Analysis written by `analyze`.
    #[arg(long, value_name = "PATH")]
    analysis: PathBuf,
    /// Generation plan (JSON).
    #[arg(long, value_name = "PATH")]
    plan: PathBuf,
    /// Cap on records per entity.
    #[arg(long)]
    preview: Option<u64>,
    /// Build source records with sequential assignments.
    #[arg(long, default_value_t = false)]
    assignment_style: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    inputs: GenerationInputs,
    /// Output format: source_code, json, csv, sql or xml.
    #[arg(long)]
    format: Option<OutputFormat>,
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InsertArgs {
    #[command(flatten)]
    inputs: GenerationInputs,
    /// Source file to edit.
    #[arg(long, value_name = "PATH")]
    document: PathBuf,
    /// Type whose body receives the generated routines.
    #[arg(long = "type", value_name = "NAME")]
    type_name: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaKind {
    Descriptors,
    Plan,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    #[arg(value_enum)]
    kind: SchemaKind,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli.config)?;
    init_logging(&settings.logging)?;

    let timer = Instant::now();
    let command = match &cli.command {
        Command::Analyze(_) => "analyze",
        Command::Plan(_) => "plan",
        Command::Generate(_) => "generate",
        Command::Insert(_) => "insert",
        Command::Schema(_) => "schema",
        Command::Init => "init",
    };
    info!(command, config = %cli.config.display(), "command started");

    match cli.command {
        Command::Analyze(args) => run_analyze(args, &settings)?,
        Command::Plan(args) => run_plan(args, &settings)?,
        Command::Generate(args) => run_generate(args, &settings)?,
        Command::Insert(args) => run_insert(args, &settings)?,
        Command::Schema(args) => run_schema(args)?,
        Command::Init => run_init(&cli.config)?,
    }

    info!(
        command,
        duration_ms = timer.elapsed().as_millis() as u64,
        "command finished"
    );
    Ok(())
}

fn run_analyze(args: AnalyzeArgs, settings: &Settings) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&args.catalog)?;
    let catalog = InMemoryCatalog::from_json(&content)?;
    let extract = ExtractOptions::default();

    let mut entities = if args.types.is_empty() {
        discover_entities(&catalog, &extract)
    } else {
        analyze_entities(&catalog, &args.types, &extract)
    };
    info!(types = catalog.len(), entities = entities.len(), "entities extracted");

    let inference = InferenceOptions {
        type_key_matching: args.type_key_matching || settings.inference.type_key_matching,
    };
    infer_relationships(&mut entities, &inference);
    let resolution = resolve_dependency_order(&mut entities);
    validate_descriptors(&entities)?;

    let artifact = AnalysisArtifact::new(entities, resolution);
    emit_json(args.out.as_deref(), &artifact)
}

fn run_plan(args: PlanArgs, settings: &Settings) -> Result<(), CliError> {
    let analysis: AnalysisArtifact = read_json(&args.analysis)?;
    let record_count = args
        .record_count
        .unwrap_or(settings.generation.record_count);

    let configs = scaffold_configs(&analysis.entities, &analysis.resolution, record_count);
    let mut plan = GenerationPlan::new(configs);
    plan.seed = settings.generation.seed;
    info!(entities = plan.entities.len(), record_count, "plan scaffolded");

    emit_json(args.out.as_deref(), &plan)
}

fn run_generate(args: GenerateArgs, settings: &Settings) -> Result<(), CliError> {
    let (entities, plan) = load_validated_plan(&args.inputs)?;
    let format = args
        .format
        .or(plan.format)
        .unwrap_or(settings.generation.format);
    let options = generate_options(&args.inputs, &plan, settings, format);

    let result = generate(&entities, &plan.entities, &options)?;
    for report in &result.entities {
        info!(
            entity = %report.entity,
            records = report.records_generated,
            "entity written"
        );
    }
    emit_text(args.out.as_deref(), &result.text)
}

fn run_insert(args: InsertArgs, settings: &Settings) -> Result<(), CliError> {
    let (entities, plan) = load_validated_plan(&args.inputs)?;
    let options = generate_options(&args.inputs, &plan, settings, OutputFormat::SourceCode);
    let result = generate(&entities, &plan.entities, &options)?;

    let document = args.document.to_string_lossy().to_string();
    let anchor = InsertionAnchor::EndOfTypeBody(args.type_name.clone());
    let mut sink = FileTextSink;
    if !sink.insert(&document, &result.text, &anchor) {
        return Err(CliError::Insertion(format!(
            "type '{}' not found in {}",
            args.type_name, document
        )));
    }
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let schema = match args.kind {
        SchemaKind::Descriptors => {
            serde_json::to_value(schemars::schema_for!(Vec<EntityDescriptor>))?
        }
        SchemaKind::Plan => serde_json::to_value(plan_json_schema())?,
    };
    emit_json(args.out.as_deref(), &schema)
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::InvalidConfig(format!(
            "{} already exists",
            path.display()
        )));
    }
    save_settings(path, &Settings::default())?;
    info!(path = %path.display(), "settings written");
    Ok(())
}

fn load_validated_plan(
    inputs: &GenerationInputs,
) -> Result<(Vec<EntityDescriptor>, GenerationPlan), CliError> {
    let analysis: AnalysisArtifact = read_json(&inputs.analysis)?;
    let plan_json: Value = read_json(&inputs.plan)?;
    let schema = serde_json::to_value(plan_json_schema())?;

    match validate_plan(&plan_json, &schema, &analysis.entities) {
        Ok(validated) => {
            for issue in &validated.warnings {
                warn!(code = issue.code, path = %issue.path, hint = ?issue.hint, "{}", issue.message);
            }
            Ok((analysis.entities, validated.plan))
        }
        Err(report) => {
            for issue in &report.warnings {
                warn!(code = issue.code, path = %issue.path, hint = ?issue.hint, "{}", issue.message);
            }
            for issue in &report.errors {
                error!(code = issue.code, path = %issue.path, hint = ?issue.hint, "{}", issue.message);
            }
            Err(CliError::PlanRejected(report))
        }
    }
}

fn generate_options(
    inputs: &GenerationInputs,
    plan: &GenerationPlan,
    settings: &Settings,
    format: OutputFormat,
) -> GenerateOptions {
    let source_style = if inputs.assignment_style {
        SourceStyle::Assignment
    } else {
        settings.generation.source_style
    };
    GenerateOptions {
        format,
        base_date: settings.generation.base_date,
        preview_limit: inputs
            .preview
            .or(plan.preview_limit)
            .or(settings.generation.preview_limit),
        source_style,
        seed: plan.seed,
    }
}

fn emit_json<T: serde::Serialize>(out: Option<&Path>, value: &T) -> Result<(), CliError> {
    match out {
        Some(path) => {
            write_json(path, value)?;
            info!(path = %path.display(), "json written");
            Ok(())
        }
        None => emit_text(None, &serde_json::to_string_pretty(value)?),
    }
}

fn emit_text(out: Option<&Path>, text: &str) -> Result<(), CliError> {
    match out {
        Some(path) => {
            write_bytes_atomic(path, text.as_bytes())?;
            info!(path = %path.display(), bytes = text.len(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
