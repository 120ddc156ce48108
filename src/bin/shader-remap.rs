use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use shader_remap::{
    BatchOptions, MatchKey, MaterialOutcome, MigrationRule, extract, memory::MemoryLibrary,
    migrate_batch, select_candidates,
};

#[derive(Parser, Debug)]
#[command(name = "shader-remap", version)]
struct Cli {
    /// Log at DEBUG level instead of INFO.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the property schema of one shader as JSON.
    Schema(SchemaArgs),
    /// Build a migration rule between two shaders and save it.
    Automap(AutomapArgs),
    /// Apply a saved rule to every material using its source shader.
    Migrate(MigrateArgs),
}

#[derive(Parser, Debug)]
struct SchemaArgs {
    /// Library JSON with shaders and materials.
    #[arg(long)]
    library: PathBuf,

    /// Shader name.
    #[arg(long)]
    shader: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyArg {
    Name,
    Description,
}

impl From<KeyArg> for MatchKey {
    fn from(k: KeyArg) -> Self {
        match k {
            KeyArg::Name => MatchKey::Name,
            KeyArg::Description => MatchKey::Description,
        }
    }
}

#[derive(Parser, Debug)]
struct AutomapArgs {
    /// Library JSON with shaders and materials.
    #[arg(long)]
    library: PathBuf,

    /// Source shader name.
    #[arg(long)]
    source: String,

    /// Destination shader name.
    #[arg(long = "dest")]
    destination: String,

    /// Descriptor field to match on.
    #[arg(long, value_enum, default_value_t = KeyArg::Name)]
    key: KeyArg,

    /// Explicit `SOURCE=DEST` property connections, applied before auto-mapping.
    #[arg(long = "connect", value_name = "SOURCE=DEST")]
    connect: Vec<String>,

    /// Output rule JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MigrateArgs {
    /// Library JSON with shaders and materials.
    #[arg(long)]
    library: PathBuf,

    /// Rule JSON written by `automap`.
    #[arg(long)]
    rule: PathBuf,

    /// Output library JSON path (defaults to overwriting `--library`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Migrate materials on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Schema(args) => cmd_schema(args),
        Command::Automap(args) => cmd_automap(args),
        Command::Migrate(args) => cmd_migrate(args),
    }
}

fn cmd_schema(args: SchemaArgs) -> anyhow::Result<()> {
    let lib = MemoryLibrary::from_path(&args.library)?;
    let shader = lib.require_shader(&args.shader)?;
    let schema = extract(&shader)?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn cmd_automap(args: AutomapArgs) -> anyhow::Result<()> {
    let lib = MemoryLibrary::from_path(&args.library)?;
    let source = lib.require_shader(&args.source)?;
    let destination = lib.require_shader(&args.destination)?;
    let mut rule = MigrationRule::new(&source, &destination)?;

    for pair in &args.connect {
        let (s, d) = pair
            .split_once('=')
            .with_context(|| format!("connection '{pair}' is not SOURCE=DEST"))?;
        let src = rule
            .source()
            .position(s)
            .with_context(|| format!("source shader has no property '{s}'"))?;
        let dst = rule
            .destination()
            .position(d)
            .with_context(|| format!("destination shader has no property '{d}'"))?;
        rule.connect(src, dst)
            .with_context(|| format!("connect '{s}' -> '{d}'"))?;
    }

    let assigned = rule.auto_map(args.key.into());
    rule.save(&args.out)?;
    eprintln!(
        "mapped {} of {} properties ({assigned} by {:?})",
        rule.mapping().mapped_count(),
        rule.source().len(),
        args.key
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_migrate(args: MigrateArgs) -> anyhow::Result<()> {
    let mut lib = MemoryLibrary::from_path(&args.library)?;
    let rule = MigrationRule::from_path(&args.rule)?;
    let source = lib.require_shader(&rule.source().shader)?;
    let destination = lib.require_shader(&rule.destination().shader)?;
    rule.check_against(&source, &destination)
        .with_context(|| format!("rule '{}' does not fit the library", args.rule.display()))?;

    let candidates = select_candidates(&lib.materials, &rule.source().shader);
    let targets: Vec<_> = lib
        .materials
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| candidates.binary_search(i).is_ok())
        .map(|(_, m)| m)
        .collect();
    let opts = BatchOptions {
        parallel: args.parallel,
        threads: args.threads,
    };
    let outcome = migrate_batch(targets, &rule, &destination, &opts)?;

    let reports: Vec<_> = outcome
        .outcomes
        .iter()
        .filter_map(MaterialOutcome::report)
        .collect();
    for o in &outcome.outcomes {
        if let MaterialOutcome::Failed { material_id, error } = o {
            eprintln!("skipped {material_id}: {error}");
        }
    }
    let summary = serde_json::json!({
        "stats": outcome.stats,
        "reports": reports,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let out = args.out.as_ref().unwrap_or(&args.library);
    lib.save(out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
