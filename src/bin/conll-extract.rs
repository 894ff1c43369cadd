//! conll-extract CLI - inspect dependency trees in CoNLL parser output
//!
//! Reads MaltParser / CoNLL-X files and prints the reconstructed trees or
//! summary counts.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use conll_extract::{
    ColumnSchema, ConllExtractor, DependencyTree, ExtractorConfig, FilterMode, NdjsonWriter,
    TextWriter, WordListFilter,
};

#[derive(Parser)]
#[command(name = "conll-extract")]
#[command(version, about = "Extract dependency trees from CoNLL parser output", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every tree in the input
    Parse {
        /// CoNLL file to read, or '-' for stdin
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },

    /// Count trees, nodes and relations in the input
    Stats {
        /// CoNLL file to read, or '-' for stdin
        input: PathBuf,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },

    /// Print the resolved column schema
    Schema {
        #[command(flatten)]
        extractor: ExtractorArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
struct ExtractorArgs {
    /// Extractor config file (YAML or JSON); defaults to $CONLL_EXTRACT_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column description (MaltParser XML, YAML or JSON)
    #[arg(short, long, conflicts_with = "indices")]
    schema: Option<PathBuf>,

    /// Explicit column indices: id,form,lemma,pos,head,deprel
    #[arg(short, long)]
    indices: Option<String>,

    /// Word list; listed words are stored as empty tokens
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Treat --stopwords as an allow-list instead
    #[arg(long, requires = "stopwords")]
    include: bool,

    /// Report malformed sentence blocks, skip them and continue instead of stopping
    #[arg(short, long)]
    keep_going: bool,
}

/// Build the extractor with precedence: CLI flags > config file > defaults
fn build_extractor(args: &ExtractorArgs) -> Result<ConllExtractor, String> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("CONLL_EXTRACT_CONFIG").map(PathBuf::from));

    let mut extractor = match &config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading extractor config");
            ExtractorConfig::load_from_file(path)
                .and_then(|config| config.build())
                .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?
        }
        None => ConllExtractor::new(),
    };

    if let Some(schema) = &args.schema {
        let schema = ColumnSchema::load_from_file(schema).map_err(|e| e.to_string())?;
        extractor = extractor.with_schema(schema);
    }

    if let Some(indices) = &args.indices {
        let schema = ColumnSchema::parse_indices(indices).map_err(|e| e.to_string())?;
        extractor = extractor.with_schema(schema);
    }

    if let Some(stopwords) = &args.stopwords {
        let mode = if args.include {
            FilterMode::Include
        } else {
            FilterMode::Exclude
        };
        let filter = WordListFilter::load_from_file(stopwords, mode).map_err(|e| e.to_string())?;
        extractor = extractor.with_filter(Box::new(filter));
    }

    tracing::debug!(schema = %extractor.schema(), "extractor ready");
    Ok(extractor)
}

fn open_input(input: &Path) -> Result<Box<dyn BufRead>, String> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(input)
        .map_err(|e| format!("Failed to open {}: {}", input.display(), e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Walk every tree in `input`, honouring --keep-going for malformed blocks.
fn for_each_tree<F>(input: &Path, args: &ExtractorArgs, mut visit: F) -> Result<usize, String>
where
    F: FnMut(usize, &DependencyTree) -> Result<(), String>,
{
    let extractor = build_extractor(args)?;
    let mut stream = extractor.trees(open_input(input)?);
    let mut failures = 0;

    while let Some(result) = stream.next() {
        match result {
            Ok(tree) => visit(stream.trees_read(), &tree)?,
            Err(e) if args.keep_going => {
                failures += 1;
                tracing::warn!(error = %e, "skipping malformed sentence");
            }
            Err(e) => return Err(format!("{}: {}", input.display(), e)),
        }
    }

    tracing::info!(
        trees = stream.trees_read(),
        lines = stream.lines_read(),
        failures,
        "finished reading input"
    );
    Ok(failures)
}

fn parse(input: PathBuf, format: OutputFormat, args: ExtractorArgs) -> Result<(), String> {
    let stdout = io::stdout();
    let out = stdout.lock();

    match format {
        OutputFormat::Text => {
            let mut writer = TextWriter::new(out);
            for_each_tree(&input, &args, |n, tree| {
                writer.write(n, tree).map_err(|e| e.to_string())
            })?;
            writer.flush().map_err(|e| e.to_string())
        }
        OutputFormat::Json => {
            let mut writer = NdjsonWriter::new(out);
            for_each_tree(&input, &args, |n, tree| {
                writer.write(n, tree).map_err(|e| e.to_string())
            })?;
            writer.flush().map_err(|e| e.to_string())
        }
    }
}

#[derive(Default)]
struct Stats {
    trees: usize,
    nodes: usize,
    relations: usize,
    roots: usize,
    filtered: usize,
}

fn stats(input: PathBuf, args: ExtractorArgs) -> Result<(), String> {
    let mut stats = Stats::default();

    let failures = for_each_tree(&input, &args, |_, tree| {
        stats.trees += 1;
        stats.nodes += tree.len();
        stats.relations += tree.relations().len();
        stats.roots += tree.roots().count();
        stats.filtered += tree.nodes().iter().filter(|n| n.is_filtered()).count();
        Ok(())
    })?;

    write_stats(&mut io::stdout().lock(), &stats, failures).map_err(|e| e.to_string())
}

fn write_stats(out: &mut impl Write, stats: &Stats, failures: usize) -> io::Result<()> {
    writeln!(out, "trees:     {}", stats.trees)?;
    writeln!(out, "nodes:     {}", stats.nodes)?;
    writeln!(out, "relations: {}", stats.relations)?;
    writeln!(out, "roots:     {}", stats.roots)?;
    writeln!(out, "filtered:  {}", stats.filtered)?;
    if failures > 0 {
        writeln!(out, "skipped:   {}", failures)?;
    }
    Ok(())
}

fn schema(args: ExtractorArgs) -> Result<(), String> {
    let extractor = build_extractor(&args)?;
    let schema = extractor.schema();
    println!("ID      {}", schema.id);
    println!("FORM    {}", schema.form);
    println!("LEMMA   {}", schema.lemma);
    println!("POSTAG  {}", schema.pos);
    println!("HEAD    {}", schema.parent);
    println!("DEPREL  {}", schema.relation);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse { input, format, extractor } => parse(input, format, extractor),
        Commands::Stats { input, extractor } => stats(input, extractor),
        Commands::Schema { extractor } => schema(extractor),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
