use clap::{Parser, Subcommand, ValueEnum};
use royalbit_colformula::cli;
use royalbit_colformula::parser::FileFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "colformula")]
#[command(about = "Named computed columns over tabular data, defined with @function formulas.")]
#[command(long_about = "colformula - Apply named @function formulas to column data

Formulas are plain function calls over columns and literals:
  total:  \"@mul(price, qty)\"
  grade:  \"@if_else(@gte(score, 50), 'pass', 'fail')\"
  margin: \"@round(@div(@sub(revenue, cost), revenue), n=2)\"

Formulas are applied in the order they appear in the config, and each one
can read the columns written by the formulas before it.

COMMANDS:
  apply      - Apply a config's formulas to a dataset
  validate   - Check formulas against the first row of a dataset
  refs       - Show the columns a formula reads
  functions  - List available functions
  export     - Print the normalized config

EXAMPLES:
  colformula apply formulas.yaml data.yaml
  colformula apply formulas.yaml data.json --format json -o result.json
  colformula refs --formula \"@add(a, @mul(b, 2))\"
  colformula functions --docs

Logging goes to stderr; set RUST_LOG to adjust it.")]
#[command(version)]
struct Cli {
    /// Log every formula as it is applied
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for FileFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => FileFormat::Yaml,
            OutputFormat::Json => FileFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Apply every enabled formula in CONFIG to the dataset in DATA.

DATA is a YAML or JSON file (picked by extension), either column-oriented:
  price: [100, 200]
  qty: [2, 3]
or a list of row mappings:
  - {price: 100, qty: 2}
  - {price: 200, qty: 3}

The first failing formula stops the run and is reported with its column.")]
    /// Apply formulas to a dataset
    Apply {
        /// Formula config (YAML or JSON)
        config: PathBuf,

        /// Dataset file (YAML or JSON)
        data: PathBuf,

        /// Output format (default: from --output extension, else yaml)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check formulas without producing output
    Validate {
        /// Formula config (YAML or JSON)
        config: PathBuf,

        /// Dataset file (YAML or JSON)
        data: PathBuf,
    },

    /// Show the columns formulas read
    Refs {
        /// Formula config (YAML or JSON)
        #[arg(required_unless_present = "formula")]
        config: Option<PathBuf>,

        /// A single formula to analyse
        #[arg(long)]
        formula: Option<String>,
    },

    /// List available functions
    Functions {
        /// Show each function's documentation
        #[arg(long)]
        docs: bool,
    },

    /// Print the normalized config (disabled formulas dropped, version stamped)
    Export {
        /// Formula config (YAML or JSON)
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "royalbit_colformula=debug"
    } else {
        "royalbit_colformula=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let verbose = args.verbose;
    init_tracing(verbose);

    match args.command {
        Commands::Apply {
            config,
            data,
            format,
            output,
        } => cli::apply(config, data, format.map(Into::into), output, verbose)?,

        Commands::Validate { config, data } => cli::validate(config, data)?,

        Commands::Refs { config, formula } => cli::refs(config, formula)?,

        Commands::Functions { docs } => cli::functions(docs)?,

        Commands::Export { config, format } => cli::export(config, format.map(Into::into))?,
    }

    Ok(())
}
