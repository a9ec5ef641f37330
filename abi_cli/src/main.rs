use abi_gen::cmds::analyze::ReportFormat;
use abi_gen::cmds::common::OptionOverrides;
use abi_reflect::Reflector;
use abi_runtime::{event_topic, selector, B256};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value as Json;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abi")]
#[command(about = "Contract ABI toolchain - codec generation, analysis and reflection")]
#[command(version)]
struct Cli {
    /// Log progress to stderr (repeat for more detail)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust codecs from interface descriptions
    Codegen {
        /// Interface files (JSON or YAML ABI, or the declaration DSL)
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output directory for generated modules
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        #[command(flatten)]
        options: GeneratorArgs,
    },

    /// Show selectors, topics and the interned types of interfaces
    Analyze {
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Print the emission plan as JSON instead of a summary
        #[arg(long = "format", value_enum, default_value = "text")]
        format: Format,

        /// Shorthand for `--format json`
        #[arg(long = "print-plan")]
        print_plan: bool,

        #[command(flatten)]
        options: GeneratorArgs,
    },

    /// Print the selector and event topic of canonical signatures
    Selector {
        #[arg(value_name = "SIGNATURE", required = true)]
        signatures: Vec<String>,
    },

    /// Encode a call from JSON arguments and print the hex calldata
    Encode {
        #[arg(short = 'f', long = "abi-file", required = true)]
        abi_file: PathBuf,

        /// Function name or full signature
        #[arg(long = "function", required = true)]
        function: String,

        /// Arguments as a JSON array or an object keyed by argument name
        #[arg(long = "args", default_value = "[]")]
        args: String,
    },

    /// Decode calldata, return data, revert data or an event log to JSON
    Decode {
        #[arg(short = 'f', long = "abi-file", required = true)]
        abi_file: PathBuf,

        #[command(subcommand)]
        payload: Payload,

        /// Pretty print JSON output
        #[arg(short = 'p', long = "pretty", global = true)]
        pretty: bool,
    },
}

#[derive(Subcommand)]
enum Payload {
    /// Selector-prefixed calldata
    Call { data: String },
    /// Return data of the named function
    Returns { function: String, data: String },
    /// Revert data, matched against declared and builtin errors
    Revert { data: String },
    /// An event log
    Log {
        /// Topics in order, topic0 first
        #[arg(long = "topic")]
        topics: Vec<String>,
        #[arg(long = "data", default_value = "0x")]
        data: String,
    },
}

#[derive(Args)]
struct GeneratorArgs {
    /// Generator config file (YAML, or JSON by extension)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Route catalogued types to the runtime's shared codecs
    #[arg(long = "stdlib")]
    stdlib: bool,

    /// Emit zero-copy views
    #[arg(long = "lazy-views")]
    lazy_views: bool,

    /// Emit packed encoders for every function
    #[arg(long = "packed")]
    packed: bool,

    /// Crate path generated code imports its runtime from
    #[arg(long = "runtime-crate", value_name = "PATH")]
    runtime_crate: Option<String>,

    /// Use an existing type for a tuple: STRUCTURAL_HASH=RUST_PATH
    #[arg(long = "external", value_name = "HASH=PATH")]
    external: Vec<String>,
}

impl From<GeneratorArgs> for OptionOverrides {
    fn from(args: GeneratorArgs) -> Self {
        OptionOverrides {
            config: args.config,
            stdlib: args.stdlib,
            lazy_views: args.lazy_views,
            packed: args.packed,
            runtime_crate: args.runtime_crate,
            external: args.external,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    Text,
    Json,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Codegen {
            files,
            output_dir,
            options,
        } => {
            let written = abi_gen::cmds::codegen::run(&files, &output_dir, &options.into())?;
            for path in written {
                println!("{}", path.display());
            }
        }

        Commands::Analyze {
            files,
            format,
            print_plan,
            options,
        } => {
            let format = match format {
                _ if print_plan => ReportFormat::Json,
                Format::Text => ReportFormat::Text,
                Format::Json => ReportFormat::Json,
            };
            print!("{}", abi_gen::cmds::analyze::run(&files, &options.into(), format)?);
        }

        Commands::Selector { signatures } => {
            for signature in signatures {
                let signature = signature.split_whitespace().collect::<String>();
                println!("0x{}  {}", hex::encode(selector(&signature)), signature);
                println!("0x{}", hex::encode(event_topic(&signature)));
            }
        }

        Commands::Encode {
            abi_file,
            function,
            args,
        } => {
            let reflector = load_reflector(&abi_file)?;
            let args: Json = serde_json::from_str(&args).context("--args is not valid JSON")?;
            let data = reflector.encode_call_json(&function, &args)?;
            println!("0x{}", hex::encode(data));
        }

        Commands::Decode {
            abi_file,
            payload,
            pretty,
        } => {
            let reflector = load_reflector(&abi_file)?;
            let json = run_decode(&reflector, payload)?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{}", serde_json::to_string(&json)?);
            }
        }
    }

    Ok(())
}

fn load_reflector(path: &PathBuf) -> anyhow::Result<Reflector> {
    let abi = abi_loader::load_file(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Reflector::new(abi))
}

fn run_decode(reflector: &Reflector, payload: Payload) -> anyhow::Result<Json> {
    let json = match payload {
        Payload::Call { data } => serde_json::to_value(reflector.decode_call(&parse_hex(&data)?)?)?,
        Payload::Revert { data } => serde_json::to_value(reflector.decode_error(&parse_hex(&data)?)?)?,
        Payload::Returns { function, data } => {
            let values = reflector.decode_returns(&function, &parse_hex(&data)?)?;
            reflector.returns_to_json(&function, &values)?
        }
        Payload::Log { topics, data } => {
            let topics = topics
                .iter()
                .map(|topic| parse_topic(topic))
                .collect::<anyhow::Result<Vec<_>>>()?;
            serde_json::to_value(reflector.decode_log(&topics, &parse_hex(&data)?)?)?
        }
    };
    Ok(json)
}

fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    debug!(len = digits.len() / 2, "parsing hex payload");
    hex::decode(digits).with_context(|| format!("'{}' is not valid hex", text))
}

fn parse_topic(text: &str) -> anyhow::Result<B256> {
    let bytes = parse_hex(text)?;
    if bytes.len() != 32 {
        bail!("topic '{}' is {} bytes, expected 32", text, bytes.len());
    }
    Ok(B256::from_slice(&bytes))
}
