use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use langtool_cli::config::Provider;
use langtool_cli::convert::{ConvertOptions, run_convert_command};
use langtool_cli::export::run_export_command;
use langtool_cli::extract::run_extract_keys_command;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a localization file into more languages and write the platform outputs.
    Convert {
        /// Target platform: ios, flutter or electron
        #[arg(short, long)]
        platform: String,

        /// The input file (.strings, .xcstrings, .arb or .json)
        #[arg(short, long)]
        input: String,

        /// Output .xcstrings file, or output directory for one file per language
        #[arg(short, long)]
        output: Option<String>,

        /// Target language codes, comma separated (e.g. fr,ja,zh-Hans)
        #[arg(short, long, value_delimiter = ',', required = true)]
        languages: Vec<String>,

        /// Write back to the input file (.xcstrings) or next to it
        #[arg(long, conflicts_with = "output")]
        sync_to_source: bool,

        /// Also export the merged catalog (csv)
        #[arg(long)]
        export: Option<String>,

        /// Only translate keys that have no value in a target language yet
        #[arg(long)]
        only_missing: bool,

        /// Translator config file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Translation provider, overriding the config file
        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Number of texts per translation request
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// List every key containing Chinese characters in a JSON document.
    ExtractKeys {
        /// The JSON file to scan
        #[arg(short, long)]
        input: String,

        /// Write keys to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export a localization file as a CSV table.
    Export {
        /// The input file to export
        #[arg(short, long)]
        input: String,

        /// Check the input against this platform's accepted file types
        #[arg(short, long)]
        platform: Option<String>,

        /// The CSV file to write
        #[arg(short, long)]
        output: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.commands {
        Commands::Convert {
            platform,
            input,
            output,
            languages,
            sync_to_source,
            export,
            only_missing,
            config,
            provider,
            batch_size,
        } => run_convert_command(ConvertOptions {
            platform,
            input,
            output,
            languages,
            sync_to_source,
            export,
            only_missing,
            config,
            provider,
            batch_size,
        }),
        Commands::ExtractKeys { input, output } => run_extract_keys_command(input, output),
        Commands::Export {
            input,
            platform,
            output,
        } => run_export_command(input, platform, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
