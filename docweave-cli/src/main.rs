//! Command-line interface for docweave
//! This binary converts documents between the formats in the codec registry.
//!
//! Usage:
//!   docweave convert `<input>` [`<output>`] [--to `<format>`] [--from `<format>`] [--config `<file>`]
//!   docweave formats                                   - List the registered codecs
//!
//! Without an output path, text output goes to stdout. Configuration is the embedded defaults,
//! then `docweave.toml` in the working directory if present (or the file given by `--config`),
//! then command-line flags.

use clap::{Arg, ArgAction, ArgMatches, Command};
use docweave_codecs::{convert, default_registry, Codec, ConvertOptions, ConvertOutput};
use docweave_config::{ConfigError, DocweaveConfig, Loader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOCAL_CONFIG: &str = "docweave.toml";

fn main() {
    let matches = Command::new("docweave")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents between Markdown, JATS, HTML, notebooks and more")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document from one format to another")
                .arg(
                    Arg::new("input")
                        .help("Input path, http(s) URL, or the content itself")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .help("Output path; text formats are printed to stdout when omitted")
                        .index(2),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Output format (e.g. md, jats, html, pdf); defaults to the output extension"),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .help("Input format; defaults to the input extension or its content"),
                )
                .arg(
                    Arg::new("fragment")
                        .long("fragment")
                        .help("Write HTML as a bare <article> rather than a complete page")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .help("Column to wrap Markdown at, 0 for no wrapping")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(Command::new("formats").about("List the available formats"))
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}");
        std::process::exit(1);
    });
    init_logging(&config);

    match matches.subcommand() {
        Some(("convert", sub)) => handle_convert_command(sub, &config),
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!("a subcommand is required"),
    }
}

/// Defaults, then the config file, then flags
fn load_config(matches: &ArgMatches) -> Result<DocweaveConfig, ConfigError> {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };

    if let Some(("convert", sub)) = matches.subcommand() {
        if sub.get_flag("fragment") {
            loader = loader.set_override("convert.html.standalone", false)?;
        }
        if let Some(width) = sub.get_one::<u32>("width") {
            loader = loader.set_override("convert.markdown.width", i64::from(*width))?;
        }
    }
    loader.build()
}

/// `RUST_LOG` wins over the configured level; logs go to stderr so stdout stays clean
fn init_logging(config: &DocweaveConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the convert command
fn handle_convert_command(matches: &ArgMatches, config: &DocweaveConfig) {
    let input = matches
        .get_one::<String>("input")
        .expect("input is a required argument");
    let output = matches.get_one::<String>("output").map(Path::new);

    let options = ConvertOptions {
        from: matches.get_one::<String>("from").cloned(),
        to: matches.get_one::<String>("to").cloned(),
        encode: config.to_encode_options(None, None),
        ..Default::default()
    };

    let result = convert(input, output, &options);
    docweave_codecs::shutdown();

    match result {
        Ok(ConvertOutput::InMemory(text)) => print!("{text}"),
        Ok(ConvertOutput::File(path)) => {
            tracing::info!(path = %path.display(), "wrote output");
        }
        Err(err) => {
            eprintln!("Conversion error: {err}");
            std::process::exit(1);
        }
    }
}

/// Handle the formats command
fn handle_formats_command() {
    println!("Available formats:\n");

    for codec in default_registry().codecs() {
        let direction = match (codec.supports_decoding(), codec.supports_encoding()) {
            (true, true) => "from/to",
            (true, false) => "from",
            (false, true) => "to",
            (false, false) => "-",
        };
        println!("  {:<8} {:<8} {}", codec.name(), direction, codec.description());
    }
}
