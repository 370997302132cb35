// Use jemalloc for better memory allocation performance on Unix-like systems
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

// Use mimalloc on Windows for better performance
#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use colored::*;
use core::error::Error;

use linemark_lib::annotators;
use linemark_lib::config::{self as linemark_config, Config};
use linemark_lib::exit_codes::exit;

mod file_processor;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"], help = "Control colored output: auto, always, never")]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true, help = "Path to configuration file")]
    config: Option<String>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(
        long,
        global = true,
        help = "Ignore all configuration files and use built-in defaults"
    )]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark annotated lines in rendered HTML files, rewriting them in place
    Process(ProcessArgs),
    /// Dry run: report files that would change, exit 1 if any would
    Check(ProcessArgs),
    /// Initialize a new configuration file
    Init,
    /// Show the effective configuration
    Config {
        /// Show only the default configuration values
        #[arg(long, help = "Show only the default configuration values")]
        defaults: bool,
        #[arg(long, default_value = "toml", value_parser = ["toml", "json"], help = "Output format (toml or json)")]
        output: String,
    },
    /// Show version information
    Version,
}

/// Write mode determines both filesystem effects and exit code behavior:
/// Check never writes and exits 1 when files would change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Write,
    Check,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Files or directories to process
    #[arg(required = false)]
    paths: Vec<String>,

    /// Include only specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    pub include: Option<String>,

    /// Exclude specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    pub exclude: Option<String>,

    /// Disable all exclude patterns (process all files regardless of exclude configuration)
    #[arg(long, help = "Disable all exclude patterns")]
    pub no_exclude: bool,

    /// Respect .gitignore files when scanning directories
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Respect .gitignore files when scanning directories (overrides the config file; does not apply to explicitly provided paths)"
    )]
    pub respect_gitignore: Option<bool>,

    /// Show detailed output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress progress and summary output (errors still go to stderr)
    #[arg(short, long, help = "Suppress progress and summary output (errors still go to stderr)")]
    pub quiet: bool,

    /// Disable all output (but still exit with status code)
    #[arg(short, long, help = "Disable all output (but still exit with status code)")]
    pub silent: bool,

    #[arg(skip)]
    pub write_mode: WriteMode,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .try_init();
}

fn load_config_with_cli_error_handling(config_path: Option<&str>, isolated: bool) -> Config {
    match Config::load(config_path, isolated) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn run_process(args: &ProcessArgs, config_path: Option<&str>, isolated: bool) -> ! {
    init_logging(args.verbose);

    let config = load_config_with_cli_error_handling(config_path, isolated);
    if let Err(e) = config.validate() {
        eprintln!("{}: {}", "Config error".red().bold(), e);
        exit::tool_error();
    }

    let annotators = annotators::all_annotators(&config);

    let files = match file_processor::find_files(&args.paths, args, &config) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}: {e:#}", "Error".red().bold());
            exit::tool_error();
        }
    };

    if files.is_empty() {
        if !args.quiet && !args.silent {
            println!("No HTML files found to process");
        }
        exit::success();
    }

    let write = args.write_mode == WriteMode::Write;
    let summary = file_processor::process_files(
        &files,
        &annotators,
        &config,
        write,
        args.verbose,
        args.quiet,
        args.silent,
    );

    if !args.quiet && !args.silent {
        if summary.files_changed > 0 {
            if write {
                println!(
                    "{} Marked {} line(s) in {} block(s) across {}/{} file(s)",
                    "Done:".green().bold(),
                    summary.lines_marked,
                    summary.blocks_annotated,
                    summary.files_changed,
                    summary.files_processed
                );
            } else {
                println!(
                    "{} {} of {} file(s) would change",
                    "Check:".yellow().bold(),
                    summary.files_changed,
                    summary.files_processed
                );
            }
        } else {
            println!(
                "{} No annotated code blocks in {} file(s)",
                "Done:".green().bold(),
                summary.files_processed
            );
        }
    }

    if summary.errors > 0 {
        exit::tool_error();
    }
    if !write && summary.files_changed > 0 {
        exit::changes_needed();
    }
    exit::success();
}

fn handle_config_command(defaults: bool, output: &str, config_path: Option<&str>, isolated: bool) {
    let config = if defaults {
        let base = Config::default();
        let mut config = base.clone();
        for annotator in annotators::all_annotators(&base) {
            if let Some((section, toml::Value::Table(table))) = annotator.default_config_section() {
                config.annotators.insert(section, table);
            }
        }
        config
    } else {
        load_config_with_cli_error_handling(config_path, isolated)
    };

    let rendered = match output {
        "json" => serde_json::to_string_pretty(&config).unwrap_or_else(|e| {
            eprintln!("{}: Failed to serialize config: {}", "Error".red().bold(), e);
            exit::tool_error();
        }),
        _ => toml::to_string_pretty(&config).unwrap_or_else(|e| {
            eprintln!("{}: Failed to serialize config: {}", "Error".red().bold(), e);
            exit::tool_error();
        }),
    };
    println!("{rendered}");
}

fn main() -> Result<(), Box<dyn Error>> {
    // Reset SIGPIPE to default behavior on Unix so piping to `head` etc. works correctly.
    // Without this, Rust ignores SIGPIPE and `println!` panics on broken pipe.
    #[cfg(unix)]
    {
        // SAFETY: Setting SIGPIPE to SIG_DFL is standard practice for CLI tools
        // that produce output meant to be piped. This is safe and idiomatic.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();

    // Set color override globally based on --color flag
    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    match cli.command {
        Commands::Process(mut args) => {
            args.write_mode = WriteMode::Write;
            run_process(&args, cli.config.as_deref(), cli.no_config);
        }
        Commands::Check(mut args) => {
            args.write_mode = WriteMode::Check;
            run_process(&args, cli.config.as_deref(), cli.no_config);
        }
        Commands::Init => match linemark_config::create_default_config(".linemark.toml") {
            Ok(()) => {
                println!("Created default configuration file: .linemark.toml");
            }
            Err(e) => {
                eprintln!("{}: Failed to create config file: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        },
        Commands::Config { defaults, output } => {
            handle_config_command(defaults, &output, cli.config.as_deref(), cli.no_config);
        }
        Commands::Version => {
            println!("linemark {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
