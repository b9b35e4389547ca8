use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::Level;
use tracing::error;

use capgen::codegen::datatable::clean_generated_files;
use capgen::driver::{RunConfig, run_capgen};

/// Create physics parameterization caps, host-model interface code, and
/// the build datatable from validated interface metadata.
#[derive(Debug, Parser)]
#[command(name = "capgen", version, about)]
struct Cli {
    /// Comma-separated list of host metadata filenames to process.
    /// Filenames with a '.txt' suffix are treated as containing a list
    /// of metadata filenames.
    #[arg(long, required = true, value_name = "HOST FILES")]
    host_files: String,

    /// Comma-separated list of scheme metadata filenames to process.
    /// Filenames with a '.txt' suffix are treated as containing a list
    /// of metadata filenames.
    #[arg(long, required = true, value_name = "SCHEME FILES")]
    scheme_files: String,

    /// Comma-separated list of suite definition filenames to process.
    #[arg(long, required = true, value_name = "SUITE FILES")]
    suites: String,

    /// Filename for information on the content generated by this run.
    #[arg(long, default_value = "datatable.json", value_name = "DATATABLE")]
    datatable: PathBuf,

    /// Directory for generated files.
    #[arg(long, default_value = ".", value_name = "OUTPUT ROOT")]
    output_root: PathBuf,

    /// Name of the host model; passing it triggers host-cap generation.
    #[arg(long, default_value = "", value_name = "HOST NAME")]
    host_name: String,

    /// Data size for real(kind_phys) data.
    #[arg(long, default_value = "REAL64", value_name = "KIND PHYS")]
    kind_phys: String,

    /// Remove files created by a previous run, then exit.
    #[arg(long)]
    clean: bool,

    /// Log more activity, repeat for increased output.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    //verbosity affects diagnostic detail only, never outcomes
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let datatable = if cli.datatable.is_absolute() {
        cli.datatable.clone()
    } else {
        cli.output_root.join(&cli.datatable)
    };

    let result = if cli.clean {
        clean_generated_files(&datatable)
    } else {
        let config = RunConfig {
            host_files: cli.host_files,
            scheme_files: cli.scheme_files,
            suites: cli.suites,
            datatable,
            output_root: cli.output_root,
            host_name: (!cli.host_name.is_empty()).then_some(cli.host_name),
            kind_phys: cli.kind_phys,
        };
        run_capgen(&config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_internal() => {
            //a defect in the loader/extractor, not in the user's input
            error!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}
