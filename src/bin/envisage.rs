use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use clap::{Args, Parser, Subcommand};
use envisage::{CheckOptions, DEFAULT_FILE, Error, FileLoader, LoadReport, MemoryEnv, ProcessEnv};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "envisage")]
#[command(about = "Inspect, validate and apply KEY=VALUE environment files", long_about = None)]
#[command(version)]
struct Cli {
    /// Print loader diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the declarations parsed from a file
    Show(FileArgs),

    /// Validate a variable of the current environment
    Check {
        key: String,

        /// Value used when the variable is absent
        #[arg(long, default_value = "")]
        default: String,

        /// Fail when the variable is absent
        #[arg(long)]
        mandatory: bool,

        /// Accept an empty value
        #[arg(long)]
        allow_empty: bool,
    },

    /// Load a file and execute a command with the resulting variables
    Run {
        #[command(flatten)]
        file: FileArgs,

        /// Replace variables that are already defined
        #[arg(short = 'o', long = "override")]
        override_existing: bool,

        /// Command to execute
        program: OsString,

        /// Arguments passed to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}

#[derive(Debug, Args)]
struct FileArgs {
    /// Path of the KEY=VALUE file
    #[arg(short, long, default_value = DEFAULT_FILE)]
    file: PathBuf,

    /// Succeed with no variables when the file is missing
    #[arg(short = 'i', long)]
    ignore_missing: bool,
}

impl FileArgs {
    fn loader(&self) -> FileLoader {
        FileLoader::new(&self.file).must_exist(!self.ignore_missing)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match execute(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("envisage: {err}");
            1
        }
    };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(command: Commands) -> Result<i32, Error> {
    match command {
        Commands::Show(file) => {
            for entry in &file.loader().parse_only()? {
                println!("{}={}", entry.key, entry.value);
            }
            Ok(0)
        }
        Commands::Check {
            key,
            default,
            mandatory,
            allow_empty,
        } => {
            let mut env = ProcessEnv::snapshot();
            let options = CheckOptions::new()
                .mandatory(mandatory)
                .allow_empty(allow_empty);
            envisage::check(&mut env, &key, &default, options)?;
            Ok(0)
        }
        Commands::Run {
            file,
            override_existing,
            program,
            args,
        } => {
            let mut env = ProcessEnv::snapshot();
            let report = file
                .loader()
                .update_environment(true)
                .skip_if_already_defined(!override_existing)
                .load(&mut env)?;
            let mut command = Command::new(program);
            command.args(args);
            apply_loaded(&mut command, &report, &env);
            Ok(execute_command(command))
        }
    }
}

/// Set every loaded key on the child to its resolved value, which is the
/// inherited one when the key was skipped.
fn apply_loaded(command: &mut Command, report: &LoadReport, env: &MemoryEnv) {
    for key in report.entries.keys() {
        if let Some(value) = env.get(key) {
            command.env(key, value);
        }
    }
}

#[cfg(unix)]
fn execute_command(mut command: Command) -> i32 {
    let err = command.exec();
    eprintln!(
        "envisage: failed to execute `{}`: {err}",
        command.get_program().to_string_lossy()
    );
    127
}

#[cfg(not(unix))]
fn execute_command(mut command: Command) -> i32 {
    match command.status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(err) => {
            eprintln!(
                "envisage: failed to execute `{}`: {err}",
                command.get_program().to_string_lossy()
            );
            127
        }
    }
}
