//! limefetch CLI - fetch verified LiME kernel modules.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use limefetch::{Repository, RepositoryResult};

#[derive(Parser, Debug)]
#[command(
    name = "limefetch",
    version,
    about = "Fetch checksum-verified LiME kernel modules from a package repository"
)]
struct Cli {
    /// Repository base URL
    #[arg(long = "repo", value_name = "URL")]
    repo_url: String,

    /// Kernel version to resolve
    #[arg(long, value_name = "VERSION")]
    kernel_version: String,

    /// Manifest category to search
    #[arg(long, value_name = "TYPE", default_value = "kernel")]
    manifest_type: String,

    /// Fetch the repository metadata signature (advisory check only)
    #[arg(long)]
    gpg_verify: bool,

    /// Directory the module is written into
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Mirror log output into this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match limefetch::logging::init_logging(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> RepositoryResult<PathBuf> {
    let repository = Repository::new(&cli.repo_url, cli.gpg_verify)?
        .with_output_dir(cli.output_dir.clone());
    repository.fetch(&cli.kernel_version, &cli.manifest_type)
}
