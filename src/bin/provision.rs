//! provision - build and package EPICS Base + V4 from pinned sources
//!
//! Usage:
//!   provision run          Full pipeline: fetch, build, package
//!   provision source       Fetch, verify, and extract the sources
//!   provision build        Configure and build both distributions
//!   provision package      Collect artifacts into the package layout
//!   provision info         Print the consumer link library list

use anyhow::Result;
use clap::{Parser, Subcommand};
use epics_provision::{output, package, Compiler, Context, Platform, Provisioner};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "provision")]
#[command(about = "Provision EPICS Base and the EPICS V4 C++ bundle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory sources are downloaded to and built in
    #[arg(short, long, global = true, env = "EPICS_BUILD_DIR")]
    build_dir: Option<PathBuf>,

    /// Directory holding the platform configuration templates
    #[arg(short, long, global = true, default_value = "files")]
    files_dir: PathBuf,

    /// Directory the package layout is assembled in
    #[arg(short, long, global = true, default_value = "package")]
    package_dir: PathBuf,

    /// Build shared libraries instead of static (Linux only)
    #[arg(long, global = true)]
    shared: bool,

    /// Compiler family of the native toolchain
    #[arg(long, global = true, value_enum, default_value = "gcc")]
    compiler: Compiler,

    /// Override the detected platform
    #[arg(long, global = true, value_enum)]
    platform: Option<Platform>,

    /// Print build commands as they execute
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the complete pipeline
    Run,
    /// Fetch, verify, and extract both source distributions
    Source,
    /// Configure and build both distributions (sources must be present)
    Build,
    /// Collect artifacts into the package layout (builds must be present)
    Package,
    /// Print the ordered list of libraries consumers link against
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let platform = match cli.platform.or_else(Platform::detect) {
        Some(p) => p,
        None => anyhow::bail!("unsupported host platform: {}", std::env::consts::OS),
    };

    let mut ctx = Context::default()
        .files_dir(cli.files_dir)
        .package_dir(cli.package_dir)
        .platform(platform)
        .compiler(cli.compiler)
        .shared(cli.shared)
        .verbose(cli.verbose);
    if let Some(dir) = cli.build_dir {
        ctx = ctx.build_dir(dir);
    }

    let provisioner = Provisioner::new(ctx);

    let result = match cli.command {
        Commands::Run => provisioner.run(),
        Commands::Source => provisioner.source(),
        Commands::Build => provisioner.build().map(|_| ()),
        Commands::Package => provisioner.package(),
        Commands::Info => {
            package::print_package_info();
            return Ok(());
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
