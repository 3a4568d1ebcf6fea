mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::path::Path;
use std::process::ExitCode;
use tapp_cache::PackageCache;
use tapp_config::Config;
use tapp_loader::{LoadedPackage, Loader};
use tapp_pack::{PackOptions, Packed};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config);
    let level = config.as_ref().map(|config| config.log_level.as_str()).unwrap_or("warn");
    init_tracing(&filter_directive(level, cli.verbose));

    let result = config.and_then(|config| run(cli.command, &config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

/// `-v` and `-vv` replace the configured level with `debug` and `trace`.
fn filter_directive(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(directive: &str) {
    // RUST_LOG wins whenever it's set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Open { package, devtools } => {
            let loaded = open(config, &package, devtools)?;
            print!("{}", describe(&loaded));
        },
        Command::CachePath { package } => {
            let cache = PackageCache::new(&config.cache_root).or_raise(|| ErrorKind::CachePath)?;
            let path = cache.locate(&package).or_raise(|| ErrorKind::CachePath)?;
            println!("{}", path.display());
        },
        Command::Pack(args) => {
            let packed = tapp_pack::pack(&PackOptions::from(args)).or_raise(|| ErrorKind::Pack)?;
            print!("{}", summarize(&packed));
        },
    }
    Ok(())
}

fn open(config: &Config, package: &Path, devtools: bool) -> Result<LoadedPackage> {
    let loader = Loader::with_cache_root(&config.cache_root)
        .or_raise(|| ErrorKind::Open)?
        .with_virtual_host(&config.virtual_host);
    loader.open(package, devtools).or_raise(|| ErrorKind::Open)
}

fn describe(loaded: &LoadedPackage) -> String {
    let window = &loaded.manifest.window;
    let resizable = if window.resizable { "resizable" } else { "fixed" };
    let dev_tools = if loaded.open_dev_tools { "on" } else { "off" };
    format!(
        "root:           {}\n\
         mapping folder: {}\n\
         entry:          {}\n\
         url:            {}\n\
         title:          {}\n\
         window:         {}x{} ({resizable})\n\
         dev tools:      {dev_tools}\n",
        loaded.root.display(),
        loaded.mapping_folder.display(),
        loaded.entry,
        loaded.url(),
        loaded.manifest.window_title(),
        window.width,
        window.height,
    )
}

fn summarize(packed: &Packed) -> String {
    let source = if packed.generated_manifest { "generated" } else { "from project" };
    format!("{} ({} files, manifest {source})\n", packed.path.display(), packed.entries)
}
