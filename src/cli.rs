use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tapp_manifest::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tapp_pack::{ManifestOverrides, PackOptions};

/// Open and build .tapp web application packages.
#[derive(Debug, Parser)]
#[command(name = "tapp")]
pub struct Cli {
    /// Config file [default: config.toml in the platform config directory]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a package (if needed) and resolve its entry point
    Open {
        package: PathBuf,
        /// Open developer tools regardless of the manifest
        #[arg(long)]
        devtools: bool,
    },
    /// Pack a web project into a .tapp archive
    Pack(PackArgs),
    /// Print the cache directory a package extracts to, without extracting it
    CachePath { package: PathBuf },
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Project directory (containing package.json)
    pub project: PathBuf,
    /// Output file [default: <project>/<name>.tapp]
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Install dependencies and run the build script first
    #[arg(long)]
    pub build: bool,
    /// Remove dist/ before building
    #[arg(long)]
    pub clean: bool,
    /// Extra file or directory to include (repeatable)
    #[arg(long, value_name = "PATH")]
    pub include: Vec<PathBuf>,
    /// Generate tapp.json even if the project already has one
    #[arg(long)]
    pub force_manifest: bool,
    /// Entry document [default: dist/index.html]
    #[arg(long)]
    pub entry: Option<String>,
    /// App name [default: package.json name]
    #[arg(long)]
    pub name: Option<String>,
    /// App version [default: package.json version]
    #[arg(long)]
    pub version: Option<String>,
    /// Window title [default: the app name]
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,
    /// Make the window non-resizable
    #[arg(long)]
    pub fixed: bool,
    /// Open developer tools by default
    #[arg(long)]
    pub devtools: bool,
}

impl From<PackArgs> for PackOptions {
    fn from(args: PackArgs) -> Self {
        Self {
            project: args.project,
            out: args.out,
            build: args.build,
            clean: args.clean,
            include: args.include,
            force_manifest: args.force_manifest,
            manifest: ManifestOverrides {
                entry: args.entry,
                name: args.name,
                version: args.version,
                title: args.title,
                width: args.width,
                height: args.height,
                fixed: args.fixed,
                devtools: args.devtools,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_open() {
        let cli = Cli::try_parse_from(["tapp", "-vv", "open", "app.tapp", "--devtools"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Open { ref package, devtools: true } if package.ends_with("app.tapp")));
    }

    #[test]
    fn parse_pack_into_options() {
        let cli = Cli::try_parse_from([
            "tapp", "pack", "web", "--include", "LICENSE", "--include", "public", "--version", "2.0.0", "--fixed",
        ])
        .unwrap();
        let Command::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        let options = PackOptions::from(args);
        assert_eq!(options.project, PathBuf::from("web"));
        assert_eq!(options.include, [PathBuf::from("LICENSE"), PathBuf::from("public")]);
        assert_eq!(options.manifest.version.as_deref(), Some("2.0.0"));
        assert_eq!((options.manifest.width, options.manifest.height), (1280, 720));
        assert!(options.manifest.fixed);
        assert!(!options.build);
    }

    #[test]
    fn zero_width_rejected() {
        assert!(Cli::try_parse_from(["tapp", "pack", "web", "--width", "0"]).is_err());
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["tapp", "cache-path", "app.tapp", "--config", "tapp.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("tapp.toml")));
    }
}
