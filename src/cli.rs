use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-audit")]
#[command(
    version,
    about = "Catalog Audit - Find storefront products with missing catalog images",
    long_about = "Catalog Audit\n\nModes:\n- audit: cross-reference the storefront category assignments with the master catalog and a WebDAV image library, reporting missing image groups, empty image groups, and image files absent from remote storage.\n- scan-remote: list the files of a WebDAV image library as the audit sees them.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with defaults for view type, site, and WebDAV settings; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit storefront products for missing images
    Audit {
        #[arg(long, value_name = "PATH", help = "Master catalog XML export")]
        master: PathBuf,

        #[arg(long, value_name = "PATH", help = "Storefront catalog XML export")]
        storefront: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,

        #[arg(
            long,
            value_name = "NAME",
            conflicts_with = "all_view_types",
            help = "Image group view type to check (e.g., large); 'all' checks every group"
        )]
        view_type: Option<String>,

        #[arg(long, help = "Check the images of every view type")]
        all_view_types: bool,

        #[arg(
            long,
            value_name = "SITE",
            help = "Site whose online flag takes precedence over the global flag"
        )]
        site_id: Option<String>,

        #[arg(long, help = "Skip products that are not online")]
        online_only: bool,

        #[arg(long, help = "Parse the two catalogs one after the other")]
        sequential: bool,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// List the files of a WebDAV image library
    ScanRemote {
        #[command(flatten)]
        remote: RemoteArgs,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Default)]
pub struct RemoteArgs {
    #[arg(
        long,
        value_name = "URL",
        help = "WebDAV URL of the image library (e.g., https://host/on/demandware.servlet/webdav/Sites/Catalogs/master)"
    )]
    pub webdav_url: Option<String>,

    #[arg(long, help = "WebDAV username (or CATALOG_AUDIT_USERNAME)")]
    pub username: Option<String>,

    #[arg(long, help = "WebDAV password (or CATALOG_AUDIT_PASSWORD)")]
    pub password: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Prefix stripped from listed paths (defaults to the URL path)"
    )]
    pub base_path: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "WebDAV request timeout")]
    pub timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
