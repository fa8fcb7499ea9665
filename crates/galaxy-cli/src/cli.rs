use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the Galaxy API
    #[clap(name = "serve", visible_alias = "s")]
    Serve {
        /// Address to bind to
        #[arg(required = false, short, long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(required = false, short, long)]
        port: Option<u16>,
    },

    /// List release versions of a collection, newest first
    #[command(arg_required_else_help = true)]
    Versions {
        namespace: String,
        collection: String,
    },

    /// Build (or reuse) the artifact of a collection version and print its summary
    #[command(arg_required_else_help = true)]
    Build {
        namespace: String,
        collection: String,
        version: String,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
