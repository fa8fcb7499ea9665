use std::path::Path;

use clap::Parser;
use cli::{Args, Commands};
use galaxy_cli::server::{self, AppState};
use galaxy_config::config::{generate_default_config, Config};
use galaxy_core::{
    error::{ErrorContext, GalaxyError},
    ArtifactCache,
};
use galaxy_forge::{Forge, GitLab};
use logging::setup_logging;
use nu_ansi_term::Color::{Cyan, Green};
use tracing::info;
use utils::{Colored, BANNER};

mod cli;
mod logging;
mod utils;

fn open_cache(config: &Config) -> Result<ArtifactCache<Box<dyn Forge>>, GalaxyError> {
    let forge: Box<dyn Forge> = Box::new(GitLab::from_config(config));
    ArtifactCache::from_config(forge, config)
}

async fn handle_cli() -> Result<(), GalaxyError> {
    let args = Args::parse();

    utils::set_color(!args.no_color);
    setup_logging(&args);

    let config_path = args.config.as_deref().map(Path::new);
    let load_config = || Config::load(config_path);

    match args.command {
        Commands::DefConfig => {
            generate_default_config(config_path)?;
        }
        Commands::Serve { bind, port } => {
            let mut config = load_config()?;
            if bind.is_some() {
                config.bind = bind;
            }
            if port.is_some() {
                config.port = port;
            }
            config.resolve()?;

            if !args.quiet && !args.json {
                println!("{BANNER}");
            }

            let cache = open_cache(&config)?;
            info!("artifacts are stored in {}", cache.target_path().display());
            let state = AppState::new(cache, &config.public_url());
            let addr = config.listen_addr();
            server::serve(state, &addr)
                .await
                .with_context(|| format!("serving on {addr}"))?;
        }
        Commands::Versions {
            namespace,
            collection,
        } => {
            let cache = open_cache(&load_config()?)?;
            for version in cache.versions(&namespace, &collection)? {
                info!(
                    "{}.{}:{}",
                    namespace,
                    collection,
                    Colored(Green, version)
                );
            }
        }
        Commands::Build {
            namespace,
            collection,
            version,
        } => {
            let cache = open_cache(&load_config()?)?;
            let summary = cache.get_or_build(&namespace, &collection, &version)?;
            let artifact = cache.locate(&namespace, &collection, &version)?;

            info!("{}", Colored(Cyan, artifact.display()));
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
