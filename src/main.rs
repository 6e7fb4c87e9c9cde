use anyhow::Result;
use clap::Parser;
use earshot::cli::{Cli, Commands, resolve_language};
use earshot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None | Some(Commands::Serve) => {
            let config = load_config(&cli)?;
            earshot::app::run_serve(config).await
        }
        Some(Commands::Once) => {
            let config = load_config(&cli)?;
            earshot::app::run_once(config).await
        }
        Some(Commands::Devices) => earshot::app::run_devices(),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) if path.exists() => Config::load(&path)?,
            _ => Config::default(),
        },
    };

    config = config.with_env_overrides();

    if let Some(language) = &cli.language {
        config.stt.language = resolve_language(language);
    }
    if let Some(bind) = &cli.bind {
        config.server.bind_addr = bind.clone();
    }
    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }

    Ok(config)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("earshot={}", default_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
