use clap::Parser;
use spectator_client::config::cli::{CliConfig, Command, ListenArgs};
use spectator_client::utils::{logger, validation::Validate};
use spectator_client::{LineListener, Registry, SpectatorConfig, SpectatorError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let outcome = match &cli.command {
        Command::Send(args) => send(&cli, args),
        Command::Listen(args) => listen(args).await,
        Command::CheckConfig => check_config(&cli),
    };

    if let Err(e) = outcome {
        tracing::error!("❌ {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    Ok(())
}

fn send(cli: &CliConfig, args: &spectator_client::config::cli::SendArgs) -> Result<(), SpectatorError> {
    let config = cli.load_config()?;
    let registry = Registry::new(config)?;

    args.emit(&registry)?;
    registry.flush();
    if let Some(memory) = registry.memory_writer() {
        print!("{}", memory.last_line());
    }
    registry.close();
    Ok(())
}

async fn listen(args: &ListenArgs) -> Result<(), SpectatorError> {
    let mut listener = LineListener::bind(&args.bind).await?;
    tracing::info!("🔍 Waiting for measurements on {}", listener.local_location()?);

    let mut received = 0usize;
    loop {
        let lines = tokio::select! {
            lines = listener.recv() => lines?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, {} lines received", received);
                return Ok(());
            }
        };

        for line in lines {
            if args.json {
                let record = serde_json::json!({
                    "received_at": chrono::Utc::now().to_rfc3339(),
                    "line": line,
                });
                println!("{}", serde_json::to_string(&record)?);
            } else {
                println!("{}", line);
            }

            received += 1;
            if args.count.is_some_and(|limit| received >= limit) {
                return Ok(());
            }
        }
    }
}

fn check_config(cli: &CliConfig) -> Result<(), SpectatorError> {
    let path = cli
        .config
        .as_deref()
        .ok_or_else(|| SpectatorError::MissingConfigError {
            field: "--config".to_string(),
        })?;

    let file_config = SpectatorConfig::from_file(path)?;
    file_config.validate()?;

    println!("✅ {} is valid", path);
    println!("  writer.location   = {}", file_config.writer.location);
    println!("  writer.buffer_size = {}", file_config.buffer_size());
    if let Some(interval) = file_config.flush_interval() {
        println!("  writer.flush_interval = {:?}", interval);
    }
    for (key, value) in &file_config.tags {
        println!("  tags.{} = {}", key, value);
    }
    Ok(())
}
