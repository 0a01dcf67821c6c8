use std::sync::Arc;

use bot::config::BotConfig;
use bot::gateway::RocketClient;
use bot::services::dispatcher::Dispatcher;
use bot::services::registry::GameRegistry;
use bot::words::WordBook;

mod telemetry;

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let words = match WordBook::load(&config.words_path) {
        Ok(words) => Arc::new(words),
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let gateway = match RocketClient::login(
        &config.server_url,
        &config.username,
        &config.password,
    )
    .await
    {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("❌ Failed to sign in: {err}");
            std::process::exit(1);
        }
    };
    println!("✅ Signed in to {} as {}", config.server_url, config.username);

    let registry = Arc::new(GameRegistry::new(
        gateway.clone(),
        words,
        config.channel_id.clone(),
        config.poll_interval,
        config.tie_break_cap,
    ));
    let dispatcher = Dispatcher::new(
        registry,
        gateway,
        config.channel_id.clone(),
        config.poll_interval,
    );

    println!("🚀 Listening for commands in channel {}", config.channel_id);
    if let Err(err) = dispatcher.run().await {
        eprintln!("❌ Dispatcher stopped: {err}");
        std::process::exit(1);
    }
}
