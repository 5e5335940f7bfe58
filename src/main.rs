use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manual_trader_quiz::config::Config;
use manual_trader_quiz::dataset::{DatasetLoader, DatasetSource, DirSource, HttpSource};
use manual_trader_quiz::session::Session;
use manual_trader_quiz::shell::{self, Command, CommandError};
use manual_trader_quiz::store::AnswerStore;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `chart` output on stdout stays clean JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manual_trader_quiz=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    print_banner(&config);

    let source: Box<dyn DatasetSource> = match &config.dataset.data_url {
        Some(url) => Box::new(HttpSource::new(url)?),
        None => Box::new(DirSource::new(config.dataset.data_dir.clone())),
    };
    let loader = DatasetLoader::new(source);

    let dataset = match loader.load(&config.dataset.set).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("❌ Failed to load dataset: {}", e);
            return Err(e.into());
        }
    };

    let store = AnswerStore::new(&config.session.state_dir, &dataset.set);
    let mut session = Session::new(
        dataset,
        store,
        &config.session.default_timeframe,
        config.overlays,
    );

    println!("{}", shell::render_question(&session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match shell::parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("⚠️  {}", e);
                continue;
            }
        };

        match shell::execute(&mut session, command) {
            Ok(out) => println!("{}", out),
            Err(e) => println!("⚠️  {}", e),
        }
    }

    info!("👋 Session closed");
    Ok(())
}

fn print_banner(config: &Config) {
    println!("\n╔═══════════════════════════════════════════════════════════╗");
    println!("║              Manual Trader Quiz (self-grading)            ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("📚 Question set: {}", config.dataset.set);
    match &config.dataset.data_url {
        Some(url) => println!("🌐 Source: {}", url),
        None => println!("📁 Source: {}", config.dataset.data_dir.display()),
    }
    println!("💾 Answers: {}", config.session.state_dir.display());
    println!("⏱️  Default timeframe: {}", config.session.default_timeframe);
    println!(
        "📈 Overlays: EMA {} | BB {} | structure {}",
        on_off(config.overlays.ema),
        on_off(config.overlays.bb),
        on_off(config.overlays.structure)
    );
    println!();
    println!("Type 'help' for commands, 'quit' to exit");
    println!("═══════════════════════════════════════════════════════════");
    println!();
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
