use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gourmet-bot")]
#[command(about = "LINE bot that echoes text and answers locations with nearby restaurants", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server (GET / and POST /callback). Requires LINE_CHANNEL_SECRET and LINE_CHANNEL_ACCESS_TOKEN.
    Serve {
        /// Config file path (default: GOURMET_BOT_CONFIG_PATH or ~/.gourmet-bot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Listening port (default from PORT, config, or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run one restaurant search and print the reply the bot would send for that location.
    Search {
        /// Config file path (default: GOURMET_BOT_CONFIG_PATH or ~/.gourmet-bot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("gourmet-bot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Search { config, lat, lng }) => {
            if let Err(e) = run_search(config, lat, lng).await {
                log::error!("search failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(config_path: Option<std::path::PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = gourmet::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting webhook server on {}:{}", config.server.bind, config.server.port);
    gourmet::gateway::run_gateway(config).await
}

async fn run_search(config_path: Option<std::path::PathBuf>, lat: f64, lng: f64) -> anyhow::Result<()> {
    let config = gourmet::config::load_config(config_path)?;
    let http = gourmet::gateway::build_http_client(config.search.timeout())?;
    let search = gourmet::search::HotPepperClient::new(&config.search, http);
    let builder = gourmet::bot::ReplyBuilder::new(search, config.reply.format);
    let payload = builder.location_reply(lat, lng).await;
    match payload.as_text() {
        Some(text) => println!("{}", text.trim_end()),
        None => println!("{}", serde_json::to_string_pretty(&payload)?),
    }
    Ok(())
}
