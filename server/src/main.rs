use clap::Parser;
use log::info;
use server::dictionary::Dictionary;
use server::lobby::{Lobby, LobbyConfig};
use server::network::Server;
use shared::{MAX_GUESSES, PORT};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dictionary file with one word per line
    dictionary: PathBuf,

    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = PORT)]
    port: u16,

    /// Wrong guesses allowed per round
    #[arg(short = 'g', long, default_value_t = MAX_GUESSES,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_guesses: u32,
}

/// Loads the dictionary and runs the game server on a single thread.
///
/// The Rust runtime ignores SIGPIPE before `main` starts, so writing to a
/// socket the peer has closed comes back as an error instead of killing the
/// process.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let dictionary = Dictionary::load(&args.dictionary)?;
    let config = LobbyConfig {
        max_guesses: args.max_guesses,
        ..LobbyConfig::default()
    };
    info!(
        "Starting game with {} words, {} guesses per round",
        dictionary.len(),
        config.max_guesses
    );

    let lobby = Lobby::new(config, Box::new(dictionary));
    let server = Server::bind(&format!("{}:{}", args.host, args.port), lobby).await?;
    server.run().await?;

    Ok(())
}
