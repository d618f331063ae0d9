//! spellcast CLI: spelling drill in the terminal, or as a local server.
//!
//! ```text
//! spellcast practice [--state-dir DIR]
//! spellcast serve [--port 2004] [--host 127.0.0.1]
//! spellcast status / advance / reset / replay [--server http://localhost:2004]
//! spellcast submit "necessary" [--server ...]
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spellcast_lib::announcer::Announcer;
use spellcast_lib::config::AppConfig;
use spellcast_lib::server;
use spellcast_lib::spellcast_core::session::Verdict;
use spellcast_lib::spellcast_core::types::{Cue, Phase, SessionView};
use spellcast_lib::store::FileStore;
use spellcast_lib::trainer::Trainer;
use spellcast_lib::voice::{ElevenLabsClient, VoiceChain};

type CliResult = Result<(), Box<dyn Error>>;

/// spellcast: spoken spelling drill
#[derive(Parser)]
#[command(name = "spellcast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Where the session is saved
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Kokoro TTS server URL
    #[arg(long, global = true)]
    kokoro_url: Option<String>,
    /// ElevenLabs voice
    #[arg(long, global = true)]
    voice_id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Drill in this terminal
    Practice,
    /// Start the spellcast HTTP server
    Serve {
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Show the running server's session
    Status {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Submit an answer to the running server
    Submit {
        answer: String,
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Move on after a revealed word
    Advance {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Start the drill over
    Reset {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Hear the current word again
    Replay {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Keep the drill screen clean unless RUST_LOG asks otherwise.
    let default_level = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("spellcast: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult {
    match &cli.command {
        Command::Practice => practice(load_config(&cli)?).await,
        Command::Serve { host, port } => serve(load_config(&cli)?, host, *port).await,
        Command::Status { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/session"))
                .send()
                .await?
                .error_for_status()?;
            print_json(resp).await
        }
        Command::Submit { answer, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/submit"))
                .json(&serde_json::json!({ "answer": answer }))
                .send()
                .await?
                .error_for_status()?;
            print_json(resp).await
        }
        Command::Advance { server } => post_simple(server, "advance").await,
        Command::Reset { server } => post_simple(server, "reset").await,
        Command::Replay { server } => post_simple(server, "replay").await,
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = &cli.state_dir {
        config.state_dir = dir.clone();
    }
    if let Some(url) = &cli.kokoro_url {
        config.voice.kokoro_url = url.clone();
    }
    if let Some(id) = &cli.voice_id {
        config.voice.voice_id = id.clone();
    }
    Ok(config)
}

async fn start_trainer(config: &AppConfig) -> Trainer {
    let announcer = Announcer::new(VoiceChain::from_config(&config.voice));
    let store = Arc::new(FileStore::new(config.state_dir.clone()));
    info!("session state in {}", config.state_dir.display());
    Trainer::start(store, announcer).await
}

// ─── serve ────────────────────────────────────────────────────────────────

async fn serve(config: AppConfig, host: &str, port: u16) -> CliResult {
    let trainer = Arc::new(start_trainer(&config).await);
    let app = server::router(trainer.clone(), ElevenLabsClient::new(&config.voice));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("spellcast listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    trainer.shutdown().await?;
    served?;
    Ok(())
}

// ─── practice ─────────────────────────────────────────────────────────────

async fn practice(config: AppConfig) -> CliResult {
    let trainer = start_trainer(&config).await;
    let mut cues = trainer.subscribe();

    if !trainer.voice_availability().enabled {
        println!("Enhanced voice unavailable. Using the local voice.");
    }
    println!("Commands: :replay  :reset  :quit\n");
    show_state(&trainer.view().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&trainer, line.trim()).await {
                    break;
                }
            }
            cue = cues.recv() => match cue {
                Ok(cue) => show_cue(&cue, &trainer.view().await),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    trainer.shutdown().await?;
    println!("Progress saved.");
    Ok(())
}

/// Apply one line of input. Returns false to quit.
async fn handle_line(trainer: &Trainer, line: &str) -> bool {
    match line {
        ":quit" | ":q" => return false,
        ":replay" => {
            if trainer.replay_current_word().await.verdict == Verdict::Ignored {
                println!("  Nothing to replay.");
            }
        }
        ":reset" => {
            trainer.reset().await;
            println!("  Progress cleared.");
        }
        _ => {
            let view = trainer.view().await;
            if view.phase == Phase::Complete {
                println!("  All done. Type :reset to go again or :quit to leave.");
            } else if view.revealed {
                trainer.advance_after_reveal().await;
            } else if !line.is_empty() {
                trainer.submit_answer(line).await;
            }
        }
    }
    true
}

fn show_cue(cue: &Cue, view: &SessionView) {
    match cue {
        Cue::Celebrate if view.phase == Phase::Complete => {
            println!("  ✓ Correct!");
            show_state(view);
        }
        Cue::Celebrate => println!("  ✓ Correct!"),
        Cue::Correct => {}
        Cue::TryAgain => println!("  ✗ Not quite. {} try left.", view.tries_left),
        Cue::Reveal { word } => show_reveal(word),
        Cue::Announce { .. } => prompt(view),
    }
}

fn show_state(view: &SessionView) {
    if view.phase == Phase::Complete {
        println!(
            "\nAll {} words mastered with {} mistakes. Type :reset to go again.",
            view.total, view.total_mistakes
        );
    } else if let (true, Some(word)) = (view.revealed, &view.current_word) {
        show_reveal(&word.text);
    } else {
        prompt(view);
    }
}

fn show_reveal(word: &str) {
    println!("  The word is: {word}");
    println!("  Copy it down, then press Enter for the next word.");
}

fn prompt(view: &SessionView) {
    println!(
        "[{}/{} mastered, {} mistakes] Spell the word you hear:",
        view.mastered, view.total, view.total_mistakes
    );
}

// ─── HTTP client ──────────────────────────────────────────────────────────

async fn post_simple(server: &str, endpoint: &str) -> CliResult {
    let resp = reqwest::Client::new()
        .post(format!("{server}/{endpoint}"))
        .send()
        .await?
        .error_for_status()?;
    print_json(resp).await
}

async fn print_json(resp: reqwest::Response) -> CliResult {
    let body: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
