//! Agenda CLI
//!
//! Command-line client for the dashboard backends:
//! - Log in and out
//! - Register users
//! - Commit a weekly availability plan
//! - Join the chat

use agenda::auth::{AuthClient, Role, TokenStore, UserRegistration};
use agenda::chat::{ChatEvent, ChatMessage, ChatSession, DeliveryStatus, MessageSender};
use agenda::config::{generate_default_config, Config};
use agenda::schedule::{AvailabilityPlan, HttpTimeslotStore, NotificationKind};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scheduling dashboard client: availability, users and chat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config_dir>/agenda/config.toml, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Register a new user
    Register {
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        age: String,
        #[arg(long, default_value = "")]
        address: String,
        /// admin, profesor or alumno
        #[arg(long)]
        role: String,
    },

    /// Commit a weekly availability plan
    Schedule {
        /// Path to the plan TOML file
        plan: PathBuf,
        /// Validate only, send nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Join the chat; each stdin line is sent as a message, `/quit` leaves
    Chat,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    config.logging.init()?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line("Contraseña: ").await?,
            };
            let client = AuthClient::new(&config.api.base_url, config.api.request_timeout())?;
            let login = client.login(&email, &password).await?;

            let store = TokenStore::resolve(config.auth.token_path.as_deref())?;
            store.save(&login.access_token)?;
            println!("Sesión iniciada. Token guardado en {}", store.path().display());
        }

        Commands::Logout => {
            let store = TokenStore::resolve(config.auth.token_path.as_deref())?;
            store.clear()?;
            println!("Sesión cerrada");
        }

        Commands::Register {
            user_name,
            last_name,
            phone,
            email,
            password,
            confirm_password,
            age,
            address,
            role,
        } => {
            let role: Role = role.parse()?;
            let form = UserRegistration {
                user_name,
                last_name,
                phone,
                email,
                password,
                confirm_password,
                age,
                address,
                role: Some(role),
            };
            let client = AuthClient::new(&config.api.base_url, config.api.request_timeout())?;
            let created = client.register(&form).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Commands::Schedule { plan, dry_run } => {
            let plan = AvailabilityPlan::load(&plan)?;
            let editor = plan.to_editor()?;

            if dry_run {
                match editor.validate() {
                    Ok(slots) => {
                        for slot in &slots {
                            println!("{} {} - {}", slot.day_of_week, slot.start_time, slot.end_time);
                        }
                        println!("{} horario(s) válidos", slots.len());
                    }
                    Err(e) => bail!("{}", e),
                }
                return Ok(());
            }

            let store =
                HttpTimeslotStore::new(&config.api.base_url, config.api.request_timeout())?;
            let notification = match editor.commit_all(&store).await {
                Ok(report) => report.notification(),
                Err(e) => {
                    tracing::error!(error = %e, "Commit failed");
                    e.notification()
                }
            };
            match notification.kind {
                NotificationKind::Success => println!("{}", notification),
                NotificationKind::Error => bail!("{}", notification),
            }
        }

        Commands::Chat => run_chat(&config).await?,

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, &content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let token = TokenStore::resolve(config.auth.token_path.as_deref())?.load()?;
    if token.is_none() {
        eprintln!("Sin sesión iniciada; entrando como invitado");
    }

    let mut session = ChatSession::connect(&config.chat, token.as_deref()).await?;
    let mut events = session.events();
    if let Some(identity) = session.identity().await? {
        println!("Conectado como {} ({})", identity.display_name, identity.connection_id);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) => {
                    if let Err(e) = session.send(line).await {
                        eprintln!("No se pudo enviar: {}", e);
                    }
                }
                None => break,
            },
            event = events.recv() => match event {
                Ok(ChatEvent::HistoryLoaded(messages)) => {
                    for message in &messages {
                        print_message(message);
                    }
                }
                Ok(ChatEvent::Appended(message)) if message.sender != MessageSender::Me => {
                    print_message(&message);
                }
                Ok(ChatEvent::StatusChanged(message)) if message.status == DeliveryStatus::Failed => {
                    eprintln!("Mensaje no entregado: {}", message.body);
                }
                Ok(ChatEvent::ServerError(message)) => eprintln!("Servidor: {}", message),
                Ok(ChatEvent::Disconnected) => {
                    eprintln!("Conexión cerrada por el servidor");
                    break;
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Chat display fell behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    session.close().await?;
    Ok(())
}

fn print_message(message: &ChatMessage) {
    let author = match &message.sender {
        MessageSender::Me => "yo",
        MessageSender::Peer(id) => id.as_str(),
    };
    println!("[{}] {}: {}", message.timestamp, author, message.body);
}

async fn read_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await? {
        Some(line) => Ok(line.trim_end().to_string()),
        None => bail!("No input"),
    }
}
