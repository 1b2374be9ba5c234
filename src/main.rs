use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use photoshelf::auth::TokenGenerator;
use photoshelf::config::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig, ServerConfigFile};
use photoshelf::library::provision_user;
use photoshelf::server::{AppState, create_router};
use photoshelf::store::{SqliteStore, Store};

const DB_FILE: &str = "photoshelf.db";
const ADMIN_TOKEN_FILE: &str = ".admin_token";

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "photoshelf")]
#[command(about = "A self-hosted photo library server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and blobs
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Public base URL for external access (e.g., "https://photos.example.com").
        /// Photo URLs are built from it. Defaults to the bind address.
        #[arg(long)]
        public_base_url: Option<String>,

        /// Largest accepted request body, in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,

        /// TOML file whose values override the flags above
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and admin token)
    Init {
        /// Data directory for the database and blobs
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Provision a user (and profile) and print a new token for them
    Add {
        /// Contact address; also the initial display name
        #[arg(long)]
        email: String,

        /// Data directory for the database and blobs
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

fn open_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let store = SqliteStore::new(data_dir.join(DB_FILE))?;
    store.initialize()?;
    Ok(store)
}

fn print_token_banner(heading: &str, raw_token: &str) {
    println!();
    println!("========================================");
    println!("{heading}");
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();
}

fn run_init(data_dir: &Path, non_interactive: bool) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;
    let store = open_store(data_dir)?;

    let token_file = data_dir.join(ADMIN_TOKEN_FILE);

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let (_, raw_token) = generator.issue(&store, None, None)?;

    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    print_token_banner(
        "Admin token (save this, it won't be shown again):",
        &raw_token,
    );
    println!("Token also written to: {}", token_file.display());

    if !non_interactive {
        create_default_user_prompt(&store, &generator)?;
    }

    Ok(())
}

fn create_default_user_prompt(store: &SqliteStore, generator: &TokenGenerator) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a default user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Email cannot be empty".into())
            } else if !input.contains('@') {
                Err("Email must contain '@'".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    add_user(store, generator, &email)
}

fn add_user(store: &SqliteStore, generator: &TokenGenerator, email: &str) -> anyhow::Result<()> {
    let provisioned = provision_user(store, email)?;
    let (_, raw_token) = generator.issue(store, Some(&provisioned.user.id), None)?;

    let heading = if provisioned.created {
        format!(
            "Created user '{}' ({}) with token:",
            provisioned.user.email, provisioned.user.id
        )
    } else {
        format!(
            "User '{}' ({}) already exists. New token:",
            provisioned.user.email, provisioned.user.id
        )
    };
    print_token_banner(&heading, &raw_token);

    Ok(())
}

fn run_user_add(data_dir: &Path, email: &str) -> anyhow::Result<()> {
    let store = open_store(data_dir)?;
    if !store.has_admin_token()? {
        bail!("Server not initialized. Run 'photoshelf admin init' first.");
    }
    add_user(&store, &TokenGenerator::new(), email)
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.data_dir.join(ADMIN_TOKEN_FILE);
    if !token_file.exists() {
        bail!(
            "Server not initialized. Run 'photoshelf admin init' first to create the database and admin token."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(
            "Server not initialized. Run 'photoshelf admin init' first to create the database and admin token."
        );
    }

    info!("Admin token available at {}", token_file.display());

    let state = Arc::new(AppState::new(Arc::new(store), &config));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {addr}, photo URLs under {}", config.blob_base_url());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("photoshelf=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => run_init(&data_dir, non_interactive)?,
            AdminCommands::User {
                command: UserCommands::Add { email, data_dir },
            } => run_user_add(&data_dir, &email)?,
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            public_base_url,
            max_upload_bytes,
            config,
        } => {
            let mut server_config = ServerConfig {
                host,
                port,
                data_dir,
                public_base_url,
                max_upload_bytes,
            };
            if let Some(path) = config {
                server_config = server_config.with_file(ServerConfigFile::load(&path)?);
            }
            run_serve(server_config).await?;
        }
    }

    Ok(())
}
