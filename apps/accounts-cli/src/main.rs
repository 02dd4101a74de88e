use accounts::{
    apply_schema, Role, RoleRepository, SqliteRoleRepository, SqliteUserRepository, User,
    UserRepository,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dao_db::{ConnectionProvider, DataSources};
use runtime::{AppConfig, CliArgs};
use std::path::PathBuf;
use std::sync::Arc;

/// Accounts - user and role store tooling
#[derive(Parser)]
#[command(name = "accounts")]
#[command(about = "Accounts - user and role store tooling")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data source to use (overrides config)
    #[arg(short, long)]
    data_source: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration and connectivity
    Check,
    /// Create the role and user tables if missing
    Schema,
    /// Role operations
    #[command(subcommand)]
    Roles(RoleCommand),
    /// User operations
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Subcommand)]
enum RoleCommand {
    /// Look a role up by name
    Find { name: String },
    /// Create a role unless the name is taken
    Create { name: String },
    /// Remove a role and every user holding it
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum UserCommand {
    /// List all users
    List,
    /// Look a user up by login or email
    Find(FindUser),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FindUser {
    #[arg(long)]
    login: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        data_source: cli.data_source.clone(),
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::debug!(data_source = %config.data_source, "accounts starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let sources = config.data_sources();
    let result = match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check(&sources, &config.data_source).await,
        Commands::Schema => {
            let provider = sources.get(&config.data_source)?;
            apply_schema(&provider)
                .await
                .with_context(|| format!("Failed to apply schema to '{}'", config.data_source))?;
            println!("Schema applied to '{}'", config.data_source);
            Ok(())
        }
        Commands::Roles(cmd) => roles(sources.get(&config.data_source)?, cmd).await,
        Commands::Users(cmd) => users(sources.get(&config.data_source)?, cmd).await,
    };

    sources.close_all().await;
    result
}

async fn check(sources: &DataSources, name: &str) -> Result<()> {
    tracing::info!(data_source = name, "Checking configuration...");

    let provider = sources.get(name)?;
    let settings = provider
        .settings()?
        .with_context(|| format!("Data source '{name}' has no settings"))?;
    let tx = provider
        .acquire()
        .await
        .with_context(|| format!("Failed to connect to '{name}'"))?;
    tx.commit().await?;

    println!("Configuration check passed");
    println!(
        "Data source '{}': {:?} at {}",
        name,
        settings.engine,
        dao_db::redact_credentials_in_dsn(Some(&settings.url))
    );
    Ok(())
}

async fn roles(provider: Arc<ConnectionProvider>, cmd: RoleCommand) -> Result<()> {
    let repo = SqliteRoleRepository::new(provider);
    match cmd {
        RoleCommand::Find { name } => print_role(&repo.find_by_name(&name).await?),
        RoleCommand::Create { name } => {
            repo.create(&Role::named(name)).await?;
        }
        RoleCommand::Remove { id } => {
            repo.remove(&Role {
                id: Some(id),
                name: None,
            })
            .await?;
        }
    }
    Ok(())
}

async fn users(provider: Arc<ConnectionProvider>, cmd: UserCommand) -> Result<()> {
    let repo = SqliteUserRepository::new(provider);
    match cmd {
        UserCommand::List => {
            for user in repo.find_all().await? {
                print_user(&user);
            }
        }
        UserCommand::Find(FindUser { login, email }) => {
            let user = match (login, email) {
                (Some(login), _) => repo.find_by_login(&login).await?,
                (None, Some(email)) => repo.find_by_email(&email).await?,
                (None, None) => anyhow::bail!("one of --login or --email is required"),
            };
            print_user(&user);
        }
    }
    Ok(())
}

fn print_role(role: &Role) {
    if role.is_empty() {
        println!("(no role)");
        return;
    }
    println!(
        "{}\t{}",
        role.id.unwrap_or_default(),
        role.name.as_deref().unwrap_or_default()
    );
}

fn print_user(user: &User) {
    if user.is_empty() {
        println!("(no user)");
        return;
    }
    println!(
        "{}\t{}\t{}\t{} {}\t{}\trole={}",
        user.id.unwrap_or_default(),
        user.login.as_deref().unwrap_or_default(),
        user.email.as_deref().unwrap_or_default(),
        user.first_name.as_deref().unwrap_or_default(),
        user.last_name.as_deref().unwrap_or_default(),
        user.birthday.map(|d| d.to_string()).unwrap_or_default(),
        user.role_id.unwrap_or_default(),
    );
}
