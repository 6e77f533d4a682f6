// belyv - command line access to the Belyv backend
// Persists the session between invocations through the configured store

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

use belyv_client::auth::LogNavigator;
use belyv_client::rbac::{PermissionInput, RoleInput};
use belyv_client::trainers::{SortOrder, TrainerQuery, TrainerSortField};
use belyv_client::users::{OnboardUser, UserFilter};
use belyv_client::{BelyvClient, ClientConfig, Credentials, SessionEvent};

#[derive(Debug, Parser)]
#[command(name = "belyv", version, about = "Belyv backend client")]
struct Cli {
    /// Override the API base URL
    #[arg(long, global = true, env = "BELYV_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BELYV_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show the current session
    Status,
    /// Check whether the current session holds a permission
    Can { permission: String },
    #[command(subcommand)]
    Roles(RolesCommand),
    #[command(subcommand)]
    Permissions(PermissionsCommand),
    #[command(subcommand)]
    Configs(ConfigsCommand),
    #[command(subcommand)]
    Trainers(TrainersCommand),
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Subcommand)]
enum RolesCommand {
    List,
    Get { id: i64 },
    Create { code: String, name: String },
    Delete { id: i64 },
    /// Assign a role to a user
    Assign {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        role: i64,
    },
}

#[derive(Debug, Subcommand)]
enum PermissionsCommand {
    List,
    Create {
        code: String,
        name: String,
        module: String,
    },
    /// Link permissions to a role
    Assign {
        #[arg(long)]
        role: i64,
        #[arg(required = true)]
        permission_ids: Vec<i64>,
    },
    /// List the permissions linked to a role
    ForRole { role: i64 },
}

#[derive(Debug, Subcommand)]
enum ConfigsCommand {
    List,
    Show { id: i64 },
}

#[derive(Debug, Subcommand)]
enum TrainersCommand {
    List(TrainerListArgs),
    Get { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct TrainerListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    employment_type: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    #[arg(long)]
    min_experience: Option<u32>,
    #[arg(long)]
    max_experience: Option<u32>,
    /// Sort field; prefix with `-` for descending
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    List {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        email: Option<String>,
    },
    Get { id: i64 },
    Onboard {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "BELYV_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: String,
    },
    Activate { id: i64 },
    Deactivate { id: i64 },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn trainer_query(args: TrainerListArgs) -> anyhow::Result<TrainerQuery> {
    let mut query = TrainerQuery {
        page: args.page,
        page_size: args.page_size,
        search: args.search,
        location: args.location,
        employment_type: args.employment_type,
        is_active: args.active,
        min_experience: args.min_experience,
        max_experience: args.max_experience,
        ordering: None,
    };
    if let Some(sort) = args.sort {
        let (field, order) = match sort.strip_prefix('-') {
            Some(field) => (field, SortOrder::Desc),
            None => (sort.as_str(), SortOrder::Asc),
        };
        query = query.order_by(TrainerSortField::parse(field)?, order);
    }
    Ok(query)
}

async fn run(client: &BelyvClient, command: Command) -> anyhow::Result<ExitCode> {
    let outcome: anyhow::Result<()> = match command {
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password);
            match client.auth().login(&credentials).await {
                Ok(record) => {
                    println!("Logged in as {} ({})", record.user.email, record.role.name);
                    Ok(())
                }
                Err(err) => bail!(err.error_message()),
            }
        }
        Command::Logout => {
            client.auth().logout();
            if let Some(message) = client.auth().security_error() {
                eprintln!("Session storage had to be wiped: {}", message);
            }
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            let auth = client.auth();
            match auth.current_session() {
                Some(record) => {
                    print_json(&record)?;
                    if let Some(expires_at) = auth.token_expires_at() {
                        if auth.is_token_expired() {
                            println!("Token expired at {}", expires_at);
                        } else {
                            println!("Token expires at {}", expires_at);
                        }
                    }
                }
                None if auth.is_unauthorized() => {
                    println!("Not logged in (previous session was rejected by the server)")
                }
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Can { permission } => {
            let granted = client.auth().has_permission(&permission);
            println!("{}", if granted { "yes" } else { "no" });
            return Ok(if granted {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Roles(command) => {
            let roles = client.roles();
            match command {
                RolesCommand::List => print_json(&roles.list_roles().await?),
                RolesCommand::Get { id } => print_json(&roles.get_role(id).await?),
                RolesCommand::Create { code, name } => {
                    print_json(&roles.create_role(&RoleInput::new(code, name)).await?)
                }
                RolesCommand::Delete { id } => {
                    roles.delete_role(id).await?;
                    println!("Deleted role {}", id);
                    Ok(())
                }
                RolesCommand::Assign { user, role } => {
                    print_json(&roles.assign_role_to_user(user, role).await?)
                }
            }
        }
        Command::Permissions(command) => {
            let permissions = client.permissions();
            match command {
                PermissionsCommand::List => print_json(&permissions.list_permissions().await?),
                PermissionsCommand::Create { code, name, module } => {
                    let input = PermissionInput { code, name, module };
                    print_json(&permissions.create_permission(&input).await?)
                }
                PermissionsCommand::Assign {
                    role,
                    permission_ids,
                } => print_json(
                    &permissions
                        .assign_permissions_to_role(role, permission_ids)
                        .await?,
                ),
                PermissionsCommand::ForRole { role } => {
                    print_json(&permissions.role_permissions(role).await?)
                }
            }
        }
        Command::Configs(command) => {
            let profiles = client.profiles();
            match command {
                ConfigsCommand::List => print_json(&profiles.list_configs().await?),
                ConfigsCommand::Show { id } => print_json(&profiles.config_details(id).await?),
            }
        }
        Command::Trainers(command) => {
            let trainers = client.trainers();
            match command {
                TrainersCommand::List(args) => {
                    let query = trainer_query(args)?;
                    print_json(&trainers.list_trainers(&query).await?)
                }
                TrainersCommand::Get { id } => print_json(&trainers.get_trainer(id).await?),
                TrainersCommand::Delete { id } => {
                    trainers.delete_trainer(id).await?;
                    println!("Deleted trainer {}", id);
                    Ok(())
                }
            }
        }
        Command::Users(command) => {
            let users = client.users();
            match command {
                UsersCommand::List {
                    role,
                    active,
                    email,
                } => {
                    let filter = UserFilter {
                        role,
                        is_active: active,
                        email,
                    };
                    print_json(&users.list_users(&filter).await?)
                }
                UsersCommand::Get { id } => print_json(&users.get_user(id).await?),
                UsersCommand::Onboard {
                    email,
                    name,
                    password,
                    role,
                } => {
                    let user = OnboardUser::new(email, name, password, role);
                    print_json(&users.onboard_user(&user).await?)
                }
                UsersCommand::Activate { id } => print_json(&users.set_user_active(id, true).await?),
                UsersCommand::Deactivate { id } => {
                    print_json(&users.set_user_active(id, false).await?)
                }
            }
        }
    };
    outcome?;
    Ok(ExitCode::SUCCESS)
}

/// Report session events raised while the command ran
fn drain_events(events: &mut tokio::sync::broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Unauthorized) => {
                eprintln!("Your session is no longer valid; run `belyv login` again")
            }
            Ok(event) => tracing::debug!("Session event: {:?}", event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Missed {} session events", skipped)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Invalid configuration")?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config = ClientConfig {
            api_url: ClientConfig::new(api_url, config.store.clone())?.api_url,
            ..config
        };
    }

    let client = BelyvClient::from_config(&config, Arc::new(LogNavigator))
        .context("Failed to initialize the client")?;
    let mut events = client.subscribe();

    let result = run(&client, cli.command).await;
    drain_events(&mut events);
    result
}
