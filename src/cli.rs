use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};

use crate::config::Config;
use crate::server;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "product-catalog", version, about = "Product catalog HTTP API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create an admin account, prompting for the password
    CreateAdmin {
        username: String,
    },
}

pub async fn run(cli: Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::serve(config).await?,
        Command::Migrate => {
            let db = server::connect(&config).await?;
            Migrator::up(&db, None).await?;
            println!("Migrations applied");
        }
        Command::CreateAdmin { username } => {
            let password = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if password != confirm {
                return Err("Passwords do not match".into());
            }

            let db = server::connect(&config).await?;
            Migrator::up(&db, None).await?;

            let state = AppState::new(db, config);
            let admin = state.auth.create_admin(&username, &password).await?;
            println!("Admin '{}' created with id {}", admin.username, admin.id);
        }
    }

    Ok(())
}
