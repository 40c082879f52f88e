use account_service::config::EnvConfig;
use account_service::db::postgres_service::PostgresService;
use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "Maintenance tasks for the account service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the roles for local development
    SetupDev,
    /// Seed the roles for production
    SetupProd,
    /// Insert random confirmed users
    AddFakeData {
        /// Number of users to create
        #[arg(short = 'n', long = "number-users", default_value_t = 10)]
        number_users: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    let db = PostgresService::new(&EnvConfig::database_url()?).await?;

    match cli.command {
        Commands::SetupDev | Commands::SetupProd => {
            let roles = db.insert_roles().await?;
            for role in roles {
                println!("{:<16} {:#04x} default={}", role.name, role.permissions, role.is_default);
            }
        }
        Commands::AddFakeData { number_users } => {
            let report = db.generate_fake(number_users).await?;
            println!("Inserted {} users, skipped {} duplicates.", report.inserted, report.skipped);
        }
    }
    Ok(())
}
