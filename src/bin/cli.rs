use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;

use reservo::cli::create_admin;
use reservo::cli::seeder::{SeedConfig, seed_database};
use reservo_config::DatabaseConfig;
use reservo_db::{PgStore, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "reservo-cli")]
#[command(about = "Reservo CLI - Administrative tools for Reservo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// First name of the administrator
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the administrator
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Login used to sign in
        #[arg(short = 'u', long)]
        login: Option<String>,
    },
    /// Seed the database with fake buildings, departments, users, classrooms and requests
    Seed {
        /// Number of buildings to create
        #[arg(short = 'b', long, default_value = "3")]
        buildings: usize,

        /// Number of departments to create
        #[arg(short = 'd', long, default_value = "4")]
        departments: usize,

        /// Number of users to create
        #[arg(short = 'u', long, default_value = "40")]
        users: usize,

        /// Number of classrooms to create
        #[arg(short = 'c', long, default_value = "20")]
        classrooms: usize,

        /// Number of reservation requests to create
        #[arg(short = 'r', long, default_value = "60")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let store = match connect().await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            login,
        } => handle_create_admin(&store, first_name, last_name, login).await,
        Commands::Seed {
            buildings,
            departments,
            users,
            classrooms,
            requests,
        } => {
            let config = SeedConfig {
                buildings,
                departments,
                users,
                classrooms,
                requests,
            };
            handle_seed(&store, config).await
        }
    }
}

async fn connect() -> anyhow::Result<PgStore> {
    let db_config = DatabaseConfig::from_env();
    let url = db_config
        .url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = init_db_pool(&url, &db_config).await?;
    run_migrations(&pool).await?;
    Ok(PgStore::new(pool))
}

fn prompt(label: &str, provided: Option<String>) -> String {
    if let Some(value) = provided {
        return value;
    }
    match Input::new().with_prompt(label).interact_text() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", label.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(
    store: &PgStore,
    first_name: Option<String>,
    last_name: Option<String>,
    login: Option<String>,
) {
    let first_name = prompt("First name", first_name);
    let last_name = prompt("Last name", last_name);
    let login = prompt("Login", login);

    match create_admin(store, &first_name, &last_name, &login).await {
        Ok(user) => {
            println!("\n✅ Administrator created successfully!");
            println!("   ID: {}", user.id);
            println!("   Login: {}", user.login);
            println!("   Name: {} {}", user.first_name, user.last_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating administrator: {}", e.message());
            std::process::exit(1);
        }
    }
}

async fn handle_seed(store: &PgStore, config: SeedConfig) {
    if let Err(e) = seed_database(store, config).await {
        eprintln!("\n❌ Error seeding database: {}", e.message());
        std::process::exit(1);
    }
}
