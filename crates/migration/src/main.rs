use clap::{Parser, Subcommand};
use migration::{apply_pending, pending_names, seed_app, MigrationOutcome};
use sea_orm_migration::sea_orm::Database;

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Apply schema migrations for the sso auth store")]
struct Cli {
    /// Store connection string, e.g. postgres://... or sqlite://data/sso.db?mode=rwc
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations (default)
    Up,
    /// List migrations that have not been applied yet
    Status,
    /// Provision an application and its signing secret
    SeedApp {
        #[arg(long)]
        id: i32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        secret: String,
    },
}

#[async_std::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(url) = cli.database_url.filter(|u| !u.trim().is_empty()) else {
        eprintln!("database url is required (--database-url or DATABASE_URL)");
        return std::process::ExitCode::FAILURE;
    };

    let db = match Database::connect(url.as_str()).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => apply_pending(&db).await.map(|outcome| match outcome {
            MigrationOutcome::NoChange => println!("No migrations to apply"),
            MigrationOutcome::Applied(n) => println!("Applied {n} migration(s)"),
        }),
        Commands::Status => pending_names(&db).await.map(|names| {
            if names.is_empty() {
                println!("Schema is up to date");
            }
            for name in names {
                println!("pending: {name}");
            }
        }),
        Commands::SeedApp { id, name, secret } => seed_app(&db, id, &name, &secret)
            .await
            .map(|_| println!("Seeded app {id} ({name})")),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("migration failed: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
