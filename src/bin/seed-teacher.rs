//! Register (or rename) a teacher allowed to manage announcements.
//!
//! Usage: seed-teacher --username USER [--display-name NAME]

use clap::Parser;

use school_announcements_api::db::{self, PgStore, TeacherStore};

#[derive(Parser)]
#[command(name = "seed-teacher", about = "Register a teacher in the announcements database")]
struct Args {
    /// Username passed as `teacher_username` on mutating requests
    #[arg(long)]
    username: String,

    /// Name shown for the teacher (defaults to the username)
    #[arg(long)]
    display_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;

    let pool = db::create_pool(&database_url, 2).await?;
    db::run_migrations(&pool).await?;

    let store = PgStore::new(pool);
    let display_name = args.display_name.as_deref().unwrap_or(&args.username);
    let teacher = store.upsert_teacher(&args.username, display_name).await?;

    tracing::info!(
        "Teacher registered: {} ({})",
        teacher.username,
        teacher.display_name
    );

    Ok(())
}
