use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use sql_agent::agent::TextToSqlAgent;
use sql_agent::config::Config;
use sql_agent::db::{Database, SqlExecutor};
use sql_agent::schema::{format_for_prompt, DEFAULT_SAMPLE_LIMIT};
use sql_agent::{llm, logging};

#[derive(Parser)]
#[command(name = "sql-agent")]
#[command(about = "Ask questions of a PostgreSQL database in plain language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Env file to read settings from (default: nearest .env)
    #[arg(long, global = true, env = "SQL_AGENT_ENV_FILE")]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Generate SQL for a question, run it, and print the rows as JSON
    Ask {
        /// Natural-language question
        question: String,
    },
    /// Generate SQL for a question without running it
    Generate {
        /// Natural-language question
        question: String,
    },
    /// Print the schema text the model sees
    Schema,
    /// Print the first rows of a table as JSON
    Sample {
        /// Table name in the public schema
        table: String,
        /// Number of rows
        #[arg(long, short, default_value_t = DEFAULT_SAMPLE_LIMIT)]
        limit: u32,
    },
    /// Check the database connection, reconnecting once if needed
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;

    let cli = Cli::parse();

    let config = match &cli.env_file {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .context("Configuration error")?;
    tracing::debug!("Loaded config: {:?}", config);

    let db = Database::connect(&config.database).await?;
    let result = run(cli.command, &config, db.clone()).await;
    db.close().await?;
    result
}

async fn run(command: Commands, config: &Config, db: Database) -> Result<()> {
    let executor: Arc<dyn SqlExecutor> = Arc::new(db);

    match command {
        #[cfg(feature = "web")]
        Commands::Serve { port } => {
            executor.ensure_connection().await?;
            let agent = TextToSqlAgent::new(executor, llm::from_config(&config.llm)?);
            let state = sql_agent::web::AppState::new(agent);
            sql_agent::web::serve(state, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Ask { question } => {
            let agent = TextToSqlAgent::new(executor, llm::from_config(&config.llm)?);
            let answer = agent.execute_question(&question).await?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Commands::Generate { question } => {
            let agent = TextToSqlAgent::new(executor, llm::from_config(&config.llm)?);
            let sql = agent.generate_sql(&question).await?;
            println!("{}", sql);
        }
        Commands::Schema => {
            let reader = sql_agent::schema::SchemaReader::new(executor);
            let snapshot = reader.read_schema().await?;
            println!("{}", format_for_prompt(&snapshot));
        }
        Commands::Sample { table, limit } => {
            let reader = sql_agent::schema::SchemaReader::new(executor);
            let rows = reader.sample_rows(&table, limit).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Ping => {
            executor.ensure_connection().await?;
            println!("Database connection OK");
        }
    }

    Ok(())
}
