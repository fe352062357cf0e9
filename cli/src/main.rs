//! CLI entrypoint for sql-agent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use sql_agent_application::{
    AnswerQuestionUseCase, CompletionService, ConversationLogger, GraphProgressNotifier,
    NoConversationLogger, NoProgress, RunReactUseCase, SqlToolSet,
};
use sql_agent_domain::{AgentMode, ConfigIssue, OutputFormat, Question, Severity};
use sql_agent_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiCompletionService, OpenAiConfig,
    SqliteOptions, SqliteStore, download_client, ensure_database, sqlite_path,
};
use sql_agent_presentation::{Agent, Cli, ProgressReporter, Repl};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&cli, &mut config);

    // Kept alive until exit so buffered file logs are flushed.
    let _log_guard = init_tracing(cli.log_level(), config.logging.file.as_deref());

    info!("Starting sql-agent");

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", config.to_toml().context("Failed to render configuration")?);
        return Ok(());
    }

    config.check()?;
    report_issues(&config.validate());
    let (mode, _) = config.graph.parse_mode();
    let (format, _) = config.output.parse_format();
    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let db_path = sqlite_path(&config.database.url)?;
    let http = download_client(config.database.download_timeout())?;
    if ensure_database(&http, &db_path, config.database.download_url.as_deref())
        .await
        .with_context(|| format!("Database {} is not available", db_path.display()))?
    {
        eprintln!("Downloaded sample database to {}", db_path.display());
    }

    let store = Arc::new(SqliteStore::open(
        &db_path,
        SqliteOptions {
            sample_rows: config.database.sample_rows_in_table_info,
            include_tables: config.database.include_tables.clone(),
            ignore_tables: config.database.ignore_tables.clone(),
        },
    )?);
    let tools = Arc::new(SqlToolSet::new(store));
    let dialect = tools.dialect();

    let service_config = OpenAiConfig::from_file_config(&config.llm);
    let service: Arc<dyn CompletionService> =
        Arc::new(OpenAiCompletionService::new(service_config)?);

    let logger = conversation_logger(config.logging.conversation_log.as_deref().map(Path::new));
    let params = config.graph.to_graph_params();

    info!(
        mode = mode.as_str(),
        model = service.model_name(),
        db = %db_path.display(),
        "Agent configured"
    );

    let agent = match mode {
        AgentMode::Graph => Agent::Graph(
            AnswerQuestionUseCase::new(service, tools, dialect, params)?
                .with_conversation_logger(logger),
        ),
        AgentMode::React => Agent::React(
            RunReactUseCase::new(service, tools, dialect, params)?
                .with_conversation_logger(logger),
        ),
    };

    if cli.interactive {
        let mut repl = Repl::new(agent).with_format(format).with_progress(!cli.quiet);
        repl.run().await?;
        return Ok(());
    }

    let question = Question::new(cli.question_or_default())?;

    let reporter;
    let progress: &dyn GraphProgressNotifier = if !cli.quiet && format != OutputFormat::Steps {
        reporter = ProgressReporter::new();
        &reporter
    } else {
        &NoProgress
    };

    let mut stdout = std::io::stdout();
    agent.ask(&question, format, progress, &mut stdout).await?;

    Ok(())
}

/// Command-line flags win over every configuration source.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(mode) = cli.mode {
        config.graph.mode = AgentMode::from(mode).as_str().to_string();
    }
    if let Some(db) = &cli.db {
        config.database.url = db.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(max) = cli.max_iterations {
        config.graph.max_iterations = max;
    }
    if let Some(output) = cli.output {
        config.output.format = OutputFormat::from(output).as_str().to_string();
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.display().to_string());
    }
}

/// Install the stderr subscriber, plus a plain-text file layer when configured.
fn init_tracing(level: &str, file: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::new(level);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(file) = file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sql-agent.log".to_string());
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();
    Some(guard)
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => tracing::error!("config: {}", issue.message),
            Severity::Warning => warn!("config: {}", issue.message),
        }
    }
}

fn conversation_logger(path: Option<&Path>) -> Arc<dyn ConversationLogger> {
    match path.and_then(JsonlConversationLogger::new) {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}
