//! CLI entry point for the gradebook tool.
//!
//! Provides subcommands for computing one student's weighted grade, grading
//! a whole course roster into a CSV report, and checking course data for
//! suspicious values.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gradebook::config::GradebookConfig;
use gradebook::fetch::BasicClient;
use gradebook::fetch::auth::ApiKey;
use gradebook::gradebook::{GradeRequest, course_report, student_gradebook};
use gradebook::grading::validate_groups;
use gradebook::output::{append_rows, render_json};
use gradebook::store::{CsvStore, GradebookStore, HttpStore};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Weighted course grades from assignment group data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one student's weighted grade as JSON
    Grade {
        /// Course data directory or LMS API base URL
        #[arg(short, long, value_name = "DIR_OR_URL")]
        source: String,

        /// Course identifier
        #[arg(short, long)]
        course: String,

        /// Student whose grade is computed
        #[arg(long)]
        student: String,

        /// User making the request (defaults to the student)
        #[arg(long = "as", value_name = "USER")]
        requester: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Grade every enrolled student and append the results to a CSV file
    Report {
        /// Course data directory or LMS API base URL
        #[arg(short, long, value_name = "DIR_OR_URL")]
        source: String,

        /// Course identifier
        #[arg(short, long)]
        course: String,

        /// Teacher or TA requesting the report
        #[arg(long = "as", value_name = "USER")]
        requester: String,

        /// CSV file to append results to
        #[arg(short, long, default_value = "report.csv")]
        output: String,

        /// Maximum number of students graded concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Report suspicious weights, points and grades for a student's course data
    Validate {
        /// Course data directory or LMS API base URL
        #[arg(short, long, value_name = "DIR_OR_URL")]
        source: String,

        /// Course identifier
        #[arg(short, long)]
        course: String,

        /// Student whose submissions are checked
        #[arg(long)]
        student: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = GradebookConfig::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&config.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&config.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gradebook.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            source,
            course,
            student,
            requester,
            pretty,
        } => {
            let store = open_store(&source, &config)?;
            let request = GradeRequest {
                requester_id: requester.unwrap_or_else(|| student.clone()),
                course_id: course,
                student_id: student,
            };

            let result = student_gradebook(store.as_ref(), &request).await?;
            println!("{}", render_json(&result, pretty)?);
        }
        Commands::Report {
            source,
            course,
            requester,
            output,
            concurrency,
        } => {
            let store = open_store(&source, &config)?;
            let concurrency = concurrency.unwrap_or(config.concurrency);

            let rows = course_report(store, &requester, &course, concurrency).await?;
            append_rows(&output, &rows)?;

            let ungraded = rows.iter().filter(|r| r.final_grade.is_none()).count();
            info!(
                course_id = %course,
                students = rows.len(),
                ungraded,
                output = %output,
                "Report written"
            );
        }
        Commands::Validate {
            source,
            course,
            student,
        } => {
            let store = open_store(&source, &config)?;
            let groups = store.assignment_groups(&course, &student).await?;

            let warnings = validate_groups(&groups);
            for warning in &warnings {
                warn!(course_id = %course, "{warning}");
            }
            info!(
                course_id = %course,
                groups = groups.len(),
                warnings = warnings.len(),
                "Validation finished"
            );
        }
    }

    Ok(())
}

/// Opens an LMS API store for `http` sources, otherwise a CSV directory store.
#[tracing::instrument(skip(config))]
fn open_store(source: &str, config: &GradebookConfig) -> Result<Arc<dyn GradebookStore>> {
    if source.starts_with("http") {
        let client = BasicClient::new(config.http_timeout)?;
        let store: Arc<dyn GradebookStore> = match &config.api_token {
            Some(token) => Arc::new(HttpStore::new(ApiKey::bearer(client, token)?, source)?),
            None => {
                warn!("GRADEBOOK_API_TOKEN not set, calling API without credentials");
                Arc::new(HttpStore::new(client, source)?)
            }
        };
        Ok(store)
    } else {
        Ok(Arc::new(CsvStore::new(source)))
    }
}
