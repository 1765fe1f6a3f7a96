//! Postlog CLI
//!
//! Collects a blog's publishing history into a storage post and renders it.
//!
//! # Commands
//!
//! - `collect` - Recount the trailing window and save the log
//! - `clear` - Reset the storage post to an empty log
//! - `inspect` - Show the stored log without changing it
//! - `render` - Draw the stored log as an SVG heat map

mod commands;
mod prompt;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use postlog_sync_engine::{
    ClearRequest, Clock, CollectRequest, Credentials, IncludeMask, ReqwestClient, SyncConfig,
    SyncEngine, SystemClock, TistoryGateway,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Blog post history collector.
#[derive(Parser)]
#[command(name = "postlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Credentials for the blog platform.
#[derive(Args)]
struct AuthArgs {
    /// Pre-issued access token
    #[arg(long, env = "TISTORY_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Application client id
    #[arg(long, env = "TISTORY_CLIENT_ID")]
    client_id: Option<String>,

    /// Application client secret
    #[arg(long, env = "TISTORY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Account login id
    #[arg(long, env = "TISTORY_USER_ID")]
    user_id: Option<String>,

    /// Account password, prompted for when an account id is given without one
    #[arg(long, env = "TISTORY_USER_PW", hide_env_values = true)]
    user_pw: Option<String>,

    /// Redirect URI registered for the application
    #[arg(long, env = "TISTORY_REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

/// Location of the storage post.
#[derive(Args)]
struct StorageArgs {
    /// Blog holding the storage post
    #[arg(long, env = "STORAGE_BLOG_NAME")]
    storage_blog: Option<String>,

    /// Id of the storage post
    #[arg(long, env = "STORAGE_POST_ID")]
    storage_post_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recount the trailing window of the target blog and save the log
    Collect {
        /// Blog whose posts are counted
        #[arg(long, env = "TARGET_BLOG_NAME")]
        target_blog: String,

        #[command(flatten)]
        storage: StorageArgs,

        /// Months recounted on this run (1 to 12)
        #[arg(long, env = "UPDATE_RANGE")]
        update_range: Option<u32>,

        /// Counted visibilities as {private}{protected}{published} flags
        #[arg(long, env = "INCLUDE_MASK", default_value = "001")]
        include_mask: String,

        /// IANA timezone of the blog, `local` for the host zone [default: Asia/Seoul]
        #[arg(long, env = "POSTLOG_TIMEZONE")]
        timezone: Option<String>,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Reset the storage post to an empty log
    Clear {
        #[command(flatten)]
        storage: StorageArgs,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Show the stored log without changing it
    Inspect {
        #[command(flatten)]
        storage: StorageArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Draw the log as an SVG heat map of the last year
    Render {
        /// Read the log from a local file instead of the storage post
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the SVG here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Last day of the heat map, defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Comma-separated colours, lightest first
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,

        /// Omit the "N posts in the last year" header
        #[arg(long)]
        no_header: bool,

        /// Omit the Less/More colour legend
        #[arg(long)]
        no_legend: bool,

        /// IANA timezone of the blog, `local` for the host zone [default: Asia/Seoul]
        #[arg(long, env = "POSTLOG_TIMEZONE")]
        timezone: Option<String>,

        #[command(flatten)]
        storage: StorageArgs,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Collect {
            target_blog,
            storage,
            update_range,
            include_mask,
            timezone,
            auth,
        } => {
            let mask: IncludeMask = include_mask.parse()?;
            let mut request = CollectRequest::new(
                target_blog,
                storage.storage_post_id.unwrap_or_default(),
            );
            if let Some(blog) = storage.storage_blog {
                request = request.with_storage_blog(blog);
            }
            if let Some(months) = update_range {
                request = request.with_update_range(months);
            }
            let engine = SyncEngine::with_clock(
                SyncConfig::new().with_include_mask(mask),
                gateway(auth)?,
                clock(timezone)?,
            );
            commands::collect::run(&engine, &request, &mut stdout)?;
        }
        Commands::Clear { storage, auth } => {
            let engine = SyncEngine::new(SyncConfig::new(), gateway(auth)?);
            commands::clear::run(&engine, &storage_request(storage), &mut stdout)?;
        }
        Commands::Inspect {
            storage,
            format,
            auth,
        } => {
            let engine = SyncEngine::new(SyncConfig::new(), gateway(auth)?);
            commands::inspect::run(&engine, &storage_request(storage), &format, &mut stdout)?;
        }
        Commands::Render {
            input,
            output,
            today,
            colors,
            no_header,
            no_legend,
            timezone,
            storage,
            auth,
        } => {
            let log = match input {
                Some(path) => commands::render::read_log_file(&path)?,
                None => {
                    let engine = SyncEngine::new(SyncConfig::new(), gateway(auth)?);
                    engine.load_log(&storage_request(storage))?
                }
            };
            let today = match today {
                Some(day) => day,
                None => clock(timezone)?.today(),
            };
            let options = commands::render::RenderArgs {
                today,
                colors,
                show_header: !no_header,
                show_legend: !no_legend,
                output,
            };
            commands::render::run(&log, &options, &mut stdout)?;
        }
        Commands::Version => {
            writeln!(stdout, "postlog v{}", env!("CARGO_PKG_VERSION"))?;
        }
    }

    Ok(())
}

fn gateway(auth: AuthArgs) -> Result<TistoryGateway<ReqwestClient>, Box<dyn std::error::Error>> {
    let password = prompt::password_if_missing(
        auth.access_token.as_deref(),
        auth.user_id.as_deref(),
        auth.user_pw,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )?;
    let credentials = Credentials::from_parts(
        auth.access_token,
        auth.client_id,
        auth.client_secret,
        auth.user_id,
        password,
        auth.redirect_uri,
    )?;
    let client = ReqwestClient::new(Duration::from_secs(auth.timeout))?;
    Ok(TistoryGateway::new(client, credentials))
}

fn clock(timezone: Option<String>) -> Result<SystemClock, Box<dyn std::error::Error>> {
    Ok(SystemClock::from_name(timezone.as_deref())?)
}

fn storage_request(storage: StorageArgs) -> ClearRequest {
    ClearRequest::new(
        storage.storage_blog.unwrap_or_default(),
        storage.storage_post_id.unwrap_or_default(),
    )
}
