//! pdfscope command-line interface.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use pdfscope::config::{self, API_URL_ENV};
use pdfscope::render;
use pdfscope::{ApiClient, App, ClientError, DocumentType, Route, Screen};

#[derive(Parser)]
#[command(name = "pdfscope")]
#[command(about = "Analyze PDFs and browse analysis results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analysis service base URL
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a PDF for analysis and show the result
    Analyze {
        /// PDF file to analyze
        file: PathBuf,

        /// Document type (RESEARCH_PAPER, REPORT, CONTRACT, PRESENTATION, MANUAL, GENERAL)
        #[arg(long = "type", default_value = "GENERAL")]
        document_type: DocumentType,

        /// Quick analysis without summary or keywords
        #[arg(long)]
        quick: bool,

        /// Open the keyword detail for this keyword
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Show a stored result by id or `/results/{id}` path
    Show {
        target: String,

        /// Open the keyword detail for this keyword
        #[arg(long)]
        keyword: Option<String>,

        /// Open the keyword detail for the Nth keyword tag (1-based)
        #[arg(long, conflicts_with = "keyword")]
        tag: Option<usize>,
    },

    /// Browse analysis history
    History {
        /// Live filter on file names (client-side)
        #[arg(long)]
        filter: Option<String>,

        /// Search file names on the server
        #[arg(long, conflicts_with_all = ["all", "document_type"])]
        search: Option<String>,

        /// List every stored result instead of the recent ones
        #[arg(long)]
        all: bool,

        /// List results of one document type
        #[arg(long = "type")]
        document_type: Option<DocumentType>,

        /// Open the Nth visible entry (1-based)
        #[arg(long)]
        open: Option<usize>,
    },

    /// Check that the analysis service is up
    Health,

    /// List document types the service accepts
    Types,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pdfscope=debug" } else { "pdfscope=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run `fut` behind a spinner.
async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

fn fail(err: &ClientError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.user_message())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = config::load_settings().await;
    if let Some(url) = cli.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        settings.set_api_url(url);
    }
    if let Some(timeout) = cli.timeout.filter(|t| *t > 0) {
        settings.request_timeout = timeout;
    }

    let api = ApiClient::from_settings(&settings)
        .map_err(ClientError::from)
        .map_err(|e| fail(&e))?;
    let mut app = App::new(api);

    match cli.command {
        Commands::Analyze {
            file,
            document_type,
            quick,
            keyword,
        } => analyze(&mut app, file, document_type, quick, keyword).await,
        Commands::Show {
            target,
            keyword,
            tag,
        } => show(&mut app, &target, keyword, tag).await,
        Commands::History {
            filter,
            search,
            all,
            document_type,
            open,
        } => history(&mut app, filter, search, all, document_type, open).await,
        Commands::Health => health(&app).await,
        Commands::Types => types(&app).await,
    }
}

async fn analyze(
    app: &mut App,
    file: PathBuf,
    document_type: DocumentType,
    quick: bool,
    keyword: Option<String>,
) -> Result<()> {
    let api = app.api().clone();
    let Screen::Upload(form) = app.screen_mut() else {
        bail!("upload form not mounted");
    };
    form.set_document_type(document_type);
    if form.select_path(&file).await.is_err() {
        print!("{}", render::render_upload(form));
        bail!("{} was not accepted", file.display());
    }

    if quick {
        let result = with_spinner("빠른 분석 중...", form.submit_quick(&api))
            .await
            .map_err(|e| fail(&e))?;
        print!("{}", render::render_result(&result));
        return Ok(());
    }

    let submission = with_spinner("분석 중...", form.submit(&api))
        .await
        .map_err(|e| fail(&e))?;
    app.navigate(submission.route, Some(submission.state)).await;

    if let Some(keyword) = keyword {
        if let Screen::Results(view) = app.screen_mut() {
            view.select_keyword(&keyword);
        }
    }
    print!("{}", app.render());
    Ok(())
}

async fn show(
    app: &mut App,
    target: &str,
    keyword: Option<String>,
    tag: Option<usize>,
) -> Result<()> {
    let route = if target.starts_with('/') {
        Route::parse(target).with_context(|| format!("not a results path: {}", target))?
    } else {
        Route::results(target)
    };
    if !matches!(route, Route::Results { .. }) {
        bail!("not a results path: {}", target);
    }

    with_spinner(render::LOADING_RESULT, app.navigate(route, None)).await;

    let Screen::Results(view) = app.screen_mut() else {
        bail!("results view not mounted");
    };
    if let Some(keyword) = keyword {
        view.select_keyword(&keyword);
    }
    if let Some(n) = tag {
        if n == 0 || !view.select_tag(n - 1) {
            eprintln!("{} no keyword tag {}", style("!").yellow(), n);
        }
    }
    print!("{}", app.render());

    if let Screen::Results(view) = app.screen() {
        if view.result().is_none() {
            bail!("result unavailable");
        }
    }
    Ok(())
}

async fn history(
    app: &mut App,
    filter: Option<String>,
    search: Option<String>,
    all: bool,
    document_type: Option<DocumentType>,
    open: Option<usize>,
) -> Result<()> {
    with_spinner(render::LOADING_HISTORY, app.navigate(Route::History, None)).await;

    let api = app.api().clone();
    let Screen::History(browser) = app.screen_mut() else {
        bail!("history view not mounted");
    };

    if let Some(query) = search {
        browser.set_query(query);
        browser.submit_search(&api).await;
    } else if all {
        browser.load_all(&api).await;
    } else if let Some(t) = document_type {
        browser.load_by_type(&api, t).await;
    }
    if let Some(query) = filter {
        browser.set_query(query);
    }

    match open {
        Some(n) if n > 0 => {
            if !app.open_history_entry(n - 1).await {
                bail!("no history entry {}", n);
            }
        }
        Some(_) => bail!("entries are numbered from 1"),
        None => {}
    }
    print!("{}", app.render());
    Ok(())
}

async fn health(app: &App) -> Result<()> {
    let response = app
        .api()
        .health_check()
        .await
        .map_err(|e| fail(&ClientError::from(e)))?;
    let status = response.data;
    let marker = if status.is_up() {
        style("UP").green().bold()
    } else {
        style("DOWN").red().bold()
    };
    println!(
        "{} {} {}",
        marker,
        status.service.as_deref().unwrap_or("analysis service"),
        status.version.as_deref().unwrap_or("")
    );
    if !status.is_up() {
        bail!("service reported status {:?}", status.status);
    }
    Ok(())
}

async fn types(app: &App) -> Result<()> {
    let catalog = match app.api().document_types().await {
        Ok(response) => response.data,
        Err(e) => {
            tracing::warn!("Could not fetch document types: {}", e);
            Default::default()
        }
    };
    for t in DocumentType::ALL {
        let description = catalog
            .description
            .get(t.as_str())
            .map(String::as_str)
            .unwrap_or(t.label());
        println!("{:<16} {}", t.as_str(), description);
    }
    Ok(())
}
