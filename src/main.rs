mod error;
mod render;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::{OptionExt, ResultExt};
use folio_browse::{BrowseView, Browser, PreviewSlot};
use folio_config::Config;
use folio_model::{DocId, VersionId};
use folio_preview::PreviewFetcher;
use folio_transport::{Credential, HttpTransport, Session};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,folio=info";

/// Search, browse and preview documents held by a folio document service.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Bearer token issued by the service's login flow.
    #[arg(long, global = true, env = "FOLIO_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Override the configured service URL.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    /// Copy image previews into this directory (they are otherwise removed on exit).
    #[arg(long, global = true, value_name = "DIR")]
    save_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search by title, tag or uploader. An empty query lists everything.
    Search {
        #[arg(default_value = "")]
        query: String,
        /// Preview the primary version of every result.
        #[arg(long)]
        preview: bool,
    },
    /// Show one document and its versions.
    Show {
        doc_id: DocId,
        /// Preview this version.
        #[arg(long, value_name = "VERSION_ID")]
        preview: Option<VersionId>,
    },
    /// List document titles, or every version filed under one title.
    Browse {
        title: Option<String>,
        /// Preview every listed version.
        #[arg(long, requires = "title")]
        preview: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
        config.validate().or_raise(|| ErrorKind::Config)?;
    }
    let token = cli.token.ok_or_raise(|| ErrorKind::MissingToken)?;
    let browser = connect(&config, Credential::bearer(token))?;
    let save_dir = cli.save_dir.as_deref();

    let outcome = match cli.command {
        Command::Search { query, preview } => search(&browser, &query, preview, save_dir).await,
        Command::Show { doc_id, preview } => show(&browser, doc_id, preview, save_dir).await,
        Command::Browse { title, preview } => browse(&browser, title.as_deref(), preview, save_dir).await,
    };
    browser.end();
    outcome
}

fn connect(config: &Config, credential: Credential) -> Result<Browser> {
    let base = config.service.url().or_raise(|| ErrorKind::Config)?;
    let transport = HttpTransport::new(base, config.service.timeout(), &config.service.user_agent)
        .or_raise(|| ErrorKind::Connect)?;
    tracing::info!(base_url = %config.service.base_url, "Connecting to document service");
    let session = Session::new(Arc::new(transport), credential).into_handle();

    let mut fetcher = PreviewFetcher::new(session.clone());
    if let Some(dir) = &config.preview.scratch_dir {
        fetcher = fetcher.with_scratch_dir(dir);
    }
    if let Some(limit) = config.preview.max_bytes {
        fetcher = fetcher.with_max_bytes(limit);
    }
    Ok(Browser::with_fetcher(session, fetcher))
}

async fn search(browser: &Browser, query: &str, preview: bool, save_dir: Option<&Path>) -> Result<()> {
    let mut view = browser.search_view();
    if let Err(err) = view.submit(query).await {
        report_notice(view.notice());
        return Err(err).or_raise(|| ErrorKind::View);
    }
    if preview {
        let targets: Vec<DocId> = view.rows().iter().filter(|row| row.primary_version.is_some()).map(|row| row.doc_id).collect();
        futures::future::join_all(targets.into_iter().map(|doc_id| view.open_content(doc_id))).await;
    }

    let mut out = std::io::stdout().lock();
    let rows = view.rows();
    if rows.is_empty() {
        writeln!(out, "No documents found.").or_raise(|| ErrorKind::Output)?;
    }
    for row in &rows {
        render::search_row(&mut out, row).or_raise(|| ErrorKind::Output)?;
        render::preview(&mut out, &row.preview, save_dir).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

async fn show(browser: &Browser, doc_id: DocId, preview: Option<VersionId>, save_dir: Option<&Path>) -> Result<()> {
    let mut view = browser.detail_view();
    if let Err(err) = view.load(doc_id).await {
        report_notice(view.notice());
        return Err(err).or_raise(|| ErrorKind::View);
    }
    if let Some(version_id) = preview {
        view.preview(version_id).await.or_raise(|| ErrorKind::View)?;
    }

    let mut out = std::io::stdout().lock();
    if let Some(document) = view.document() {
        render::document_header(&mut out, document).or_raise(|| ErrorKind::Output)?;
    }
    for row in view.rows() {
        render::version_row(&mut out, &row).or_raise(|| ErrorKind::Output)?;
        render::preview(&mut out, &row.preview, save_dir).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

async fn browse(browser: &Browser, title: Option<&str>, preview: bool, save_dir: Option<&Path>) -> Result<()> {
    let mut view = browser.browse_view();
    if let Err(err) = view.load().await {
        report_notice(view.notice());
        return Err(err).or_raise(|| ErrorKind::View);
    }
    let mut out = std::io::stdout().lock();
    let Some(title) = title else {
        for (title, documents) in view.groups().iter() {
            writeln!(out, "{title} ({} documents)", documents.len()).or_raise(|| ErrorKind::Output)?;
        }
        return Ok(());
    };

    view.select(title).or_raise(|| ErrorKind::View)?;
    if preview {
        preview_selected(&view).await;
    }
    writeln!(out, "Versions for {title:?}:").or_raise(|| ErrorKind::Output)?;
    for row in view.rows() {
        render::version_row(&mut out, &row).or_raise(|| ErrorKind::Output)?;
        render::preview(&mut out, &row.preview, save_dir).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

/// Preview every listed version concurrently. Failures end up in the rows.
async fn preview_selected(view: &BrowseView) {
    let targets: Vec<_> = view.rows().into_iter().map(|row| (row.doc_id, row.version_id)).collect();
    let slots = futures::future::join_all(targets.into_iter().map(|(doc_id, version_id)| view.preview(doc_id, version_id))).await;
    let failed = slots.iter().filter(|slot| matches!(slot, Ok(PreviewSlot::Failed(_)))).count();
    if failed > 0 {
        tracing::warn!(failed, "Some previews could not be loaded");
    }
}

fn report_notice(notice: Option<&folio_browse::Notice>) {
    if let Some(notice) = notice {
        eprintln!("{notice}");
    }
}
