use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::net::event_source::TransportError;
use client::state::presentation::StoreSnapshot;
use client::{
    AddressBar, ClientConfig, Collaborators, EventSourceTransport, MemoryStore, StartOutcome, StreamReconciler,
    TracingNotifier, UiState, spawn_fetch_existing_slides,
};
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::info;
use url::Url;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("presentation {0} failed to generate")]
    GenerationFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "deck-cli", about = "Presentation stream and export CLI")]
struct Cli {
    /// Backend API origin serving the presentation stream.
    #[arg(long, env = "DECK_API_BASE_URL", default_value = "http://localhost:3000")]
    api_base_url: String,

    /// Origin of the export/template server.
    #[arg(long, env = "DECK_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    /// Stream (or load) a presentation and report each committed snapshot.
    Watch {
        presentation_id: String,
        /// Stream token; without it the stored presentation is fetched.
        #[arg(long)]
        stream: Option<String>,
        /// Page address the token is stripped from when the stream finishes.
        #[arg(long)]
        page_url: Option<String>,
        /// Print the final presentation JSON.
        #[arg(long, default_value_t = false)]
        print: bool,
    },
    Export {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
    },
    Template {
        #[arg(long)]
        group: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Ping => run_ping(&cli.server_url).await,
        Command::Watch { presentation_id, stream, page_url, print } => {
            run_watch(&cli.api_base_url, &presentation_id, stream.as_deref(), page_url.as_deref(), print).await
        }
        Command::Export { id, title } => {
            let body = json!({ "id": id, "title": title });
            let url = server_path(&cli.server_url, "/api/export-as-pdf");
            let response = reqwest::Client::new().post(url).json(&body).send().await?;
            print_json(&read_json(response).await?)
        }
        Command::Template { group } => {
            let url = server_path(&cli.server_url, "/api/template");
            let response = reqwest::Client::new()
                .get(url)
                .query(&[("group", group.as_str())])
                .send()
                .await?;
            print_json(&read_json(response).await?)
        }
    }
}

async fn run_ping(server_url: &str) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(server_path(server_url, "/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_watch(
    api_base_url: &str,
    presentation_id: &str,
    stream_token: Option<&str>,
    page_url: Option<&str>,
    print: bool,
) -> Result<(), CliError> {
    let config = ClientConfig::from_env().with_api_base_url(api_base_url);
    let page = match page_url {
        Some(url) => Url::parse(url)?,
        None => default_page_url(api_base_url, presentation_id, stream_token)?,
    };

    let store = MemoryStore::new();
    let ui = UiState::new();
    let address = Arc::new(AddressBar::new(page));
    let deps = Collaborators {
        transport: Arc::new(EventSourceTransport::new(&config)?),
        store: Arc::new(store.clone()),
        flags: Arc::new(ui.clone()),
        notifier: Arc::new(TracingNotifier::new()),
        navigator: address.clone(),
    };
    let printer = tokio::spawn(report_commits(store.subscribe()));

    let mut reconciler = StreamReconciler::new(config.clone(), deps);
    let mut fallback = None;
    let outcome = reconciler.start(presentation_id, stream_token, || {
        fallback = Some(spawn_fetch_existing_slides(
            reqwest::Client::new(),
            config.clone(),
            presentation_id.to_owned(),
            Arc::new(store.clone()),
            Arc::new(ui.clone()),
        ));
    });
    info!(%presentation_id, ?outcome, "watch started");

    if outcome == StartOutcome::Streaming {
        let interrupted = tokio::select! {
            () = reconciler.run() => false,
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            info!(%presentation_id, "interrupted; tearing down");
            reconciler.teardown();
        }
    } else if let Some(handle) = fallback {
        let _ = handle.await;
    }
    drop(reconciler);
    printer.abort();

    let snapshot = store.snapshot();
    let flags = ui.snapshot();
    print_json(&json!({
        "presentation_id": presentation_id,
        "slides": snapshot.slide_count(),
        "streaming": snapshot.streaming,
        "loading": flags.loading,
        "error": flags.error,
        "address": address.current().as_str(),
    }))?;
    if print {
        print_json(snapshot.presentation.as_ref().unwrap_or(&Value::Null))?;
    }
    if flags.error {
        return Err(CliError::GenerationFailed(presentation_id.to_owned()));
    }
    Ok(())
}

async fn report_commits(mut rx: watch::Receiver<StoreSnapshot>) {
    let mut last_revision = 0;
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.revision != last_revision {
            last_revision = snapshot.revision;
            println!("commit #{}: {} slides", snapshot.revision, snapshot.slide_count().unwrap_or(0));
        }
    }
}

/// Presentation page address as the browser would hold it.
fn default_page_url(base: &str, presentation_id: &str, stream_token: Option<&str>) -> Result<Url, CliError> {
    let mut url = Url::parse(base)?.join("/presentation")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("id", presentation_id);
        if let Some(token) = stream_token {
            query.append_pair("stream", token);
        }
    }
    Ok(url)
}

fn server_path(server_url: &str, path: &str) -> String {
    format!("{}{path}", server_url.trim_end_matches('/'))
}

async fn read_json(response: reqwest::Response) -> Result<Value, CliError> {
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: value.to_string() });
    }
    Ok(value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
