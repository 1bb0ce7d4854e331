use anyhow::{Context, Result};
use clap::Parser;
use confab::session::SessionServices;
use confab::summarization::{HttpSummarizationService, Summarizer};
use confab::transcription::{HttpTranscriptionService, Transcriber};
use confab::{create_router, AppState, Config, FileSink, HttpMemberDirectory};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "confab", about = "Meeting session recording and summarization service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/confab")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;

    let transcriber = Arc::new(Transcriber::new(
        Arc::new(HttpTranscriptionService::new(
            client.clone(),
            cfg.transcription.base_url.clone(),
            cfg.transcription.api_key.clone(),
        )),
        cfg.transcription.poll_interval(),
        cfg.transcription.poll_budget(),
    ));

    let summarizer = Arc::new(Summarizer::new(
        Arc::new(HttpSummarizationService::new(
            client.clone(),
            cfg.summarization.endpoint.clone(),
            cfg.summarization.api_key.clone(),
        )),
        cfg.summarization.max_input_chars,
        cfg.summarization.retry_backoff(),
        cfg.summarization.max_attempts,
    ));

    let services = SessionServices {
        transcriber,
        summarizer,
        directory: Arc::new(HttpMemberDirectory::new(
            client,
            cfg.directory.base_url.clone(),
        )),
        directory_page_size: cfg.directory.page_size,
        sink: Arc::new(FileSink::new(&cfg.storage.notes_path)),
    };

    let state = AppState::new(services);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, router).await?;

    Ok(())
}
