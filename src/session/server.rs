use anyhow::{Context, Result};
use tokio::io::{stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::session::backend::Session;
use crate::session::protocol::{Event, Request};
use crate::Config;

/// Start an editing session on stdin/stdout
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    if let Some(path) = &config.config_path {
        log::info!("Loaded config from {:?}", path);
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = Session::new(&config, events_tx);

    run(session, events_rx, BufReader::new(stdin()), stdout()).await
}

/// Logs go to stderr; stdout carries the protocol
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Drive a session until the reader hits EOF. Pending removal callbacks
/// are awaited before returning.
pub async fn run<R, W>(
    mut session: Session,
    events: UnboundedReceiver<Event>,
    reader: R,
    writer: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer_task = tokio::spawn(write_events(events, writer));

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Request>(&line) {
            Ok(request) => session.handle(request).await,
            Err(e) => session.send(Event::error(format!("Invalid request: {}", e))),
        }
    }

    log::debug!("Input closed, waiting for pending callbacks");
    session.finish().await;
    // Dropping the session closes the event channel and ends the writer
    drop(session);

    writer_task.await.context("Event writer task failed")?
}

async fn write_events<W>(mut events: UnboundedReceiver<Event>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = events.recv().await {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
