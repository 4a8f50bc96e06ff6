use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use coderun::config::CliArgs;
use coderun::dispatch::{Dispatcher, ExecutionRequest};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let settings = cli.to_settings()?;
    log::info!(
        "Dispatcher starting: timeout {}s, restricted {}",
        settings.timeout.as_secs(),
        settings.restricted
    );

    // Collect (label, source) pairs; stdin when no files were given.
    let mut sources = Vec::new();
    if cli.files.is_empty() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        sources.push(("<stdin>".to_string(), text));
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path)?;
            sources.push((path.display().to_string(), text));
        }
    }

    let shutdown_token = CancellationToken::new();
    let dispatcher = Arc::new(Dispatcher::with_cancellation(
        settings,
        shutdown_token.clone(),
    ));

    // One task per submission; the dispatcher itself holds no shared
    // mutable state, so they run independently.
    let mut runs = JoinSet::new();
    for (label, source_text) in sources {
        let dispatcher = dispatcher.clone();
        let language_id = cli.language.clone();
        runs.spawn(async move {
            let result = dispatcher
                .execute(ExecutionRequest {
                    language_id,
                    source_text,
                })
                .await;
            (label, result)
        });
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Ctrl-c received, cancelling in-flight executions...");
                shutdown_token.cancel();
            }
            next = runs.join_next() => match next {
                Some(Ok((label, result))) => {
                    println!("=== {label} [{}] ===", result.language_id);
                    println!("{}", result.display_text);
                }
                Some(Err(e)) => {
                    log::error!("Execution task failed: {e:?}");
                }
                None => break,
            }
        }
    }

    Ok(())
}
