mod cli;
mod processor;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use dns_inspect::codec::DnsCodec;
use processor::{process_source, Summary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse_args();

    // Initialize tracing subscriber for logging; stdout carries the messages
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    let codec = DnsCodec::new(args.framing()).with_max_message_size(args.max_size);
    debug!(?codec, "decoder configured");

    let mut stdout = tokio::io::stdout();
    let mut total = Summary::default();

    if args.files.is_empty() {
        info!("Reading DNS messages from stdin");
        let summary =
            process_source(tokio::io::stdin(), "<stdin>", codec.clone(), &mut stdout).await?;
        total.merge(summary);
    } else {
        for path in &args.files {
            let source = path.display().to_string();
            let file = File::open(path)
                .await
                .with_context(|| format!("failed to open {}", source))?;
            let summary = process_source(file, &source, codec.clone(), &mut stdout).await?;
            total.merge(summary);
        }
    }

    stdout.flush().await.context("failed to flush output")?;

    info!(
        decoded = total.decoded,
        failed = total.failed,
        "all inputs processed"
    );

    if total.failed > 0 {
        anyhow::bail!(
            "{} of {} messages failed to decode",
            total.failed,
            total.decoded + total.failed
        );
    }
    Ok(())
}
