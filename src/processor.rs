use anyhow::Context;
use bytes::BytesMut;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, FramedRead};
use tracing::{debug, error, info};

use dns_inspect::codec::{DnsCodec, Framing};
use dns_inspect::Message;

/// Tally of one input source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub decoded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn merge(&mut self, other: Summary) {
        self.decoded += other.decoded;
        self.failed += other.failed;
    }
}

/// Decode every message from `reader` and print each one to `out`.
///
/// Decode failures are logged and counted; only I/O errors on `out` (or on
/// `reader` in datagram mode) are returned.
pub async fn process_source<R, W>(
    mut reader: R,
    source: &str,
    mut codec: DnsCodec,
    out: &mut W,
) -> anyhow::Result<Summary>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = Summary::default();

    match codec.framing() {
        Framing::Datagram => {
            let mut data = Vec::new();
            reader
                .read_to_end(&mut data)
                .await
                .with_context(|| format!("failed to read {}", source))?;
            debug!("Read {} bytes from {}", data.len(), source);

            let mut buf = BytesMut::from(&data[..]);
            match codec.decode(&mut buf) {
                Ok(Some(message)) => {
                    print_message(out, &message).await?;
                    summary.decoded += 1;
                }
                Ok(None) => {
                    error!("{}: empty input", source);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Failed to decode DNS message from {}: {}", source, e);
                    summary.failed += 1;
                }
            }
        }
        Framing::LengthPrefixed => {
            let mut frames = FramedRead::new(reader, codec);
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(message) => {
                        print_message(out, &message).await?;
                        summary.decoded += 1;
                    }
                    Err(e) => {
                        // The stream cannot be trusted past a bad frame.
                        error!(
                            "Failed to decode DNS message #{} from {}: {}",
                            summary.decoded + summary.failed + 1,
                            source,
                            e
                        );
                        summary.failed += 1;
                    }
                }
            }
        }
    }

    info!(
        source,
        decoded = summary.decoded,
        failed = summary.failed,
        "finished input"
    );
    Ok(summary)
}

async fn print_message<W>(out: &mut W, message: &Message) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let rendered = format!("{}\n\n", message);
    out.write_all(rendered.as_bytes())
        .await
        .context("failed to write output")?;
    Ok(())
}
