use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use crate::transport::LineSink;


/// The local line channel's output side, over anything writable: stdout by default, or an
///  opened serial device.
pub struct WriterLineSink<W> {
    writer: Mutex<W>,
}
impl<W: AsyncWrite + Unpin + Send> WriterLineSink<W> {
    pub fn new(writer: W) -> WriterLineSink<W> {
        WriterLineSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
impl WriterLineSink<Stdout> {
    pub fn stdout() -> WriterLineSink<Stdout> {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> LineSink for WriterLineSink<W> {
    async fn write_text(&self, text: &str) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Reads lines in a separate task, so consuming them is cancel safe (e.g. in a `select!`).
///  Lines are delivered with their line terminator; invalid UTF-8 is replaced rather than
///  rejected. The channel closes when the reader reaches end of input or fails.
pub fn spawn_line_reader<R>(reader: R, capacity: usize) -> mpsc::Receiver<String>
where R: AsyncRead + Unpin + Send + 'static
{
    let (send, recv) = mpsc::channel(capacity);

    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    debug!("end of local input");
                    break;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if send.send(line).await.is_err() {
                        debug!("local lines are no longer consumed - stopping reader");
                        break;
                    }
                }
                Err(e) => {
                    error!(error = ?e, "error reading local input");
                    break;
                }
            }
        }
    });

    recv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writer_line_sink() {
        let sink = WriterLineSink::new(Vec::new());
        sink.write_text(">a:100000:1|g\r\n").await.unwrap();
        sink.write_text("partial").await.unwrap();

        assert_eq!(sink.into_inner(), b">a:100000:1|g\r\npartial".to_vec());
    }

    #[tokio::test]
    async fn test_spawn_line_reader() {
        let input: &'static [u8] = b"CONNECT:10.0.0.1:4000\r\nhello\n\xffbad\nlast";
        let mut lines = spawn_line_reader(input, 2);

        assert_eq!(lines.recv().await.unwrap(), "CONNECT:10.0.0.1:4000\r\n");
        assert_eq!(lines.recv().await.unwrap(), "hello\n");
        assert_eq!(lines.recv().await.unwrap(), "\u{FFFD}bad\n");
        assert_eq!(lines.recv().await.unwrap(), "last");
        assert_eq!(lines.recv().await, None);
    }
}
