// serial/mod.rs
use crate::{commands::SerialCommand, config::SerialSettings};
use metrics::counter;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

type Port = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared writer for the controller link.
///
/// Every command goes out as one locked `write_all` + `flush`, so lines from
/// concurrent requests never interleave. Without a port the transport runs
/// degraded: writes are dropped with a warning and report success.
pub struct SerialTransport {
    label: String,
    port: Option<Mutex<Port>>,
}

impl SerialTransport {
    pub fn open(settings: &SerialSettings) -> Result<Self, tokio_serial::Error> {
        let stream = tokio_serial::new(&settings.path, settings.baud_rate).open_native_async()?;
        info!(path = %settings.path, baud = settings.baud_rate, "Serial port opened");
        Ok(Self::from_writer(settings.path.clone(), stream))
    }

    pub fn disabled() -> Self {
        Self {
            label: "disabled".to_string(),
            port: None,
        }
    }

    pub fn from_writer<W>(label: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            label: label.into(),
            port: Some(Mutex::new(Box::new(writer))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    pub async fn send(&self, command: &SerialCommand) -> io::Result<()> {
        let line = command.to_line();
        let Some(port) = &self.port else {
            warn!(line = line.trim_end(), "Didn't connect to serial port, dropping command");
            counter!("powerd_serial_writes_total", "result" => "skipped").increment(1);
            return Ok(());
        };

        let mut port = port.lock().await;
        let written = async {
            port.write_all(line.as_bytes()).await?;
            port.flush().await
        }
        .await;

        match &written {
            Ok(()) => {
                debug!(port = %self.label, line = line.trim_end(), "Serial command written");
                counter!("powerd_serial_writes_total", "result" => "ok").increment(1);
            }
            Err(err) => {
                warn!(
                    port = %self.label,
                    line = line.trim_end(),
                    error = %err,
                    "Error writing to serial port"
                );
                counter!("powerd_serial_writes_total", "result" => "error").increment(1);
            }
        }
        written
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("label", &self.label)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SignalTag;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn open_fails_for_missing_device() {
        let settings = SerialSettings {
            enabled: true,
            path: "/dev/does-not-exist".to_string(),
            baud_rate: 19200,
        };
        assert!(SerialTransport::open(&settings).is_err());
    }

    #[tokio::test]
    async fn disabled_transport_swallows_writes() {
        let transport = SerialTransport::disabled();
        assert!(!transport.is_connected());
        transport.send(&SerialCommand::toggle(1)).await.unwrap();
    }

    #[tokio::test]
    async fn writes_whole_lines() {
        let (writer, mut reader) = tokio::io::duplex(256);
        let transport = SerialTransport::from_writer("duplex", writer);

        transport
            .send(&SerialCommand::signal(SignalTag::Dmx, 2, 128))
            .await
            .unwrap();
        transport.send(&SerialCommand::toggle(5)).await.unwrap();
        drop(transport);

        let mut received = String::new();
        reader.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "2d128w\n5c\n");
    }

    #[tokio::test]
    async fn concurrent_senders_do_not_interleave() {
        let (writer, mut reader) = tokio::io::duplex(64 * 1024);
        let transport = std::sync::Arc::new(SerialTransport::from_writer("duplex", writer));

        let mut tasks = Vec::new();
        for channel in 0..32 {
            let transport = transport.clone();
            tasks.push(tokio::spawn(async move {
                transport
                    .send(&SerialCommand::signal(SignalTag::Dmx, channel, 200))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        drop(transport);

        let mut received = String::new();
        reader.read_to_string(&mut received).await.unwrap();
        let lines: Vec<&str> = received.lines().collect();
        assert_eq!(lines.len(), 32);
        for line in lines {
            assert!(line.ends_with("d200w"), "mangled line {line:?}");
        }
    }
}
