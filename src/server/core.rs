use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::auth::{CredentialsStore, SharedCredentials};
use crate::config::AppConfig;
use crate::error::ServerError;
use crate::protocol::handlers::malformed;
use crate::protocol::{CommandStatus, handle_command, parse_command};

pub struct Server {
    listener: TcpListener,
    credentials: SharedCredentials,
    config: Arc<AppConfig>,
}

impl Server {
    /// Binds the listening socket from `config`.
    pub async fn bind(config: AppConfig, credentials: SharedCredentials) -> Result<Self, ServerError> {
        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        Ok(Self {
            listener,
            credentials,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn credentials(&self) -> &SharedCredentials {
        &self.credentials
    }

    /// Accepts connections until the process stops.
    pub async fn start(&self) {
        info!(
            "Starting credstore on {} (auth {})",
            self.config.listen_socket(),
            if self.config.auth_enabled() { "enabled" } else { "disabled" }
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let credentials = self.credentials.clone();
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, addr, credentials, config).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Serves one connection: one command per line until QUIT or EOF.
async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    credentials: SharedCredentials,
    config: Arc<AppConfig>,
) -> Result<(), std::io::Error> {
    info!("Client connected: {}", client_addr);

    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    // Room for the terminator on top of the payload.
    let limit = config.max_line_length as u64 + 2;

    reader.get_mut().write_all(b"220 credstore ready\r\n").await?;
    reader.get_mut().flush().await?;

    loop {
        line.clear();
        let n = (&mut reader).take(limit).read_until(b'\n', &mut line).await?;
        if n == 0 {
            info!("Client disconnected: {}", client_addr);
            return Ok(());
        }

        if line.last() != Some(&b'\n') && n as u64 == limit {
            warn!("Client {} sent an overlong line, closing", client_addr);
            discard_line(&mut reader).await?;
            let result = malformed("Line too long");
            reader.get_mut().write_all(result.message.as_bytes()).await?;
            reader.get_mut().shutdown().await?;
            return Ok(());
        }

        let result = match std::str::from_utf8(&line) {
            Ok(text) => handle_command(parse_command(text), &credentials).await,
            Err(_) => {
                warn!("Client {} sent a line that is not UTF-8", client_addr);
                malformed("Invalid UTF-8")
            }
        };
        reader.get_mut().write_all(result.message.as_bytes()).await?;
        reader.get_mut().flush().await?;

        if result.status == CommandStatus::CloseConnection {
            info!("Client {} quit", client_addr);
            return Ok(());
        }
    }
}

/// Skips input up to and including the next newline (or EOF).
async fn discard_line<R>(reader: &mut R) -> Result<(), std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let buf = reader.fill_buf().await?;
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), buf.is_empty()),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

/// Builds the initial store described by `config`. No credentials file
/// means authorization is disabled.
pub fn load_credentials(config: &AppConfig) -> Result<SharedCredentials, ServerError> {
    let Some(path) = config.credentials_path() else {
        warn!("No credentials file configured, authorization is disabled");
        return Ok(SharedCredentials::disabled());
    };

    let mut store = CredentialsStore::from_file(&path)?;
    store.set_use_cache(config.use_hash_cache);
    Ok(SharedCredentials::new(Some(store)))
}

/// Reloads the credentials file whenever the process receives SIGHUP.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    credentials: SharedCredentials,
    config: Arc<AppConfig>,
) -> Result<(), ServerError> {
    use tokio::signal::unix::{SignalKind, signal};

    let Some(path) = config.credentials_path() else {
        return Ok(());
    };
    let mut hangups = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!("SIGHUP received, reloading {}", path.display());
            // Failures are logged inside; the previous store keeps serving.
            let _ = credentials
                .reload_from_file(&path, config.use_hash_cache)
                .await;
        }
    });
    Ok(())
}

/// Loads credentials, binds, and serves forever.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let credentials = load_credentials(&config)?;

    #[cfg(unix)]
    spawn_reload_on_hangup(credentials.clone(), Arc::new(config.clone()))?;

    let server = Server::bind(config, credentials).await?;
    server.start().await;
    Ok(())
}
