use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

pub struct Responder {
    pub addr: SocketAddr,
    request_lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl Responder {
    /// Request lines received so far, e.g. `HEAD / HTTP/1.1`.
    pub async fn requests(&self) -> Vec<String> {
        let mut rx = self.request_lines.lock().await;
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

async fn answer<S>(mut stream: S, status_line: &str, tx: &mpsc::UnboundedSender<String>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.unwrap_or(0);
    let head = String::from_utf8_lossy(&buf[..n]);
    let _ = tx.send(head.lines().next().unwrap_or_default().to_string());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status_line
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Answers every connection with `HTTP/1.1 <status_line>` and an empty body.
/// `status_line` may carry extra header lines separated by `\r\n`.
pub async fn spawn_responder(status_line: &'static str) -> Responder {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move { answer(socket, status_line, &tx).await });
        }
    });

    Responder {
        addr,
        request_lines: Mutex::new(rx),
    }
}

/// Same as `spawn_responder`, behind TLS with a freshly generated self-signed certificate.
pub async fn spawn_tls_responder(status_line: &'static str) -> Responder {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                // strict clients abort the handshake; nothing to answer then
                if let Ok(stream) = acceptor.accept(socket).await {
                    answer(stream, status_line, &tx).await;
                }
            });
        }
    });

    Responder {
        addr,
        request_lines: Mutex::new(rx),
    }
}

/// Accepts connections and never writes a byte back.
pub async fn spawn_silent() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;
    });

    addr
}
