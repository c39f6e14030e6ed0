//! Two-peer room over QUIC
//!
//! One side hosts (`--bind`), the other joins (`--peer`). Each direction is a
//! single unidirectional stream of length-prefixed payloads, so messages
//! arrive in the order they were sent. The connection lives on a small tokio
//! runtime owned by the channel; the frame only touches channels.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bevy::log::{info, warn};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use tokio::sync::mpsc;

use super::NetError;
use super::channel::PeerChannel;

const ALPN: &[u8] = b"fightgame-peer";
/// Largest payload accepted from the peer; messages are small JSON objects
const MAX_PAYLOAD: usize = 64 * 1024;
const KEEP_ALIVE: Duration = Duration::from_secs(2);

/// Connection half of a [`QuicChannel`], shared with the link tasks
struct Link {
    connected: AtomicBool,
}

pub struct QuicChannel {
    runtime: Option<tokio::runtime::Runtime>,
    endpoint: Option<quinn::Endpoint>,
    outbound: Option<mpsc::UnboundedSender<Vec<u8>>>,
    inbound: Receiver<Vec<u8>>,
    link: Arc<Link>,
    echo: VecDeque<Vec<u8>>,
}

impl QuicChannel {
    /// Listen on `bind` and take the first peer that connects
    pub fn host(bind: SocketAddr) -> Result<Self, NetError> {
        let runtime = link_runtime()?;
        let endpoint = {
            let _guard = runtime.enter();
            quinn::Endpoint::server(server_config()?, bind)?
        };

        let (channel, ends) = Self::new(runtime, endpoint.clone());
        if let Some(runtime) = &channel.runtime {
            runtime.spawn(async move {
                let Some(incoming) = endpoint.accept().await else {
                    return;
                };
                match incoming.await {
                    Ok(connection) => {
                        info!("Peer joined from {}", connection.remote_address());
                        ends.run(connection).await;
                    }
                    Err(e) => warn!("Peer handshake failed: {}", e),
                }
            });
        }
        Ok(channel)
    }

    /// Connect from `bind` to a hosting peer at `peer`
    pub fn join(bind: SocketAddr, peer: SocketAddr) -> Result<Self, NetError> {
        let runtime = link_runtime()?;
        let (endpoint, connecting) = {
            let _guard = runtime.enter();
            let mut endpoint = quinn::Endpoint::client(bind)?;
            endpoint.set_default_client_config(client_config()?);
            let connecting = endpoint
                .connect(peer, "localhost")
                .map_err(|e| NetError::Link(e.to_string()))?;
            (endpoint, connecting)
        };

        let (channel, ends) = Self::new(runtime, endpoint);
        if let Some(runtime) = &channel.runtime {
            runtime.spawn(async move {
                match connecting.await {
                    Ok(connection) => {
                        info!("Joined peer at {}", connection.remote_address());
                        ends.run(connection).await;
                    }
                    Err(e) => warn!("Cannot reach peer {}: {}", peer, e),
                }
            });
        }
        Ok(channel)
    }

    fn new(runtime: tokio::runtime::Runtime, endpoint: quinn::Endpoint) -> (Self, LinkEnds) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = crossbeam_channel::unbounded();
        let link = Arc::new(Link {
            connected: AtomicBool::new(false),
        });
        let channel = Self {
            runtime: Some(runtime),
            endpoint: Some(endpoint),
            outbound: Some(out_tx),
            inbound: in_rx,
            link: link.clone(),
            echo: VecDeque::new(),
        };
        let ends = LinkEnds {
            outbound: out_rx,
            inbound: in_tx,
            link,
        };
        (channel, ends)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        let endpoint = self.endpoint.as_ref().ok_or(NetError::Closed)?;
        Ok(endpoint.local_addr()?)
    }

    /// The peer connection is up
    pub fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::Acquire)
    }
}

impl PeerChannel for QuicChannel {
    /// Sends while no peer is connected fail with [`NetError::Offline`] and are dropped
    fn send(&mut self, payload: &[u8]) -> Result<(), NetError> {
        let outbound = self.outbound.as_ref().ok_or(NetError::Closed)?;
        if !self.is_connected() {
            return Err(NetError::Offline);
        }
        outbound
            .send(payload.to_vec())
            .map_err(|_| NetError::Closed)?;
        self.echo.push_back(payload.to_vec());
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<Vec<u8>>, NetError> {
        if self.outbound.is_none() {
            return Err(NetError::Closed);
        }
        let mut received: Vec<Vec<u8>> = self.echo.drain(..).collect();
        loop {
            match self.inbound.try_recv() {
                Ok(payload) => received.push(payload),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if received.is_empty() {
                        return Err(NetError::Closed);
                    }
                    break;
                }
            }
        }
        Ok(received)
    }

    fn close(&mut self) {
        self.outbound = None;
        self.echo.clear();
        self.link.connected.store(false, Ordering::Release);
        if let Some(endpoint) = self.endpoint.take() {
            endpoint.close(0u32.into(), b"left room");
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Drop for QuicChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Task-side ends of the channel pair
struct LinkEnds {
    outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    inbound: Sender<Vec<u8>>,
    link: Arc<Link>,
}

impl LinkEnds {
    async fn run(self, connection: quinn::Connection) {
        let LinkEnds {
            mut outbound,
            inbound,
            link,
        } = self;
        link.connected.store(true, Ordering::Release);

        let writer = connection.clone();
        let send_task = tokio::spawn(async move {
            let mut stream = match writer.open_uni().await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Cannot open peer stream: {}", e);
                    return;
                }
            };
            while let Some(payload) = outbound.recv().await {
                let len = (payload.len() as u32).to_be_bytes();
                if let Err(e) = stream.write_all(&len).await {
                    warn!("Peer stream closed: {}", e);
                    return;
                }
                if let Err(e) = stream.write_all(&payload).await {
                    warn!("Peer stream closed: {}", e);
                    return;
                }
            }
            let _ = stream.finish();
        });

        match connection.accept_uni().await {
            Ok(mut stream) => loop {
                let mut len = [0u8; 4];
                if stream.read_exact(&mut len).await.is_err() {
                    break;
                }
                let len = u32::from_be_bytes(len) as usize;
                if len > MAX_PAYLOAD {
                    warn!("Peer payload of {} bytes exceeds {}", len, MAX_PAYLOAD);
                    break;
                }
                let mut payload = vec![0u8; len];
                if stream.read_exact(&mut payload).await.is_err() {
                    break;
                }
                if inbound.send(payload).is_err() {
                    break;
                }
            },
            Err(e) => warn!("Peer never opened its stream: {}", e),
        }

        link.connected.store(false, Ordering::Release);
        send_task.abort();
        info!("Peer link closed");
    }
}

fn link_runtime() -> Result<tokio::runtime::Runtime, NetError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("peer-link")
        .enable_all()
        .build()?)
}

fn transport() -> Arc<quinn::TransportConfig> {
    let mut transport = quinn::TransportConfig::default();
    transport.keep_alive_interval(Some(KEEP_ALIVE));
    Arc::new(transport)
}

fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Host side: a fresh self-signed certificate per match
fn server_config() -> Result<quinn::ServerConfig, NetError> {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| NetError::Link(e.to_string()))?;
    let cert = CertificateDer::from(certified.cert.der().to_vec());
    let key = PrivateKeyDer::try_from(certified.key_pair.serialize_der())
        .map_err(|e| NetError::Link(e.to_string()))?;

    let mut crypto = rustls::ServerConfig::builder_with_provider(crypto_provider())
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| NetError::Link(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .map_err(|e| NetError::Link(e.to_string()))?;
    crypto.alpn_protocols = vec![ALPN.to_vec()];

    let quic = quinn::crypto::rustls::QuicServerConfig::try_from(crypto)
        .map_err(|e| NetError::Link(e.to_string()))?;
    let mut config = quinn::ServerConfig::with_crypto(Arc::new(quic));
    config.transport_config(transport());
    Ok(config)
}

/// Joining side. The host's certificate is self-signed, so only its signatures are checked.
fn client_config() -> Result<quinn::ClientConfig, NetError> {
    let provider = crypto_provider();
    let mut crypto = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| NetError::Link(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(PeerCertificate(provider)))
        .with_no_client_auth();
    crypto.alpn_protocols = vec![ALPN.to_vec()];

    let quic = quinn::crypto::rustls::QuicClientConfig::try_from(crypto)
        .map_err(|e| NetError::Link(e.to_string()))?;
    let mut config = quinn::ClientConfig::new(Arc::new(quic));
    config.transport_config(transport());
    Ok(config)
}

/// Accepts any host certificate but still verifies handshake signatures
#[derive(Debug)]
struct PeerCertificate(Arc<rustls::crypto::CryptoProvider>);

impl rustls::client::danger::ServerCertVerifier for PeerCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
