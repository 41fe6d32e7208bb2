//! Outbound connection dialing
//!
//! The transport decision is made once, as a tagged variant, and dispatched
//! through the `Dialer` capability. The relay never string-matches schemes
//! past this point.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::proxy::resolver::ResolvedTarget;

/// How the outbound leg of a relay is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    /// Chosen once from the rewritten scheme; `wss` and `https` backends get
    /// a TLS leg, everything else plain TCP.
    pub fn from_scheme(scheme: &str) -> Self {
        if scheme == "wss" || scheme == "https" {
            Transport::Tls
        } else {
            Transport::Plain
        }
    }
}

pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

/// An established outbound connection, plain or TLS.
pub type BoxedStream = Box<dyn AsyncStream>;

/// Capability for opening outbound connections.
///
/// The relay handler takes a dialer as a constructor argument instead of
/// reaching for a process-wide default, so tests can substitute a double
/// without touching the network.
pub trait Dialer: Send + Sync {
    fn dial(
        &self,
        transport: Transport,
        target: &ResolvedTarget,
    ) -> impl Future<Output = anyhow::Result<BoxedStream>> + Send;
}

/// The production dialer: plain TCP, or TLS with certificate verification
/// disabled. Backends are pre-validated against the instance registry, so the
/// peer identity check is intentionally waived inside that trust boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetDialer;

impl NetDialer {
    pub fn new() -> Self {
        Self
    }

    fn tls_connector() -> TlsConnector {
        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InsecureVerifier))
            .with_no_client_auth();
        TlsConnector::from(Arc::new(config))
    }
}

impl Dialer for NetDialer {
    async fn dial(
        &self,
        transport: Transport,
        target: &ResolvedTarget,
    ) -> anyhow::Result<BoxedStream> {
        let addr = target.addr();
        let stream = TcpStream::connect(&addr)
            .await
            .with_context(|| format!("connecting to {}", addr))?;

        match transport {
            Transport::Plain => Ok(Box::new(stream)),
            Transport::Tls => {
                let server_name = ServerName::try_from(target.host.clone())
                    .with_context(|| format!("invalid TLS server name {}", target.host))?;
                let tls = Self::tls_connector()
                    .connect(server_name, stream)
                    .await
                    .with_context(|| format!("TLS handshake with {}", addr))?;
                Ok(Box::new(tls))
            }
        }
    }
}

/// Accepts any server certificate.
#[derive(Debug)]
struct InsecureVerifier;

impl ServerCertVerifier for InsecureVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
