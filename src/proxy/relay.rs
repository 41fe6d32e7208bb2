//! Transparent connection relay
//!
//! Takes over routed connections and splices them to their backend. After a
//! successful hijack the HTTP layer is out of the picture: bytes flow both
//! ways untouched, which is what lets WebSocket upgrades and TLS-wrapped
//! traffic pass through without the proxy understanding them.

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::connection::Connection;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::proxy::dial::{BoxedStream, Dialer, Transport};
use crate::proxy::resolver::{direct, ResolvedTarget};
use crate::registry::InstanceRegistry;
use crate::routing::RouteVars;

/// Relays a routed connection to its backend.
///
/// Per invocation: validate liveness, rewrite a copy of the request, dial the
/// backend, hijack the client socket, forward the request, then copy bytes in
/// both directions until the first direction terminates. Every failure is
/// terminal for the request; there are no retries and no timeouts at this
/// layer, so termination relies on one side closing or erroring.
pub struct RelayHandler<D> {
    registry: InstanceRegistry,
    dialer: D,
    own_port: String,
}

impl<D: Dialer> RelayHandler<D> {
    pub fn new(registry: InstanceRegistry, dialer: D, own_port: impl Into<String>) -> Self {
        Self {
            registry,
            dialer,
            own_port: own_port.into(),
        }
    }

    /// Handles one routed request. Side-effecting only: writes either a
    /// synthetic 503/500 or relayed bytes to the client connection.
    pub async fn handle(&self, conn: &mut Connection, request: &Request, vars: &RouteVars) {
        // Liveness gate: no registered instance, no dial. The node variable
        // carries dashes for dots on the wire.
        let instance_ip = vars.node.replace('-', ".");
        if self.registry.find_by_ip(&instance_ip).await.is_none() {
            tracing::warn!(node = %vars.node, "No live instance for requested node");
            self.respond(conn, Response::service_unavailable()).await;
            return;
        }

        // The original request is never mutated; the director works on a copy.
        let mut outreq = request.clone();
        let target = direct(&mut outreq, vars, &self.own_port, &self.registry).await;

        let transport = Transport::from_scheme(&outreq.scheme);
        let backend = match self.dialer.dial(transport, &target).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(
                    target = %target,
                    scheme = %outreq.scheme,
                    error = %e,
                    "Error dialing backend"
                );
                self.respond(conn, Response::internal_error()).await;
                return;
            }
        };

        // Past this point no conventional HTTP response is possible.
        let (client, leftover) = match conn.hijack() {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(error = %e, "Hijack error");
                self.respond(conn, Response::internal_error()).await;
                return;
            }
        };

        relay(client, leftover, backend, &outreq, &target).await;
    }

    /// Best-effort synthetic response; failures only get logged since the
    /// client may already be gone.
    async fn respond(&self, conn: &mut Connection, response: Response) {
        if let Err(e) = conn.respond(&response).await {
            tracing::debug!(error = %e, "Failed to write proxy response");
        }
    }
}

/// Forwards the rewritten request and splices the two sockets together.
///
/// Invariant: both sockets close together. Each copy task owns one half of
/// each stream; returning from here drops the finished task's halves, and
/// aborting the other task drops the rest. The first direction to terminate,
/// with a clean EOF or an error, ends the whole session; bytes in flight on
/// the other direction are abandoned, not flushed.
async fn relay(
    client: TcpStream,
    leftover: Bytes,
    mut backend: BoxedStream,
    outreq: &Request,
    target: &ResolvedTarget,
) {
    // The backend must observe the complete rewritten request, plus any bytes
    // the client pipelined behind it, before any relayed bytes flow.
    if let Err(e) = backend.write_all(&outreq.to_bytes()).await {
        tracing::error!(target = %target, error = %e, "Error copying request to backend");
        return;
    }
    if !leftover.is_empty() {
        if let Err(e) = backend.write_all(&leftover).await {
            tracing::error!(target = %target, error = %e, "Error copying buffered bytes to backend");
            return;
        }
    }
    if let Err(e) = backend.flush().await {
        tracing::error!(target = %target, error = %e, "Error flushing request to backend");
        return;
    }

    let (mut client_read, mut client_write) = client.into_split();
    let (mut backend_read, mut backend_write) = tokio::io::split(backend);

    let mut client_to_backend = tokio::spawn(async move {
        tokio::io::copy(&mut client_read, &mut backend_write).await
    });
    let mut backend_to_client = tokio::spawn(async move {
        tokio::io::copy(&mut backend_read, &mut client_write).await
    });

    tokio::select! {
        res = &mut client_to_backend => {
            backend_to_client.abort();
            log_relay_end("client to backend", res);
        }
        res = &mut backend_to_client => {
            client_to_backend.abort();
            log_relay_end("backend to client", res);
        }
    }
}

fn log_relay_end(
    direction: &str,
    res: Result<std::io::Result<u64>, tokio::task::JoinError>,
) {
    match res {
        Ok(Ok(bytes)) => tracing::debug!(direction, bytes, "Relay direction closed"),
        Ok(Err(e)) => tracing::warn!(direction, error = %e, "Relay I/O error"),
        Err(e) => tracing::error!(direction, error = %e, "Relay task failed"),
    }
}
