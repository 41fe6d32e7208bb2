use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::ServerContext;

pub struct Connection {
    // None once the relay has hijacked the socket
    stream: Option<TcpStream>,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: Some(stream),
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self, ctx: &ServerContext) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    match ctx.router.matches(&req.path) {
                        Some(vars) => {
                            // The relay owns the rest of this connection's
                            // lifetime; whatever happens in there, we are done
                            // with the request/response loop.
                            ctx.relay.handle(self, &req, &vars).await;
                        }
                        None => {
                            let keep_alive = req.keep_alive();
                            let writer = ResponseWriter::new(&Response::not_found());
                            self.state = ConnectionState::Writing(writer, keep_alive);
                        }
                    }
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    let stream = self
                        .stream
                        .as_mut()
                        .ok_or_else(|| anyhow::anyhow!("connection already hijacked"))?;
                    writer.write_to(stream).await?;

                    if keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    // Malformed request → protocol error
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("connection already hijacked"))?;

            let n = stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }
        }
    }

    /// Writes a synthetic proxy response (503/500/404) to the client.
    ///
    /// Fails if the socket has already been hijacked, in which case no
    /// response can be delivered any more.
    pub async fn respond(&mut self, response: &Response) -> anyhow::Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("connection already hijacked"))?;
        ResponseWriter::new(response).write_to(stream).await
    }

    /// Takes exclusive ownership of the underlying socket, detaching it from
    /// the request/response state machine. Any bytes already read past the
    /// current request are handed back too; they belong to the client→backend
    /// stream and must not be dropped.
    ///
    /// After a successful hijack the connection is `Closed` and every other
    /// operation on it fails.
    pub fn hijack(&mut self) -> anyhow::Result<(TcpStream, Bytes)> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| anyhow::anyhow!("connection does not support hijacking: socket already detached"))?;
        let leftover = self.buffer.split().freeze();
        self.state = ConnectionState::Closed;
        Ok((stream, leftover))
    }

    /// Whether the socket is still attached to this connection.
    pub fn is_hijacked(&self) -> bool {
        self.stream.is_none()
    }
}
