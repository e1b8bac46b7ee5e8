use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::error::HandlerError;
use crate::http::handler::Handler;
use crate::http::parser::{parse_http_request, RequestParseError};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{write_response, ResponseWriter};

pub struct Connection<S> {
    stream: S,
    buffer: Vec<u8>,
    state: ConnectionState,
    handler: Arc<dyn Handler>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Response, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(4096),
            state: ConnectionState::Reading,
            handler,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(RequestParseError::Incomplete) => ConnectionState::Closed,
                        Err(e) => {
                            tracing::debug!(error = %e, "Malformed request");
                            ConnectionState::Writing(Response::error(StatusCode::BadRequest), false)
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.handle_request(&req).await;
                    self.state = ConnectionState::Writing(response, req.keep_alive());
                }

                ConnectionState::Writing(response, keep_alive) => {
                    write_response(&mut self.stream, &response).await?;

                    self.state = if keep_alive {
                        ConnectionState::Reading
                    } else {
                        ConnectionState::Closed
                    };
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads until a full request is buffered. `Ok(None)` means the client
    /// closed the connection between requests.
    pub async fn read_request(&mut self) -> Result<Option<Request>, RequestParseError> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.drain(..consumed);
                    return Ok(Some(request));
                }
                Err(RequestParseError::Incomplete) => {}
                Err(e) => return Err(e),
            }

            let mut temp = [0u8; 1024];
            let n = match self.stream.read(&mut temp).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(error = %e, "Read from client failed");
                    return Ok(None);
                }
            };

            if n == 0 {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(RequestParseError::Incomplete)
                };
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    async fn handle_request(&self, req: &Request) -> Response {
        let mut writer = ResponseWriter::new();

        match self.handler.serve(req, &mut writer).await {
            Ok(()) => {
                tracing::info!(
                    method = %req.method,
                    path = %req.path,
                    status = writer.status().as_u16(),
                    bytes = writer.body().len(),
                    "Request handled"
                );
                writer.into_response()
            }
            Err(e) => {
                let status = error_status(&e);
                tracing::error!(
                    method = %req.method,
                    path = %req.path,
                    status = status.as_u16(),
                    error = %e,
                    "Handler failed"
                );
                Response::error(status)
            }
        }
    }
}

/// Status the host answers with when the chain fails.
pub fn error_status(err: &HandlerError) -> StatusCode {
    match err {
        HandlerError::Dial { .. } | HandlerError::Relay(_) | HandlerError::Close(_) => {
            StatusCode::BadGateway
        }
        HandlerError::NotConfigured | HandlerError::Other(_) => StatusCode::InternalServerError,
    }
}
