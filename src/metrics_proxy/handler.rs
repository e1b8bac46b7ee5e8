//! Per-request relay from the local backend into the response.
//!
//! For every request the handler:
//! 1. Re-checks that a backend is configured
//! 2. Opens a fresh connection to it (no pooling, no retry)
//! 3. Copies everything the backend sends into the response body
//! 4. Closes the backend stream, whatever happened during the copy
//! 5. Hands the request to the next handler
//!
//! The incoming request is never forwarded to the backend. Neither the dial
//! nor the copy has a deadline, and a client hanging up does not stop an
//! in-flight relay.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{Instrument, Span};

use crate::directive::dispenser::Dispenser;
use crate::error::{HandlerError, ParseError, ProvisionError};
use crate::http::handler::{Handler, HandlerFuture, MiddlewareHandler};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::metrics_proxy::backend::{Backend, BackendSpec, UnixSocketBackend};
use crate::metrics_proxy::config::Config;
use crate::metrics_proxy::parse::unmarshal;
use crate::metrics_proxy::{MODULE_ID, MODULE_NAME};
use crate::registry::{Module, ModuleInfo, ProvisionContext};

/// Read buffer size for the relay
const BUFFER_SIZE: usize = 8192;

/// A configured proxy instance.
#[derive(Debug, Clone)]
pub struct LocalMetricsProxy {
    config: Config,
    logger: Span,
}

impl LocalMetricsProxy {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            logger: Span::none(),
        }
    }

    /// Registry entry for this module.
    pub fn module_info() -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID,
            directive: MODULE_NAME,
            new: Self::from_dispenser,
        }
    }

    fn from_dispenser(d: &mut Dispenser) -> Result<Box<dyn Module>, ParseError> {
        Ok(Box::new(Self::new(unmarshal(d)?)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates the instance once before it serves anything.
    pub fn provision(&mut self, ctx: &ProvisionContext) -> Result<(), ProvisionError> {
        if self.configured_backend().is_none() {
            return Err(ProvisionError::BackendNotConfigured);
        }
        self.logger = ctx.logger(MODULE_ID);
        Ok(())
    }

    /// Relays the backend into `w`, then runs `next`.
    ///
    /// `next` is only reached when dial, copy and close all succeeded.
    pub async fn serve_http(
        &self,
        req: &Request,
        w: &mut ResponseWriter,
        next: &dyn Handler,
    ) -> Result<(), HandlerError> {
        let spec = self
            .configured_backend()
            .ok_or(HandlerError::NotConfigured)?;

        match spec {
            BackendSpec::UnixSocket { path } => {
                let backend = UnixSocketBackend::new(path.clone());
                relay(&backend, w).instrument(self.logger.clone()).await?;
            }
        }

        next.serve(req, w).await
    }

    fn configured_backend(&self) -> Option<&BackendSpec> {
        self.config
            .backend
            .as_ref()
            .filter(|spec| !spec.address().is_empty())
    }
}

impl MiddlewareHandler for LocalMetricsProxy {
    fn serve<'a>(
        &'a self,
        req: &'a Request,
        w: &'a mut ResponseWriter,
        next: &'a dyn Handler,
    ) -> HandlerFuture<'a> {
        Box::pin(self.serve_http(req, w, next))
    }
}

impl Module for LocalMetricsProxy {
    fn id(&self) -> &'static str {
        MODULE_ID
    }

    fn provision(&mut self, ctx: &ProvisionContext) -> Result<(), ProvisionError> {
        LocalMetricsProxy::provision(self, ctx)
    }

    fn into_handler(self: Box<Self>) -> Box<dyn MiddlewareHandler> {
        self
    }
}

/// Opens `backend`, copies it into `w` until EOF, and closes it.
///
/// Returns the number of bytes relayed. A copy failure wins over a close
/// failure; a close failure still fails an otherwise complete relay.
pub async fn relay<B: Backend>(backend: &B, w: &mut ResponseWriter) -> Result<u64, HandlerError> {
    tracing::debug!(backend = %backend.address(), "Dialing backend");
    let mut stream = backend.open().await?;

    let copied = copy_into(&mut stream, w).await;
    let closed = close(&mut stream).await;
    drop(stream);

    let relayed = copied.map_err(HandlerError::Relay)?;
    closed.map_err(HandlerError::Close)?;

    tracing::debug!(backend = %backend.address(), bytes = relayed, "Relayed backend output");
    Ok(relayed)
}

async fn copy_into<S>(stream: &mut S, w: &mut ResponseWriter) -> io::Result<u64>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let mut total = 0u64;

    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            return Ok(total);
        }
        w.write_body(&buffer);
        buffer.clear();
        total += n as u64;
    }
}

async fn close<S>(stream: &mut S) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    match stream.shutdown().await {
        // peer already hung up; nothing left to tear down
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
