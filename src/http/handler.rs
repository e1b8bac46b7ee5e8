//! Handler chain.
//!
//! A request passes through every [`MiddlewareHandler`] in order; each one
//! gets a `next` handler that runs the rest of the chain. The chain ends in
//! a [`Handler`] that does not delegate further.

use std::future::Future;
use std::pin::Pin;

use crate::error::HandlerError;
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>>;

/// The last stage of a chain, or the rest of a chain as seen from middleware.
pub trait Handler: Send + Sync {
    fn serve<'a>(&'a self, req: &'a Request, w: &'a mut ResponseWriter) -> HandlerFuture<'a>;
}

/// A stage that may act on the request and then hand it to `next`.
pub trait MiddlewareHandler: Send + Sync {
    fn serve<'a>(
        &'a self,
        req: &'a Request,
        w: &'a mut ResponseWriter,
        next: &'a dyn Handler,
    ) -> HandlerFuture<'a>;
}

/// Final stage that leaves the response exactly as the middleware built it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Handler for Terminal {
    fn serve<'a>(&'a self, _req: &'a Request, _w: &'a mut ResponseWriter) -> HandlerFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}

/// Ordered middleware followed by a terminal handler.
pub struct Chain {
    middleware: Vec<Box<dyn MiddlewareHandler>>,
    terminal: Box<dyn Handler>,
}

impl Chain {
    pub fn new(middleware: Vec<Box<dyn MiddlewareHandler>>) -> Self {
        Self::with_terminal(middleware, Box::new(Terminal))
    }

    pub fn with_terminal(
        middleware: Vec<Box<dyn MiddlewareHandler>>,
        terminal: Box<dyn Handler>,
    ) -> Self {
        Self {
            middleware,
            terminal,
        }
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl Handler for Chain {
    fn serve<'a>(&'a self, req: &'a Request, w: &'a mut ResponseWriter) -> HandlerFuture<'a> {
        Box::pin(async move {
            let next = Next {
                rest: self.middleware.as_slice(),
                terminal: self.terminal.as_ref(),
            };
            next.serve(req, w).await
        })
    }
}

struct Next<'c> {
    rest: &'c [Box<dyn MiddlewareHandler>],
    terminal: &'c dyn Handler,
}

impl Handler for Next<'_> {
    fn serve<'a>(&'a self, req: &'a Request, w: &'a mut ResponseWriter) -> HandlerFuture<'a> {
        match self.rest.split_first() {
            Some((first, rest)) => Box::pin(async move {
                let next = Next {
                    rest,
                    terminal: self.terminal,
                };
                first.serve(req, w, &next).await
            }),
            None => self.terminal.serve(req, w),
        }
    }
}
