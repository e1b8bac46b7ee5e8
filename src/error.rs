//! Error types for the local metrics proxy.
//!
//! Configuration errors carry the exact message text that tooling matches
//! on, so the `#[error]` strings below are part of the public contract.

use std::fmt;
use std::io;

use thiserror::Error;

/// Malformed directive structure: unexpected or missing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("extra unrecognized arguments: {}", format_args_list(.args))]
    ExtraArguments { args: Vec<String> },

    #[error("extra unrecognized {kind} arguments: {}", format_args_list(.args))]
    ExtraKindArguments { kind: String, args: Vec<String> },

    #[error("wrong argument count or unexpected line ending after '{token}'")]
    ArgumentCount { token: String },

    #[error("unrecognized directive: {name}")]
    UnknownDirective { name: String },

    #[error("unexpected '}}'")]
    UnexpectedCloseBrace,

    #[error("unexpected EOF")]
    UnexpectedEof,
}

/// Well-formed input that describes an invalid backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unrecognized backend kind: {kind}")]
    UnknownKind { kind: String },

    #[error("multiple {kind} blocks")]
    DuplicateBlock { kind: String },

    #[error("unrecognized {kind} argument: {key}")]
    UnknownKey { kind: String, key: String },

    #[error("multiple path arguments")]
    DuplicatePath,

    #[error("missing path for {kind} kind")]
    MissingPath { kind: String },

    #[error("path value must be an absolute filepath")]
    RelativePath { path: String },

    #[error("missing kind")]
    MissingKind,
}

/// The two families of configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A configuration error pinned to the token that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line} - Error during parsing: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Syntax(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Validation(_))
    }
}

/// Failures raised while provisioning a handler at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("proxy backend not configured")]
    BackendNotConfigured,
}

/// Failures raised while serving a single request.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("proxy backend not configured")]
    NotConfigured,

    #[error("dial {network} {address}: {source}")]
    Dial {
        network: &'static str,
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("relay from backend: {0}")]
    Relay(#[source] io::Error),

    #[error("close backend stream: {0}")]
    Close(#[source] io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Renders a list of tokens the way the diagnostics have always shown them:
/// `[a b c]`.
fn format_args_list(args: &[String]) -> ArgsList<'_> {
    ArgsList(args)
}

struct ArgsList<'a>(&'a [String]);

impl fmt::Display for ArgsList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(" "))
    }
}
