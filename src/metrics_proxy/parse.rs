//! Directive parsing for the proxy.
//!
//! ```text
//! local_metrics_proxy {
//!     uds {
//!         path "/path/to/unix/socket"
//!     }
//! }
//! ```

use crate::directive::dispenser::Dispenser;
use crate::directive::lexer::tokenize;
use crate::directive::split_directives;
use crate::error::{ParseError, SyntaxError, ValidationError};
use crate::metrics_proxy::backend::{BackendSpec, UNIX_BACKEND_KIND};
use crate::metrics_proxy::config::Config;

/// Parses directive text into a validated [`Config`].
///
/// Braces must balance across the whole input before any directive is read.
pub fn parse_config(file: &str, input: &str) -> Result<Config, ParseError> {
    let tokens = split_directives(tokenize(file, input))?
        .into_iter()
        .flatten()
        .collect();
    let mut d = Dispenser::new(file, tokens);
    unmarshal(&mut d)
}

/// Consumes every occurrence of the directive left in `d`.
///
/// The directive name itself is not checked; dispatch by name is the
/// caller's job.
pub fn unmarshal(d: &mut Dispenser) -> Result<Config, ParseError> {
    let mut backend: Option<BackendSpec> = None;

    while d.next() {
        let args = d.remaining_args();
        if !args.is_empty() {
            return Err(d.err(SyntaxError::ExtraArguments { args }));
        }

        let nesting = d.nesting();
        while d.next_block(nesting) {
            let kind = d.val().to_string();
            match kind.as_str() {
                UNIX_BACKEND_KIND => {
                    if backend.is_some() {
                        return Err(d.err(ValidationError::DuplicateBlock { kind }));
                    }
                    backend = Some(parse_uds_block(d)?);
                }
                _ => return Err(d.err(ValidationError::UnknownKind { kind })),
            }
        }
    }

    match backend {
        Some(backend) => Ok(Config::with_backend(backend)),
        None => Err(d.err(ValidationError::MissingKind)),
    }
}

fn parse_uds_block(d: &mut Dispenser) -> Result<BackendSpec, ParseError> {
    let args = d.remaining_args();
    if !args.is_empty() {
        return Err(d.err(SyntaxError::ExtraKindArguments {
            kind: UNIX_BACKEND_KIND.to_string(),
            args,
        }));
    }

    let mut spec: Option<BackendSpec> = None;
    let nesting = d.nesting();
    while d.next_block(nesting) {
        let key = d.val().to_string();
        match key.as_str() {
            "path" => {
                if spec.is_some() {
                    return Err(d.err(ValidationError::DuplicatePath));
                }
                if !d.next_arg() {
                    return Err(d.arg_err());
                }
                let path = d.val().to_string();
                if d.next_arg() {
                    return Err(d.arg_err());
                }
                spec = Some(BackendSpec::unix_socket(path).map_err(|e| d.err(e))?);
            }
            _ => {
                return Err(d.err(ValidationError::UnknownKey {
                    kind: UNIX_BACKEND_KIND.to_string(),
                    key,
                }));
            }
        }
    }

    spec.ok_or_else(|| {
        d.err(ValidationError::MissingPath {
            kind: UNIX_BACKEND_KIND.to_string(),
        })
    })
}
