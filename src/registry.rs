//! Explicit module registry.
//!
//! The host builds a [`Registry`], registers the modules it wants, and uses
//! it to turn a configuration file into a provisioned handler [`Chain`].
//! Nothing registers itself.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::Span;

use crate::directive::dispenser::Dispenser;
use crate::directive::lexer::tokenize;
use crate::directive::split_directives;
use crate::error::{ParseError, ProvisionError, SyntaxError};
use crate::http::handler::{Chain, MiddlewareHandler};
use crate::metrics_proxy::{Config, LocalMetricsProxy};

/// A handler module that can be provisioned and placed in a chain.
pub trait Module: MiddlewareHandler {
    /// Fully qualified module id, e.g. `http.handlers.local_metrics_proxy`.
    fn id(&self) -> &'static str;

    /// One-time validation and setup before the module serves requests.
    fn provision(&mut self, ctx: &ProvisionContext) -> Result<(), ProvisionError>;

    fn into_handler(self: Box<Self>) -> Box<dyn MiddlewareHandler>;
}

/// Constructor table entry for one module.
#[derive(Clone, Copy)]
pub struct ModuleInfo {
    pub id: &'static str,
    /// Directive name that selects this module in configuration text
    pub directive: &'static str,
    /// Builds an unprovisioned instance from the directive's tokens
    pub new: fn(&mut Dispenser) -> Result<Box<dyn Module>, ParseError>,
}

impl fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInfo")
            .field("id", &self.id)
            .field("directive", &self.directive)
            .finish()
    }
}

/// Shared services handed to modules while provisioning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionContext;

impl ProvisionContext {
    /// Logging handle scoped to a module instance.
    pub fn logger(&self, module_id: &'static str) -> Span {
        tracing::info_span!("module", id = module_id)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    modules: HashMap<&'static str, ModuleInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every module this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let info = LocalMetricsProxy::module_info();
        registry.modules.insert(info.directive, info);
        registry
    }

    /// Adds a module; a second module claiming the same directive is rejected.
    pub fn register(&mut self, info: ModuleInfo) -> anyhow::Result<()> {
        if let Some(existing) = self.modules.get(info.directive) {
            bail!(
                "directive {} already registered by module {}",
                info.directive,
                existing.id
            );
        }
        tracing::debug!(id = info.id, directive = info.directive, "Registered module");
        self.modules.insert(info.directive, info);
        Ok(())
    }

    pub fn get(&self, directive: &str) -> Option<&ModuleInfo> {
        self.modules.get(directive)
    }

    /// Parses configuration text into unprovisioned modules, in file order.
    pub fn parse(&self, file: &str, input: &str) -> Result<Vec<Box<dyn Module>>, ParseError> {
        let segments = split_directives(tokenize(file, input))?;
        let mut modules = Vec::with_capacity(segments.len());

        for segment in segments {
            let mut d = Dispenser::new(file, segment);
            d.next();
            let name = d.val().to_string();
            let Some(info) = self.get(&name) else {
                return Err(d.err(SyntaxError::UnknownDirective { name }));
            };

            let mut d = Dispenser::new(file, d.into_tokens());
            modules.push((info.new)(&mut d)?);
        }

        Ok(modules)
    }

    /// Parses, provisions and chains every directive in `input`.
    ///
    /// Any parse or provisioning failure aborts startup.
    pub fn load_chain(&self, file: &str, input: &str) -> anyhow::Result<Chain> {
        let ctx = ProvisionContext;
        let mut handlers = Vec::new();

        for mut module in self.parse(file, input)? {
            module
                .provision(&ctx)
                .with_context(|| format!("provisioning {}", module.id()))?;
            tracing::info!(id = module.id(), "Provisioned module");
            handlers.push(module.into_handler());
        }

        Ok(Chain::new(handlers))
    }

    /// Loads a chain from a configuration file.
    ///
    /// `.json`, `.yaml` and `.yml` files hold the serialized proxy config and
    /// yield a single-handler chain; anything else is directive text.
    pub fn load_chain_from_file(&self, path: &Path) -> anyhow::Result<Chain> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config = match extension {
            "json" => Config::from_json(&input),
            "yaml" | "yml" => Config::from_yaml(&input),
            _ => return self.load_chain(&path.display().to_string(), &input),
        }
        .with_context(|| format!("parsing {}", path.display()))?;

        let mut proxy = LocalMetricsProxy::new(config);
        proxy.provision(&ProvisionContext)?;
        let handler: Box<dyn MiddlewareHandler> = Box::new(proxy);
        Ok(Chain::new(vec![handler]))
    }
}
