//! The conversion context.
//!
//! A `Converter` threads the environment, the reporter handle, and the
//! fresh-name counters through every pass, replacing the implicit global
//! state of a naive design. Passes take `&mut Converter` and return
//! `Result`; a fatal diagnostic unwinds the current module.

use std::sync::Arc;

use freec_common::{Diagnostic, Fatal, Reporter, Result, Span};
use freec_env::{Entry, EntryKind, Environment, Lookup, Scope};
use freec_ir::QName;

/// Name of the shape parameter threaded through all generated code.
pub const SHAPE: &str = "Shape";
/// Name of the position parameter threaded through all generated code.
pub const POS: &str = "Pos";
/// Name of the `Partial` instance binder of partial functions.
pub const PARTIAL_ARG: &str = "P";

pub struct Converter<'a> {
    pub env: Environment,
    pub file: &'a str,
    /// Source name of the module being compiled.
    pub module_name: Option<String>,
    pub reporter: &'a mut Reporter,
    /// Counter for internal IR-level names (`#i0`, `#e1`, ...) used by the
    /// recursion transformer's renaming.
    internal_counter: u32,
}

impl<'a> Converter<'a> {
    pub fn new(
        env: Environment,
        file: &'a str,
        module_name: Option<String>,
        reporter: &'a mut Reporter,
    ) -> Self {
        Converter {
            env,
            file,
            module_name,
            reporter,
            internal_counter: 0,
        }
    }

    pub fn fatal(&mut self, span: Span, message: impl Into<String>) -> Fatal {
        self.reporter
            .report_fatal(Diagnostic::error(self.file, span, message))
    }

    pub fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.reporter
            .report(Diagnostic::warning(self.file, span, message));
    }

    /// Run `f` inside a fresh environment scope; popped on all exit paths.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        result
    }

    /// A fresh Gallina identifier (registered as taken for this module).
    pub fn fresh(&mut self, prefix: &str) -> String {
        self.env.fresh_ident(prefix)
    }

    /// A fresh internal IR-level name; `#` keeps it outside the source
    /// identifier space.
    pub fn fresh_internal(&mut self, prefix: &str) -> String {
        let name = format!("#{prefix}{}", self.internal_counter);
        self.internal_counter += 1;
        name
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a name, reporting unknown/ambiguous references fatally.
    /// `expected` names the entity kind in the error message.
    pub fn resolve(
        &mut self,
        scope: Scope,
        name: &QName,
        span: Span,
        expected: &str,
    ) -> Result<Arc<Entry>> {
        match self.env.lookup(scope, name) {
            Lookup::Found(entry) => Ok(entry),
            Lookup::Ambiguous(modules) => Err(self.fatal(
                span,
                format!(
                    "ambiguous reference to {expected} '{name}'; it is exported by {}",
                    modules.join(" and ")
                ),
            )),
            Lookup::Missing => Err(self.fatal(span, format!("unknown {expected} '{name}'"))),
        }
    }

    /// The (possibly module-qualified) Gallina reference for an entry.
    #[must_use]
    pub fn entry_ref(&self, entry: &Entry) -> String {
        self.qualify(entry, &entry.target)
    }

    /// The smart-constructor reference for a constructor entry.
    #[must_use]
    pub fn smart_ref(&self, entry: &Entry) -> String {
        match &entry.kind {
            EntryKind::Con { smart_target, .. } => self.qualify(entry, smart_target),
            _ => self.entry_ref(entry),
        }
    }

    fn qualify(&self, entry: &Entry, target: &str) -> String {
        match &entry.original.module {
            Some(module) if self.module_name.as_deref() != Some(module.as_str()) => {
                format!("{module}.{target}")
            }
            _ => target.to_string(),
        }
    }
}
