//! The two-scope environment.
//!
//! Lookups walk a stack of frames from innermost to outermost. The bottom
//! frame holds predefined and imported entries, the next one the module's
//! own top-level entries; every binding construct pushes a fresh frame on
//! top. Entry tables are `IndexMap`s because registration order is
//! observable in emitted output and must be deterministic.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use freec_ir::QName;

use crate::entry::{Entry, EntryKind, Scope};
use crate::interface::ModuleInterface;
use crate::renamer::{TakenIdents, sanitize};

/// Result of a name lookup.
#[derive(Clone, Debug)]
pub enum Lookup {
    Found(Arc<Entry>),
    /// The unqualified name is provided by several imports.
    Ambiguous(Vec<String>),
    Missing,
}

#[derive(Clone, Debug)]
enum Binding {
    One(Arc<Entry>),
    /// Modules that all export this unqualified name.
    Clash(Vec<String>),
}

#[derive(Clone, Debug, Default)]
struct Frame {
    types: IndexMap<QName, Binding>,
    values: IndexMap<QName, Binding>,
    /// Target identifiers claimed by this frame's local entries; released
    /// when the frame pops so later binders can reuse the plain names.
    claims: Vec<String>,
}

impl Frame {
    fn table(&self, scope: Scope) -> &IndexMap<QName, Binding> {
        match scope {
            Scope::Type => &self.types,
            Scope::Value => &self.values,
        }
    }

    fn table_mut(&mut self, scope: Scope) -> &mut IndexMap<QName, Binding> {
        match scope {
            Scope::Type => &mut self.types,
            Scope::Value => &mut self.values,
        }
    }
}

/// The compiler's symbol table for one module compilation.
#[derive(Clone, Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    taken: TakenIdents,
    fresh_counter: u64,
    /// Decreasing-argument index per recursive function, recorded after
    /// termination analysis.
    dec_args: FxHashMap<QName, usize>,
}

impl Environment {
    /// An environment with the base frame (predefined entries) and the
    /// module frame (top-level entries) already in place.
    #[must_use]
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::default(), Frame::default()],
            taken: TakenIdents::new(),
            fresh_counter: 0,
            dec_args: FxHashMap::default(),
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Run `f` inside a fresh scope frame; the frame is popped on every
    /// exit path, including error propagation.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push_scope();
        let result = f(self);
        self.pop_scope();
        result
    }

    /// Push a scope frame. Prefer [`Environment::with_scope`]; this exists
    /// for callers that hold the environment inside a larger context.
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.frames.len() > 2, "popping a base frame");
        if let Some(frame) = self.frames.pop() {
            for claim in &frame.claims {
                self.taken.release(claim);
            }
        }
    }

    // =========================================================================
    // Definition
    // =========================================================================

    /// Register a predefined entry (from the environment config) in the
    /// base frame under its unqualified name.
    pub fn define_predefined(&mut self, name: QName, target: String, kind: EntryKind) {
        let entry = Arc::new(Entry {
            original: name.clone(),
            target,
            kind,
        });
        let scope = entry.scope();
        self.frames[0]
            .table_mut(scope)
            .insert(name, Binding::One(entry));
    }

    /// Claim a free target identifier derived from `candidate`.
    pub fn claim_ident(&mut self, candidate: &str) -> String {
        self.taken.claim(candidate)
    }

    /// Register a top-level entry of the module being compiled.
    ///
    /// Picks a free target identifier derived from the source name (unless
    /// `target` was already claimed by the caller) and enters the entry
    /// under both its qualified and unqualified forms. Returns `None` if
    /// the original name is already defined at the top level of this
    /// module (a duplicate-declaration error for the caller to report).
    pub fn define_toplevel(
        &mut self,
        module: Option<&str>,
        name: &freec_ir::Name,
        kind: EntryKind,
        target: Option<String>,
    ) -> Option<Arc<Entry>> {
        let unqualified = QName::unqualified(name.clone());
        let scope = kind.scope();
        if matches!(
            self.frames[1].table(scope).get(&unqualified),
            Some(Binding::One(_) | Binding::Clash(_))
        ) {
            return None;
        }

        let target = target.unwrap_or_else(|| self.taken.claim(&sanitize(name)));
        let original = match module {
            Some(m) => unqualified.qualify(m),
            None => unqualified.clone(),
        };
        let entry = Arc::new(Entry {
            original: original.clone(),
            target,
            kind,
        });
        let frame = &mut self.frames[1];
        frame
            .table_mut(scope)
            .insert(unqualified, Binding::One(entry.clone()));
        if original.module.is_some() {
            frame
                .table_mut(scope)
                .insert(original, Binding::One(entry.clone()));
        }
        Some(entry)
    }

    /// Register a top-level entry whose target identifier is already fixed
    /// (generated helpers). The caller guarantees freshness.
    pub fn define_generated(&mut self, name: QName, target: String, kind: EntryKind) -> Arc<Entry> {
        let entry = Arc::new(Entry {
            original: name.clone(),
            target,
            kind,
        });
        let scope = entry.scope();
        self.frames[1]
            .table_mut(scope)
            .insert(name, Binding::One(entry.clone()));
        entry
    }

    /// Register a scoped entry (variable or type variable) in the innermost
    /// frame with a fresh, non-colliding target identifier. The identifier
    /// is released again when the frame pops.
    pub fn define_local(&mut self, name: &freec_ir::Name, kind: EntryKind) -> Arc<Entry> {
        let target = self.taken.claim(&sanitize(name));
        let entry = Arc::new(Entry {
            original: QName::unqualified(name.clone()),
            target,
            kind,
        });
        let scope = entry.scope();
        let frame = self
            .frames
            .last_mut()
            .expect("environment always has a frame");
        frame.claims.push(entry.target.clone());
        frame
            .table_mut(scope)
            .insert(entry.original.clone(), Binding::One(entry.clone()));
        entry
    }

    /// Enter every exported entry of an imported module, under its
    /// qualified name and, when unambiguous, its unqualified name.
    pub fn import_interface(&mut self, interface: &ModuleInterface) {
        for (scope, name, entry) in interface.entries() {
            let entry = Arc::new(entry);
            let qualified = name.qualify(&interface.name);
            let frame = &mut self.frames[0];
            frame
                .table_mut(scope)
                .insert(qualified, Binding::One(entry.clone()));

            let unqualified = name.unqualify();
            let table = frame.table_mut(scope);
            match table.get_mut(&unqualified) {
                None => {
                    table.insert(unqualified, Binding::One(entry));
                }
                Some(Binding::One(existing)) => {
                    // Re-importing the same module is harmless.
                    if existing.original != entry.original {
                        let first = existing.original.module.clone().unwrap_or_default();
                        let binding = Binding::Clash(vec![first, interface.name.clone()]);
                        table.insert(unqualified, binding);
                    }
                }
                Some(Binding::Clash(modules)) => {
                    modules.push(interface.name.clone());
                }
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[must_use]
    pub fn lookup(&self, scope: Scope, name: &QName) -> Lookup {
        for frame in self.frames.iter().rev() {
            match frame.table(scope).get(name) {
                Some(Binding::One(entry)) => return Lookup::Found(entry.clone()),
                Some(Binding::Clash(modules)) => return Lookup::Ambiguous(modules.clone()),
                None => {}
            }
        }
        Lookup::Missing
    }

    /// Whether the name resolves to anything at all.
    #[must_use]
    pub fn is_defined(&self, scope: Scope, name: &QName) -> bool {
        !matches!(self.lookup(scope, name), Lookup::Missing)
    }

    /// Whether the name is bound in the innermost frame. Used to reject
    /// duplicate binders in one binding construct.
    #[must_use]
    pub fn bound_in_innermost(&self, scope: Scope, name: &QName) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.table(scope).contains_key(name))
    }

    /// The module's own top-level entries, in registration order (type
    /// scope first), each entry once.
    #[must_use]
    pub fn module_entries(&self) -> Vec<Arc<Entry>> {
        let mut seen: rustc_hash::FxHashSet<String> = rustc_hash::FxHashSet::default();
        let mut out = Vec::new();
        let frame = &self.frames[1];
        for table in [&frame.types, &frame.values] {
            for binding in table.values() {
                if let Binding::One(entry) = binding
                    && seen.insert(entry.target.clone())
                {
                    out.push(entry.clone());
                }
            }
        }
        out
    }

    // =========================================================================
    // Fresh identifiers and the decreasing-argument table
    // =========================================================================

    /// A fresh target identifier with the given prefix, registered as taken.
    pub fn fresh_ident(&mut self, prefix: &str) -> String {
        self.taken.fresh(prefix, &mut self.fresh_counter)
    }

    pub fn set_dec_arg(&mut self, name: QName, index: usize) {
        self.dec_args.insert(name, index);
    }

    /// Forget a decreasing-argument index. The recursion transformation
    /// turns the original function into a non-recursive driver, after which
    /// only its helpers keep one.
    pub fn clear_dec_arg(&mut self, name: &QName) {
        self.dec_args.remove(name);
    }

    #[must_use]
    pub fn dec_arg(&self, name: &QName) -> Option<usize> {
        self.dec_args.get(name).copied()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
#[path = "tests/environment.rs"]
mod tests;
