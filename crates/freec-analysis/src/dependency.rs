//! Declaration dependency graphs and strongly connected components.
//!
//! Vertices are the declarations of one module; an edge points from a
//! declaration to each other declaration whose name it references.
//! Components come out in reverse-topological order over the condensation,
//! so every component precedes the components that depend on it. Vertex
//! order inside a component and DFS root order both follow source order,
//! which makes the output deterministic.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use freec_common::{Diagnostic, Reporter, Result};
use freec_ir::{FuncDecl, Name, QName, TypeDecl};

/// One strongly connected component of the dependency graph.
///
/// `NonRecursive` is a singleton without a self-edge; everything else is
/// `Recursive`, including a singleton that calls itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Component {
    NonRecursive(usize),
    Recursive(Vec<usize>),
}

impl Component {
    /// Member declaration indices in source order.
    #[must_use]
    pub fn members(&self) -> Vec<usize> {
        match self {
            Component::NonRecursive(index) => vec![*index],
            Component::Recursive(indices) => indices.clone(),
        }
    }

    #[must_use]
    pub fn is_recursive(&self) -> bool {
        matches!(self, Component::Recursive(_))
    }
}

/// Dependency components of the type declarations, dependencies first.
///
/// A recursive component consisting of type synonyms only (or containing a
/// synonym-to-synonym cycle) cannot be expanded and is a fatal error.
pub fn type_components(
    decls: &[TypeDecl],
    module: Option<&str>,
    file: &str,
    reporter: &mut Reporter,
) -> Result<Vec<Component>> {
    let names: IndexMap<Name, usize> = decls
        .iter()
        .enumerate()
        .map(|(index, decl)| (decl.ident().name.clone(), index))
        .collect();

    let edges: Vec<Vec<usize>> = decls
        .iter()
        .map(|decl| {
            let mut cons = Vec::new();
            match decl {
                TypeDecl::Data(data) => {
                    for con in &data.cons {
                        for field in &con.fields {
                            field.collect_cons(&mut cons);
                        }
                    }
                }
                TypeDecl::Syn(syn) => syn.body.collect_cons(&mut cons),
            }
            resolve_edges(&cons, &names, module)
        })
        .collect();

    let components = condense(decls.len(), &edges);
    check_synonym_cycles(decls, &edges, &components, file, reporter)?;
    Ok(components)
}

/// Dependency components of the function declarations, dependencies first.
#[must_use]
pub fn func_components(decls: &[FuncDecl], module: Option<&str>) -> Vec<Component> {
    let names: IndexMap<Name, usize> = decls
        .iter()
        .enumerate()
        .map(|(index, decl)| (decl.ident.name.clone(), index))
        .collect();

    let edges: Vec<Vec<usize>> = decls
        .iter()
        .map(|decl| {
            let mut refs = Vec::new();
            decl.body.collect_refs(&mut refs);
            resolve_edges(&refs, &names, module)
        })
        .collect();

    condense(decls.len(), &edges)
}

/// Map referenced names to declaration indices. A reference qualified with
/// the current module counts the same as its unqualified form.
fn resolve_edges(
    refs: &[&QName],
    names: &IndexMap<Name, usize>,
    module: Option<&str>,
) -> Vec<usize> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    for reference in refs {
        let local = match &reference.module {
            None => true,
            Some(m) => Some(m.as_str()) == module,
        };
        if local
            && let Some(&index) = names.get(&reference.name)
            && seen.insert(index)
        {
            out.push(index);
        }
    }
    out
}

/// A recursive component may mix data types and synonyms (the synonyms are
/// expanded into the inductive bodies), but a cycle running through
/// synonyms alone never terminates under expansion.
fn check_synonym_cycles(
    decls: &[TypeDecl],
    edges: &[Vec<usize>],
    components: &[Component],
    file: &str,
    reporter: &mut Reporter,
) -> Result<()> {
    for component in components {
        let Component::Recursive(members) = component else {
            continue;
        };
        let syn_members: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&index| matches!(decls[index], TypeDecl::Syn(_)))
            .collect();
        if syn_members.is_empty() {
            continue;
        }

        // Restrict the graph to this component's synonyms and look for a
        // cycle in the restriction.
        let syn_set: FxHashSet<usize> = syn_members.iter().copied().collect();
        let sub_edges: Vec<Vec<usize>> = syn_members
            .iter()
            .map(|&index| {
                edges[index]
                    .iter()
                    .copied()
                    .filter(|target| syn_set.contains(target))
                    .map(|target| {
                        syn_members
                            .iter()
                            .position(|&m| m == target)
                            .expect("target is a member")
                    })
                    .collect()
            })
            .collect();
        let has_cycle = condense(syn_members.len(), &sub_edges)
            .iter()
            .any(Component::is_recursive);
        if has_cycle {
            let first = &decls[syn_members[0]];
            return Err(reporter.report_fatal(Diagnostic::error(
                file,
                first.ident().span,
                format!(
                    "type synonym '{}' is mutually recursive and cannot be expanded",
                    first.ident().name
                ),
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Iterative Tarjan
// =============================================================================

/// One DFS frame of the explicit-stack Tarjan traversal.
struct Visit {
    vertex: usize,
    next_edge: usize,
}

/// Strongly connected components in reverse-topological order.
///
/// Plain Tarjan, with the recursion replaced by an explicit stack so that
/// adversarially deep dependency chains cannot overflow the call stack.
fn condense(vertex_count: usize, edges: &[Vec<usize>]) -> Vec<Component> {
    const UNVISITED: usize = usize::MAX;

    let mut index = vec![UNVISITED; vertex_count];
    let mut low = vec![0usize; vertex_count];
    let mut on_stack = vec![false; vertex_count];
    let mut stack: Vec<usize> = Vec::new();
    let mut visits: Vec<Visit> = Vec::new();
    let mut counter = 0usize;
    let mut components = Vec::new();

    for root in 0..vertex_count {
        if index[root] != UNVISITED {
            continue;
        }
        visits.push(Visit {
            vertex: root,
            next_edge: 0,
        });
        index[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(visit) = visits.last_mut() {
            let v = visit.vertex;
            if visit.next_edge < edges[v].len() {
                let w = edges[v][visit.next_edge];
                visit.next_edge += 1;
                if index[w] == UNVISITED {
                    index[w] = counter;
                    low[w] = counter;
                    counter += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    visits.push(Visit {
                        vertex: w,
                        next_edge: 0,
                    });
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            // All edges of `v` done: pop the frame, maybe emit a component.
            visits.pop();
            if let Some(parent) = visits.last() {
                let p = parent.vertex;
                low[p] = low[p].min(low[v]);
            }
            if low[v] == index[v] {
                let mut members = Vec::new();
                loop {
                    let w = stack.pop().expect("tarjan stack underflow");
                    on_stack[w] = false;
                    members.push(w);
                    if w == v {
                        break;
                    }
                }
                members.sort_unstable();
                let component = if members.len() == 1 && !edges[v].contains(&v) {
                    Component::NonRecursive(v)
                } else {
                    Component::Recursive(members)
                };
                components.push(component);
            }
        }
    }

    components
}

#[cfg(test)]
#[path = "tests/dependency.rs"]
mod tests;
