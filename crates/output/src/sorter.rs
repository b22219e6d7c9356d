//! Cycle-tolerant ordering of packages by their dependencies
//!
//! An edge `A -> B` means A references a type owned by B, so B must be
//! included before A. Resolvable packages are ordered with Kahn's algorithm,
//! always taking the ready package that came first in the input. Packages
//! left over once nothing is ready anymore are split into strongly connected
//! components; components are appended dependencies-first and every member
//! of a real cycle reports one edge to another member of its component.

use std::collections::{BTreeSet, HashMap};
use tracing::warn;
use unisdk_core::EnginePackage;

/// Anything that has a name and names its dependencies
pub trait PackageNode {
    fn name(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

impl PackageNode for EnginePackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Linear order plus the cycle edges that had to be ignored to get it
#[derive(Debug)]
pub struct SortResult<'a, T> {
    pub sorted: Vec<&'a T>,
    pub cycles: Vec<(&'a T, &'a T)>,
}

impl<'a, T: PackageNode> SortResult<'a, T> {
    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Names in sorted order
    pub fn sorted_names(&self) -> Vec<&'a str> {
        self.sorted.iter().map(|p| p.name()).collect()
    }

    /// Name pairs of the cycle edges
    pub fn cycle_names(&self) -> Vec<(&'a str, &'a str)> {
        self.cycles.iter().map(|(a, b)| (a.name(), b.name())).collect()
    }
}

/// Adjacency lists by input index, self edges and unknown names dropped
fn build_edges<T: PackageNode>(packages: &[T]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(packages.len());
    for (i, pack) in packages.iter().enumerate() {
        index.entry(pack.name()).or_insert(i);
    }

    packages
        .iter()
        .enumerate()
        .map(|(i, pack)| {
            let mut deps = Vec::new();
            for dep in pack.dependencies() {
                match index.get(dep.as_str()) {
                    Some(&j) if j != i && !deps.contains(&j) => deps.push(j),
                    Some(_) => {}
                    None => warn!("{}: dependency `{}` is not a known package", pack.name(), dep),
                }
            }
            deps
        })
        .collect()
}

/// Tarjan's algorithm restricted to `roots`, without recursion.
///
/// Components come out in completion order, which puts every component
/// after the components it depends on. Members are sorted by input index.
fn strongly_connected(roots: &[usize], edges: &[Vec<usize>], in_scope: &[bool]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = edges.len();
    let mut order = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut counter = 0;
    let mut components = Vec::new();

    for &root in roots {
        if order[root] != UNVISITED {
            continue;
        }

        order[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(&(v, next)) = call.last() {
            if let Some(&w) = edges[v].get(next) {
                let top = call.len() - 1;
                call[top].1 += 1;
                if !in_scope[w] {
                    continue;
                }
                if order[w] == UNVISITED {
                    order[w] = counter;
                    low[w] = counter;
                    counter += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(order[w]);
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == order[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}

/// Order `packages` so that dependencies come first.
///
/// Every package appears exactly once in `sorted`. For an acyclic graph the
/// order is topological and `cycles` is empty. Output only depends on the
/// input order, names and dependency lists.
pub fn sort<T: PackageNode>(packages: &[T]) -> SortResult<'_, T> {
    let n = packages.len();
    let edges = build_edges(packages);

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, deps) in edges.iter().enumerate() {
        for &j in deps {
            dependents[j].push(i);
        }
    }

    let mut outstanding: Vec<usize> = edges.iter().map(Vec::len).collect();
    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| outstanding[i] == 0).collect();
    let mut resolved = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while let Some(i) = ready.pop_first() {
        resolved[i] = true;
        order.push(i);
        for &d in &dependents[i] {
            outstanding[d] -= 1;
            if outstanding[d] == 0 {
                ready.insert(d);
            }
        }
    }

    let mut cycles = Vec::new();
    if order.len() < n {
        let leftover: Vec<usize> = (0..n).filter(|&i| !resolved[i]).collect();
        let in_scope: Vec<bool> = resolved.iter().map(|r| !r).collect();
        let components = strongly_connected(&leftover, &edges, &in_scope);

        let mut component_of = vec![usize::MAX; n];
        for (c, members) in components.iter().enumerate() {
            for &m in members {
                component_of[m] = c;
            }
        }

        for members in &components {
            if members.len() > 1 {
                for &m in members {
                    let partner = edges[m]
                        .iter()
                        .copied()
                        .find(|&d| component_of[d] == component_of[m]);
                    if let Some(d) = partner {
                        cycles.push((&packages[m], &packages[d]));
                    }
                }
            }
            order.extend(members.iter().copied());
        }

        warn!(
            "{} package(s) could not be ordered, {} cycle edge(s) found",
            leftover.len(),
            cycles.len()
        );
    }

    SortResult {
        sorted: order.into_iter().map(|i| &packages[i]).collect(),
        cycles,
    }
}
