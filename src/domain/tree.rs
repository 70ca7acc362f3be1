//! Caller/callee outline rendering.
//!
//! Walks the call graph depth-first from each start id and produces a flat list
//! of [`OutlineEntry`] values (depth, label, annotation). The start ids are never
//! emitted themselves. Three rules bound the walk:
//!
//! - a node already on the current branch's path is emitted as a `cycle` leaf;
//! - a node at `max_depth` edges from its root is not expanded further;
//! - at most `max_children` neighbours are expanded per node, the rest are
//!   summarised in one trailing entry.
//!
//! Cycle detection is path-local: the same function may appear several times
//! in independent branches.

use std::collections::{HashMap, HashSet};

use crate::domain::index::{Direction, FunctionIndex};
use crate::domain::link::LabelResolver;

/// Limits applied to one outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLimits {
    /// Maximum number of edges between a root and an emitted node (at least 1).
    pub max_depth: usize,
    /// Maximum number of expanded neighbours per node.
    pub max_children: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_children: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// Back-edge to a node already on the current path.
    Cycle,
    /// Node sits at the depth limit and still has neighbours.
    DepthTruncated,
    /// Summary for siblings beyond `max_children`.
    Omitted(usize),
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Annotation::Cycle => write!(f, "cycle"),
            Annotation::DepthTruncated => write!(f, "truncated: depth"),
            Annotation::Omitted(count) => write!(f, "{} further entries omitted", count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub depth: usize,
    /// Function id; `None` for omission summaries.
    pub id: Option<String>,
    /// Empty for omission summaries.
    pub label: String,
    pub annotation: Option<Annotation>,
}

impl OutlineEntry {
    pub fn is_summary(&self) -> bool {
        self.id.is_none()
    }
}

pub struct TreeRenderer<'a> {
    index: &'a FunctionIndex,
    labels: &'a dyn LabelResolver,
    limits: TreeLimits,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(index: &'a FunctionIndex, labels: &'a dyn LabelResolver, limits: TreeLimits) -> Self {
        Self {
            index,
            labels,
            limits,
        }
    }

    /// Render the outline reachable from `start` in `direction`.
    ///
    /// Roots are walked in id order. Every walk starts with the whole start set
    /// on its path, so no start id is ever emitted as an expanded node.
    pub fn render<S: AsRef<str>>(&self, start: &[S], direction: Direction) -> Vec<OutlineEntry> {
        let mut roots: Vec<&str> = start.iter().map(AsRef::as_ref).collect();
        roots.sort_unstable();
        roots.dedup();

        let mut walk = Walk {
            index: self.index,
            labels: self.labels,
            limits: TreeLimits {
                max_depth: self.limits.max_depth.max(1),
                ..self.limits
            },
            direction,
            path: PathStack::default(),
            label_cache: HashMap::new(),
            out: Vec::new(),
        };

        // Start ids are never expanded as children: reaching one is a cycle.
        for &root in &roots {
            walk.path.push(root);
        }
        for root in roots {
            walk.expand(root, 0);
        }
        walk.out
    }
}

/// Ids currently being expanded on one branch.
#[derive(Default)]
struct PathStack<'a> {
    order: Vec<&'a str>,
    members: HashSet<&'a str>,
}

impl<'a> PathStack<'a> {
    fn push(&mut self, id: &'a str) {
        self.order.push(id);
        self.members.insert(id);
    }

    fn pop(&mut self) {
        if let Some(id) = self.order.pop() {
            self.members.remove(id);
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }
}

struct Walk<'a> {
    index: &'a FunctionIndex,
    labels: &'a dyn LabelResolver,
    limits: TreeLimits,
    direction: Direction,
    path: PathStack<'a>,
    label_cache: HashMap<&'a str, String>,
    out: Vec<OutlineEntry>,
}

impl<'a> Walk<'a> {
    fn expand(&mut self, parent: &'a str, depth: usize) {
        let index = self.index;
        let neighbours = index.edges(parent, self.direction);

        for child in neighbours.iter().take(self.limits.max_children) {
            let child = child.as_str();

            if self.path.contains(child) {
                self.emit(depth, child, Some(Annotation::Cycle));
                continue;
            }

            if depth + 1 >= self.limits.max_depth {
                let has_more = !index.edges(child, self.direction).is_empty();
                self.emit(depth, child, has_more.then_some(Annotation::DepthTruncated));
                continue;
            }

            self.emit(depth, child, None);
            self.path.push(child);
            self.expand(child, depth + 1);
            self.path.pop();
        }

        if neighbours.len() > self.limits.max_children {
            self.out.push(OutlineEntry {
                depth,
                id: None,
                label: String::new(),
                annotation: Some(Annotation::Omitted(
                    neighbours.len() - self.limits.max_children,
                )),
            });
        }
    }

    fn emit(&mut self, depth: usize, id: &'a str, annotation: Option<Annotation>) {
        let labels = self.labels;
        let label = self
            .label_cache
            .entry(id)
            .or_insert_with(|| labels.resolve(id))
            .clone();
        self.out.push(OutlineEntry {
            depth,
            id: Some(id.to_string()),
            label,
            annotation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::link::IdLabels;
    use crate::domain::record::FunctionRecord;

    fn graph(edges: &[(&str, &[&str])]) -> FunctionIndex {
        FunctionIndex::from_records(
            edges
                .iter()
                .map(|(id, calls)| FunctionRecord::new(*id).with_calls(calls.iter().copied())),
        )
    }

    fn limits(max_depth: usize, max_children: usize) -> TreeLimits {
        TreeLimits {
            max_depth,
            max_children,
        }
    }

    fn flat(entries: &[OutlineEntry]) -> Vec<(usize, String, Option<Annotation>)> {
        entries
            .iter()
            .map(|e| (e.depth, e.label.clone(), e.annotation))
            .collect()
    }

    #[test]
    fn test_mutual_cycle() {
        let index = graph(&[("A", &["B"]), ("B", &["A"])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 10)).render(&["A"], Direction::Callees);
        assert_eq!(
            flat(&out),
            vec![
                (0, "B".to_string(), None),
                (1, "A".to_string(), Some(Annotation::Cycle)),
            ]
        );
    }

    #[test]
    fn test_self_loop_is_cycle_at_depth_zero() {
        let index = graph(&[("f", &["f"])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 10)).render(&["f"], Direction::Callees);
        assert_eq!(flat(&out), vec![(0, "f".to_string(), Some(Annotation::Cycle))]);
    }

    #[test]
    fn test_leaf_function_renders_nothing() {
        let index = graph(&[("C", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 10)).render(&["C"], Direction::Callees);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fan_out_cutoff() {
        let index = graph(&[("D", &["G", "E", "F"]), ("E", &[]), ("F", &[]), ("G", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 2)).render(&["D"], Direction::Callees);
        assert_eq!(
            flat(&out),
            vec![
                (0, "E".to_string(), None),
                (0, "F".to_string(), None),
                (0, String::new(), Some(Annotation::Omitted(1))),
            ]
        );
        assert!(out[2].is_summary());
    }

    #[test]
    fn test_depth_cutoff_marks_truncation() {
        let index = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["d"]), ("d", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(2, 10)).render(&["a"], Direction::Callees);
        assert_eq!(
            flat(&out),
            vec![
                (0, "b".to_string(), None),
                (1, "c".to_string(), Some(Annotation::DepthTruncated)),
            ]
        );
    }

    #[test]
    fn test_depth_limit_on_leaf_has_no_annotation() {
        let index = graph(&[("a", &["b"]), ("b", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(1, 10)).render(&["a"], Direction::Callees);
        assert_eq!(flat(&out), vec![(0, "b".to_string(), None)]);
    }

    #[test]
    fn test_cycle_wins_over_depth_cutoff() {
        let index = graph(&[("a", &["b"]), ("b", &["a"])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(2, 10)).render(&["a"], Direction::Callees);
        assert_eq!(out[1].annotation, Some(Annotation::Cycle));
        assert_eq!(out[1].depth, 1);
    }

    #[test]
    fn test_shared_node_appears_in_each_branch() {
        let index = graph(&[("r", &["x", "y"]), ("x", &["z"]), ("y", &["z"]), ("z", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 10)).render(&["r"], Direction::Callees);
        let z_count = out.iter().filter(|e| e.id.as_deref() == Some("z")).count();
        assert_eq!(z_count, 2);
        assert!(out.iter().all(|e| e.annotation.is_none()));
    }

    #[test]
    fn test_other_start_id_is_cycle_leaf() {
        let index = graph(&[("x1", &["x2", "y"]), ("x2", &["z"]), ("y", &[]), ("z", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(5, 10)).render(&["x1", "x2"], Direction::Callees);
        assert_eq!(
            flat(&out),
            vec![
                (0, "x2".to_string(), Some(Annotation::Cycle)),
                (0, "y".to_string(), None),
                (0, "z".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_callers_direction() {
        let index = graph(&[("main", &["work"]), ("cli", &["work"]), ("work", &[])]);
        let out = TreeRenderer::new(&index, &IdLabels, limits(3, 10)).render(&["work"], Direction::Callers);
        let ids: Vec<_> = out.iter().filter_map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["cli", "main"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let index = graph(&[
            ("a", &["d", "c", "b"]),
            ("b", &["a", "c"]),
            ("c", &["d"]),
            ("d", &["b"]),
        ]);
        let renderer = TreeRenderer::new(&index, &IdLabels, limits(4, 2));
        let first = renderer.render(&["a"], Direction::Callees);
        let second = renderer.render(&["a"], Direction::Callees);
        assert_eq!(first, second);
    }
}
