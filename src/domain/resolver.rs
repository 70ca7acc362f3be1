//! Direct neighbourhood lookups over a [`FunctionIndex`].

use std::collections::BTreeSet;

use crate::domain::index::{Direction, FunctionIndex};

pub struct DependencyResolver<'a> {
    index: &'a FunctionIndex,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: &'a FunctionIndex) -> Self {
        Self { index }
    }

    /// Direct callers or callees of every id in `start`, never listing a member of `start`.
    pub fn neighbors<S: AsRef<str>>(&self, start: &[S], direction: Direction) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for id in start {
            result.extend(self.index.edges(id.as_ref(), direction).iter().cloned());
        }
        for id in start {
            result.remove(id.as_ref());
        }
        result
    }

    /// Same as [`neighbors`](Self::neighbors) starting from every id named `name`.
    pub fn neighbors_by_name(&self, name: &str, direction: Direction) -> BTreeSet<String> {
        let ids: Vec<&str> = self.index.ids_named(name).iter().map(String::as_str).collect();
        self.neighbors(&ids, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FunctionRecord;

    fn sample_index() -> FunctionIndex {
        FunctionIndex::from_records(vec![
            FunctionRecord::new("a").with_name("run").with_calls(["b", "c", "a"]),
            FunctionRecord::new("b").with_name("run").with_calls(["c", "d"]),
            FunctionRecord::new("c").with_calls(["a"]),
            FunctionRecord::new("d"),
        ])
    }

    #[test]
    fn test_neighbors_excludes_start_set() {
        let index = sample_index();
        let resolver = DependencyResolver::new(&index);
        let callees = resolver.neighbors(&["a"], Direction::Callees);
        assert_eq!(callees, BTreeSet::from(["b".to_string(), "c".to_string()]));

        let callers = resolver.neighbors(&["a"], Direction::Callers);
        assert_eq!(callers, BTreeSet::from(["c".to_string()]));
    }

    #[test]
    fn test_neighbors_empty_cases() {
        let index = sample_index();
        let resolver = DependencyResolver::new(&index);
        let none: [&str; 0] = [];
        assert!(resolver.neighbors(&none, Direction::Callees).is_empty());
        assert!(resolver.neighbors(&["d"], Direction::Callees).is_empty());
        assert!(resolver.neighbors(&["unknown"], Direction::Callers).is_empty());
    }

    #[test]
    fn test_neighbors_by_name_unions_and_excludes() {
        let index = sample_index();
        let resolver = DependencyResolver::new(&index);
        // "run" covers a and b; b is a callee of a but belongs to the start set.
        let callees = resolver.neighbors_by_name("run", Direction::Callees);
        assert_eq!(callees, BTreeSet::from(["c".to_string(), "d".to_string()]));
        assert!(resolver.neighbors_by_name("missing", Direction::Callees).is_empty());
    }
}
