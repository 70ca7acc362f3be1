pub mod document;
pub mod index;
pub mod link;
pub mod record;
pub mod resolver;
pub mod tree;

pub use document::{Argument, FunctionDoc, Query, ReturnValue};
pub use index::{Direction, FunctionIndex};
pub use link::{DocLookup, IdLabels, LabelResolver, LinkResolver};
pub use record::{FunctionRecord, SourceLocation};
pub use resolver::DependencyResolver;
pub use tree::{Annotation, OutlineEntry, TreeLimits, TreeRenderer};
