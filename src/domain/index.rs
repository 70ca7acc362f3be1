use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::domain::record::FunctionRecord;
use crate::error::{ConvertError, Result};

static NO_IDS: BTreeSet<String> = BTreeSet::new();

/// Traversal direction over the call graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow `calls` edges.
    Callees,
    /// Follow the transposed edges.
    Callers,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Callees => "callees",
            Direction::Callers => "callers",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Immutable call-graph index built from one analysis result.
///
/// `callers` is always the exact transpose of `calls`: both tables are filled in
/// the same pass and neither is mutated afterwards.
#[derive(Debug, Default)]
pub struct FunctionIndex {
    records: HashMap<String, FunctionRecord>,
    names: HashMap<String, BTreeSet<String>>,
    calls: HashMap<String, BTreeSet<String>>,
    callers: HashMap<String, BTreeSet<String>>,
}

impl FunctionIndex {
    /// Build the index from the raw bytes of an analysis file.
    /// Fails only when the data is not a JSON array.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ConvertError::MalformedInput(e.to_string()))?;
        match value {
            Value::Array(entries) => Ok(Self::from_entries(entries)),
            other => Err(ConvertError::MalformedInput(format!(
                "expected a JSON array of records, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build the index from already-decoded entries. Garbage entries are skipped.
    pub fn from_entries(entries: Vec<Value>) -> Self {
        let total = entries.len();
        let records: Vec<FunctionRecord> = entries
            .into_iter()
            .filter_map(FunctionRecord::from_entry)
            .collect();
        log::debug!(
            "Skipped {} non-function or id-less entries out of {}",
            total - records.len(),
            total
        );
        Self::from_records(records)
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = FunctionRecord>,
    {
        let mut index = FunctionIndex::default();

        // Pass 1: records and names. Last occurrence of an id wins.
        for record in records {
            if record.id.is_empty() {
                continue;
            }
            if let Some(previous) = index.records.remove(&record.id) {
                index.forget_name(&previous);
            }
            if let Some(name) = record.name.as_ref().filter(|n| !n.is_empty()) {
                index
                    .names
                    .entry(name.clone())
                    .or_default()
                    .insert(record.id.clone());
            }
            index.records.insert(record.id.clone(), record);
        }

        // Pass 2: edges restricted to known ids, plus their transpose.
        let mut edge_count = 0;
        for record in index.records.values() {
            let known: BTreeSet<String> = record
                .calls
                .iter()
                .filter(|callee| index.records.contains_key(callee.as_str()))
                .cloned()
                .collect();
            if known.is_empty() {
                continue;
            }
            for callee in &known {
                index
                    .callers
                    .entry(callee.clone())
                    .or_default()
                    .insert(record.id.clone());
            }
            edge_count += known.len();
            index.calls.insert(record.id.clone(), known);
        }

        log::info!(
            "Indexed {} functions with {} call edges",
            index.records.len(),
            edge_count
        );
        index
    }

    fn forget_name(&mut self, previous: &FunctionRecord) {
        let Some(name) = previous.name.as_ref() else {
            return;
        };
        if let Some(ids) = self.names.get_mut(name) {
            ids.remove(&previous.id);
            if ids.is_empty() {
                self.names.remove(name);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&FunctionRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All ids sharing `name`, in id order.
    pub fn ids_named(&self, name: &str) -> &BTreeSet<String> {
        self.names.get(name).unwrap_or(&NO_IDS)
    }

    /// Known callees of `id`, in id order.
    pub fn callees(&self, id: &str) -> &BTreeSet<String> {
        self.calls.get(id).unwrap_or(&NO_IDS)
    }

    /// Known callers of `id`, in id order.
    pub fn callers(&self, id: &str) -> &BTreeSet<String> {
        self.callers.get(id).unwrap_or(&NO_IDS)
    }

    pub fn edges(&self, id: &str, direction: Direction) -> &BTreeSet<String> {
        match direction {
            Direction::Callees => self.callees(id),
            Direction::Callers => self.callers(id),
        }
    }

    /// Whether `id` has any edge in either direction (a self-loop counts).
    pub fn has_edges(&self, id: &str) -> bool {
        !self.callees(id).is_empty() || !self.callers(id).is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
