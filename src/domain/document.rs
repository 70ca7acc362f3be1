// Structured fields of one per-function documentation record.
// Every text field is already normalised; absent XML nodes become empty strings.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDoc {
    pub name: String,
    pub purpose: String,
    pub summary: String,
    pub arguments: Vec<Argument>,
    pub return_value: Option<ReturnValue>,
    pub remarks: String,
    pub steps: Vec<String>,
    pub queries: Vec<Query>,
}

impl FunctionDoc {
    /// Short description used when other documents link here: purpose, else summary.
    pub fn excerpt(&self) -> Option<&str> {
        [self.purpose.as_str(), self.summary.as_str()]
            .into_iter()
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnValue {
    pub ty: String,
    pub description: String,
}

impl ReturnValue {
    pub fn is_empty(&self) -> bool {
        self.ty.is_empty() && self.description.is_empty()
    }
}

/// A database access described in pseudo-SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub description: String,
    pub pseudo_sql: String,
}
