/// A field list: `*` or an explicit list of column names.
///
/// Used for SELECT targets, INSERT column lists and RETURNING. An empty
/// named list selects nothing, which is how a statement without RETURNING
/// is represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    Wildcard,
    Named(Vec<String>),
}

impl Default for Fields {
    fn default() -> Self {
        Fields::Named(Vec::new())
    }
}

impl Fields {
    /// Column names referenced explicitly. Empty for the wildcard.
    pub fn names(&self) -> &[String] {
        match self {
            Fields::Wildcard => &[],
            Fields::Named(names) => names,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fields::Named(names) if names.is_empty())
    }
}
