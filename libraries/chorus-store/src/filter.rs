//! Boolean formula filters
//!
//! The store filters list requests with a small formula language over field
//! values and record ids. This module builds those formulas; filtering a set
//! of ids is expressed as a disjunction of per-id equality predicates,
//! batched to stay under the request-size limit.

/// Recommended number of ids per disjunction batch. Around 90 record ids
/// keeps the request URL safely under the store's 8 KB limit.
pub const ID_BATCH_SIZE: usize = 90;

/// A filter formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `{field} = "value"`
    FieldEq { field: String, value: String },

    /// `RECORD_ID() = 'id'`
    RecordId(String),

    /// `OR(a, b, ...)`
    Any(Vec<Filter>),

    /// `AND(a, b, ...)`
    All(Vec<Filter>),
}

impl Filter {
    /// Equality on a named field
    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Equality on the record id
    pub fn record_id(id: impl Into<String>) -> Self {
        Filter::RecordId(id.into())
    }

    /// Disjunction of record-id predicates for one batch of ids
    pub fn any_record_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Any(ids.into_iter().map(Filter::record_id).collect())
    }

    /// Conjunction of filters
    pub fn all(filters: Vec<Filter>) -> Self {
        Filter::All(filters)
    }

    /// Render the formula string sent to the store
    pub fn to_formula(&self) -> String {
        match self {
            Filter::FieldEq { field, value } => {
                format!("{{{field}}} = \"{}\"", escape_quotes(value))
            }
            Filter::RecordId(id) => format!("RECORD_ID() = '{id}'"),
            Filter::Any(filters) => combine("OR", filters),
            Filter::All(filters) => combine("AND", filters),
        }
    }
}

fn combine(op: &str, filters: &[Filter]) -> String {
    match filters {
        [] => "TRUE()".to_string(),
        [single] => single.to_formula(),
        _ => {
            let parts: Vec<String> = filters.iter().map(Filter::to_formula).collect();
            format!("{op}({})", parts.join(","))
        }
    }
}

/// Escape embedded double quotes by doubling them, per the formula grammar
fn escape_quotes(value: &str) -> String {
    value.replace('"', "\"\"")
}
