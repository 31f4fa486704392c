//! Column types shared by lookups and pipelines.
//!
//! A [`Column`] is the boundary representation of one per-jet quantity. Its
//! variant is decided once, when the caller builds the column, so evaluation
//! code dispatches on a closed set of tags instead of inspecting values.

use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// Recognized array backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayBackend {
    /// Flat, materialized values (one per jet).
    Eager,
    /// Per-event lists of jets with explicit offsets.
    Jagged,
    /// Deferred node, materialized on [`LazyArray::compute`].
    Lazy,
}

impl fmt::Display for ArrayBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eager => "eager",
            Self::Jagged => "jagged",
            Self::Lazy => "lazy",
        })
    }
}

/// Flat array of per-jet values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EagerArray {
    /// One value per jet.
    pub values: Vec<f64>,
}

impl EagerArray {
    /// Wrap a vector of values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of jets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no jets are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f64>> for EagerArray {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Jagged (per-event) column.
#[derive(Debug, Clone, PartialEq)]
pub struct JaggedArray {
    /// Flat array of all values across all events.
    flat: Vec<f64>,
    /// Event boundaries: `offsets.len() == n_events + 1`.
    offsets: Vec<usize>,
}

impl JaggedArray {
    /// Build a jagged array, checking that `offsets` start at zero, never
    /// decrease and end at `flat.len()`.
    pub fn new(flat: Vec<f64>, offsets: Vec<usize>) -> Result<Self> {
        if offsets.first() != Some(&0) {
            return Err(Error::Validation("jagged offsets must start at 0".into()));
        }
        if offsets.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::Validation("jagged offsets must be non-decreasing".into()));
        }
        let last = offsets[offsets.len() - 1];
        if last != flat.len() {
            return Err(Error::Validation(format!(
                "jagged offsets end at {last} but {} values are stored",
                flat.len()
            )));
        }
        Ok(Self { flat, offsets })
    }

    /// Build from per-event lists.
    pub fn from_lists<I, L>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[f64]>,
    {
        let mut flat = Vec::new();
        let mut offsets = vec![0];
        for list in lists {
            flat.extend_from_slice(list.as_ref());
            offsets.push(flat.len());
        }
        Self { flat, offsets }
    }

    /// Replace the values while keeping the event structure.
    pub fn with_flat(&self, flat: Vec<f64>) -> Result<Self> {
        Self::new(flat, self.offsets.clone())
    }

    /// Flat values of all jets.
    pub fn flat(&self) -> &[f64] {
        &self.flat
    }

    /// Event boundaries.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Jets of event `row`. Returns `None` for out-of-range rows.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let start = *self.offsets.get(row)?;
        let end = *self.offsets.get(row + 1)?;
        Some(&self.flat[start..end])
    }

    /// Number of events.
    pub fn n_entries(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

type Thunk = Arc<dyn Fn() -> Result<Column> + Send + Sync>;

/// Deferred column.
///
/// Nothing is computed until [`LazyArray::compute`] is called. The label is
/// carried for introspection of the task graph only.
#[derive(Clone)]
pub struct LazyArray {
    label: Option<String>,
    thunk: Thunk,
}

impl LazyArray {
    /// Create a deferred node from a thunk.
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Column> + Send + Sync + 'static,
    {
        Self { label: None, thunk: Arc::new(thunk) }
    }

    /// Wrap an already materialized column.
    pub fn from_column(column: Column) -> Self {
        Self::new(move || Ok(column.clone()))
    }

    /// Attach a human-readable label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label of this node, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Materialize the node. Nested lazy results are computed in turn.
    ///
    /// A failing thunk surfaces as [`Error::Computation`] naming the node.
    pub fn compute(&self) -> Result<Column> {
        let mut out = self.run()?;
        while let Column::Lazy(inner) = out {
            out = inner.run()?;
        }
        Ok(out)
    }

    fn run(&self) -> Result<Column> {
        (self.thunk)().map_err(|e| match e {
            Error::Computation(_) => e,
            other => Error::Computation(format!(
                "{}: {other}",
                self.label.as_deref().unwrap_or("unlabeled node")
            )),
        })
    }
}

impl fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray").field("label", &self.label).finish_non_exhaustive()
    }
}

/// One per-jet quantity as handed to a lookup.
#[derive(Debug, Clone)]
pub enum Column {
    /// Flat materialized array.
    Eager(EagerArray),
    /// Per-event jagged array.
    Jagged(JaggedArray),
    /// Deferred node.
    Lazy(LazyArray),
    /// Plain host list. Not an array backend; lookups reject it.
    List(Vec<f64>),
}

impl Column {
    /// Backend of this column, `None` for plain lists.
    pub fn backend(&self) -> Option<ArrayBackend> {
        match self {
            Self::Eager(_) => Some(ArrayBackend::Eager),
            Self::Jagged(_) => Some(ArrayBackend::Jagged),
            Self::Lazy(_) => Some(ArrayBackend::Lazy),
            Self::List(_) => None,
        }
    }

    /// Short name of the representation, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Eager(_) => "eager",
            Self::Jagged(_) => "jagged",
            Self::Lazy(_) => "lazy",
            Self::List(_) => "list",
        }
    }

    /// Flat values of a materialized column.
    pub fn flat_values(&self) -> Option<&[f64]> {
        match self {
            Self::Eager(a) => Some(&a.values),
            Self::Jagged(j) => Some(j.flat()),
            Self::Lazy(_) | Self::List(_) => None,
        }
    }

    /// Borrow as an eager array.
    pub fn as_eager(&self) -> Option<&EagerArray> {
        match self {
            Self::Eager(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow as a jagged array.
    pub fn as_jagged(&self) -> Option<&JaggedArray> {
        match self {
            Self::Jagged(j) => Some(j),
            _ => None,
        }
    }

    /// Borrow as a lazy node.
    pub fn as_lazy(&self) -> Option<&LazyArray> {
        match self {
            Self::Lazy(l) => Some(l),
            _ => None,
        }
    }

    /// Materialize: lazy nodes are computed, everything else is cloned.
    pub fn materialize(&self) -> Result<Column> {
        match self {
            Self::Lazy(l) => l.compute(),
            other => Ok(other.clone()),
        }
    }
}

impl From<EagerArray> for Column {
    fn from(a: EagerArray) -> Self {
        Self::Eager(a)
    }
}

impl From<JaggedArray> for Column {
    fn from(j: JaggedArray) -> Self {
        Self::Jagged(j)
    }
}

impl From<LazyArray> for Column {
    fn from(l: LazyArray) -> Self {
        Self::Lazy(l)
    }
}
