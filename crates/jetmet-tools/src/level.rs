//! Level catalog and canonical evaluation order.

use std::sync::LazyLock;

use jetmet_core::{Error, Result};
use regex::Regex;

/// Recognized JER scale-factor levels, in evaluation order.
pub const LEVEL_ORDER: &[&str] = &["SF"];

static LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("SF+").expect("level pattern is a valid literal"));

/// Extract the canonical level from a raw level field.
///
/// The field must contain exactly one run matching `SF+`.
pub fn canonical_level(level_name: &str) -> Result<&str> {
    let mut matches = LEVEL_RE.find_iter(level_name);
    let first = matches.next().ok_or_else(|| Error::UnrecognizedLevel(level_name.to_string()))?;
    if matches.next().is_some() {
        return Err(Error::MalformedLevelName(level_name.to_string()));
    }
    Ok(first.as_str())
}

/// Position of a raw level field's canonical level in [`LEVEL_ORDER`].
pub fn level_index(level_name: &str) -> Result<usize> {
    index_in(LEVEL_ORDER, level_name)
}

fn index_in(catalog: &[&str], level_name: &str) -> Result<usize> {
    let level = canonical_level(level_name)?;
    catalog
        .iter()
        .position(|l| *l == level)
        .ok_or_else(|| Error::UnrecognizedLevel(level.to_string()))
}

/// Reorder `items` in place by catalog position.
///
/// For each index `i` in turn, the item currently at `i` is swapped with the
/// slot at its own catalog position. With one item, or one item per catalog
/// level supplied in catalog order, the input order is kept. Several items
/// sharing a level are rotated by the successive swaps.
pub fn reorder_by_level<T>(items: &mut [T], level_of: impl Fn(&T) -> &str) -> Result<()> {
    reorder_in(LEVEL_ORDER, items, level_of)
}

/// Reorder against an explicit catalog. A catalog slot past the end of
/// `items` cannot be filled and is rejected.
fn reorder_in<T>(
    catalog: &[&str],
    items: &mut [T],
    level_of: impl Fn(&T) -> &str,
) -> Result<()> {
    for i in 0..items.len() {
        let target = index_in(catalog, level_of(&items[i]))?;
        if target >= items.len() {
            return Err(Error::UnrecognizedLevel(format!(
                "{} (level slot {target} but only {} correctors supplied)",
                level_of(&items[i]),
                items.len()
            )));
        }
        items.swap(i, target);
    }
    Ok(())
}
