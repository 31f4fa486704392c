//! Binned JER scale-factor table.
//!
//! Mirrors the layout of the JER scale-factor text files: one binned variable
//! (usually `JetEta`) and a `(central, down, up)` triple per bin.

use std::sync::Arc;

use jetmet_core::{Column, EagerArray, Error, LazyArray, Result, ScaleFactorLookup};

/// Which column of the scale-factor table to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variation {
    /// Nominal scale factor.
    #[default]
    Central,
    /// −1σ variation.
    Down,
    /// +1σ variation.
    Up,
}

#[derive(Debug)]
struct Table {
    edges: Vec<f64>,
    values: Vec<f64>,
}

impl Table {
    /// Bin index of `x`, clamped to the first/last bin.
    fn bin(&self, x: f64) -> usize {
        let n_bins = self.values.len();
        let idx = self.edges.partition_point(|e| *e <= x);
        idx.saturating_sub(1).min(n_bins - 1)
    }

    fn apply(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.values[self.bin(x)]).collect()
    }

    fn apply_column(&self, col: &Column) -> Result<Column> {
        match col {
            Column::Eager(a) => Ok(EagerArray::new(self.apply(&a.values)).into()),
            Column::Jagged(j) => Ok(j.with_flat(self.apply(j.flat()))?.into()),
            Column::Lazy(l) => self.apply_column(&l.compute()?),
            Column::List(_) => Err(Error::UnsupportedArrayBackend(col.kind_name().to_string())),
        }
    }
}

/// Scale factor binned in a single variable.
#[derive(Debug, Clone)]
pub struct BinnedScaleFactor {
    signature: Vec<String>,
    table: Arc<Table>,
    variation: Variation,
}

impl BinnedScaleFactor {
    /// Create a table from bin `edges` and one `(central, down, up)` triple per bin.
    pub fn new(
        variable: impl Into<String>,
        edges: Vec<f64>,
        triples: Vec<(f64, f64, f64)>,
        variation: Variation,
    ) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation("at least two bin edges are required".into()));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Validation(
                "bin edges must be finite and strictly increasing".into(),
            ));
        }
        if triples.len() != edges.len() - 1 {
            return Err(Error::Validation(format!(
                "{} bins but {} scale-factor rows",
                edges.len() - 1,
                triples.len()
            )));
        }
        let values = triples
            .into_iter()
            .map(|(central, down, up)| match variation {
                Variation::Central => central,
                Variation::Down => down,
                Variation::Up => up,
            })
            .collect();
        Ok(Self {
            signature: vec![variable.into()],
            table: Arc::new(Table { edges, values }),
            variation,
        })
    }

    /// Selected variation.
    pub fn variation(&self) -> Variation {
        self.variation
    }
}

impl ScaleFactorLookup for BinnedScaleFactor {
    fn signature(&self) -> &[String] {
        &self.signature
    }

    fn evaluate(&self, args: &[&Column], label: Option<&str>) -> Result<Column> {
        let [x] = args else {
            return Err(Error::Validation(format!(
                "expected 1 argument ({}), got {}",
                self.signature[0],
                args.len()
            )));
        };
        match x {
            Column::Lazy(upstream) => {
                let table = Arc::clone(&self.table);
                let upstream = upstream.clone();
                let node = LazyArray::new(move || table.apply_column(&upstream.compute()?));
                Ok(match label {
                    Some(label) => node.with_label(label),
                    None => node,
                }
                .into())
            }
            other => self.table.apply_column(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use jetmet_core::JaggedArray;

    fn table(variation: Variation) -> BinnedScaleFactor {
        BinnedScaleFactor::new(
            "JetEta",
            vec![-2.5, -1.0, 1.0, 2.5],
            vec![(1.20, 1.15, 1.25), (1.10, 1.05, 1.15), (1.21, 1.16, 1.26)],
            variation,
        )
        .unwrap()
    }

    #[test]
    fn test_bins_and_clamping() {
        let sf = table(Variation::Central);
        let eta = Column::from(EagerArray::new(vec![-3.0, -1.5, 0.0, 1.0, 2.4, 9.0]));
        let out = sf.evaluate(&[&eta], None).unwrap();
        let v = out.flat_values().unwrap();
        let expected = [1.20, 1.20, 1.10, 1.21, 1.21, 1.21];
        for (a, b) in v.iter().zip(expected) {
            assert_relative_eq!(*a, b);
        }
    }

    #[test]
    fn test_variations() {
        let eta = Column::from(EagerArray::new(vec![0.0]));
        let down_sf = table(Variation::Down);
        assert_eq!(down_sf.variation(), Variation::Down);
        assert_eq!(table(Variation::default()).variation(), Variation::Central);
        let down = down_sf.evaluate(&[&eta], None).unwrap();
        let up = table(Variation::Up).evaluate(&[&eta], None).unwrap();
        assert_relative_eq!(down.flat_values().unwrap()[0], 1.05);
        assert_relative_eq!(up.flat_values().unwrap()[0], 1.15);
    }

    #[test]
    fn test_jagged_keeps_structure() {
        let sf = table(Variation::Central);
        let eta = Column::from(JaggedArray::from_lists([vec![0.0, 2.0], vec![], vec![-2.0]]));
        let out = sf.evaluate(&[&eta], None).unwrap();
        let j = out.as_jagged().unwrap();
        assert_eq!(j.offsets(), &[0, 2, 2, 3]);
        assert_eq!(j.row(0).unwrap().len(), 2);
    }

    #[test]
    fn test_lazy_result_is_labeled_and_deferred() {
        let sf = table(Variation::Central);
        let eta = Column::from(LazyArray::from_column(EagerArray::new(vec![0.0]).into()));
        let out = sf.evaluate(&[&eta], Some("A-B-MC-SF-AK4")).unwrap();
        let node = out.as_lazy().unwrap();
        assert_eq!(node.label(), Some("A-B-MC-SF-AK4"));
        let v = node.compute().unwrap();
        assert_relative_eq!(v.flat_values().unwrap()[0], 1.10);
    }

    #[test]
    fn test_lazy_failure_names_the_level() {
        let sf = table(Variation::Central);
        let eta = Column::from(LazyArray::from_column(Column::List(vec![0.0])));
        let out = sf.evaluate(&[&eta], Some("A-B-MC-SF-AK4")).unwrap();
        match out.as_lazy().unwrap().compute() {
            Err(Error::Computation(msg)) => {
                assert!(msg.starts_with("A-B-MC-SF-AK4: "), "{msg}");
                assert!(msg.contains("list"), "{msg}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_tables() {
        let bad = |edges: Vec<f64>, rows: usize| {
            BinnedScaleFactor::new("JetEta", edges, vec![(1.0, 1.0, 1.0); rows], Variation::Central)
        };
        assert!(bad(vec![0.0], 0).is_err());
        assert!(bad(vec![0.0, 0.0], 1).is_err());
        assert!(bad(vec![0.0, 1.0], 2).is_err());
        assert!(bad(vec![0.0, f64::NAN], 1).is_err());
        assert!(bad(vec![0.0, 1.0, 2.0], 2).is_ok());
    }

    #[test]
    fn test_rejects_plain_list_and_wrong_arity() {
        let sf = table(Variation::Central);
        let list = Column::List(vec![0.0]);
        assert!(matches!(sf.evaluate(&[&list], None), Err(Error::UnsupportedArrayBackend(_))));
        assert!(matches!(sf.evaluate(&[], None), Err(Error::Validation(_))));
    }
}
