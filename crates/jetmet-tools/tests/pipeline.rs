use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use jetmet_core::{Column, EagerArray, Error, JaggedArray, LazyArray, Result, ScaleFactorLookup};
use jetmet_tools::{BinnedScaleFactor, JersfBuilder, JetResolutionScaleFactor, Variation};

/// Multiplies its inputs jet by jet; stands in for a pt/eta dependent table.
struct ProductLookup {
    signature: Vec<String>,
}

impl ProductLookup {
    fn new(names: &[&str]) -> Self {
        Self { signature: names.iter().map(|s| s.to_string()).collect() }
    }
}

impl ScaleFactorLookup for ProductLookup {
    fn signature(&self) -> &[String] {
        &self.signature
    }

    fn evaluate(&self, args: &[&Column], _label: Option<&str>) -> Result<Column> {
        let mut out = args[0].flat_values().map(<[f64]>::to_vec).unwrap_or_default();
        for arg in &args[1..] {
            let v = arg.flat_values().unwrap_or_default();
            for (o, x) in out.iter_mut().zip(v) {
                *o *= x;
            }
        }
        Ok(EagerArray::new(out).into())
    }
}

fn eta_table() -> BinnedScaleFactor {
    BinnedScaleFactor::new(
        "JetEta",
        vec![0.0, 0.5, 1.1, 1.7, 2.3, 5.0],
        vec![
            (1.122, 1.096, 1.148),
            (1.167, 1.126, 1.208),
            (1.168, 1.114, 1.222),
            (1.029, 0.958, 1.100),
            (1.115, 1.001, 1.229),
        ],
        Variation::Central,
    )
    .unwrap()
}

fn columns(pairs: &[(&str, Column)]) -> HashMap<String, Column> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn single_table_end_to_end() {
    let jersf =
        JersfBuilder::new().add("Summer19UL18_JRV2_MC_SF_AK4PFchs", eta_table()).build().unwrap();
    assert_eq!(jersf.campaign(), "Summer19UL18");
    assert_eq!(jersf.data_era(), "JRV2");
    assert_eq!(jersf.data_type(), "MC");
    assert_eq!(jersf.jet_type(), "AK4PFchs");
    assert_eq!(jersf.signature(), ["JetEta"]);

    let inputs = columns(&[("JetEta", EagerArray::new(vec![0.2, 0.7, 1.5, 2.0, 3.0]).into())]);
    let out = jersf.get_scale_factor(&inputs).unwrap();
    let expected = [1.122, 1.167, 1.168, 1.029, 1.115];
    for (a, b) in out.flat_values().unwrap().iter().zip(expected) {
        assert_relative_eq!(*a, b);
    }
}

#[test]
fn extra_inputs_are_ignored() {
    let jersf = JersfBuilder::new().add("A_B_MC_SF_AK4", eta_table()).build().unwrap();
    let inputs = columns(&[
        ("JetEta", EagerArray::new(vec![0.2]).into()),
        ("JetPt", Column::List(vec![50.0])),
    ]);
    assert!(jersf.get_scale_factor(&inputs).is_ok());
}

#[test]
fn only_first_argument_selects_backend() {
    let jersf = JersfBuilder::new()
        .add("A_B_MC_SF_AK4", ProductLookup::new(&["pt", "eta"]))
        .build()
        .unwrap();

    let ok =
        columns(&[("pt", EagerArray::new(vec![2.0]).into()), ("eta", Column::List(vec![3.0]))]);
    let out = jersf.get_scale_factor(&ok).unwrap();
    assert_relative_eq!(out.flat_values().unwrap()[0], 2.0);

    let bad =
        columns(&[("pt", Column::List(vec![2.0])), ("eta", EagerArray::new(vec![3.0]).into())]);
    assert!(matches!(jersf.get_scale_factor(&bad), Err(Error::UnsupportedArrayBackend(_))));
}

#[test]
fn lazy_inputs_stay_deferred() {
    let jersf = JersfBuilder::new().add("A_B_MC_SF_AK4", eta_table()).build().unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let eta = LazyArray::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(JaggedArray::from_lists([vec![0.2, 1.5], vec![3.0]]).into())
    });
    let inputs = columns(&[("JetEta", eta.into())]);

    let out = jersf.get_scale_factor(&inputs).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let node = out.as_lazy().expect("lazy result");
    assert_eq!(node.label(), Some("A-B-MC-SF-AK4"));

    let computed = out.materialize().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let j = computed.as_jagged().unwrap();
    assert_eq!(j.n_entries(), 2);
    assert_relative_eq!(j.row(1).unwrap()[0], 1.115);
}

#[test]
fn custom_resolver() {
    let jersf = JersfBuilder::new().add("A_B_MC_SF_AK4", eta_table()).build().unwrap();
    let eta: Column = EagerArray::new(vec![0.2]).into();
    let out = jersf.get_scale_factor_with(|name| (name == "JetEta").then_some(&eta)).unwrap();
    assert_relative_eq!(out.flat_values().unwrap()[0], 1.122);
}

#[test]
fn construction_errors() {
    let lookup = || Arc::new(eta_table()) as Arc<dyn ScaleFactorLookup>;
    let build = |names: &[&str]| {
        JetResolutionScaleFactor::new(names.iter().map(|n| (n.to_string(), lookup())))
            .unwrap_err()
    };

    let err = build(&["A_B_MC_SF"]);
    assert!(matches!(err, Error::Format(_)));

    let err = build(&["A_B_MC_SF_AK4_x"]);
    assert!(matches!(err, Error::Format(_)));

    let err = JetResolutionScaleFactor::new(vec![
        ("A_B_MC_SF_AK4".to_string(), lookup()),
        ("A_B_DATA_SF_AK4".to_string(), lookup()),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::InconsistentMetadata { field: "data type", .. }));

    let err = JetResolutionScaleFactor::new(vec![
        ("A_B_MC_SF_AK4".to_string(), lookup()),
        ("A_B_MC_SF_AK8".to_string(), lookup()),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::InconsistentMetadata { field: "jet type", .. }));

    let err = JetResolutionScaleFactor::new(Vec::new()).unwrap_err();
    assert!(matches!(err, Error::EmptyPipeline));

    let err = build(&["A_B_MC_SFxSF_AK4"]);
    assert!(matches!(err, Error::MalformedLevelName(_)));

    let err = build(&["A_B_MC_PtResolution_AK4"]);
    assert!(matches!(err, Error::UnrecognizedLevel(_)));
}

#[test]
fn pipeline_is_shareable_across_threads() {
    let jersf = Arc::new(JersfBuilder::new().add("A_B_MC_SF_AK4", eta_table()).build().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let jersf = Arc::clone(&jersf);
            std::thread::spawn(move || {
                let inputs = columns(&[("JetEta", EagerArray::new(vec![0.1 * i as f64]).into())]);
                jersf.get_scale_factor(&inputs).map(|c| c.flat_values().map(<[f64]>::to_vec))
            })
        })
        .collect();
    for h in handles {
        let out = h.join().unwrap().unwrap().unwrap();
        assert_relative_eq!(out[0], 1.122);
    }
}
