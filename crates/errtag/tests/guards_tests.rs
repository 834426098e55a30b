use errtag::prelude::*;
use errtag::{GenericError, Predicate, is_all_of, is_any_of};
use errtag_test_utils::{NetworkError, ParseFailure, Timeout, Unauthorized, network};
use serde_json::json;

fn samples() -> Vec<Thrown> {
    vec![
        network(500, "/").into(),
        Timeout::empty().into(),
        Thrown::record(json!({"name": "E", "message": "m", "code": 7})),
        Thrown::record(json!(null)),
        Thrown::opaque(3.5_f64),
        Thrown::opaque(()),
        GenericError {
            name: "Remote".into(),
            message: "m".into(),
            tag: Some("remote".into()),
            data: None,
            stack: None,
        }
        .into(),
    ]
}

#[test]
fn empty_sets_behave_vacuously() {
    for value in samples() {
        assert!(!is_any_of(&value, ()));
        assert!(is_all_of(&value, &[]));
    }
}

#[test]
fn is_any_of_is_order_independent() {
    let value: Thrown = Timeout::empty().into();
    assert!(is_any_of(&value, (NetworkError, Timeout)));
    assert!(is_any_of(&value, (Timeout, NetworkError)));
    assert!(!is_any_of(&value, (NetworkError, ParseFailure, Unauthorized)));
}

#[test]
fn is_error_tracks_error_shape() {
    let shapes: Vec<bool> = samples().iter().map(is_error).collect();
    assert_eq!(shapes, vec![true, true, true, false, false, false, true]);
}

#[test]
fn has_code_reads_records_and_payloads() {
    let values = samples();
    assert!(has_code(7).test(&values[2]));
    assert!(!has_code(7.0).test(&values[2]));
    assert!(values.iter().all(|v| !has_code("E_NONE").test(v)));
}

#[test]
fn guards_never_panic_on_odd_inputs() {
    let strict = is_error_of_where(NetworkError, |e| e.data().status == 500);
    let results: Vec<bool> = samples().iter().map(|v| strict.test(v)).collect();
    assert_eq!(results, vec![true, false, false, false, false, false, false]);

    let combined: [&dyn Predicate; 2] = [&NetworkError, &strict];
    assert!(is_all_of(&samples()[0], &combined));
    assert!(!is_all_of(&samples()[1], &combined));
}
