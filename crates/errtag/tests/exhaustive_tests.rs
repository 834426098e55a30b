use errtag::prelude::*;
use errtag::{Error, variants};
use errtag_test_utils::{
    NetworkError, ParseData, ParseFailure, Timeout, Unauthorized, init_test_tracing, network,
};
use tracing::Level;

fn status_of(value: impl Into<Thrown>) -> Result<u16, Error> {
    match_error_of(value, (NetworkError, Timeout, ParseFailure, Unauthorized))
        .with(Unauthorized, |_| 401)
        .select(ParseFailure, "line", |_| 400)
        .with(NetworkError, |e| e.data().status)
        .with(Timeout, |_| 504)
        .exhaustive()
}

#[test]
fn every_declared_variant_reaches_its_handler() {
    init_test_tracing(Level::DEBUG);
    assert_eq!(status_of(network(502, "/")).ok(), Some(502));
    assert_eq!(status_of(Timeout::empty()).ok(), Some(504));
    assert_eq!(
        status_of(ParseFailure::with_data(ParseData { line: 1, column: 1 })).ok(),
        Some(400)
    );
    assert_eq!(status_of(Unauthorized::empty()).ok(), Some(401));
}

#[test]
fn with_any_removes_all_listed_variants() {
    let out = match_error_of(Timeout::empty(), (NetworkError, Timeout, Unauthorized))
        .with_any((Timeout, NetworkError), |_| "transient")
        .with(Unauthorized, |_| "auth")
        .exhaustive()
        .expect("handled");
    assert_eq!(out, "transient");
}

#[test]
fn guards_and_negations_do_not_count_as_coverage_but_still_run_first() {
    let out = match_error_of(network(500, "/"), (NetworkError, Timeout))
        .when(|t| t.message().as_deref() == Some("Request failed"), |_| "by message")
        .with_not((Timeout,), |_| "not timeout")
        .with(is_error_of_where(NetworkError, |e| e.data().status == 500), |_| "guard")
        .map(|t| t)
        .with(NetworkError, |_| "network")
        .with(Timeout, |_| "timeout")
        .exhaustive()
        .expect("handled");
    assert_eq!(out, "by message");
}

#[test]
fn undeclared_runtime_value_is_a_loud_failure() {
    init_test_tracing(Level::DEBUG);
    let err = status_of(Thrown::opaque("not an error at all")).unwrap_err();
    assert!(err.is_non_exhaustive());
    match err {
        Error::NonExhaustive { tag, subject } => {
            assert_eq!(tag, None);
            assert_eq!(subject, "not an error at all");
        }
        other => panic!("unexpected error: {other}"),
    }

    // a record carrying a declared tag is still not an instance
    let record = Thrown::record(serde_json::json!({
        "tag": "timeout",
        "name": "timeout",
        "message": "m"
    }));
    let err = status_of(record).unwrap_err();
    assert!(matches!(err, Error::NonExhaustive { tag: Some(ref t), .. } if t == "timeout"));
}

#[test]
fn empty_variant_set_is_immediately_exhaustive() {
    let err = match_error_of::<_, i32>(network(500, "/"), ()).exhaustive().unwrap_err();
    assert!(err.is_non_exhaustive());

    let out = match_error_of(network(500, "/"), ())
        .when(|_| true, |_| 1)
        .exhaustive()
        .expect("when rule ran");
    assert_eq!(out, 1);
}

#[test]
fn variant_lists_can_be_named_as_types() {
    type Transient = variants![Timeout, NetworkError];
    fn remaining<L>(_: errtag::ExhaustiveMatcher<'_, L, ()>) {}

    let m = match_error_of(Unauthorized::empty(), (Unauthorized, Timeout, NetworkError))
        .with(Unauthorized, |_| ());
    remaining::<Transient>(m);
}
