use std::cell::Cell;

use errtag::prelude::*;
use errtag_test_utils::{
    NetworkData, NetworkError, ParseData, ParseFailure, Timeout, TimeoutData, Unauthorized,
    init_test_tracing, network,
};
use serde_json::json;
use tracing::Level;

#[test]
fn first_matching_rule_wins_and_later_rules_are_not_evaluated() {
    init_test_tracing(Level::TRACE);
    let later_tests = Cell::new(0);
    let out = match_error(network(500, "/api"))
        .when(|_| false, |_| "never")
        .with(NetworkError, |_| "first")
        .with(guard(|t: &Thrown| t.tag() == Some("NetworkError")), |_| "second")
        .when(
            |_| {
                later_tests.set(later_tests.get() + 1);
                true
            },
            |_| "third",
        )
        .otherwise(|_| "fallback");
    assert_eq!(out, "first");
    assert_eq!(later_tests.get(), 0);
}

#[test]
fn with_not_before_with_shadows_the_later_rule() {
    let out = match_error(network(503, "/status"))
        .with_not((Timeout,), |_| "not a timeout")
        .with(NetworkError, |_| "network")
        .otherwise(|_| "fallback");
    assert_eq!(out, "not a timeout");

    let out = match_error(Timeout::empty())
        .with_not((Timeout,), |_| "not a timeout")
        .with(Timeout, |_| "timeout")
        .otherwise(|_| "fallback");
    assert_eq!(out, "timeout");
}

#[test]
fn with_not_skips_every_listed_variant() {
    let label = |value: Thrown| {
        match_error(value)
            .with_not((NetworkError, Timeout), |_| "neither")
            .with(NetworkError, |_| "network")
            .with(Timeout, |_| "timeout")
            .otherwise(|_| "fallback")
    };
    assert_eq!(label(network(500, "/").into()), "network");
    assert_eq!(label(Timeout::empty().into()), "timeout");
    assert_eq!(label(Unauthorized::empty().into()), "neither");
}

#[test]
fn with_not_accepts_values_outside_every_variant() {
    let out = match_error(Thrown::opaque(17_i32))
        .with_not((NetworkError, Timeout), |t| t.to_string())
        .otherwise(|_| "fallback".to_string());
    assert_eq!(out, "17");
}

#[test]
fn guard_rules_narrow_and_filter() {
    let server_side = is_error_of_where(NetworkError, |e| e.data().status >= 500);
    let classify = |value: Thrown| {
        match_error(value)
            .with(server_side, |e| format!("server {}", e.data().status))
            .with(NetworkError, |e| format!("client {}", e.data().status))
            .with(has_code("E_PARSE"), |_| "coded".to_string())
            .otherwise(|t| format!("other {}", t.message().unwrap_or_default()))
    };
    assert_eq!(classify(network(502, "/").into()), "server 502");
    assert_eq!(classify(network(404, "/").into()), "client 404");
    assert_eq!(
        classify(Thrown::record(json!({"code": "E_PARSE"}))),
        "coded"
    );
    assert_eq!(
        classify(Unauthorized::with_message("who are you").into()),
        "other who are you"
    );
}

#[test]
fn select_passes_only_the_named_field() {
    let url = match_error(network(500, "/api"))
        .select(NetworkError, "url", |v| v)
        .otherwise(|_| json!(null));
    assert_eq!(url, json!("/api"));

    let line = match_error(ParseFailure::with_data(ParseData { line: 3, column: 9 }))
        .select(NetworkError, "status", |_| 0)
        .select(ParseFailure, "line", |v| v.as_u64().unwrap_or_default())
        .otherwise(|_| 0);
    assert_eq!(line, 3);
}

#[test]
fn with_any_covers_each_listed_variant() {
    let transient = |value: Thrown| {
        match_error(value)
            .with_any((Timeout, NetworkError), |t| {
                format!("retry {}", t.tag().unwrap_or_default())
            })
            .otherwise(|_| "give up".to_string())
    };
    assert_eq!(transient(Timeout::empty().into()), "retry timeout");
    assert_eq!(transient(network(500, "/").into()), "retry NetworkError");
    assert_eq!(transient(Unauthorized::empty().into()), "give up");
}

#[test]
fn chained_maps_compose_before_any_rule_runs() {
    fn bump(value: Thrown) -> Thrown {
        match value.downcast::<Tagged<NetworkError>>() {
            Ok(e) => {
                let mut data: NetworkData = e.data().clone();
                data.status += 1;
                NetworkError::new(e.message(), data).into()
            }
            Err(other) => other,
        }
    }

    let seen = match_error(network(1, "/count"))
        .map(bump)
        .with(NetworkError, |e| e.data().status)
        .map(bump)
        .otherwise(|_| 0);
    assert_eq!(seen, 3);
}

#[test]
fn map_can_replace_the_subject_entirely() {
    let out = match_error(Thrown::opaque("deadline exceeded"))
        .map(|t| {
            if t.message().as_deref() == Some("deadline exceeded") {
                Timeout::with_data(TimeoutData { after_ms: 30_000 }).into()
            } else {
                t
            }
        })
        .with(Timeout, |e| e.data().after_ms)
        .otherwise(|_| 0);
    assert_eq!(out, 30_000);
}

#[test]
fn fallback_receives_raw_values_unchanged() {
    let back = match_error(Thrown::opaque(vec![1_u8, 2, 3]))
        .with(NetworkError, |_| None)
        .otherwise(|t| t.downcast::<Vec<u8>>().ok());
    assert_eq!(back, Some(vec![1, 2, 3]));
}

#[test]
fn tagged_records_are_not_instances() {
    // structurally tagged, but only an instance check can pass a `with` rule
    let record = Thrown::record(json!({
        "tag": "NetworkError",
        "name": "NetworkError",
        "message": "m"
    }));
    assert!(NetworkError::is(&record));
    let out = match_error(record)
        .with(NetworkError, |_| "instance")
        .when(NetworkError::is, |_| "structural")
        .otherwise(|_| "fallback");
    assert_eq!(out, "structural");
}
