use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::corpus::{Citance, Claim, Corpus};
use crate::oracle::{ConcurrencyLimiter, MockOracle, OracleError};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_corpus() -> Corpus {
    Corpus::new(
        "c1",
        vec![
            Claim::new("X improves Y by 10%", "Results", "Performance"),
            Claim::new("Z is a novel architecture", "Methods", "Novelty"),
        ],
        vec![
            Citance::new("Prior work shows X improves Y.", Some(9.0)),
            Citance::new("Z was introduced recently.", None),
        ],
    )
}

fn response(batch_index: usize, payload: serde_json::Value) -> BatchResponse {
    BatchResponse {
        batch_index,
        payload,
    }
}

#[test]
fn test_render_batch_prompt_layout() {
    let prompt = render_batch_prompt(
        Direction::CitanceToClaims,
        &strings(&["c one", "c two"]),
        &strings(&["claim a", "it's b"]),
    );
    assert!(prompt.contains("\"citance_to_claims\""));
    assert!(prompt.contains(
        "Citance 1:\nCitance: c one\nClaims: ['claim a', \"it's b\"]\n\nCitance 2:\nCitance: c two\n"
    ));

    let prompt = render_batch_prompt(
        Direction::ClaimToCitances,
        &strings(&["claim a"]),
        &strings(&["c one"]),
    );
    assert!(prompt.contains("\"claim_to_citances\""));
    assert!(prompt.ends_with("Claim 1:\nClaim: claim a\nCitances: ['c one']\n"));
}

#[test]
fn test_python_str_repr_escapes() {
    assert_eq!(python_str_repr("plain"), "'plain'");
    assert_eq!(python_str_repr("it's"), "\"it's\"");
    assert_eq!(python_str_repr("both ' and \""), "'both \\' and \"'");
    assert_eq!(python_str_repr("a\nb\\c"), "'a\\nb\\\\c'");
    assert_eq!(python_list_repr(&[]), "[]");
}

#[test]
fn test_resolver_exact_then_fuzzy() {
    let resolver = TextResolver::new(["X improves Y by 10%", "Z is novel"], Some(0.9));
    assert_eq!(resolver.resolve("Z is novel"), Resolution::Exact(1));

    match resolver.resolve("X improves Y by 10 %") {
        Resolution::Fuzzy { index, similarity } => {
            assert_eq!(index, 0);
            assert!(similarity >= 0.9 && similarity < 1.0);
        }
        other => panic!("expected fuzzy resolution, got {other:?}"),
    }

    assert_eq!(resolver.resolve("something else"), Resolution::Unresolved);
}

#[test]
fn test_resolver_without_cutoff_is_exact_only() {
    let resolver = TextResolver::new(["X improves Y by 10%"], None);
    assert_eq!(resolver.resolve("X improves Y by 10 %"), Resolution::Unresolved);
    assert_eq!(resolver.len(), 1);
}

#[test]
fn test_coerce_dm() {
    assert_eq!(coerce_dm(None), Ok(0.0));
    assert_eq!(coerce_dm(Some(&json!(8))), Ok(8.0));
    assert_eq!(coerce_dm(Some(&json!(7.5))), Ok(7.5));
    assert_eq!(coerce_dm(Some(&json!(" 6 "))), Ok(6.0));
    assert!(coerce_dm(Some(&json!("high"))).is_err());
    assert!(coerce_dm(Some(&json!(11))).is_err());
    assert!(coerce_dm(Some(&json!(-1))).is_err());
    assert!(coerce_dm(Some(&json!(null))).is_err());
    assert!(coerce_dm(Some(&json!([8]))).is_err());
}

#[test]
fn test_aggregate_citance_to_claims() {
    let corpus = sample_corpus();
    let index = CorpusIndex::new(&corpus, Some(0.9));
    let responses = vec![response(
        0,
        json!({
            "citance_to_claims": [{
                "citance": "Prior work shows X improves Y.",
                "matches": [
                    {"claim": "X improves Y by 10%", "dm": 8},
                    {"claim": "Unknown claim", "dm": 3},
                    {"claim": "Z is a novel architecture", "dm": "bad"}
                ]
            }]
        }),
    )];

    let records = aggregate(Direction::CitanceToClaims, &responses, &index);
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].citance_text, "Prior work shows X improves Y.");
    assert_eq!(records[0].citance_quality_score, Some(9.0));
    assert_eq!(records[0].degree_of_match, 8.0);
    assert_eq!(records[0].citance_key, corpus.citances[0].key);
    assert_eq!(records[0].claim.key(), corpus.claims[0].key);
    assert_eq!(records[0].claim.claim().map(|c| c.theme.as_str()), Some("Performance"));

    assert_eq!(records[1].claim, ClaimRef::stub("Unknown claim"));
    assert!(records[1].claim.key().is_none());
}

#[test]
fn test_aggregate_claim_to_citances_swaps_roles() {
    let corpus = sample_corpus();
    let index = CorpusIndex::new(&corpus, Some(0.9));
    let responses = vec![response(
        0,
        json!({
            "claim_to_citances": [{
                "claim": "X improves Y by 10%",
                "matches": [
                    {"citance": "Prior work shows X improves Y", "dm": 9},
                    {"citance": "Never seen before", "dm": 9}
                ]
            }]
        }),
    )];

    let records = aggregate(Direction::ClaimToCitances, &responses, &index);
    assert_eq!(records.len(), 2);

    // Missing trailing period resolves by fuzzy match to the canonical text.
    assert_eq!(records[0].citance_text, "Prior work shows X improves Y.");
    assert_eq!(records[0].citance_quality_score, Some(9.0));
    assert_eq!(records[0].claim.text(), "X improves Y by 10%");

    assert_eq!(records[1].citance_text, "Never seen before");
    assert_eq!(records[1].citance_quality_score, None);
    assert_eq!(records[1].citance_key, None);
}

#[test]
fn test_aggregate_orders_by_batch_and_skips_bad_items() {
    let corpus = sample_corpus();
    let index = CorpusIndex::new(&corpus, None);
    let responses = vec![
        response(
            1,
            json!({"citance_to_claims": [{
                "citance": "Z was introduced recently.",
                "matches": [{"claim": "Z is a novel architecture"}]
            }]}),
        ),
        response(
            0,
            json!({"citance_to_claims": [
                {"matches": []},
                {"citance": "Prior work shows X improves Y.", "matches": "none"},
                {"citance": "Prior work shows X improves Y.", "matches": [{"claim": "X improves Y by 10%", "dm": 7}]}
            ]}),
        ),
        response(2, json!({"unexpected": []})),
    ];

    let records = aggregate(Direction::CitanceToClaims, &responses, &index);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].citance_text, "Prior work shows X improves Y.");
    assert_eq!(records[1].citance_text, "Z was introduced recently.");
    // Missing dm counts as zero.
    assert_eq!(records[1].degree_of_match, 0.0);
}

#[test]
fn test_match_record_wire_format() {
    let corpus = sample_corpus();
    let record = MatchRecord {
        citance_text: "Prior work shows X improves Y.".to_string(),
        claim: ClaimRef::stub("gone"),
        citance_quality_score: Some(9.0),
        degree_of_match: 8.0,
        citance_key: None,
    };
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({"citance": "Prior work shows X improves Y.", "claim": {"claim": "gone"}, "c_score": 9.0, "dm_score": 8.0})
    );

    let resolved: MatchRecord = serde_json::from_value(json!({
        "citance": "a",
        "claim": {"claim": "X improves Y by 10%", "section": "Results", "theme": "Performance"},
        "c_score": null,
        "dm_score": 6
    }))
    .unwrap();
    assert!(resolved.claim.claim().is_some());
    assert_eq!(resolved.citance_quality_score, None);
    assert_eq!(resolved.claim_identity(), Identity::Text("X improves Y by 10%".to_string()));

    let keyed = MatchRecord {
        claim: ClaimRef::Resolved(corpus.claims[0].clone()),
        ..record
    };
    let back: MatchRecord = serde_json::from_str(&serde_json::to_string(&keyed).unwrap()).unwrap();
    assert_eq!(back.claim_identity(), Identity::Key(corpus.claims[0].key.unwrap()));
}

#[test]
fn test_match_record_reads_null_texts() {
    let stub_null: MatchRecord = serde_json::from_value(json!({
        "citance": "a",
        "claim": {"claim": null},
        "c_score": 9,
        "dm_score": 7
    }))
    .unwrap();
    assert_eq!(stub_null.claim, ClaimRef::stub(""));
    assert!(!stub_null.has_texts());

    let citance_null: MatchRecord = serde_json::from_value(json!({
        "citance": null,
        "claim": {"claim": "X improves Y by 10%"},
        "c_score": null,
        "dm_score": 7
    }))
    .unwrap();
    assert_eq!(citance_null.citance_text, "");
    assert!(!citance_null.has_texts());
}

#[test]
fn test_parse_batch_payload_strips_fences() {
    let value = parse_batch_payload("```json\n{\"citance_to_claims\": []}\n```").unwrap();
    assert_eq!(value, json!({"citance_to_claims": []}));
    assert!(parse_batch_payload("{\"truncated\": [").is_err());
}

#[tokio::test]
async fn test_request_matches_batches_subjects() {
    let oracle = Arc::new(MockOracle::constant("{\"citance_to_claims\": []}"));
    let requester = BatchRequester::new(oracle.clone(), ConcurrencyLimiter::new(4), 2);

    let subjects = strings(&["s1", "s2", "s3", "s4", "s5"]);
    let candidates = strings(&["k1", "k2"]);
    let responses = requester
        .request_matches(Direction::CitanceToClaims, &subjects, &candidates)
        .await
        .unwrap();

    assert_eq!(responses.len(), 3);
    assert_eq!(
        responses.iter().map(|r| r.batch_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    let calls = oracle.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert!(call.contains("['k1', 'k2']"));
    }
    assert_eq!(calls.iter().filter(|c| c.contains("Citance 2:")).count(), 2);
}

#[tokio::test]
async fn test_request_matches_empty_inputs_issue_no_calls() {
    let oracle = Arc::new(MockOracle::constant("{}"));
    let requester = BatchRequester::new(oracle.clone(), ConcurrencyLimiter::new(1), 5);

    let none = requester
        .request_matches(Direction::ClaimToCitances, &[], &strings(&["c"]))
        .await
        .unwrap();
    assert!(none.is_empty());
    let none = requester
        .request_matches(Direction::ClaimToCitances, &strings(&["k"]), &[])
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_zero_batch_size_sends_one_subject_per_call() {
    let oracle = Arc::new(MockOracle::constant("{\"citance_to_claims\": []}"));
    let requester = BatchRequester::new(oracle.clone(), ConcurrencyLimiter::new(2), 0);
    assert_eq!(requester.batch_size(), 1);

    requester
        .request_matches(Direction::CitanceToClaims, &strings(&["s1", "s2"]), &strings(&["k"]))
        .await
        .unwrap();
    assert_eq!(oracle.call_count(), 2);
    assert!(oracle.calls().iter().all(|c| !c.contains("Citance 2:")));
}

#[tokio::test]
async fn test_request_matches_respects_concurrency_cap() {
    let oracle =
        Arc::new(MockOracle::constant("{}").with_delay(Duration::from_millis(20)));
    let requester = BatchRequester::new(oracle.clone(), ConcurrencyLimiter::new(3), 1);

    let subjects: Vec<String> = (0..12).map(|i| format!("s{i}")).collect();
    requester
        .request_matches(Direction::CitanceToClaims, &subjects, &strings(&["k"]))
        .await
        .unwrap();

    assert_eq!(oracle.call_count(), 12);
    assert!(oracle.peak_in_flight() <= 3);
}

#[tokio::test]
async fn test_request_matches_drops_malformed_batch() {
    let oracle = Arc::new(MockOracle::new(|prompt| {
        if prompt.contains("Citance: s2") {
            Ok("{\"citance_to_claims\": [".to_string())
        } else {
            Ok("```json\n{\"citance_to_claims\": []}\n```".to_string())
        }
    }));
    let requester = BatchRequester::new(oracle, ConcurrencyLimiter::new(2), 1);

    let responses = requester
        .request_matches(Direction::CitanceToClaims, &strings(&["s1", "s2", "s3"]), &strings(&["k"]))
        .await
        .unwrap();
    assert_eq!(
        responses.iter().map(|r| r.batch_index).collect::<Vec<_>>(),
        vec![0, 2]
    );
}

#[tokio::test]
async fn test_request_matches_failure_modes() {
    let failing = || {
        Arc::new(MockOracle::new(|prompt| {
            if prompt.contains("Claim: k2") {
                Err(OracleError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok("{\"claim_to_citances\": []}".to_string())
            }
        }))
    };
    let subjects = strings(&["k1", "k2", "k3"]);
    let candidates = strings(&["c"]);

    let strict = BatchRequester::new(failing(), ConcurrencyLimiter::new(2), 1);
    assert_eq!(strict.failure_mode(), FailureMode::Strict);
    let err = strict
        .request_matches(Direction::ClaimToCitances, &subjects, &candidates)
        .await
        .unwrap_err();
    match err {
        RequestError::BatchFailed {
            batch_index,
            source,
            ..
        } => {
            assert_eq!(batch_index, 1);
            assert_eq!(source.status(), Some(500));
        }
    }

    let lenient = BatchRequester::new(failing(), ConcurrencyLimiter::new(2), 1)
        .with_failure_mode(FailureMode::Lenient);
    let responses = lenient
        .request_matches(Direction::ClaimToCitances, &subjects, &candidates)
        .await
        .unwrap();
    assert_eq!(
        responses.iter().map(|r| r.batch_index).collect::<Vec<_>>(),
        vec![0, 2]
    );
}

#[test]
fn test_failure_mode_parse() {
    assert_eq!("Lenient".parse::<FailureMode>(), Ok(FailureMode::Lenient));
    assert_eq!("strict".parse::<FailureMode>(), Ok(FailureMode::Strict));
    assert!("maybe".parse::<FailureMode>().is_err());
    assert_eq!(FailureMode::Lenient.to_string(), "lenient");
}

#[test]
fn test_match_set_for_direction() {
    let record = MatchRecord {
        citance_text: "a".to_string(),
        claim: ClaimRef::stub("b"),
        citance_quality_score: None,
        degree_of_match: 1.0,
        citance_key: None,
    };
    let set = MatchSet {
        citance_to_claims: vec![record.clone(), record.clone()],
        claim_to_citances: vec![record],
    };
    assert_eq!(set.for_direction(Direction::CitanceToClaims).len(), 2);
    assert_eq!(set.for_direction(Direction::ClaimToCitances).len(), 1);
    assert_eq!(set.len(), 3);
    assert!(!set.is_empty());
    assert!(MatchSet::default().is_empty());
}
