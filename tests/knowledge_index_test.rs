mod helpers;

use std::sync::Arc;

use helpers::{test_index, BadDimEmbedder, SpikeEmbedder};

#[test]
fn stored_chunks_are_retrieved_by_similarity() {
    let index = test_index(Arc::new(SpikeEmbedder));
    index
        .insert_chunks(
            "climate.pdf",
            &[
                "monsoon seasons bring heavy rainfall".to_string(),
                "polar regions are warming fastest".to_string(),
                "deserts see extreme diurnal swings".to_string(),
            ],
        )
        .unwrap();

    assert_eq!(index.len().unwrap(), 3);

    // identical leading byte → identical spike vector → distance zero
    let results = index.query("monsoon rainfall patterns", 1).unwrap();
    assert_eq!(results, vec!["monsoon seasons bring heavy rainfall".to_string()]);
}

#[test]
fn query_respects_k() {
    let index = test_index(Arc::new(SpikeEmbedder));
    index
        .insert_chunks(
            "climate.pdf",
            &[
                "alpha chunk".to_string(),
                "beta chunk".to_string(),
                "gamma chunk".to_string(),
                "delta chunk".to_string(),
            ],
        )
        .unwrap();

    let results = index.query("alpha question", 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], "alpha chunk");

    let all = index.query("alpha question", 10).unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn empty_index_returns_no_results() {
    let index = test_index(Arc::new(SpikeEmbedder));
    assert!(index.is_empty().unwrap());
    let results = index.query("anything", 3).unwrap();
    assert!(results.is_empty());
}

#[test]
fn inserting_no_chunks_is_a_no_op() {
    let index = test_index(Arc::new(SpikeEmbedder));
    index.insert_chunks("empty.pdf", &[]).unwrap();
    assert!(index.is_empty().unwrap());
}

#[test]
fn wrong_embedding_dimensions_are_rejected() {
    let index = test_index(Arc::new(BadDimEmbedder));
    let err = index
        .insert_chunks("bad.pdf", &["some text".to_string()])
        .unwrap_err();
    assert!(err.to_string().contains("dimensions"));
    // nothing was committed
    assert!(index.is_empty().unwrap());
}

#[test]
fn chunks_from_multiple_sources_coexist() {
    let index = test_index(Arc::new(SpikeEmbedder));
    index
        .insert_chunks("a.pdf", &["alpha from first doc".to_string()])
        .unwrap();
    index
        .insert_chunks("b.pdf", &["beta from second doc".to_string()])
        .unwrap();

    assert_eq!(index.len().unwrap(), 2);
    let results = index.query("beta question", 1).unwrap();
    assert_eq!(results, vec!["beta from second doc".to_string()]);
}
