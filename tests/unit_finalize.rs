// tests/unit_finalize.rs
use wikirank_core::config::SortOrder;
use wikirank_core::finalize::{encode_ranking, finalize};
use wikirank_core::record::GraphNode;

fn node(id: &str, rank: f64) -> GraphNode {
    GraphNode {
        id: id.into(),
        rank,
        neighbors: vec!["ignored".into()],
    }
}

#[test]
fn test_descending_order_with_id_tie_break() {
    let nodes = vec![node("C", 0.5), node("A", 1.0), node("B", 0.5)];
    let ranking = finalize(&nodes, SortOrder::Descending);

    let ids: Vec<&str> = ranking.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn test_ascending_order() {
    let nodes = vec![node("A", 1.0), node("B", 0.25)];
    let ranking = finalize(&nodes, SortOrder::Ascending);

    let ids: Vec<&str> = ranking.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A"]);
}

#[test]
fn test_neighbors_are_discarded() {
    let ranking = finalize(&[node("A", 1.0)], SortOrder::Descending);
    let encoded = encode_ranking(&ranking);
    assert_eq!(encoded, "1.0\tA\n");
    assert!(!encoded.contains("ignored"));
}
