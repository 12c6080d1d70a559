//! Behavior shared by every `GraphStore` backend

use serde_json::json;
use std::collections::HashSet;
use strand_core::{
    CancellationToken, Direction, Error, GraphConfig, GraphStore, NewNode, NewRelationship,
    NodeId, NodeQuery, NodeUpdate, OrderDirection, PathFinder, RelationshipQuery,
    RelationshipUpdate, TraversalEngine, TraversalOptions, VectorQuery,
};
use strand_storage::MemoryGraph;

async fn memory_store() -> MemoryGraph {
    let store = MemoryGraph::new(GraphConfig::default());
    store.initialize().await.unwrap();
    store
}

#[cfg(feature = "redb")]
async fn redb_store() -> (tempfile::TempDir, strand_storage::RedbGraph) {
    let dir = tempfile::tempdir().unwrap();
    let store =
        strand_storage::RedbGraph::open(dir.path().join("graph.redb"), GraphConfig::default())
            .unwrap();
    store.initialize().await.unwrap();
    (dir, store)
}

macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() {
                    let store = super::memory_store().await;
                    super::$name(&store).await;
                }
            )*
        }

        #[cfg(feature = "redb")]
        mod redb {
            $(
                #[tokio::test]
                async fn $name() {
                    let (_dir, store) = super::redb_store().await;
                    super::$name(&store).await;
                }
            )*
        }
    };
}

backend_tests!(
    related_to_scenario,
    missing_endpoint_is_rejected,
    delete_cascades_to_relationships,
    update_merges_properties,
    query_filters_and_orders,
    pagination_partitions_results,
    relationship_query_by_endpoint,
    batch_reports_rejections,
    self_loop_listed_once,
    traversal_depth_zero,
    traversal_follows_direction,
    traversal_respects_limit_and_filters,
    traversal_missing_start,
    shortest_path_is_minimal,
    all_paths_are_complete_and_sorted,
    vector_search_ranks_and_filters,
    cancelled_search_stops,
    clear_requires_confirmation,
    default_order_follows_creation,
    not_initialized_after_shutdown,
    relationship_query_orders_and_pages,
    related_nodes_are_distinct_and_filtered,
    traversal_records_parallel_neighbor_once,
    all_paths_distinguish_parallel_relationships,
);

async fn node(store: &dyn GraphStore, node_type: &str, label: &str) -> NodeId {
    store
        .create_node(NewNode::new(node_type, label))
        .await
        .unwrap()
        .id
}

async fn link(store: &dyn GraphStore, from: NodeId, to: NodeId, rel_type: &str) {
    store
        .create_relationship(NewRelationship::new(from, to, rel_type))
        .await
        .unwrap();
}

fn labels(nodes: &[strand_core::Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.label.as_str()).collect()
}

/// A - B - D and A - C - E - D
async fn diamond(store: &dyn GraphStore) -> [NodeId; 5] {
    let a = node(store, "NOTE", "A").await;
    let b = node(store, "NOTE", "B").await;
    let c = node(store, "NOTE", "C").await;
    let d = node(store, "NOTE", "D").await;
    let e = node(store, "NOTE", "E").await;
    link(store, a, b, "LINKS").await;
    link(store, b, d, "LINKS").await;
    link(store, a, c, "LINKS").await;
    link(store, c, e, "LINKS").await;
    link(store, e, d, "LINKS").await;
    [a, b, c, d, e]
}

async fn related_to_scenario(store: &dyn GraphStore) {
    let a = node(store, "CONCEPT", "A").await;
    let b = node(store, "CONCEPT", "B").await;
    link(store, a, b, "RELATED_TO").await;

    let outgoing = store.get_outgoing_relationships(&a, &[]).await.unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].target_node_id, b);
    assert!(store.get_incoming_relationships(&a, &[]).await.unwrap().is_empty());

    let related = store
        .get_related_nodes(&a, &["RELATED_TO".to_string()], &[], Direction::Outgoing)
        .await
        .unwrap();
    assert_eq!(labels(&related), vec!["B"]);

    let related = store
        .get_related_nodes(&b, &[], &[], Direction::Both)
        .await
        .unwrap();
    assert_eq!(labels(&related), vec!["A"]);

    let stats = store.get_graph_stats().await.unwrap();
    assert_eq!(stats.node_count, 2);
    assert_eq!(stats.relationship_count, 1);
    assert_eq!(stats.node_type_counts["CONCEPT"], 2);
    assert_eq!(stats.relationship_type_counts["RELATED_TO"], 1);
}

async fn missing_endpoint_is_rejected(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    let err = store
        .create_relationship(NewRelationship::new(a, NodeId::new(), "LINKS"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingEndpoint { .. }));
    assert_eq!(store.get_graph_stats().await.unwrap().relationship_count, 0);
}

async fn delete_cascades_to_relationships(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    let b = node(store, "NOTE", "b").await;
    let c = node(store, "NOTE", "c").await;
    link(store, a, b, "LINKS").await;
    link(store, b, c, "LINKS").await;
    link(store, a, c, "LINKS").await;

    assert!(store.delete_node(&b).await.unwrap());

    let remaining = store.list_relationships().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|r| !r.touches(&b)));
    assert!(store.get_incoming_relationships(&c, &["LINKS".to_string()]).await.unwrap()[0]
        .touches(&a));
    assert!(!store.delete_node(&b).await.unwrap());
}

async fn update_merges_properties(store: &dyn GraphStore) {
    let created = store
        .create_node(
            NewNode::new("CONCEPT", "before")
                .with_property("kept", "yes")
                .with_property("changed", 1)
                .with_vector(vec![1.0, 0.0]),
        )
        .await
        .unwrap();

    let updated = store
        .update_node(
            &created.id,
            NodeUpdate::new().label("after").property("changed", 2),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.label, "after");
    assert_eq!(updated.properties["kept"], json!("yes"));
    assert_eq!(updated.properties["changed"], json!(2));
    assert_eq!(updated.vector, Some(vec![1.0, 0.0]));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= updated.created_at);

    let cleared = store
        .update_node(&created.id, NodeUpdate::new().vector(None))
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.vector.is_none());

    assert!(store
        .update_node(&NodeId::new(), NodeUpdate::new().label("x"))
        .await
        .unwrap()
        .is_none());

    let other = node(store, "CONCEPT", "other").await;
    let relationship = store
        .create_relationship(NewRelationship::new(created.id, other, "LINKS").with_property("w", 1))
        .await
        .unwrap();
    let relationship = store
        .update_relationship(&relationship.id, RelationshipUpdate::new().property("x", true))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(relationship.properties["w"], json!(1));
    assert_eq!(relationship.properties["x"], json!(true));
}

async fn query_filters_and_orders(store: &dyn GraphStore) {
    for (label, team, rank) in [("b", "red", 2), ("a", "red", 1), ("c", "blue", 3)] {
        store
            .create_node(
                NewNode::new("PERSON", label)
                    .with_property("team", team)
                    .with_property("rank", rank),
            )
            .await
            .unwrap();
    }
    node(store, "PLACE", "a").await;

    let red = store
        .query_nodes(
            &NodeQuery::new()
                .with_type("PERSON")
                .with_property("team", "red")
                .order_by("label", OrderDirection::Asc),
        )
        .await
        .unwrap();
    assert_eq!(labels(&red), vec!["a", "b"]);

    let by_rank = store
        .query_nodes(
            &NodeQuery::new()
                .with_type("PERSON")
                .order_by("rank", OrderDirection::Desc),
        )
        .await
        .unwrap();
    assert_eq!(labels(&by_rank), vec!["c", "b", "a"]);

    let labelled_a = store
        .query_nodes(&NodeQuery::new().with_label("a"))
        .await
        .unwrap();
    assert_eq!(labelled_a.len(), 2);
}

async fn pagination_partitions_results(store: &dyn GraphStore) {
    for i in 0..7 {
        store
            .create_node(NewNode::new("ITEM", format!("item-{}", i)).with_property("n", i))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for page in 0..3 {
        let query = NodeQuery::new()
            .order_by("n", OrderDirection::Asc)
            .paginate(page * 3, 3);
        let nodes = store.query_nodes(&query).await.unwrap();
        seen.extend(nodes.into_iter().map(|n| n.properties["n"].clone()));
    }

    let expected: Vec<_> = (0..7).map(|i| json!(i)).collect();
    assert_eq!(seen, expected);
}

async fn relationship_query_by_endpoint(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    let b = node(store, "NOTE", "b").await;
    let c = node(store, "NOTE", "c").await;
    link(store, a, b, "LINKS").await;
    link(store, a, c, "CITES").await;
    link(store, b, c, "LINKS").await;

    let from_a = store
        .query_relationships(&RelationshipQuery::new().from_node(a))
        .await
        .unwrap();
    assert_eq!(from_a.len(), 2);

    let links_into_c = store
        .query_relationships(&RelationshipQuery::new().to_node(c).with_type("LINKS"))
        .await
        .unwrap();
    assert_eq!(links_into_c.len(), 1);
    assert_eq!(links_into_c[0].source_node_id, b);
}

async fn batch_reports_rejections(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    let b = node(store, "NOTE", "b").await;

    let outcome = store
        .create_relationships(vec![
            NewRelationship::new(a, b, "LINKS"),
            NewRelationship::new(a, NodeId::new(), "LINKS"),
            NewRelationship::new(b, a, ""),
            NewRelationship::new(b, a, "LINKS"),
        ])
        .await
        .unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert!(!outcome.is_complete());
    let rejected: Vec<usize> = outcome.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![1, 2]);
    assert_eq!(store.get_graph_stats().await.unwrap().relationship_count, 2);
}

async fn self_loop_listed_once(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    link(store, a, a, "SELF").await;

    assert_eq!(store.get_all_relationships(&a, &[]).await.unwrap().len(), 1);
    assert_eq!(store.get_outgoing_relationships(&a, &[]).await.unwrap().len(), 1);
    assert_eq!(store.get_incoming_relationships(&a, &[]).await.unwrap().len(), 1);
}

async fn traversal_depth_zero(store: &dyn GraphStore) {
    let [a, ..] = diamond(store).await;

    let result = TraversalEngine::new(store)
        .traverse(&a, &TraversalOptions::new().with_depth(0))
        .await
        .unwrap();

    assert_eq!(result.nodes.len(), 1);
    assert_eq!(result.nodes[0].id, a);
    assert!(result.relationships.is_empty());
    assert_eq!(result.paths.len(), 1);
    assert_eq!(result.paths[0].length, 0);
}

async fn traversal_follows_direction(store: &dyn GraphStore) {
    let [a, b, c, d, e] = diamond(store).await;

    let outgoing = TraversalEngine::new(store)
        .traverse(
            &a,
            &TraversalOptions::new()
                .with_direction(Direction::Outgoing)
                .with_depth(1),
        )
        .await
        .unwrap();
    let ids: HashSet<NodeId> = outgoing.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, HashSet::from([a, b, c]));
    assert_eq!(outgoing.relationships.len(), 2);
    assert!(outgoing.paths.iter().all(|p| p.start().map(|n| n.id) == Some(a)));

    let incoming = TraversalEngine::new(store)
        .traverse(
            &d,
            &TraversalOptions::new()
                .with_direction(Direction::Incoming)
                .with_depth(2),
        )
        .await
        .unwrap();
    let ids: HashSet<NodeId> = incoming.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, HashSet::from([d, b, e, a, c]));

    // Nothing points away from D
    let none = TraversalEngine::new(store)
        .traverse(
            &d,
            &TraversalOptions::new().with_direction(Direction::Outgoing),
        )
        .await
        .unwrap();
    assert_eq!(none.nodes.len(), 1);
}

async fn traversal_respects_limit_and_filters(store: &dyn GraphStore) {
    let [a, ..] = diamond(store).await;
    let x = node(store, "PERSON", "X").await;
    link(store, a, x, "KNOWS").await;

    let limited = TraversalEngine::new(store)
        .traverse(&a, &TraversalOptions::new().with_limit(2))
        .await
        .unwrap();
    assert_eq!(limited.nodes.len(), 2);
    assert!(limited.stats.limit_reached);

    let people = TraversalEngine::new(store)
        .traverse(
            &a,
            &TraversalOptions::new().filter_node_types(vec!["PERSON".to_string()]),
        )
        .await
        .unwrap();
    assert_eq!(labels(&people.nodes), vec!["A", "X"]);

    let knows = TraversalEngine::new(store)
        .traverse(
            &a,
            &TraversalOptions::new().filter_relationship_types(vec!["KNOWS".to_string()]),
        )
        .await
        .unwrap();
    assert_eq!(knows.nodes.len(), 2);

    let too_deep = TraversalEngine::new(store)
        .traverse(&a, &TraversalOptions::new().with_depth(1000))
        .await;
    assert!(matches!(too_deep, Err(Error::Validation(_))));
}

async fn traversal_missing_start(store: &dyn GraphStore) {
    let result = TraversalEngine::new(store)
        .traverse(&NodeId::new(), &TraversalOptions::new())
        .await;
    assert!(matches!(result, Err(Error::NodeNotFound(_))));
}

async fn shortest_path_is_minimal(store: &dyn GraphStore) {
    let [a, b, _, d, _] = diamond(store).await;
    let lonely = node(store, "NOTE", "lonely").await;
    let finder = PathFinder::new(store);

    let path = finder.shortest_path(&a, &d, &[], 5).await.unwrap().unwrap();
    assert_eq!(path.length, 2);
    assert_eq!(path.node_ids(), vec![a, b, d]);
    assert_eq!(path.relationships.len(), 2);

    // Edges are followed in both directions
    let reverse = finder.shortest_path(&d, &a, &[], 5).await.unwrap().unwrap();
    assert_eq!(reverse.node_ids(), vec![d, b, a]);

    assert!(finder.shortest_path(&a, &d, &[], 1).await.unwrap().is_none());
    assert!(finder.shortest_path(&a, &lonely, &[], 5).await.unwrap().is_none());

    let same = finder.shortest_path(&a, &a, &[], 5).await.unwrap().unwrap();
    assert_eq!(same.length, 0);

    assert!(matches!(
        finder.shortest_path(&a, &NodeId::new(), &[], 5).await,
        Err(Error::NodeNotFound(_))
    ));
}

async fn all_paths_are_complete_and_sorted(store: &dyn GraphStore) {
    let [a, b, c, d, e] = diamond(store).await;
    let finder = PathFinder::new(store);

    let paths = finder.all_paths(&a, &d, &[], 3).await.unwrap();
    let lengths: Vec<usize> = paths.iter().map(|p| p.length).collect();
    assert_eq!(lengths, vec![2, 3]);
    assert_eq!(paths[0].node_ids(), vec![a, b, d]);
    assert_eq!(paths[1].node_ids(), vec![a, c, e, d]);

    let short = finder.all_paths(&a, &d, &[], 2).await.unwrap();
    assert_eq!(short.len(), 1);

    for path in &paths {
        let unique: HashSet<NodeId> = path.node_ids().into_iter().collect();
        assert_eq!(unique.len(), path.nodes.len());
    }
}

async fn vector_search_ranks_and_filters(store: &dyn GraphStore) {
    for (label, vector) in [
        ("east", vec![1.0, 0.0]),
        ("north-east", vec![0.7, 0.7]),
        ("north", vec![0.0, 1.0]),
    ] {
        store
            .create_node(NewNode::new("POINT", label).with_vector(vector))
            .await
            .unwrap();
    }
    node(store, "POINT", "no-vector").await;

    let ranked = store
        .vector_search(&VectorQuery::new(vec![1.0, 0.0]))
        .await
        .unwrap();
    let order: Vec<&str> = ranked.iter().map(|s| s.node.label.as_str()).collect();
    assert_eq!(order, vec!["east", "north-east", "north"]);
    assert!((ranked[0].similarity - 1.0).abs() < 1e-6);

    let filtered = store
        .vector_search(&VectorQuery::new(vec![1.0, 0.0]).with_min_similarity(0.5))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);

    let top = store
        .vector_search(
            &VectorQuery::new(vec![1.0, 0.0])
                .with_min_similarity(0.5)
                .with_limit(1),
        )
        .await
        .unwrap();
    assert_eq!(top[0].node.label, "east");

    let mismatch = store.vector_search(&VectorQuery::new(vec![1.0, 0.0, 0.0])).await;
    assert!(matches!(mismatch, Err(Error::DimensionMismatch { .. })));
}

async fn cancelled_search_stops(store: &dyn GraphStore) {
    let [a, _, _, d, _] = diamond(store).await;
    let token = CancellationToken::new();
    token.cancel();

    let traversal = TraversalEngine::new(store)
        .with_cancellation(token.clone())
        .traverse(&a, &TraversalOptions::new())
        .await;
    assert!(matches!(traversal, Err(Error::Cancelled)));

    let paths = PathFinder::new(store)
        .with_cancellation(token)
        .all_paths(&a, &d, &[], 3)
        .await;
    assert!(matches!(paths, Err(Error::Cancelled)));
}

async fn clear_requires_confirmation(store: &dyn GraphStore) {
    diamond(store).await;

    assert!(matches!(
        store.clear_graph(false).await,
        Err(Error::Precondition(_))
    ));
    assert_eq!(store.get_graph_stats().await.unwrap().node_count, 5);

    assert!(store.clear_graph(true).await.unwrap());
    let graph = store.read_graph().await.unwrap();
    assert!(graph.nodes.is_empty());
    assert!(graph.relationships.is_empty());
}

async fn default_order_follows_creation(store: &dyn GraphStore) {
    let mut created = Vec::new();
    for i in 0..50 {
        created.push(node(store, "ITEM", &format!("item-{}", i)).await);
    }

    let listed: Vec<NodeId> = store.list_nodes().await.unwrap().iter().map(|n| n.id).collect();
    assert_eq!(listed, created);
    let queried: Vec<NodeId> = store
        .query_nodes(&NodeQuery::new())
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(queried, created);

    let hub = created[0];
    let mut links = Vec::new();
    for target in &created[1..20] {
        let relationship = store
            .create_relationship(NewRelationship::new(hub, *target, "LINKS"))
            .await
            .unwrap();
        links.push(relationship.id);
    }
    let listed: Vec<_> = store
        .list_relationships()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(listed, links);
    let outgoing: Vec<_> = store
        .get_outgoing_relationships(&hub, &[])
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(outgoing, links);
}

async fn not_initialized_after_shutdown(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "a").await;
    store.shutdown().await.unwrap();
    assert!(!store.is_initialized());

    assert!(matches!(
        store.create_node(NewNode::new("NOTE", "b")).await,
        Err(Error::NotInitialized)
    ));
    assert!(matches!(store.get_node(&a).await, Err(Error::NotInitialized)));
    assert!(matches!(
        store.query_relationships(&RelationshipQuery::new()).await,
        Err(Error::NotInitialized)
    ));
    assert!(matches!(
        store.get_outgoing_relationships(&a, &[]).await,
        Err(Error::NotInitialized)
    ));
    assert!(matches!(
        store.vector_search(&VectorQuery::new(vec![1.0])).await,
        Err(Error::NotInitialized)
    ));
    assert!(matches!(store.clear_graph(true).await, Err(Error::NotInitialized)));

    store.initialize().await.unwrap();
    assert!(store.get_node(&a).await.unwrap().is_some());
}

async fn relationship_query_orders_and_pages(store: &dyn GraphStore) {
    let hub = node(store, "NOTE", "hub").await;
    let other = node(store, "NOTE", "other").await;
    for i in 0..7 {
        let target = node(store, "NOTE", &format!("t{}", i)).await;
        store
            .create_relationship(NewRelationship::new(hub, target, "LINKS").with_property("n", i))
            .await
            .unwrap();
    }
    link(store, other, hub, "LINKS").await;

    let mut seen = Vec::new();
    for page in 0..3 {
        let query = RelationshipQuery::new()
            .from_node(hub)
            .order_by("n", OrderDirection::Desc)
            .paginate(page * 3, 3);
        let relationships = store.query_relationships(&query).await.unwrap();
        assert!(relationships.len() <= 3);
        seen.extend(relationships.into_iter().map(|r| r.properties["n"].clone()));
    }

    let expected: Vec<_> = (0..7).rev().map(|i| json!(i)).collect();
    assert_eq!(seen, expected);

    let past_end = store
        .query_relationships(&RelationshipQuery::new().paginate(100, 5))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

async fn related_nodes_are_distinct_and_filtered(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "A").await;
    let b = node(store, "NOTE", "B").await;
    let c = node(store, "PERSON", "C").await;
    link(store, a, b, "X").await;
    link(store, a, b, "Y").await;
    link(store, b, a, "Z").await;
    link(store, a, c, "X").await;

    let all = store
        .get_related_nodes(&a, &[], &[], Direction::Both)
        .await
        .unwrap();
    assert_eq!(labels(&all), vec!["B", "C"]);

    let people = store
        .get_related_nodes(&a, &[], &["PERSON".to_string()], Direction::Both)
        .await
        .unwrap();
    assert_eq!(labels(&people), vec!["C"]);

    let via_y = store
        .get_related_nodes(&a, &["Y".to_string()], &[], Direction::Outgoing)
        .await
        .unwrap();
    assert_eq!(labels(&via_y), vec!["B"]);

    let pointing_at_a = store
        .get_related_nodes(&a, &[], &[], Direction::Incoming)
        .await
        .unwrap();
    assert_eq!(labels(&pointing_at_a), vec!["B"]);
}

async fn traversal_records_parallel_neighbor_once(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "A").await;
    let b = node(store, "NOTE", "B").await;
    link(store, a, b, "X").await;
    link(store, b, a, "Y").await;

    let result = TraversalEngine::new(store)
        .traverse(&a, &TraversalOptions::new().with_depth(2))
        .await
        .unwrap();

    assert_eq!(labels(&result.nodes), vec!["A", "B"]);
    assert_eq!(result.relationships.len(), 1);
    assert_eq!(result.relationships[0].relationship_type, "X");
    assert_eq!(result.paths.len(), 2);
}

async fn all_paths_distinguish_parallel_relationships(store: &dyn GraphStore) {
    let a = node(store, "NOTE", "A").await;
    let b = node(store, "NOTE", "B").await;
    let c = node(store, "NOTE", "C").await;
    link(store, a, b, "X").await;
    link(store, b, a, "Y").await;
    link(store, b, c, "Z").await;

    let finder = PathFinder::new(store);
    let paths = finder.all_paths(&a, &c, &[], 3).await.unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.length == 2 && p.node_ids() == vec![a, b, c]));

    let first_hops: HashSet<String> = paths
        .iter()
        .map(|p| p.relationships[0].relationship_type.clone())
        .collect();
    assert_eq!(first_hops, HashSet::from(["X".to_string(), "Y".to_string()]));

    let shortest = finder.shortest_path(&a, &c, &[], 5).await.unwrap().unwrap();
    assert_eq!(shortest.length, 2);

    let only_x = finder
        .all_paths(&a, &c, &["X".to_string(), "Z".to_string()], 3)
        .await
        .unwrap();
    assert_eq!(only_x.len(), 1);
}
