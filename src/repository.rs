//! Generic repository over labeled nodes and typed relationships.

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::GraphError;
use crate::filter::{bind, Filter};
use crate::graph::{CypherExecutor, Params, QueryExt, Row};
use crate::model::{GraphNode, GraphRelationship};

/// Query-internal variable for the node role.
const NODE_VAR: &str = "e";
/// Query-internal variable for the child node role in relationship operations.
const CHILD_VAR: &str = "c";
/// Query-internal variable for the relationship role.
const REL_VAR: &str = "r";

/// CRUD and relationship operations for one node type.
///
/// The repository composes each operation into a single parameterized
/// statement and delegates execution to the injected executor. It keeps no
/// state between calls, so one instance can be shared freely across
/// concurrent callers.
///
/// ```ignore
/// let repository: GraphRepository<Entity, _> = GraphRepository::new(client);
///
/// let filter = Filter::new(prop("legal_name").eq_ignore_case("acme"));
/// let matches = repository.find(&filter).await?;
/// ```
pub struct GraphRepository<M, E> {
    graph: E,
    _model: PhantomData<fn() -> M>,
}

impl<M, E> GraphRepository<M, E>
where
    M: GraphNode,
    E: CypherExecutor,
{
    /// Creates a repository backed by the given executor.
    pub fn new(graph: E) -> Self {
        Self {
            graph,
            _model: PhantomData,
        }
    }

    /// Returns every node carrying the model's label.
    pub async fn get_all(&self) -> Result<Vec<M>, GraphError> {
        let cypher = format!("MATCH ({v}:{l}) RETURN {v}", v = NODE_VAR, l = M::LABEL);

        let rows = self.graph.query(&cypher).fetch_all().await?;
        rows_to_models(&rows)
    }

    /// Creates one node with the model's set properties.
    ///
    /// Property values travel as bound parameters, never inside the
    /// statement text. Returns the created node as the store echoes it back.
    pub async fn create(&self, model: &M) -> Result<Vec<M>, GraphError> {
        let (map, params) = property_map(model, NODE_VAR)?;

        let cypher = if map.is_empty() {
            format!("CREATE ({v}:{l}) RETURN {v}", v = NODE_VAR, l = M::LABEL)
        } else {
            format!(
                "CREATE ({v}:{l} {m}) RETURN {v}",
                v = NODE_VAR,
                l = M::LABEL,
                m = map
            )
        };

        let rows = self.graph.query(&cypher).params(params).fetch_all().await?;
        rows_to_models(&rows)
    }

    /// Returns every node matching the filter.
    pub async fn find(&self, filter: &Filter<M>) -> Result<Vec<M>, GraphError> {
        let bound = bind(filter, NODE_VAR);
        let cypher = format!(
            "MATCH ({v}:{l}) WHERE {w} RETURN {v}",
            v = bound.var,
            l = bound.label,
            w = bound.clause
        );

        let rows = self
            .graph
            .query(&cypher)
            .params(bound.params)
            .fetch_all()
            .await?;
        rows_to_models(&rows)
    }

    /// Returns the first node matching the filter, or `None`.
    pub async fn first(&self, filter: &Filter<M>) -> Result<Option<M>, GraphError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Overlays `changes` onto the node(s) matched by the filter.
    ///
    /// The first match is read back, fields set in `changes` replace its
    /// values, and the merged property set is written as the matched
    /// node's full property set. When the filter matches several nodes the
    /// one merged set is applied to all of them; when it matches nothing
    /// the operation is a no-op returning an empty `Vec`.
    pub async fn update(&self, filter: &Filter<M>, changes: &M) -> Result<Vec<M>, GraphError> {
        let Some(mut merged) = self.first(filter).await? else {
            return Ok(Vec::new());
        };
        merged.overlay(changes);

        let bound = bind(filter, NODE_VAR);
        let (map, set_params) = property_map(&merged, NODE_VAR)?;
        let map = if map.is_empty() { "{}".to_string() } else { map };

        let cypher = format!(
            "MATCH ({v}:{l}) WHERE {w} SET {v} = {m} RETURN {v}",
            v = bound.var,
            l = bound.label,
            w = bound.clause,
            m = map
        );

        let rows = self
            .graph
            .query(&cypher)
            .params(bound.params)
            .params(set_params)
            .fetch_all()
            .await?;
        rows_to_models(&rows)
    }

    /// Removes the node(s) matched by the filter together with every
    /// relationship attached to them.
    pub async fn delete(&self, filter: &Filter<M>) -> Result<(), GraphError> {
        let bound = bind(filter, NODE_VAR);
        let cypher = format!(
            "MATCH ({v}:{l}) WHERE {w} DETACH DELETE {v}",
            v = bound.var,
            l = bound.label,
            w = bound.clause
        );

        self.graph.query(&cypher).params(bound.params).run().await
    }

    /// Ensures a directed relationship of type `R::TYPE` from the node(s)
    /// matched by `parent` to the node(s) matched by `child`.
    ///
    /// Merge semantics: an edge that already exists is reused, not
    /// duplicated. Set properties of `relationship` are written onto the
    /// edge. A filter side that matches nothing makes the whole operation a
    /// no-op.
    pub async fn create_relationship<C, R>(
        &self,
        parent: &Filter<M>,
        child: &Filter<C>,
        relationship: &R,
    ) -> Result<(), GraphError>
    where
        C: GraphNode,
        R: GraphRelationship,
    {
        let p = bind(parent, NODE_VAR);
        let c = bind(child, CHILD_VAR);
        let (rel_map, rel_params) = property_map(relationship, REL_VAR)?;

        let mut cypher = format!(
            "MATCH ({pv}:{pl}), ({cv}:{cl}) WHERE {pw} AND {cw} \
             MERGE ({pv})-[{r}:{t}]->({cv})",
            pv = p.var,
            pl = p.label,
            cv = c.var,
            cl = c.label,
            pw = p.clause,
            cw = c.clause,
            r = REL_VAR,
            t = R::TYPE
        );
        if !rel_map.is_empty() {
            cypher.push_str(&format!(" SET {r} += {m}", r = REL_VAR, m = rel_map));
        }

        self.graph
            .query(&cypher)
            .params(p.params)
            .params(c.params)
            .params(rel_params)
            .run()
            .await
    }

    /// Removes the directed relationship of type `R::TYPE` between the two
    /// node patterns, leaving both endpoint nodes intact.
    pub async fn delete_relationship<C, R>(
        &self,
        parent: &Filter<M>,
        child: &Filter<C>,
    ) -> Result<(), GraphError>
    where
        C: GraphNode,
        R: GraphRelationship,
    {
        let p = bind(parent, NODE_VAR);
        let c = bind(child, CHILD_VAR);

        let cypher = format!(
            "MATCH ({pv}:{pl})-[{r}:{t}]->({cv}:{cl}) WHERE {pw} AND {cw} DELETE {r}",
            pv = p.var,
            pl = p.label,
            cv = c.var,
            cl = c.label,
            r = REL_VAR,
            t = R::TYPE,
            pw = p.clause,
            cw = c.clause
        );

        self.graph
            .query(&cypher)
            .params(p.params)
            .params(c.params)
            .run()
            .await
    }
}

/// Renders a record's set properties as a Cypher map literal whose values
/// are all parameters, e.g. `{entity_id: $e_v0, legal_name: $e_v1}`.
///
/// Unset (`None`) fields are omitted so they stay absent in the store.
/// Returns the literal (empty string when no properties are set) and the
/// parameter bindings, named `{var}_v{n}` so they cannot collide with a
/// bound filter's `{var}_p{n}` names in the same statement.
fn property_map<T: Serialize>(record: &T, var: &str) -> Result<(String, Params), GraphError> {
    let json = serde_json::to_value(record)
        .map_err(|e| GraphError::Internal(format!("failed to serialize record: {}", e)))?;

    let object = match json {
        JsonValue::Object(map) => map,
        // Unit relationship types serialize to null: no properties.
        JsonValue::Null => serde_json::Map::new(),
        _ => {
            return Err(GraphError::Internal(
                "record types must serialize to an object of properties".to_string(),
            ));
        }
    };

    let mut params = Params::new();
    let mut entries = Vec::new();
    for (index, (key, value)) in object
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .enumerate()
    {
        let name = format!("{}_v{}", var, index);
        entries.push(format!("{}: ${}", key, name));
        params.insert(name, value);
    }

    let map = if entries.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", entries.join(", "))
    };

    Ok((map, params))
}

fn rows_to_models<M: GraphNode>(rows: &[Row]) -> Result<Vec<M>, GraphError> {
    rows.iter().map(|row| row.get::<M>(NODE_VAR)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::filter::prop;
    use crate::graph::RowStream;
    use crate::{GraphNode, GraphRelationship};

    // Field names are kept in alphabetical order so the rendered property
    // maps are stable regardless of map ordering.
    #[derive(GraphNode, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
    #[graph(label = "Entity")]
    struct Entity {
        #[serde(skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        formation_state: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        legal_name: Option<String>,
    }

    #[derive(GraphNode, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
    #[graph(label = "Person")]
    struct Person {
        #[serde(skip_serializing_if = "Option::is_none")]
        person_id: Option<String>,
    }

    #[derive(GraphRelationship, Serialize, Default)]
    #[graph(rel_type = "Investor_Of")]
    struct InvestorOf;

    #[derive(GraphRelationship, Serialize, Default)]
    #[graph(rel_type = "Owns")]
    struct Owns {
        #[serde(skip_serializing_if = "Option::is_none")]
        since: Option<i64>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Kind {
        Fetch,
        Run,
    }

    /// Records every dispatched statement and replays scripted fetch
    /// results in order.
    #[derive(Default)]
    struct ScriptedExecutor {
        calls: Mutex<Vec<(Kind, String, Params)>>,
        fetch_results: Mutex<VecDeque<Vec<Row>>>,
    }

    impl ScriptedExecutor {
        fn with_results(results: Vec<Vec<Row>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fetch_results: Mutex::new(results.into()),
            }
        }

        fn calls(&self) -> Vec<(Kind, String, Params)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CypherExecutor for ScriptedExecutor {
        async fn execute_cypher(
            &self,
            cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, GraphError> {
            self.calls
                .lock()
                .unwrap()
                .push((Kind::Fetch, cypher.to_string(), params));

            let rows = self
                .fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), GraphError> {
            self.calls
                .lock()
                .unwrap()
                .push((Kind::Run, cypher.to_string(), params));
            Ok(())
        }
    }

    fn entity_row(entity_id: &str, formation_state: &str, legal_name: &str) -> Row {
        let mut columns = HashMap::new();
        columns.insert(
            "e".to_string(),
            json!({
                "entity_id": entity_id,
                "formation_state": formation_state,
                "legal_name": legal_name,
            }),
        );
        Row::new(columns)
    }

    fn repository(executor: ScriptedExecutor) -> GraphRepository<Entity, ScriptedExecutor> {
        GraphRepository::new(executor)
    }

    #[tokio::test]
    async fn get_all_matches_by_label() {
        let repo = repository(ScriptedExecutor::with_results(vec![vec![entity_row(
            "E1", "DE", "Acme",
        )]]));

        let all = repo.get_all().await.unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "MATCH (e:Entity) RETURN e");
        assert!(calls[0].2.is_empty());
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].legal_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn create_binds_every_property_value() {
        let repo = repository(ScriptedExecutor::with_results(vec![vec![entity_row(
            "E1", "DE", "Acme",
        )]]));

        let created = repo
            .create(&Entity {
                entity_id: Some("E1".into()),
                formation_state: Some("DE".into()),
                legal_name: Some("Acme".into()),
            })
            .await
            .unwrap();

        let calls = repo.graph.calls();
        assert_eq!(
            calls[0].1,
            "CREATE (e:Entity {entity_id: $e_v0, formation_state: $e_v1, legal_name: $e_v2}) RETURN e"
        );
        assert_eq!(calls[0].2.get("e_v0"), Some(&json!("E1")));
        assert_eq!(calls[0].2.get("e_v1"), Some(&json!("DE")));
        assert_eq!(calls[0].2.get("e_v2"), Some(&json!("Acme")));

        // Values travel as parameters only.
        assert!(!calls[0].1.contains("Acme"));
        assert!(!calls[0].1.contains("E1"));

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].entity_id.as_deref(), Some("E1"));
    }

    #[tokio::test]
    async fn create_with_no_set_fields_omits_the_property_map() {
        let repo = repository(ScriptedExecutor::default());

        repo.create(&Entity::default()).await.unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls[0].1, "CREATE (e:Entity) RETURN e");
    }

    #[tokio::test]
    async fn find_applies_the_bound_filter() {
        let repo = repository(ScriptedExecutor::with_results(vec![vec![entity_row(
            "E1", "DE", "Acme",
        )]]));

        let filter = Filter::new(prop("legal_name").eq_ignore_case("acme"));
        let found = repo.find(&filter).await.unwrap();

        let calls = repo.graph.calls();
        assert_eq!(
            calls[0].1,
            "MATCH (e:Entity) WHERE toLower(e.legal_name) = toLower($e_p0) RETURN e"
        );
        assert_eq!(calls[0].2.get("e_p0"), Some(&json!("acme")));
        assert!(!calls[0].1.contains("acme"));
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn first_takes_the_first_of_many() {
        let repo = repository(ScriptedExecutor::with_results(vec![vec![
            entity_row("E1", "DE", "Acme"),
            entity_row("E2", "NY", "Globex"),
        ]]));

        let filter = Filter::new(prop("formation_state").ne("CA"));
        let first = repo.first(&filter).await.unwrap();

        assert_eq!(first.unwrap().entity_id.as_deref(), Some("E1"));
    }

    #[tokio::test]
    async fn first_on_no_match_is_none() {
        let repo = repository(ScriptedExecutor::default());

        let filter = Filter::new(prop("entity_id").eq("missing"));
        assert!(repo.first(&filter).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overlays_changes_onto_the_stored_node() {
        let repo = repository(ScriptedExecutor::with_results(vec![
            // Lookup result: the node as currently stored.
            vec![entity_row("E1", "DE", "Acme")],
            // Write result: the node after the SET.
            vec![entity_row("E1", "DE", "Acme Corp")],
        ]));

        let filter = Filter::new(prop("entity_id").eq("E1"));
        let changes = Entity {
            legal_name: Some("Acme Corp".into()),
            ..Entity::default()
        };

        let updated = repo.update(&filter, &changes).await.unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1].1,
            "MATCH (e:Entity) WHERE e.entity_id = $e_p0 \
             SET e = {entity_id: $e_v0, formation_state: $e_v1, legal_name: $e_v2} RETURN e"
        );
        // Untouched fields keep their stored values in the merged set.
        assert_eq!(calls[1].2.get("e_p0"), Some(&json!("E1")));
        assert_eq!(calls[1].2.get("e_v0"), Some(&json!("E1")));
        assert_eq!(calls[1].2.get("e_v1"), Some(&json!("DE")));
        assert_eq!(calls[1].2.get("e_v2"), Some(&json!("Acme Corp")));

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].legal_name.as_deref(), Some("Acme Corp"));
        assert_eq!(updated[0].formation_state.as_deref(), Some("DE"));
    }

    #[tokio::test]
    async fn update_on_no_match_is_a_no_op() {
        let repo = repository(ScriptedExecutor::default());

        let filter = Filter::new(prop("entity_id").eq("missing"));
        let updated = repo
            .update(&filter, &Entity::default())
            .await
            .unwrap();

        assert!(updated.is_empty());
        // Only the lookup ran; no write statement was issued.
        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Kind::Fetch);
        assert!(calls[0].1.ends_with("RETURN e"));
    }

    #[tokio::test]
    async fn delete_detaches_relationships() {
        let repo = repository(ScriptedExecutor::default());

        let filter = Filter::new(prop("entity_id").eq("E1"));
        repo.delete(&filter).await.unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Kind::Run);
        assert_eq!(
            calls[0].1,
            "MATCH (e:Entity) WHERE e.entity_id = $e_p0 DETACH DELETE e"
        );
        assert_eq!(calls[0].2.get("e_p0"), Some(&json!("E1")));
    }

    #[tokio::test]
    async fn create_relationship_merges_a_directed_edge() {
        let repo = repository(ScriptedExecutor::default());

        let parent = Filter::new(prop("entity_id").eq("E1"));
        let child = Filter::<Person>::new(prop("person_id").eq("P1"));

        repo.create_relationship(&parent, &child, &InvestorOf)
            .await
            .unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Kind::Run);
        assert_eq!(
            calls[0].1,
            "MATCH (e:Entity), (c:Person) WHERE e.entity_id = $e_p0 AND c.person_id = $c_p0 \
             MERGE (e)-[r:Investor_Of]->(c)"
        );
        // Parent and child parameters live in disjoint namespaces.
        assert_eq!(calls[0].2.get("e_p0"), Some(&json!("E1")));
        assert_eq!(calls[0].2.get("c_p0"), Some(&json!("P1")));
    }

    #[tokio::test]
    async fn create_relationship_sets_edge_properties_when_present() {
        let repo = repository(ScriptedExecutor::default());

        let parent = Filter::new(prop("entity_id").eq("E1"));
        let child = Filter::<Person>::new(prop("person_id").eq("P1"));

        repo.create_relationship(&parent, &child, &Owns { since: Some(2020) })
            .await
            .unwrap();

        let calls = repo.graph.calls();
        assert_eq!(
            calls[0].1,
            "MATCH (e:Entity), (c:Person) WHERE e.entity_id = $e_p0 AND c.person_id = $c_p0 \
             MERGE (e)-[r:Owns]->(c) SET r += {since: $r_v0}"
        );
        assert_eq!(calls[0].2.get("r_v0"), Some(&json!(2020)));
    }

    #[tokio::test]
    async fn create_relationship_with_colliding_filter_shapes_stays_unambiguous() {
        let repo = repository(ScriptedExecutor::default());

        // Both predicates constrain the same property name with different
        // values; the bound clauses must still be distinguishable.
        let parent = Filter::new(prop("entity_id").eq("E1"));
        let child = Filter::<Entity>::new(prop("entity_id").eq("E2"));

        repo.create_relationship(&parent, &child, &InvestorOf)
            .await
            .unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls[0].2.get("e_p0"), Some(&json!("E1")));
        assert_eq!(calls[0].2.get("c_p0"), Some(&json!("E2")));
    }

    #[tokio::test]
    async fn delete_relationship_removes_only_the_edge() {
        let repo = repository(ScriptedExecutor::default());

        let parent = Filter::new(prop("entity_id").eq("E1"));
        let child = Filter::<Person>::new(prop("person_id").eq("P1"));

        repo.delete_relationship::<Person, InvestorOf>(&parent, &child)
            .await
            .unwrap();

        let calls = repo.graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Kind::Run);
        assert_eq!(
            calls[0].1,
            "MATCH (e:Entity)-[r:Investor_Of]->(c:Person) \
             WHERE e.entity_id = $e_p0 AND c.person_id = $c_p0 DELETE r"
        );
    }
}
