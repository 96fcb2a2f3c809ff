use super::*;
use crate::config::{MAX_INCLUDE_DEPTH_CEILING, PlaceholderStyle};
use serde_json::json;
use std::sync::Arc;

fn engine_with(namespace: &str, key: &str, nodes: Vec<Node>) -> Engine {
    let mut registry = Registry::new();
    registry.insert(namespace, key, Template::new(nodes));
    Engine::new(registry)
}

#[test]
fn literals_are_joined_with_single_spaces() {
    let engine = engine_with(
        "user",
        "all",
        vec![
            Node::literal("SELECT id, name"),
            Node::literal("FROM users"),
            Node::literal("ORDER BY id"),
        ],
    );
    let out = engine.get("user.all", &json!({})).unwrap();
    assert_eq!(out.sql, "SELECT id, name FROM users ORDER BY id");
    assert!(out.params.is_empty());
}

#[test]
fn failed_condition_strips_dangling_where() {
    let engine = engine_with(
        "t",
        "find",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional(":id", "id = :id"),
        ],
    );

    let out = engine.get("t.find", &json!({})).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t");
    assert!(out.params.is_empty());

    let out = engine.get("t.find", &json!({ "id": 7 })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t WHERE id = ?");
    assert_eq!(out.params, vec![json!(7)]);
}

#[test]
fn malformed_condition_omits_node() {
    let engine = engine_with(
        "t",
        "find",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional("id ===", "id = :id"),
            Node::literal("ORDER BY id"),
        ],
    );
    let out = engine.get("t.find", &json!({ "id": 1 })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t ORDER BY id");
}

#[test]
fn leading_and_after_where_is_collapsed() {
    let engine = engine_with(
        "t",
        "search",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional(":a != null", "AND a = :a"),
            Node::conditional(":b != null", "AND b = :b"),
        ],
    );
    let out = engine.get("t.search", &json!({ "b": "x" })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t WHERE b = ?");
    assert_eq!(out.params, vec![json!("x")]);

    let out = engine.get("t.search", &json!({ "a": 1, "b": "x" })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t WHERE a = ? AND b = ?");
    assert_eq!(out.params, vec![json!(1), json!("x")]);
}

#[test]
fn empty_where_before_order_by_is_removed() {
    let engine = engine_with(
        "t",
        "list",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional(":status", "AND status = :status"),
            Node::literal("ORDER BY created_at DESC"),
            Node::literal("LIMIT ::limit"),
        ],
    );
    let out = engine.get("t.list", &json!({ "limit": 20 })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t ORDER BY created_at DESC LIMIT 20");
    assert!(out.params.is_empty());
}

#[test]
fn repetition_binds_each_element() {
    let engine = engine_with(
        "t",
        "byIds",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::repetition("ids", " OR ", "id = :id"),
        ],
    );
    let out = engine.get("t.byIds", &json!({ "ids": [1, 2, 3] })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM t WHERE id = ? OR id = ? OR id = ?");
    assert_eq!(out.params, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn repetition_over_objects_uses_element_fields() {
    let engine = engine_with(
        "t",
        "insert",
        vec![
            Node::literal("INSERT INTO t (name, age) VALUES"),
            Node::repetition("rows", ", ", "(:name, :age)"),
        ],
    );
    let data = json!({ "rows": [{ "name": "a", "age": 1 }, { "name": "b", "age": 2 }] });
    let out = engine.get("t.insert", &data).unwrap();
    assert_eq!(out.sql, "INSERT INTO t (name, age) VALUES (?, ?), (?, ?)");
    assert_eq!(out.params, vec![json!("a"), json!(1), json!("b"), json!(2)]);
}

#[test]
fn empty_or_missing_array_omits_repetition() {
    let engine = engine_with(
        "t",
        "byIds",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::repetition("ids", " OR ", "id = :id"),
        ],
    );
    for data in [json!({ "ids": [] }), json!({}), json!({ "ids": "1,2" })] {
        let out = engine.get("t.byIds", &data).unwrap();
        assert_eq!(out.sql, "SELECT * FROM t", "{data}");
        assert!(out.params.is_empty());
    }
}

#[test]
fn literal_substitution_is_not_bound() {
    let engine = engine_with(
        "t",
        "sorted",
        vec![Node::literal("SELECT * FROM ::table ORDER BY ::column")],
    );
    let out = engine
        .get("t.sorted", &json!({ "table": "users", "column": "name" }))
        .unwrap();
    assert_eq!(out.sql, "SELECT * FROM users ORDER BY name");
    assert!(out.params.is_empty());
}

#[test]
fn nested_template_is_inlined() {
    let mut registry = Registry::new();
    registry.insert(
        "common",
        "columns",
        Template::new(vec![Node::literal("id, name, email")]),
    );
    registry.insert(
        "user",
        "find",
        Template::new(vec![
            Node::literal("SELECT {{ common.columns }} FROM users WHERE"),
            Node::conditional(":id", "id = :id"),
        ]),
    );
    let engine = Engine::new(registry);

    let out = engine.get("user.find", &json!({ "id": 3 })).unwrap();
    assert_eq!(out.sql, "SELECT id, name, email FROM users WHERE id = ?");
    assert_eq!(out.params, vec![json!(3)]);
}

#[test]
fn nested_params_are_discarded_by_default() {
    let mut registry = Registry::new();
    registry.insert(
        "common",
        "active",
        Template::new(vec![Node::literal("status = :status")]),
    );
    registry.insert(
        "user",
        "active",
        Template::new(vec![Node::literal("SELECT * FROM users WHERE {{ common.active }}")]),
    );
    let engine = Engine::new(registry);

    let out = engine.get("user.active", &json!({ "status": "on" })).unwrap();
    assert_eq!(out.sql, "SELECT * FROM users WHERE status = ?");
    assert!(out.params.is_empty());
}

#[test]
fn nested_params_can_be_inlined() {
    let mut registry = Registry::new();
    registry.insert(
        "common",
        "active",
        Template::new(vec![Node::literal("status = :status")]),
    );
    registry.insert(
        "user",
        "active",
        Template::new(vec![Node::literal(
            "SELECT * FROM users WHERE id > :min AND {{ common.active }} LIMIT :n",
        )]),
    );
    let config = EngineConfig::default()
        .with_nested_params(NestedParams::Inline)
        .with_placeholder(PlaceholderStyle::Dollar);
    let engine = Engine::with_config(registry, config);

    let out = engine
        .get("user.active", &json!({ "min": 10, "status": "on", "n": 5 }))
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT * FROM users WHERE id > $1 AND status = $2 LIMIT $3"
    );
    assert_eq!(out.params, vec![json!(10), json!("on"), json!(5)]);
}

#[test]
fn dollar_markers_number_the_whole_statement() {
    let mut registry = Registry::new();
    registry.insert(
        "t",
        "byIds",
        Template::new(vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional(":owner", "AND owner = :owner AND"),
            Node::repetition("ids", " OR ", "id = :id"),
        ]),
    );
    let engine = Engine::with_config(
        registry,
        EngineConfig::new().with_placeholder(PlaceholderStyle::Dollar),
    );

    let out = engine
        .get("t.byIds", &json!({ "owner": 9, "ids": [4, 5] }))
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT * FROM t WHERE owner = $1 AND id = $2 OR id = $3"
    );
    assert_eq!(out.params, vec![json!(9), json!(4), json!(5)]);
}

#[test]
fn cyclic_inclusion_hits_recursion_limit() {
    let mut registry = Registry::new();
    registry.insert("a", "x", Template::new(vec![Node::literal("SELECT {{ b.y }}")]));
    registry.insert("b", "y", Template::new(vec![Node::literal("{{ a.x }}")]));
    let engine = Engine::with_config(registry, EngineConfig::new().with_max_include_depth(4));

    let err = engine.get("a.x", &json!({})).unwrap_err();
    assert!(err.is_recursion_limit());
    match err {
        BatisError::RecursionLimitExceeded { limit, .. } => assert_eq!(limit, 4),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn oversized_depth_setting_still_fails_before_the_stack_does() {
    let handle = std::thread::spawn(|| {
        let mut registry = Registry::new();
        registry.insert("a", "x", Template::new(vec![Node::literal("SELECT {{ b.y }}")]));
        registry.insert("b", "y", Template::new(vec![Node::literal("{{ a.x }}")]));
        let config = EngineConfig {
            max_include_depth: usize::MAX,
            ..EngineConfig::default()
        };
        Engine::with_config(registry, config).get("a.x", &json!({}))
    });

    match handle.join().unwrap() {
        Err(BatisError::RecursionLimitExceeded { limit, .. }) => {
            assert_eq!(limit, MAX_INCLUDE_DEPTH_CEILING)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn include_depth_up_to_the_limit_succeeds() {
    let mut registry = Registry::new();
    registry.insert("n", "0", Template::new(vec![Node::literal("{{ n.1 }}")]));
    registry.insert("n", "1", Template::new(vec![Node::literal("{{ n.2 }}")]));
    registry.insert("n", "2", Template::new(vec![Node::literal("SELECT 1")]));

    let engine = Engine::with_config(registry.clone(), EngineConfig::new().with_max_include_depth(2));
    assert_eq!(engine.get("n.0", &json!({})).unwrap().sql, "SELECT 1");

    let engine = Engine::with_config(registry, EngineConfig::new().with_max_include_depth(1));
    assert!(engine.get("n.0", &json!({})).unwrap_err().is_recursion_limit());
}

#[test]
fn lookup_errors_are_distinguished() {
    let engine = engine_with("user", "find", vec![Node::literal("SELECT 1")]);

    let err = engine.get("userfind", &json!({})).unwrap_err();
    assert!(err.is_key_format());

    let err = engine.get("order.find", &json!({})).unwrap_err();
    assert!(matches!(err, BatisError::NamespaceNotFound(ref ns) if ns == "order"));

    let err = engine.get("user.missing", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        BatisError::TemplateNotFound { ref namespace, ref key }
            if namespace == "user" && key == "missing"
    ));
}

#[test]
fn empty_key_segments_are_lookup_misses() {
    let engine = engine_with("user", "find", vec![Node::literal("SELECT 1")]);

    let err = engine.get("user.", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        BatisError::TemplateNotFound { ref namespace, ref key }
            if namespace == "user" && key.is_empty()
    ));

    let err = engine.get(".find", &json!({})).unwrap_err();
    assert!(matches!(err, BatisError::NamespaceNotFound(ref ns) if ns.is_empty()));
}

#[test]
fn missing_nested_template_fails_the_render() {
    let engine = engine_with(
        "user",
        "find",
        vec![Node::literal("SELECT {{ common.nothing }} FROM users")],
    );
    let err = engine.get("user.find", &json!({})).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn get_raw_returns_unresolved_template() {
    let nodes = vec![
        Node::literal("SELECT * FROM t WHERE"),
        Node::conditional(":id", "id = :id"),
    ];
    let engine = engine_with("t", "find", nodes.clone());
    let raw = engine.get_raw("t.find").unwrap();
    assert_eq!(raw.nodes(), nodes.as_slice());
}

#[test]
fn render_template_resolves_includes_through_source() {
    let engine = engine_with("common", "columns", vec![Node::literal("id, name")]);
    let adhoc = Template::new(vec![
        Node::literal("SELECT {{common.columns}} FROM t WHERE"),
        Node::conditional(":name", "name = :name"),
    ]);
    let out = engine
        .render_template(&adhoc, &json!({ "name": "x" }))
        .unwrap();
    assert_eq!(out.sql, "SELECT id, name FROM t WHERE name = ?");
    assert_eq!(out.params, vec![json!("x")]);
}

#[test]
fn rendering_does_not_touch_the_context() {
    let engine = engine_with(
        "t",
        "byIds",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::repetition("ids", " OR ", "id = :id"),
        ],
    );
    let data = json!({ "ids": [1, 2], "extra": { "a": 1 } });
    let before = data.clone();
    engine.get("t.byIds", &data).unwrap();
    engine.get("t.byIds", &data).unwrap();
    assert_eq!(data, before);
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = Arc::new(engine_with(
        "t",
        "find",
        vec![
            Node::literal("SELECT * FROM t WHERE"),
            Node::conditional(":id != null", "id = :id"),
        ],
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.get("t.find", &json!({ "id": i })).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().unwrap();
        assert_eq!(out.sql, "SELECT * FROM t WHERE id = ?");
        assert_eq!(out.params, vec![json!(i)]);
    }
}

#[test]
fn borrowed_source_works() {
    let mut registry = Registry::new();
    registry.insert("t", "one", Template::new(vec![Node::literal("SELECT 1")]));
    let engine = Engine::new(&registry);
    assert_eq!(engine.get("t.one", &Value::Null).unwrap().sql, "SELECT 1");
}
