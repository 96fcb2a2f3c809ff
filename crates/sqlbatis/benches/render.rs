use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use sqlbatis::{Engine, Node, Registry, Template, normalize_clauses};

/// A search statement with `n` optional filters plus an IN-style repetition.
fn search_template(n: usize) -> Template {
    let mut nodes = vec![Node::literal("SELECT * FROM t WHERE")];
    for i in 0..n {
        nodes.push(Node::conditional(
            format!(":f{i} != null"),
            format!("AND col{i} = :f{i}"),
        ));
    }
    nodes.push(Node::repetition("ids", " OR ", "id = :id"));
    nodes.push(Node::literal("ORDER BY id LIMIT ::limit"));
    Template::new(nodes)
}

/// Data that enables every other filter and `n` ids.
fn search_data(n: usize) -> Value {
    let mut data = serde_json::Map::new();
    for i in (0..n).step_by(2) {
        data.insert(format!("f{i}"), json!(i));
    }
    data.insert("ids".to_string(), json!((0..n).collect::<Vec<_>>()));
    data.insert("limit".to_string(), json!(50));
    Value::Object(data)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/get");

    for n in [1, 5, 10, 50] {
        let mut registry = Registry::new();
        registry.insert("t", "search", search_template(n));
        let engine = Engine::new(registry);
        let data = search_data(n);

        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(engine.get("t.search", data)));
        });
    }

    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/nested");

    for depth in [1, 4, 16] {
        let mut registry = Registry::new();
        for level in 0..depth {
            registry.insert(
                "n",
                format!("l{level}"),
                Template::new(vec![Node::literal(format!("({{{{ n.l{} }}}})", level + 1))]),
            );
        }
        registry.insert(
            "n",
            format!("l{depth}"),
            Template::new(vec![Node::literal("SELECT 1")]),
        );
        let engine = Engine::new(registry);
        let data = json!({});

        group.bench_with_input(BenchmarkId::from_parameter(depth), &data, |b, data| {
            b.iter(|| black_box(engine.get("n.l0", data)));
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let sql = "SELECT * FROM t WHERE AND a = ? AND b = ? WHERE ORDER BY id";
    c.bench_function("render/normalize_clauses", |b| {
        b.iter(|| black_box(normalize_clauses(black_box(sql))));
    });
}

criterion_group!(benches, bench_render, bench_nested, bench_normalize);
criterion_main!(benches);
