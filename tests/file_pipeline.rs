/// File-level tests: JSON type graph on disk -> loader -> usecase -> exporter.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use service_ast::application::ExtractUsecase;
use service_ast::domain::options::ExtractOptions;
use service_ast::domain::type_graph::{BasicKind, GraphBuilder, TypeGraph};
use service_ast::infrastructure::concurrency::build_pool;
use service_ast::infrastructure::{JsonExporter, JsonGraphLoader};
use tempfile::tempdir;

fn shop_graph() -> TypeGraph {
    let mut b = GraphBuilder::new("example.com/shop", "shop");
    let err = b.error_type();
    let string = b.basic(BasicKind::String);
    let float = b.basic(BasicKind::Float64);
    let item_body = b.struct_type(&[("Title", string), ("Price", float)]);
    let item = b.named("Item", item_body);
    let items = b.slice(item);
    let body = b.struct_type(&[]);
    let shop = b.named("Shop", body);
    let list = b.signature(&[("category", string)], &[items, err]);
    b.method(shop, "List", list, true);
    b.define_type("Shop", shop);
    let ctor = b.signature(&[], &[shop]);
    b.define_func("New", ctor);
    b.doc_type("Shop", "Shop sells items.\n");
    b.build()
}

fn write_graph(dir: &Path, name: &str, graph: &TypeGraph) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(graph).unwrap()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_single_input_writes_program() {
    let dir = tempdir().unwrap();
    let input = write_graph(dir.path(), "shop.json", &shop_graph());
    let output = dir.path().join("ast.json");

    let options = ExtractOptions::default();
    let usecase = ExtractUsecase {
        source: &JsonGraphLoader,
        exporter: &JsonExporter,
        options: &options,
    };
    assert!(usecase.run(&input, Some(output.as_path())).unwrap());

    let value = read_json(&output);
    assert_eq!(
        value,
        json!({"body": [
            {
                "type": "ClassDefinition",
                "name": "Shop",
                "path": "example.com/shop/shop",
                "docString": "Shop sells items.\n",
                "methods": [{
                    "name": "List",
                    "params": [{"name": "category", "paramType": {"type": "StringLiteral"}, "optional": false}],
                    "returnType": {"type": "ArrayType", "generic": {"type": "CustomNodeLiteral", "name": "Item"}}
                }]
            },
            {
                "type": "StructLiteral",
                "name": "Item",
                "path": "example.com/shop/shop",
                "typeLiteral": {
                    "type": "TypeLiteral",
                    "properties": [
                        {"name": "Title", "type": {"type": "StringLiteral"}, "optional": false},
                        {"name": "Price", "type": {"type": "FloatLiteral"}, "optional": false}
                    ]
                }
            }
        ]})
    );
}

#[test]
fn test_failure_writes_error_document() {
    let dir = tempdir().unwrap();
    let mut b = GraphBuilder::new("example.com/empty", "empty");
    let string = b.basic(BasicKind::String);
    b.define_type("Name", string);
    let input = write_graph(dir.path(), "empty.json", &b.build());
    let output = dir.path().join("ast.json");

    let options = ExtractOptions::default();
    let usecase = ExtractUsecase {
        source: &JsonGraphLoader,
        exporter: &JsonExporter,
        options: &options,
    };
    assert!(!usecase.run(&input, Some(output.as_path())).unwrap());
    assert_eq!(read_json(&output), json!({"error": "no class found"}));
}

#[test]
fn test_missing_input_is_reported_as_error_document() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("ast.json");

    let options = ExtractOptions::default();
    let usecase = ExtractUsecase {
        source: &JsonGraphLoader,
        exporter: &JsonExporter,
        options: &options,
    };
    let ok = usecase
        .run(&dir.path().join("missing.json"), Some(output.as_path()))
        .unwrap();
    assert!(!ok);
    let error = read_json(&output)["error"].as_str().unwrap().to_string();
    assert!(error.contains("Failed to open type graph"), "unexpected error: {}", error);
}

#[test]
fn test_batch_keeps_input_order() {
    let dir = tempdir().unwrap();
    let good = write_graph(dir.path(), "good.json", &shop_graph());
    let mut b = GraphBuilder::new("example.com/empty", "empty");
    b.basic(BasicKind::Int);
    let bad = write_graph(dir.path(), "bad.json", &b.build());
    let output = dir.path().join("batch.json");

    let options = ExtractOptions::default();
    let usecase = ExtractUsecase {
        source: &JsonGraphLoader,
        exporter: &JsonExporter,
        options: &options,
    };
    let pool = build_pool(Some(2)).unwrap();
    let inputs = vec![bad.clone(), good.clone(), bad.clone()];
    assert!(!usecase.run_batch(&pool, &inputs, Some(output.as_path())).unwrap());

    let entries = read_json(&output);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["input"], json!(bad.display().to_string()));
    assert_eq!(entries[0]["error"], json!("no class found"));
    assert_eq!(entries[1]["body"][0]["name"], json!("Shop"));
    assert_eq!(entries[2]["error"], json!("no class found"));
}
