use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use service_ast::api::server;
use service_ast::domain::options::ExtractOptions;
use service_ast::domain::type_graph::{BasicKind, GraphBuilder};
use tempfile::tempdir;

fn send(stream: &mut TcpStream, reader: &mut BufReader<TcpStream>, command: &str) -> Value {
    stream.write_all(command.as_bytes()).unwrap();
    stream.write_all(b"\n").unwrap();
    let mut response = String::new();
    reader.read_line(&mut response).unwrap();
    serde_json::from_str(&response).unwrap()
}

#[test]
fn test_ipc_server_lifecycle() {
    let port = 4617;
    thread::spawn(move || {
        if let Err(e) = server::start_server(port, ExtractOptions::default()) {
            eprintln!("Server failed: {}", e);
        }
    });

    thread::sleep(Duration::from_millis(500));

    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port))
        .expect("Failed to connect to server");
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let pong = send(&mut stream, &mut reader, r#"{"command": "PING"}"#);
    assert_eq!(pong["status"], "success");
    assert_eq!(pong["data"], "PONG");

    let missing = send(
        &mut stream,
        &mut reader,
        r#"{"command": "EXTRACT", "params": {"path": "/invalid/path/graph.json"}}"#,
    );
    assert_eq!(missing["status"], "error");
    assert!(missing["message"].as_str().unwrap().contains("Type graph not found"));

    // a method returning a bare int violates the return convention
    let dir = tempdir().unwrap();
    let mut b = GraphBuilder::new("example.com/svc", "svc");
    let int = b.basic(BasicKind::Int);
    let body = b.struct_type(&[]);
    let svc = b.named("Svc", body);
    let sig = b.signature(&[], &[int]);
    let position = b.method(svc, "Count", sig, false);
    b.define_type("Svc", svc);
    let ctor = b.signature(&[], &[svc]);
    b.define_func("New", ctor);
    let path = dir.path().join("svc.json");
    fs::write(&path, serde_json::to_vec(&b.build()).unwrap()).unwrap();

    let request = serde_json::json!({"command": "EXTRACT", "params": {"path": path}}).to_string();
    let failed = send(&mut stream, &mut reader, &request);
    assert_eq!(failed["status"], "error");
    assert_eq!(failed["message"], "function return type should be error or (type, error)");
    assert_eq!(failed["file"], position.file.as_str());
    assert_eq!(failed["line"], position.line);

    let unknown = send(&mut stream, &mut reader, r#"{"command": "ANALYZE"}"#);
    assert_eq!(unknown["status"], "error");

    // SHUTDOWN would exit the test process, so the connection is just dropped.
}
