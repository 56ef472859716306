// Runs the real `ApiClient` against a scripted HTTP server on localhost.

mod support;

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use pocket_rename::api::{Params, Transport};
use pocket_rename::{worker, ApiClient, ArticleStore, Authorizer, Credential, ItemState, PocketError};
use serde_json::{json, Value};
use support::ScriptedApproval;

struct Reply {
    status: u16,
    x_error: Option<&'static str>,
    body: String,
}

fn reply_json(status: u16, body: Value) -> Reply {
    Reply {
        status,
        x_error: None,
        body: body.to_string(),
    }
}

fn reply_error(status: u16, x_error: Option<&'static str>) -> Reply {
    Reply {
        status,
        x_error,
        body: String::new(),
    }
}

/// One request as the server saw it. Header names are lowercased.
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Value,
}

/// Answers one connection per scripted reply, in order.
struct ScriptedServer {
    base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl ScriptedServer {
    fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("local TCP listener should bind");
        let addr = listener.local_addr().expect("resolved local listener address");
        let seen = Arc::new(Mutex::new(Vec::new()));

        thread::spawn({
            let seen = Arc::clone(&seen);
            move || {
                for reply in replies {
                    let Ok((stream, _)) = listener.accept() else {
                        return;
                    };
                    serve_one(stream, &reply, &seen);
                }
            }
        });

        ScriptedServer {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.seen().into_iter().map(|s| s.path).collect()
    }
}

fn serve_one(stream: TcpStream, reply: &Reply, seen: &Mutex<Vec<Seen>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone accepted stream"));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("header line");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).expect("request body");
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    seen.lock().unwrap().push(Seen {
        method,
        path,
        headers,
        body,
    });

    let mut response = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    if let Some(reason) = reply.x_error {
        response.push_str(&format!("X-Error: {reason}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);

    let mut stream = stream;
    stream.write_all(response.as_bytes()).expect("write response");
}

fn item(id: &str, url: &str, title: &str) -> Value {
    json!({
        "item_id": id,
        "given_url": url,
        "given_title": title,
        "resolved_url": url,
        "resolved_title": title,
        "time_added": "1700000000"
    })
}

#[test]
fn list_posts_json_under_the_base_and_keeps_service_order() {
    let server = ScriptedServer::start(vec![reply_json(
        200,
        json!({
            "status": 1,
            "list": {
                "9": item("9", "https://nine.test/", "Nine"),
                "3": item("3", "https://three.test/", "Three")
            }
        }),
    )]);
    let api = ApiClient::new(format!("{}/v3/", server.base_url)).unwrap();
    let store = ArticleStore::new(api, Credential::new("ck", Some("tok".into())));

    let runtime = worker::runtime().unwrap();
    let lister = store.clone();
    let articles = runtime
        .block_on(worker::offload(move || lister.list(ItemState::Unread)))
        .unwrap();

    let ids: Vec<&str> = articles.iter().map(|a| a.item_id.as_str()).collect();
    assert_eq!(ids, vec!["9", "3"]);

    let seen = server.seen();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v3/get");
    assert_eq!(request.headers["accept"], "application/json");
    assert_eq!(request.headers["x-accept"], "application/json");
    assert!(request.headers["content-type"].starts_with("application/json"));
    assert_eq!(
        request.body,
        json!({"detailType": "complete", "state": "unread", "consumer_key": "ck", "access_token": "tok"})
    );
}

#[test]
fn fully_qualified_endpoints_skip_the_base() {
    let server = ScriptedServer::start(vec![reply_json(200, json!({"ok": true}))]);
    let api = ApiClient::new(format!("{}/v3", server.base_url)).unwrap();

    let body = api
        .call(
            &Credential::new("ck", None),
            &format!("{}/elsewhere", server.base_url),
            Params::new(),
        )
        .unwrap();

    assert_eq!(body, json!({"ok": true}));
    assert_eq!(server.paths(), vec!["/elsewhere"]);
    assert!(server.seen()[0].body.get("access_token").is_none());
}

#[test]
fn rejected_token_then_rejected_key_over_http() {
    let server = ScriptedServer::start(vec![
        reply_error(401, Some("Invalid access token.")),
        reply_error(403, Some("Invalid consumer key.")),
    ]);
    let api = ApiClient::new(format!("{}/v3", server.base_url)).unwrap();
    let mut approval = ScriptedApproval::default();

    let err = Authorizer::new(&api)
        .authorize(Credential::new("ck", Some("stale".into())), &mut approval)
        .unwrap_err();

    match err {
        PocketError::InvalidConsumerKey { consumer_key } => assert_eq!(consumer_key, "ck"),
        other => panic!("expected InvalidConsumerKey, got {other:?}"),
    }
    assert_eq!(server.paths(), vec!["/v3/get", "/v3/oauth/request"]);
    let seen = server.seen();
    assert_eq!(seen[0].body["access_token"], "stale");
    assert!(seen[1].body.get("access_token").is_none());
    assert!(approval.urls.is_empty());
}

#[test]
fn handshake_over_http_returns_the_issued_token() {
    let server = ScriptedServer::start(vec![
        reply_json(200, json!({"code": "abc-code", "state": null})),
        reply_json(200, json!({"access_token": "fresh", "username": "reader"})),
    ]);
    let api = ApiClient::new(format!("{}/v3", server.base_url)).unwrap();
    let mut approval = ScriptedApproval::default();

    let credential = Authorizer::new(&api)
        .with_redirect_uri("https://app.test/done")
        .authorize(Credential::new("ck", None), &mut approval)
        .unwrap();

    assert_eq!(credential.access_token.as_deref(), Some("fresh"));
    assert_eq!(credential.username.as_deref(), Some("reader"));
    assert_eq!(server.paths(), vec!["/v3/oauth/request", "/v3/oauth/authorize"]);
    let seen = server.seen();
    assert_eq!(seen[0].body, json!({"redirect_uri": "https://app.test/done", "consumer_key": "ck"}));
    assert_eq!(seen[1].body, json!({"code": "abc-code", "consumer_key": "ck"}));
    assert_eq!(approval.urls.len(), 1);
    assert!(approval.urls[0].contains("request_token=abc-code"));
}

#[test]
fn error_reason_comes_from_the_x_error_header() {
    let server = ScriptedServer::start(vec![
        reply_error(503, Some("Pocket server issue")),
        reply_error(400, None),
    ]);
    let api = ApiClient::new(format!("{}/v3", server.base_url)).unwrap();
    let credential = Credential::new("ck", Some("tok".into()));

    let err = api.call(&credential, "/send", Params::new()).unwrap_err();
    assert!(
        matches!(err, PocketError::Http { status: 503, ref reason } if reason == "Pocket server issue"),
        "{err:?}"
    );

    // Without the header the status text stands in.
    let err = api.call(&credential, "/send", Params::new()).unwrap_err();
    assert!(
        matches!(err, PocketError::Http { status: 400, ref reason } if reason == "Bad Request"),
        "{err:?}"
    );
}
