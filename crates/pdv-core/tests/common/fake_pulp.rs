//! Minimal in-process imitation of a Pulp 3 server for integration tests.
//!
//! Implements just enough of the REST API for a download verification run:
//! resource creation and deletion, sync and publish tasks (each reports
//! `running` once before finishing), paginated content listing, the status
//! endpoint, content served under distributions, and a fixture origin under
//! `/fixtures/file/`. All state is kept so tests can inspect what was created
//! and deleted.

use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// `admin:admin`, base64.
const EXPECTED_AUTH: &str = "Basic YWRtaW46YWRtaW4=";

#[derive(Debug, Clone)]
pub struct FakePulpOptions {
    /// Value of the distribution's `http` flag.
    pub http_enabled: bool,
    /// Value of the distribution's `https` flag.
    pub https_enabled: bool,
    /// Serve content even through a disabled scheme.
    pub serve_when_disabled: bool,
    /// Serve content that differs from the fixture origin.
    pub corrupt_content: bool,
    /// Make sync tasks fail.
    pub fail_sync: bool,
    /// Components listed by the status endpoint.
    pub plugins: Vec<&'static str>,
    /// Files in the fixture feed, in manifest order.
    pub files: Vec<(String, Vec<u8>)>,
    /// Content units per page of the content listing.
    pub page_size: usize,
}

impl Default for FakePulpOptions {
    fn default() -> Self {
        Self {
            http_enabled: true,
            https_enabled: false,
            serve_when_disabled: false,
            corrupt_content: false,
            fail_sync: false,
            plugins: vec!["pulpcore", "pulp_file"],
            files: (1..=5)
                .map(|i| {
                    let body: Vec<u8> = (0u8..=250).cycle().skip(i).take(4096 + i).collect();
                    (format!("{}.iso", i), body)
                })
                .collect(),
            page_size: 2,
        }
    }
}

struct Task {
    polls: u32,
    report: Value,
}

#[derive(Default)]
struct State {
    next_id: u64,
    resources: BTreeMap<String, Value>,
    created: Vec<String>,
    deleted: Vec<String>,
    tasks: HashMap<String, Task>,
    content_requests: Vec<String>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn create(&mut self, collection: &str, mut body: Value) -> Value {
        let href = format!("{}{}/", collection, self.next_id());
        body["_href"] = json!(href);
        self.resources.insert(href.clone(), body.clone());
        self.created.push(href);
        body
    }

    fn spawn_task(&mut self, report: Value) -> Value {
        let id = self.next_id();
        let href = format!("/pulp/api/v3/tasks/{}/", id);
        let mut report = report;
        report["_href"] = json!(href);
        self.tasks.insert(href.clone(), Task { polls: 0, report });
        json!({ "_href": href, "task_id": id.to_string() })
    }
}

/// Handle to a running fake server. The server runs until the process exits.
pub struct FakePulp {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl FakePulp {
    pub fn start(opts: FakePulpOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let state = Arc::new(Mutex::new(State::default()));
        let opts = Arc::new(opts);
        {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for stream in listener.incoming().flatten() {
                    let state = Arc::clone(&state);
                    let opts = Arc::clone(&opts);
                    thread::spawn(move || handle(stream, port, &opts, &state));
                }
            });
        }
        Self { base_url, state }
    }

    /// Hrefs of every resource created, in creation order.
    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    /// Hrefs of every resource deleted, in deletion order.
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Hrefs of resources that still exist.
    pub fn live_resources(&self) -> Vec<String> {
        self.state.lock().unwrap().resources.keys().cloned().collect()
    }

    /// Paths requested under `/content/`.
    pub fn content_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().content_requests.clone()
    }
}

struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let expects_continue = headers
        .iter()
        .any(|(k, v)| k.eq_ignore_ascii_case("expect") && v.eq_ignore_ascii_case("100-continue"));
    if expects_continue {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").ok()?;
    }
    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target, None),
    };
    Some(Request {
        method,
        path,
        query,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn respond_json(stream: &mut TcpStream, status: &str, body: &Value) {
    respond(stream, status, "application/json", body.to_string().as_bytes());
}

fn not_found(stream: &mut TcpStream) {
    respond_json(stream, "404 Not Found", &json!({"detail": "Not found."}));
}

fn handle(mut stream: TcpStream, port: u16, opts: &FakePulpOptions, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };

    if request.path.starts_with("/pulp/api/") && request.header("authorization") != Some(EXPECTED_AUTH)
    {
        respond_json(
            &mut stream,
            "401 Unauthorized",
            &json!({"detail": "Authentication credentials were not provided."}),
        );
        return;
    }

    let mut state = state.lock().unwrap();
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/pulp/api/v3/status/") => {
            let versions: Vec<Value> = opts
                .plugins
                .iter()
                .map(|c| json!({"component": c, "version": "3.0.0"}))
                .collect();
            respond_json(&mut stream, "200 OK", &json!({ "versions": versions }));
        }
        ("POST", "/pulp/api/v3/repositories/") => {
            let mut body = request.json();
            body["_latest_version_href"] = Value::Null;
            let repo = state.create("/pulp/api/v3/repositories/", body);
            respond_json(&mut stream, "201 Created", &repo);
        }
        ("POST", "/pulp/api/v3/importers/file/") | ("POST", "/pulp/api/v3/publishers/file/") => {
            let collection = request.path.clone();
            let resource = state.create(&collection, request.json());
            respond_json(&mut stream, "201 Created", &resource);
        }
        ("POST", "/pulp/api/v3/distributions/") => {
            let mut body = request.json();
            let base_path = body["base_path"].as_str().unwrap_or("").to_string();
            body["base_url"] = json!(format!("127.0.0.1:{}/content/{}", port, base_path));
            body["http"] = json!(opts.http_enabled);
            body["https"] = json!(opts.https_enabled);
            let distribution = state.create("/pulp/api/v3/distributions/", body);
            respond_json(&mut stream, "201 Created", &distribution);
        }
        ("POST", path) if path.ends_with("/sync/") => {
            let importer = path.trim_end_matches("sync/");
            let repo_href = request.json()["repository"].as_str().unwrap_or("").to_string();
            if !state.resources.contains_key(importer) || !state.resources.contains_key(&repo_href)
            {
                not_found(&mut stream);
                return;
            }
            let report = if opts.fail_sync {
                json!({"state": "failed", "error": {"description": "feed unreachable"}})
            } else {
                let version_href = format!("{}versions/1/", repo_href);
                if let Some(repo) = state.resources.get_mut(&repo_href) {
                    repo["_latest_version_href"] = json!(version_href);
                }
                json!({"state": "completed", "created_resources": [version_href]})
            };
            let call_report = state.spawn_task(report);
            respond_json(&mut stream, "202 Accepted", &call_report);
        }
        ("POST", path) if path.ends_with("/publish/") => {
            let publisher = path.trim_end_matches("publish/").to_string();
            let repo_href = request.json()["repository"].as_str().unwrap_or("").to_string();
            if !state.resources.contains_key(&publisher) {
                not_found(&mut stream);
                return;
            }
            let publication = state.create(
                "/pulp/api/v3/publications/",
                json!({"publisher": publisher, "repository": repo_href}),
            );
            let report =
                json!({"state": "completed", "created_resources": [publication["_href"].clone()]});
            let call_report = state.spawn_task(report);
            respond_json(&mut stream, "202 Accepted", &call_report);
        }
        ("GET", path) if path.starts_with("/pulp/api/v3/tasks/") => {
            match state.tasks.get_mut(path) {
                Some(task) => {
                    task.polls += 1;
                    let body = if task.polls == 1 {
                        let mut running = task.report.clone();
                        running["state"] = json!("running");
                        running
                    } else {
                        task.report.clone()
                    };
                    respond_json(&mut stream, "200 OK", &body);
                }
                None => not_found(&mut stream),
            }
        }
        ("GET", path) if path.ends_with("/versions/1/content/") => {
            let page: usize = request
                .query
                .as_deref()
                .and_then(|q| q.strip_prefix("page="))
                .and_then(|n| n.parse().ok())
                .unwrap_or(1);
            let size = opts.page_size.max(1);
            let results: Vec<Value> = opts
                .files
                .iter()
                .skip((page - 1) * size)
                .take(size)
                .map(|(name, _)| json!({"relative_path": name}))
                .collect();
            let next = if page * size < opts.files.len() {
                json!(format!("http://127.0.0.1:{}{}?page={}", port, path, page + 1))
            } else {
                Value::Null
            };
            respond_json(
                &mut stream,
                "200 OK",
                &json!({"count": opts.files.len(), "results": results, "next": next}),
            );
        }
        ("GET", path) if path.starts_with("/content/") => {
            state.content_requests.push(path.to_string());
            let rest = &path["/content/".len()..];
            let (base_path, name) = match rest.split_once('/') {
                Some(parts) => parts,
                None => return not_found(&mut stream),
            };
            let distributed = state
                .resources
                .values()
                .any(|r| r["base_path"].as_str() == Some(base_path));
            let file = opts.files.iter().find(|(n, _)| n == name);
            match file {
                Some((_, body)) if distributed && (opts.http_enabled || opts.serve_when_disabled) => {
                    let mut body = body.clone();
                    if opts.corrupt_content {
                        body.push(b'!');
                    }
                    respond(&mut stream, "200 OK", "application/octet-stream", &body);
                }
                _ => not_found(&mut stream),
            }
        }
        ("GET", path) if path.starts_with("/fixtures/file/") => {
            let name = &path["/fixtures/file/".len()..];
            if name == "PULP_MANIFEST" {
                let manifest: String = opts
                    .files
                    .iter()
                    .map(|(n, b)| format!("{},{},{}\n", n, b.len(), b.len()))
                    .collect();
                respond(&mut stream, "200 OK", "text/plain", manifest.as_bytes());
                return;
            }
            match opts.files.iter().find(|(n, _)| n == name) {
                Some((_, body)) => respond(&mut stream, "200 OK", "application/octet-stream", body),
                None => not_found(&mut stream),
            }
        }
        ("GET", path) => match state.resources.get(path) {
            Some(resource) => respond_json(&mut stream, "200 OK", resource),
            None => not_found(&mut stream),
        },
        ("DELETE", path) => {
            if state.resources.remove(path).is_some() {
                state.deleted.push(path.to_string());
                respond(&mut stream, "204 No Content", "application/json", b"");
            } else {
                not_found(&mut stream);
            }
        }
        _ => not_found(&mut stream),
    }
}
