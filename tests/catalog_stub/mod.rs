#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StubRoute {
    /// Exact raw query string to match, e.g. `page=1` or `ids=84%2C1342`.
    pub query: String,
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubRoute {
    pub fn json(query: &str, body: serde_json::Value) -> Self {
        Self {
            query: query.to_owned(),
            status: 200,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn error(query: &str, status: u16) -> Self {
        Self {
            query: query.to_owned(),
            status,
            body: "catalog stub error".to_owned(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-process catalog server answering `GET /books/?...` from a fixed route
/// table, recording every request it sees.
pub struct CatalogStub {
    pub base_url: String,
    routes: Arc<Mutex<Vec<StubRoute>>>,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CatalogStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start catalog stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let routes: Arc<Mutex<Vec<StubRoute>>> = Arc::new(Mutex::new(Vec::new()));
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_routes = Arc::clone(&routes);
        let thread_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                thread_requests.lock().unwrap().push(url.clone());

                let (path, query) = match url.split_once('?') {
                    Some((path, query)) => (path, query),
                    None => (url.as_str(), ""),
                };
                if request.method() != &tiny_http::Method::Get || path != "/books/" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let route = thread_routes
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|route| route.query == query)
                    .cloned();
                let Some(route) = route else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("no stub route").with_status_code(404),
                    );
                    continue;
                };

                if let Some(delay) = route.delay {
                    thread::sleep(delay);
                }

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(route.body)
                    .with_status_code(route.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            routes,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn route(&self, route: StubRoute) {
        self.routes.lock().unwrap().push(route);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/books/?page={page}", self.base_url)
    }
}

impl Drop for CatalogStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A fully-populated catalog record the strict decoder accepts.
pub fn book_json(id: u64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "authors": [
            { "name": "Shelley, Mary Wollstonecraft", "birth_year": 1797, "death_year": 1851 }
        ],
        "subjects": ["Gothic fiction"],
        "bookshelves": ["Browsing: Fiction"],
        "languages": ["en"],
        "copyright": false,
        "media_type": "Text",
        "formats": {
            "text/html": format!("https://www.gutenberg.org/ebooks/{id}.html.images"),
            "image/jpeg": format!("https://www.gutenberg.org/cache/epub/{id}/pg{id}.cover.medium.jpg")
        },
        "download_count": 1000 + id
    })
}

pub fn page_body(results: Vec<serde_json::Value>, next: Option<String>) -> serde_json::Value {
    serde_json::json!({
        "count": results.len(),
        "next": next,
        "previous": null,
        "results": results,
    })
}
