//! Ephemeral render server.
//!
//! One listening socket per build, owned by a [`ServerHandle`]:
//!
//! ```text
//! start() ──► ServerHandle ──► base_url() used by the crawl
//!                   │
//!                   └─► close(self) after packaging: unblock + join, once
//! ```
//!
//! Requests are served from a small thread pool so a slow render only holds
//! its own worker.

mod response;

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use percent_encoding::percent_decode_str;
use tiny_http::{Request, Server};

use crate::config::{PortPolicy, ServeConfig};
use crate::render::{Render, RouteTable};
use crate::{debug, log};

/// Owned listening socket plus its request loop.
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    request_loop: Option<JoinHandle<()>>,
}

/// Bind the render server and start serving in the background.
pub fn start(
    config: &ServeConfig,
    routes: Arc<dyn RouteTable>,
    renderer: Arc<dyn Render>,
) -> Result<ServerHandle> {
    let (server, addr) = bind(config)?;
    let server = Arc::new(server);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("render-{i}"))
        .build()
        .context("failed to create request pool")?;

    let request_loop = {
        let server = Arc::clone(&server);
        thread::Builder::new()
            .name("render-server".into())
            .spawn(move || run_request_loop(&server, &pool, &routes, &renderer))
            .context("failed to spawn request loop")?
    };

    log!("serve"; "http://{}", addr);

    Ok(ServerHandle {
        server,
        addr,
        request_loop: Some(request_loop),
    })
}

/// Bind according to the port policy. A fixed port is never substituted.
fn bind(config: &ServeConfig) -> Result<(Server, SocketAddr)> {
    let policy = config.port_policy();
    let requested = SocketAddr::new(config.interface, policy.port());

    let server = Server::http(requested).map_err(|e| match policy {
        PortPolicy::Fixed(port) => anyhow!("failed to bind fixed port {port} on {}: {e}", config.interface),
        PortPolicy::Free => anyhow!("failed to bind a free port on {}: {e}", config.interface),
    })?;

    let addr = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow!("render server is not listening on an IP address"))?;

    Ok((server, addr))
}

impl ServerHandle {
    /// Base URL request paths are appended to.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Release the socket and wait for the request loop to exit.
    pub fn close(mut self) {
        self.shutdown();
        debug!("serve"; "closed {}", self.addr);
    }

    fn shutdown(&mut self) {
        let Some(request_loop) = self.request_loop.take() else {
            return;
        };
        self.server.unblock();
        if request_loop.join().is_err() {
            log!("serve"; "request loop panicked");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_request_loop(
    server: &Server,
    pool: &rayon::ThreadPool,
    routes: &Arc<dyn RouteTable>,
    renderer: &Arc<dyn Render>,
) {
    for request in server.incoming_requests() {
        let routes = Arc::clone(routes);
        let renderer = Arc::clone(renderer);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, routes.as_ref(), renderer.as_ref()) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

fn handle_request(request: Request, routes: &dyn RouteTable, renderer: &dyn Render) -> Result<()> {
    if !response::is_get_or_head(&request) {
        return response::respond_method_not_allowed(request);
    }

    let path = normalize_url(request.url());
    let Some(binding) = routes.resolve(&path) else {
        debug!("serve"; "404 {}", path);
        return response::respond_not_found(request);
    };

    match renderer.render(&binding) {
        Ok(html) => response::respond_html(request, html),
        Err(e) => {
            log!("error"; "render {}: {:#}", path, e);
            response::respond_render_error(request, &e)
        }
    }
}

/// Decode the request target into a route path: no query, leading `/`.
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_or_else(|_| path.to_owned(), std::borrow::Cow::into_owned);

    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RouteBinding;
    use std::net::{IpAddr, Ipv4Addr};

    struct OneRoute;

    impl RouteTable for OneRoute {
        fn resolve(&self, request_path: &str) -> Option<RouteBinding> {
            matches!(request_path, "/about us" | "/broken").then(|| RouteBinding {
                site: "root".into(),
                view: request_path.trim_start_matches('/').into(),
                template: request_path.into(),
                request_path: request_path.into(),
                data: serde_json::Value::Null,
            })
        }

        fn len(&self) -> usize {
            2
        }
    }

    struct Echo;

    impl Render for Echo {
        fn render(&self, binding: &RouteBinding) -> Result<String> {
            if binding.view == "broken" {
                anyhow::bail!("template <broken> failed");
            }
            Ok(format!("<p>{}</p>", binding.view))
        }
    }

    fn serve_config(port: Option<u16>) -> ServeConfig {
        ServeConfig {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            workers: 2,
        }
    }

    fn start_echo(port: Option<u16>) -> Result<ServerHandle> {
        start(&serve_config(port), Arc::new(OneRoute), Arc::new(Echo))
    }

    /// The listener is released once the server's accept thread exits.
    fn rebind(port: u16) -> ServerHandle {
        for _ in 0..50 {
            if let Ok(handle) = start_echo(Some(port)) {
                return handle;
            }
            thread::sleep(std::time::Duration::from_millis(20));
        }
        panic!("port {port} was not released");
    }

    #[test]
    fn test_free_port_binds_are_distinct() {
        let first = start_echo(None).unwrap();
        let second = start_echo(None).unwrap();

        assert_ne!(first.addr.port(), 0);
        assert_ne!(second.addr.port(), 0);
        assert_ne!(first.addr.port(), second.addr.port());

        first.close();
        second.close();
    }

    #[test]
    fn test_fixed_port_in_use_is_error() {
        let first = start_echo(None).unwrap();
        let port = first.addr.port();

        assert!(start_echo(Some(port)).is_err());

        first.close();
        let again = rebind(port);
        assert_eq!(again.addr.port(), port);
        again.close();
    }

    #[test]
    fn test_drop_releases_socket() {
        let port = {
            let handle = start_echo(None).unwrap();
            handle.addr.port()
        };
        let again = rebind(port);
        again.close();
    }

    #[tokio::test]
    async fn test_responses() {
        let handle = start_echo(None).unwrap();
        let client = reqwest::Client::new();
        let base = handle.base_url();

        let ok = client.get(format!("{base}/about%20us?x=1")).send().await.unwrap();
        assert_eq!(ok.status(), 200);
        assert_eq!(
            ok.headers()["content-type"].to_str().unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(ok.text().await.unwrap(), "<p>about us</p>");

        let missing = client.get(format!("{base}/nope")).send().await.unwrap();
        assert_eq!(missing.status(), 404);

        let broken = client.get(format!("{base}/broken")).send().await.unwrap();
        assert_eq!(broken.status(), 500);
        assert!(broken.text().await.unwrap().contains("&lt;broken&gt;"));

        let post = client.post(format!("{base}/about%20us")).send().await.unwrap();
        assert_eq!(post.status(), 405);

        handle.close();
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url("/a%20b?q=1"), "/a b");
        assert_eq!(normalize_url("/x#frag"), "/x");
        assert_eq!(normalize_url("rel"), "/rel");
    }
}
