//! Local preview server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::{Site, CONFIG_FILE};

/// Script appended before `</body>` of served pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

struct ServerState {
    public_dir: PathBuf,
    /// Deployment base the pages were built with, always ends with '/'
    base: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Serve the output directory, rebuilding on source changes when `watch`
/// is set
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: site.public_dir.clone(),
        base: site.config.base.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .with_state(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, site.config.base);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_rebuild(site, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Paths whose changes trigger a rebuild
fn watch_targets(site: &Site) -> Vec<(PathBuf, RecursiveMode)> {
    vec![
        (site.posts_dir.clone(), RecursiveMode::Recursive),
        (site.static_dir.clone(), RecursiveMode::Recursive),
        (site.nav_file.clone(), RecursiveMode::NonRecursive),
        (site.timestamps_file.clone(), RecursiveMode::NonRecursive),
        (site.base_dir.join(CONFIG_FILE), RecursiveMode::NonRecursive),
    ]
}

fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains("node_modules")
        && !path_str.ends_with('~')
}

fn watch_and_rebuild(site: Site, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for (path, mode) in watch_targets(&site) {
        if path.exists() {
            debouncer.watcher().watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events.iter().filter(|e| is_relevant(&e.path)).collect();
                if changed.is_empty() {
                    continue;
                }

                println!();
                for event in &changed {
                    println!("📝 File changed: {}", event.path.display());
                }

                println!("\n🔄 Rebuilding...");
                // Config edits may move directories
                let rebuilt = if changed
                    .iter()
                    .any(|e| e.path.ends_with(CONFIG_FILE))
                {
                    reload_site(&site).and_then(|s| s.build(false))
                } else {
                    site.build(false)
                };

                match rebuilt {
                    Ok(_) => {
                        println!("✅ Rebuilt successfully!");
                        let _ = reload_tx.send(());
                    }
                    Err(e) => println!("❌ Build failed: {:#}", e),
                }
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Reload the config from disk, keeping the base the server started with
fn reload_site(site: &Site) -> Result<Site> {
    let mut fresh = Site::new(&site.base_dir)?;
    fresh.set_base(&site.config.base);
    Ok(fresh)
}

async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Request path with the deployment base removed
fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    let root = base.trim_end_matches('/');
    if root.is_empty() {
        return path;
    }
    match path.strip_prefix(root) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// File under `public_dir` for a request path, `None` when nothing matches
fn resolve_path(public_dir: &Path, path: &str) -> Option<PathBuf> {
    let clean = path.trim_start_matches('/');
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let candidate = public_dir.join(clean);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }

    let with_html = public_dir.join(format!("{}.html", clean.trim_end_matches('/')));
    with_html.is_file().then_some(with_html)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false)
}

async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = strip_base(request.uri().path(), &state.base).to_string();

    let Some(file_path) = resolve_path(&state.public_dir, &path) else {
        return not_found(&state).await;
    };

    if is_html(&file_path) {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) if state.live_reload => Html(inject_live_reload(&content)).into_response(),
            Ok(content) => Html(content).into_response(),
            Err(_) => not_found(&state).await,
        }
    } else {
        let mut request = request;
        if let Ok(uri) = path.parse::<Uri>() {
            *request.uri_mut() = uri;
        }
        let mut service = ServeDir::new(&state.public_dir);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// `404.html` from the output directory when present
async fn not_found(state: &ServerState) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(content) => {
            let body = if state.live_reload {
                inject_live_reload(&content)
            } else {
                content
            };
            (StatusCode::NOT_FOUND, Html(body)).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/hello")).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("posts/hello/index.html"), "hello").unwrap();
        fs::write(root.join("about.html"), "about").unwrap();

        assert_eq!(resolve_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(
            resolve_path(root, "/posts/hello"),
            Some(root.join("posts/hello/index.html"))
        );
        assert_eq!(resolve_path(root, "/about"), Some(root.join("about.html")));
        assert_eq!(resolve_path(root, "/missing"), None);
        assert_eq!(resolve_path(root, "/../etc/passwd"), None);
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("/x/posts/a", "/x/"), "/posts/a");
        assert_eq!(strip_base("/x", "/x/"), "/");
        assert_eq!(strip_base("/x/", "/x/"), "/");
        assert_eq!(strip_base("/xy/a", "/x/"), "/xy/a");
        assert_eq!(strip_base("/posts/a", "/"), "/posts/a");
    }

    #[test]
    fn test_base_prefixed_request_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/hello")).unwrap();
        fs::write(root.join("posts/hello/index.html"), "hello").unwrap();

        let path = strip_base("/newbie-space/posts/hello", "/newbie-space/");
        assert_eq!(
            resolve_path(root, path),
            Some(root.join("posts/hello/index.html"))
        );
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>x</body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));
        assert!(inject_live_reload("plain").contains("/__livereload"));
    }

    #[test]
    fn test_watch_targets_include_sources() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let targets: Vec<_> = watch_targets(&site).into_iter().map(|(p, _)| p).collect();
        assert!(targets.contains(&site.posts_dir));
        assert!(targets.contains(&site.nav_file));
        assert!(targets.contains(&dir.path().join("site.yml")));
    }
}
