//! Common test utilities for E2E tests

#![allow(dead_code)]

use inkpost::{AppState, config};
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const PASSWORD: &str = "correct horse battery staple";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    /// Anonymous client (no cookie store)
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-that-is-32-bytes!".to_string(),
                session_max_age: 604800,
            },
            site: config::SiteConfig {
                title: "Test Blog".to_string(),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        inkpost::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = inkpost::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }

    /// Get full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Fresh browser-like client: keeps cookies, does not follow redirects
    pub fn browser(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap()
    }

    pub async fn register(
        &self,
        client: &reqwest::Client,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(self.url("/register"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    pub async fn login(
        &self,
        client: &reqwest::Client,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    /// Register a user, log in with a new browser and return it with the user id
    pub async fn signup(&self, username: &str) -> (reqwest::Client, i64) {
        let client = self.browser();
        let response = self.register(&client, username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let response = self.login(&client, username, PASSWORD).await;
        assert_eq!(location(&response), "/");

        let user = self
            .state
            .db
            .get_user_by_username(username)
            .await
            .unwrap()
            .expect("registered user exists");
        (client, user.id)
    }

    /// Publish a post through the form and return its id
    pub async fn create_post(
        &self,
        client: &reqwest::Client,
        title: &str,
        content: &str,
        public: bool,
        tags: &str,
    ) -> i64 {
        let mut form = vec![("title", title), ("content", content), ("tags", tags)];
        if public {
            form.push(("public", "1"));
        }
        let response = client
            .post(self.url("/post/new"))
            .form(&form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        location(&response)
            .strip_prefix("/post/")
            .and_then(|id| id.parse().ok())
            .expect("redirect to the new post")
    }

    /// GET a page and return status and body
    pub async fn page(&self, client: &reqwest::Client, path: &str) -> (StatusCode, String) {
        let response = client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    /// POST an empty form
    pub async fn submit(&self, client: &reqwest::Client, path: &str) -> reqwest::Response {
        let empty: [(&str, &str); 0] = [];
        client
            .post(self.url(path))
            .form(&empty)
            .send()
            .await
            .unwrap()
    }
}

/// The `Location` header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
