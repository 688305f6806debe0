use std::net::SocketAddr;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use stagehand_core::{Configuration, Environment, ServiceProvider};
use tower::ServiceExt;

use super::context::HostContext;
use crate::errors::HttpResult;
use crate::server::start_server;

/// A fully wired application
///
/// Requests can be dispatched in-process with [`WebHost::handle`] or the
/// host can be bound to a socket with [`WebHost::serve`].
#[derive(Debug, Clone)]
pub struct WebHost {
    services: ServiceProvider,
    context: HostContext,
    router: Router,
}

impl WebHost {
    pub(crate) fn new(services: ServiceProvider, context: HostContext, router: Router) -> Self {
        Self {
            services,
            context,
            router,
        }
    }

    /// Root service provider
    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    pub fn configuration(&self) -> &Configuration {
        self.context.configuration()
    }

    pub fn environment(&self) -> &Environment {
        self.context.environment()
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Dispatch a request through the router without a network listener
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    pub async fn serve(self, addr: SocketAddr) -> HttpResult<()> {
        start_server(addr, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataStore, DbContext, DbContextOptions, ServiceCollectionDataExt};
    use crate::hosting::{AppState, Inject, RequestServices, Startup, WebHostBuilder};
    use axum::http::StatusCode;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use serde_json::json;
    use stagehand_core::{CoreError, ServiceCollection};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NotesContext {
        store: Arc<dyn DataStore>,
    }

    impl DbContext for NotesContext {
        fn new(store: Arc<dyn DataStore>) -> Self {
            Self { store }
        }

        fn store(&self) -> &Arc<dyn DataStore> {
            &self.store
        }
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct FormalGreeter;

    impl Greeter for FormalGreeter {
        fn greet(&self) -> String {
            "Good day".to_string()
        }
    }

    struct CasualGreeter;

    impl Greeter for CasualGreeter {
        fn greet(&self) -> String {
            "Hey".to_string()
        }
    }

    struct RequestId(usize);

    #[derive(Default)]
    struct NotesApp;

    impl Startup for NotesApp {
        type DbContext = NotesContext;

        fn configure_services(
            &self,
            _context: &crate::hosting::HostContext,
            services: &mut ServiceCollection,
        ) -> Result<(), CoreError> {
            let counter = Arc::new(AtomicUsize::new(0));
            services
                .add_singleton(|_| Ok(Arc::new(FormalGreeter) as Arc<dyn Greeter>))
                .add_scoped(move |_| Ok(Arc::new(RequestId(counter.fetch_add(1, Ordering::SeqCst)))))
                .add_db_context::<NotesContext, _>(|options| {
                    options.use_in_memory_database("Notes");
                })?;
            Ok(())
        }

        fn configure_routes(&self, router: Router<AppState>) -> Router<AppState> {
            router
                .route("/greeting", get(greeting))
                .route("/request-id", get(request_id))
                .route("/environment", get(environment))
        }
    }

    async fn greeting(Inject(greeter): Inject<dyn Greeter>) -> String {
        greeter.greet()
    }

    async fn request_id(RequestServices(services): RequestServices) -> String {
        let first = services.resolve::<RequestId>().unwrap();
        let second = services.resolve::<RequestId>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        first.0.to_string()
    }

    async fn environment(axum::extract::State(state): axum::extract::State<AppState>) -> String {
        state.context.environment().to_string()
    }

    async fn get_body(host: &WebHost, uri: &str) -> (StatusCode, String) {
        let response = host
            .handle(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn builder(dir: &tempfile::TempDir) -> WebHostBuilder<NotesApp> {
        WebHostBuilder::<NotesApp>::new()
            .use_environment(Environment::Testing)
            .use_content_root(dir.path())
    }

    #[tokio::test]
    async fn test_routes_resolve_services() {
        let dir = tempfile::tempdir().unwrap();
        let host = builder(&dir).build().unwrap();

        assert_eq!(get_body(&host, "/greeting").await, (StatusCode::OK, "Good day".to_string()));
        assert_eq!(get_body(&host, "/environment").await.1, "Testing");
        assert_eq!(get_body(&host, "/missing").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_each_request_gets_its_own_scope() {
        let dir = tempfile::tempdir().unwrap();
        let host = builder(&dir).build().unwrap();

        let first = get_body(&host, "/request-id").await.1;
        let second = get_body(&host, "/request-id").await.1;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_test_services_run_after_application_services() {
        let dir = tempfile::tempdir().unwrap();
        let host = builder(&dir)
            .configure_services(|_, services| {
                services.add_singleton(|_| Ok(Arc::new(FormalGreeter) as Arc<dyn Greeter>));
            })
            .configure_test_services(|_, services| {
                services.add_singleton(|_| Ok(Arc::new(CasualGreeter) as Arc<dyn Greeter>));
            })
            .build()
            .unwrap();

        assert_eq!(get_body(&host, "/greeting").await.1, "Hey");
        assert_eq!(host.services().resolve_all::<dyn Greeter>().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_environment_settings_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("appsettings.json"),
            json!({ "notes": { "title": "base", "limit": 10 } }).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("appsettings.Testing.json"),
            json!({ "notes": { "title": "testing" } }).to_string(),
        )
        .unwrap();

        let host = builder(&dir)
            .configure_app_configuration(|_, configuration| {
                configuration.add_in_memory(json!({ "notes": { "limit": 25 } }));
            })
            .build()
            .unwrap();

        assert_eq!(host.configuration().get::<String>("notes.title").unwrap(), "testing");
        assert_eq!(host.configuration().get::<u32>("notes.limit").unwrap(), 25);
        assert!(host.services().resolve::<Configuration>().is_ok());
    }

    #[tokio::test]
    async fn test_hosts_do_not_share_in_memory_data() {
        let dir = tempfile::tempdir().unwrap();
        let first = builder(&dir).build().unwrap();
        let second = builder(&dir).build().unwrap();

        let first_scope = first.services().create_scope();
        first_scope
            .resolve::<NotesContext>()
            .unwrap()
            .store()
            .insert("notes", "1", json!({ "text": "hello" }))
            .await
            .unwrap();

        let second_scope = second.services().create_scope();
        let notes = second_scope
            .resolve::<NotesContext>()
            .unwrap()
            .store()
            .list("notes")
            .await
            .unwrap();
        assert!(notes.is_empty());
        assert!(first
            .services()
            .resolve::<DbContextOptions<NotesContext>>()
            .unwrap()
            .provider()
            .is_in_memory());
    }
}
