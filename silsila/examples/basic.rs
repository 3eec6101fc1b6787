//! Basic example of the silsila registry: layered wiring with a
//! parent application registry and a per-request child override.

use std::sync::Arc;

use silsila::{RegistryBuilder, Result};

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct QuietLogger;

impl Logger for QuietLogger {
    fn log(&self, _msg: &str) {}
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("executing: {sql}"));
        format!("results from {}", self.url)
    }
}

struct UserService {
    db: Arc<Database>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("silsila=debug")
        .init();

    // Application-level registry.
    let mut app = RegistryBuilder::new();
    app.register_instance(String::from("postgres://localhost/myapp"))
        .register_singleton::<Arc<dyn Logger>>(|_| Ok(Arc::new(ConsoleLogger)))
        .register_singleton::<Arc<Database>>(|r| {
            let url: String = r.get()?;
            let logger: Arc<dyn Logger> = r.get()?;
            Ok(Arc::new(Database { url, logger }))
        })
        .register::<UserService>(|r| {
            let db: Arc<Database> = r.get()?;
            Ok(UserService { db })
        });

    let registry = app.registry();
    let service: UserService = registry.get()?;
    println!("{}", service.get_user(42));

    // A child registry overriding the logger. Transient factories found
    // in the parent resolve their dependencies starting from the child,
    // so anything built through this registry logs quietly.
    let mut quiet = RegistryBuilder::with_parent(registry);
    quiet.register::<Arc<dyn Logger>>(|_| Ok(Arc::new(QuietLogger)));

    let quiet_registry = quiet.registry();
    let logger: Arc<dyn Logger> = quiet_registry.get()?;
    logger.log("this line is swallowed by the override");

    let url: String = quiet_registry.get()?;
    println!("child still sees the parent's config: {url}");

    Ok(())
}
