//! Demonstrates using TypeIndexedMap as a service locator.
//!
//! TypeIndexedMap suits service location because:
//! - Type IS the key - services are registered under their interface
//! - Registration is checked - an implementation must be a subtype of its interface
//! - Immutable - a reconfigured locator never disturbs components holding the old one
//!
//! Run with: cargo run --example service_locator

use sovran_typebound::{subtypes, MapError, Reify, Shared, TypeIndexedMap, TypeKey, Unbounded};
use std::sync::Arc;

type Services = TypeIndexedMap<Unbounded, Shared>;

fn main() -> Result<(), MapError> {
    // Register services under their interfaces
    let services = Services::new()
        .insert(TypeKey::<dyn Logger>::new(), Arc::new(ConsoleLogger::new("app")))
        .insert(TypeKey::<dyn Storage>::new(), Arc::new(MemoryStorage))
        .insert_inferred(Arc::new(DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "myapp".to_string(),
        }));

    // Components take the locator they were built with
    let users = UserService::new(services.clone());
    users.create_user("alice")?;
    users.create_user("bob")?;

    // Reconfiguring produces a new locator; `users` keeps the old logger
    let quiet = services.insert(TypeKey::<dyn Logger>::new(), Arc::new(ConsoleLogger::new("quiet")));
    let audited = UserService::new(quiet);
    audited.create_user("carol")?;
    users.create_user("dave")?;

    // Missing services are reported by type
    match services.fetch::<dyn Mailer>() {
        Ok(mailer) => mailer.send("admin", "ready"),
        Err(MapError::KeyNotFound(ty)) => println!("\nNo service registered for {}", ty),
    }

    println!("\nRegistered services:");
    for ty in services.keys() {
        println!("  {}", ty);
    }

    Ok(())
}

// ============================================================================
// Service interfaces and implementations
// ============================================================================

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

trait Storage: Send + Sync {
    fn save(&self, table: &str, row: &str) -> String;
}

trait Mailer: Send + Sync {
    fn send(&self, to: &str, body: &str);
}

struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("[{}] {}", self.prefix, message);
    }
}

struct MemoryStorage;

impl Storage for MemoryStorage {
    fn save(&self, table: &str, row: &str) -> String {
        format!("{}#{}", table, row)
    }
}

impl Reify for dyn Logger {}
impl Reify for dyn Storage {}
impl Reify for dyn Mailer {}
subtypes! {
    ConsoleLogger: dyn Logger;
    MemoryStorage: dyn Storage;
}

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug)]
struct DatabaseConfig {
    host: String,
    port: u16,
    database: String,
}

impl Reify for DatabaseConfig {}

// ============================================================================
// Services that consume dependencies from the locator
// ============================================================================

struct UserService {
    services: Services,
}

impl UserService {
    fn new(services: Services) -> Self {
        Self { services }
    }

    fn create_user(&self, username: &str) -> Result<(), MapError> {
        let logger = self.services.fetch::<dyn Logger>()?;
        let storage = self.services.fetch::<dyn Storage>()?;
        let db = self.services.fetch::<DatabaseConfig>()?;

        logger.log(&format!("Creating user: {}", username));
        let id = storage.save("users", username);
        println!(
            "  -> Saved {} to {}.users on {}:{}",
            id, db.database, db.host, db.port
        );
        Ok(())
    }
}
