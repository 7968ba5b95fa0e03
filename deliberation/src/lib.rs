//! Community deliberation: issues with threaded, versioned comments,
//! proposals that can be accepted or rejected, and upcoming meeting
//! scheduling, served with Rocket on top of Diesel and PostgreSQL.
//!
//! Mount everything with [`rocket()`], or attach to an existing instance with
//! [`stage()`]. The pool is configured under `databases.deliberation`.
#[macro_use]
extern crate diesel;

pub mod access_control;
pub mod config;
pub mod datetime;
pub mod error;
pub mod forms;
pub mod helper;
pub mod models;
pub mod publish;
pub mod schema;
pub mod scope;
pub mod templates;
pub mod views;

use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rocket::fairing::{self, AdHoc};
use rocket::{Build, Rocket};
use rocket_sync_db_pools::database;

use crate::config::AppConfig;

#[database("deliberation")]
pub struct Db(PgConnection);

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Applies pending migrations, returning how many ran.
pub fn run_migrations(conn: &mut PgConnection) -> Result<usize, MigrationError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
}

async fn migrate(rocket: Rocket<Build>) -> fairing::Result {
    let db = match Db::get_one(&rocket).await {
        Some(db) => db,
        None => {
            log::error!("no database connection available for migrations");
            return Err(rocket);
        }
    };

    match db.run(run_migrations).await {
        Ok(0) => Ok(rocket),
        Ok(applied) => {
            log::info!("applied {} database migration(s)", applied);
            Ok(rocket)
        }
        Err(e) => {
            log::error!("failed to run database migrations: {}", e);
            Err(rocket)
        }
    }
}

/// Attaches the pool, migrations, configuration and routes.
pub fn stage(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(Db::fairing())
        .attach(AdHoc::try_on_ignite("Database Migrations", migrate))
        .attach(AdHoc::config::<AppConfig>())
        .mount("/", views::routes())
}

pub fn rocket() -> Rocket<Build> {
    stage(rocket::build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_errors_keep_their_type() {
        let err: MigrationError = Box::new(diesel::result::Error::RollbackTransaction);
        assert!(matches!(
            err.downcast_ref::<diesel::result::Error>(),
            Some(diesel::result::Error::RollbackTransaction)
        ));
    }
}
