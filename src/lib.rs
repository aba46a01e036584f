#[macro_use]
extern crate rocket;

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod search;

use crate::config::DatabaseConfig;
use crate::db::{EmailDb, EmailStore};
use crate::request_logger::RequestLogger;
use crate::search::SearchClient;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, Cors, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Install the global logger once; later calls are no-ops.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

fn cors() -> Result<Cors, rocket_cors::Error> {
    CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .to_cors()
}

/// Build the read-only query server.
///
/// The `emails_db` pool is configured from `database`; the search client is
/// shared with the handlers as managed state.
pub fn rocket(database: &DatabaseConfig, search: SearchClient) -> Result<Rocket<Build>, rocket_cors::Error> {
    init_logger();

    let figment = rocket::Config::figment()
        .merge(("databases.emails_db.url", database.url.as_str()))
        .merge(("databases.emails_db.max_connections", database.max_connections));

    let rocket = rocket::custom(figment)
        .attach(RequestLogger)
        .attach(EmailDb::init())
        .attach(cors()?)
        .attach(AdHoc::try_on_ignite("Manage Email Store", |rocket| async move {
            match EmailDb::fetch(&rocket) {
                Some(db) => {
                    let store = EmailStore::new((**db).clone());
                    Ok(rocket.manage(store))
                }
                None => {
                    log::error!("emails_db pool not available");
                    Err(rocket)
                }
            }
        }))
        .manage(search)
        .mount(
            "/",
            openapi_get_routes![
                routes::health::index,
                routes::health::health_check,
                routes::emails::list_emails,
                routes::emails::search_emails,
                routes::emails::get_email,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../openapi.json".to_owned(),
                ..Default::default()
            }),
        );

    Ok(rocket)
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::db::EmailStore;
    use crate::search::SearchClient;
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use sqlx::PgPool;

    pub use database::{TestDatabase, TestDatabaseError};

    pub mod database {
        use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use sqlx::{ConnectOptions, Executor, PgPool};
        use thiserror::Error;
        use tokio::runtime::Handle;
        use uuid::Uuid;

        const SCHEMA: &str = include_str!("../schema/emails.sql");

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("TEST_DATABASE_URL not set")]
            MissingUrl,
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
        }

        /// Throwaway database created on the server named by
        /// `TEST_DATABASE_URL` and loaded with the `emails` schema.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
        }

        impl TestDatabase {
            pub async fn new_from_env() -> Result<Self, TestDatabaseError> {
                let url = std::env::var("TEST_DATABASE_URL")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .ok_or(TestDatabaseError::MissingUrl)?;
                Self::new(&url).await
            }

            pub async fn new(url: &str) -> Result<Self, TestDatabaseError> {
                let base_options: PgConnectOptions = url.parse()?;
                let base_options = base_options.log_statements(log::LevelFilter::Off);
                let admin_options = base_options.clone().database("postgres");

                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await?;

                let database_name = format!("emails_test_{}", Uuid::new_v4().simple());
                sqlx::query(&format!("CREATE DATABASE \"{database_name}\""))
                    .execute(&admin_pool)
                    .await?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(base_options.database(&database_name))
                    .await?;
                pool.execute(SCHEMA).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name,
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close the pool and drop the database.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }
                drop_database(self.admin_options.clone(), &self.database_name).await?;
                Ok(())
            }
        }

        async fn drop_database(
            admin_options: PgConnectOptions,
            database_name: &str,
        ) -> Result<(), sqlx::Error> {
            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(admin_options)
                .await?;
            sqlx::query(&format!("DROP DATABASE IF EXISTS \"{database_name}\" WITH (FORCE)"))
                .execute(&admin_pool)
                .await?;
            admin_pool.close().await;
            Ok(())
        }

        impl Drop for TestDatabase {
            fn drop(&mut self) {
                let Some(pool) = self.pool.take() else {
                    return;
                };
                let admin_options = self.admin_options.clone();
                let database_name = self.database_name.clone();
                if let Ok(handle) = Handle::try_current() {
                    handle.spawn(async move {
                        pool.close().await;
                        let _ = drop_database(admin_options, &database_name).await;
                    });
                }
            }
        }
    }

    /// Rocket instance for route tests: random port, logging off, and only
    /// the state a test asks for.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        email_store: Option<EmailStore>,
        search_client: Option<SearchClient>,
    }

    impl TestRocketBuilder {
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                ..Self::default()
            }
        }

        /// Mount routes at the root, as the production server does.
        pub fn mount_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/".to_string(), routes));
            self
        }

        pub fn manage_email_store(mut self, pool: PgPool) -> Self {
            self.email_store = Some(EmailStore::new(pool));
            self
        }

        pub fn manage_search_client(mut self, client: SearchClient) -> Self {
            self.search_client = Some(client);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }
            if let Some(store) = self.email_store {
                rocket = rocket.manage(store);
            }
            if let Some(client) = self.search_client {
                rocket = rocket.manage(client);
            }

            rocket
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
