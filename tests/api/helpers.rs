use drillreport::configuration::{DatabaseSettings, get_configuration};
use drillreport::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use serde_json::json;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use tracing_subscriber::filter::LevelFilter;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = LevelFilter::INFO;
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

impl TestApp {
    pub async fn health_check(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/health_check", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// POST /shift as the given actor.
    pub async fn add_shift_as<T: serde::Serialize>(
        &self,
        shift: &T,
        actor: &str,
        role: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/shift", &self.address))
            .header("x-actor", actor)
            .header("x-actor-role", role)
            .json(shift)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// POST /shift as a supervisor, the common case.
    pub async fn add_shift<T: serde::Serialize>(&self, shift: &T) -> reqwest::Response {
        self.add_shift_as(shift, "A. Supervisor", "supervisor").await
    }

    /// POST /shift and unwrap the returned id.
    pub async fn add_shift_expect_id<T: serde::Serialize>(&self, shift: &T) -> Uuid {
        let response = self.add_shift(shift).await;
        assert_eq!(201, response.status().as_u16());
        let body: serde_json::Value = response.json().await.expect("Body was not JSON.");
        body["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("Response did not contain a shift id.")
    }

    pub async fn update_shift<T: serde::Serialize>(
        &self,
        shift_id: Uuid,
        shift: &T,
        actor: &str,
        role: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .put(format!("{}/shift/{}", &self.address, shift_id))
            .header("x-actor", actor)
            .header("x-actor-role", role)
            .json(shift)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn workflow_action(
        &self,
        shift_id: Uuid,
        action: &str,
        actor: &str,
        role: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/shift/{}/{}", &self.address, shift_id, action))
            .header("x-actor", actor)
            .header("x-actor-role", role)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn workflow_action_with_comment(
        &self,
        shift_id: Uuid,
        action: &str,
        actor: &str,
        role: &str,
        comment: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/shift/{}/{}", &self.address, shift_id, action))
            .header("x-actor", actor)
            .header("x-actor-role", role)
            .json(&json!({ "comment": comment }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_shift(&self, shift_id: Uuid) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/shift/{}", &self.address, shift_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_approvals(&self, shift_id: Uuid) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/shift/{}/approvals", &self.address, shift_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn query_shifts<T: AsRef<str> + std::fmt::Display>(
        &self,
        query_string: T,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/shifts?{}", &self.address, query_string))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn add_client<T: serde::Serialize>(&self, client: &T) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/client", &self.address))
            .json(client)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_clients(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/clients", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_report<T: AsRef<str> + std::fmt::Display>(
        &self,
        path_and_query: T,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", &self.address, path_and_query))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Creates a shift and walks it to the given workflow stage.
    pub async fn shift_at_status<T: serde::Serialize>(&self, shift: &T, status: &str) -> Uuid {
        let shift_id = self.add_shift_expect_id(shift).await;
        let steps: &[(&str, &str, &str)] = match status {
            "draft" => &[],
            "submitted" => &[("submit", "A. Supervisor", "supervisor")],
            "manager_approved" => &[
                ("submit", "A. Supervisor", "supervisor"),
                ("approve", "M. Anager", "manager"),
            ],
            "client_approved" => &[
                ("submit", "A. Supervisor", "supervisor"),
                ("approve", "M. Anager", "manager"),
                ("approve", "C. Lient", "client"),
            ],
            other => panic!("unsupported target status `{other}`"),
        };
        for (action, actor, role) in steps {
            let response = self.workflow_action(shift_id, action, actor, role).await;
            assert_eq!(200, response.status().as_u16());
        }
        shift_id
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{port}");

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;
    let server = drillreport::startup::run(listener, connection_pool.clone())
        .expect("Failed to bind address");
    tokio::spawn(server);
    TestApp {
        address,
        db_pool: connection_pool,
    }
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres.");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}
