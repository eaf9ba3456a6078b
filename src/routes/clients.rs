use crate::domain::{ClientAdd, ClientProfile};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum ClientError {
    #[error("a client with this name already exists")]
    ClientExists,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

debug_for_error!(ClientError);

impl ResponseError for ClientError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClientError::ClientExists => StatusCode::CONFLICT,
            ClientError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(name = "Registering a client", skip(client, pool), fields(name = %client.name))]
pub async fn add_client(
    client: web::Json<ClientAdd>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ClientError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO clients (id, name, contact_person, email, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(client.name.as_ref())
    .bind(&client.contact_person)
    .bind(&client.email)
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        let code = e
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.to_string()));
        match code.as_deref() {
            Some("23505") => ClientError::ClientExists,
            _ => ClientError::UnexpectedError(ClientDbError(e).into()),
        }
    })?;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

#[tracing::instrument(name = "Listing clients", skip(pool))]
pub async fn get_clients(pool: web::Data<PgPool>) -> Result<HttpResponse, ClientError> {
    let clients = sqlx::query_as::<_, ClientProfile>(
        "SELECT id, name, contact_person, email, created_at FROM clients ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| ClientError::UnexpectedError(ClientDbError(e).into()))?;

    Ok(HttpResponse::Ok().json(clients))
}

pub struct ClientDbError(sqlx::Error);

debug_for_error!(ClientDbError);
error_for_error!(ClientDbError);
display_for_error!(
    ClientDbError,
    "A database error was encountered while trying to access the clients table."
);
