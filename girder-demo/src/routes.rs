use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use girder_http::Client;
use girder_server::{Module, Problem};
use girder_store::{PostgresStore, RedisStore};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

const TODO_BASE: &str = "https://jsonplaceholder.typicode.com/todos";

#[derive(Clone)]
pub struct DemoState {
    pub postgres: PostgresStore,
    pub redis: RedisStore,
    pub client: Client,
}

/// The `/demo` routes: one handler per backing dependency.
pub fn module(state: DemoState) -> Module {
    Module::new("demo", move |router| {
        router.merge(
            Router::new()
                .route("/pg", get(query_postgres))
                .route("/redis", get(increment_counter))
                .route("/http/{id}", get(fetch_todo))
                .with_state(state),
        )
    })
}

#[derive(Debug, Serialize)]
struct DbResponse {
    result: i32,
}

async fn query_postgres(
    State(state): State<DemoState>,
) -> Result<Json<DbResponse>, Problem> {
    let result: i32 = sqlx::query_scalar("SELECT 1 + 1")
        .fetch_one(state.postgres.pool())
        .await
        .map_err(|e| {
            error!(error = %e, "Database query failed");
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "The database is unavailable")
        })?;
    Ok(Json(DbResponse { result }))
}

#[derive(Debug, Serialize)]
struct RedisResponse {
    count: i64,
}

async fn increment_counter(
    State(state): State<DemoState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RedisResponse>, Problem> {
    let key = params
        .get("key")
        .filter(|k| !k.is_empty())
        .map(String::as_str)
        .unwrap_or("key");
    let mut conn = state.redis.pool().get().await.map_err(|e| {
        error!(error = %e, "Redis checkout failed");
        Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "The cache is unavailable")
    })?;
    let count: i64 = bb8_redis::redis::cmd("INCR")
        .arg(key)
        .query_async(&mut *conn)
        .await
        .map_err(|e| Problem::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(RedisResponse { count }))
}

#[derive(Debug, Serialize, Deserialize)]
struct Todo {
    #[serde(rename = "userId")]
    user_id: i64,
    id: i64,
    title: String,
    completed: bool,
}

/// Fetches a todo from a third-party API through the status-validated client.
async fn fetch_todo(
    State(state): State<DemoState>,
    Path(id): Path<u32>,
) -> Result<Json<Todo>, Problem> {
    let url = format!("{TODO_BASE}/{id}")
        .parse()
        .map_err(|_| Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not build request"))?;
    let request = reqwest::Request::new(reqwest::Method::GET, url);
    let response = state
        .client
        .execute(request)
        .await
        .map_err(|e| Problem::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let todo = response
        .json::<Todo>()
        .await
        .map_err(|_| Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not parse response"))?;
    Ok(Json(todo))
}
