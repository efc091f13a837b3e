//! HTTP route handlers for the memories API

use super::auth::Principal;
use super::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ============================================================================
// Health Check
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============================================================================
// Memories
// ============================================================================

/// Full memory record, as stored
#[derive(Debug, Serialize)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub cover_url: String,
    pub is_public: bool,
    pub created_at: String,
}

/// List-view projection of a memory
#[derive(Debug, Serialize)]
pub struct MemorySummary {
    pub id: String,
    pub cover_url: String,
    pub excerpt: String,
}

/// Write body shared by create and update
#[derive(Debug, Deserialize)]
pub struct MemoryBody {
    pub content: String,
    pub cover_url: String,
    #[serde(default, deserialize_with = "bool_from_loose")]
    pub is_public: bool,
}

/// Accept booleans in the loose forms clients send: true/false,
/// "true"/"false"/"1"/"0", 0/1. Absent or null means false.
fn bool_from_loose<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Loose::Bool(b)) => Ok(b),
        Some(Loose::Int(0)) => Ok(false),
        Some(Loose::Int(1)) => Ok(true),
        Some(Loose::Int(other)) => Err(serde::de::Error::custom(format!(
            "expected a boolean-like value, got {}",
            other
        ))),
        Some(Loose::Str(s)) => match s.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean-like value, got \"{}\"",
                other
            ))),
        },
    }
}

/// Shorten content for list views.
///
/// Content longer than 112 characters is cut from offset 115 and
/// ellipsized; anything shorter passes through unchanged. Lengths 113-115
/// collapse to a bare "...".
fn excerpt(content: &str) -> String {
    if content.chars().count() > 112 {
        let mut out: String = content.chars().skip(115).collect();
        out.push_str("...");
        out
    } else {
        content.to_string()
    }
}

fn memory_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Memory> {
    Ok(Memory {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        cover_url: row.get(3)?,
        is_public: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn parse_memory_id(id: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid memory id: must be a UUID" })),
        )
            .into_response()
    })
}

fn validate_cover_url(cover_url: &str) -> Result<(), Response> {
    url::Url::parse(cover_url).map(|_| ()).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("Invalid cover_url: {}", e) })),
        )
            .into_response()
    })
}

pub async fn list_memories(State(state): State<AppState>) -> impl IntoResponse {
    let result = state
        .db
        .with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, cover_url, content FROM memories
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let memories: Vec<MemorySummary> = stmt
                .query_map([], |row| {
                    let content: String = row.get(2)?;
                    Ok(MemorySummary {
                        id: row.get(0)?,
                        cover_url: row.get(1)?,
                        excerpt: excerpt(&content),
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            Ok::<_, rusqlite::Error>(memories)
        })
        .await;

    match result {
        Ok(memories) => Json(memories).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_memory_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let result = state
        .db
        .with_conn(move |conn| {
            conn.query_row(
                "SELECT id, user_id, content, cover_url, is_public, created_at
                 FROM memories WHERE id = ?",
                [id.to_string()],
                memory_from_row,
            )
        })
        .await;

    match result {
        Ok(memory) => Json(memory).into_response(),
        Err(rusqlite::Error::QueryReturnedNoRows) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Memory not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn create_memory(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<MemoryBody>,
) -> impl IntoResponse {
    if let Err(response) = validate_cover_url(&body.cover_url) {
        return response;
    }

    let id = Uuid::new_v4().to_string();
    let user_id = principal.user_id.to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let result = state
        .db
        .with_conn(move |conn| {
            conn.execute(
                "INSERT INTO memories (id, user_id, content, cover_url, is_public, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, user_id, body.content, body.cover_url, body.is_public, now],
            )
        })
        .await;

    match result {
        Ok(_) => StatusCode::CREATED.into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MemoryBody>,
) -> impl IntoResponse {
    let id = match parse_memory_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(response) = validate_cover_url(&body.cover_url) {
        return response;
    }

    // One statement: RETURNING yields the updated row, or no row for an
    // unknown id
    let result = state
        .db
        .with_conn(move |conn| {
            conn.query_row(
                "UPDATE memories SET content = ?, cover_url = ?, is_public = ?
                 WHERE id = ?
                 RETURNING id, user_id, content, cover_url, is_public, created_at",
                rusqlite::params![body.content, body.cover_url, body.is_public, id.to_string()],
                memory_from_row,
            )
        })
        .await;

    match result {
        Ok(memory) => Json(memory).into_response(),
        Err(rusqlite::Error::QueryReturnedNoRows) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Memory not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_memory_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let result = state
        .db
        .with_conn(move |conn| conn.execute("DELETE FROM memories WHERE id = ?", [id.to_string()]))
        .await;

    match result {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Memory not found" })),
        )
            .into_response(),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
