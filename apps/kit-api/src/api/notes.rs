//! Per-user notes stored in the `notes` collection of the URI's database.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{ApiResponse, AppError, AuthenticatedUser, ValidatedJson, send_success};
use chrono::{DateTime, Utc};
use database::DatabaseError;
use database::mongodb::Collection;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::state::AppState;

const COLLECTION: &str = "notes";
const LIST_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNote {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    #[serde(default)]
    pub body: String,
}

/// Stored shape; `_id` is assigned by the server on insert.
#[derive(Debug, Serialize, Deserialize)]
struct NoteDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    owner: String,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Note {
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<NoteDocument> for Note {
    fn from(document: NoteDocument) -> Self {
        Self {
            id: document.id.map(|id| id.to_hex()),
            title: document.title,
            body: document.body,
            created_at: document.created_at,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(list).post(create))
        .with_state(state)
}

fn owner(user: &AuthenticatedUser) -> Result<String, AppError> {
    user.subject()
        .map(str::to_owned)
        .ok_or_else(|| AppError::forbidden("Token carries no subject."))
}

async fn collection(state: &AppState) -> Result<Collection<NoteDocument>, AppError> {
    Ok(state.database().await?.collection(COLLECTION))
}

async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(input): ValidatedJson<CreateNote>,
) -> Result<ApiResponse<Note>, AppError> {
    let mut document = NoteDocument {
        id: None,
        owner: owner(&user)?,
        title: input.title,
        body: input.body,
        created_at: Utc::now(),
    };

    let inserted = collection(&state)
        .await?
        .insert_one(&document)
        .await
        .map_err(DatabaseError::from)?;
    document.id = inserted.inserted_id.as_object_id();

    Ok(send_success(Note::from(document))
        .status(StatusCode::CREATED)
        .message("Note created."))
}

/// Newest first, capped at fifty
async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<ApiResponse<Vec<Note>>, AppError> {
    let owner = owner(&user)?;

    let documents: Vec<NoteDocument> = collection(&state)
        .await?
        .find(doc! { "owner": owner.as_str() })
        .sort(doc! { "_id": -1 })
        .limit(LIST_LIMIT)
        .await
        .map_err(DatabaseError::from)?
        .try_collect()
        .await
        .map_err(DatabaseError::from)?;

    Ok(send_success(documents.into_iter().map(Note::from).collect()))
}
