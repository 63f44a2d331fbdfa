use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use review_server_domain::{
    EntryId, GameId, ServiceError,
    entry::{EntryEdit, EntryForm, EntryWrite},
    image::ImageUpload,
};

use crate::{
    ApiState,
    auth::Auth,
    error::{ApiError, ApiResult},
};

#[derive(serde::Serialize)]
pub struct JsonEntryWrite {
    entry_id: EntryId,
    game_id: GameId,
    game_rating: f64,
    message: &'static str,
}

impl JsonEntryWrite {
    fn new(write: EntryWrite, message: &'static str) -> Self {
        Self {
            entry_id: write.entry_id,
            game_id: write.game_id,
            game_rating: write.game_rating,
            message,
        }
    }
}

/// Fields of an entry submission, as sent by the browser.
#[derive(Default)]
struct EntryParts {
    title: Option<String>,
    description: Option<String>,
    game: Option<String>,
    rating: Option<String>,
    image: Option<ImageUpload>,
}

impl EntryParts {
    /// A game id that is missing or not a number counts as not selected.
    fn game_id(&self) -> Option<GameId> {
        self.game.as_deref().and_then(|g| g.trim().parse().ok())
    }

    fn rating(&self) -> ApiResult<Option<i64>> {
        match self.rating.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(rating) => rating.parse::<i64>().map(Some).map_err(|_| {
                ApiError::from(ServiceError::BadRequest(
                    "Rating must be between 1 and 5".to_string(),
                ))
            }),
        }
    }
}

/// A text part the form always sends, even when left blank.
fn required(value: Option<String>, message: &str) -> ApiResult<String> {
    value.ok_or_else(|| ServiceError::BadRequest(message.to_string()).into())
}

fn multipart_error(e: MultipartError) -> ApiError {
    ServiceError::BadRequest(format!("Invalid form data: {}", e.body_text())).into()
}

async fn read_entry_parts(mut multipart: Multipart) -> ApiResult<EntryParts> {
    let mut parts = EntryParts::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty file part when nothing was picked.
                if !filename.is_empty() {
                    parts.image = Some(ImageUpload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" | "description" | "game" | "rating" => {
                let value = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "title" => parts.title = Some(value),
                    "description" => parts.description = Some(value),
                    "game" => parts.game = Some(value),
                    _ => parts.rating = Some(value),
                }
            }
            _ => {}
        }
    }
    Ok(parts)
}

pub async fn add_entry(
    State(state): State<ApiState>,
    Auth(user): Auth,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<JsonEntryWrite>)> {
    let parts = read_entry_parts(multipart).await?;
    let form = EntryForm {
        game_id: parts.game_id(),
        rating: parts.rating()?,
        title: required(parts.title, "No title given")?,
        description: required(parts.description, "No description given")?,
    };

    let write = state
        .app
        .entry_service
        .create_entry(&user, form, parts.image)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(JsonEntryWrite::new(write, "Entry added")),
    ))
}

pub async fn edit_entry(
    Path(id): Path<EntryId>,
    State(state): State<ApiState>,
    Auth(user): Auth,
    multipart: Multipart,
) -> ApiResult<Json<JsonEntryWrite>> {
    let parts = read_entry_parts(multipart).await?;
    let edit = EntryEdit {
        rating: parts.rating()?,
        title: required(parts.title, "No title given")?,
        description: required(parts.description, "No description given")?,
    };

    let write = state
        .app
        .entry_service
        .update_entry(&user, id, edit, parts.image)
        .await?;
    Ok(Json(JsonEntryWrite::new(write, "Entry updated")))
}

pub async fn delete_entry(
    Path(id): Path<EntryId>,
    State(state): State<ApiState>,
    Auth(user): Auth,
) -> ApiResult<Json<JsonEntryWrite>> {
    let write = state.app.entry_service.delete_entry(&user, id).await?;
    Ok(Json(JsonEntryWrite::new(write, "Entry deleted")))
}
