use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::server::AppState;
use crate::provider::FriendsProvider;
use crate::{ContentUri, ContentValues, Error, Friend, Selection};
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct ListParams {
    /// Comma-separated column names
    pub projection: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct TypeParams {
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        ErrorResponse { error: err.to_string() }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::UnsupportedUri(_) => StatusCode::NOT_FOUND,
        Error::InvalidUri(_) | Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::Storage(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn into_api_error(err: Error) -> ApiError {
    (status_for(&err), Json(err.into()))
}

/// Run a provider call on the blocking pool
async fn with_provider<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut FriendsProvider) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let provider = state.provider.clone();
    tokio::task::spawn_blocking(move || {
        let mut guard = provider
            .lock()
            .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "provider lock poisoned"))?;
        f(&mut *guard).map_err(into_api_error)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
}

pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ContentValues>>, ApiError> {
    let rows = with_provider(&state, move |p| {
        let uri = p.contract().collection_uri();
        let columns: Option<Vec<String>> = params
            .projection
            .map(|s| s.split(',').map(|c| c.trim().to_string()).collect());
        let projection: Option<Vec<&str>> =
            columns.as_ref().map(|c| c.iter().map(String::as_str).collect());
        let cursor = p.query(&uri, projection.as_deref(), &Selection::all(), params.sort.as_deref())?;
        Ok(cursor.to_values())
    })
    .await?;
    Ok(Json(rows))
}

pub async fn get_friend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Friend>, ApiError> {
    let friend = with_provider(&state, move |p| {
        let uri = p.contract().item_uri(id);
        let cursor = p.query(&uri, None, &Selection::all(), None)?;
        Ok(cursor.first().and_then(|row| Friend::from_row(&row)))
    })
    .await?;

    friend
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no friend with id {}", id)))
}

pub async fn create_friend(
    State(state): State<Arc<AppState>>,
    Json(values): Json<ContentValues>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let inserted = with_provider(&state, move |p| {
        let uri = p.contract().collection_uri();
        p.insert(&uri, Some(&values))
    })
    .await?;

    match inserted {
        Some(uri) => Ok((StatusCode::CREATED, Json(json!({ "uri": uri })))),
        None => Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insert rejected: missing field or duplicate name",
        )),
    }
}

pub async fn bulk_create_friends(
    State(state): State<Arc<AppState>>,
    Json(entries): Json<Vec<ContentValues>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let inserted = with_provider(&state, move |p| {
        let uri = p.contract().collection_uri();
        p.bulk_insert(&uri, &entries)
    })
    .await?;
    Ok(Json(json!({ "inserted": inserted })))
}

pub async fn update_friend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(values): Json<ContentValues>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = with_provider(&state, move |p| {
        let uri = p.contract().item_uri(id);
        p.update(&uri, &values, &Selection::all())
    })
    .await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete_friend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = with_provider(&state, move |p| {
        let uri = p.contract().item_uri(id);
        p.delete(&uri, &Selection::all())
    })
    .await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn delete_all_friends(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = with_provider(&state, |p| {
        let uri = p.contract().collection_uri();
        p.delete(&uri, &Selection::all())
    })
    .await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn get_type(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TypeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uri = ContentUri::parse(&params.uri).map_err(into_api_error)?;
    let descriptor = with_provider(&state, move |p| p.get_type(&uri)).await?;
    Ok(Json(json!({ "type": descriptor })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(FriendsProvider::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let state = state();
        let (status, Json(body)) =
            create_friend(State(state.clone()), Json(Friend::values("Dan", 555)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let uri = ContentUri::parse(body["uri"].as_str().unwrap()).unwrap();
        let id = uri.parse_id().unwrap();

        let Json(friend) = get_friend(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(friend.name, "Dan");
        assert_eq!(friend.num_friends, 555);
    }

    #[tokio::test]
    async fn test_negative_count_is_bad_request() {
        let state = state();
        let (status, _) = create_friend(State(state), Json(Friend::values("Sarah", -42)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_is_unprocessable() {
        let state = state();
        create_friend(State(state.clone()), Json(Friend::values("Dan", 1)))
            .await
            .unwrap();
        let (status, _) = create_friend(State(state), Json(Friend::values("Dan", 2)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_bulk_list_and_delete() {
        let state = state();
        let entries = vec![
            Friend::values("Katherine", 554),
            Friend::values("Dan", 523),
            ContentValues::new().with("name", "NoCount"),
        ];
        let Json(body) = bulk_create_friends(State(state.clone()), Json(entries))
            .await
            .unwrap();
        assert_eq!(body["inserted"], 2);

        let params = ListParams {
            projection: Some("name".to_string()),
            sort: Some("name".to_string()),
        };
        let Json(rows) = list_friends(State(state.clone()), Query(params)).await.unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.get_as_str("name")).collect();
        assert_eq!(names, vec!["Dan", "Katherine"]);

        let Json(body) = delete_all_friends(State(state.clone())).await.unwrap();
        assert_eq!(body["deleted"], 2);

        let Json(rows) = list_friends(State(state), Query(ListParams::default())).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_bad_sort_is_bad_request() {
        let state = state();
        create_friend(State(state.clone()), Json(Friend::values("Dan", 1)))
            .await
            .unwrap();

        let params = ListParams {
            projection: None,
            sort: Some("name; DELETE FROM friends".to_string()),
        };
        let (status, _) = list_friends(State(state.clone()), Query(params)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let Json(rows) = list_friends(State(state), Query(ListParams::default())).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_missing_item() {
        let state = state();
        let (_, Json(body)) = create_friend(State(state.clone()), Json(Friend::values("Dan", 5)))
            .await
            .unwrap();
        let id = ContentUri::parse(body["uri"].as_str().unwrap())
            .unwrap()
            .parse_id()
            .unwrap();

        let change = ContentValues::new().with("num_friends", 105);
        let Json(body) = update_friend(State(state.clone()), Path(id), Json(change))
            .await
            .unwrap();
        assert_eq!(body["updated"], 1);

        let Json(body) = delete_friend(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(body["deleted"], 1);

        let (status, _) = get_friend(State(state), Path(id)).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_type_descriptor() {
        let state = state();
        let params = TypeParams {
            uri: "content://com.example.android.exampleprovider.app/friends/3".to_string(),
        };
        let Json(body) = get_type(State(state.clone()), Query(params)).await.unwrap();
        assert_eq!(
            body["type"],
            "vnd.cursor.item/com.example.android.exampleprovider.app/friends"
        );

        let params = TypeParams {
            uri: "content://com.example.android.exampleprovider.app/enemies".to_string(),
        };
        let (status, _) = get_type(State(state), Query(params)).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
