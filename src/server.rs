use log::error;
use std::convert::Infallible;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType};
use warp::{Filter, Rejection, Reply};

use crate::error::{Error, Result};
use crate::model::http::{Entry, EntryRequest, ErrorResponse};
use crate::model::parse_entry_id;
use crate::store::Store;

const MAX_BODY_BYTES: u64 = 64 * 1024;
const SERVER_ERROR: &str = "an unexpected error occurred";

pub fn filter(store: Store) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let entries = warp::path("api").and(warp::path("entries"));
    let entry = entries.clone().and(entry_id());

    let list = entries
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(|store: Store| async move {
            list_entries(store).await.map_err(Error::into_rejection)
        });

    let get = entry
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(|entry_id: i64, store: Store| async move {
            get_entry(store, entry_id)
                .await
                .map_err(Error::into_rejection)
        });

    let create = entries
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_store(store.clone()))
        .and_then(|request: EntryRequest, store: Store| async move {
            create_entry(store, request)
                .await
                .map_err(Error::into_rejection)
        });

    let update = entry
        .clone()
        .and(warp::path::end())
        .and(warp::put())
        .and(json_body())
        .and(with_store(store.clone()))
        .and_then(
            |entry_id: i64, request: EntryRequest, store: Store| async move {
                update_entry(store, entry_id, request)
                    .await
                    .map_err(Error::into_rejection)
            },
        );

    let delete = entry
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_store(store))
        .and_then(|entry_id: i64, store: Store| async move {
            delete_entry(store, entry_id)
                .await
                .map_err(Error::into_rejection)
        });

    list.or(get)
        .or(create)
        .or(update)
        .or(delete)
        .recover(handle_rejection)
}

fn with_store(store: Store) -> impl Filter<Extract = (Store,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

/// The `entryId` path segment, rejected before the method or body is looked at.
fn entry_id() -> impl Filter<Extract = (i64,), Error = Rejection> + Clone {
    warp::path::param::<String>().and_then(|raw: String| async move {
        parse_entry_id(&raw).map_err(Error::into_rejection)
    })
}

/// Bodies without a `Content-Length` (chunked or empty) are still accepted.
fn json_body() -> impl Filter<Extract = (EntryRequest,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|length: Option<u64>| async move {
            match length {
                Some(length) if length > MAX_BODY_BYTES => {
                    Err(Error::BodyTooLarge.into_rejection())
                }
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::json())
}

async fn list_entries(store: Store) -> Result<impl Reply> {
    let entries: Vec<Entry> = store
        .list()
        .await?
        .into_iter()
        .map(Entry::from)
        .collect();

    Ok(warp::reply::json(&entries))
}

async fn get_entry(store: Store, entry_id: i64) -> Result<impl Reply> {
    let entry = store
        .get(entry_id)
        .await?
        .ok_or(Error::EntryNotFound(entry_id))?;

    Ok(warp::reply::json(&Entry::from(entry)))
}

async fn create_entry(store: Store, request: EntryRequest) -> Result<impl Reply> {
    let new_entry = request.validate()?;

    let entry = store.insert(&new_entry).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&Entry::from(entry)),
        StatusCode::CREATED,
    ))
}

async fn update_entry(store: Store, entry_id: i64, request: EntryRequest) -> Result<impl Reply> {
    let new_entry = request.validate()?;

    let entry = store
        .update(entry_id, &new_entry)
        .await?
        .ok_or(Error::EntryNotFound(entry_id))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&Entry::from(entry)),
        StatusCode::CREATED,
    ))
}

async fn delete_entry(store: Store, entry_id: i64) -> Result<impl Reply> {
    let entry = store
        .delete(entry_id)
        .await?
        .ok_or(Error::EntryNotFound(entry_id))?;

    Ok(warp::reply::json(&Entry::from(entry)))
}

async fn handle_rejection(
    rejection: Rejection,
) -> std::result::Result<impl Reply, Infallible> {
    // sibling routes leave MethodNotAllowed behind, so it is checked last
    let (status, message) = if let Some(e) = rejection.find::<Error>() {
        let status = e.status();
        if status.is_server_error() {
            error!("{}", e);
            (status, SERVER_ERROR.to_string())
        } else {
            (status, e.to_string())
        }
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = rejection.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if rejection.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "request body must be json".to_string(),
        )
    } else if rejection.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body is too large".to_string(),
        )
    } else if rejection.find::<LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "content-length header is required".to_string(),
        )
    } else if rejection.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        error!("unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    ))
}
