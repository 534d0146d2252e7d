use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::http::{Entry, EntryRequest, ErrorResponse};

/// The five entry operations as seen from the client side.
#[async_trait]
pub trait EntryApi {
    async fn list(&self) -> Result<Vec<Entry>>;
    async fn get(&self, entry_id: i64) -> Result<Entry>;
    async fn create(&self, entry: &EntryRequest) -> Result<Entry>;
    async fn update(&self, entry_id: i64, entry: &EntryRequest) -> Result<Entry>;
    async fn delete(&self, entry_id: i64) -> Result<Entry>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build().map_err(Error::from)?;

        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn entries_url(&self) -> String {
        format!("{}/api/entries", self.base_url)
    }

    fn entry_url(&self, entry_id: i64) -> String {
        format!("{}/api/entries/{}", self.base_url, entry_id)
    }
}

#[async_trait]
impl EntryApi for ApiClient {
    async fn list(&self) -> Result<Vec<Entry>> {
        let response = self.client.get(&self.entries_url()).send().await?;
        read_response(response).await
    }

    async fn get(&self, entry_id: i64) -> Result<Entry> {
        let response = self.client.get(&self.entry_url(entry_id)).send().await?;
        read_response(response).await
    }

    async fn create(&self, entry: &EntryRequest) -> Result<Entry> {
        let response = self
            .client
            .post(&self.entries_url())
            .json(entry)
            .send()
            .await?;
        read_response(response).await
    }

    async fn update(&self, entry_id: i64, entry: &EntryRequest) -> Result<Entry> {
        let response = self
            .client
            .put(&self.entry_url(entry_id))
            .json(entry)
            .send()
            .await?;
        read_response(response).await
    }

    async fn delete(&self, entry_id: i64) -> Result<Entry> {
        let response = self.client.delete(&self.entry_url(entry_id)).send().await?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    debug!("{} {}", status, response.url());

    if status.is_success() {
        return response.json::<T>().await.map_err(Error::from);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => response.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::{error_message, ApiClient, EntryApi};
    use crate::error::Error;
    use crate::model::http::EntryRequest;
    use crate::server;
    use crate::store::memory_store;
    use reqwest::StatusCode;

    async fn serve() -> ApiClient {
        let (addr, server) =
            warp::serve(server::filter(memory_store().await)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        ApiClient::new(&format!("http://{}/", addr)).unwrap()
    }

    fn request(title: &str) -> EntryRequest {
        EntryRequest {
            title: Some(title.to_string()),
            notes: Some("Fun".to_string()),
            photo_url: Some("http://x/y.jpg".to_string()),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn crud_against_a_live_server() {
        let client = serve().await;

        let created = client.create(&request("Trip")).await.unwrap();
        assert_eq!(1, created.entry_id);
        assert_eq!(created, client.get(1).await.unwrap());

        let updated = client.update(1, &request("Hike")).await.unwrap();
        assert_eq!("Hike", updated.title);
        assert_eq!(vec![updated.clone()], client.list().await.unwrap());

        assert_eq!(updated, client.delete(1).await.unwrap());
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn server_errors_become_api_errors() {
        let client = serve().await;

        match client.get(3).await {
            Err(Error::Api { status, message }) => {
                assert_eq!(404, status);
                assert_eq!("cannot find entry with entryId 3", message);
            }
            other => panic!("unexpected result {:?}", other),
        }

        match client.create(&EntryRequest::default()).await {
            Err(Error::Api { status, message }) => {
                assert_eq!(400, status);
                assert_eq!("title, notes, and photoUrl are required", message);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        assert_eq!(
            "boom",
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"boom"}"#)
        );
        assert_eq!(
            "Bad Gateway",
            error_message(StatusCode::BAD_GATEWAY, "<html></html>")
        );
    }
}
