use super::ContentService;
use crate::models::{
    About, Award, GalleryItem, GalleryQuery, Hero, NewBadge, NewGalleryItem, Service,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct ContentClient {
    client: Client,
    base_url: String,
}

impl ContentClient {
    pub fn new(base_url: String) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_text(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send {} request to content API: {}", what, e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Content API error on {} (status {}): {}", what, status, body);
            return Err(Error::ContentApi(format!(
                "{} failed (status {}): {}",
                what, status, body
            )));
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let body = self.send_text(request, what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}\nBody: {}", what, e, body);
            Error::ContentApi(format!("unreadable {} response: {}", what, e))
        })
    }

    /// Singletons may come back as `null` before they are first saved.
    async fn send_singleton<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let record: Option<T> = self.send_json(request, what).await?;
        Ok(record.unwrap_or_default())
    }

    async fn send_empty(&self, request: RequestBuilder, what: &str) -> Result<()> {
        self.send_text(request, what).await.map(|_| ())
    }
}

#[async_trait]
impl ContentService for ContentClient {
    async fn get_hero(&self) -> Result<Hero> {
        self.send_singleton(self.client.get(self.url("hero")), "hero read")
            .await
    }

    async fn put_hero(&self, hero: &Hero) -> Result<Hero> {
        self.send_singleton(self.client.put(self.url("hero")).json(hero), "hero update")
            .await
    }

    async fn get_about(&self) -> Result<About> {
        self.send_singleton(self.client.get(self.url("about")), "about read")
            .await
    }

    async fn put_about(&self, about: &About) -> Result<About> {
        self.send_singleton(
            self.client.put(self.url("about")).json(about),
            "about update",
        )
        .await
    }

    async fn patch_about(&self, updates: &Value) -> Result<About> {
        self.send_singleton(
            self.client.patch(self.url("about")).json(updates),
            "about patch",
        )
        .await
    }

    async fn add_badge(&self, badge: &NewBadge) -> Result<About> {
        self.send_singleton(
            self.client.post(self.url("about/badges")).json(badge),
            "badge create",
        )
        .await
    }

    async fn delete_badge(&self, badge_id: &str) -> Result<About> {
        self.send_singleton(
            self.client
                .delete(self.url(&format!("about/badges/{}", badge_id))),
            "badge delete",
        )
        .await
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        self.send_json(self.client.get(self.url("services")), "services list")
            .await
    }

    async fn get_service(&self, id: &str) -> Result<Service> {
        self.send_json(
            self.client.get(self.url(&format!("services/{}", id))),
            "service read",
        )
        .await
    }

    async fn create_service(&self, service: &Service) -> Result<Service> {
        self.send_json(
            self.client.post(self.url("services")).json(service),
            "service create",
        )
        .await
    }

    async fn update_service(&self, id: &str, service: &Service) -> Result<Service> {
        self.send_json(
            self.client
                .put(self.url(&format!("services/{}", id)))
                .json(service),
            "service update",
        )
        .await
    }

    async fn patch_service(&self, id: &str, updates: &Value) -> Result<Service> {
        self.send_json(
            self.client
                .put(self.url(&format!("services/{}", id)))
                .json(updates),
            "service update",
        )
        .await
    }

    async fn delete_service(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.client.delete(self.url(&format!("services/{}", id))),
            "service delete",
        )
        .await
    }

    async fn list_awards(&self) -> Result<Vec<Award>> {
        self.send_json(self.client.get(self.url("awards")), "awards list")
            .await
    }

    async fn get_award(&self, id: &str) -> Result<Award> {
        self.send_json(
            self.client.get(self.url(&format!("awards/{}", id))),
            "award read",
        )
        .await
    }

    async fn create_award(&self, award: &Award) -> Result<Award> {
        self.send_json(
            self.client.post(self.url("awards")).json(award),
            "award create",
        )
        .await
    }

    async fn update_award(&self, id: &str, award: &Award) -> Result<Award> {
        self.send_json(
            self.client
                .put(self.url(&format!("awards/{}", id)))
                .json(award),
            "award update",
        )
        .await
    }

    async fn patch_award(&self, id: &str, updates: &Value) -> Result<Award> {
        self.send_json(
            self.client
                .put(self.url(&format!("awards/{}", id)))
                .json(updates),
            "award update",
        )
        .await
    }

    async fn delete_award(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.client.delete(self.url(&format!("awards/{}", id))),
            "award delete",
        )
        .await
    }

    async fn list_gallery(&self, query: &GalleryQuery) -> Result<Vec<GalleryItem>> {
        self.send_json(
            self.client.get(self.url("gallery")).query(query),
            "gallery list",
        )
        .await
    }

    async fn create_gallery_item(&self, item: &NewGalleryItem) -> Result<GalleryItem> {
        self.send_json(
            self.client.post(self.url("gallery")).json(item),
            "gallery create",
        )
        .await
    }

    async fn delete_gallery_item(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.client.delete(self.url(&format!("gallery/{}", id))),
            "gallery delete",
        )
        .await
    }
}
