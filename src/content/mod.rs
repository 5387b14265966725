//! Portfolio content API
//!
//! Typed access to the hero, about, services, awards, and gallery resources,
//! plus the full-refresh snapshot the dashboard displays.

pub mod client;
pub mod mock;
pub mod snapshot;

pub use client::ContentClient;
pub use mock::MockContentClient;
pub use snapshot::ContentSnapshot;

use crate::models::{
    About, Award, GalleryItem, GalleryQuery, Hero, NewBadge, NewGalleryItem, Service,
};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn get_hero(&self) -> Result<Hero>;
    async fn put_hero(&self, hero: &Hero) -> Result<Hero>;

    async fn get_about(&self) -> Result<About>;
    async fn put_about(&self, about: &About) -> Result<About>;
    async fn patch_about(&self, updates: &Value) -> Result<About>;
    async fn add_badge(&self, badge: &NewBadge) -> Result<About>;
    async fn delete_badge(&self, badge_id: &str) -> Result<About>;

    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn get_service(&self, id: &str) -> Result<Service>;
    async fn create_service(&self, service: &Service) -> Result<Service>;
    async fn update_service(&self, id: &str, service: &Service) -> Result<Service>;
    /// PUT with only the fields in `updates`.
    async fn patch_service(&self, id: &str, updates: &Value) -> Result<Service>;
    async fn delete_service(&self, id: &str) -> Result<()>;

    async fn list_awards(&self) -> Result<Vec<Award>>;
    async fn get_award(&self, id: &str) -> Result<Award>;
    async fn create_award(&self, award: &Award) -> Result<Award>;
    async fn update_award(&self, id: &str, award: &Award) -> Result<Award>;
    async fn patch_award(&self, id: &str, updates: &Value) -> Result<Award>;
    async fn delete_award(&self, id: &str) -> Result<()>;

    async fn list_gallery(&self, query: &GalleryQuery) -> Result<Vec<GalleryItem>>;
    async fn create_gallery_item(&self, item: &NewGalleryItem) -> Result<GalleryItem>;
    async fn delete_gallery_item(&self, id: &str) -> Result<()>;
}
