use super::ContentService;
use crate::models::{About, Award, GalleryItem, GalleryQuery, Hero, Service};
use serde::Serialize;
use std::fmt::Display;
use tracing::warn;

/// Gallery page size used by a full refresh.
pub const REFRESH_GALLERY_LIMIT: u32 = 100;

/// Locally cached copy of everything the dashboard shows.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ContentSnapshot {
    pub hero: Hero,
    pub about: About,
    pub services: Vec<Service>,
    pub awards: Vec<Award>,
    pub gallery: Vec<GalleryItem>,
}

fn or_empty<T: Default, E: Display>(resource: &str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Could not refresh {}: {}. Showing it as empty.", resource, e);
        T::default()
    })
}

impl ContentSnapshot {
    /// Re-read all five resources concurrently. A resource that fails to load
    /// is shown empty rather than failing the whole refresh.
    pub async fn fetch(content: &dyn ContentService) -> Self {
        let gallery_query = GalleryQuery::limit(REFRESH_GALLERY_LIMIT);

        let (hero, services, awards, gallery, about) = tokio::join!(
            content.get_hero(),
            content.list_services(),
            content.list_awards(),
            content.list_gallery(&gallery_query),
            content.get_about()
        );

        Self {
            hero: or_empty("hero", hero),
            about: or_empty("about", about),
            services: or_empty("services", services),
            awards: or_empty("awards", awards),
            gallery: or_empty("gallery", gallery),
        }
    }

    pub fn gallery_in(&self, category: &str) -> impl Iterator<Item = &GalleryItem> {
        let category = category.to_string();
        self.gallery
            .iter()
            .filter(move |item| category == "all" || item.category == category)
    }
}
