use super::ContentService;
use crate::models::{
    About, Award, Badge, GalleryItem, GalleryQuery, Hero, NewBadge, NewGalleryItem, Service,
};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct MockContentState {
    hero: Hero,
    about: About,
    services: Vec<Service>,
    awards: Vec<Award>,
    gallery: Vec<GalleryItem>,
    hero_writes: Vec<Hero>,
    calls: HashMap<&'static str, usize>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MockContentState {
    fn record(&mut self, op: &'static str) {
        *self.calls.entry(op).or_insert(0) += 1;
    }

    fn read(&mut self, op: &'static str) -> Result<()> {
        self.record(op);
        if self.fail_reads {
            return Err(Error::ContentApi(format!("Mock {} failure", op)));
        }
        Ok(())
    }

    fn write(&mut self, op: &'static str) -> Result<()> {
        self.record(op);
        if self.fail_writes {
            return Err(Error::ContentApi(format!("Mock {} failure", op)));
        }
        Ok(())
    }
}

/// In-memory content API that counts every call by operation name.
#[derive(Clone, Default)]
pub struct MockContentClient {
    state: Arc<Mutex<MockContentState>>,
}

fn not_found(kind: &str, id: &str) -> Error {
    Error::ContentApi(format!("{} {} not found (status 404)", kind, id))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn merge_into(target: &mut Value, updates: &Value) {
    if let (Value::Object(target), Value::Object(updates)) = (target, updates) {
        for (key, value) in updates {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn patched<T: Serialize + DeserializeOwned>(record: &T, updates: &Value) -> Result<T> {
    let mut current = serde_json::to_value(record)?;
    merge_into(&mut current, updates);
    Ok(serde_json::from_value(current)?)
}

impl MockContentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hero(self, hero: Hero) -> Self {
        self.state.lock().unwrap().hero = hero;
        self
    }

    pub fn with_about(self, about: About) -> Self {
        self.state.lock().unwrap().about = about;
        self
    }

    pub fn with_service(self, service: Service) -> Self {
        self.state.lock().unwrap().services.push(service);
        self
    }

    pub fn with_award(self, award: Award) -> Self {
        self.state.lock().unwrap().awards.push(award);
        self
    }

    pub fn with_gallery_item(self, item: GalleryItem) -> Self {
        self.state.lock().unwrap().gallery.push(item);
        self
    }

    pub fn with_write_failure(self, fail: bool) -> Self {
        self.state.lock().unwrap().fail_writes = fail;
        self
    }

    pub fn with_read_failure(self, fail: bool) -> Self {
        self.state.lock().unwrap().fail_reads = fail;
        self
    }

    /// Number of calls made to one operation, e.g. `"create_gallery_item"`.
    pub fn get_call_count(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    pub fn get_total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    /// Every hero body received by `put_hero`, oldest first.
    pub fn get_hero_writes(&self) -> Vec<Hero> {
        self.state.lock().unwrap().hero_writes.clone()
    }

    pub fn get_gallery(&self) -> Vec<GalleryItem> {
        self.state.lock().unwrap().gallery.clone()
    }
}

#[async_trait]
impl ContentService for MockContentClient {
    async fn get_hero(&self) -> Result<Hero> {
        let mut state = self.state.lock().unwrap();
        state.read("get_hero")?;
        Ok(state.hero.clone())
    }

    async fn put_hero(&self, hero: &Hero) -> Result<Hero> {
        let mut state = self.state.lock().unwrap();
        state.write("put_hero")?;
        state.hero_writes.push(hero.clone());
        state.hero = hero.clone();
        Ok(state.hero.clone())
    }

    async fn get_about(&self) -> Result<About> {
        let mut state = self.state.lock().unwrap();
        state.read("get_about")?;
        Ok(state.about.clone())
    }

    async fn put_about(&self, about: &About) -> Result<About> {
        let mut state = self.state.lock().unwrap();
        state.write("put_about")?;
        state.about = about.clone();
        Ok(state.about.clone())
    }

    async fn patch_about(&self, updates: &Value) -> Result<About> {
        let mut state = self.state.lock().unwrap();
        state.write("patch_about")?;
        state.about = patched(&state.about, updates)?;
        Ok(state.about.clone())
    }

    async fn add_badge(&self, badge: &NewBadge) -> Result<About> {
        let mut state = self.state.lock().unwrap();
        state.write("add_badge")?;
        state.about.badges.get_or_insert_with(Vec::new).push(Badge {
            id: Some(new_id()),
            title: badge.title.clone(),
            icon: Some(badge.icon.clone()),
            position: Some(badge.position.clone()),
            color: Some(badge.color.clone()),
        });
        Ok(state.about.clone())
    }

    async fn delete_badge(&self, badge_id: &str) -> Result<About> {
        let mut state = self.state.lock().unwrap();
        state.write("delete_badge")?;
        if let Some(badges) = state.about.badges.as_mut() {
            badges.retain(|badge| badge.id.as_deref() != Some(badge_id));
        }
        Ok(state.about.clone())
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let mut state = self.state.lock().unwrap();
        state.read("list_services")?;
        Ok(state.services.clone())
    }

    async fn get_service(&self, id: &str) -> Result<Service> {
        let mut state = self.state.lock().unwrap();
        state.read("get_service")?;
        state
            .services
            .iter()
            .find(|s| s.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| not_found("service", id))
    }

    async fn create_service(&self, service: &Service) -> Result<Service> {
        let mut state = self.state.lock().unwrap();
        state.write("create_service")?;
        let mut created = service.clone();
        created.id = Some(new_id());
        state.services.push(created.clone());
        Ok(created)
    }

    async fn update_service(&self, id: &str, service: &Service) -> Result<Service> {
        let mut state = self.state.lock().unwrap();
        state.write("update_service")?;
        let slot = state
            .services
            .iter_mut()
            .find(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("service", id))?;
        *slot = service.clone();
        slot.id = Some(id.to_string());
        Ok(slot.clone())
    }

    async fn patch_service(&self, id: &str, updates: &Value) -> Result<Service> {
        let mut state = self.state.lock().unwrap();
        state.write("patch_service")?;
        let slot = state
            .services
            .iter_mut()
            .find(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("service", id))?;
        *slot = patched(slot, updates)?;
        Ok(slot.clone())
    }

    async fn delete_service(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.write("delete_service")?;
        let before = state.services.len();
        state.services.retain(|s| s.id.as_deref() != Some(id));
        if state.services.len() == before {
            return Err(not_found("service", id));
        }
        Ok(())
    }

    async fn list_awards(&self) -> Result<Vec<Award>> {
        let mut state = self.state.lock().unwrap();
        state.read("list_awards")?;
        Ok(state.awards.clone())
    }

    async fn get_award(&self, id: &str) -> Result<Award> {
        let mut state = self.state.lock().unwrap();
        state.read("get_award")?;
        state
            .awards
            .iter()
            .find(|a| a.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| not_found("award", id))
    }

    async fn create_award(&self, award: &Award) -> Result<Award> {
        let mut state = self.state.lock().unwrap();
        state.write("create_award")?;
        let mut created = award.clone();
        created.id = Some(new_id());
        state.awards.push(created.clone());
        Ok(created)
    }

    async fn update_award(&self, id: &str, award: &Award) -> Result<Award> {
        let mut state = self.state.lock().unwrap();
        state.write("update_award")?;
        let slot = state
            .awards
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("award", id))?;
        *slot = award.clone();
        slot.id = Some(id.to_string());
        Ok(slot.clone())
    }

    async fn patch_award(&self, id: &str, updates: &Value) -> Result<Award> {
        let mut state = self.state.lock().unwrap();
        state.write("patch_award")?;
        let slot = state
            .awards
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("award", id))?;
        *slot = patched(slot, updates)?;
        Ok(slot.clone())
    }

    async fn delete_award(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.write("delete_award")?;
        let before = state.awards.len();
        state.awards.retain(|a| a.id.as_deref() != Some(id));
        if state.awards.len() == before {
            return Err(not_found("award", id));
        }
        Ok(())
    }

    async fn list_gallery(&self, query: &GalleryQuery) -> Result<Vec<GalleryItem>> {
        let mut state = self.state.lock().unwrap();
        state.read("list_gallery")?;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(state
            .gallery
            .iter()
            .filter(|item| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |category| item.category == category)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_gallery_item(&self, item: &NewGalleryItem) -> Result<GalleryItem> {
        let mut state = self.state.lock().unwrap();
        state.write("create_gallery_item")?;
        let created = GalleryItem {
            id: Some(new_id()),
            title: item.title.clone(),
            image: item.image.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            ..GalleryItem::default()
        };
        state.gallery.push(created.clone());
        Ok(created)
    }

    async fn delete_gallery_item(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.write("delete_gallery_item")?;
        let before = state.gallery.len();
        state.gallery.retain(|item| item.id.as_deref() != Some(id));
        if state.gallery.len() == before {
            return Err(not_found("gallery item", id));
        }
        Ok(())
    }
}
