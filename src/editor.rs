//! Record maintenance outside the upload flow: text edits, main-image
//! selection, image removal, badges, and record creation.

use crate::content::ContentService;
use crate::models::{
    About, Award, EntityKind, GalleryQuery, Hero, HeroStat, ImageList, NewBadge, Service,
};
use crate::session::AdminSession;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Hero banner text. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroEdit {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub cta_text: Option<String>,
}

impl HeroEdit {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.cta_text.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatEdit {
    pub number: Option<String>,
    pub text: Option<String>,
    pub icon: Option<String>,
}

/// Text fields of a service or award. `icon` and `features` belong to
/// services; `organization`, `year` and `category` to awards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub features: Option<Vec<String>>,
    pub organization: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

impl EntityEdit {
    fn validate(&self, kind: EntityKind) -> Result<()> {
        if *self == EntityEdit::default() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(Error::InvalidInput("Title cannot be empty".to_string()));
        }

        let service_only = self.icon.is_some() || self.features.is_some();
        let award_only =
            self.organization.is_some() || self.year.is_some() || self.category.is_some();
        match kind {
            EntityKind::Service if award_only => Err(Error::InvalidInput(
                "Organization, year and category only apply to awards".to_string(),
            )),
            EntityKind::Award if service_only => Err(Error::InvalidInput(
                "Icon and features only apply to services".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn apply_to_service(self, service: &mut Service) {
        if let Some(title) = self.title {
            service.title = title;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(icon) = self.icon {
            service.icon = Some(icon);
        }
        if let Some(features) = self.features {
            service.features = features;
        }
    }

    fn apply_to_award(self, award: &mut Award) {
        if let Some(title) = self.title {
            award.title = title;
        }
        if let Some(description) = self.description {
            award.description = description;
        }
        if let Some(organization) = self.organization {
            award.organization = Some(organization);
        }
        if let Some(year) = self.year {
            award.year = Some(year);
        }
        if let Some(category) = self.category {
            award.category = Some(category);
        }
    }
}

/// About-section text, sent as a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_aspect_ratio: Option<String>,
}

/// Read a service or award, apply `edit`, and write the full record back if
/// the edit reports a change.
pub(crate) async fn modify_entity<F>(
    content: &dyn ContentService,
    kind: EntityKind,
    id: &str,
    edit: F,
) -> Result<bool>
where
    F: FnOnce(&mut dyn ImageList) -> bool + Send,
{
    match kind {
        EntityKind::Service => {
            let mut service = content.get_service(id).await?;
            let changed = edit(&mut service);
            if changed {
                content.update_service(id, &service).await?;
            }
            Ok(changed)
        }
        EntityKind::Award => {
            let mut award = content.get_award(id).await?;
            let changed = edit(&mut award);
            if changed {
                content.update_award(id, &award).await?;
            }
            Ok(changed)
        }
    }
}

fn no_stat(index: usize) -> Error {
    Error::InvalidInput(format!("No hero stat at position {}", index))
}

/// Split a comma-separated feature list, dropping blanks.
pub fn parse_features(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .map(str::to_string)
        .collect()
}

/// Editing operations on existing content records.
pub struct ContentEditor<'a> {
    content: &'a dyn ContentService,
}

impl<'a> ContentEditor<'a> {
    pub fn new(content: &'a dyn ContentService, _session: &AdminSession) -> Self {
        Self { content }
    }

    /// Read-modify-write of the hero record; the image and unknown fields
    /// ride along untouched.
    async fn modify_hero<F>(&self, edit: F) -> Result<Hero>
    where
        F: FnOnce(&mut Hero) -> Result<()>,
    {
        let mut hero = self.content.get_hero().await?;
        edit(&mut hero)?;
        self.content.put_hero(&hero).await
    }

    pub async fn update_hero(&self, edit: HeroEdit) -> Result<Hero> {
        if edit.is_empty() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }

        let hero = self
            .modify_hero(move |hero| {
                if let Some(title) = edit.title {
                    hero.title = Some(title);
                }
                if let Some(subtitle) = edit.subtitle {
                    hero.subtitle = Some(subtitle);
                }
                if let Some(cta_text) = edit.cta_text {
                    hero.cta_text = Some(cta_text);
                }
                Ok(())
            })
            .await?;
        info!("Hero section updated");
        Ok(hero)
    }

    pub async fn add_hero_stat(&self, stat: HeroStat) -> Result<Hero> {
        if stat.number.trim().is_empty() || stat.text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "A stat needs both a number and a text".to_string(),
            ));
        }

        let hero = self
            .modify_hero(move |hero| {
                hero.stats.get_or_insert_with(Vec::new).push(stat);
                Ok(())
            })
            .await?;
        info!("Hero stat added");
        Ok(hero)
    }

    /// `index` is the stat's zero-based position as listed by the API.
    pub async fn update_hero_stat(&self, index: usize, edit: StatEdit) -> Result<Hero> {
        if edit == StatEdit::default() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }

        let hero = self
            .modify_hero(move |hero| {
                let stat = hero
                    .stats
                    .as_mut()
                    .and_then(|stats| stats.get_mut(index))
                    .ok_or_else(|| no_stat(index))?;
                if let Some(number) = edit.number {
                    stat.number = number;
                }
                if let Some(text) = edit.text {
                    stat.text = text;
                }
                if let Some(icon) = edit.icon {
                    stat.icon = Some(icon);
                }
                Ok(())
            })
            .await?;
        info!("Hero stat {} updated", index);
        Ok(hero)
    }

    pub async fn remove_hero_stat(&self, index: usize) -> Result<Hero> {
        let hero = self
            .modify_hero(move |hero| match hero.stats.as_mut() {
                Some(stats) if index < stats.len() => {
                    stats.remove(index);
                    Ok(())
                }
                _ => Err(no_stat(index)),
            })
            .await?;
        info!("Hero stat {} removed", index);
        Ok(hero)
    }

    /// Writes the whole record back so images and unknown fields survive.
    pub async fn update_entity(&self, kind: EntityKind, id: &str, edit: EntityEdit) -> Result<()> {
        edit.validate(kind)?;

        match kind {
            EntityKind::Service => {
                let mut service = self.content.get_service(id).await?;
                edit.apply_to_service(&mut service);
                self.content.update_service(id, &service).await?;
            }
            EntityKind::Award => {
                let mut award = self.content.get_award(id).await?;
                edit.apply_to_award(&mut award);
                self.content.update_award(id, &award).await?;
            }
        }
        info!("Updated {} {}", kind, id);
        Ok(())
    }

    /// Only the fields set in `edit` are sent.
    pub async fn update_about(&self, edit: AboutEdit) -> Result<About> {
        if edit == AboutEdit::default() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }

        let about = self.content.patch_about(&serde_json::to_value(&edit)?).await?;
        info!("About section updated");
        Ok(about)
    }

    /// Only `mainImage` is sent; the image list is left as the server has it.
    pub async fn set_main_image(&self, kind: EntityKind, id: &str, url: &str) -> Result<()> {
        let updates = json!({ "mainImage": url });
        match kind {
            EntityKind::Service => {
                self.content.patch_service(id, &updates).await?;
            }
            EntityKind::Award => {
                self.content.patch_award(id, &updates).await?;
            }
        }
        info!("Main image set for {} {}", kind, id);
        Ok(())
    }

    /// Returns false when the record had no image with that URL.
    pub async fn remove_entity_image(&self, kind: EntityKind, id: &str, url: &str) -> Result<bool> {
        let url = url.to_string();
        let removed =
            modify_entity(self.content, kind, id, move |record| record.detach_image(&url)).await?;
        if removed {
            info!("Image removed from {} {}", kind, id);
        }
        Ok(removed)
    }

    pub async fn clear_hero_image(&self) -> Result<()> {
        let mut hero = self.content.get_hero().await?;
        hero.image = Some(String::new());
        self.content.put_hero(&hero).await?;
        info!("Background image removed");
        Ok(())
    }

    pub async fn clear_about_image(&self) -> Result<()> {
        self.content.patch_about(&json!({ "image": "" })).await?;
        info!("About image removed");
        Ok(())
    }

    /// The newest photo in the `profile` gallery category, if any.
    pub async fn profile_image(&self) -> Result<Option<String>> {
        let items = self
            .content
            .list_gallery(&GalleryQuery::category("profile", Some(1)))
            .await?;
        Ok(items.into_iter().next().map(|item| item.image))
    }

    pub async fn add_badge(&self, badge: NewBadge) -> Result<()> {
        self.content.add_badge(&badge).await?;
        info!("Badge '{}' added", badge.title);
        Ok(())
    }

    pub async fn delete_badge(&self, badge_id: &str) -> Result<()> {
        self.content.delete_badge(badge_id).await?;
        info!("Badge {} deleted", badge_id);
        Ok(())
    }

    pub async fn create_service(&self, draft: Service) -> Result<Service> {
        let created = self.content.create_service(&draft).await?;
        info!("Service '{}' created", created.title);
        Ok(created)
    }

    pub async fn create_award(&self, draft: Award) -> Result<Award> {
        let created = self.content.create_award(&draft).await?;
        info!("Award '{}' created", created.title);
        Ok(created)
    }

    pub async fn delete_entity(&self, kind: EntityKind, id: &str) -> Result<()> {
        match kind {
            EntityKind::Service => self.content.delete_service(id).await?,
            EntityKind::Award => self.content.delete_award(id).await?,
        }
        info!("Deleted {} {}", kind, id);
        Ok(())
    }

    pub async fn delete_gallery_item(&self, id: &str) -> Result<()> {
        self.content.delete_gallery_item(id).await?;
        info!("Gallery item {} deleted", id);
        Ok(())
    }
}
