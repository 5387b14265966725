//! Data models and structures
//!
//! Defines the content records served by the portfolio API, the payloads
//! exchanged with the signing backend and media host, and runtime
//! configuration.
//!
//! Records carry an `extra` map so that a read-modify-write cycle never
//! drops fields this crate does not know about.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeroStat {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<HeroStat>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body for `POST /about/badges`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBadge {
    pub title: String,
    pub icon: String,
    pub position: String,
    pub color: String,
}

impl NewBadge {
    /// Build a badge with the dashboard's default styling.
    pub fn new(title: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("Please enter a badge title".to_string()));
        }

        Ok(Self {
            title: title.to_string(),
            icon: "Award".to_string(),
            position: "top-right".to_string(),
            color: "from-blue-500 to-purple-500".to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<Badge>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry in a service's or award's image list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityImage {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityImage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// Records that own an image list with a designated main image.
pub trait ImageList {
    fn images(&self) -> &[EntityImage];
    fn images_mut(&mut self) -> &mut Vec<EntityImage>;
    fn main_image(&self) -> &str;
    fn set_main_image(&mut self, url: String);

    /// Append an image; it becomes the main image only if none is set.
    fn attach_image(&mut self, image: EntityImage) {
        if self.main_image().is_empty() {
            self.set_main_image(image.url.clone());
        }
        self.images_mut().push(image);
    }

    /// Remove every image with `url`, clearing the main image if it pointed
    /// there. Returns whether anything changed.
    fn detach_image(&mut self, url: &str) -> bool {
        let before = self.images().len();
        self.images_mut().retain(|image| image.url != url);
        let removed = self.images().len() != before;

        if self.main_image() == url {
            self.set_main_image(String::new());
            return true;
        }
        removed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<EntityImage>,
    #[serde(default)]
    pub main_image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    /// A fresh service as the dashboard creates it: no images yet.
    pub fn draft(title: &str, description: &str, features: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            icon: Some("Users".to_string()),
            stats: Some("100+ People Helped".to_string()),
            gradient: Some("from-blue-500 to-purple-500".to_string()),
            features,
            ..Self::default()
        }
    }
}

impl ImageList for Service {
    fn images(&self) -> &[EntityImage] {
        &self.images
    }

    fn images_mut(&mut self) -> &mut Vec<EntityImage> {
        &mut self.images
    }

    fn main_image(&self) -> &str {
        &self.main_image
    }

    fn set_main_image(&mut self, url: String) {
        self.main_image = url;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<EntityImage>,
    #[serde(default)]
    pub main_image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Award {
    pub fn draft(title: &str, organization: Option<String>, year: i32, description: &str) -> Self {
        Self {
            title: title.to_string(),
            organization,
            year: Some(year),
            description: description.to_string(),
            category: Some("social-work".to_string()),
            ..Self::default()
        }
    }
}

impl ImageList for Award {
    fn images(&self) -> &[EntityImage] {
        &self.images
    }

    fn images_mut(&mut self) -> &mut Vec<EntityImage> {
        &mut self.images
    }

    fn main_image(&self) -> &str {
        &self.main_image
    }

    fn set_main_image(&mut self, url: String) {
        self.main_image = url;
    }
}

/// Which collection an image-list record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Service,
    Award,
}

impl EntityKind {
    pub fn default_image_title(&self) -> &'static str {
        match self {
            EntityKind::Service => "Service Image",
            EntityKind::Award => "Award Image",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Service => write!(f, "service"),
            EntityKind::Award => write!(f, "award"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GalleryItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for `POST /gallery`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGalleryItem {
    pub title: String,
    pub image: String,
    pub category: String,
    pub description: String,
}

/// Filters for `GET /gallery`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GalleryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl GalleryQuery {
    pub fn limit(limit: u32) -> Self {
        Self {
            category: None,
            limit: Some(limit),
        }
    }

    pub fn category(category: impl Into<String>, limit: Option<u32>) -> Self {
        Self {
            category: Some(category.into()),
            limit,
        }
    }
}

// Signing backend / media host payloads

/// The backend may send the timestamp as a number or a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Seconds(i64),
    Text(String),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Seconds(secs) => write!(f, "{}", secs),
            Timestamp::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Single-use credentials for one direct upload. Expiry is enforced by the
/// media host only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadAuthorization {
    pub timestamp: Timestamp,
    pub signature: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub api_key: String,
    pub folder: String,
}

#[derive(Debug, Deserialize)]
pub struct HostUploadResponse {
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub message: Option<String>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub content_api_url: String,
    pub signature_url: String,
    pub login_url: String,
    pub media_host_url: String,
    pub session_file: PathBuf,
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let content_api_url = std::env::var("CONTENT_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("MAX_UPLOAD_BYTES must be a byte count, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            signature_url: std::env::var("SIGNATURE_URL")
                .unwrap_or_else(|_| format!("{}/cloudinary/get-signature", content_api_url)),
            login_url: std::env::var("LOGIN_URL")
                .unwrap_or_else(|_| format!("{}/admin/login", content_api_url)),
            media_host_url: std::env::var("MEDIA_HOST_URL")
                .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
            session_file: match std::env::var_os("SESSION_FILE") {
                Some(path) => PathBuf::from(path),
                None => default_session_file()?,
            },
            content_api_url,
            max_upload_bytes,
        })
    }

    /// Point every backend URL at a different content API root.
    pub fn with_content_api_url(mut self, url: &str) -> Self {
        let url = url.trim_end_matches('/').to_string();
        self.signature_url = format!("{}/cloudinary/get-signature", url);
        self.login_url = format!("{}/admin/login", url);
        self.content_api_url = url;
        self
    }
}

fn default_session_file() -> Result<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(path) => PathBuf::from(path),
        None => {
            let home = std::env::var_os("HOME")
                .ok_or_else(|| Error::Config("HOME not set; set SESSION_FILE".to_string()))?;
            PathBuf::from(home).join(".config")
        }
    };

    Ok(base.join("portfolio-admin").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hero_keeps_unknown_fields() {
        let json = r#"{"_id":"h1","title":"Hello","ctaText":"Go","theme":"dark"}"#;
        let hero: Hero = serde_json::from_str(json).unwrap();

        assert_eq!(hero.cta_text.as_deref(), Some("Go"));
        assert_eq!(hero.extra.get("theme"), Some(&Value::from("dark")));

        let back = serde_json::to_value(&hero).unwrap();
        assert_eq!(back["theme"], "dark");
        assert_eq!(back["_id"], "h1");
        assert!(back.get("image").is_none());
    }

    #[test]
    fn test_attach_image_sets_main_only_when_empty() {
        let mut service = Service::draft("Camps", "Medical camps", vec![]);

        service.attach_image(EntityImage::new("https://host/a.jpg", "A"));
        service.attach_image(EntityImage::new("https://host/b.jpg", "B"));

        assert_eq!(service.images.len(), 2);
        assert_eq!(service.main_image, "https://host/a.jpg");
    }

    #[test]
    fn test_detach_main_image_clears_it() {
        let mut award = Award::draft("Seva Ratna", None, 2024, "");
        award.attach_image(EntityImage::new("https://host/a.jpg", "A"));
        award.attach_image(EntityImage::new("https://host/b.jpg", "B"));

        assert!(award.detach_image("https://host/a.jpg"));
        assert_eq!(award.images.len(), 1);
        assert_eq!(award.main_image, "");
        assert!(!award.detach_image("https://host/missing.jpg"));
    }

    #[test]
    fn test_authorization_accepts_numeric_and_string_timestamps() {
        let numeric: UploadAuthorization = serde_json::from_value(serde_json::json!({
            "timestamp": 1700000000,
            "signature": "sig",
            "cloudName": "demo",
            "uploadPreset": "preset",
            "apiKey": "key",
            "folder": "portfolio"
        }))
        .unwrap();
        assert_eq!(numeric.timestamp.to_string(), "1700000000");

        let text: UploadAuthorization = serde_json::from_value(serde_json::json!({
            "timestamp": "1700000001",
            "signature": "sig",
            "cloudName": "demo",
            "uploadPreset": "preset",
            "apiKey": "key",
            "folder": "portfolio"
        }))
        .unwrap();
        assert_eq!(text.timestamp.to_string(), "1700000001");
    }

    #[test]
    fn test_new_badge_requires_title() {
        assert!(matches!(NewBadge::new("   "), Err(Error::InvalidInput(_))));

        let badge = NewBadge::new(" Trustee ").unwrap();
        assert_eq!(badge.title, "Trustee");
        assert_eq!(badge.position, "top-right");
    }

    #[test]
    fn test_gallery_query_serializes_only_present_filters() {
        let query = GalleryQuery::category("profile", Some(1));
        let encoded = serde_json::to_value(&query).unwrap();
        assert_eq!(encoded, serde_json::json!({"category": "profile", "limit": 1}));

        let encoded = serde_json::to_value(GalleryQuery::default()).unwrap();
        assert_eq!(encoded, serde_json::json!({}));
    }

    #[test]
    fn test_config_override_rewrites_backend_urls() {
        let config = Config {
            content_api_url: "http://a/api".to_string(),
            signature_url: "http://a/api/cloudinary/get-signature".to_string(),
            login_url: "http://a/api/admin/login".to_string(),
            media_host_url: "https://api.cloudinary.com".to_string(),
            session_file: PathBuf::from("/tmp/session.json"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
        .with_content_api_url("https://b.example/api/");

        assert_eq!(config.content_api_url, "https://b.example/api");
        assert_eq!(config.login_url, "https://b.example/api/admin/login");
        assert_eq!(
            config.signature_url,
            "https://b.example/api/cloudinary/get-signature"
        );
    }
}
