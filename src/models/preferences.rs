//! Brand preferences and user profile

use serde::{Deserialize, Serialize};

use super::SocialPlatform;

/// What the brand is looking for; drives the defaults of a discovery search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPreferences {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub target_audience_keywords: Vec<String>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub preferred_platforms: Vec<SocialPlatform>,
}

impl Default for BrandPreferences {
    fn default() -> Self {
        Self {
            brand_name: String::new(),
            target_audience_keywords: Vec::new(),
            preferred_categories: Vec::new(),
            preferred_platforms: vec![SocialPlatform::Instagram],
        }
    }
}

impl BrandPreferences {
    /// Add a category unless it is already listed
    pub fn add_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        if !self.preferred_categories.contains(&category) {
            self.preferred_categories.push(category);
        }
    }

    /// Add a platform unless it is already listed
    pub fn add_platform(&mut self, platform: SocialPlatform) {
        if !self.preferred_platforms.contains(&platform) {
            self.preferred_platforms.push(platform);
        }
    }
}

/// Profile of the brand user; absent until first saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub brand_name: String,
    /// Free-text description of the target audience
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub default_categories: Vec<String>,
    #[serde(default)]
    pub default_platforms: Vec<String>,
}
