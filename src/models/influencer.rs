//! Influencer model
//!
//! Profiles shown in discovery results and kept in the saved shortlist.
//! Field names serialize in camelCase so persisted lists and AI responses
//! share one shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social network an influencer publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialPlatform {
    Instagram,
    TikTok,
    YouTube,
    Twitter,
    Facebook,
}

impl SocialPlatform {
    /// All platforms offered in search filters
    pub const ALL: [SocialPlatform; 5] = [
        SocialPlatform::Instagram,
        SocialPlatform::TikTok,
        SocialPlatform::YouTube,
        SocialPlatform::Twitter,
        SocialPlatform::Facebook,
    ];
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::TikTok => "TikTok",
            SocialPlatform::YouTube => "YouTube",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Facebook => "Facebook",
        };
        f.write_str(name)
    }
}

impl FromStr for SocialPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SocialPlatform::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

/// Categories offered in search filters and profile defaults
pub const AVAILABLE_CATEGORIES: [&str; 10] = [
    "Beauty",
    "Fashion",
    "Tech",
    "Gaming",
    "Travel",
    "Food",
    "Fitness",
    "Lifestyle",
    "Education",
    "Finance",
];

/// Share of an age bracket such as "18-24", in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeShare {
    pub range: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderShare {
    pub gender: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationShare {
    pub location: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceDemographics {
    pub age_range: Vec<AgeShare>,
    pub gender_split: Vec<GenderShare>,
    pub top_locations: Vec<LocationShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    /// Growth rate in percent
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentExample {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// An influencer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    /// Identifier, unique within the saved list
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub platform: SocialPlatform,
    /// Display follower count, e.g. "1.2M"
    pub followers: String,
    /// Display engagement rate, e.g. "2.5%"
    pub engagement_rate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_engagement_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_followers: Option<u64>,
    pub niche: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_demographics: Option<AudienceDemographics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_metrics: Option<EngagementMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_post_idea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_examples: Option<Vec<ContentExample>>,
}

impl Influencer {
    /// Create a profile with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: SocialPlatform,
        followers: impl Into<String>,
        engagement_rate: impl Into<String>,
        niche: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            profile_picture_url: format!("https://i.pravatar.cc/300?u={}", id),
            id,
            name: name.into(),
            platform,
            followers: followers.into(),
            engagement_rate: engagement_rate.into(),
            numeric_engagement_rate: None,
            numeric_followers: None,
            niche: niche.into(),
            bio: None,
            audience_demographics: None,
            engagement_metrics: None,
            sample_post_idea: None,
            is_verified: None,
            content_examples: None,
        }
    }

    /// Whether the profile carries the verified badge
    pub fn verified(&self) -> bool {
        self.is_verified.unwrap_or(false)
    }
}
