//! Built-in influencer catalogue
//!
//! Searched when AI suggestions are off, unavailable or failing.

use crate::models::{Influencer, SocialPlatform};

fn entry(
    id: &str,
    name: &str,
    platform: SocialPlatform,
    followers: (&str, u64),
    engagement: (&str, f64),
    niche: &str,
    slug: &str,
) -> Influencer {
    Influencer {
        numeric_followers: Some(followers.1),
        numeric_engagement_rate: Some(engagement.1),
        profile_picture_url: format!("https://i.pravatar.cc/300?u={}", slug),
        ..Influencer::new(id, name, platform, followers.0, engagement.0, niche)
    }
}

/// The mock catalogue, in display order
pub fn mock_influencers() -> Vec<Influencer> {
    vec![
        Influencer {
            is_verified: Some(true),
            sample_post_idea: Some("Five small swaps for a greener home".to_string()),
            ..entry(
                "1",
                "Alice Wonderland",
                SocialPlatform::Instagram,
                ("1.2M", 1_200_000),
                ("3.5%", 3.5),
                "Lifestyle",
                "alice",
            )
        },
        Influencer {
            sample_post_idea: Some("Turning scrap wood into a birdhouse".to_string()),
            ..entry(
                "2",
                "Bob The Builder",
                SocialPlatform::YouTube,
                ("500K", 500_000),
                ("5.1%", 5.1),
                "DIY & Crafts",
                "bob",
            )
        },
        Influencer {
            is_verified: Some(true),
            ..entry(
                "3",
                "Charlie Chaplin",
                SocialPlatform::TikTok,
                ("2.5M", 2_500_000),
                ("10.2%", 10.2),
                "Comedy",
                "charlie",
            )
        },
        entry(
            "4",
            "Diana Prince",
            SocialPlatform::Twitter,
            ("800K", 800_000),
            ("2.1%", 2.1),
            "Activism",
            "diana",
        ),
        Influencer {
            sample_post_idea: Some("Paper art, one fold at a time".to_string()),
            ..entry(
                "5",
                "Edward Scissorhands",
                SocialPlatform::Instagram,
                ("950K", 950_000),
                ("4.0%", 4.0),
                "Art & Design",
                "edward",
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_ids_are_unique() {
        let catalogue = mock_influencers();
        let ids: HashSet<_> = catalogue.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), catalogue.len());
    }

    #[test]
    fn test_numeric_fields_are_filled() {
        for influencer in mock_influencers() {
            assert!(influencer.numeric_followers.is_some());
            assert!(influencer.numeric_engagement_rate.is_some());
        }
    }
}
