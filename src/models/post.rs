//! Feed post model
//!
//! Wire format matches the remote posts table, including the premium
//! details join which arrives as an array and the optional profile join.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Profile;

/// A single feed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub image_url: String,
    #[serde(default)]
    pub cta_url: Option<String>,
    pub category: String,
    #[serde(
        rename = "7verse_post_premium_details",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    premium_details: Option<Vec<PremiumDetails>>,
    #[serde(
        rename = "7verse_profiles",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<Profile>,
}

impl Post {
    /// Premium details of the post, if the join returned any.
    pub fn premium_details(&self) -> Option<&PremiumDetails> {
        self.premium_details.as_ref().and_then(|details| details.first())
    }

    pub fn with_premium_details(mut self, details: PremiumDetails) -> Self {
        self.premium_details = Some(vec![details]);
        self
    }

    pub fn is_premium(&self) -> bool {
        self.category == "premium"
    }
}

/// Pricing for gated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumDetails {
    pub price_usd: f64,
    #[serde(default)]
    pub full_content_url: Option<String>,
}

impl PremiumDetails {
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price_usd)
    }
}

/// Posts of a single profile, newest first.
pub fn posts_by_profile(posts: &[Post], profile_id: &str) -> Vec<Post> {
    let mut posts: Vec<Post> = posts
        .iter()
        .filter(|post| post.profile_id == profile_id)
        .cloned()
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

/// Groups posts by author.
///
/// Groups are ordered by their newest post, newest first; posts inside a
/// group are sorted newest first as well.
pub fn group_by_profile(posts: &[Post]) -> Vec<Vec<Post>> {
    let mut groups: HashMap<&str, Vec<Post>> = HashMap::new();
    for post in posts {
        groups
            .entry(post.profile_id.as_str())
            .or_default()
            .push(post.clone());
    }

    let mut groups: Vec<Vec<Post>> = groups
        .into_values()
        .map(|mut group| {
            group.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            group
        })
        .collect();

    // Ties broken by profile id so the order is stable
    groups.sort_by(|a, b| {
        b[0].created_at
            .cmp(&a[0].created_at)
            .then_with(|| a[0].profile_id.cmp(&b[0].profile_id))
    });
    groups
}


#[cfg(test)]
mod tests {
    use super::fixtures::post;
    use super::*;

    const WIRE_POST: &str = r##"{
        "id": "5f0c3a52-2b1e-4d4e-9a57-0c1b2d3e4f50",
        "profile_id": "luna",
        "created_at": "2025-06-01T12:00:00Z",
        "caption": "Golden hour",
        "hashtags": ["#sunset", "#beach"],
        "image_url": "https://cdn.example.com/luna/1.jpg",
        "cta_url": null,
        "category": "premium",
        "7verse_post_premium_details": [
            {"price_usd": 4.5, "full_content_url": "https://cdn.example.com/luna/full.mp4"}
        ]
    }"##;

    #[test]
    fn test_post_deserialize_wire_format() {
        let post: Post = serde_json::from_str(WIRE_POST).unwrap();

        assert_eq!(post.profile_id, "luna");
        assert_eq!(post.hashtags.len(), 2);
        assert!(post.cta_url.is_none());
        assert!(post.is_premium());

        let details = post.premium_details().unwrap();
        assert_eq!(details.display_price(), "$4.50");
        assert!(details.full_content_url.is_some());
    }

    #[test]
    fn test_post_without_join() {
        let json = r##"{
            "id": "5f0c3a52-2b1e-4d4e-9a57-0c1b2d3e4f51",
            "profile_id": "sol",
            "created_at": "2025-06-01T12:00:00Z",
            "caption": "",
            "image_url": "https://cdn.example.com/sol/1.jpg",
            "category": "free"
        }"##;
        let post: Post = serde_json::from_str(json).unwrap();

        assert!(post.premium_details().is_none());
        assert!(!post.is_premium());
        assert!(post.hashtags.is_empty());
    }

    #[test]
    fn test_empty_join_array_has_no_details() {
        let mut value: serde_json::Value = serde_json::from_str(WIRE_POST).unwrap();
        value["7verse_post_premium_details"] = serde_json::json!([]);
        let post: Post = serde_json::from_value(value).unwrap();
        assert!(post.premium_details().is_none());
    }

    #[test]
    fn test_post_serializes_created_at_as_iso8601() {
        let json = serde_json::to_string(&post("luna", 5)).unwrap();
        assert!(json.contains(r#""created_at":"2025-06-01T12:05:00Z""#));
        assert!(!json.contains("7verse_post_premium_details"));
    }

    #[test]
    fn test_display_price_rounds() {
        let details = PremiumDetails {
            price_usd: 9.999,
            full_content_url: None,
        };
        assert_eq!(details.display_price(), "$10.00");
    }

    #[test]
    fn test_group_by_profile_orders_groups_and_posts() {
        let posts = vec![
            post("luna", 1),
            post("sol", 10),
            post("luna", 20),
            post("mar", 5),
            post("sol", 2),
        ];

        let groups = group_by_profile(&posts);

        let order: Vec<&str> = groups.iter().map(|g| g[0].profile_id.as_str()).collect();
        assert_eq!(order, vec!["luna", "sol", "mar"]);
        assert_eq!(groups[0][0].created_at, post("luna", 20).created_at);
        assert_eq!(groups[0][1].created_at, post("luna", 1).created_at);
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn test_post_with_profile_join() {
        let mut value: serde_json::Value = serde_json::from_str(WIRE_POST).unwrap();
        value["7verse_profiles"] = serde_json::json!({
            "id": "luna",
            "profile_name": "Luna",
            "followers_count": 1500
        });
        let post: Post = serde_json::from_value(value).unwrap();

        let profile = post.profile.as_ref().unwrap();
        assert_eq!(profile.username, "Luna");
        assert_eq!(profile.followers_display(), "1.5k");
        assert!(serde_json::to_string(&post).unwrap().contains("7verse_profiles"));
    }

    #[test]
    fn test_posts_by_profile_filters_and_sorts() {
        let posts = vec![post("luna", 1), post("sol", 10), post("luna", 20)];

        let luna = posts_by_profile(&posts, "luna");
        assert_eq!(luna.len(), 2);
        assert_eq!(luna[0].created_at, post("luna", 20).created_at);
        assert!(posts_by_profile(&posts, "nobody").is_empty());
    }

    #[test]
    fn test_group_by_profile_empty() {
        assert!(group_by_profile(&[]).is_empty());
    }
}
