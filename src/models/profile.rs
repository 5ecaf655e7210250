//! Creator profile model
//!
//! Profiles arrive embedded in posts through the profiles join.

use serde::{Deserialize, Serialize};

/// The author of a set of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(alias = "profile_name")]
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

impl Profile {
    pub fn followers_display(&self) -> String {
        format_count(self.followers_count)
    }

    pub fn following_display(&self) -> String {
        format_count(self.following_count)
    }
}

/// Compact counter: `999`, `1.2k`, `120.5k`.
pub fn format_count(count: u64) -> String {
    if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserialize() {
        let json = r#"{
            "id": "luna",
            "username": "luna",
            "avatar_url": "https://cdn.example.com/luna/avatar.jpg",
            "followers_count": 120500,
            "following_count": 240
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();

        assert!(profile.bio.is_none());
        assert_eq!(profile.followers_display(), "120.5k");
        assert_eq!(profile.following_display(), "240");
    }

    #[test]
    fn test_profile_name_alias() {
        let json = r#"{"id": "sol", "profile_name": "Sol"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.username, "Sol");
        assert_eq!(profile.followers_count, 0);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.0k");
        assert_eq!(format_count(1240), "1.2k");
    }
}
