use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile. One record per user, stored in its own keyed database.
///
/// `id` is assigned by the caller and never changes once the record exists.
/// `created_at` is stamped once on creation and `updated_at` on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub picture: Option<Uuid>,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default, alias = "hobies")]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub photos: Vec<Uuid>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub street: String,
    pub created_at: DateTime<Utc>,
    #[serde(alias = "update_at")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile for `id`; both timestamps start at the epoch until the
    /// store stamps them.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            picture: None,
            age: 0,
            birth_date: None,
            height: 0,
            weight: 0,
            hobbies: Vec::new(),
            photos: Vec::new(),
            city: String::new(),
            country: String::new(),
            street: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Partial update accepted by the HTTP layer. Absent fields are left alone.
///
/// `id`, timestamps and the photo references are not client-writable.
/// `birth_date: null` clears the stored date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    #[serde(alias = "hobies")]
    pub hobbies: Option<Vec<String>>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(birth_date) = self.birth_date {
            profile.birth_date = birth_date;
        }
        if let Some(height) = self.height {
            profile.height = height;
        }
        if let Some(weight) = self.weight {
            profile.weight = weight;
        }
        if let Some(hobbies) = self.hobbies {
            profile.hobbies = hobbies;
        }
        if let Some(city) = self.city {
            profile.city = city;
        }
        if let Some(country) = self.country {
            profile.country = country;
        }
        if let Some(street) = self.street {
            profile.street = street;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_json_field_names() {
        let mut profile = Profile::new("gernest");
        profile.hobbies = vec!["chess".to_string()];
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["id"], "gernest");
        assert_eq!(value["hobbies"][0], "chess");
        assert!(value.get("updated_at").is_some());
        assert!(value.get("created_at").is_some());
        assert!(value["picture"].is_null());
    }

    #[test]
    fn test_profile_accepts_legacy_names() {
        let json = r#"{
            "id": "legacy",
            "hobies": ["fishing"],
            "created_at": "2015-06-01T10:00:00Z",
            "update_at": "2015-06-02T10:00:00Z"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.hobbies, vec!["fishing".to_string()]);
        assert!(profile.updated_at > profile.created_at);
        assert_eq!(profile.city, "");
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let mut profile = Profile::new("p1");
        profile.country = "Tanzania".to_string();

        let update: ProfileUpdate = serde_json::from_str(r#"{"city":"mwanza","age":30}"#).unwrap();
        update.apply(&mut profile);

        assert_eq!(profile.city, "mwanza");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.country, "Tanzania");
        assert_eq!(profile.id, "p1");
    }

    #[test]
    fn test_update_sets_and_clears_birth_date() {
        let mut profile = Profile::new("p1");

        let update: ProfileUpdate = serde_json::from_str(r#"{"birth_date":"1990-04-12"}"#).unwrap();
        update.apply(&mut profile);
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));

        let update: ProfileUpdate = serde_json::from_str(r#"{"city":"mwanza"}"#).unwrap();
        update.apply(&mut profile);
        assert!(profile.birth_date.is_some());

        let update: ProfileUpdate = serde_json::from_str(r#"{"birth_date":null}"#).unwrap();
        update.apply(&mut profile);
        assert_eq!(profile.birth_date, None);
    }
}
