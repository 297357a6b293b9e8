//! Mutation and listing requests, in their external (camelCase) form.
//!
//! Full requests carry every attribute. Partial requests wrap each attribute
//! in [`Patch`] so that "not sent" and "sent as null" stay distinguishable.

use crate::model::{Date, Sex};
use serde::{Deserialize, Deserializer};

/// One attribute of a partial update.
///
/// Fields of this type must be marked `#[serde(default)]`: an absent key
/// deserializes to [`Patch::Unset`], JSON `null` to [`Patch::Null`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Not provided; leave the stored value alone.
    #[default]
    Unset,
    /// Explicitly cleared.
    Null,
    /// Replace with this value.
    Value(T),
}

impl<T> Patch<T> {
    pub const fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    /// The provided value, if any.
    pub const fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Null, Patch::Value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFilm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_date: Date,
    #[serde(default)]
    pub rating: u8,
    pub actors_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFilm {
    pub title: String,
    pub description: String,
    pub release_date: Date,
    #[serde(default)]
    pub rating: u8,
    pub actors_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialUpdateFilm {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub release_date: Patch<Date>,
    pub rating: Patch<u8>,
    pub actors_ids: Patch<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub sex: Sex,
    pub birthday: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub sex: Sex,
    pub birthday: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialUpdateActor {
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub middle_name: Patch<String>,
    pub sex: Patch<Sex>,
    pub birthday: Patch<Date>,
}

/// Registration of a user. `password` is already hashed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Listing parameters shared by the film and actor listings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    /// Case-insensitive substring matched against names and titles
    pub search: Option<String>,
    /// Comma-separated attribute names, `-` prefix for descending
    pub sort_by: Option<String>,
}

impl ListQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort_by(mut self, keys: impl Into<String>) -> Self {
        self.sort_by = Some(keys.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let request: PartialUpdateActor =
            serde_json::from_str(r#"{"firstName": "Al", "middleName": null}"#).unwrap();
        assert_eq!(request.first_name, Patch::Value("Al".to_string()));
        assert!(request.middle_name.is_null());
        assert!(request.last_name.is_unset());
        assert!(request.sex.is_unset());
        assert!(request.birthday.is_unset());
    }

    #[test]
    fn test_partial_film_accepts_empty_object() {
        let request: PartialUpdateFilm = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PartialUpdateFilm::default());
    }

    #[test]
    fn test_partial_film_actor_ids() {
        let request: PartialUpdateFilm =
            serde_json::from_str(r#"{"actorsIds": [3, 1], "rating": 7}"#).unwrap();
        assert_eq!(request.actors_ids.value(), Some(&vec![3, 1]));
        assert_eq!(request.rating, Patch::Value(7));
    }

    #[test]
    fn test_bad_date_is_rejected_at_deserialization() {
        let err = serde_json::from_str::<AddActor>(
            r#"{"firstName": "A", "lastName": "B", "sex": "male", "birthday": "1990-01-01"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dd-mm-yyyy"));
    }

    #[test]
    fn test_unknown_sex_is_rejected() {
        assert!(
            serde_json::from_str::<AddActor>(
                r#"{"firstName": "A", "lastName": "B", "sex": "robot", "birthday": "01-01-1990"}"#,
            )
            .is_err()
        );
    }

    #[test]
    fn test_update_actor_middle_name_defaults_to_none() {
        let request: UpdateActor = serde_json::from_str(
            r#"{"firstName": "A", "lastName": "B", "sex": "female", "birthday": "01-01-1990"}"#,
        )
        .unwrap();
        assert_eq!(request.middle_name, None);
    }

    #[test]
    fn test_list_query_field_names() {
        let query: ListQuery =
            serde_json::from_str(r#"{"search": "heat", "sortBy": "title,-rating"}"#).unwrap();
        assert_eq!(
            query,
            ListQuery::default().search("heat").sort_by("title,-rating")
        );
    }
}
