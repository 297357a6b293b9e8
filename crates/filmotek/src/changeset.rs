//! Change-sets: the column writes of one mutation.
//!
//! Each request shape maps its attributes to writes explicitly, through
//! [`IntoChangeSet`]. Attribute names are `&'static str` literals from that
//! mapping and pass through [`to_column_name`], so every column written
//! comes from a fixed vocabulary.

use crate::request::{
    AddActor, AddFilm, CreateUser, Patch, PartialUpdateActor, PartialUpdateFilm, UpdateActor,
    UpdateFilm,
};
use filmotek_core::{Value, to_column_name};

/// Ordered (column, value) writes for one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    entries: Vec<(String, Value)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` to the column of `attribute`, replacing an earlier
    /// write to the same column in place.
    pub fn put(&mut self, attribute: &'static str, value: impl Into<Value>) {
        let column = to_column_name(attribute);
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Write `value`, or an explicit NULL when absent.
    pub fn put_optional<T: Into<Value>>(&mut self, attribute: &'static str, value: Option<T>) {
        self.put(attribute, value.map_or(Value::Null, Into::into));
    }

    /// Apply partial-update presence rules: unset is skipped, null writes
    /// NULL, a value writes that value.
    pub fn patch<T: Into<Value> + Clone>(&mut self, attribute: &'static str, patch: &Patch<T>) {
        match patch {
            Patch::Unset => {}
            Patch::Null => self.put(attribute, Value::Null),
            Patch::Value(v) => self.put(attribute, v.clone()),
        }
    }

    /// No writes; applying this is a no-op.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The value written to `column`, if any.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl IntoIterator for ChangeSet {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Reduce a request to the scalar column writes it implies.
///
/// Relation changes (a film's actor set) are not part of the change-set.
pub trait IntoChangeSet {
    fn change_set(&self) -> ChangeSet;
}

impl IntoChangeSet for AddFilm {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.put("title", self.title.as_str());
        changes.put("description", self.description.as_str());
        changes.put("releaseDate", self.release_date);
        changes.put("rating", self.rating);
        changes
    }
}

impl IntoChangeSet for UpdateFilm {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.put("title", self.title.as_str());
        changes.put("description", self.description.as_str());
        changes.put("releaseDate", self.release_date);
        changes.put("rating", self.rating);
        changes
    }
}

impl IntoChangeSet for PartialUpdateFilm {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.patch("title", &self.title);
        changes.patch("description", &self.description);
        changes.patch("releaseDate", &self.release_date);
        changes.patch("rating", &self.rating);
        changes
    }
}

impl IntoChangeSet for AddActor {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.put("firstName", self.first_name.as_str());
        changes.put("lastName", self.last_name.as_str());
        changes.put_optional("middleName", self.middle_name.as_deref());
        changes.put("sex", self.sex);
        changes.put("birthday", self.birthday);
        changes
    }
}

impl IntoChangeSet for UpdateActor {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.put("firstName", self.first_name.as_str());
        changes.put("lastName", self.last_name.as_str());
        changes.put_optional("middleName", self.middle_name.as_deref());
        changes.put("sex", self.sex);
        changes.put("birthday", self.birthday);
        changes
    }
}

impl IntoChangeSet for PartialUpdateActor {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.patch("firstName", &self.first_name);
        changes.patch("lastName", &self.last_name);
        changes.patch("middleName", &self.middle_name);
        changes.patch("sex", &self.sex);
        changes.patch("birthday", &self.birthday);
        changes
    }
}

impl IntoChangeSet for CreateUser {
    fn change_set(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.put("username", self.username.as_str());
        changes.put("password", self.password.as_str());
        changes.put("isAdmin", self.is_admin);
        changes
    }
}
