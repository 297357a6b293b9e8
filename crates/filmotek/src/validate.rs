//! Request validation, run before anything reaches storage.
//!
//! Field names in errors are the external attribute names.

use crate::request::{
    AddActor, AddFilm, CreateUser, Patch, PartialUpdateActor, PartialUpdateFilm, UpdateActor,
    UpdateFilm,
};
use filmotek_core::ValidationError;

pub const TITLE_MAX_CHARS: usize = 150;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const RATING_MAX: u8 = 10;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn title(errors: &mut ValidationError, value: &str) {
    let len = value.chars().count();
    if len == 0 {
        errors.add_min_length("title", 1, len);
    } else if len > TITLE_MAX_CHARS {
        errors.add_max_length("title", TITLE_MAX_CHARS, len);
    }
}

fn description(errors: &mut ValidationError, value: &str) {
    let len = value.chars().count();
    if len > DESCRIPTION_MAX_CHARS {
        errors.add_max_length("description", DESCRIPTION_MAX_CHARS, len);
    }
}

fn rating(errors: &mut ValidationError, value: u8) {
    if value > RATING_MAX {
        errors.add_max("rating", RATING_MAX, value);
    }
}

fn name(errors: &mut ValidationError, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add_required(field);
    }
}

/// Null is only meaningful for attributes that may be cleared.
fn not_null<T>(errors: &mut ValidationError, field: &'static str, patch: &Patch<T>) {
    if patch.is_null() {
        errors.add_required(field);
    }
}

impl Validate for AddFilm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        title(&mut errors, &self.title);
        description(&mut errors, &self.description);
        rating(&mut errors, self.rating);
        errors.into_result()
    }
}

impl Validate for UpdateFilm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        title(&mut errors, &self.title);
        description(&mut errors, &self.description);
        rating(&mut errors, self.rating);
        errors.into_result()
    }
}

impl Validate for PartialUpdateFilm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        not_null(&mut errors, "title", &self.title);
        not_null(&mut errors, "description", &self.description);
        not_null(&mut errors, "releaseDate", &self.release_date);
        not_null(&mut errors, "rating", &self.rating);
        not_null(&mut errors, "actorsIds", &self.actors_ids);
        if let Some(value) = self.title.value() {
            title(&mut errors, value);
        }
        if let Some(value) = self.description.value() {
            description(&mut errors, value);
        }
        if let Some(value) = self.rating.value() {
            rating(&mut errors, *value);
        }
        errors.into_result()
    }
}

impl Validate for AddActor {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        name(&mut errors, "firstName", &self.first_name);
        name(&mut errors, "lastName", &self.last_name);
        errors.into_result()
    }
}

impl Validate for UpdateActor {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        name(&mut errors, "firstName", &self.first_name);
        name(&mut errors, "lastName", &self.last_name);
        errors.into_result()
    }
}

impl Validate for PartialUpdateActor {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        not_null(&mut errors, "firstName", &self.first_name);
        not_null(&mut errors, "lastName", &self.last_name);
        not_null(&mut errors, "sex", &self.sex);
        not_null(&mut errors, "birthday", &self.birthday);
        if let Some(value) = self.first_name.value() {
            name(&mut errors, "firstName", value);
        }
        if let Some(value) = self.last_name.value() {
            name(&mut errors, "lastName", value);
        }
        errors.into_result()
    }
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        name(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add_required("password");
        }
        errors.into_result()
    }
}
