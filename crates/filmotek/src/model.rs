//! Catalog records as read back from storage.

use chrono::NaiveDate;
use filmotek_core::error::TypeError;
use filmotek_core::{Error, FromValue, Result, Row, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// External textual form of a calendar date.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// A calendar date, written `dd-mm-yyyy` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub NaiveDate);

impl Date {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }

    pub const fn naive(self) -> NaiveDate {
        self.0
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(Date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            serde::de::Error::custom(format!("invalid date '{raw}', expected dd-mm-yyyy"))
        })
    }
}

impl From<Date> for Value {
    fn from(date: Date) -> Self {
        Value::from(date.0)
    }
}

impl FromValue for Date {
    fn from_value(value: &Value) -> Result<Self> {
        NaiveDate::from_value(value).map(Date)
    }
}

/// Sex of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl From<Sex> for Value {
    fn from(sex: Sex) -> Self {
        Value::Text(sex.as_str().to_string())
    }
}

impl FromValue for Sex {
    fn from_value(value: &Value) -> Result<Self> {
        match value.as_str() {
            Some("male") => Ok(Sex::Male),
            Some("female") => Ok(Sex::Female),
            Some(other) => Err(Error::Type(TypeError {
                expected: "sex",
                actual: format!("unknown value '{other}'"),
                column: None,
            })),
            None => Err(Error::Type(TypeError {
                expected: "sex",
                actual: value.type_name().to_string(),
                column: None,
            })),
        }
    }
}

/// A registered user. The password is an opaque, already hashed credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
}

impl User {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            username: row.get_named("username")?,
            password: row.get_named("password")?,
            is_admin: row.get_named("is_admin")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub sex: Sex,
    pub birthday: Date,
}

impl Actor {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            first_name: row.get_named("first_name")?,
            last_name: row.get_named("last_name")?,
            middle_name: row.get_named("middle_name")?,
            sex: row.get_named("sex")?,
            birthday: row.get_named("birthday")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub release_date: Date,
    pub rating: u8,
}

impl Film {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            title: row.get_named("title")?,
            description: row.get_named("description")?,
            release_date: row.get_named("release_date")?,
            rating: row.get_named("rating")?,
        })
    }
}

/// A film together with its actors, as returned by a film listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmWithActors {
    #[serde(flatten)]
    pub film: Film,
    pub actors: Vec<Actor>,
}

/// An actor together with their films, as returned by an actor listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorWithFilms {
    #[serde(flatten)]
    pub actor: Actor,
    pub films: Vec<Film>,
}
