//! Schedule models for the API service

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Schedule category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Lecture,
    Group,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Lecture => "lecture",
            Category::Group => "group",
        }
    }

    /// Color used when the viewer has no membership color for the schedule
    pub fn default_color(&self) -> &'static str {
        match self {
            Category::Lecture => "#1976d2",
            _ => "#2e7d32",
        }
    }

    /// Maximum location length, in characters
    pub fn max_location_len(&self) -> usize {
        match self {
            Category::Lecture => 20,
            _ => 50,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Category::Personal),
            "lecture" => Ok(Category::Lecture),
            "group" => Ok(Category::Group),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schedule row as stored, joined with the viewer's membership color and
/// the scoping team's name
#[derive(Debug, Clone)]
pub struct ScheduleRecord {
    pub id: i64,
    pub user_id: String,
    pub team_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub location: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub is_all_day: bool,
    pub days_of_week: Option<Vec<u8>>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub start_recur: Option<NaiveDate>,
    pub end_recur: Option<NaiveDate>,
    /// The viewer's membership color for `team_id`, if the viewer is a member
    pub group_color: Option<String>,
    pub group_name: Option<String>,
}

/// Schedule as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub id: i64,
    pub user_id: String,
    pub group_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub days_of_week: Option<Vec<u8>>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub start_recur: Option<NaiveDate>,
    pub end_recur: Option<NaiveDate>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl From<ScheduleRecord> for ScheduleView {
    fn from(record: ScheduleRecord) -> Self {
        let color = record
            .group_color
            .unwrap_or_else(|| record.category.default_color().to_string());

        ScheduleView {
            id: record.id,
            user_id: record.user_id,
            group_id: record.team_id,
            title: record.title,
            description: record.description,
            category: record.category,
            location: record.location,
            start: record.start_datetime,
            end: record.end_datetime,
            all_day: record.is_all_day,
            days_of_week: record.days_of_week,
            start_time: record.start_time,
            end_time: record.end_time,
            start_recur: record.start_recur,
            end_recur: record.end_recur,
            color,
            group_name: record.group_name,
        }
    }
}

/// Request body for creating or replacing a schedule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: Option<String>,
    pub group_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub days_of_week: Option<Vec<u8>>,
    #[serde(deserialize_with = "time_of_day::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(deserialize_with = "time_of_day::deserialize")]
    pub end_time: Option<NaiveTime>,
    pub start_recur: Option<NaiveDate>,
    pub end_recur: Option<NaiveDate>,
}

/// Validated schedule fields ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub location: Option<String>,
    /// Always `None` unless the category is `group`
    pub team_id: Option<i64>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub is_all_day: bool,
    pub days_of_week: Option<Vec<u8>>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub start_recur: Option<NaiveDate>,
    pub end_recur: Option<NaiveDate>,
}

/// Accepts `HH:MM` as well as `HH:MM:SS[.fff]`
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        NaiveTime::parse_from_str(&raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid time of day: {}", raw)))
    }
}
