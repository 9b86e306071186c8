//! Input validation for schedules and groups
//!
//! Everything here runs before the store is touched.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{
    group::NewGroup,
    schedule::{Category, ScheduleInput, ScheduleRequest},
};

const MAX_TITLE_LEN: usize = 20;
const MAX_GROUP_NAME_LEN: usize = 20;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Validate a schedule body and resolve it into writable fields
pub fn validate_schedule(request: ScheduleRequest) -> Result<ScheduleInput, String> {
    let category: Category = request.category.parse()?;

    if request.title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if char_len(&request.title) > MAX_TITLE_LEN {
        return Err(format!(
            "Title must be at most {} characters long",
            MAX_TITLE_LEN
        ));
    }

    if let Some(location) = &request.location {
        let max = category.max_location_len();
        if char_len(location) > max {
            return Err(format!(
                "Location must be at most {} characters long for {} schedules",
                max, category
            ));
        }
    }

    let team_id = match category {
        Category::Group => Some(
            request
                .group_id
                .ok_or_else(|| "Group schedules require a groupId".to_string())?,
        ),
        _ => None,
    };

    if let (Some(start), Some(end)) = (request.start, request.end) {
        if end < start {
            return Err("End must not be before start".to_string());
        }
    }

    if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
        if end < start {
            return Err("End time must not be before start time".to_string());
        }
    }

    if let (Some(start), Some(end)) = (request.start_recur, request.end_recur) {
        if end < start {
            return Err("Recurrence end must not be before its start".to_string());
        }
    }

    if let Some(days) = &request.days_of_week {
        if days.iter().any(|day| *day > 6) {
            return Err("Days of week must be between 0 (Sunday) and 6 (Saturday)".to_string());
        }
        let mut seen = [false; 7];
        for day in days {
            if std::mem::replace(&mut seen[*day as usize], true) {
                return Err("Days of week must not repeat".to_string());
            }
        }
    }

    Ok(ScheduleInput {
        title: request.title,
        description: request.description,
        category,
        location: request.location,
        team_id,
        start_datetime: request.start,
        end_datetime: request.end,
        is_all_day: request.all_day,
        days_of_week: request.days_of_week,
        start_time: request.start_time,
        end_time: request.end_time,
        start_recur: request.start_recur,
        end_recur: request.end_recur,
    })
}

/// Validate a group name
pub fn validate_group_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Group name is required".to_string());
    }

    if char_len(name) > MAX_GROUP_NAME_LEN {
        return Err(format!(
            "Group name must be at most {} characters long",
            MAX_GROUP_NAME_LEN
        ));
    }

    Ok(())
}

/// Validate a new group
pub fn validate_new_group(name: String, description: Option<String>) -> Result<NewGroup, String> {
    validate_group_name(&name)?;
    Ok(NewGroup { name, description })
}

/// Validate a display color (`#rgb` or `#rrggbb`)
pub fn validate_color(color: &str) -> Result<(), String> {
    static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COLOR_REGEX.get_or_init(|| {
        Regex::new(r"^#(?:[0-9A-Fa-f]{3}){1,2}$").expect("Failed to compile color regex")
    });

    if !regex.is_match(color) {
        return Err("Color must be a hex value like #ed6c02".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(category: &str) -> ScheduleRequest {
        ScheduleRequest {
            title: "Meeting".to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn personal_schedule_drops_group_id() {
        let mut req = request("personal");
        req.group_id = Some(3);

        let input = validate_schedule(req).unwrap();
        assert_eq!(input.category, Category::Personal);
        assert_eq!(input.team_id, None);
    }

    #[test]
    fn group_schedule_requires_group_id() {
        assert!(validate_schedule(request("group")).is_err());

        let mut req = request("group");
        req.group_id = Some(1);
        assert_eq!(validate_schedule(req).unwrap().team_id, Some(1));
    }

    #[test]
    fn title_is_required_and_bounded() {
        let mut req = request("personal");
        req.title = "  ".to_string();
        assert!(validate_schedule(req).is_err());

        let mut req = request("personal");
        req.title = "가".repeat(20);
        assert!(validate_schedule(req).is_ok());

        let mut req = request("personal");
        req.title = "가".repeat(21);
        assert!(validate_schedule(req).is_err());
    }

    #[test]
    fn location_limit_depends_on_category() {
        let mut lecture = request("lecture");
        lecture.location = Some("x".repeat(21));
        assert!(validate_schedule(lecture).is_err());

        let mut personal = request("personal");
        personal.location = Some("x".repeat(50));
        assert!(validate_schedule(personal).is_ok());

        let mut personal = request("personal");
        personal.location = Some("x".repeat(51));
        assert!(validate_schedule(personal).is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(validate_schedule(request("work")).is_err());
        assert!(validate_schedule(request("")).is_err());
    }

    #[test]
    fn ranges_must_be_ordered() {
        let mut req = request("personal");
        req.start = "2024-01-01T11:00:00Z".parse().ok();
        req.end = "2024-01-01T10:00:00Z".parse().ok();
        assert!(validate_schedule(req).is_err());

        let mut req = request("lecture");
        req.start_time = chrono::NaiveTime::from_hms_opt(10, 0, 0);
        req.end_time = chrono::NaiveTime::from_hms_opt(9, 0, 0);
        assert!(validate_schedule(req).is_err());

        let mut req = request("lecture");
        req.start_recur = chrono::NaiveDate::from_ymd_opt(2024, 6, 1);
        req.end_recur = chrono::NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(validate_schedule(req).is_err());
    }

    #[test]
    fn days_of_week_keep_their_order() {
        let mut req = request("lecture");
        req.days_of_week = Some(vec![4, 0, 2]);
        assert_eq!(
            validate_schedule(req).unwrap().days_of_week,
            Some(vec![4, 0, 2])
        );
    }

    #[test]
    fn days_of_week_must_be_valid_and_unique() {
        let mut req = request("lecture");
        req.days_of_week = Some(vec![7]);
        assert!(validate_schedule(req).is_err());

        let mut req = request("lecture");
        req.days_of_week = Some(vec![1, 1]);
        assert!(validate_schedule(req).is_err());
    }

    #[test]
    fn group_names_are_required_and_bounded() {
        assert!(validate_group_name("Study").is_ok());
        assert!(validate_group_name("").is_err());
        assert!(validate_group_name(&"x".repeat(21)).is_err());
        assert!(validate_new_group("Study".to_string(), None).is_ok());
    }

    #[test]
    fn colors_are_hex() {
        assert!(validate_color("#ed6c02").is_ok());
        assert!(validate_color("#FFF").is_ok());
        assert!(validate_color("red").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("ed6c02").is_err());
    }
}
