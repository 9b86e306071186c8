//! Access rules for schedules and groups
//!
//! The caller id always comes from the verified token. Membership is read
//! from the store inside the same transaction as the write it guards, with
//! a share lock on the membership row so a concurrent kick or leave cannot
//! slip in between the check and the write.

use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgConnection;

use crate::models::{
    group::Role,
    schedule::{Category, ScheduleRecord},
};

/// Whether `viewer_id` may read `schedule`
///
/// Owners always can. Group schedules are readable by current members of the
/// scoping team, which the record carries as the viewer's membership color.
pub fn can_view_schedule(schedule: &ScheduleRecord, viewer_id: &str) -> bool {
    if schedule.user_id == viewer_id {
        return true;
    }

    schedule.category == Category::Group && schedule.group_color.is_some()
}

/// Only the owner may change or delete a schedule, group membership or not
pub fn can_mutate_schedule(owner_id: &str, requester_id: &str) -> bool {
    owner_id == requester_id
}

/// Role of `user_id` in `team_id`, locking the membership row for the
/// rest of the transaction
pub async fn membership_role(
    conn: &mut PgConnection,
    team_id: i64,
    user_id: &str,
) -> DatabaseResult<Option<Role>> {
    let role: Option<String> = sqlx::query_scalar(
        r#"
        SELECT role
        FROM team_members
        WHERE team_id = $1 AND user_id = $2
        FOR SHARE
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::query)?;

    role.map(|r| {
        r.parse::<Role>()
            .map_err(|e| DatabaseError::Query(sqlx::Error::Decode(e.into())))
    })
    .transpose()
}

/// Whether `user_id` holds the leader role in `team_id`
pub async fn require_leader(
    conn: &mut PgConnection,
    team_id: i64,
    user_id: &str,
) -> DatabaseResult<bool> {
    Ok(membership_role(conn, team_id, user_id).await? == Some(Role::Leader))
}

/// Whether `user_id` is a member of `team_id` in any role
pub async fn is_member(conn: &mut PgConnection, team_id: i64, user_id: &str) -> DatabaseResult<bool> {
    Ok(membership_role(conn, team_id, user_id).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(owner: &str, category: Category, viewer_color: Option<&str>) -> ScheduleRecord {
        ScheduleRecord {
            id: 1,
            user_id: owner.to_string(),
            team_id: (category == Category::Group).then_some(1),
            title: "Meeting".to_string(),
            description: None,
            category,
            location: None,
            start_datetime: None,
            end_datetime: None,
            is_all_day: false,
            days_of_week: None,
            start_time: None,
            end_time: None,
            start_recur: None,
            end_recur: None,
            group_color: viewer_color.map(str::to_string),
            group_name: None,
        }
    }

    #[test]
    fn owners_can_view_their_schedules() {
        for category in [Category::Personal, Category::Lecture, Category::Group] {
            assert!(can_view_schedule(&schedule("alice", category, None), "alice"));
        }
    }

    #[test]
    fn members_can_view_group_schedules() {
        let record = schedule("alice", Category::Group, Some("#ed6c02"));
        assert!(can_view_schedule(&record, "bob"));
    }

    #[test]
    fn non_members_cannot_view_group_schedules() {
        let record = schedule("alice", Category::Group, None);
        assert!(!can_view_schedule(&record, "carol"));
    }

    #[test]
    fn personal_schedules_stay_private() {
        // A stray color on a personal schedule never grants access.
        let record = schedule("alice", Category::Personal, Some("#ed6c02"));
        assert!(!can_view_schedule(&record, "bob"));
        assert!(!can_view_schedule(&schedule("alice", Category::Lecture, None), "bob"));
    }

    #[test]
    fn only_owners_mutate() {
        assert!(can_mutate_schedule("alice", "alice"));
        assert!(!can_mutate_schedule("alice", "bob"));
    }
}
