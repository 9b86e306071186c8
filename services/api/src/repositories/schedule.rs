//! Schedule repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;

use super::WriteOutcome;
use crate::{
    access,
    models::schedule::{Category, ScheduleInput, ScheduleRecord},
};

/// Schedule repository for database operations
#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every schedule `viewer_id` may see: their own, plus group schedules of
    /// the teams they belong to
    ///
    /// Membership and schedules are read in one statement, so a concurrent
    /// join or leave is either fully reflected or not at all.
    pub async fn list_visible(&self, viewer_id: &str) -> DatabaseResult<Vec<ScheduleRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.user_id, s.team_id, s.title, s.description, s.category,
                   s.location, s.start_datetime, s.end_datetime, s.is_all_day,
                   s.days_of_week, s.start_time, s.end_time, s.start_recur, s.end_recur,
                   tm.color AS group_color, NULL::TEXT AS group_name
            FROM schedules s
            LEFT JOIN team_members tm ON tm.team_id = s.team_id AND tm.user_id = $1
            WHERE s.user_id = $1
               OR (s.category = 'group' AND tm.id IS NOT NULL)
            ORDER BY s.start_datetime NULLS LAST, s.id
            "#,
        )
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        rows.iter()
            .map(schedule_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::query)
    }

    /// Load a schedule with the viewer's membership color and the group name
    ///
    /// No access check happens here; see [`access::can_view_schedule`].
    pub async fn find_for_viewer(
        &self,
        id: i64,
        viewer_id: &str,
    ) -> DatabaseResult<Option<ScheduleRecord>> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.user_id, s.team_id, s.title, s.description, s.category,
                   s.location, s.start_datetime, s.end_datetime, s.is_all_day,
                   s.days_of_week, s.start_time, s.end_time, s.start_recur, s.end_recur,
                   tm.color AS group_color, t.name AS group_name
            FROM schedules s
            LEFT JOIN teams t ON t.id = s.team_id
            LEFT JOIN team_members tm ON tm.team_id = s.team_id AND tm.user_id = $2
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .bind(viewer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        row.as_ref()
            .map(schedule_from_row)
            .transpose()
            .map_err(DatabaseError::query)
    }

    /// Create a schedule owned by `owner_id`
    ///
    /// Group schedules may only be filed into a team the owner belongs to.
    pub async fn create(
        &self,
        owner_id: &str,
        input: &ScheduleInput,
    ) -> DatabaseResult<WriteOutcome<i64>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        if let Some(team_id) = input.team_id {
            if !access::is_member(&mut *tx, team_id, owner_id).await? {
                return Ok(WriteOutcome::Forbidden);
            }
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO schedules
                (user_id, team_id, title, description, category, location,
                 start_datetime, end_datetime, is_all_day,
                 days_of_week, start_time, end_time, start_recur, end_recur)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(input.team_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(&input.location)
        .bind(input.start_datetime)
        .bind(input.end_datetime)
        .bind(input.is_all_day)
        .bind(input.days_of_week.as_ref().map(Json))
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.start_recur)
        .bind(input.end_recur)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Created schedule {} for user {}", id, owner_id);
        Ok(WriteOutcome::Applied(id))
    }

    /// Replace every mutable field of a schedule; owner only
    ///
    /// Moving the schedule into a different team requires membership there.
    /// Keeping it in its current team does not, so an owner who left the
    /// team can still edit it.
    pub async fn update(
        &self,
        id: i64,
        requester_id: &str,
        input: &ScheduleInput,
    ) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        let Some((owner_id, current_team)) = lock_schedule(&mut *tx, id).await? else {
            return Ok(WriteOutcome::NotFound);
        };

        if !access::can_mutate_schedule(&owner_id, requester_id) {
            return Ok(WriteOutcome::Forbidden);
        }

        if let Some(team_id) = input.team_id {
            if current_team != Some(team_id)
                && !access::is_member(&mut *tx, team_id, requester_id).await?
            {
                return Ok(WriteOutcome::Forbidden);
            }
        }

        sqlx::query(
            r#"
            UPDATE schedules SET
                title = $1, description = $2, category = $3, location = $4,
                start_datetime = $5, end_datetime = $6, is_all_day = $7,
                days_of_week = $8, start_time = $9, end_time = $10,
                start_recur = $11, end_recur = $12, team_id = $13,
                updated_at = NOW()
            WHERE id = $14
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(&input.location)
        .bind(input.start_datetime)
        .bind(input.end_datetime)
        .bind(input.is_all_day)
        .bind(input.days_of_week.as_ref().map(Json))
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.start_recur)
        .bind(input.end_recur)
        .bind(input.team_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Updated schedule {}", id);
        Ok(WriteOutcome::Applied(()))
    }

    /// Delete a schedule; owner only
    pub async fn delete(&self, id: i64, requester_id: &str) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        let Some((owner_id, _)) = lock_schedule(&mut *tx, id).await? else {
            return Ok(WriteOutcome::NotFound);
        };

        if !access::can_mutate_schedule(&owner_id, requester_id) {
            return Ok(WriteOutcome::Forbidden);
        }

        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Deleted schedule {}", id);
        Ok(WriteOutcome::Applied(()))
    }
}

/// Lock a schedule row and return its owner and team
async fn lock_schedule(
    conn: &mut sqlx::PgConnection,
    id: i64,
) -> DatabaseResult<Option<(String, Option<i64>)>> {
    sqlx::query_as("SELECT user_id, team_id FROM schedules WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::query)
}

fn schedule_from_row(row: &PgRow) -> Result<ScheduleRecord, sqlx::Error> {
    let category: String = row.try_get("category")?;
    let category = category
        .parse::<Category>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let days_of_week: Option<Json<Vec<u8>>> = row.try_get("days_of_week")?;

    Ok(ScheduleRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        team_id: row.try_get("team_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category,
        location: row.try_get("location")?,
        start_datetime: row.try_get("start_datetime")?,
        end_datetime: row.try_get("end_datetime")?,
        is_all_day: row.try_get("is_all_day")?,
        days_of_week: days_of_week.map(|Json(days)| days),
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        start_recur: row.try_get("start_recur")?,
        end_recur: row.try_get("end_recur")?,
        group_color: row.try_get("group_color")?,
        group_name: row.try_get("group_name")?,
    })
}
