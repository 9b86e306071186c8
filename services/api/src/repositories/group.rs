//! Group (team) and membership repository

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::WriteOutcome;
use crate::{
    access,
    models::group::{DEFAULT_MEMBER_COLOR, GroupSummary, MemberView, NewGroup, Role},
};

/// Unique constraint on `teams.invite_code`
pub const INVITE_CODE_CONSTRAINT: &str = "teams_invite_code_key";

/// Group repository for database operations
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Groups `user_id` belongs to, with their role, color and member count
    pub async fn list_for_user(&self, user_id: &str) -> DatabaseResult<Vec<GroupSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.description, t.invite_code, tm.role, tm.color,
                   (SELECT COUNT(*) FROM team_members c WHERE c.team_id = t.id) AS member_count
            FROM team_members tm
            JOIN teams t ON t.id = tm.team_id
            WHERE tm.user_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        rows.iter()
            .map(summary_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::query)
    }

    /// One group as seen by `user_id`; `None` when the group is missing or
    /// the user is not a member
    pub async fn find_for_member(
        &self,
        team_id: i64,
        user_id: &str,
    ) -> DatabaseResult<Option<GroupSummary>> {
        let row = sqlx::query(
            r#"
            SELECT t.id, t.name, t.description, t.invite_code, tm.role, tm.color,
                   (SELECT COUNT(*) FROM team_members c WHERE c.team_id = t.id) AS member_count
            FROM teams t
            JOIN team_members tm ON tm.team_id = t.id
            WHERE t.id = $1 AND tm.user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        row.as_ref()
            .map(summary_from_row)
            .transpose()
            .map_err(DatabaseError::query)
    }

    /// Create a team and its leader membership in one transaction
    ///
    /// Either both rows are committed or neither is. A clash on the invite
    /// code surfaces as a conflict on [`INVITE_CODE_CONSTRAINT`].
    pub async fn create_with_leader(
        &self,
        group: &NewGroup,
        invite_code: &str,
        leader_id: &str,
    ) -> DatabaseResult<i64> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        let team_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO teams (name, description, invite_code)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&group.name)
        .bind(&group.description)
        .bind(invite_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, color)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(team_id)
        .bind(leader_id)
        .bind(Role::Leader.as_str())
        .bind(DEFAULT_MEMBER_COLOR)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Created group {} ({}) led by {}", team_id, group.name, leader_id);
        Ok(team_id)
    }

    /// Join the team owning `invite_code` as a plain member
    ///
    /// The unique (team, user) index decides whether the caller was already
    /// a member, so concurrent joins cannot create duplicates.
    pub async fn join(&self, invite_code: &str, user_id: &str) -> DatabaseResult<WriteOutcome<i64>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        // Share lock: a concurrent last-leader leave cannot delete the team
        // underneath this membership.
        let team_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM teams WHERE invite_code = $1 FOR SHARE")
                .bind(invite_code)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::query)?;

        let Some(team_id) = team_id else {
            return Ok(WriteOutcome::NotFound);
        };

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO team_members (team_id, user_id, role, color)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT team_members_team_user_key DO NOTHING
            RETURNING id
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(Role::Member.as_str())
        .bind(DEFAULT_MEMBER_COLOR)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        if inserted.is_none() {
            return Ok(WriteOutcome::AlreadyExists);
        }

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("User {} joined group {}", user_id, team_id);
        Ok(WriteOutcome::Applied(team_id))
    }

    /// Change the caller's own display color; false when not a member
    pub async fn update_color(&self, team_id: i64, user_id: &str, color: &str) -> DatabaseResult<bool> {
        let result =
            sqlx::query("UPDATE team_members SET color = $1 WHERE team_id = $2 AND user_id = $3")
                .bind(color)
                .bind(team_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove the caller's own membership
    ///
    /// A leader cannot walk away from members; a leader who is the last
    /// member takes the group down with them.
    pub async fn leave(&self, team_id: i64, user_id: &str) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        // Joins hold a share lock on the team row, so the member count below
        // stays accurate until commit.
        let team: Option<i64> = sqlx::query_scalar("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::query)?;

        if team.is_none() {
            return Ok(WriteOutcome::NotFound);
        }

        let Some(role) = access::membership_role(&mut *tx, team_id, user_id).await? else {
            return Ok(WriteOutcome::NotFound);
        };

        if role == Role::Leader {
            let others: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND user_id <> $2",
            )
            .bind(team_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::query)?;

            if others > 0 {
                return Ok(WriteOutcome::Invalid(
                    "The leader cannot leave while other members remain; delete the group instead",
                ));
            }

            sqlx::query("DELETE FROM teams WHERE id = $1")
                .bind(team_id)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::query)?;

            info!("Last member {} left group {}, group removed", user_id, team_id);
        } else {
            sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::query)?;

            info!("User {} left group {}", user_id, team_id);
        }

        tx.commit().await.map_err(DatabaseError::query)?;
        Ok(WriteOutcome::Applied(()))
    }

    /// Rename or re-describe a team; leader only
    pub async fn update_info(
        &self,
        team_id: i64,
        user_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        if !access::require_leader(&mut *tx, team_id, user_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        sqlx::query(
            r#"
            UPDATE teams
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Group {} updated by {}", team_id, user_id);
        Ok(WriteOutcome::Applied(()))
    }

    /// Delete a team; leader only
    ///
    /// Memberships and group schedules go with it through `ON DELETE CASCADE`.
    pub async fn delete(&self, team_id: i64, user_id: &str) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        if !access::require_leader(&mut *tx, team_id, user_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("Group {} deleted by {}", team_id, user_id);
        Ok(WriteOutcome::Applied(()))
    }

    /// Members of a team, visible to its members only
    ///
    /// Returns `None` when `viewer_id` is not a member (or the team is gone);
    /// a live team always has at least its leader.
    pub async fn members(
        &self,
        team_id: i64,
        viewer_id: &str,
    ) -> DatabaseResult<Option<Vec<MemberView>>> {
        let rows = sqlx::query(
            r#"
            SELECT tm.id, tm.user_id, tm.role, u.nickname
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = $1
              AND EXISTS (
                  SELECT 1 FROM team_members me
                  WHERE me.team_id = $1 AND me.user_id = $2
              )
            ORDER BY tm.id
            "#,
        )
        .bind(team_id)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        if rows.is_empty() {
            return Ok(None);
        }

        rows.iter()
            .map(member_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
            .map_err(DatabaseError::query)
    }

    /// Remove another member by membership id; leader only
    pub async fn kick(
        &self,
        team_id: i64,
        membership_id: i64,
        leader_id: &str,
    ) -> DatabaseResult<WriteOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::query)?;

        if !access::require_leader(&mut *tx, team_id, leader_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        let target: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM team_members WHERE id = $1 AND team_id = $2 FOR UPDATE",
        )
        .bind(membership_id)
        .bind(team_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::query)?;

        let Some(target) = target else {
            return Ok(WriteOutcome::NotFound);
        };

        if target == leader_id {
            return Ok(WriteOutcome::Invalid("The leader cannot remove themselves"));
        }

        sqlx::query("DELETE FROM team_members WHERE id = $1")
            .bind(membership_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::query)?;

        tx.commit().await.map_err(DatabaseError::query)?;

        info!("User {} removed from group {} by {}", target, team_id, leader_id);
        Ok(WriteOutcome::Applied(()))
    }
}

fn parse_role(row: &PgRow) -> Result<Role, sqlx::Error> {
    let role: String = row.try_get("role")?;
    role.parse::<Role>().map_err(|e| sqlx::Error::Decode(e.into()))
}

fn summary_from_row(row: &PgRow) -> Result<GroupSummary, sqlx::Error> {
    Ok(GroupSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        invite_code: row.try_get("invite_code")?,
        role: parse_role(row)?,
        color: row.try_get("color")?,
        member_count: row.try_get("member_count")?,
    })
}

fn member_from_row(row: &PgRow) -> Result<MemberView, sqlx::Error> {
    Ok(MemberView {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        nickname: row.try_get("nickname")?,
        role: parse_role(row)?,
    })
}
