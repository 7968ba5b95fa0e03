use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::Serialize;

use crate::schema::{
    communities, issue_comment_revisions, issue_comments, issues, memberships, proposals, users,
};

/// Value of the `accepted` field that marks a proposal as accepted. Every
/// other value, including `"1"`, rejects it.
pub const ACCEPTED_SENTINEL: &str = "0";

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn by_username(conn: &mut PgConnection, name: &str) -> QueryResult<Option<User>> {
        users::table
            .filter(users::username.eq(name))
            .first(conn)
            .optional()
    }

    /// Name shown next to content this user wrote.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = communities)]
pub struct Community {
    pub id: i32,
    pub name: String,
    pub upcoming_meeting_scheduled_at: Option<NaiveDateTime>,
    pub upcoming_meeting_location: String,
    pub upcoming_meeting_comments: String,
    pub upcoming_meeting_is_published: bool,
    pub upcoming_meeting_published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Community {
    pub fn upcoming_meeting_url(&self) -> String {
        format!("/{}/upcoming", self.id)
    }

    pub fn issues_url(&self) -> String {
        format!("/{}/issues", self.id)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = communities)]
pub struct NewCommunity<'a> {
    pub name: &'a str,
}

/// The three meeting fields edited through the upcoming meeting form.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = communities, treat_none_as_null = true)]
pub struct UpcomingMeetingChanges {
    pub upcoming_meeting_scheduled_at: Option<NaiveDateTime>,
    pub upcoming_meeting_location: String,
    pub upcoming_meeting_comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = memberships)]
#[diesel(belongs_to(Community))]
#[diesel(belongs_to(User))]
pub struct Membership {
    pub id: i32,
    pub community_id: i32,
    pub user_id: i32,
    pub is_board: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = memberships)]
pub struct NewMembership {
    pub community_id: i32,
    pub user_id: i32,
    pub is_board: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = issues)]
#[diesel(belongs_to(Community))]
pub struct Issue {
    pub id: i32,
    pub community_id: i32,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_closed: bool,
    pub closed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub created_by: i32,
}

impl Issue {
    pub fn absolute_url(&self) -> String {
        format!("/{}/issues/{}", self.community_id, self.id)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = issues)]
pub struct NewIssue {
    pub community_id: i32,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub created_by: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = issues, treat_none_as_null = true)]
pub struct IssueChanges {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_closed: bool,
    pub closed_at: Option<NaiveDateTime>,
}

impl IssueChanges {
    /// Keeps the original closing time while an issue stays closed.
    pub fn closing(issue: &Issue, is_closed: bool, at: NaiveDateTime) -> Option<NaiveDateTime> {
        match (is_closed, issue.closed_at) {
            (false, _) => None,
            (true, Some(previous)) if issue.is_closed => Some(previous),
            (true, _) => Some(at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = issue_comments)]
#[diesel(belongs_to(Issue))]
pub struct IssueComment {
    pub id: i32,
    pub issue_id: i32,
    pub content: String,
    pub active: bool,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub created_by: i32,
    pub last_edited_at: Option<NaiveDateTime>,
    pub last_edited_by: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = issue_comments)]
pub struct NewIssueComment<'a> {
    pub issue_id: i32,
    pub content: &'a str,
    pub created_by: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = issue_comment_revisions)]
#[diesel(belongs_to(IssueComment, foreign_key = comment_id))]
pub struct IssueCommentRevision {
    pub id: i32,
    pub comment_id: i32,
    pub version: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub created_by: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = issue_comment_revisions)]
pub struct NewIssueCommentRevision<'a> {
    pub comment_id: i32,
    pub version: i32,
    pub content: &'a str,
    pub created_at: NaiveDateTime,
    pub created_by: i32,
}

/// What a content edit resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentUpdate {
    /// The submitted version is not the stored one. Nothing was written.
    Conflict,
    /// The submitted content matches the stored content. Nothing was written.
    Unchanged,
    /// The comment now carries `version`.
    Updated { version: i32 },
}

impl IssueComment {
    /// Decides whether an edit would write anything, without touching the
    /// database. Returns the trimmed content on `Ok`.
    pub fn plan_edit<'c>(&self, expected_version: i32, content: &'c str) -> Result<&'c str, ContentUpdate> {
        let content = content.trim();
        if self.version != expected_version {
            return Err(ContentUpdate::Conflict);
        }
        if self.content == content {
            return Err(ContentUpdate::Unchanged);
        }
        Ok(content)
    }

    /// Replaces the content if `expected_version` is still current, keeping the
    /// superseded body as a revision.
    pub fn update_content(
        &self,
        conn: &mut PgConnection,
        expected_version: i32,
        editor: &User,
        content: &str,
    ) -> QueryResult<ContentUpdate> {
        let content = match self.plan_edit(expected_version, content) {
            Ok(content) => content,
            Err(outcome) => return Ok(outcome),
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let next_version = expected_version + 1;
            let updated = diesel::update(
                issue_comments::table
                    .filter(issue_comments::id.eq(self.id))
                    .filter(issue_comments::version.eq(expected_version)),
            )
            .set((
                issue_comments::content.eq(content),
                issue_comments::version.eq(next_version),
                issue_comments::last_edited_at.eq(Some(now())),
                issue_comments::last_edited_by.eq(Some(editor.id)),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Ok(ContentUpdate::Conflict);
            }

            diesel::insert_into(issue_comment_revisions::table)
                .values(NewIssueCommentRevision {
                    comment_id: self.id,
                    version: expected_version,
                    content: &self.content,
                    created_at: self.last_edited_at.unwrap_or(self.created_at),
                    created_by: self.last_edited_by.unwrap_or(self.created_by),
                })
                .execute(conn)?;

            Ok(ContentUpdate::Updated {
                version: next_version,
            })
        })
    }

    pub fn set_active(&self, conn: &mut PgConnection, active: bool) -> QueryResult<IssueComment> {
        diesel::update(self)
            .set(issue_comments::active.eq(active))
            .get_result(conn)
    }

    pub fn revisions(&self, conn: &mut PgConnection) -> QueryResult<Vec<IssueCommentRevision>> {
        IssueCommentRevision::belonging_to(self)
            .order(issue_comment_revisions::version.asc())
            .load(conn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = proposals)]
#[diesel(belongs_to(Issue))]
pub struct Proposal {
    pub id: i32,
    pub issue_id: i32,
    pub title: String,
    pub content: Option<String>,
    pub is_accepted: bool,
    pub accepted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub created_by: i32,
}

impl Proposal {
    pub fn absolute_url(&self, community_id: i32) -> String {
        format!("/{}/issues/{}/proposals/{}", community_id, self.issue_id, self.id)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = proposals)]
pub struct NewProposal {
    pub issue_id: i32,
    pub title: String,
    pub content: Option<String>,
    pub created_by: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = proposals, treat_none_as_null = true)]
pub struct ProposalChanges {
    pub title: String,
    pub content: Option<String>,
}

/// Acceptance state derived from a submitted `accepted` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = proposals, treat_none_as_null = true)]
pub struct Acceptance {
    pub is_accepted: bool,
    pub accepted_at: Option<NaiveDateTime>,
}

impl Acceptance {
    pub fn from_field(value: &str, at: NaiveDateTime) -> Self {
        let is_accepted = value == ACCEPTED_SENTINEL;
        Acceptance {
            is_accepted,
            accepted_at: if is_accepted { Some(at) } else { None },
        }
    }

    /// Body of the accept/reject response: `1` or `0`.
    pub fn as_json(&self) -> String {
        serde_json::Value::from(i32::from(self.is_accepted)).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn comment(version: i32, content: &str) -> IssueComment {
        IssueComment {
            id: 7,
            issue_id: 3,
            content: content.to_owned(),
            active: true,
            version,
            created_at: timestamp(),
            created_by: 1,
            last_edited_at: None,
            last_edited_by: None,
        }
    }

    #[test]
    fn zero_accepts_and_stamps() {
        let acceptance = Acceptance::from_field("0", timestamp());
        assert!(acceptance.is_accepted);
        assert_eq!(acceptance.accepted_at, Some(timestamp()));
        assert_eq!(acceptance.as_json(), "1");
    }

    #[test]
    fn anything_else_rejects_and_clears() {
        for value in &["1", "", "true", "00"] {
            let acceptance = Acceptance::from_field(value, timestamp());
            assert!(!acceptance.is_accepted, "{:?} should reject", value);
            assert_eq!(acceptance.accepted_at, None);
            assert_eq!(acceptance.as_json(), "0");
        }
    }

    #[test]
    fn stale_version_conflicts() {
        let c = comment(3, "hello");
        assert_eq!(c.plan_edit(2, "changed"), Err(ContentUpdate::Conflict));
    }

    #[test]
    fn same_content_after_trim_is_unchanged() {
        let c = comment(1, "hello");
        assert_eq!(c.plan_edit(1, "  hello \n"), Err(ContentUpdate::Unchanged));
    }

    #[test]
    fn new_content_is_trimmed() {
        let c = comment(1, "hello");
        assert_eq!(c.plan_edit(1, " hello there "), Ok("hello there"));
    }

    #[test]
    fn closing_keeps_first_close_time() {
        let earlier = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut issue = Issue {
            id: 1,
            community_id: 1,
            title: "Parking".into(),
            summary: None,
            content: None,
            is_closed: false,
            closed_at: None,
            created_at: earlier,
            created_by: 1,
        };
        assert_eq!(IssueChanges::closing(&issue, true, timestamp()), Some(timestamp()));
        assert_eq!(IssueChanges::closing(&issue, false, timestamp()), None);

        issue.is_closed = true;
        issue.closed_at = Some(earlier);
        assert_eq!(IssueChanges::closing(&issue, true, timestamp()), Some(earlier));
        assert_eq!(IssueChanges::closing(&issue, false, timestamp()), None);
    }

    #[test]
    fn urls_follow_the_route_layout() {
        let proposal = Proposal {
            id: 9,
            issue_id: 4,
            title: "Fix the lights".into(),
            content: None,
            is_accepted: false,
            accepted_at: None,
            created_at: timestamp(),
            created_by: 1,
        };
        assert_eq!(proposal.absolute_url(2), "/2/issues/4/proposals/9");
    }
}
