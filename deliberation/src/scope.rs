//! Row scoping for every request.
//!
//! Each handler resolves the community named in the URL first and reaches
//! issues, comments and proposals only through it. A scope lives for one
//! request; nothing here is cached across requests.
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::error::{DeliberationError, DeliberationResult};
use crate::models::{Community, Issue, IssueComment, Proposal, User};
use crate::schema::{communities, issue_comments, issues, proposals, users};

/// All rows reachable from one community.
#[derive(Debug, Clone)]
pub struct CommunityScope {
    community: Community,
}

impl From<Community> for CommunityScope {
    fn from(community: Community) -> Self {
        CommunityScope { community }
    }
}

impl CommunityScope {
    /// Loads the community, `NotFound` if it does not exist.
    pub fn resolve(conn: &mut PgConnection, community_id: i32) -> DeliberationResult<Self> {
        communities::table
            .find(community_id)
            .first::<Community>(conn)
            .optional()?
            .map(CommunityScope::from)
            .ok_or(DeliberationError::NotFound)
    }

    pub fn community(&self) -> &Community {
        &self.community
    }

    pub fn into_community(self) -> Community {
        self.community
    }

    pub fn issues(&self) -> issues::BoxedQuery<'static, Pg> {
        issues::table
            .filter(issues::community_id.eq(self.community.id))
            .into_boxed()
    }

    pub fn open_issues(&self, conn: &mut PgConnection) -> QueryResult<Vec<Issue>> {
        self.issues()
            .filter(issues::is_closed.eq(false))
            .order((issues::created_at.desc(), issues::id.desc()))
            .load(conn)
    }

    pub fn issue(&self, conn: &mut PgConnection, pk: i32) -> DeliberationResult<Issue> {
        Ok(self.issues().filter(issues::id.eq(pk)).first(conn)?)
    }

    /// Comments whose issue belongs to this community.
    pub fn comments(&self) -> issue_comments::BoxedQuery<'static, Pg> {
        let community_issues = issues::table
            .filter(issues::community_id.eq(self.community.id))
            .select(issues::id);

        issue_comments::table
            .filter(issue_comments::issue_id.eq_any(community_issues))
            .into_boxed()
    }

    pub fn comment(&self, conn: &mut PgConnection, pk: i32) -> DeliberationResult<IssueComment> {
        Ok(self
            .comments()
            .filter(issue_comments::id.eq(pk))
            .first(conn)?)
    }

    /// Narrows the scope to one issue of this community.
    pub fn issue_scope(self, conn: &mut PgConnection, issue_id: i32) -> DeliberationResult<IssueScope> {
        let issue = self.issue(conn, issue_id)?;
        Ok(IssueScope {
            community: self.community,
            issue,
        })
    }
}

/// All rows reachable from one issue of one community.
#[derive(Debug, Clone)]
pub struct IssueScope {
    pub community: Community,
    pub issue: Issue,
}

impl IssueScope {
    pub fn proposals(&self) -> proposals::BoxedQuery<'static, Pg> {
        proposals::table
            .filter(proposals::issue_id.eq(self.issue.id))
            .into_boxed()
    }

    pub fn proposal(&self, conn: &mut PgConnection, pk: i32) -> DeliberationResult<Proposal> {
        Ok(self.proposals().filter(proposals::id.eq(pk)).first(conn)?)
    }

    pub fn all_proposals(&self, conn: &mut PgConnection) -> QueryResult<Vec<Proposal>> {
        self.proposals()
            .order((proposals::created_at.asc(), proposals::id.asc()))
            .load(conn)
    }

    /// Comments that are not soft-deleted, oldest first, with their authors.
    pub fn active_comments(&self, conn: &mut PgConnection) -> QueryResult<Vec<(IssueComment, User)>> {
        issue_comments::table
            .inner_join(users::table)
            .filter(issue_comments::issue_id.eq(self.issue.id))
            .filter(issue_comments::active.eq(true))
            .order((issue_comments::created_at.asc(), issue_comments::id.asc()))
            .load(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn community(id: i32) -> Community {
        Community {
            id,
            name: "Riverside".into(),
            upcoming_meeting_scheduled_at: None,
            upcoming_meeting_location: String::new(),
            upcoming_meeting_comments: String::new(),
            upcoming_meeting_is_published: false,
            upcoming_meeting_published_at: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn issues_are_filtered_by_community() {
        let scope = CommunityScope::from(community(5));
        let sql = diesel::debug_query::<Pg, _>(&scope.issues()).to_string();
        assert!(sql.contains(r#""issues"."community_id" = $1"#), "{}", sql);
        assert!(sql.contains("[5]"), "{}", sql);
    }

    #[test]
    fn comments_are_filtered_through_their_issue() {
        let scope = CommunityScope::from(community(5));
        let sql = diesel::debug_query::<Pg, _>(&scope.comments()).to_string();
        assert!(sql.contains(r#"FROM "issue_comments""#), "{}", sql);
        assert!(sql.contains(r#""issues"."community_id" = $1"#), "{}", sql);
        assert!(sql.contains("[5]"), "{}", sql);
    }
}
