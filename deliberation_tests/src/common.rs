use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use rocket::http::{ContentType, Header};
use rocket::local::blocking::{Client, LocalRequest};

use deliberation::access_control::AUTH_HEADER;
use deliberation::models::{
    Community, Issue, IssueComment, Membership, NewCommunity, NewIssue, NewIssueComment,
    NewMembership, NewProposal, NewUser, Proposal, User,
};
use deliberation::schema::{communities, issue_comments, issues, memberships, proposals, users};

const DEFAULT_URL: &str = "postgres://deliberation@127.0.0.1:5432/deliberation";

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);
static MIGRATE: Once = Once::new();

pub fn database_url() -> String {
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string())
}

pub fn connect() -> PgConnection {
    let mut conn = PgConnection::establish(&database_url()).expect("database connection");
    // Tests run in parallel; only one of them may create the tables.
    MIGRATE.call_once(|| {
        deliberation::run_migrations(&mut conn).expect("migrations");
    });
    conn
}

/// A name no other test run has used, so tests can share one database.
pub fn unique(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp_micros(),
        SEQUENCE.fetch_add(1, Ordering::SeqCst)
    )
}

pub fn client() -> Client {
    let figment = rocket::Config::figment().merge(("databases.deliberation.url", database_url()));
    Client::tracked(deliberation::stage(rocket::custom(figment))).expect("valid rocket instance")
}

/// A community with one board member and one plain member, plus an issue.
pub struct Fixture {
    pub community: Community,
    pub board: User,
    pub member: User,
    pub issue: Issue,
}

impl Fixture {
    pub fn new(conn: &mut PgConnection) -> Fixture {
        let community = create_community(conn, &unique("community"));
        let board = create_user(conn, &unique("chair"), "The Chair");
        let member = create_user(conn, &unique("member"), "");
        join(conn, &community, &board, true);
        join(conn, &community, &member, false);
        let issue = create_issue(conn, &community, &board, "Road maintenance");

        Fixture {
            community,
            board,
            member,
            issue,
        }
    }

    pub fn issue_url(&self) -> String {
        format!("/{}/issues/{}", self.community.id, self.issue.id)
    }
}

pub fn create_user(conn: &mut PgConnection, username: &str, display_name: &str) -> User {
    diesel::insert_into(users::table)
        .values(NewUser {
            username,
            display_name,
        })
        .get_result(conn)
        .unwrap()
}

pub fn create_community(conn: &mut PgConnection, name: &str) -> Community {
    diesel::insert_into(communities::table)
        .values(NewCommunity { name })
        .get_result(conn)
        .unwrap()
}

pub fn join(conn: &mut PgConnection, community: &Community, user: &User, is_board: bool) -> Membership {
    diesel::insert_into(memberships::table)
        .values(NewMembership {
            community_id: community.id,
            user_id: user.id,
            is_board,
        })
        .get_result(conn)
        .unwrap()
}

pub fn create_issue(conn: &mut PgConnection, community: &Community, author: &User, title: &str) -> Issue {
    diesel::insert_into(issues::table)
        .values(NewIssue {
            community_id: community.id,
            title: title.to_string(),
            summary: None,
            content: None,
            created_by: author.id,
        })
        .get_result(conn)
        .unwrap()
}

pub fn create_comment(conn: &mut PgConnection, issue: &Issue, author: &User, content: &str) -> IssueComment {
    diesel::insert_into(issue_comments::table)
        .values(NewIssueComment {
            issue_id: issue.id,
            content,
            created_by: author.id,
        })
        .get_result(conn)
        .unwrap()
}

pub fn create_proposal(conn: &mut PgConnection, issue: &Issue, author: &User, title: &str) -> Proposal {
    diesel::insert_into(proposals::table)
        .values(NewProposal {
            issue_id: issue.id,
            title: title.to_string(),
            content: None,
            created_by: author.id,
        })
        .get_result(conn)
        .unwrap()
}

pub fn reload_comment(conn: &mut PgConnection, id: i32) -> IssueComment {
    issue_comments::table.find(id).first(conn).unwrap()
}

pub fn reload_proposal(conn: &mut PgConnection, id: i32) -> Proposal {
    proposals::table.find(id).first(conn).unwrap()
}

pub fn reload_issue(conn: &mut PgConnection, id: i32) -> Issue {
    issues::table.find(id).first(conn).unwrap()
}

pub fn reload_community(conn: &mut PgConnection, id: i32) -> Community {
    communities::table.find(id).first(conn).unwrap()
}

/// Sends a form-encoded POST as `user`.
pub fn post_form<'c>(client: &'c Client, uri: String, user: &User, body: &str) -> LocalRequest<'c> {
    client
        .post(uri)
        .header(ContentType::Form)
        .header(Header::new(AUTH_HEADER, user.username.clone()))
        .body(body.to_string())
}

pub fn get_as<'c>(client: &'c Client, uri: String, user: &User) -> LocalRequest<'c> {
    client
        .get(uri)
        .header(Header::new(AUTH_HEADER, user.username.clone()))
}
