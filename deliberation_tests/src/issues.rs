use rocket::http::Status;

use crate::common::*;

#[test]
fn requests_without_a_user_are_unauthorized() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let response = client.get(fixture.issue_url()).dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .get(fixture.issue_url())
        .header(rocket::http::Header::new("X-Plain-Text-Auth", unique("nobody")))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);
}

#[test]
fn issue_of_another_community_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other = create_community(&mut conn, &unique("elsewhere"));
    let client = client();

    let uri = format!("/{}/issues/{}", other.id, fixture.issue.id);
    let response = get_as(&client, uri, &fixture.member).dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = get_as(&client, fixture.issue_url(), &fixture.member).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("<h1>Road maintenance</h1>"));
}

#[test]
fn issue_list_shows_only_open_issues() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let closed = create_issue(&mut conn, &fixture.community, &fixture.board, "Old bench");
    let client = client();

    let uri = format!("{}/edit", closed.absolute_url());
    let response = post_form(&client, uri, &fixture.board, "title=Old bench&is_closed=true").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert!(reload_issue(&mut conn, closed.id).closed_at.is_some());

    let uri = fixture.community.issues_url();
    let body = get_as(&client, uri, &fixture.member).dispatch().into_string().unwrap();
    assert!(body.contains("Road maintenance"));
    assert!(!body.contains("Old bench"));
}

#[test]
fn create_issue_redirects_to_it() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("{}/create", fixture.community.issues_url());
    let response = post_form(&client, uri, &fixture.member, "title=Street lights&summary=&content=Dark").dispatch();
    assert_eq!(response.status(), Status::SeeOther);

    let location = response.headers().get_one("Location").unwrap().to_string();
    let prefix = format!("{}/", fixture.community.issues_url());
    assert!(location.starts_with(&prefix), "{}", location);

    let id: i32 = location[prefix.len()..].parse().unwrap();
    let issue = reload_issue(&mut conn, id);
    assert_eq!(issue.community_id, fixture.community.id);
    assert_eq!(issue.created_by, fixture.member.id);
    assert_eq!(issue.summary, None);
    assert_eq!(issue.content.as_deref(), Some("Dark"));
}

#[test]
fn invalid_issue_form_is_shown_again() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("{}/create", fixture.community.issues_url());
    let response = post_form(&client, uri, &fixture.member, "title=   &summary=kept").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().unwrap();
    assert!(body.contains("This field is required."));
    assert!(body.contains("kept"));
}
