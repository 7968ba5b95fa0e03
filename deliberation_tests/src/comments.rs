use rocket::http::Status;

use crate::common::*;

#[test]
fn comment_is_created_and_rendered() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let response = post_form(&client, fixture.issue_url(), &fixture.board, "content=  We should fix it  ").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().unwrap();
    assert!(body.contains("We should fix it"));
    assert!(body.contains("The Chair"));
    assert!(body.contains(r#"data-version="1""#));
}

#[test]
fn blank_or_missing_comment_is_a_bad_request() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let response = post_form(&client, fixture.issue_url(), &fixture.member, "content=   ").dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let response = post_form(&client, fixture.issue_url(), &fixture.member, "").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn edit_bumps_version_and_keeps_revision() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &fixture.issue, &fixture.member, "first");
    let client = client();

    let uri = format!("/{}/comments/{}/edit", fixture.community.id, comment.id);
    let response = post_form(&client, uri, &fixture.board, "version=1&content=second").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response.into_string().unwrap().contains("second"));

    let stored = reload_comment(&mut conn, comment.id);
    assert_eq!(stored.content, "second");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.last_edited_by, Some(fixture.board.id));

    let revisions = stored.revisions(&mut conn).unwrap();
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].version, 1);
    assert_eq!(revisions[0].content, "first");
    assert_eq!(revisions[0].created_by, fixture.member.id);
}

#[test]
fn stale_edit_leaves_comment_untouched() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &fixture.issue, &fixture.member, "first");
    let client = client();

    let uri = format!("/{}/comments/{}/edit", fixture.community.id, comment.id);
    let response = post_form(&client, uri.clone(), &fixture.board, "version=1&content=second").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let response = post_form(&client, uri, &fixture.member, "version=1&content=third").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("second"));
    assert!(!body.contains("third"));

    let stored = reload_comment(&mut conn, comment.id);
    assert_eq!(stored.content, "second");
    assert_eq!(stored.version, 2);
}

#[test]
fn invalid_edit_answers_with_empty_body() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &fixture.issue, &fixture.member, "first");
    let client = client();

    let uri = format!("/{}/comments/{}/edit", fixture.community.id, comment.id);
    let response = post_form(&client, uri.clone(), &fixture.member, "version=1&content=  ").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().unwrap_or_default(), "");

    let response = post_form(&client, uri, &fixture.member, "content=no version").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().unwrap_or_default(), "");

    assert_eq!(reload_comment(&mut conn, comment.id).version, 1);
}

#[test]
fn delete_and_undelete_toggle_active() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &fixture.issue, &fixture.member, "oops");
    let client = client();

    let uri = format!("/{}/comments/{}/delete", fixture.community.id, comment.id);
    let response = post_form(&client, uri.clone(), &fixture.member, "").dispatch();
    assert_eq!(response.into_string().unwrap(), "0");
    assert!(!reload_comment(&mut conn, comment.id).active);

    let body = get_as(&client, fixture.issue_url(), &fixture.member)
        .dispatch()
        .into_string()
        .unwrap();
    assert!(!body.contains("oops"));

    let response = post_form(&client, uri, &fixture.member, "undelete=1").dispatch();
    assert_eq!(response.into_string().unwrap(), "1");
    assert!(reload_comment(&mut conn, comment.id).active);
}

#[test]
fn comment_of_another_community_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &other.issue, &other.member, "elsewhere");
    let client = client();

    let uri = format!("/{}/comments/{}/delete", fixture.community.id, comment.id);
    let response = post_form(&client, uri, &fixture.member, "").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert!(reload_comment(&mut conn, comment.id).active);
}

#[test]
fn edit_of_unknown_comment_is_not_found_even_when_invalid() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("/{}/comments/{}/edit", fixture.community.id, i32::MAX);
    let response = post_form(&client, uri.clone(), &fixture.member, "version=1&content=   ").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = post_form(&client, uri, &fixture.member, "content=x").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let uri = format!("/{}/comments/{}/edit", i32::MAX, 1);
    let response = post_form(&client, uri, &fixture.member, "content=x").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn edit_of_comment_in_another_community_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other = Fixture::new(&mut conn);
    let comment = create_comment(&mut conn, &other.issue, &other.member, "elsewhere");
    let client = client();

    let uri = format!("/{}/comments/{}/edit", fixture.community.id, comment.id);
    let response = post_form(&client, uri.clone(), &fixture.member, "content=x").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = post_form(&client, uri, &fixture.member, "version=1&content=hijacked").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let stored = reload_comment(&mut conn, comment.id);
    assert_eq!(stored.content, "elsewhere");
    assert_eq!(stored.version, 1);
}

#[test]
fn comment_on_issue_of_another_community_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("/{}/issues/{}", fixture.community.id, other.issue.id);
    let response = post_form(&client, uri, &fixture.member, "content=hello").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let body = get_as(&client, other.issue_url(), &other.member)
        .dispatch()
        .into_string()
        .unwrap();
    assert!(!body.contains("hello"));
}
