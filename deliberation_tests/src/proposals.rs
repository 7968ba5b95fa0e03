use rocket::http::Status;

use crate::common::*;

#[test]
fn zero_accepts_proposal() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let proposal = create_proposal(&mut conn, &fixture.issue, &fixture.board, "Repave");
    let client = client();

    let uri = proposal.absolute_url(fixture.community.id);
    let response = post_form(&client, uri, &fixture.board, "accepted=0").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().unwrap(), "1");

    let stored = reload_proposal(&mut conn, proposal.id);
    assert!(stored.is_accepted);
    assert!(stored.accepted_at.is_some());
}

#[test]
fn other_values_reject_proposal() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let proposal = create_proposal(&mut conn, &fixture.issue, &fixture.board, "Repave");
    let client = client();
    let uri = proposal.absolute_url(fixture.community.id);

    post_form(&client, uri.clone(), &fixture.board, "accepted=0").dispatch();

    for value in &["1", "yes", ""] {
        let body = format!("accepted={}", value);
        let response = post_form(&client, uri.clone(), &fixture.board, &body).dispatch();
        assert_eq!(response.into_string().unwrap(), "0");

        let stored = reload_proposal(&mut conn, proposal.id);
        assert!(!stored.is_accepted);
        assert_eq!(stored.accepted_at, None);
    }
}

#[test]
fn proposal_under_wrong_issue_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other_issue = create_issue(&mut conn, &fixture.community, &fixture.board, "Parking");
    let proposal = create_proposal(&mut conn, &fixture.issue, &fixture.board, "Repave");
    let client = client();

    let uri = format!(
        "/{}/issues/{}/proposals/{}",
        fixture.community.id, other_issue.id, proposal.id
    );
    let response = get_as(&client, uri, &fixture.member).dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn create_proposal_redirects_to_issue() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("{}/proposals/create", fixture.issue_url());
    let response = post_form(&client, uri, &fixture.member, "title=Repave&content=").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some(fixture.issue_url().as_str()));

    let body = get_as(&client, fixture.issue_url(), &fixture.member)
        .dispatch()
        .into_string()
        .unwrap();
    assert!(body.contains("Repave"));
}

#[test]
fn edit_proposal_redirects_to_it() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let proposal = create_proposal(&mut conn, &fixture.issue, &fixture.board, "Repave");
    let client = client();
    let url = proposal.absolute_url(fixture.community.id);

    let uri = format!("{}/edit", url);
    let response = post_form(&client, uri, &fixture.board, "title=Repave the square&content=By May").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some(url.as_str()));

    let stored = reload_proposal(&mut conn, proposal.id);
    assert_eq!(stored.title, "Repave the square");
    assert_eq!(stored.content.as_deref(), Some("By May"));
}

#[test]
fn invalid_proposal_edit_is_shown_again() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let proposal = create_proposal(&mut conn, &fixture.issue, &fixture.board, "Repave");
    let client = client();

    let uri = format!("{}/edit", proposal.absolute_url(fixture.community.id));
    let response = post_form(&client, uri, &fixture.board, "title=  &content=kept").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().unwrap();
    assert!(body.contains("This field is required."));
    assert!(body.contains("kept"));
    assert_eq!(reload_proposal(&mut conn, proposal.id).title, "Repave");
}

#[test]
fn proposal_of_another_community_is_not_found() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let other = Fixture::new(&mut conn);
    let proposal = create_proposal(&mut conn, &other.issue, &other.board, "Repave");
    let client = client();

    let uri = format!(
        "/{}/issues/{}/proposals/{}",
        fixture.community.id, other.issue.id, proposal.id
    );
    let response = get_as(&client, uri.clone(), &fixture.member).dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = post_form(&client, uri, &fixture.board, "accepted=0").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let stored = reload_proposal(&mut conn, proposal.id);
    assert!(!stored.is_accepted);
    assert_eq!(stored.accepted_at, None);
}
