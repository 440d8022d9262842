//! Projects, tabs, membership and invites through the router.

mod common;

use axum::http::{Method, StatusCode};
use qadash_core::models::project::ProjectRole;
use qadash_core::projects::{invites, queries};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn non_members_see_not_found(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("own").await;
    let stranger = app.register("str").await;
    let project = app.create_project(&owner, "Private").await;

    let (status, json) = app
        .call(
            Method::GET,
            &format!("/api/projects/{project}"),
            Some(&stranger.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Project not found");
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn deleting_a_project_cascades(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("cas").await;
    let editor = app.register("ced").await;
    let project = app.create_project(&owner, "Doomed").await;
    app.add_member(&owner, project, &editor, "editor").await;
    for title in ["First case", "Second case"] {
        let (status, _) = app.create_test_case(&owner, project, "General", title).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/projects/{project}"),
            Some(&editor.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/projects/{project}"),
            Some(&owner.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let cases: i64 = sqlx::query_scalar("SELECT count(*) FROM test_cases WHERE project_id = $1")
        .bind(project)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let members: i64 =
        sqlx::query_scalar("SELECT count(*) FROM project_members WHERE project_id = $1")
            .bind(project)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(cases, 0);
    assert_eq!(members, 0);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn renaming_a_tab_moves_its_test_cases(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("tab").await;
    let project = app.create_project(&owner, "Tabs").await;

    let (status, json) = app
        .call(
            Method::POST,
            &format!("/api/projects/{project}/tabs"),
            Some(&owner.token),
            Some(json!({ "name": "Login" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tabs"], json!(["General", "Login"]));

    for title in ["Valid login", "Bad password", "Locked account"] {
        app.create_test_case(&owner, project, "Login", title).await;
    }
    app.create_test_case(&owner, project, "General", "Unrelated").await;

    let (status, json) = app
        .call(
            Method::PUT,
            &format!("/api/projects/{project}/tabs"),
            Some(&owner.token),
            Some(json!({ "oldName": "Login", "newName": "Authentication" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["tabs"], json!(["General", "Authentication"]));

    let (_, moved) = app
        .call(
            Method::GET,
            &format!("/api/test-cases?projectId={project}&tab=Authentication"),
            Some(&owner.token),
            None,
        )
        .await;
    assert_eq!(moved.as_array().unwrap().len(), 3);
    let (_, left) = app
        .call(
            Method::GET,
            &format!("/api/test-cases?projectId={project}&tab=Login"),
            Some(&owner.token),
            None,
        )
        .await;
    assert!(left.as_array().unwrap().is_empty());
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn general_tab_cannot_be_deleted(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("gen").await;
    let project = app.create_project(&owner, "General only").await;

    let (status, json) = app
        .call(
            Method::DELETE,
            &format!("/api/projects/{project}/tabs"),
            Some(&owner.token),
            Some(json!({ "name": "General" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cannot delete General tab");
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn members_cannot_elevate_themselves(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("elo").await;
    let editor = app.register("ele").await;
    let project = app.create_project(&owner, "Roles").await;
    app.add_member(&owner, project, &editor, "editor").await;

    let uri = format!("/api/projects/{project}/members/{}", editor.id);
    let (status, json) = app
        .call(Method::PUT, &uri, Some(&editor.token), Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You cannot elevate your own role");

    // Role changes, downward included, belong to the owner and project admins.
    let (status, json) = app
        .call(Method::PUT, &uri, Some(&editor.token), Some(json!({ "role": "viewer" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, json) = app
        .call(Method::PUT, &uri, Some(&owner.token), Some(json!({ "role": "viewer" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "viewer");
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn accepted_invite_cannot_be_reused(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("inv").await;
    let guest = app.register("gst").await;
    let project_id = app.create_project(&owner, "Invites").await;
    let project = queries::get_project(&app.pool, &project_id).await.unwrap();

    let (_, token) = invites::create_invite(
        &app.pool,
        &project,
        &guest.email,
        ProjectRole::Editor,
        &owner.id,
        3600,
    )
    .await
    .unwrap();

    let (status, preview) = app
        .call(Method::GET, &format!("/api/invites/{token}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["projectName"], "Invites");

    let accept = format!("/api/invites/{token}/accept");
    let (status, json) = app.call(Method::POST, &accept, Some(&guest.token), None).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["role"], "editor");

    let (status, _) = app.call(Method::POST, &accept, Some(&guest.token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.create_test_case(&guest, project_id, "General", "Guest case").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn expired_invite_is_rejected(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("exo").await;
    let guest = app.register("exg").await;
    let project_id = app.create_project(&owner, "Expired invites").await;
    let project = queries::get_project(&app.pool, &project_id).await.unwrap();

    let (_, token) = invites::create_invite(
        &app.pool,
        &project,
        &guest.email,
        ProjectRole::Viewer,
        &owner.id,
        -60,
    )
    .await
    .unwrap();

    let (status, json) = app
        .call(
            Method::POST,
            &format!("/api/invites/{token}/accept"),
            Some(&guest.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invite has expired");
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn invite_is_bound_to_its_email(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let owner = app.register("ibo").await;
    let invited = app.register("ibi").await;
    let bystander = app.register("ibb").await;
    let project_id = app.create_project(&owner, "Bound invites").await;
    let project = queries::get_project(&app.pool, &project_id).await.unwrap();

    let (_, token) = invites::create_invite(
        &app.pool,
        &project,
        &invited.email,
        ProjectRole::Editor,
        &owner.id,
        3600,
    )
    .await
    .unwrap();

    let accept = format!("/api/invites/{token}/accept");
    let (status, json) = app
        .call(Method::POST, &accept, Some(&bystander.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "This invite was sent to a different email address");

    let (status, _) = app
        .call(Method::GET, &format!("/api/projects/{project_id}"), Some(&bystander.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The invite is still pending for the intended recipient.
    let (status, json) = app.call(Method::POST, &accept, Some(&invited.token), None).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["role"], "editor");
}
