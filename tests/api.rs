use actix_web::{http::StatusCode, test, web, App};
use mongodb::bson::{doc, oid::ObjectId};
use serde_json::{json, Value};

use sitesafe_server::{
    config::{Config, StoreBackend},
    database::{EntityStore, MemoryStore, Store},
    models::user::UserAuthenticationMiddlewareFactory,
    routes,
    state::AppState,
};

fn state(enforce_references: bool) -> web::Data<AppState> {
    let store: Store = std::sync::Arc::new(MemoryStore::default());
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        store: StoreBackend::Memory,
        mongodb_uri: String::new(),
        mongodb_database: String::new(),
        jwt_secret: "integration secret".to_string(),
        token_ttl_secs: 3600,
        enforce_references,
    };
    web::Data::new(AppState::new(store, config))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(UserAuthenticationMiddlewareFactory)
                .app_data($state.clone())
                .configure(routes::configure),
        )
        .await
    };
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let res = test::call_service(&$app, $req.to_request()).await;
        let status: StatusCode = res.status();
        let body = test::read_body(res).await;
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, body)
    }};
}

macro_rules! register {
    ($app:expr, $name:expr, $email:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({ "name": $name, "email": $email, "password": "hard hat area" }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

fn fall(site: &str) -> Value {
    json!({
        "title": "Fall from scaffold",
        "description": "Worker slipped on wet planks",
        "incident_type": "Fall",
        "severity_level": "High",
        "date": "2024-01-01T10:00",
        "site_id": site,
    })
}

#[actix_web::test]
async fn resource_routes_require_a_token() {
    let state = state(false);
    let app = app!(state);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/safety"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no valid token");

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/workers")
            .insert_header(bearer("not.a.token"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn register_login_and_me() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Dana Reyes", "Dana@Example.com");

    let (status, me) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "dana@example.com");
    assert_eq!(me["name"], "Dana Reyes");

    let (status, session) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "dana@example.com", "password": "hard hat area" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["_id"], me["_id"]);
    assert!(session["token"].is_string());

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "dana@example.com", "password": "wrong password" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Dana",
                "email": "dana@example.com",
                "password": "another one",
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "name": "Sam", "email": "sam@example.com", "password": "short" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn incident_lifecycle_respects_its_owner() {
    let state = state(false);
    let app = app!(state);
    let owner = register!(app, "Owner", "owner@example.com");
    let other = register!(app, "Other", "other@example.com");
    let site = ObjectId::new().to_hex();

    let (status, created) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety")
            .insert_header(bearer(&owner))
            .set_json(fall(&site))
    );
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["resolved"], false);
    assert_eq!(created["site_id"], site);
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, mine) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/safety")
            .insert_header(bearer(&owner))
    );
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/safety")
            .insert_header(bearer(&other))
    );
    assert_eq!(theirs, json!([]));

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&other))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&other))
            .set_json(json!({ "resolved": true }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].is_string());

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&other))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&owner))
            .set_json(json!({ "resolved": true, "user": ObjectId::new().to_hex() }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["resolved"], true);
    assert_eq!(updated["title"], "Fall from scaffold");
    assert_eq!(updated["user"], created["user"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&owner))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Incident deleted");

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/safety/{id}"))
            .insert_header(bearer(&owner))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn invalid_creates_persist_nothing() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");

    let mut missing_title = fall(&ObjectId::new().to_hex());
    missing_title["title"] = json!("   ");
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety")
            .insert_header(bearer(&token))
            .set_json(missing_title)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("title"));

    let mut bad_severity = fall(&ObjectId::new().to_hex());
    bad_severity["severity_level"] = json!("Catastrophic");
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety")
            .insert_header(bearer(&token))
            .set_json(bad_severity)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/hazard/reports")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "Loose cable",
                "date": "yesterday-ish",
                "description": "Trip hazard",
                "location": "Level 2",
            }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/sites")
            .insert_header(bearer(&token))
            .set_json(json!(["not", "an", "object"]))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for collection in ["incidents", "reports", "sites"] {
        let stored = state.store.find_many(collection, doc! {}, None).await.unwrap();
        assert!(stored.is_empty(), "{collection}");
    }
}

#[actix_web::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");
    let unknown = ObjectId::new().to_hex();

    for path in [
        "/api/safety",
        "/api/safety/gear-logs",
        "/api/equipment",
        "/api/hazard/reports",
        "/api/sites",
        "/api/workers",
    ] {
        for id in [unknown.as_str(), "not-an-id"] {
            let uri = format!("{path}/{id}");
            let (status, body) = send!(
                app,
                test::TestRequest::get().uri(&uri).insert_header(bearer(&token))
            );
            assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
            assert!(body["message"].as_str().unwrap().ends_with("not found"));

            let (status, _) = send!(
                app,
                test::TestRequest::put()
                    .uri(&uri)
                    .insert_header(bearer(&token))
                    .set_json(json!({}))
            );
            assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");

            let (status, _) = send!(
                app,
                test::TestRequest::delete().uri(&uri).insert_header(bearer(&token))
            );
            assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
        }
    }
}

#[actix_web::test]
async fn worker_emails_are_unique_and_listing_is_sorted() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");

    for (first, last, email) in [
        ("Grace", "Hopper", "grace@example.com"),
        ("Ada", "Byron", "ada@example.com"),
        ("Alan", "Byron", "alan@example.com"),
    ] {
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/workers")
                .insert_header(bearer(&token))
                .set_json(json!({ "firstName": first, "lastName": last, "email": email }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/workers")
            .insert_header(bearer(&token))
            .set_json(json!({
                "firstName": "Other",
                "lastName": "Ada",
                "email": " ADA@example.com",
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Worker with this email already exists");

    let (_, workers) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/workers")
            .insert_header(bearer(&token))
    );
    let names: Vec<&str> = workers
        .as_array()
        .unwrap()
        .iter()
        .map(|worker| worker["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Ada", "Alan", "Grace"]);

    let grace = workers[2]["_id"].as_str().unwrap();
    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/workers/{grace}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "email": "alan@example.com" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/workers/{grace}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "email": "grace@example.com", "jobTitle": "Crane operator" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["jobTitle"], "Crane operator");
    assert_eq!(updated["lastName"], "Hopper");
}

#[actix_web::test]
async fn gear_logs_expand_references_only_when_listed() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");

    let (_, worker) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/workers")
            .insert_header(bearer(&token))
            .set_json(json!({
                "firstName": "Ada",
                "lastName": "Byron",
                "email": "ada@example.com",
            }))
    );
    let (_, site) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/sites")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "Dock 4", "location": "Harbour Rd" }))
    );
    let worker_id = worker["_id"].as_str().unwrap().to_string();
    let site_id = site["_id"].as_str().unwrap().to_string();

    let (status, log) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety/gear-logs")
            .insert_header(bearer(&token))
            .set_json(json!({
                "worker": worker_id,
                "site": site_id,
                "gearType": "Harness",
                "gearCondition": "Worn stitching",
                "dateChecked": "2024-03-04",
                "status": "Damaged",
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{log}");
    assert_eq!(log["worker"], json!(worker_id));
    assert_eq!(log["site"], json!(site_id));
    assert_eq!(log["remarks"], "");
    let id = log["_id"].as_str().unwrap().to_string();

    let (status, fetched) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/safety/gear-logs/{id}"))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["worker"], json!(worker_id));
    assert_eq!(fetched["site"], json!(site_id));

    let (status, updated) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/safety/gear-logs/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "Replaced" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["worker"], json!(worker_id));
    assert_eq!(updated["site"], json!(site_id));

    let (_, logs) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/safety/gear-logs")
            .insert_header(bearer(&token))
    );
    assert_eq!(logs[0]["worker"], json!({ "_id": worker_id, "name": "Ada Byron" }));
    assert_eq!(logs[0]["site"], json!({ "_id": site_id, "name": "Dock 4" }));

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/workers/{worker_id}"))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);

    let (_, logs) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/safety/gear-logs")
            .insert_header(bearer(&token))
    );
    assert_eq!(logs[0]["worker"], json!(worker_id));
    assert_eq!(logs[0]["site"]["name"], "Dock 4");
}

#[actix_web::test]
async fn compliance_updates_merge_into_the_stored_record() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Inspector", "inspector@example.com");
    let (_, me) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
    );

    let (status, record) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/equipment")
            .insert_header(bearer(&token))
            .set_json(json!({
                "equipmentName": "Scaffold tower",
                "checkedBy": me["_id"],
                "checkedAt": "2024-02-01T08:30:00Z",
                "status": "Pending",
                "remarks": "Awaiting tag",
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{record}");
    assert_eq!(record["checkedBy"], me["_id"]);
    let id = record["_id"].as_str().unwrap();

    let (status, fetched) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/equipment/{id}"))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["checkedBy"], json!({ "_id": me["_id"], "name": "Inspector" }));

    let (_, listed) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/equipment")
            .insert_header(bearer(&token))
    );
    assert_eq!(listed[0]["checkedBy"]["name"], "Inspector");

    let (status, updated) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/equipment/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "Non-compliant", "remarks": "" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Non-compliant");
    assert_eq!(updated["remarks"], "");
    assert_eq!(updated["equipmentName"], "Scaffold tower");
    assert_eq!(updated["checkedAt"], record["checkedAt"]);
    assert_eq!(updated["checkedBy"], me["_id"]);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/equipment/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "equipmentName": null }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// One valid payload per kind, a required field to drop from it, and an
/// update to read back.
fn every_kind() -> Vec<(&'static str, &'static str, Value, &'static str, (&'static str, Value))> {
    let some_id = || ObjectId::new().to_hex();
    vec![
        (
            "/api/safety",
            "incidents",
            fall(&some_id()),
            "title",
            ("description", json!("Wet planks, no guard rail")),
        ),
        (
            "/api/safety/gear-logs",
            "gearlogs",
            json!({
                "worker": some_id(),
                "site": some_id(),
                "gearType": "Helmet",
                "gearCondition": "Cracked shell",
                "dateChecked": "2024-03-04",
                "status": "Damaged",
            }),
            "gearType",
            ("gearCondition", json!("Replaced shell")),
        ),
        (
            "/api/equipment",
            "compliances",
            json!({
                "equipmentName": "Hoist",
                "checkedBy": some_id(),
                "checkedAt": "2024-02-01",
                "status": "Compliant",
            }),
            "checkedAt",
            ("remarks", json!("Tagged until June")),
        ),
        (
            "/api/hazard/reports",
            "reports",
            json!({
                "title": "Loose cable",
                "description": "Trip hazard by the stairwell",
                "date": "2024-04-02",
                "location": "Level 2",
            }),
            "location",
            ("location", json!("Level 3")),
        ),
        (
            "/api/sites",
            "sites",
            json!({ "name": "Dock 4" }),
            "name",
            ("manager", json!("R. Ortiz")),
        ),
        (
            "/api/workers",
            "workers",
            json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
            }),
            "lastName",
            ("department", json!("Civil")),
        ),
    ]
}

#[actix_web::test]
async fn every_kind_validates_persists_updates_and_deletes() {
    let state = state(false);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");

    for (path, collection, payload, required, (field, value)) in every_kind() {
        let mut incomplete = payload.clone();
        incomplete.as_object_mut().unwrap().remove(required);
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri(path)
                .insert_header(bearer(&token))
                .set_json(incomplete)
        );
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {path}");
        assert!(body["message"].as_str().unwrap().contains(required), "{body}");
        let stored = state.store.find_many(collection, doc! {}, None).await.unwrap();
        assert!(stored.is_empty(), "{collection}");

        let (status, created) = send!(
            app,
            test::TestRequest::post()
                .uri(path)
                .insert_header(bearer(&token))
                .set_json(payload)
        );
        assert_eq!(status, StatusCode::CREATED, "POST {path}: {created}");
        let uri = format!("{path}/{}", created["_id"].as_str().unwrap());

        let (status, _) = send!(
            app,
            test::TestRequest::put()
                .uri(&uri)
                .insert_header(bearer(&token))
                .set_json(json!({ field: value.clone() }))
        );
        assert_eq!(status, StatusCode::OK, "PUT {uri}");
        let (status, fetched) = send!(
            app,
            test::TestRequest::get().uri(&uri).insert_header(bearer(&token))
        );
        assert_eq!(status, StatusCode::OK, "GET {uri}");
        assert_eq!(fetched[field], value, "GET {uri}");

        let (status, body) = send!(
            app,
            test::TestRequest::delete().uri(&uri).insert_header(bearer(&token))
        );
        assert_eq!(status, StatusCode::OK, "DELETE {uri}");
        assert!(body["message"].as_str().unwrap().ends_with("deleted"));
        let (status, _) = send!(
            app,
            test::TestRequest::get().uri(&uri).insert_header(bearer(&token))
        );
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri} after delete");
        let stored = state.store.find_many(collection, doc! {}, None).await.unwrap();
        assert!(stored.is_empty(), "{collection} after delete");
    }
}

#[actix_web::test]
async fn enforced_references_reject_dangling_ids() {
    let state = state(true);
    let app = app!(state);
    let token = register!(app, "Owner", "owner@example.com");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety")
            .insert_header(bearer(&token))
            .set_json(fall(&ObjectId::new().to_hex()))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("site_id"));

    let (_, site) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/sites")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "Dock 4" }))
    );
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/safety")
            .insert_header(bearer(&token))
            .set_json(fall(site["_id"].as_str().unwrap()))
    );
    assert_eq!(status, StatusCode::CREATED);
}
