//! Full HTTP round trips: cookies in, redirects out, pages rendered.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use cv_api::clients::{CLIENT_COOKIE, SESSION_COOKIE};
use cv_api::handlers::AppState;
use cv_api::middleware::security_headers;

/// Cookie jar for one simulated browser.
#[derive(Default, Clone)]
struct Browser {
    cookies: HashMap<String, String>,
}

impl Browser {
    fn dress(&self, mut req: test::TestRequest) -> test::TestRequest {
        for (name, value) in &self.cookies {
            req = req.cookie(Cookie::new(name.clone(), value.clone()));
        }
        req
    }

    fn remember<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

macro_rules! send {
    ($app:expr, $browser:expr, $req:expr) => {{
        let resp = test::call_service($app, $browser.dress($req).to_request()).await;
        $browser.remember(&resp);
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        Reply { status, location, body }
    }};
}

macro_rules! app {
    ($fx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($fx.repo.clone(), $fx.auth.clone())))
                .wrap(security_headers())
                .configure(cv_api::configure_routes),
        )
        .await
    };
}

/// GETs `/` until the client has finished restoring its stored session.
macro_rules! settled_home {
    ($app:expr, $browser:expr) => {{
        let mut reply = send!($app, $browser, get("/"));
        for _ in 0..100 {
            if !reply.body.contains(LOADING_MARKER) {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
            reply = send!($app, $browser, get("/"));
        }
        reply
    }};
}

const LOADING_MARKER: &str = "aria-label=\"Loading\"";

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn post(uri: &str) -> test::TestRequest {
    test::TestRequest::post().uri(uri)
}

#[actix_web::test]
async fn health_and_headers() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut browser = Browser::default();

    let reply = send!(&app, browser, get("/health"));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ok");

    let resp = test::call_service(&app, get("/").to_request()).await;
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(
        resp.headers().get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert!(resp.headers().get("content-security-policy").is_some());
}

#[actix_web::test]
async fn sign_up_errors_are_shown_once_on_the_sign_up_form() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut browser = Browser::default();

    let reply = send!(&app, browser, get("/"));
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("/auth/sign-in"));
    assert!(browser.cookies.contains_key(CLIENT_COOKIE));

    let reply = send!(
        &app,
        browser,
        post("/auth/sign-up").set_form([("email", "jace@vault.test"), ("password", "12345")])
    );
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/?mode=sign-up"));

    let reply = send!(&app, browser, get("/?mode=sign-up"));
    assert!(reply.body.contains("Password should be at least 6 characters"));
    assert!(reply.body.contains("Create Account"));

    let reply = send!(&app, browser, get("/?mode=sign-up"));
    assert!(!reply.body.contains("Password should be at least 6 characters"));
}

#[actix_web::test]
async fn build_a_deck_over_http() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut browser = Browser::default();

    send!(&app, browser, get("/"));
    let reply = send!(
        &app,
        browser,
        post("/auth/sign-up").set_form([("email", "karn@vault.test"), ("password", "silverg0lem")])
    );
    assert_eq!(reply.location.as_deref(), Some("/"));
    let token = browser.cookies.get(SESSION_COOKIE).cloned().unwrap();
    let owner = fx.auth.restore(&token).await.unwrap().unwrap();

    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("karn@vault.test"));
    assert!(reply.body.contains("Search your collection"));

    send!(&app, browser, post("/collection/new"));
    let reply = send!(
        &app,
        browser,
        post("/collection/cards").set_form([
            ("name", "Sol Ring"),
            ("type_line", "Artifact"),
            ("mana_cost", "{1}"),
            ("colors", ""),
            ("color_identity", ""),
        ])
    );
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("Sol Ring"));
    assert!(reply.body.contains("tile colorless"));

    send!(&app, browser, post("/tab/decks"));
    send!(&app, browser, post("/decks/new"));
    send!(&app, browser, post("/decks").set_form([("name", "Karn Artifacts")]));
    let decks = fx.repo.list_decks(owner.user_id).await.unwrap();
    assert_eq!(decks.len(), 1);
    let deck_id = decks[0].deck.id;

    send!(&app, browser, post(&format!("/decks/{deck_id}/select")));
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("Karn Artifacts"));
    assert!(reply.body.contains("0 / 100 cards"));

    let card_id = fx.repo.list_user_cards(owner.user_id).await.unwrap()[0].card.id;
    send!(&app, browser, post("/decks/add-card"));
    send!(&app, browser, post("/decks/cards").set_form([("card_id", card_id.to_string())]));
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("1 / 100 cards"));
    assert!(reply.body.contains("Commander decks require exactly 100 cards"));

    let entry_id = fx.repo.list_deck_cards(owner.user_id, deck_id).await.unwrap()[0].entry.id;
    send!(&app, browser, post(&format!("/deck-cards/{entry_id}/delete")));
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("0 / 100 cards"));

    send!(&app, browser, post(&format!("/decks/{deck_id}/delete")));
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("No decks yet"));
}

#[actix_web::test]
async fn stored_session_restores_in_a_new_client_and_sign_out_ends_it() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut first = Browser::default();

    send!(
        &app,
        first,
        post("/auth/sign-up").set_form([("email", "ugin@vault.test"), ("password", "spirit-dragon")])
    );

    // same stored token, no client cookie: a reopened browser
    let mut reopened = Browser::default();
    reopened.cookies.insert(SESSION_COOKIE.into(), first.cookies[SESSION_COOKIE].clone());
    let reply = send!(&app, reopened, get("/"));
    assert!(reply.body.contains(LOADING_MARKER));
    assert!(reply.body.contains("http-equiv=\"refresh\""));
    assert_ne!(reopened.cookies[CLIENT_COOKIE], first.cookies[CLIENT_COOKIE]);
    let reply = settled_home!(&app, reopened);
    assert!(reply.body.contains("ugin@vault.test"));

    let reply = send!(&app, reopened, post("/auth/sign-out"));
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert!(!reopened.cookies.contains_key(SESSION_COOKIE));
    let reply = send!(&app, reopened, get("/"));
    assert!(reply.body.contains("/auth/sign-in"));

    // the token is gone server-side too
    let mut third = Browser::default();
    third.cookies.insert(SESSION_COOKIE.into(), first.cookies[SESSION_COOKIE].clone());
    let reply = settled_home!(&app, third);
    assert!(reply.body.contains("/auth/sign-in"));
}

#[actix_web::test]
async fn signed_out_clients_cannot_mutate() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut browser = Browser::default();

    let reply = send!(&app, browser, post("/decks").set_form([("name", "Sneaky")]));
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("/auth/sign-in"));

    let reply = send!(&app, browser, post("/tab/settings"));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn assistant_answers_after_a_second() {
    let fx = common::fixture().await;
    let app = app!(fx);
    let mut browser = Browser::default();

    send!(
        &app,
        browser,
        post("/auth/sign-in").set_form([("email", "nobody@vault.test"), ("password", "whatever")])
    );
    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("Invalid login credentials"));

    fx.owner("tamiyo@vault.test").await;
    send!(
        &app,
        browser,
        post("/auth/sign-in").set_form([("email", "tamiyo@vault.test"), ("password", "planeswalker")])
    );
    send!(&app, browser, post("/tab/assistant"));
    send!(&app, browser, post("/assistant").set_form([("message", "How many lands?")]));

    let reply = send!(&app, browser, get("/"));
    assert!(reply.body.contains("How many lands?"));
    assert!(reply.body.contains("http-equiv=\"refresh\""));

    actix_web::rt::time::sleep(Duration::from_millis(1200)).await;
    let reply = send!(&app, browser, get("/"));
    assert!(!reply.body.contains("http-equiv=\"refresh\""));
}
