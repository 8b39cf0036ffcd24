//! # cv-api Handlers
//!
//! Every POST mutates the client's mounted view and redirects back to `/`,
//! which renders whatever state that left behind.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use cv_core::collection::CardDraft;
use cv_core::models::ColorSet;
use cv_core::shell::{schedule_reply, SharedShell, Tab};
use cv_core::traits::{AuthProvider, VaultRepo};
use serde::Deserialize;
use uuid::Uuid;

use crate::clients::{Attached, ClientRegistry, CLIENT_COOKIE, SESSION_COOKIE};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Arc<dyn VaultRepo>,
    pub auth: Arc<dyn AuthProvider>,
    pub clients: ClientRegistry,
}

impl AppState {
    pub fn new(repo: Arc<dyn VaultRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { repo, auth, clients: ClientRegistry::new() }
    }

    async fn attach(&self, req: &HttpRequest) -> Attached {
        self.clients.attach(&self.auth, req).await
    }

    /// The client's shell, if it is signed in.
    async fn shell(&self, attached: &Attached) -> Option<SharedShell> {
        attached.client.lock().await.shell(&self.repo).await
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(default)]
    pub colors: String,
    #[serde(default)]
    pub color_identity: String,
    /// Checkbox: present as "on" when ticked
    pub is_legendary: Option<String>,
}

impl CardForm {
    fn into_draft(self) -> CardDraft {
        let colors = self.colors.parse::<ColorSet>().unwrap_or_default();
        let identity = self.color_identity.parse::<ColorSet>().unwrap_or_default();
        CardDraft {
            name: self.name.trim().to_string(),
            type_line: self.type_line,
            mana_cost: self.mana_cost,
            colors: colors.0,
            color_identity: identity.0,
            is_legendary: self.is_legendary.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeckForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PickCardForm {
    pub card_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub message: String,
}

fn client_cookie(id: &str) -> Cookie<'static> {
    Cookie::build(CLIENT_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn see_other(attached: &Attached, location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(client_cookie(&attached.id))
        .finish()
}

fn render(attached: &Attached, html: askama::Result<String>) -> HttpResponse {
    match html {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .cookie(client_cookie(&attached.id))
            .body(body),
        Err(e) => {
            log::error!("template rendering failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Liveness probe.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Auth screen, loading page, or the signed-in shell.
pub async fn index(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<IndexQuery>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    let mut client = attached.client.lock().await;

    if client.session.is_loading() {
        return render(&attached, cv_ui::loading_page());
    }

    let shell = client.shell(&data.repo).await;
    match shell {
        Some(shell) => {
            drop(client);
            let mut shell = shell.lock().await;
            render(&attached, cv_ui::shell_page(&mut shell))
        }
        None => {
            let error = client.auth_error.take();
            let sign_up = query.mode.as_deref() == Some("sign-up");
            render(&attached, cv_ui::auth_page(sign_up, error))
        }
    }
}

async fn authenticate(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: CredentialsForm,
    sign_up: bool,
) -> HttpResponse {
    let attached = data.attach(&req).await;
    let mut client = attached.client.lock().await;

    let result = if sign_up {
        client.session.sign_up(&form.email, &form.password).await
    } else {
        client.session.sign_in(&form.email, &form.password).await
    };

    match result {
        Ok(session) => {
            client.auth_error = None;
            client.unmount();
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .cookie(client_cookie(&attached.id))
                .cookie(session_cookie(&session.token))
                .finish()
        }
        Err(e) => {
            client.auth_error = Some(e.to_string());
            see_other(&attached, if sign_up { "/?mode=sign-up" } else { "/" })
        }
    }
}

pub async fn sign_in(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<CredentialsForm>,
) -> impl Responder {
    authenticate(data, req, form.into_inner(), false).await
}

pub async fn sign_up(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<CredentialsForm>,
) -> impl Responder {
    authenticate(data, req, form.into_inner(), true).await
}

pub async fn sign_out(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    {
        let mut client = attached.client.lock().await;
        client.session.sign_out().await;
        client.unmount();
    }

    let mut expired = session_cookie("");
    expired.make_removal();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(client_cookie(&attached.id))
        .cookie(expired)
        .finish()
}

pub async fn switch_tab(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let tab = match path.parse::<Tab>() {
        Ok(tab) => tab,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        shell.lock().await.switch_to(tab).await;
    }
    see_other(&attached, "/")
}

pub async fn filter_collection(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<FilterForm>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.collection_mut() {
            view.set_filter(form.into_inner().q);
        }
    }
    see_other(&attached, "/")
}

pub async fn open_new_card(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.collection_mut() {
            view.open_add_card();
        }
    }
    see_other(&attached, "/")
}

pub async fn cancel_new_card(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.collection_mut() {
            view.cancel();
        }
    }
    see_other(&attached, "/")
}

pub async fn create_card(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<CardForm>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.collection_mut() {
            view.create_card(form.into_inner().into_draft()).await;
        }
    }
    see_other(&attached, "/")
}

pub async fn open_new_deck(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.open_create_deck();
        }
    }
    see_other(&attached, "/")
}

/// Closes whichever deck dialog is open.
pub async fn cancel_deck_dialog(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.close_dialog();
        }
    }
    see_other(&attached, "/")
}

pub async fn create_deck(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<DeckForm>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.create_deck(&form.name).await;
        }
    }
    see_other(&attached, "/")
}

pub async fn select_deck(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.select_deck(path.into_inner()).await;
        }
    }
    see_other(&attached, "/")
}

pub async fn delete_deck(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.delete_deck(path.into_inner()).await;
        }
    }
    see_other(&attached, "/")
}

pub async fn open_card_picker(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.open_add_card();
        }
    }
    see_other(&attached, "/")
}

pub async fn add_deck_card(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<PickCardForm>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.add_card_to_deck(form.card_id).await;
        }
    }
    see_other(&attached, "/")
}

pub async fn remove_deck_card(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        if let Some(view) = shell.lock().await.decks_mut() {
            view.remove_card_from_deck(path.into_inner()).await;
        }
    }
    see_other(&attached, "/")
}

/// Records the question and schedules the canned answer.
pub async fn ask_assistant(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<MessageForm>,
) -> impl Responder {
    let attached = data.attach(&req).await;
    if let Some(shell) = data.shell(&attached).await {
        let ticket = shell.lock().await.ask(&form.message);
        if let Some(ticket) = ticket {
            schedule_reply(&shell, ticket);
        }
    }
    see_other(&attached, "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::models::Color;

    #[test]
    fn card_form_parses_colors_and_checkbox() {
        let form = CardForm {
            name: "  Atraxa, Praetors' Voice ".into(),
            type_line: "Legendary Creature".into(),
            mana_cost: "{G}{W}{U}{B}".into(),
            colors: "b g u w".into(),
            color_identity: "WUBG".into(),
            is_legendary: Some("on".into()),
        };
        let draft = form.into_draft();
        assert_eq!(draft.name, "Atraxa, Praetors' Voice");
        assert_eq!(draft.colors, vec![Color::White, Color::Blue, Color::Black, Color::Green]);
        assert_eq!(draft.color_identity, draft.colors);
        assert!(draft.is_legendary);
    }

    #[test]
    fn unticked_checkbox_is_not_legendary() {
        let form = CardForm {
            name: "Sol Ring".into(),
            type_line: String::new(),
            mana_cost: String::new(),
            colors: String::new(),
            color_identity: String::new(),
            is_legendary: None,
        };
        let draft = form.into_draft();
        assert!(!draft.is_legendary);
        assert!(draft.colors.is_empty());
    }
}
