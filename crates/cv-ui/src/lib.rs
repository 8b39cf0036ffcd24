//! # cv-ui
//!
//! Askama templates for every screen, and the functions that turn a view's
//! state into a rendered page.

use askama::Template;
use cv_core::collection::{CollectionMode, CollectionView, ColorBucket};
use cv_core::deck::{DeckStatus, COMMANDER_DECK_SIZE};
use cv_core::deck_builder::{DeckBuilderMode, DeckBuilderView};
use cv_core::assistant::{AssistantView, Role};
use cv_core::models::ColorSet;
use cv_core::shell::{ActiveView, Shell, Tab};

pub const APP_NAME: &str = "Commander's Vault";

/// Chrome shared by every page: title, navigation and the one-shot alert.
pub struct Page {
    pub title: String,
    pub refresh: bool,
    pub alert: Option<String>,
    pub nav: Vec<NavItem>,
    pub email: Option<String>,
}

impl Page {
    fn bare(title: &str) -> Self {
        Self { title: title.to_string(), refresh: false, alert: None, nav: Vec::new(), email: None }
    }

    fn for_shell(shell: &Shell, section: &str, alert: Option<String>) -> Self {
        Self {
            title: format!("{section} - {APP_NAME}"),
            refresh: false,
            alert,
            nav: Tab::ALL
                .into_iter()
                .map(|tab| NavItem { slug: tab.slug(), label: tab.label(), active: tab == shell.active_tab() })
                .collect(),
            email: Some(shell.identity().email.clone()),
        }
    }
}

pub struct NavItem {
    pub slug: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub page: Page,
    pub sign_up: bool,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub page: Page,
}

pub struct CardTile {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub bucket: &'static str,
    pub legendary: bool,
    pub quantity: i64,
}

/// Values echoed back into the add-card form.
pub struct DraftForm {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub colors: String,
    pub color_identity: String,
    pub is_legendary: bool,
}

#[derive(Template)]
#[template(path = "collection.html")]
pub struct CollectionTemplate {
    pub page: Page,
    pub loading: bool,
    pub filter: String,
    pub total: usize,
    pub cards: Vec<CardTile>,
    pub draft: Option<DraftForm>,
}

pub struct DeckRow {
    pub id: String,
    pub name: String,
    pub commander: Option<String>,
    pub selected: bool,
}

pub struct DeckCardRow {
    pub id: String,
    pub name: String,
    pub type_line: String,
    pub quantity: i64,
}

pub struct PickerCard {
    pub id: String,
    pub name: String,
    pub type_line: String,
}

#[derive(Template)]
#[template(path = "decks.html")]
pub struct DecksTemplate {
    pub page: Page,
    pub loading: bool,
    pub decks: Vec<DeckRow>,
    pub selected_name: Option<String>,
    pub total: i64,
    pub deck_size: i64,
    pub incomplete: bool,
    pub complete: bool,
    pub can_add: bool,
    pub deck_cards: Vec<DeckCardRow>,
    pub creating: bool,
    pub picking: bool,
    pub available: Vec<PickerCard>,
}

pub struct MessageRow {
    pub from_user: bool,
    pub content: String,
}

#[derive(Template)]
#[template(path = "assistant.html")]
pub struct AssistantTemplate {
    pub page: Page,
    pub messages: Vec<MessageRow>,
    pub waiting: bool,
}

pub fn auth_page(sign_up: bool, error: Option<String>) -> askama::Result<String> {
    AuthTemplate { page: Page::bare(APP_NAME), sign_up, error }.render()
}

/// Shown while a client's stored session is still being resolved.
pub fn loading_page() -> askama::Result<String> {
    let mut page = Page::bare(APP_NAME);
    page.refresh = true;
    LoadingTemplate { page }.render()
}

/// Renders the navigation plus whichever view is mounted. Consumes pending alerts.
pub fn shell_page(shell: &mut Shell) -> askama::Result<String> {
    let alert = match shell.view_mut() {
        ActiveView::Collection(view) => view.take_alert(),
        ActiveView::Decks(view) => view.take_alert(),
        ActiveView::Assistant(_) => None,
    };

    match shell.view() {
        ActiveView::Collection(view) => {
            collection_template(Page::for_shell(shell, "Collection", alert), view).render()
        }
        ActiveView::Decks(view) => decks_template(Page::for_shell(shell, "Decks", alert), view).render(),
        ActiveView::Assistant(view) => {
            assistant_template(Page::for_shell(shell, "Assistant", alert), view).render()
        }
    }
}

pub fn collection_template(page: Page, view: &CollectionView) -> CollectionTemplate {
    let cards = view
        .filtered()
        .into_iter()
        .map(|owned| CardTile {
            name: owned.card.name.clone(),
            type_line: owned.card.type_line.clone().unwrap_or_default(),
            mana_cost: owned.card.mana_cost.clone().unwrap_or_default(),
            bucket: ColorBucket::of(&owned.card.colors).css_class(),
            legendary: owned.card.is_legendary,
            quantity: owned.entry.quantity,
        })
        .collect();

    let draft = match view.mode() {
        CollectionMode::Browsing => None,
        CollectionMode::AddingCard(draft) => Some(DraftForm {
            name: draft.name.clone(),
            type_line: draft.type_line.clone(),
            mana_cost: draft.mana_cost.clone(),
            colors: ColorSet(draft.colors.clone()).to_string(),
            color_identity: ColorSet(draft.color_identity.clone()).to_string(),
            is_legendary: draft.is_legendary,
        }),
    };

    CollectionTemplate {
        page,
        loading: view.is_loading(),
        filter: view.filter().to_string(),
        total: view.cards().len(),
        cards,
        draft,
    }
}

pub fn decks_template(page: Page, view: &DeckBuilderView) -> DecksTemplate {
    let selected_id = view.selected().map(|d| d.deck.id);
    let status = view.status();

    DecksTemplate {
        page,
        loading: view.is_loading(),
        decks: view
            .decks()
            .iter()
            .map(|d| DeckRow {
                id: d.deck.id.to_string(),
                name: d.deck.name.clone(),
                commander: d.commander.as_ref().map(|c| c.name.clone()),
                selected: Some(d.deck.id) == selected_id,
            })
            .collect(),
        selected_name: view.selected().map(|d| d.deck.name.clone()),
        total: view.card_total(),
        deck_size: COMMANDER_DECK_SIZE,
        incomplete: status == DeckStatus::Incomplete,
        complete: status == DeckStatus::Complete,
        can_add: view.can_add_cards(),
        deck_cards: view
            .deck_cards()
            .iter()
            .map(|dc| DeckCardRow {
                id: dc.entry.id.to_string(),
                name: dc.card.name.clone(),
                type_line: dc.card.type_line.clone().unwrap_or_default(),
                quantity: dc.entry.quantity,
            })
            .collect(),
        creating: view.mode() == DeckBuilderMode::CreatingDeck,
        picking: view.mode() == DeckBuilderMode::AddingCard,
        available: view
            .available_cards()
            .iter()
            .map(|c| PickerCard {
                id: c.id.to_string(),
                name: c.name.clone(),
                type_line: c.type_line.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

pub fn assistant_template(mut page: Page, view: &AssistantView) -> AssistantTemplate {
    // keep polling until the canned answer has landed
    page.refresh = view.is_waiting();
    AssistantTemplate {
        page,
        messages: view
            .transcript()
            .iter()
            .map(|m| MessageRow { from_user: m.role == Role::User, content: m.content.clone() })
            .collect(),
        waiting: view.is_waiting(),
    }
}
