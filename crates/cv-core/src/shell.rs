//! # Shell
//!
//! Top-level navigation for a signed-in client: exactly one view is mounted
//! at a time, and switching tabs tears the old one down.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::assistant::{self, AssistantView};
use crate::collection::CollectionView;
use crate::deck_builder::DeckBuilderView;
use crate::error::AppError;
use crate::models::Identity;
use crate::traits::VaultRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Collection,
    Decks,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Collection, Tab::Decks, Tab::Assistant];

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Collection => "collection",
            Tab::Decks => "decks",
            Tab::Assistant => "assistant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Collection => "Collection",
            Tab::Decks => "Decks",
            Tab::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.slug() == s)
            .ok_or_else(|| AppError::NotFound("Tab".into(), s.into()))
    }
}

pub enum ActiveView {
    Collection(CollectionView),
    Decks(DeckBuilderView),
    Assistant(AssistantView),
}

impl ActiveView {
    pub fn tab(&self) -> Tab {
        match self {
            ActiveView::Collection(_) => Tab::Collection,
            ActiveView::Decks(_) => Tab::Decks,
            ActiveView::Assistant(_) => Tab::Assistant,
        }
    }
}

/// A reply owed to the assistant view mounted as `mount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    mount: u64,
}

pub type SharedShell = Arc<Mutex<Shell>>;

pub struct Shell {
    repo: Arc<dyn VaultRepo>,
    identity: Identity,
    view: ActiveView,
    mount: u64,
}

impl Shell {
    /// Builds the shell for a freshly signed-in identity and mounts the default tab.
    pub async fn open(repo: Arc<dyn VaultRepo>, identity: Identity) -> Self {
        let view = Self::mount_view(&repo, &identity, Tab::default()).await;
        Self { repo, identity, view, mount: 0 }
    }

    /// Mounts `tab`. Re-selecting the active tab keeps its state.
    pub async fn switch_to(&mut self, tab: Tab) {
        if self.view.tab() == tab {
            return;
        }
        self.mount += 1;
        self.view = Self::mount_view(&self.repo, &self.identity, tab).await;
    }

    async fn mount_view(repo: &Arc<dyn VaultRepo>, identity: &Identity, tab: Tab) -> ActiveView {
        match tab {
            Tab::Collection => {
                let mut view = CollectionView::new(repo.clone(), identity.clone());
                view.load_cards().await;
                ActiveView::Collection(view)
            }
            Tab::Decks => {
                let mut view = DeckBuilderView::new(repo.clone(), identity.clone());
                view.load_decks().await;
                view.load_available_cards().await;
                ActiveView::Decks(view)
            }
            Tab::Assistant => ActiveView::Assistant(AssistantView::new()),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn active_tab(&self) -> Tab {
        self.view.tab()
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ActiveView {
        &mut self.view
    }

    pub fn collection_mut(&mut self) -> Option<&mut CollectionView> {
        match &mut self.view {
            ActiveView::Collection(view) => Some(view),
            _ => None,
        }
    }

    pub fn decks_mut(&mut self) -> Option<&mut DeckBuilderView> {
        match &mut self.view {
            ActiveView::Decks(view) => Some(view),
            _ => None,
        }
    }

    pub fn assistant_mut(&mut self) -> Option<&mut AssistantView> {
        match &mut self.view {
            ActiveView::Assistant(view) => Some(view),
            _ => None,
        }
    }

    /// Puts a question to the mounted assistant. `None` when it was ignored
    /// (blank, already waiting, or the assistant is not the active tab).
    pub fn ask(&mut self, input: &str) -> Option<ReplyTicket> {
        let mount = self.mount;
        let view = self.assistant_mut()?;
        view.submit(input).then_some(ReplyTicket { mount })
    }

    /// Delivers a reply if the view it was meant for is still mounted.
    pub fn deliver(&mut self, ticket: ReplyTicket, reply: &str) -> bool {
        if ticket.mount != self.mount {
            return false;
        }
        match self.assistant_mut() {
            Some(view) => {
                view.deliver(reply);
                true
            }
            None => false,
        }
    }
}

/// Answers `ticket` after [`assistant::REPLY_DELAY`].
///
/// The task holds only a weak handle: a client that is gone by then, or has
/// moved to another tab, simply never sees the reply.
pub fn schedule_reply(shell: &SharedShell, ticket: ReplyTicket) -> JoinHandle<()> {
    let shell: Weak<Mutex<Shell>> = Arc::downgrade(shell);
    tokio::spawn(async move {
        tokio::time::sleep(assistant::REPLY_DELAY).await;
        let reply = assistant::pick_reply(&mut rand::thread_rng());
        if let Some(shell) = shell.upgrade() {
            if !shell.lock().await.deliver(ticket, reply) {
                log::debug!("dropped assistant reply for a torn-down view");
            }
        }
    })
}
