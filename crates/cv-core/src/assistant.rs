//! # Scripted Assistant
//!
//! A chat transcript that answers every question with one of four fixed
//! deck-building tips, picked at random, one second after the question.
//! Nothing is sent anywhere and nothing is stored.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Delay between a question and its canned answer.
pub const REPLY_DELAY: Duration = Duration::from_millis(1000);

pub const WELCOME: &str = "Welcome, Planeswalker! I'm your deck building assistant. I can help you with:\n\n\
• Suggesting cards for your Commander deck\n\
• Explaining color identity and deck synergies\n\
• Recommending card ratios (lands, ramp, removal, etc.)\n\
• Analyzing your deck's strategy\n\n\
What would you like to know about building your Commander deck?";

pub const CANNED_REPLIES: [&str; 4] = [
    "Great question! For Commander decks, I recommend:\n\n\
• 36-38 lands for consistent mana\n\
• 10-12 ramp spells (Sol Ring, mana rocks, land ramp)\n\
• 8-10 card draw effects\n\
• 5-7 removal spells\n\
• 30-35 cards for your main strategy\n\n\
Adjust based on your commander's mana cost and strategy!",
    "Color identity is crucial in Commander! Your deck can only include cards with mana symbols that appear on your commander. For example:\n\n\
• An Atraxa deck (WUBG) can include all colors except red\n\
• Basic lands can go in any deck\n\
• Colorless cards work in any deck\n\n\
Make sure all lands can produce colors in your identity!",
    "Building around your commander is key! Consider:\n\n\
• What does your commander do best?\n\
• What cards amplify that strategy?\n\
• Include protection for your commander\n\
• Add ways to recast if removed\n\
• Build redundancy for key effects\n\n\
Your commander should be the centerpiece, but not the only win condition!",
    "For a balanced mana curve, aim for:\n\n\
• CMC 1-2: 8-12 cards (ramp, removal)\n\
• CMC 3-4: 15-20 cards (your engine)\n\
• CMC 5-6: 10-15 cards (big plays)\n\
• CMC 7+: 5-8 cards (finishers)\n\n\
Lower curves are faster, higher curves need more ramp!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Uniform pick from [`CANNED_REPLIES`].
pub fn pick_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CANNED_REPLIES.choose(rng).copied().unwrap_or(CANNED_REPLIES[0])
}

/// Append-only transcript plus the "waiting for a reply" flag.
#[derive(Debug, Clone)]
pub struct AssistantView {
    transcript: Vec<Message>,
    waiting: bool,
}

impl Default for AssistantView {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantView {
    pub fn new() -> Self {
        Self {
            transcript: vec![Message { role: Role::Assistant, content: WELCOME.to_string() }],
            waiting: false,
        }
    }

    /// Records the user's question and starts waiting.
    ///
    /// Blank input, or input arriving while a reply is pending, is ignored and
    /// returns `false`; the caller must not schedule a reply in that case.
    pub fn submit(&mut self, input: &str) -> bool {
        if input.trim().is_empty() || self.waiting {
            return false;
        }
        self.transcript.push(Message { role: Role::User, content: input.to_string() });
        self.waiting = true;
        true
    }

    /// Appends the answer and stops waiting. Ignored when nothing is pending.
    pub fn deliver(&mut self, reply: &str) {
        if !self.waiting {
            return;
        }
        self.transcript.push(Message { role: Role::Assistant, content: reply.to_string() });
        self.waiting = false;
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }
}
