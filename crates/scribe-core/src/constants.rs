//! Application-wide constants
//!
//! Centralized location for magic strings and configuration values
//! that are used across multiple modules.

/// Default application namespace under which all public collections live.
pub const DEFAULT_APP_ID: &str = "soul-scribe-v1";

/// Default Gemini generateContent endpoint.
pub const GENERATIVE_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent";

/// Feed query page size. "Load more" re-seeds rather than paginating, so this
/// is also the hard cap on visible quotes.
pub const FEED_PAGE_SIZE: usize = 50;

/// Notification query page size. The unread badge filters this superset
/// client-side, so it is also the badge's accuracy ceiling.
pub const NOTIFICATION_PAGE_SIZE: usize = 50;

/// Community chat query page size.
pub const CHAT_PAGE_SIZE: usize = 100;

/// How many characters of a comment survive into its notification message.
pub const NOTIFICATION_PREVIEW_CHARS: usize = 20;

/// Author id stamped on seeded demo quotes.
pub const DEMO_AUTHOR_ID: &str = "demo_user";

/// Synthetic id prefix for the optimistic demo view shown before the seed
/// batch commits.
pub const OPTIMISTIC_ID_PREFIX: &str = "temp-";

// Collection names (scoped under the app's public data path)
pub mod collections {
    /// Shared quote feed
    pub const QUOTES: &str = "quotes";
    /// Like/comment notification fan-out
    pub const NOTIFICATIONS: &str = "notifications";
    /// Community chat log
    pub const COMMUNITY_MESSAGES: &str = "community_messages";
    /// Per-user profile document id
    pub const PROFILE_DOC: &str = "info";
}

/// Demo quotes inserted on cold start: (text, author name, theme id).
pub const DEMO_QUOTES: [(&str, &str, &str); 5] = [
    (
        "The wound is the place where the Light enters you.",
        "Rumi",
        "classic",
    ),
    (
        "I wish I could show you when you are lonely or in darkness the astonishing light of your own being.",
        "Hafiz",
        "warm",
    ),
    ("What you seek is seeking you.", "Rumi", "parchment"),
    (
        "Do not be satisfied with the stories that come before you. Unfold your own myth.",
        "Rumi",
        "classic",
    ),
    (
        "The universe is not outside of you. Look inside yourself; everything that you want, you already are.",
        "Rumi",
        "classic",
    ),
];

/// Canned quotes served when the generative API is unreachable and the request
/// was quote-shaped. Indistinguishable from a real response by design.
pub const FALLBACK_QUOTES: [&str; 6] = [
    "The soul has been given its own ears to hear things the mind does not understand. – Rumi",
    "Your heart is the size of an ocean. Go find yourself in its hidden depths. – Rumi",
    "What you seek is seeking you. – Rumi",
    "Where there is ruin, there is hope for a treasure. – Rumi",
    "Silence is the language of God, all else is poor translation. – Rumi",
    "Do not be satisfied with the stories that come before you. Unfold your own myth. – Rumi",
];

/// Fallback when the generative API fails on a non-quote request.
pub const FALLBACK_APOLOGY: &str =
    "My connection to the universal muse is faint right now. Please try again in a moment.";

/// Returned when the API answers 200 but with no candidate text.
pub const EMPTY_GENERATION: &str = "I couldn't generate that right now.";

/// System instruction for topic-to-quote generation.
pub const QUOTE_SYSTEM_PROMPT: &str =
    "You are a poetic quote generator. Output ONLY the quote text itself.";
