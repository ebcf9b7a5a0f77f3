//! Pipeline data models.

use serde::{Deserialize, Serialize};

use mailsense_gmail::Message;

/// Keyword list for the local spam heuristic.
///
/// Matched case-insensitively as substrings of `subject + body`. This is a
/// cheap secondary signal next to the model-assigned `spam` tag, not a
/// replacement for it.
const SPAM_KEYWORDS: &[&str] = &[
    "free",
    "winner",
    "prize",
    "click here",
    "act now",
    "limited time",
    "unsubscribe",
    "promo code",
    "congratulations",
    "no obligation",
];

/// Intent/sentiment tag assigned to a message by the classifier.
///
/// Closed taxonomy; unknown model output collapses to [`Tag::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Time-sensitive or critical matter requiring immediate attention.
    Urgent,
    /// Professional or work-related correspondence.
    Business,
    /// Personal, social, or positive in nature.
    Friendly,
    /// Expressing dissatisfaction or raising an issue.
    Complaint,
    /// Unsolicited bulk or promotional mail.
    Spam,
    /// No classification signal.
    #[default]
    Default,
}

impl Tag {
    /// Parse from the classifier's string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "urgent" => Self::Urgent,
            "business" => Self::Business,
            "friendly" => Self::Friendly,
            "complaint" => Self::Complaint,
            "spam" => Self::Spam,
            _ => Self::Default,
        }
    }

    /// String representation used on the wire and in prompts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Business => "business",
            Self::Friendly => "friendly",
            Self::Complaint => "complaint",
            Self::Spam => "spam",
            Self::Default => "default",
        }
    }

    /// Emoji shown next to the tag in prompts and the extension popup.
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Urgent => "\u{26a0}\u{fe0f}",
            Self::Business => "\u{1f4bc}",
            Self::Friendly => "\u{1f60a}",
            Self::Complaint => "\u{1f621}",
            Self::Spam => "\u{1f6ab}",
            Self::Default => " ",
        }
    }
}

impl std::str::FromStr for Tag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Classification outcome for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Assigned intent/sentiment tag.
    pub tag: Tag,
    /// Spam verdict: model tag or keyword heuristic.
    pub is_spam: bool,
}

/// A cached message together with its classification.
#[derive(Debug, Clone)]
pub struct ClassifiedMessage {
    /// The underlying message.
    pub message: Message,
    /// Classification derived for it.
    pub classification: Classification,
}

/// Simplified message view served to the extension popup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOverview {
    /// Provider-assigned message id.
    pub id: String,
    /// Sender address or display name.
    pub sender: String,
    /// Message subject.
    pub subject: String,
    /// First 100 characters of the body.
    pub snippet: String,
    /// Assigned tag, when the classifier has seen this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    /// Emoji for the assigned tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_emoji: Option<String>,
    /// Spam verdict, when classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_spam: Option<bool>,
}

/// Local spam heuristic over subject and body.
#[must_use]
pub fn looks_like_spam(subject: &str, body: &str) -> bool {
    let haystack = format!("{subject} {body}").to_lowercase();
    SPAM_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword))
}

/// Truncate text to `max_chars`, dropping control characters.
#[must_use]
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(max_chars)
        .collect()
}
