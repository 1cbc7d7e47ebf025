use serde::Deserialize;
use std::fmt;

/// Identifiers come back as numbers from the live API but some mirrors and
/// older filters hand them out as strings.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

/// One page of `/questions`.
#[derive(Deserialize, Debug)]
pub struct QuestionsPage {
    pub items: Vec<QuestionItem>,
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub quota_max: Option<u32>,
    #[serde(default)]
    pub quota_remaining: Option<u32>,
}

impl QuestionsPage {
    /// The explicit "more" flag. A response without one is not treated as the
    /// end; the empty-page rule and the item cap bound the session instead.
    pub fn has_more(&self) -> bool {
        self.has_more.unwrap_or(true)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct QuestionItem {
    #[serde(default)]
    pub question_id: Option<Identifier>,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub creation_date: i64,
    pub link: String,
    #[serde(default)]
    pub owner: Owner,
}

impl QuestionItem {
    /// Stable key for the item at `position` in the accumulated list.
    pub fn key(&self, position: usize) -> ItemKey {
        match &self.question_id {
            Some(id) => ItemKey::Id(id.clone()),
            None => ItemKey::Position(position),
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Owner {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub user_id: Option<Identifier>,
}

/// Render key for a card. Positions never move because the item list is
/// append-only, so a synthesized key stays valid across later pages.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Id(Identifier),
    Position(usize),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Id(id) => write!(f, "{}", id),
            ItemKey::Position(pos) => write!(f, "pos-{}", pos),
        }
    }
}

/// Error wrapper the API returns with non-2xx statuses.
#[derive(Deserialize, Debug, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_id: Option<u32>,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}
