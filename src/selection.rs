use crate::models::{ItemKey, QuestionItem};

/// What the detail overlay shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: ItemKey,
    pub title: String,
    pub link: String,
    pub body: String,
    pub author: String,
    pub creation_date: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    Closed,
    Open(Selection),
}

impl Overlay {
    /// Replaces whatever was selected before and opens the overlay.
    pub fn select_item(&mut self, item: &QuestionItem, position: usize) {
        *self = Overlay::Open(Selection {
            key: item.key(position),
            title: item.title.clone(),
            link: item.link.clone(),
            body: item.body.clone().unwrap_or_default(),
            author: item.owner.display_name.clone(),
            creation_date: item.creation_date,
        });
    }

    pub fn dismiss(&mut self) {
        *self = Overlay::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Overlay::Open(_))
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Overlay::Open(selection) => Some(selection),
            Overlay::Closed => None,
        }
    }
}
