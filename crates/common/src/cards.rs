//! Card registry and single-select visibility filter
//!
//! A [`CardRegistry`] is rebuilt from a test-case collection whenever the
//! owning stage stores a new result. Each [`Card`] carries the category and
//! mapped flag it was built from, so the [`FilterEngine`] never has to look at
//! the original entity again.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{Category, CombinedTestCase, TestCase};

/// Anything that can be rendered as a filterable card
pub trait CardSource {
    fn card_id(&self) -> &str;
    fn category(&self) -> &Category;
    /// `None` for collections without a mapping step
    fn mapped(&self) -> Option<bool> {
        None
    }
}

impl CardSource for TestCase {
    fn card_id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &Category {
        &self.category
    }
}

impl CardSource for CombinedTestCase {
    fn card_id(&self) -> &str {
        &self.tc_id
    }

    fn category(&self) -> &Category {
        &self.category
    }

    fn mapped(&self) -> Option<bool> {
        Some(self.mapped)
    }
}

/// Which collection a board presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardView {
    Analysis,
    Combined,
}

impl std::fmt::Display for CardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardView::Analysis => write!(f, "analysis"),
            CardView::Combined => write!(f, "combined"),
        }
    }
}

/// Opaque card handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Position in the source collection
    pub index: usize,
    pub id: String,
    pub category: Category,
    pub mapped: Option<bool>,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRegistry {
    cards: Vec<Card>,
}

impl CardRegistry {
    /// Replace the registry with one card per case, in input order.
    pub fn build<T: CardSource>(&mut self, cases: &[T]) -> &[Card] {
        self.cards = cases
            .iter()
            .enumerate()
            .map(|(index, case)| Card {
                index,
                id: case.card_id().to_string(),
                category: case.category().clone(),
                mapped: case.mapped(),
                visible: true,
            })
            .collect();
        &self.cards
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

/// Filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum FilterKey {
    #[default]
    All,
    Category(Category),
    /// Combined view only
    Unmapped,
}

impl FilterKey {
    /// Parse a filter key, rejecting keys the view does not offer.
    pub fn parse_for(view: CardView, key: &str) -> Result<Self> {
        let trimmed = key.trim();
        let parsed = match trimmed.to_lowercase().as_str() {
            "all" => FilterKey::All,
            "unmapped" => FilterKey::Unmapped,
            "positive" => FilterKey::Category(Category::Positive),
            "negative" => FilterKey::Category(Category::Negative),
            "boundary" => FilterKey::Category(Category::Boundary),
            "edge case" | "edge-case" | "edge" => FilterKey::Category(Category::EdgeCase),
            _ => return Err(Error::UnknownFilter(trimmed.to_string())),
        };

        if parsed == FilterKey::Unmapped && view != CardView::Combined {
            return Err(Error::UnknownFilter(format!("{} (combined view only)", trimmed)));
        }
        Ok(parsed)
    }

    fn admits(&self, card: &Card) -> bool {
        match self {
            FilterKey::All => true,
            FilterKey::Unmapped => card.mapped == Some(false),
            FilterKey::Category(category) => card.category == *category,
        }
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKey::All => write!(f, "all"),
            FilterKey::Unmapped => write!(f, "unmapped"),
            FilterKey::Category(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEngine {
    active: FilterKey,
}

impl FilterEngine {
    pub fn active(&self) -> &FilterKey {
        &self.active
    }

    /// Recompute visibility of every card from scratch and return the
    /// number of visible cards.
    pub fn apply(&mut self, key: FilterKey, registry: &mut CardRegistry) -> usize {
        let mut visible = 0;
        for card in registry.cards.iter_mut() {
            card.visible = key.admits(card);
            if card.visible {
                visible += 1;
            }
        }
        self.active = key;
        visible
    }

    pub fn reset(&mut self, registry: &mut CardRegistry) {
        self.apply(FilterKey::All, registry);
    }
}

/// Registry and filter for one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBoard {
    view: CardView,
    registry: CardRegistry,
    filter: FilterEngine,
}

impl CardBoard {
    pub fn new(view: CardView) -> Self {
        Self {
            view,
            registry: CardRegistry::default(),
            filter: FilterEngine::default(),
        }
    }

    /// Rebuild from a fresh collection; the filter starts over at `all`.
    pub fn rebuild<T: CardSource>(&mut self, cases: &[T]) {
        self.registry.build(cases);
        self.filter.reset(&mut self.registry);
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.filter = FilterEngine::default();
    }

    pub fn apply(&mut self, key: FilterKey) -> usize {
        self.filter.apply(key, &mut self.registry)
    }

    pub fn apply_str(&mut self, key: &str) -> Result<usize> {
        let key = FilterKey::parse_for(self.view, key)?;
        Ok(self.apply(key))
    }

    pub fn active_filter(&self) -> &FilterKey {
        self.filter.active()
    }

    pub fn cards(&self) -> &[Card] {
        self.registry.cards()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Card> {
        self.registry.cards().iter().filter(|c| c.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }
}
