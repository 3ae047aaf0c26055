#![deny(warnings)]

//! Core domain models and the state reducer for Mart Tycoon.
//!
//! This crate defines the serializable game state, the discrete actions that
//! mutate it, and the pure `apply` transition function, together with
//! validation helpers that guarantee basic invariants. The reducer is total:
//! an action whose guard fails returns the input state unchanged instead of
//! producing an error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Unique identifier for a product, e.g. "apple", "sushi".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Identifier for a purchasable upgrade track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeId {
    /// Raises the per-product inventory cap.
    Storage,
    /// Shortens the customer arrival interval.
    Marketing,
}

impl UpgradeId {
    /// Every upgrade track known to the game.
    pub const ALL: [UpgradeId; 2] = [UpgradeId::Storage, UpgradeId::Marketing];
}

/// A product on the store shelves with fixed purchase cost and base price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Display name, e.g. "Apples".
    pub name: String,
    /// Display icon (emoji).
    pub icon: String,
    /// Wholesale cost per unit in USD.
    pub cost: Decimal,
    /// Base sale price per unit in USD.
    pub price: Decimal,
}

/// The full read-only product table supplied at process start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Products in fixed display order.
    pub products: Vec<Product>,
}

impl Catalog {
    /// Look up a product by id.
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }
}

/// An active (or cleared) special offer. Either both fields are set or both
/// are unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialOffer {
    /// Product currently on promotion.
    pub product_id: Option<ProductId>,
    /// Instant at which the promotion lapses.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SpecialOffer {
    /// Whether an offer is currently set.
    pub fn is_active(&self) -> bool {
        self.product_id.is_some()
    }
}

/// Lifetime sales counters. Both fields only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Units sold across the whole session.
    pub total_items_sold: u64,
    /// Revenue collected across the whole session in USD.
    pub total_cash_earned: Decimal,
}

/// The single authoritative game state, replaced immutably on each transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Cash on hand in USD. Spend transitions are guarded so this never goes
    /// negative.
    pub cash: Decimal,
    /// Units on the shelf per product; an absent key means zero.
    pub inventory: BTreeMap<ProductId, u32>,
    /// Level per upgrade track; levels only increase.
    pub upgrades: BTreeMap<UpgradeId, u32>,
    /// Terminal flag, monotonic false to true.
    pub is_game_over: bool,
    /// Currently running promotion, if any.
    pub special_offer: SpecialOffer,
    /// Instant before which no new promotion may start. Independent of
    /// whether the offer itself has already expired.
    pub offer_cooldown_until: Option<DateTime<Utc>>,
    /// Lifetime counters.
    pub stats: Stats,
    /// Index of the active goal in the ordered goal list.
    pub current_goal_index: usize,
}

impl GameState {
    /// Fresh session state: given starting cash, empty shelves, every known
    /// upgrade at level 1, no offer, zero stats, first goal active.
    pub fn initial(starting_cash: Decimal) -> Self {
        let mut upgrades = BTreeMap::new();
        for id in UpgradeId::ALL {
            let _ = upgrades.insert(id, 1);
        }
        GameState {
            cash: starting_cash,
            inventory: BTreeMap::new(),
            upgrades,
            is_game_over: false,
            special_offer: SpecialOffer::default(),
            offer_cooldown_until: None,
            stats: Stats::default(),
            current_goal_index: 0,
        }
    }

    /// Units on the shelf for a product (zero when absent).
    pub fn stock_of(&self, id: &ProductId) -> u32 {
        self.inventory.get(id).copied().unwrap_or(0)
    }

    /// Current level of an upgrade track (base level 1 when absent).
    pub fn upgrade_level(&self, id: UpgradeId) -> u32 {
        self.upgrades.get(&id).copied().unwrap_or(1)
    }

    /// Whether any product has at least one unit on the shelf.
    pub fn has_any_stock(&self) -> bool {
        self.inventory.values().any(|&q| q > 0)
    }
}

/// Discrete transitions accepted by [`apply`].
///
/// Timestamps are computed by the caller; the reducer never reads the clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// A customer buys one unit at the given price.
    Sell {
        /// Product being sold.
        product_id: ProductId,
        /// Price actually charged (base or promotional).
        sale_price: Decimal,
    },
    /// Restock a product from the wholesaler.
    BuyStock {
        /// Product being restocked.
        product_id: ProductId,
        /// Units added to the shelf.
        quantity: u32,
        /// Total cost charged against cash.
        cost: Decimal,
    },
    /// Raise an upgrade track by one level.
    BuyUpgrade {
        /// Track being upgraded.
        upgrade_id: UpgradeId,
        /// Cost of the next level.
        cost: Decimal,
    },
    /// Launch a promotion on one product.
    StartSpecialOffer {
        /// Product placed on promotion.
        product_id: ProductId,
        /// Up-front cost of running the promotion.
        cost: Decimal,
        /// Instant at which the promotion lapses.
        expires_at: DateTime<Utc>,
        /// Instant before which no further promotion may start.
        cooldown_until: DateTime<Utc>,
    },
    /// Clear the running promotion. The cooldown field is untouched.
    EndSpecialOffer,
    /// Collect the active goal's reward and advance to the next goal.
    CompleteGoal {
        /// Cash reward granted.
        reward: Decimal,
    },
    /// Mark the session as bankrupt.
    SetGameOver,
}

/// Apply one action to the state, producing the next state.
///
/// Pure and total: guard failures (unknown product, empty shelf,
/// unaffordable cost) return the input state unchanged.
pub fn apply(catalog: &Catalog, state: &GameState, action: &Action) -> GameState {
    match action {
        Action::Sell {
            product_id,
            sale_price,
        } => {
            if catalog.product(product_id).is_none() {
                return state.clone();
            }
            let on_shelf = state.stock_of(product_id);
            if on_shelf == 0 {
                return state.clone();
            }
            let mut next = state.clone();
            next.cash += *sale_price;
            let _ = next.inventory.insert(product_id.clone(), on_shelf - 1);
            next.stats.total_items_sold += 1;
            next.stats.total_cash_earned += *sale_price;
            next
        }
        Action::BuyStock {
            product_id,
            quantity,
            cost,
        } => {
            if state.cash < *cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.cash -= *cost;
            let on_shelf = state.stock_of(product_id);
            let _ = next.inventory.insert(product_id.clone(), on_shelf + quantity);
            next
        }
        Action::BuyUpgrade { upgrade_id, cost } => {
            if state.cash < *cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.cash -= *cost;
            let level = state.upgrade_level(*upgrade_id);
            let _ = next.upgrades.insert(*upgrade_id, level + 1);
            next
        }
        Action::StartSpecialOffer {
            product_id,
            cost,
            expires_at,
            cooldown_until,
        } => {
            if state.cash < *cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.cash -= *cost;
            next.special_offer = SpecialOffer {
                product_id: Some(product_id.clone()),
                expires_at: Some(*expires_at),
            };
            next.offer_cooldown_until = Some(*cooldown_until);
            next
        }
        Action::EndSpecialOffer => {
            let mut next = state.clone();
            next.special_offer = SpecialOffer::default();
            next
        }
        Action::CompleteGoal { reward } => {
            let mut next = state.clone();
            next.cash += *reward;
            next.current_goal_index += 1;
            next
        }
        Action::SetGameOver => {
            let mut next = state.clone();
            next.is_game_over = true;
            next
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The catalog must contain at least one product.
    #[error("catalog contains no products")]
    EmptyCatalog,
    /// Product ids must be unique within the catalog.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),
    /// Display names must be non-empty.
    #[error("product {0} has an empty name")]
    EmptyName(String),
    /// Costs and prices must be non-negative.
    #[error("negative monetary value on {0}")]
    NegativeMoney(String),
    /// State refers to a product the catalog does not know.
    #[error("unknown product referenced: {0}")]
    UnknownProduct(String),
    /// An offer must have both fields set or both unset.
    #[error("special offer has mismatched fields")]
    OfferFieldsMismatch,
}

/// Validate the static product table.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    if catalog.products.is_empty() {
        return Err(ValidationError::EmptyCatalog);
    }
    let mut seen: BTreeSet<&ProductId> = BTreeSet::new();
    for p in &catalog.products {
        if p.name.trim().is_empty() {
            return Err(ValidationError::EmptyName(p.id.0.clone()));
        }
        if p.cost < Decimal::ZERO || p.price < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(p.id.0.clone()));
        }
        if !seen.insert(&p.id) {
            return Err(ValidationError::DuplicateProduct(p.id.0.clone()));
        }
    }
    Ok(())
}

/// Validate a state against the catalog, including offer-field consistency.
pub fn validate_state(state: &GameState, catalog: &Catalog) -> Result<(), ValidationError> {
    if state.cash < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("cash".to_string()));
    }
    for id in state.inventory.keys() {
        if catalog.product(id).is_none() {
            return Err(ValidationError::UnknownProduct(id.0.clone()));
        }
    }
    if state.special_offer.product_id.is_some() != state.special_offer.expires_at.is_some() {
        return Err(ValidationError::OfferFieldsMismatch);
    }
    if let Some(id) = &state.special_offer.product_id {
        if catalog.product(id).is_none() {
            return Err(ValidationError::UnknownProduct(id.0.clone()));
        }
    }
    Ok(())
}
