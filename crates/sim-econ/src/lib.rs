#![deny(warnings)]

//! Static catalog and economic curves for Mart Tycoon.
//!
//! This crate supplies the read-only configuration consumed by the runtime:
//! - The product table (fixed identity, wholesale cost, base price)
//! - Upgrade cost/effect/description formulas as pure functions of level
//! - The ordered goal list with metric extractors and completion predicates
//! - Special-offer constants and promotional pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Catalog, GameState, Product, ProductId, UpgradeId};
use std::time::Duration;

/// Cash every new session starts with.
pub fn initial_cash() -> Decimal {
    Decimal::new(500, 0)
}

/// Per-product shelf capacity at storage level 1.
pub const MAX_INVENTORY_BASE: u32 = 50;

/// Customer arrival interval at marketing level 1.
pub const CUSTOMER_ARRIVAL_BASE: Duration = Duration::from_millis(5000);

/// Up-front cost of launching a special offer.
pub fn special_offer_cost() -> Decimal {
    Decimal::new(200, 0)
}

/// How long a special offer runs once launched.
pub const SPECIAL_OFFER_DURATION: Duration = Duration::from_secs(30);

/// Lock-out after an offer's scheduled end before the next may start.
pub const SPECIAL_OFFER_COOLDOWN: Duration = Duration::from_secs(60);

/// Price multiplier applied while a product is on offer.
pub fn special_offer_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

/// Sale price of a product while it is the active special offer.
pub fn offer_price(base_price: Decimal) -> Decimal {
    base_price * special_offer_multiplier()
}

/// The six-product store shelf, in fixed display order.
pub fn default_catalog() -> Catalog {
    let product = |id: &str, name: &str, icon: &str, cost: i64, price: i64| Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        icon: icon.to_string(),
        cost: Decimal::new(cost, 0),
        price: Decimal::new(price, 0),
    };
    Catalog {
        products: vec![
            product("apple", "Apples", "🍎", 1, 2),
            product("bread", "Bread", "🍞", 2, 4),
            product("milk", "Milk", "🥛", 3, 5),
            product("cheese", "Cheese", "🧀", 5, 8),
            product("chicken", "Chicken", "🍗", 8, 13),
            product("sushi", "Sushi", "🍣", 12, 20),
        ],
    }
}

/// Display name of an upgrade track.
pub fn upgrade_name(id: UpgradeId) -> &'static str {
    match id {
        UpgradeId::Storage => "Bigger Storage",
        UpgradeId::Marketing => "Better Marketing",
    }
}

/// Cost to advance from `level` to the next level.
///
/// Storage doubles from a $100 base; marketing grows 2.5x from $250.
pub fn upgrade_cost(id: UpgradeId, level: u32) -> Decimal {
    let (base, ratio) = match id {
        UpgradeId::Storage => (Decimal::new(100, 0), Decimal::new(2, 0)),
        UpgradeId::Marketing => (Decimal::new(250, 0), Decimal::new(25, 1)),
    };
    let mut cost = base;
    for _ in 1..level {
        cost *= ratio;
    }
    cost
}

/// Per-product shelf capacity at a given storage level (+15 per level).
pub fn storage_capacity(level: u32) -> u32 {
    MAX_INVENTORY_BASE + level.saturating_sub(1) * 15
}

/// Customer arrival interval at a given marketing level (20% faster per
/// level, compounding).
pub fn customer_interval(level: u32) -> Duration {
    let speedup = 1.2f64.powi(level.saturating_sub(1) as i32);
    Duration::from_secs_f64(CUSTOMER_ARRIVAL_BASE.as_secs_f64() / speedup)
}

/// Human-readable description of what the next level of an upgrade brings.
pub fn upgrade_description(id: UpgradeId, level: u32) -> String {
    match id {
        UpgradeId::Storage => {
            format!("Increases max inventory per item by 15. Next: +{}", level * 15)
        }
        UpgradeId::Marketing => {
            let pct = (1.0 - 1.0 / 1.2f64.powi(level as i32)) * 100.0;
            format!("Attracts customers {pct:.0}% faster.")
        }
    }
}

/// Display unit for a goal's progress readout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalUnit {
    /// Progress is a dollar amount.
    Money,
    /// Progress is a plain count.
    Items,
}

/// Which state metric a goal tracks. Keyed registry of pure extractors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalMetric {
    /// Lifetime revenue.
    TotalCashEarned,
    /// Lifetime units sold.
    TotalItemsSold,
    /// Level of a specific upgrade track.
    UpgradeLevel(UpgradeId),
    /// Cash currently on hand.
    CashOnHand,
}

impl GoalMetric {
    /// Extract the tracked value from the state.
    pub fn value(&self, state: &GameState) -> Decimal {
        match self {
            GoalMetric::TotalCashEarned => state.stats.total_cash_earned,
            GoalMetric::TotalItemsSold => Decimal::from(state.stats.total_items_sold),
            GoalMetric::UpgradeLevel(id) => Decimal::from(state.upgrade_level(*id)),
            GoalMetric::CashOnHand => state.cash,
        }
    }
}

/// An ordered progression milestone. Exactly one goal is current at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Player-facing description.
    pub description: String,
    /// Cash reward on completion.
    pub reward: Decimal,
    /// Threshold the metric must reach.
    pub target: Decimal,
    /// Which metric is tracked.
    pub metric: GoalMetric,
    /// How progress is displayed.
    pub unit: GoalUnit,
}

impl Goal {
    /// Current value of the tracked metric.
    pub fn current_value(&self, state: &GameState) -> Decimal {
        self.metric.value(state)
    }

    /// Whether the goal's completion predicate holds.
    pub fn is_completed(&self, state: &GameState) -> bool {
        self.current_value(state) >= self.target
    }
}

/// The ordered sales-goal list, evaluated strictly in this order.
pub fn goals() -> Vec<Goal> {
    let goal = |description: &str, reward: i64, target: i64, metric: GoalMetric, unit: GoalUnit| {
        Goal {
            description: description.to_string(),
            reward: Decimal::new(reward, 0),
            target: Decimal::new(target, 0),
            metric,
            unit,
        }
    };
    vec![
        goal(
            "Earn your first $1,000",
            250,
            1000,
            GoalMetric::TotalCashEarned,
            GoalUnit::Money,
        ),
        goal(
            "Sell 50 total items",
            500,
            50,
            GoalMetric::TotalItemsSold,
            GoalUnit::Items,
        ),
        goal(
            "Purchase your first Marketing upgrade",
            750,
            2,
            GoalMetric::UpgradeLevel(UpgradeId::Marketing),
            GoalUnit::Items,
        ),
        goal(
            "Reach $5,000 cash on hand",
            1000,
            5000,
            GoalMetric::CashOnHand,
            GoalUnit::Money,
        ),
        goal(
            "Sell 250 total items",
            1500,
            250,
            GoalMetric::TotalItemsSold,
            GoalUnit::Items,
        ),
        goal(
            "Become a Tycoon (Reach $20,000 cash)",
            5000,
            20000,
            GoalMetric::CashOnHand,
            GoalUnit::Money,
        ),
    ]
}
