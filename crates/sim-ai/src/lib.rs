#![deny(warnings)]

//! Advice collaborator boundary for Mart Tycoon.
//!
//! An [`AdviceProvider`] turns a snapshot of the store into a short
//! natural-language recommendation. The boundary is fallible on the provider
//! side but infallible for callers: [`business_advice`] collapses any
//! provider error into a fixed fallback string, so the simulation never has
//! to handle an advice failure. No retries, no caching.

use rust_decimal::Decimal;
use serde::Serialize;
use sim_core::{Catalog, GameState, UpgradeId};
use thiserror::Error;
use tracing::warn;

/// Shown whenever the provider fails, instead of an error.
pub const FALLBACK_ADVICE: &str =
    "Looks like your business advisor is on a coffee break. Please try again in a moment!";

/// Failure inside an advice provider. Never escapes [`business_advice`].
#[derive(Debug, Error)]
pub enum AdviceError {
    /// The provider could not produce a recommendation.
    #[error("advice provider failed: {0}")]
    Provider(String),
}

/// One shelf line in the snapshot handed to the provider.
#[derive(Clone, Debug, Serialize)]
pub struct InventoryLine {
    /// Product display name.
    pub name: String,
    /// Units currently on the shelf.
    pub on_hand: u32,
}

/// One upgrade track in the snapshot handed to the provider.
#[derive(Clone, Debug, Serialize)]
pub struct UpgradeLine {
    /// Upgrade display name.
    pub name: String,
    /// Current level.
    pub level: u32,
    /// Cost of the next level.
    pub next_cost: Decimal,
}

/// Everything a provider gets to see: cash, shelves, upgrade levels, and
/// the current per-product capacity.
#[derive(Clone, Debug, Serialize)]
pub struct AdviceRequest {
    /// Cash on hand.
    pub cash: Decimal,
    /// Per-product shelf capacity at the current storage level.
    pub max_inventory: u32,
    /// Shelf contents in catalog order.
    pub inventory: Vec<InventoryLine>,
    /// Upgrade tracks with their next-level costs.
    pub upgrades: Vec<UpgradeLine>,
}

impl AdviceRequest {
    /// Snapshot the parts of the state a provider is allowed to see.
    pub fn from_state(catalog: &Catalog, state: &GameState) -> Self {
        let max_inventory =
            sim_econ::storage_capacity(state.upgrade_level(UpgradeId::Storage));
        let inventory = catalog
            .products
            .iter()
            .map(|p| InventoryLine {
                name: p.name.clone(),
                on_hand: state.stock_of(&p.id),
            })
            .collect();
        let upgrades = UpgradeId::ALL
            .iter()
            .map(|&id| {
                let level = state.upgrade_level(id);
                UpgradeLine {
                    name: sim_econ::upgrade_name(id).to_string(),
                    level,
                    next_cost: sim_econ::upgrade_cost(id, level),
                }
            })
            .collect();
        AdviceRequest {
            cash: state.cash,
            max_inventory,
            inventory,
            upgrades,
        }
    }
}

/// Render the consultant prompt a generative provider would be sent.
pub fn render_prompt(request: &AdviceRequest) -> String {
    let inventory_list = request
        .inventory
        .iter()
        .map(|l| format!("- {}: {} / {} units", l.name, l.on_hand, request.max_inventory))
        .collect::<Vec<_>>()
        .join("\n");
    let upgrades_list = request
        .upgrades
        .iter()
        .map(|u| format!("- {}: Level {}", u.name, u.level))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a friendly and encouraging retail business consultant AI for a simulation game.\n\
         Your goal is to help a player succeed.\n\
         Based on the following game state, provide a concise, actionable tip for the player.\n\
         The tip should be 2-3 sentences long.\n\
         Focus on one key area for improvement:\n\
         1. Suggest a specific product to stock up on, especially if it's at zero.\n\
         2. Suggest an upgrade to purchase if they have enough cash and it makes sense.\n\
         3. Give a general strategy if inventory looks good but they could be more profitable.\n\
         Do not just state the facts, give a strategic recommendation.\n\
         \n\
         Current Game State:\n\
         - Cash: ${:.2}\n\
         - Max Inventory Per Item: {}\n\
         - Current Inventory:\n\
         {}\n\
         - Upgrades Owned:\n\
         {}\n\
         \n\
         Your concise and friendly advice:",
        request.cash, request.max_inventory, inventory_list, upgrades_list
    )
}

/// The external boundary: snapshot in, recommendation out.
pub trait AdviceProvider {
    /// Produce a short recommendation for the given snapshot.
    fn generate(&self, request: &AdviceRequest) -> Result<String, AdviceError>;
}

/// Ask a provider for advice; on any failure return [`FALLBACK_ADVICE`].
/// This call always resolves and never propagates an error.
pub fn business_advice(provider: &dyn AdviceProvider, request: &AdviceRequest) -> String {
    match provider.generate(request) {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!(error = %err, "advice provider failed, serving fallback");
            FALLBACK_ADVICE.to_string()
        }
    }
}

/// Offline default provider: restock empty shelves first, then affordable
/// upgrades, then a generic strategy line.
pub struct RuleBasedAdvisor;

impl AdviceProvider for RuleBasedAdvisor {
    fn generate(&self, request: &AdviceRequest) -> Result<String, AdviceError> {
        if let Some(line) = request.inventory.iter().find(|l| l.on_hand == 0) {
            return Ok(format!(
                "{} are completely out of stock, and every empty shelf is a missed sale. \
                 Restock them before the next customer walks in.",
                line.name
            ));
        }
        let affordable = request
            .upgrades
            .iter()
            .filter(|u| u.next_cost <= request.cash)
            .min_by(|a, b| a.next_cost.cmp(&b.next_cost));
        if let Some(upgrade) = affordable {
            return Ok(format!(
                "You have ${:.2} sitting idle, enough for the next {} level at ${}. \
                 Buying it now pays for itself over the rest of the run.",
                request.cash, upgrade.name, upgrade.next_cost
            ));
        }
        let thinnest = request.inventory.iter().min_by_key(|l| l.on_hand);
        match thinnest {
            Some(line) => Ok(format!(
                "Shelves look healthy, so focus on turnover: keep {} topped up toward {} \
                 units and bank the margin for your next upgrade.",
                line.name, request.max_inventory
            )),
            None => Ok("Keep shelves stocked and reinvest profits into upgrades.".to_string()),
        }
    }
}
