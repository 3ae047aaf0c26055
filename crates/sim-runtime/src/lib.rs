#![deny(warnings)]

//! Simulation session and clock for Mart Tycoon.
//!
//! The [`Session`] owns the authoritative [`GameState`] and routes every
//! mutation through the pure reducer, re-running the goal-completion and
//! bankruptcy checks after each transition. Two drivers sit on top of it:
//! [`fast_forward`] steps a virtual clock deterministically (headless runs,
//! tests, benches), and [`run_clock`] drives the same handlers from real
//! tokio timers. Each handler receives the current instant explicitly, so no
//! timer ever closes over a stale state snapshot.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use sim_ai::{business_advice, AdviceProvider, AdviceRequest};
use sim_core::{apply, Action, Catalog, GameState, ProductId, UpgradeId};
use sim_econ::Goal;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Most-recent-first feed length; older entries are discarded.
pub const LOG_CAP: usize = 20;

/// Cadence of the offer-expiry sweep.
pub const OFFER_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// One timestamped line in the customer feed.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Instant the entry was produced.
    pub at: DateTime<Utc>,
    /// Player-facing text.
    pub message: String,
}

/// Capped most-recent-first feed of customer/session events. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
}

impl LogFeed {
    fn push(&mut self, at: DateTime<Utc>, message: String) {
        self.entries.push_front(LogEntry { at, message });
        self.entries.truncate(LOG_CAP);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Newest entry, if any.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Number of retained entries (at most [`LOG_CAP`]).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Session parameters fixed at creation.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Seed for the customer-choice RNG.
    pub rng_seed: u64,
    /// Cash the session (and any restart) begins with.
    pub starting_cash: Decimal,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            rng_seed: 42,
            starting_cash: sim_econ::initial_cash(),
        }
    }
}

/// Owns the game state and applies every transition atomically.
///
/// All mutation flows through `&mut self` on a single task; the four
/// periodic behaviors may fire in any relative order but each
/// dispatch-and-apply is a single step.
pub struct Session {
    catalog: Catalog,
    goals: Vec<Goal>,
    state: GameState,
    rng: ChaCha8Rng,
    logs: LogFeed,
    starting_cash: Decimal,
}

impl Session {
    /// Session over the default catalog and goal list.
    pub fn new(config: SessionConfig) -> Self {
        Session::with_catalog(sim_econ::default_catalog(), sim_econ::goals(), config)
    }

    /// Session over a custom catalog and goal list.
    pub fn with_catalog(catalog: Catalog, goals: Vec<Goal>, config: SessionConfig) -> Self {
        Session {
            catalog,
            goals,
            state: GameState::initial(config.starting_cash),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            logs: LogFeed::default(),
            starting_cash: config.starting_cash,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The product table this session runs over.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The customer feed.
    pub fn logs(&self) -> &LogFeed {
        &self.logs
    }

    /// Per-product shelf capacity at the current storage level.
    pub fn max_inventory(&self) -> u32 {
        sim_econ::storage_capacity(self.state.upgrade_level(UpgradeId::Storage))
    }

    /// Arrival interval at the current marketing level.
    pub fn customer_interval(&self) -> Duration {
        sim_econ::customer_interval(self.state.upgrade_level(UpgradeId::Marketing))
    }

    /// The goal currently being chased, if any remain.
    pub fn current_goal(&self) -> Option<&Goal> {
        self.goals.get(self.state.current_goal_index)
    }

    /// Number of goals completed so far.
    pub fn goals_completed(&self) -> usize {
        self.state.current_goal_index.min(self.goals.len())
    }

    /// Total number of goals in the progression.
    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    /// Apply one action, then re-run the goal and bankruptcy checks.
    ///
    /// A finished session ignores everything except [`Session::restart`].
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) {
        if self.state.is_game_over {
            return;
        }
        self.state = apply(&self.catalog, &self.state, &action);
        self.check_goals(now);
        self.check_bankruptcy(now);
    }

    /// One customer walks in: pick a product uniformly at random from the
    /// whole catalog and buy one unit if it is on the shelf.
    pub fn customer_arrival(&mut self, now: DateTime<Utc>) {
        if self.state.is_game_over || self.catalog.products.is_empty() {
            return;
        }
        let idx = self.rng.gen_range(0..self.catalog.products.len());
        let product = self.catalog.products[idx].clone();
        if self.state.stock_of(&product.id) == 0 {
            debug!(product = %product.id.0, "customer left empty-handed");
            self.logs.push(
                now,
                format!("A customer wanted {}, but it was out of stock! 😩", product.name),
            );
            return;
        }
        let on_offer = self.state.special_offer.product_id.as_ref() == Some(&product.id);
        let sale_price = if on_offer {
            sim_econ::offer_price(product.price)
        } else {
            product.price
        };
        debug!(product = %product.id.0, price = %sale_price, on_offer, "sale");
        if on_offer {
            self.logs.push(
                now,
                format!("A customer bought {} on SALE for ${:.2}! 🤑", product.name, sale_price),
            );
        } else {
            self.logs.push(
                now,
                format!(
                    "A customer bought {} for ${:.2}! {}",
                    product.name, sale_price, product.icon
                ),
            );
        }
        self.dispatch(
            Action::Sell {
                product_id: product.id,
                sale_price,
            },
            now,
        );
    }

    /// End the running offer once its expiry instant is in the past.
    pub fn expire_offer_if_due(&mut self, now: DateTime<Utc>) {
        let Some(expires_at) = self.state.special_offer.expires_at else {
            return;
        };
        if now <= expires_at {
            return;
        }
        let name = self
            .state
            .special_offer
            .product_id
            .as_ref()
            .and_then(|id| self.catalog.product(id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "the item".to_string());
        self.dispatch(Action::EndSpecialOffer, now);
        self.logs
            .push(now, format!("The special offer on {name} has ended."));
    }

    /// Restock from the wholesaler. The quantity is clamped to the remaining
    /// shelf capacity before the cost is computed; the reducer itself does
    /// not cap.
    pub fn buy_stock(&mut self, product_id: &ProductId, quantity: u32, now: DateTime<Utc>) {
        let Some(product) = self.catalog.product(product_id).cloned() else {
            return;
        };
        let room = self.max_inventory().saturating_sub(self.state.stock_of(product_id));
        let quantity = quantity.min(room);
        if quantity == 0 {
            return;
        }
        let cost = product.cost * Decimal::from(quantity);
        if self.state.cash < cost {
            self.logs.push(now, "Not enough cash to buy stock!".to_string());
            return;
        }
        self.dispatch(
            Action::BuyStock {
                product_id: product_id.clone(),
                quantity,
                cost,
            },
            now,
        );
    }

    /// Buy the next level of an upgrade track at the curve price.
    pub fn buy_upgrade(&mut self, upgrade_id: UpgradeId, now: DateTime<Utc>) {
        let level = self.state.upgrade_level(upgrade_id);
        let cost = sim_econ::upgrade_cost(upgrade_id, level);
        if self.state.cash < cost {
            self.logs
                .push(now, "Not enough cash for this upgrade!".to_string());
            return;
        }
        self.dispatch(Action::BuyUpgrade { upgrade_id, cost }, now);
    }

    /// Launch a special offer on a product. Refused while an offer is
    /// already running or the cooldown from the previous one has not lapsed.
    pub fn start_promotion(&mut self, product_id: &ProductId, now: DateTime<Utc>) {
        if self.state.is_game_over || self.state.special_offer.is_active() {
            return;
        }
        if let Some(until) = self.state.offer_cooldown_until {
            if now < until {
                return;
            }
        }
        let Some(product) = self.catalog.product(product_id).cloned() else {
            return;
        };
        let cost = sim_econ::special_offer_cost();
        if self.state.cash < cost {
            return;
        }
        let expires_at = now + to_chrono(sim_econ::SPECIAL_OFFER_DURATION);
        let cooldown_until = expires_at + to_chrono(sim_econ::SPECIAL_OFFER_COOLDOWN);
        self.dispatch(
            Action::StartSpecialOffer {
                product_id: product_id.clone(),
                cost,
                expires_at,
                cooldown_until,
            },
            now,
        );
        self.logs
            .push(now, format!("Special offer started for {}!", product.name));
    }

    /// Throw the state away and begin a fresh run with the original seed
    /// money. The only operation a finished session still accepts.
    pub fn restart(&mut self) {
        self.state = GameState::initial(self.starting_cash);
        self.logs.clear();
        info!("session restarted");
    }

    fn check_goals(&mut self, now: DateTime<Utc>) {
        loop {
            let Some(goal) = self.goals.get(self.state.current_goal_index).cloned() else {
                break;
            };
            if !goal.is_completed(&self.state) {
                break;
            }
            self.state = apply(
                &self.catalog,
                &self.state,
                &Action::CompleteGoal { reward: goal.reward },
            );
            info!(goal = %goal.description, "goal completed");
            self.logs.push(
                now,
                format!("🏆 Goal Achieved: {}! Reward: ${}", goal.description, goal.reward),
            );
        }
    }

    fn check_bankruptcy(&mut self, now: DateTime<Utc>) {
        if self.state.is_game_over {
            return;
        }
        let broke = self.state.cash <= Decimal::ZERO;
        let can_restock = self
            .catalog
            .products
            .iter()
            .any(|p| p.cost <= self.state.cash);
        if broke && !self.state.has_any_stock() && !can_restock {
            self.state = apply(&self.catalog, &self.state, &Action::SetGameOver);
            info!("bankrupt: no cash, no stock, no affordable restock");
            self.logs
                .push(now, "The store is bankrupt. Game over. 💸".to_string());
        }
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}

/// Step a session through `horizon` of virtual time, firing the arrival and
/// offer-expiry handlers in timestamp order. `on_arrival` runs once at the
/// start and again after every customer, and is where a scripted player
/// restocks or buys upgrades. Returns the number of customer arrivals.
pub fn fast_forward<F>(
    session: &mut Session,
    start: DateTime<Utc>,
    horizon: Duration,
    mut on_arrival: F,
) -> u64
where
    F: FnMut(&mut Session, DateTime<Utc>),
{
    let end = start + to_chrono(horizon);
    on_arrival(session, start);
    let mut arrivals = 0u64;
    let mut next_sweep = start + to_chrono(OFFER_SWEEP_INTERVAL);
    let mut next_arrival = start + to_chrono(session.customer_interval());
    while !session.state().is_game_over {
        let now = next_arrival.min(next_sweep);
        if now > end {
            break;
        }
        if now == next_sweep {
            session.expire_offer_if_due(now);
            next_sweep = now + to_chrono(OFFER_SWEEP_INTERVAL);
        }
        if now == next_arrival {
            session.customer_arrival(now);
            arrivals += 1;
            on_arrival(session, now);
            next_arrival = now + to_chrono(session.customer_interval());
        }
    }
    arrivals
}

/// Drive a session from real timers until game over or `run_for` elapses.
///
/// Customer arrivals fire at the marketing-derived interval (re-armed when
/// the level changes) and the offer sweep at a fixed one-second cadence,
/// both scaled by `time_scale` (0.5 runs twice as fast). Dropping the
/// returned future cancels both timers; nothing dispatches after teardown.
pub async fn run_clock(session: &mut Session, time_scale: f64, run_for: Option<Duration>) {
    let scale = if time_scale.is_finite() && time_scale > 0.0 {
        time_scale
    } else {
        1.0
    };
    let scaled = |d: Duration| d.mul_f64(scale).max(Duration::from_millis(1));
    let deadline = run_for.map(|d| tokio::time::Instant::now() + d);
    let mut current = session.customer_interval();
    let mut arrivals = tokio::time::interval_at(
        tokio::time::Instant::now() + scaled(current),
        scaled(current),
    );
    let mut sweeps = tokio::time::interval_at(
        tokio::time::Instant::now() + scaled(OFFER_SWEEP_INTERVAL),
        scaled(OFFER_SWEEP_INTERVAL),
    );
    while !session.state().is_game_over {
        tokio::select! {
            _ = arrivals.tick() => {
                session.customer_arrival(Utc::now());
                let want = session.customer_interval();
                if want != current {
                    current = want;
                    arrivals = tokio::time::interval_at(
                        tokio::time::Instant::now() + scaled(want),
                        scaled(want),
                    );
                }
            }
            _ = sweeps.tick() => {
                session.expire_offer_if_due(Utc::now());
            }
            _ = wait_until(deadline) => break,
        }
    }
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Fetch advice off the clock task. The returned handle always resolves to
/// a displayable string; provider failures already collapsed to the
/// fallback inside. Must be called from within a tokio runtime.
pub fn spawn_advice(
    provider: Arc<dyn AdviceProvider + Send + Sync>,
    request: AdviceRequest,
) -> tokio::task::JoinHandle<String> {
    tokio::task::spawn_blocking(move || business_advice(provider.as_ref(), &request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sim_core::Product;
    use sim_econ::{GoalMetric, GoalUnit};

    fn pid(s: &str) -> ProductId {
        ProductId(s.to_string())
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn one_product_catalog(cost: i64, price: i64) -> Catalog {
        Catalog {
            products: vec![Product {
                id: pid("apple"),
                name: "Apples".to_string(),
                icon: "🍎".to_string(),
                cost: Decimal::new(cost, 0),
                price: Decimal::new(price, 0),
            }],
        }
    }

    fn cash_goal(target: i64, reward: i64) -> Goal {
        Goal {
            description: format!("Reach ${target}"),
            reward: Decimal::new(reward, 0),
            target: Decimal::new(target, 0),
            metric: GoalMetric::CashOnHand,
            unit: GoalUnit::Money,
        }
    }

    fn session_with(catalog: Catalog, goals: Vec<Goal>, cash: i64) -> Session {
        Session::with_catalog(
            catalog,
            goals,
            SessionConfig {
                rng_seed: 7,
                starting_cash: Decimal::new(cash, 0),
            },
        )
    }

    #[test]
    fn arrival_sells_when_stocked() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        s.buy_stock(&pid("apple"), 10, t);
        assert_eq!(s.state().stock_of(&pid("apple")), 10);
        s.customer_arrival(t);
        assert_eq!(s.state().stats.total_items_sold, 1);
        assert_eq!(s.state().stock_of(&pid("apple")), 9);
        assert_eq!(s.state().cash, Decimal::new(492, 0));
        assert!(s.logs().latest().unwrap().message.contains("A customer bought Apples"));
    }

    #[test]
    fn arrival_miss_logs_without_mutation() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let before = s.state().clone();
        s.customer_arrival(epoch());
        assert_eq!(s.state(), &before);
        assert!(s.logs().latest().unwrap().message.contains("out of stock"));
    }

    #[test]
    fn offer_applies_price_multiplier() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        s.buy_stock(&pid("apple"), 10, t);
        s.start_promotion(&pid("apple"), t);
        assert!(s.state().special_offer.is_active());
        s.customer_arrival(t + chrono::Duration::seconds(5));
        assert_eq!(s.state().stats.total_cash_earned, Decimal::new(3, 0));
        let sale_log = s.logs().latest().unwrap();
        assert!(sale_log.message.contains("on SALE for $3.00"));
    }

    #[test]
    fn offer_expires_after_deadline_only() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        s.start_promotion(&pid("apple"), t);
        let cooldown = s.state().offer_cooldown_until;
        assert_eq!(
            cooldown,
            Some(t + chrono::Duration::seconds(90)),
        );

        s.expire_offer_if_due(t + chrono::Duration::seconds(30));
        assert!(s.state().special_offer.is_active());

        s.expire_offer_if_due(t + chrono::Duration::seconds(31));
        assert!(!s.state().special_offer.is_active());
        assert_eq!(s.state().special_offer.expires_at, None);
        assert_eq!(s.state().offer_cooldown_until, cooldown);
        assert!(s.logs().latest().unwrap().message.contains("has ended"));
    }

    #[test]
    fn promotion_respects_cooldown() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 1000);
        let t = epoch();
        s.start_promotion(&pid("apple"), t);
        s.expire_offer_if_due(t + chrono::Duration::seconds(31));

        s.start_promotion(&pid("apple"), t + chrono::Duration::seconds(60));
        assert!(!s.state().special_offer.is_active());

        s.start_promotion(&pid("apple"), t + chrono::Duration::seconds(91));
        assert!(s.state().special_offer.is_active());
    }

    #[test]
    fn promotion_refused_while_active() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 1000);
        let t = epoch();
        s.start_promotion(&pid("apple"), t);
        let offer = s.state().special_offer.clone();
        s.start_promotion(&pid("apple"), t + chrono::Duration::seconds(5));
        assert_eq!(s.state().special_offer, offer);
        assert_eq!(s.state().cash, Decimal::new(800, 0));
    }

    #[test]
    fn goal_rewards_cascade_in_one_step() {
        let goals = vec![cash_goal(100, 150), cash_goal(200, 50)];
        let mut s = session_with(one_product_catalog(1, 10), goals, 90);
        let t = epoch();
        s.dispatch(
            Action::BuyStock {
                product_id: pid("apple"),
                quantity: 1,
                cost: Decimal::ZERO,
            },
            t,
        );
        s.dispatch(
            Action::Sell {
                product_id: pid("apple"),
                sale_price: Decimal::new(10, 0),
            },
            t,
        );
        // 90 + 10 = 100 completes the first goal; its 150 reward carries
        // cash past the second goal's 200 target in the same step.
        assert_eq!(s.state().current_goal_index, 2);
        assert_eq!(s.state().cash, Decimal::new(300, 0));
        assert!(s.logs().iter().any(|e| e.message.contains("Reach $100")));
        assert!(s.logs().iter().any(|e| e.message.contains("Reach $200")));
    }

    #[test]
    fn exhausted_goal_list_stops_advancing() {
        let goals = vec![cash_goal(100, 0)];
        let mut s = session_with(one_product_catalog(1, 2), goals, 500);
        let t = epoch();
        s.dispatch(Action::EndSpecialOffer, t);
        assert_eq!(s.state().current_goal_index, 1);
        s.dispatch(Action::EndSpecialOffer, t);
        assert_eq!(s.state().current_goal_index, 1);
    }

    #[test]
    fn bankruptcy_requires_all_three_conditions() {
        let t = epoch();

        // Broke, empty shelves, cheapest product unaffordable: game over.
        let mut s = session_with(one_product_catalog(1, 2), vec![], 0);
        s.dispatch(Action::EndSpecialOffer, t);
        assert!(s.state().is_game_over);

        // Stock on the shelf keeps the store alive.
        let mut s = session_with(one_product_catalog(1, 2), vec![], 10);
        s.buy_stock(&pid("apple"), 10, t);
        assert_eq!(s.state().cash, Decimal::ZERO);
        s.dispatch(Action::EndSpecialOffer, t);
        assert!(!s.state().is_game_over);

        // An affordable restock keeps the store alive.
        let mut s = session_with(one_product_catalog(0, 2), vec![], 0);
        s.dispatch(Action::EndSpecialOffer, t);
        assert!(!s.state().is_game_over);

        // Positive cash keeps the store alive regardless.
        let mut s = session_with(one_product_catalog(5, 2), vec![], 1);
        s.dispatch(Action::EndSpecialOffer, t);
        assert!(!s.state().is_game_over);
    }

    #[test]
    fn finished_session_ignores_dispatch_until_restart() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 0);
        let t = epoch();
        s.dispatch(Action::EndSpecialOffer, t);
        assert!(s.state().is_game_over);

        s.dispatch(
            Action::BuyStock {
                product_id: pid("apple"),
                quantity: 5,
                cost: Decimal::ZERO,
            },
            t,
        );
        assert_eq!(s.state().stock_of(&pid("apple")), 0);
        s.customer_arrival(t);
        assert!(s.state().stats.total_items_sold == 0);

        s.restart();
        assert!(!s.state().is_game_over);
        assert_eq!(s.state().cash, Decimal::ZERO);
        assert!(s.logs().is_empty());
    }

    #[test]
    fn buy_stock_clamps_to_capacity() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        assert_eq!(s.max_inventory(), 50);
        s.buy_stock(&pid("apple"), 60, t);
        assert_eq!(s.state().stock_of(&pid("apple")), 50);
        assert_eq!(s.state().cash, Decimal::new(450, 0));

        let before = s.state().clone();
        s.buy_stock(&pid("apple"), 1, t);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn buy_stock_without_cash_only_logs() {
        let mut s = session_with(one_product_catalog(12, 20), vec![], 5);
        let before = s.state().clone();
        s.buy_stock(&pid("apple"), 1, epoch());
        assert_eq!(s.state(), &before);
        assert_eq!(
            s.logs().latest().unwrap().message,
            "Not enough cash to buy stock!"
        );
    }

    #[test]
    fn buy_upgrade_uses_curve_and_reshapes_session() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        assert_eq!(s.customer_interval(), Duration::from_millis(5000));
        s.buy_upgrade(UpgradeId::Marketing, t);
        assert_eq!(s.state().cash, Decimal::new(250, 0));
        assert!(s.customer_interval() < Duration::from_millis(5000));

        s.buy_upgrade(UpgradeId::Storage, t);
        assert_eq!(s.state().cash, Decimal::new(150, 0));
        assert_eq!(s.max_inventory(), 65);

        let before = s.state().clone();
        s.buy_upgrade(UpgradeId::Marketing, t);
        assert_eq!(s.state(), &before);
        assert_eq!(
            s.logs().latest().unwrap().message,
            "Not enough cash for this upgrade!"
        );
    }

    #[test]
    fn log_feed_caps_at_twenty_newest_first() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let t = epoch();
        s.buy_stock(&pid("apple"), 50, t);
        for i in 0..30 {
            s.customer_arrival(t + chrono::Duration::seconds(i * 5));
        }
        assert_eq!(s.logs().len(), LOG_CAP);
        let newest = s.logs().latest().unwrap();
        assert_eq!(newest.at, t + chrono::Duration::seconds(29 * 5));
        let times: Vec<_> = s.logs().iter().map(|e| e.at).collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fast_forward_counts_arrivals_deterministically() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let start = epoch();
        let arrivals = fast_forward(&mut s, start, Duration::from_secs(60), |s, now| {
            s.buy_stock(&pid("apple"), 50, now);
        });
        assert_eq!(arrivals, 12);
        assert_eq!(s.state().stats.total_items_sold, 12);
        assert_eq!(
            s.state().stats.total_cash_earned,
            Decimal::new(24, 0)
        );
    }

    #[test]
    fn fast_forward_expires_offer_mid_run() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        let start = epoch();
        let mut launched = false;
        let _ = fast_forward(&mut s, start, Duration::from_secs(45), |s, now| {
            if !launched {
                s.start_promotion(&pid("apple"), now);
                launched = true;
            }
        });
        assert!(!s.state().special_offer.is_active());
        assert_eq!(
            s.state().offer_cooldown_until,
            Some(start + chrono::Duration::seconds(90)),
        );
        assert!(s.logs().iter().any(|e| e.message.contains("has ended")));
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let run = || {
            let mut s = Session::new(SessionConfig {
                rng_seed: 1234,
                starting_cash: Decimal::new(500, 0),
            });
            let start = epoch();
            let _ = fast_forward(&mut s, start, Duration::from_secs(300), |s, now| {
                for product in s.catalog().products.clone() {
                    s.buy_stock(&product.id, 10, now);
                }
            });
            s.state().clone()
        };
        assert_eq!(run(), run());
    }

    #[tokio::test]
    async fn clock_drives_sales_in_scaled_real_time() {
        let mut s = session_with(one_product_catalog(1, 2), vec![], 500);
        s.buy_stock(&pid("apple"), 50, epoch());
        run_clock(&mut s, 0.001, Some(Duration::from_millis(250))).await;
        assert!(s.state().stats.total_items_sold > 0);
    }
}
