#![deny(warnings)]

//! Headless CLI: run a store session against a scripted player and print KPIs.

use anyhow::Result;
use chrono::Utc;
use sim_ai::{business_advice, AdviceRequest, RuleBasedAdvisor};
use sim_core::validate_catalog;
use sim_runtime::{fast_forward, run_clock, Session, SessionConfig};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    seed: u64,
    seconds: u64,
    restock_below: u32,
    realtime: bool,
    snapshot: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: 42,
        seconds: 600,
        restock_below: 10,
        realtime: false,
        snapshot: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = v;
                }
            }
            "--seconds" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seconds = v;
                }
            }
            "--restock-below" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.restock_below = v;
                }
            }
            "--realtime" => args.realtime = true,
            "--snapshot" => args.snapshot = true,
            _ => {}
        }
    }
    args
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        seed = args.seed,
        seconds = args.seconds,
        realtime = args.realtime,
        git_sha = env!("GIT_SHA"),
        "starting store simulation"
    );

    let catalog = sim_econ::default_catalog();
    validate_catalog(&catalog)?;
    let n_products = catalog.products.len();

    let mut session = Session::new(SessionConfig {
        rng_seed: args.seed,
        starting_cash: sim_econ::initial_cash(),
    });

    if args.realtime {
        run_clock(&mut session, 1.0, Some(Duration::from_secs(args.seconds))).await;
    } else {
        let restock_below = args.restock_below;
        let arrivals = fast_forward(
            &mut session,
            Utc::now(),
            Duration::from_secs(args.seconds),
            move |s, now| {
                // Naive player: top any thin shelf back up to capacity.
                for product in s.catalog().products.clone() {
                    if s.state().stock_of(&product.id) < restock_below {
                        let capacity = s.max_inventory();
                        s.buy_stock(&product.id, capacity, now);
                    }
                }
            },
        );
        info!(arrivals, "fast-forward complete");
    }

    let state = session.state().clone();
    println!(
        "Catalog OK | products: {} | goals: {}/{}",
        n_products,
        session.goals_completed(),
        session.goal_count()
    );
    println!(
        "KPI | cash: ${:.2} | items sold: {} | cash earned: ${:.2} | max inventory: {} | game over: {}",
        state.cash,
        state.stats.total_items_sold,
        state.stats.total_cash_earned,
        session.max_inventory(),
        state.is_game_over
    );
    for entry in session.logs().iter() {
        println!("[{}] {}", entry.at.format("%H:%M:%S"), entry.message);
    }
    if args.snapshot {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    let request = AdviceRequest::from_state(session.catalog(), &state);
    println!("Advisor: {}", business_advice(&RuleBasedAdvisor, &request));

    Ok(())
}
