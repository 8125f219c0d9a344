//! Grid tick engine
//!
//! Everything here works against the [`ExchangeGateway`](crate::gateway::ExchangeGateway)
//! trait and an in-memory [`Plan`](crate::Plan); loading and saving the plan
//! is left to the caller.

pub mod cancel;
pub mod cap;
pub mod placer;
pub mod plan;
pub mod position_gate;
pub mod reconcile;
pub mod sizing;
pub mod tick;
pub mod window;

pub use cancel::cancel_all;
pub use cap::{detect_cap, parse_max_buy_price, PROBE_PRICE};
pub use placer::{place_buy_window, place_sells, Placement};
pub use plan::generate;
pub use position_gate::{should_release_sells, SellGate};
pub use reconcile::{reconcile, reconcile_with_exchange};
pub use sizing::size;
pub use tick::run_tick;
pub use window::{select_buy_window, BuyWindow};
