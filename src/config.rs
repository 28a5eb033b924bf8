//! Configuration utilities (port, phase pacing, test hooks) read from env vars.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::game::DeckProvider;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Delays between the timed phase steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Between dealing rounds.
    pub deal_interval: Duration,
    /// After the last round before the countdown starts.
    pub deal_complete_delay: Duration,
    /// One countdown tick.
    pub countdown_interval: Duration,
    /// Between revealing the first card and opening play.
    pub reveal_delay: Duration,
    /// How long the result screen stays up before the room is back to waiting.
    pub result_delay: Duration,
    /// How long a dobon target has to answer with a return.
    pub dobon_return_window: Duration,
    /// How long a room with nobody connected stays open.
    pub empty_room_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            deal_interval: Duration::from_millis(300),
            deal_complete_delay: Duration::from_millis(500),
            countdown_interval: Duration::from_millis(1000),
            reveal_delay: Duration::from_millis(1000),
            result_delay: Duration::from_millis(5000),
            dobon_return_window: Duration::from_millis(3000),
            empty_room_timeout: Duration::from_secs(60),
        }
    }
}

impl Timing {
    /// Every delay multiplied by `factor`, never below one millisecond.
    pub fn scaled(factor: f64) -> Self {
        let scale = |d: Duration| {
            let millis = (d.as_millis() as f64 * factor.max(0.0)).round() as u64;
            Duration::from_millis(millis.max(1))
        };
        let base = Timing::default();
        Timing {
            deal_interval: scale(base.deal_interval),
            deal_complete_delay: scale(base.deal_complete_delay),
            countdown_interval: scale(base.countdown_interval),
            reveal_delay: scale(base.reveal_delay),
            result_delay: scale(base.result_delay),
            dobon_return_window: scale(base.dobon_return_window),
            empty_room_timeout: scale(base.empty_room_timeout),
        }
    }
}

/// Reads `TIMING_SCALE` (e.g. `0.01` to speed a local table up).
pub fn timing() -> Timing {
    env::var("TIMING_SCALE")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(Timing::scaled)
        .unwrap_or_default()
}

/// Per-room settings handed to every new room.
#[derive(Debug, Clone, Default)]
pub struct RoomOptions {
    pub timing: Timing,
    /// Accept the `__setDeck` intent.
    pub test_hooks: bool,
    pub deck: DeckProvider,
}

pub fn room_options() -> RoomOptions {
    let test_hooks = env::var("DOBON_TEST_HOOKS")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    RoomOptions { timing: timing(), test_hooks, deck: DeckProvider::default() }
}
