//! Edge-counting wheel encoder
//!
//! Each wheel has a pulse channel that triggers on rising edges and a sense
//! channel read at the edge to tell the direction. The edge context calls
//! [`EncoderTracker::on_edge`]; the control loop reads through
//! [`WheelEncoder`]. All state sits behind a critical-section mutex, so
//! a tracker can live in a `static` shared by both contexts and every read
//! sees a consistent snapshot.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nextbot_core::config::{EncoderConfig, WheelGeometry};
use nextbot_core::traits::WheelEncoder;
use nextbot_hal::InputPin;

/// Consistent view of one encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderSnapshot {
    /// Signed pulse count since the last reset
    pub pulses: i32,
    /// +1 or -1 from the last edge, 0 before the first one
    pub direction: i8,
    /// Timestamp of the most recent edge
    pub last_edge_us: Option<u64>,
    /// Timestamp of the edge before that
    pub prev_edge_us: Option<u64>,
}

impl EncoderSnapshot {
    const EMPTY: Self = Self {
        pulses: 0,
        direction: 0,
        last_edge_us: None,
        prev_edge_us: None,
    };
}

#[derive(Debug, Clone, Copy)]
struct Scale {
    radians_per_pulse: f32,
    stale_timeout_us: u64,
}

/// Encoder state shared between the edge context and the control loop
pub struct EncoderTracker {
    state: Mutex<CriticalSectionRawMutex, Cell<EncoderSnapshot>>,
    scale: Mutex<CriticalSectionRawMutex, Cell<Scale>>,
}

impl Default for EncoderTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderTracker {
    /// Create a tracker with the default geometry (960 pulses/rev, 100 ms
    /// stale timeout)
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(EncoderSnapshot::EMPTY)),
            scale: Mutex::new(Cell::new(Scale {
                // 2π / 960
                radians_per_pulse: 0.006_544_985,
                stale_timeout_us: 100_000,
            })),
        }
    }

    /// Apply the configured geometry and timeout
    pub fn configure(&self, geometry: &WheelGeometry, encoder: &EncoderConfig) {
        let scale = Scale {
            radians_per_pulse: geometry.radians_per_pulse(),
            stale_timeout_us: encoder.stale_timeout_us,
        };
        self.scale.lock(|s| s.set(scale));
    }

    /// Record one pulse edge
    ///
    /// `forward` is the level of the sense channel at the edge.
    pub fn on_edge(&self, forward: bool, now_us: u64) {
        self.state.lock(|cell| {
            let mut s = cell.get();
            if forward {
                s.pulses = s.pulses.wrapping_add(1);
                s.direction = 1;
            } else {
                s.pulses = s.pulses.wrapping_sub(1);
                s.direction = -1;
            }
            s.prev_edge_us = s.last_edge_us;
            s.last_edge_us = Some(now_us);
            cell.set(s);
        });
    }

    /// Record one pulse edge, reading the direction from `sense`
    pub fn sample_edge<P: InputPin>(&self, sense: &P, now_us: u64) {
        self.on_edge(sense.is_high(), now_us);
    }

    /// Current state
    pub fn snapshot(&self) -> EncoderSnapshot {
        self.state.lock(|cell| cell.get())
    }

    /// Angular velocity in rad/s from the last two edges
    pub fn velocity(&self, now_us: u64) -> f32 {
        let s = self.snapshot();
        let scale = self.scale.lock(|c| c.get());

        let (Some(last), Some(prev)) = (s.last_edge_us, s.prev_edge_us) else {
            return 0.0;
        };
        if now_us.saturating_sub(last) > scale.stale_timeout_us {
            return 0.0;
        }
        let dt_us = last.saturating_sub(prev);
        if dt_us == 0 {
            return 0.0;
        }

        s.direction as f32 * scale.radians_per_pulse / (dt_us as f32 / 1_000_000.0)
    }

    /// Zero the pulse count, keeping edge timing for velocity
    pub fn reset_pulses(&self) {
        self.state.lock(|cell| {
            let mut s = cell.get();
            s.pulses = 0;
            cell.set(s);
        });
    }
}

impl WheelEncoder for &EncoderTracker {
    fn pulses(&self) -> i32 {
        self.snapshot().pulses
    }

    fn angular_velocity(&self, now_us: u64) -> f32 {
        self.velocity(now_us)
    }

    fn reset(&mut self) {
        self.reset_pulses();
    }
}
