//! Match statistics

use serde::{Deserialize, Serialize};

use super::state::Side;

/// Running tallies for one match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Strikes per side
    pub hits: [u32; 2],
    /// Strikes in the rally currently in play
    pub current_rally: u32,
    pub longest_rally: u32,
    /// Points played to completion
    pub rallies: u32,
    pub power_ups_collected: [u32; 2],
    pub auto_serves: u32,
    /// Simulation time played, pauses excluded
    pub elapsed_ms: f64,
}

impl MatchStats {
    pub fn record_hit(&mut self, side: Side) {
        self.hits[side.index()] += 1;
        self.current_rally += 1;
        self.longest_rally = self.longest_rally.max(self.current_rally);
    }

    /// Close the rally in play when a point is scored
    ///
    /// A point nobody touched (an unreturned auto serve) is not a rally.
    pub fn end_rally(&mut self) {
        if self.current_rally > 0 {
            self.rallies += 1;
        }
        self.current_rally = 0;
    }

    pub fn record_collection(&mut self, side: Side) {
        self.power_ups_collected[side.index()] += 1;
    }

    pub fn total_hits(&self) -> u32 {
        self.hits.iter().sum()
    }
}
