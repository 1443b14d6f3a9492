//! Competitions and the structural constants of their league phases.

use std::ops::Range;

use strum_macros::{Display, EnumIter, EnumString};

/// The three competitions whose league phases are drawn under Swiss-model rules.
/// UCL and UEL share one format; UECL plays a smaller format with paired-pot
/// home/away accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Competition {
    Ucl,
    Uel,
    Uecl,
}

impl Competition {
    pub fn format(&self) -> Format {
        match self {
            Competition::Ucl | Competition::Uel => Format {
                pots: 4,
                teams_per_pot: 9,
                games_per_team: 8,
                games_per_pot_pair: 9,
                paired_pots: false,
            },
            Competition::Uecl => Format {
                pots: 6,
                teams_per_pot: 6,
                games_per_team: 6,
                games_per_pot_pair: 3,
                paired_pots: true,
            },
        }
    }
}

/// Structural constants of a league phase. Pots are 1-based throughout the
/// public API; internal vectors index them from zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format {
    pub pots: usize,
    pub teams_per_pot: usize,
    pub games_per_team: usize,
    /// Fixtures allotted to each directed (home pot, away pot) pair.
    pub games_per_pot_pair: usize,
    /// Whether home/away slots are accounted per paired-pot unit (1-2, 3-4,
    /// 5-6) rather than per pot.
    pub paired_pots: bool,
}

impl Format {
    pub fn num_teams(&self) -> usize {
        self.pots * self.teams_per_pot
    }

    pub fn total_games(&self) -> usize {
        self.num_teams() * self.games_per_team / 2
    }

    pub fn home_games_per_team(&self) -> usize {
        self.games_per_team / 2
    }

    pub fn opponents_per_pot(&self) -> usize {
        self.games_per_team / self.pots
    }

    /// Pot of a team, derived from its position in the pot-ordered roster.
    pub fn pot_of(&self, team: usize) -> usize {
        1 + team / self.teams_per_pot
    }

    /// Team indices seeded into `pot`.
    pub fn pot_teams(&self, pot: usize) -> Range<usize> {
        let start = (pot - 1) * self.teams_per_pot;
        start..start + self.teams_per_pot
    }

    /// The pot with which `pot` forms a home/away accounting unit.
    pub fn paired_pot(&self, pot: usize) -> usize {
        if pot % 2 == 0 {
            pot - 1
        } else {
            pot + 1
        }
    }

    /// Number of home/away accounting buckets: one per pot under base rules,
    /// one per paired-pot unit under UECL rules.
    pub fn buckets(&self) -> usize {
        if self.paired_pots {
            self.pots / 2
        } else {
            self.pots
        }
    }

    /// Zero-based accounting bucket of a 1-based pot.
    pub fn bucket_of_pot(&self, pot: usize) -> usize {
        if self.paired_pots {
            (pot - 1) / 2
        } else {
            pot - 1
        }
    }

    /// Team indices covered by an accounting bucket. Paired pots are adjacent,
    /// so a bucket is always a contiguous index range.
    pub fn bucket_teams(&self, bucket: usize) -> Range<usize> {
        if self.paired_pots {
            let start = bucket * 2 * self.teams_per_pot;
            start..start + 2 * self.teams_per_pot
        } else {
            self.pot_teams(bucket + 1)
        }
    }
}
