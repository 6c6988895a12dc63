//! Closed position vocabulary and the roster buckets draft need is measured in.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// On-field position as listed in a prospect catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Fb,
    Wr,
    Te,
    Ot,
    Og,
    C,
    Edge,
    Dt,
    Lb,
    Cb,
    S,
    K,
    P,
    Ls,
}

/// Roster bucket a position counts toward when computing need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionBucket {
    Quarterback,
    RunningBack,
    Receiver,
    TightEnd,
    Tackle,
    InteriorLine,
    EdgeRusher,
    InteriorDefense,
    Linebacker,
    Corner,
    Safety,
    Specialist,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized position label '{0}'")]
pub struct UnknownPosition(pub String);

impl Position {
    pub const ALL: [Self; 16] = [
        Self::Qb,
        Self::Rb,
        Self::Fb,
        Self::Wr,
        Self::Te,
        Self::Ot,
        Self::Og,
        Self::C,
        Self::Edge,
        Self::Dt,
        Self::Lb,
        Self::Cb,
        Self::S,
        Self::K,
        Self::P,
        Self::Ls,
    ];

    #[must_use]
    pub const fn bucket(self) -> PositionBucket {
        match self {
            Self::Qb => PositionBucket::Quarterback,
            Self::Rb | Self::Fb => PositionBucket::RunningBack,
            Self::Wr => PositionBucket::Receiver,
            Self::Te => PositionBucket::TightEnd,
            Self::Ot => PositionBucket::Tackle,
            Self::Og | Self::C => PositionBucket::InteriorLine,
            Self::Edge => PositionBucket::EdgeRusher,
            Self::Dt => PositionBucket::InteriorDefense,
            Self::Lb => PositionBucket::Linebacker,
            Self::Cb => PositionBucket::Corner,
            Self::S => PositionBucket::Safety,
            Self::K | Self::P | Self::Ls => PositionBucket::Specialist,
        }
    }

    /// Initial belief band width before clamping. Quarterbacks and linemen
    /// are the hardest to project from film.
    #[must_use]
    pub const fn base_band_width(self) -> f32 {
        match self {
            Self::Qb => 20.0,
            Self::Ot | Self::Og | Self::C => 18.0,
            Self::Edge | Self::Dt => 16.0,
            Self::Rb | Self::Fb | Self::Wr | Self::Te | Self::Lb | Self::Cb | Self::S => 14.0,
            Self::K | Self::P | Self::Ls => 10.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Qb => "QB",
            Self::Rb => "RB",
            Self::Fb => "FB",
            Self::Wr => "WR",
            Self::Te => "TE",
            Self::Ot => "OT",
            Self::Og => "OG",
            Self::C => "C",
            Self::Edge => "EDGE",
            Self::Dt => "DT",
            Self::Lb => "LB",
            Self::Cb => "CB",
            Self::S => "S",
            Self::K => "K",
            Self::P => "P",
            Self::Ls => "LS",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = UnknownPosition;

    /// Accepts catalog spellings case-insensitively, including the common
    /// aliases (`HB`, `T`, `G`, `IOL`, `DE`, `OLB`, `DL`, ...).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let label = raw.trim().to_ascii_uppercase();
        let position = match label.as_str() {
            "QB" => Self::Qb,
            "RB" | "HB" => Self::Rb,
            "FB" => Self::Fb,
            "WR" => Self::Wr,
            "TE" => Self::Te,
            "OT" | "T" | "LT" | "RT" => Self::Ot,
            "OG" | "G" | "LG" | "RG" | "IOL" | "OL" => Self::Og,
            "C" | "OC" => Self::C,
            "EDGE" | "DE" | "OLB" => Self::Edge,
            "DT" | "DL" | "NT" | "IDL" => Self::Dt,
            "LB" | "ILB" | "MLB" => Self::Lb,
            "CB" | "DB" => Self::Cb,
            "S" | "FS" | "SS" => Self::S,
            "K" | "PK" => Self::K,
            "P" => Self::P,
            "LS" => Self::Ls,
            _ => return Err(UnknownPosition(raw.to_string())),
        };
        Ok(position)
    }
}

impl PositionBucket {
    pub const ALL: [Self; 12] = [
        Self::Quarterback,
        Self::RunningBack,
        Self::Receiver,
        Self::TightEnd,
        Self::Tackle,
        Self::InteriorLine,
        Self::EdgeRusher,
        Self::InteriorDefense,
        Self::Linebacker,
        Self::Corner,
        Self::Safety,
        Self::Specialist,
    ];

    /// Starters a roster is expected to carry in this bucket.
    #[must_use]
    pub const fn min_starters(self) -> u16 {
        match self {
            Self::Quarterback | Self::RunningBack | Self::TightEnd | Self::Specialist => 2,
            Self::Tackle
            | Self::EdgeRusher
            | Self::InteriorDefense
            | Self::Linebacker
            | Self::Safety => 3,
            Self::Receiver | Self::InteriorLine | Self::Corner => 4,
        }
    }

    #[must_use]
    pub const fn is_trench(self) -> bool {
        matches!(
            self,
            Self::Tackle | Self::InteriorLine | Self::EdgeRusher | Self::InteriorDefense
        )
    }

    #[must_use]
    pub const fn is_defense(self) -> bool {
        matches!(
            self,
            Self::EdgeRusher
                | Self::InteriorDefense
                | Self::Linebacker
                | Self::Corner
                | Self::Safety
        )
    }
}
