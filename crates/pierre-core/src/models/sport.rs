// ABOUTME: Sport type enumeration for synced fitness activities
// ABOUTME: Provider string parsing and sport classification (ride, run, swim, paced)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumeration of supported sport/activity types
///
/// Connectors map their source-native sport labels onto this enum. The
/// `Other` variant keeps labels that have no canonical counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Running activity
    Run,
    /// Cycling/biking activity
    Ride,
    /// Swimming activity
    Swim,
    /// Walking activity
    Walk,
    /// Hiking activity
    Hike,

    // Virtual/Indoor activities
    /// Indoor/trainer cycling activity
    VirtualRide,
    /// Treadmill running activity
    VirtualRun,
    /// Generic workout/exercise activity
    Workout,

    // E-bike and specialty cycling
    /// Electric bike ride
    EbikeRide,
    /// Mountain biking activity
    MountainBike,
    /// Gravel cycling activity
    GravelRide,

    // Winter sports
    /// Cross-country skiing
    CrossCountrySkiing,
    /// Alpine/downhill skiing
    AlpineSkiing,
    /// Snowshoeing activity
    Snowshoe,

    // Water sports
    /// Kayaking activity
    Kayaking,
    /// Rowing activity
    Rowing,
    /// Stand-up paddleboarding
    Paddleboarding,

    /// Weight/strength training
    StrengthTraining,
    /// Trail running
    TrailRunning,

    /// Other activity type not covered by standard categories
    Other(String),
}

impl SportType {
    /// Create `SportType` from a provider or file sport label
    ///
    /// Matching is case-insensitive on the common provider spellings
    /// (`"Ride"`, `"cycling"`, `"running"`, `"lap_swimming"`, ...).
    #[must_use]
    pub fn from_provider_string(provider_sport: &str) -> Self {
        match provider_sport.trim().to_lowercase().as_str() {
            "run" | "running" => Self::Run,
            "ride" | "cycling" | "biking" | "road_biking" => Self::Ride,
            "swim" | "swimming" | "lap_swimming" | "open_water_swimming" => Self::Swim,
            "walk" | "walking" => Self::Walk,
            "hike" | "hiking" => Self::Hike,
            "virtualride" | "virtual_ride" | "indoor_cycling" => Self::VirtualRide,
            "virtualrun" | "virtual_run" | "treadmill_running" => Self::VirtualRun,
            "workout" | "training" => Self::Workout,
            "ebikeride" | "ebike_ride" | "e_biking" => Self::EbikeRide,
            "mountainbikeride" | "mountain_biking" => Self::MountainBike,
            "gravelride" | "gravel_cycling" => Self::GravelRide,
            "crosscountryskiing" | "nordicski" | "cross_country_skiing" => {
                Self::CrossCountrySkiing
            }
            "alpineskiing" | "alpineski" | "resort_skiing" => Self::AlpineSkiing,
            "snowshoe" | "snowshoeing" => Self::Snowshoe,
            "kayaking" => Self::Kayaking,
            "rowing" | "indoor_rowing" => Self::Rowing,
            "standuppaddling" | "stand_up_paddleboarding" => Self::Paddleboarding,
            "weighttraining" | "strength_training" => Self::StrengthTraining,
            "trailrun" | "trail_running" => Self::TrailRunning,
            _ => Self::Other(provider_sport.to_owned()),
        }
    }

    /// Tell whether this sport is a bike ride
    ///
    /// Electric rides only count when `allow_electric` is set.
    #[must_use]
    pub const fn is_ride(&self, allow_electric: bool) -> bool {
        match self {
            Self::Ride | Self::VirtualRide | Self::MountainBike | Self::GravelRide => true,
            Self::EbikeRide => allow_electric,
            _ => false,
        }
    }

    /// Tell whether this sport is a run
    #[must_use]
    pub const fn is_run(&self) -> bool {
        matches!(self, Self::Run | Self::VirtualRun | Self::TrailRunning)
    }

    /// Tell whether this sport is a walk or a hike
    #[must_use]
    pub const fn is_walk_hike(&self) -> bool {
        matches!(self, Self::Walk | Self::Hike)
    }

    /// Tell whether this sport is performed on foot
    #[must_use]
    pub const fn is_by_foot(&self) -> bool {
        self.is_run() || self.is_walk_hike()
    }

    /// Tell whether this sport is classified as swimming
    #[must_use]
    pub const fn is_swim(&self) -> bool {
        matches!(self, Self::Swim)
    }

    /// Tell whether speed for this sport is best expressed as a pace
    #[must_use]
    pub const fn is_paced(&self) -> bool {
        self.is_by_foot() || self.is_swim()
    }

    /// Get the human-readable name for this sport type
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Ride => "bike ride",
            Self::Swim => "swim",
            Self::Walk => "walk",
            Self::Hike => "hike",
            Self::VirtualRide => "indoor bike ride",
            Self::VirtualRun => "treadmill run",
            Self::Workout => "workout",
            Self::EbikeRide => "e-bike ride",
            Self::MountainBike => "mountain bike ride",
            Self::GravelRide => "gravel ride",
            Self::CrossCountrySkiing => "cross-country ski",
            Self::AlpineSkiing => "alpine ski",
            Self::Snowshoe => "snowshoe hike",
            Self::Kayaking => "kayak session",
            Self::Rowing => "rowing session",
            Self::Paddleboarding => "paddleboard session",
            Self::StrengthTraining => "strength training",
            Self::TrailRunning => "trail run",
            Self::Other(_) => "activity",
        }
    }

    /// Stable label used when hashing or reporting the sport
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::Other(name) => format!("other:{name}"),
            known => serde_json::to_value(known)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_else(|| known.display_name().to_owned()),
        }
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_strings_are_case_insensitive() {
        assert_eq!(SportType::from_provider_string("Ride"), SportType::Ride);
        assert_eq!(SportType::from_provider_string("cycling"), SportType::Ride);
        assert_eq!(SportType::from_provider_string("LAP_SWIMMING"), SportType::Swim);
        assert_eq!(
            SportType::from_provider_string("Curling"),
            SportType::Other("Curling".to_owned())
        );
    }

    #[test]
    fn test_classification() {
        assert!(SportType::VirtualRide.is_ride(false));
        assert!(!SportType::EbikeRide.is_ride(false));
        assert!(SportType::EbikeRide.is_ride(true));
        assert!(SportType::Hike.is_by_foot());
        assert!(SportType::Swim.is_paced());
        assert!(!SportType::Rowing.is_paced());
    }

    #[test]
    fn test_as_key() {
        assert_eq!(SportType::VirtualRun.as_key(), "virtual_run");
        assert_eq!(SportType::Other("Polo".into()).as_key(), "other:Polo");
    }
}
