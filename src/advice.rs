//! Time-of-day and battery usage advice.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

/// Urgency of the current time-of-day tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One block of the daily usage timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub time: &'static str,
    pub period: &'static str,
    pub solar: &'static str,
    pub recommendation: &'static str,
    pub icon: &'static str,
}

pub const TIMELINE: [TimelineEntry; 5] = [
    TimelineEntry {
        time: "06-10",
        period: "Morning",
        solar: "Rising",
        recommendation: "Charge Battery",
        icon: "🌅",
    },
    TimelineEntry {
        time: "10-14",
        period: "Peak",
        solar: "Max",
        recommendation: "Heavy Loads",
        icon: "☀️",
    },
    TimelineEntry {
        time: "14-18",
        period: "Afternoon",
        solar: "Declining",
        recommendation: "Moderate Usage",
        icon: "🌤️",
    },
    TimelineEntry {
        time: "18-22",
        period: "Evening",
        solar: "None",
        recommendation: "Battery Power",
        icon: "🌙",
    },
    TimelineEntry {
        time: "22-06",
        period: "Night",
        solar: "None",
        recommendation: "Sleep Mode",
        icon: "🌃",
    },
];

/// General tips; three are sampled per request.
pub const TIP_POOL: [&str; 5] = [
    "Run heavy appliances between 11 AM - 2 PM for maximum solar usage",
    "Battery is at optimal level. Consider exporting excess to grid",
    "Weather forecast shows cloudy afternoon. Charge battery now",
    "Peak efficiency detected. Great time for high-power tasks",
    "Grid rates are high. Switch to battery power for savings",
];

const SAMPLED_TIPS: usize = 3;

/// Tip and priority for a site-local hour.
pub fn hourly_tip(local_hour: u32) -> (&'static str, Priority) {
    match local_hour {
        10..=14 => ("Peak solar hours! Run heavy loads now.", Priority::High),
        6..=9 => ("Morning sun. Charge battery.", Priority::Medium),
        15..=18 => ("Solar declining. Prepare for evening.", Priority::Medium),
        _ => ("Night time. Minimal grid usage.", Priority::Low),
    }
}

/// Advice for the current battery level.
pub fn battery_tip(battery_percent: f64) -> &'static str {
    if battery_percent > 90.0 {
        "Battery full. Exporting recommended."
    } else if battery_percent < 30.0 {
        "Battery low. Conserve energy."
    } else {
        "Battery optimal."
    }
}

/// Full optimization payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationPlan {
    pub current_tip: &'static str,
    pub priority: Priority,
    pub battery_tip: &'static str,
    pub timeline: [TimelineEntry; 5],
    /// Three distinct tips from [`TIP_POOL`].
    pub tips: Vec<&'static str>,
}

/// Builds the plan for `local_hour` and `battery_percent`.
pub fn optimization_plan<R: Rng>(
    local_hour: u32,
    battery_percent: f64,
    rng: &mut R,
) -> OptimizationPlan {
    let (current_tip, priority) = hourly_tip(local_hour);
    OptimizationPlan {
        current_tip,
        priority,
        battery_tip: battery_tip(battery_percent),
        timeline: TIMELINE,
        tips: TIP_POOL
            .choose_multiple(rng, SAMPLED_TIPS)
            .copied()
            .collect(),
    }
}
