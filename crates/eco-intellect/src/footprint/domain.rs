use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery vehicle used for the last leg of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Car,
    Bike,
    ElectricVehicle,
    Motorcycle,
    Walk,
}

impl TransportMode {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Car,
            Self::Motorcycle,
            Self::ElectricVehicle,
            Self::Bike,
            Self::Walk,
        ]
    }

    /// Key used for factor lookups and persisted records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bike => "bike",
            Self::ElectricVehicle => "electric_vehicle",
            Self::Motorcycle => "motorcycle",
            Self::Walk => "walk",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Bike => "Bike",
            Self::ElectricVehicle => "Electric Vehicle",
            Self::Motorcycle => "Motorcycle",
            Self::Walk => "Walk",
        }
    }

    /// Average riding time in minutes per kilometre.
    pub const fn minutes_per_km(self) -> f64 {
        match self {
            Self::Car => 2.5,
            Self::Motorcycle => 2.0,
            Self::ElectricVehicle => 2.5,
            Self::Bike => 4.0,
            Self::Walk => 12.0,
        }
    }
}

/// Packaging the order is handed over in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingType {
    Plastic,
    Biodegradable,
    Reusable,
    Paper,
}

impl PackagingType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Plastic,
            Self::Paper,
            Self::Biodegradable,
            Self::Reusable,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Biodegradable => "biodegradable",
            Self::Reusable => "reusable",
            Self::Paper => "paper",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Plastic => "Plastic",
            Self::Biodegradable => "Biodegradable",
            Self::Reusable => "Reusable",
            Self::Paper => "Paper",
        }
    }
}

/// Category half of an emission factor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorCategory {
    Transport,
    Packaging,
}

impl FactorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Packaging => "packaging",
        }
    }
}

/// Where a factor or estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Fallback,
}

impl DataOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

/// Identifier wrapper for platform users owning ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn demo() -> Self {
        Self("user_demo".to_string())
    }
}

/// Raw order payload as submitted by the delivery platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub distance_km: f64,
    pub transport_mode: TransportMode,
    pub packaging_type: PackagingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_minutes: Option<u32>,
    pub order_value: f64,
    #[serde(default = "default_frequency")]
    pub frequency_per_week: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_frequency() -> u8 {
    1
}

/// Weekly order frequency accepted by the projection model.
pub const FREQUENCY_RANGE: std::ops::RangeInclusive<u8> = 1..=21;

/// Validated, immutable order used by the estimation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderInput {
    distance_km: f64,
    transport_mode: TransportMode,
    packaging_type: PackagingType,
    order_value: f64,
    frequency_per_week: u8,
}

impl OrderInput {
    pub fn new(
        distance_km: f64,
        transport_mode: TransportMode,
        packaging_type: PackagingType,
        order_value: f64,
        frequency_per_week: u8,
    ) -> Result<Self, ValidationError> {
        ensure_distance(distance_km)?;
        if !(order_value.is_finite() && order_value > 0.0) {
            return Err(ValidationError::NonPositiveOrderValue(order_value));
        }
        if !FREQUENCY_RANGE.contains(&frequency_per_week) {
            return Err(ValidationError::FrequencyOutOfRange(frequency_per_week));
        }

        Ok(Self {
            distance_km,
            transport_mode,
            packaging_type,
            order_value,
            frequency_per_week,
        })
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn packaging_type(&self) -> PackagingType {
        self.packaging_type
    }

    pub fn order_value(&self) -> f64 {
        self.order_value
    }

    pub fn frequency_per_week(&self) -> u8 {
        self.frequency_per_week
    }
}

impl TryFrom<&OrderSubmission> for OrderInput {
    type Error = ValidationError;

    fn try_from(submission: &OrderSubmission) -> Result<Self, Self::Error> {
        if submission.estimated_time_minutes == Some(0) {
            return Err(ValidationError::ZeroEstimatedTime);
        }
        Self::new(
            submission.distance_km,
            submission.transport_mode,
            submission.packaging_type,
            submission.order_value,
            submission.frequency_per_week,
        )
    }
}

pub(crate) fn ensure_distance(distance_km: f64) -> Result<(), ValidationError> {
    if distance_km.is_finite() && distance_km > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveDistance(distance_km))
    }
}

/// Input rejected before it reaches the estimation engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("distance_km must be a positive number, got {0}")]
    NonPositiveDistance(f64),
    #[error("order_value must be a positive number, got {0}")]
    NonPositiveOrderValue(f64),
    #[error("frequency_per_week must be between 1 and 21, got {0}")]
    FrequencyOutOfRange(u8),
    #[error("estimated_time_minutes must be greater than zero")]
    ZeroEstimatedTime,
    #[error("user_id must not be blank")]
    BlankUserId,
}

/// Persisted snapshot of one analyzed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub user_id: UserId,
    pub distance_km: f64,
    pub transport_mode: TransportMode,
    pub packaging_type: PackagingType,
    pub carbon_emission_grams: f64,
    pub eco_score: u8,
    pub timestamp: DateTime<Utc>,
}
