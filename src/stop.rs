//! Routable stops and the delivery orders that reference them.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::haversine;
use crate::traits::StopSource;

/// Identifier of a stop, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub i64);

impl StopId {
    /// Sentinel id of the synthetic "current location" stop.
    pub const CURRENT_LOCATION: StopId = StopId(-1);
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification tag carried along for display. Not used by optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopCategory {
    Home,
    Work,
    Customer,
    Restaurant,
    Cafe,
    Hospital,
    School,
    #[default]
    Other,
}

/// A single geographic point that can be part of a route.
///
/// Coordinates are validated once on construction and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStop")]
pub struct Stop {
    id: StopId,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    category: Option<StopCategory>,
}

impl Stop {
    /// Creates a stop, rejecting NaN, infinite or out-of-range coordinates.
    pub fn new(id: StopId, name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self {
            id,
            name: name.into(),
            address: String::new(),
            latitude,
            longitude,
            category: None,
        })
    }

    /// The synthetic starting point of a route.
    pub fn current_location(
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(StopId::CURRENT_LOCATION, "Current Location", latitude, longitude)?
            .with_address(address))
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_category(mut self, category: StopCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn id(&self) -> StopId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display address; empty when unknown.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn category(&self) -> Option<StopCategory> {
        self.category
    }

    /// Location coordinates (lat, lon).
    pub fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn is_current_location(&self) -> bool {
        self.id == StopId::CURRENT_LOCATION
    }

    /// Great-circle distance to another stop in kilometers.
    pub fn distance_to(&self, other: &Stop) -> f64 {
        haversine::distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(PlannerError::InvalidCoordinate { latitude, longitude })
    }
}

#[derive(Deserialize)]
struct RawStop {
    id: StopId,
    name: String,
    #[serde(default)]
    address: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    category: Option<StopCategory>,
}

impl TryFrom<RawStop> for Stop {
    type Error = PlannerError;

    fn try_from(raw: RawStop) -> Result<Self> {
        let mut stop =
            Stop::new(raw.id, raw.name, raw.latitude, raw.longitude)?.with_address(raw.address);
        stop.category = raw.category;
        Ok(stop)
    }
}

/// Lifecycle of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Orders in these states are waiting to be put on a route.
    pub fn awaits_delivery(self) -> bool {
        matches!(self, OrderStatus::Preparing | OrderStatus::Ready)
    }
}

/// A delivery order as handed over by the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub order_number: String,
    pub status: OrderStatus,
    /// Delivery location, if one has been attached.
    pub location_id: Option<StopId>,
}

/// Orders that are ready to be routed (preparing or ready).
pub fn pending_orders(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| order.status.awaits_delivery())
        .collect()
}

/// Resolves the delivery stop of each order.
///
/// Orders without a location, or whose location the source does not know,
/// are skipped. Several orders for the same location yield a single stop.
pub fn stops_for_orders<'a, S, I>(orders: I, source: &S) -> Vec<Stop>
where
    S: StopSource + ?Sized,
    I: IntoIterator<Item = &'a Order>,
{
    let mut stops: Vec<Stop> = Vec::new();
    for order in orders {
        let Some(location_id) = order.location_id else {
            continue;
        };
        if stops.iter().any(|stop| stop.id() == location_id) {
            continue;
        }
        if let Some(stop) = source.stop_by_id(location_id) {
            stops.push(stop);
        }
    }
    stops
}
