//! Real Las Vegas / Henderson delivery points for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API.

use route_planner::stop::{Stop, StopCategory, StopId};

/// A named delivery point with coordinates and a street address.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub category: StopCategory,
}

impl Location {
    pub const fn new(
        name: &'static str,
        address: &'static str,
        lat: f64,
        lng: f64,
        category: StopCategory,
    ) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
            category,
        }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// Builds a routable stop with the given id.
    pub fn to_stop(&self, id: i64) -> Stop {
        Stop::new(StopId(id), self.name, self.lat, self.lng)
            .unwrap()
            .with_address(self.address)
            .with_category(self.category)
    }
}

const fn work(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Location {
    Location::new(name, address, lat, lng, StopCategory::Work)
}

const fn restaurant(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Location {
    Location::new(name, address, lat, lng, StopCategory::Restaurant)
}

const fn customer(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Location {
    Location::new(name, address, lat, lng, StopCategory::Customer)
}

const fn home(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Location {
    Location::new(name, address, lat, lng, StopCategory::Home)
}

// ============================================================================
// Depots (good for current location / start)
// ============================================================================

pub const DEPOTS: &[Location] = &[
    work("Wynn Las Vegas", "3131 S Las Vegas Blvd", 36.1263781, -115.1658180),
    work("MGM Grand", "3799 S Las Vegas Blvd", 36.1023654, -115.1688720),
    work("Longhorn Casino", "5288 Boulder Hwy", 36.1070664, -115.0591256),
];

// ============================================================================
// Strip restaurants (pickups)
// ============================================================================

pub const STRIP_RESTAURANTS: &[Location] = &[
    restaurant("Hard Rock Cafe", "3771 S Las Vegas Blvd", 36.1041592, -115.1722166),
    restaurant("Sinatra", "3131 S Las Vegas Blvd", 36.1300035, -115.1654850),
    restaurant("Public House", "3355 S Las Vegas Blvd", 36.1219193, -115.1689317),
    restaurant("Brooklyn Bowl", "3545 S Las Vegas Blvd", 36.1175388, -115.1695094),
    restaurant("Gordon Ramsay BurGR", "3667 S Las Vegas Blvd", 36.1107195, -115.1720818),
    restaurant("Spago by Wolfgang Puck", "3600 S Las Vegas Blvd", 36.1139368, -115.1741462),
    restaurant("Bacchanal Buffet", "3570 S Las Vegas Blvd", 36.1159581, -115.1762929),
    restaurant("Il Fornaio", "3790 S Las Vegas Blvd", 36.1024474, -115.1740110),
];

// ============================================================================
// Customer drop-offs across the valley
// ============================================================================

pub const CUSTOMERS: &[Location] = &[
    customer("Rivas Residence", "1 N Nellis Blvd", 36.1450055, -115.0482587),
    customer("Beers and Bets", "2 E Sahara Ave", 36.1428945, -115.1573836),
    customer("Bootlegger Bistro", "7700 S Las Vegas Blvd", 36.0492047, -115.1715744),
    customer("Budget Suites South", "9040 S Las Vegas Blvd", 36.0366259, -115.1713361),
    home("Green Valley Ranch Area", "2300 Paseo Verde Pkwy", 36.0308, -115.0825),
    home("Sunset Station Area", "1301 W Sunset Rd", 36.0614, -115.0631),
    customer("I Love Sushi", "11041 S Eastern Ave", 35.9916660, -115.1028343),
    customer("Islander's Grill", "1 Lake Mead Pkwy", 36.0335058, -114.9856162),
    customer("Tomo Sushi", "4480 E Tropicana Ave", 36.0992464, -115.1142123),
    work("Town Square Office", "6605 Las Vegas Blvd S", 36.0810469, -115.1472694),
];

// ============================================================================
// Stop builders
// ============================================================================

/// Turns `locations` into stops with ids starting at `first_id`.
pub fn stops(locations: &[Location], first_id: i64) -> Vec<Stop> {
    locations
        .iter()
        .zip(first_id..)
        .map(|(location, id)| location.to_stop(id))
        .collect()
}

/// Every pickup and drop-off as a catalogue of stops, ids from 1.
pub fn catalogue() -> Vec<Stop> {
    let mut all = Vec::with_capacity(STRIP_RESTAURANTS.len() + CUSTOMERS.len());
    all.extend_from_slice(STRIP_RESTAURANTS);
    all.extend_from_slice(CUSTOMERS);
    stops(&all, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_vegas_area() {
        for loc in DEPOTS.iter().chain(STRIP_RESTAURANTS).chain(CUSTOMERS) {
            assert!(loc.lat > 35.9 && loc.lat < 36.3, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(
                loc.lng > -115.4 && loc.lng < -114.8,
                "{} lng out of range: {}",
                loc.name,
                loc.lng
            );
        }
    }
}
