//! Statistics domains and the typed snapshot shapes served to dashboards.
//!
//! Each domain maps to one synced warehouse table and a fixed set of
//! sub-aggregations. Snapshot field names are the external JSON contract
//! consumed by the dashboard frontends; numeric fields are plain integers or
//! floats that default to 0, never null, so chart code downstream does not
//! need null guards.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named category of marketplace statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsDomain {
    Flights,
    Hotels,
    Packages,
    Reviews,
}

impl StatsDomain {
    pub const ALL: [StatsDomain; 4] = [
        StatsDomain::Flights,
        StatsDomain::Hotels,
        StatsDomain::Packages,
        StatsDomain::Reviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsDomain::Flights => "flights",
            StatsDomain::Hotels => "hotels",
            StatsDomain::Packages => "packages",
            StatsDomain::Reviews => "reviews",
        }
    }

    /// Warehouse table backing this domain (without catalog/schema prefix).
    pub fn table(&self) -> &'static str {
        match self {
            StatsDomain::Flights => "synced_flights",
            StatsDomain::Hotels => "synced_hotels",
            StatsDomain::Packages => "synced_packages",
            StatsDomain::Reviews => "synced_reviews",
        }
    }

    /// Column searched by the insights company-name filter.
    pub fn company_column(&self) -> &'static str {
        match self {
            StatsDomain::Flights => "airline",
            StatsDomain::Hotels => "hotel_name",
            StatsDomain::Packages => "package_type",
            StatsDomain::Reviews => "company_name",
        }
    }

    /// Column used by the insights date-range filter.
    pub fn date_column(&self) -> &'static str {
        match self {
            StatsDomain::Flights => "departure_date",
            StatsDomain::Hotels => "check_in_date",
            StatsDomain::Packages => "departure_date",
            StatsDomain::Reviews => "review_date",
        }
    }
}

impl fmt::Display for StatsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown statistics domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for StatsDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flights" => Ok(StatsDomain::Flights),
            "hotels" => Ok(StatsDomain::Hotels),
            "packages" => Ok(StatsDomain::Packages),
            "reviews" => Ok(StatsDomain::Reviews),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Flights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirlineStat {
    pub airline: String,
    pub flight_count: i64,
    pub avg_price: f64,
    pub avg_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRouteStat {
    pub origin: String,
    pub destination: String,
    pub flight_count: i64,
    pub avg_price: f64,
    pub min_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinClassStat {
    pub cabin_class: String,
    pub avg_price: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopsStat {
    pub stops: i64,
    pub count: i64,
    pub avg_price: f64,
    pub avg_duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightOverall {
    pub total_flights: i64,
    pub avg_price: f64,
    pub avg_duration: i64,
    pub avg_available_seats: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightStats {
    pub airlines: Vec<AirlineStat>,
    pub routes: Vec<FlightRouteStat>,
    pub cabin_classes: Vec<CabinClassStat>,
    pub stops: Vec<StopsStat>,
    pub overall: FlightOverall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Hotels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityStat {
    pub city: String,
    pub avg_rating: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomPriceStat {
    pub room_type: String,
    pub avg_price: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityStat {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotelOverall {
    pub total_hotels: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotelStats {
    pub cities: Vec<CityStat>,
    pub room_prices: Vec<RoomPriceStat>,
    pub amenities: Vec<AmenityStat>,
    pub overall: HotelOverall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageTypeStat {
    pub package_type: String,
    pub package_count: i64,
    pub avg_price: f64,
    pub avg_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationStat {
    pub destination: String,
    pub package_count: i64,
    pub avg_price: f64,
    pub min_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRouteStat {
    pub departure_city: String,
    pub destination: String,
    pub package_count: i64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStat {
    pub duration_range: String,
    pub count: i64,
    pub avg_price: f64,
    pub avg_days: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageOverall {
    pub total_packages: i64,
    pub avg_price: f64,
    pub avg_duration: i64,
    pub avg_discount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageStats {
    pub package_types: Vec<PackageTypeStat>,
    pub destinations: Vec<DestinationStat>,
    pub routes: Vec<PackageRouteStat>,
    pub durations: Vec<DurationStat>,
    pub overall: PackageOverall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStat {
    pub rating: i64,
    pub count: i64,
    pub avg_helpful: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTypeStat {
    pub item_type: String,
    pub review_count: i64,
    pub avg_rating: f64,
    pub recommend_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyStat {
    pub company_name: String,
    pub review_count: i64,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerStat {
    pub traveler_type: String,
    pub count: i64,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentStat {
    pub sentiment: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewOverall {
    pub total_reviews: i64,
    pub avg_rating: f64,
    pub verified_pct: f64,
    pub recommend_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStats {
    pub ratings: Vec<RatingStat>,
    pub item_types: Vec<ItemTypeStat>,
    pub companies: Vec<CompanyStat>,
    pub travelers: Vec<TravelerStat>,
    pub sentiment: Vec<SentimentStat>,
    pub overall: ReviewOverall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The complete aggregation result for one domain.
///
/// Serializes untagged, so the JSON shape is exactly the per-domain mapping
/// of named arrays the dashboards expect. A fallback snapshot is the same
/// structure with `error` set; consumers need no branching.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Flights(FlightStats),
    Hotels(HotelStats),
    Packages(PackageStats),
    Reviews(ReviewStats),
}

impl Snapshot {
    pub fn domain(&self) -> StatsDomain {
        match self {
            Snapshot::Flights(_) => StatsDomain::Flights,
            Snapshot::Hotels(_) => StatsDomain::Hotels,
            Snapshot::Packages(_) => StatsDomain::Packages,
            Snapshot::Reviews(_) => StatsDomain::Reviews,
        }
    }

    /// The error marker, set only on fallback snapshots.
    pub fn error(&self) -> Option<&str> {
        match self {
            Snapshot::Flights(s) => s.error.as_deref(),
            Snapshot::Hotels(s) => s.error.as_deref(),
            Snapshot::Packages(s) => s.error.as_deref(),
            Snapshot::Reviews(s) => s.error.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_round_trips_through_str() {
        for domain in StatsDomain::ALL {
            assert_eq!(domain.as_str().parse::<StatsDomain>().unwrap(), domain);
        }
    }

    #[test]
    fn unknown_domain_is_rejected() {
        assert!("cruises".parse::<StatsDomain>().is_err());
    }

    #[test]
    fn snapshot_serializes_without_error_field_when_unset() {
        let snapshot = Snapshot::Flights(FlightStats::default());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("error").is_none(), "error should be omitted when None");
        assert!(json.get("airlines").is_some(), "sub-aggregation keys should be present");
    }

    #[test]
    fn amenity_stat_serializes_type_key() {
        let stat = AmenityStat {
            kind: "Both".to_string(),
            count: 3,
        };
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["type"], "Both");
    }
}
