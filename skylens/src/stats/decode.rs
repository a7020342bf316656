//! Decoding warehouse result rows into typed snapshots.
//!
//! Rows arrive as sequences of nullable strings (`data_array` cells). Decoding
//! never fails: a numeric cell that is null, missing, or unparsable becomes 0,
//! and a row whose tag is not recognized is dropped without comment. The
//! dashboards would rather chart a zero than handle an error.

use super::domain::{
    AirlineStat, AmenityStat, CabinClassStat, CityStat, CompanyStat, DestinationStat,
    DurationStat, FlightOverall, FlightRouteStat, FlightStats, HotelOverall, HotelStats,
    ItemTypeStat, PackageOverall, PackageRouteStat, PackageStats, PackageTypeStat, RatingStat,
    ReviewOverall, ReviewStats, RoomPriceStat, SentimentStat, Snapshot, StatsDomain, StopsStat,
    TravelerStat,
};

/// One warehouse result row: nullable string cells, positionally addressed.
pub type Row = Vec<Option<String>>;

/// Cell at `idx` as text, empty string when null or missing.
fn text(row: &Row, idx: usize) -> String {
    row.get(idx)
        .and_then(|cell| cell.clone())
        .unwrap_or_default()
}

/// Cell at `idx` as a float, 0.0 when null, missing, or unparsable.
fn num(row: &Row, idx: usize) -> f64 {
    row.get(idx)
        .and_then(|cell| cell.as_deref())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Cell at `idx` as an integer. Warehouse averages come back as "180.0", so
/// parse through f64 and truncate.
fn int(row: &Row, idx: usize) -> i64 {
    num(row, idx) as i64
}

/// Decode the result sets for a domain into its snapshot.
///
/// `results` holds one row set per composed statement, in statement order.
/// Missing result sets are treated as empty.
pub fn decode(domain: StatsDomain, results: &[Vec<Row>]) -> Snapshot {
    match domain {
        StatsDomain::Flights => Snapshot::Flights(decode_flights(results)),
        StatsDomain::Hotels => Snapshot::Hotels(decode_hotels(results)),
        StatsDomain::Packages => Snapshot::Packages(decode_packages(results)),
        StatsDomain::Reviews => Snapshot::Reviews(decode_reviews(results)),
    }
}

fn result_set(results: &[Vec<Row>], idx: usize) -> &[Row] {
    results.get(idx).map(Vec::as_slice).unwrap_or(&[])
}

fn decode_flights(results: &[Vec<Row>]) -> FlightStats {
    let airlines = result_set(results, 0)
        .iter()
        .map(|row| AirlineStat {
            airline: text(row, 0),
            flight_count: int(row, 1),
            avg_price: num(row, 2),
            avg_duration: int(row, 3),
        })
        .collect();

    let routes = result_set(results, 1)
        .iter()
        .map(|row| FlightRouteStat {
            origin: text(row, 0),
            destination: text(row, 1),
            flight_count: int(row, 2),
            avg_price: num(row, 3),
            min_price: num(row, 4),
        })
        .collect();

    let cabin_classes = result_set(results, 2)
        .iter()
        .map(|row| CabinClassStat {
            cabin_class: text(row, 0),
            avg_price: num(row, 1),
            count: int(row, 2),
        })
        .collect();

    let stops = result_set(results, 3)
        .iter()
        .map(|row| StopsStat {
            stops: int(row, 0),
            count: int(row, 1),
            avg_price: num(row, 2),
            avg_duration: int(row, 3),
        })
        .collect();

    let overall = result_set(results, 4)
        .first()
        .map(|row| FlightOverall {
            total_flights: int(row, 0),
            avg_price: num(row, 1),
            avg_duration: int(row, 2),
            avg_available_seats: int(row, 3),
        })
        .unwrap_or_default();

    FlightStats {
        airlines,
        routes,
        cabin_classes,
        stops,
        overall,
        error: None,
    }
}

fn decode_hotels(results: &[Vec<Row>]) -> HotelStats {
    let cities = result_set(results, 0)
        .iter()
        .map(|row| CityStat {
            city: text(row, 0),
            avg_rating: num(row, 1),
            count: int(row, 2),
        })
        .collect();

    let room_prices = result_set(results, 1)
        .iter()
        .map(|row| RoomPriceStat {
            room_type: text(row, 0),
            avg_price: num(row, 1),
            count: int(row, 2),
        })
        .collect();

    let amenities = result_set(results, 2)
        .iter()
        .map(|row| AmenityStat {
            kind: text(row, 0),
            count: int(row, 1),
        })
        .collect();

    let overall = result_set(results, 3)
        .first()
        .map(|row| HotelOverall {
            total_hotels: int(row, 0),
            avg_rating: num(row, 1),
            avg_price: num(row, 2),
        })
        .unwrap_or_default();

    HotelStats {
        cities,
        room_prices,
        amenities,
        overall,
        error: None,
    }
}

// Combined-statement column layout for packages (tag at 0):
//   1 name  2 package_count  3 avg_price  4 avg_duration  5 min_price
//   6 destination  7 departure_city  8 duration_range  9 count
//   10 avg_days  11 total_packages  12 avg_discount
fn decode_packages(results: &[Vec<Row>]) -> PackageStats {
    let mut stats = PackageStats::default();

    for row in result_set(results, 0) {
        match text(row, 0).as_str() {
            "types" => stats.package_types.push(PackageTypeStat {
                package_type: text(row, 1),
                package_count: int(row, 2),
                avg_price: num(row, 3),
                avg_duration: int(row, 4),
            }),
            "destinations" => stats.destinations.push(DestinationStat {
                destination: text(row, 1),
                package_count: int(row, 2),
                avg_price: num(row, 3),
                min_price: num(row, 5),
            }),
            "routes" => stats.routes.push(PackageRouteStat {
                departure_city: text(row, 7),
                destination: text(row, 6),
                package_count: int(row, 2),
                avg_price: num(row, 3),
            }),
            "durations" => stats.durations.push(DurationStat {
                duration_range: text(row, 8),
                count: int(row, 9),
                avg_price: num(row, 3),
                avg_days: num(row, 10),
            }),
            "overall" => {
                stats.overall = PackageOverall {
                    total_packages: int(row, 11),
                    avg_price: num(row, 3),
                    avg_duration: int(row, 4),
                    avg_discount: num(row, 12),
                }
            }
            // Unrecognized tags are dropped.
            _ => {}
        }
    }

    stats
}

// Combined-statement column layout for reviews (tag at 0):
//   1 name (rating as string)  2 count  3 avg_helpful  4 review_count
//   5 avg_rating  6 recommend_pct  7 item_type  8 company_name
//   9 traveler_type  10 sentiment  11 total_reviews  12 verified_pct
fn decode_reviews(results: &[Vec<Row>]) -> ReviewStats {
    let mut stats = ReviewStats::default();

    for row in result_set(results, 0) {
        match text(row, 0).as_str() {
            "ratings" => stats.ratings.push(RatingStat {
                rating: int(row, 1),
                count: int(row, 2),
                avg_helpful: num(row, 3),
            }),
            "item_types" => stats.item_types.push(ItemTypeStat {
                item_type: text(row, 7),
                review_count: int(row, 4),
                avg_rating: num(row, 5),
                recommend_pct: num(row, 6),
            }),
            "companies" => stats.companies.push(CompanyStat {
                company_name: text(row, 8),
                review_count: int(row, 4),
                avg_rating: num(row, 5),
            }),
            "travelers" => stats.travelers.push(TravelerStat {
                traveler_type: text(row, 9),
                count: int(row, 4),
                avg_rating: num(row, 5),
            }),
            "sentiment" => stats.sentiment.push(SentimentStat {
                sentiment: text(row, 10),
                count: int(row, 4),
            }),
            "overall" => {
                stats.overall = ReviewOverall {
                    total_reviews: int(row, 11),
                    avg_rating: num(row, 5),
                    verified_pct: num(row, 12),
                    recommend_pct: num(row, 6),
                }
            }
            _ => {}
        }
    }

    // Union branch ordering is arbitrary; rating distribution is presented
    // low-to-high.
    stats.ratings.sort_by_key(|r| r.rating);

    stats
}
