//! Fixed synthetic snapshots served when the warehouse is unreachable.
//!
//! Values are hand-authored to look like a plausible marketplace so dashboards
//! render normally during an outage. Every fallback snapshot carries an
//! `error` field describing the failure; fallbacks are never cached, so the
//! first request after recovery gets real data.

use super::domain::{
    AirlineStat, AmenityStat, CabinClassStat, CityStat, CompanyStat, DestinationStat,
    DurationStat, FlightOverall, FlightRouteStat, FlightStats, HotelOverall, HotelStats,
    ItemTypeStat, PackageOverall, PackageRouteStat, PackageStats, PackageTypeStat, RatingStat,
    ReviewOverall, ReviewStats, RoomPriceStat, SentimentStat, Snapshot, StatsDomain, StopsStat,
    TravelerStat,
};
use crate::errors::StatsError;

/// Build the synthetic snapshot for a domain, annotated with the failure that
/// forced it.
pub fn fallback(domain: StatsDomain, error: &StatsError) -> Snapshot {
    let message = format!("Query failed, showing mock data: {error}");
    match domain {
        StatsDomain::Flights => Snapshot::Flights(flights(message)),
        StatsDomain::Hotels => Snapshot::Hotels(hotels(message)),
        StatsDomain::Packages => Snapshot::Packages(packages(message)),
        StatsDomain::Reviews => Snapshot::Reviews(reviews(message)),
    }
}

fn airline(airline: &str, flight_count: i64, avg_price: f64, avg_duration: i64) -> AirlineStat {
    AirlineStat {
        airline: airline.to_string(),
        flight_count,
        avg_price,
        avg_duration,
    }
}

fn flight_route(
    origin: &str,
    destination: &str,
    flight_count: i64,
    avg_price: f64,
    min_price: f64,
) -> FlightRouteStat {
    FlightRouteStat {
        origin: origin.to_string(),
        destination: destination.to_string(),
        flight_count,
        avg_price,
        min_price,
    }
}

fn flights(error: String) -> FlightStats {
    FlightStats {
        airlines: vec![
            airline("United", 150, 450.50, 180),
            airline("Delta", 142, 425.75, 175),
            airline("American Airlines", 135, 410.25, 170),
            airline("Lufthansa", 128, 520.00, 240),
            airline("Air France", 120, 485.50, 220),
        ],
        routes: vec![
            flight_route("JFK", "LAX", 45, 350.00, 250.00),
            flight_route("LHR", "CDG", 40, 180.00, 120.00),
            flight_route("ORD", "SFO", 38, 320.00, 220.00),
            flight_route("ATL", "MIA", 35, 280.00, 180.00),
            flight_route("DXB", "LHR", 32, 650.00, 450.00),
        ],
        cabin_classes: vec![
            CabinClassStat {
                cabin_class: "First".to_string(),
                avg_price: 1200.00,
                count: 150,
            },
            CabinClassStat {
                cabin_class: "Business".to_string(),
                avg_price: 800.00,
                count: 250,
            },
            CabinClassStat {
                cabin_class: "Premium Economy".to_string(),
                avg_price: 450.00,
                count: 200,
            },
            CabinClassStat {
                cabin_class: "Economy".to_string(),
                avg_price: 250.00,
                count: 400,
            },
        ],
        stops: vec![
            StopsStat {
                stops: 0,
                count: 600,
                avg_price: 420.00,
                avg_duration: 180,
            },
            StopsStat {
                stops: 1,
                count: 300,
                avg_price: 320.00,
                avg_duration: 280,
            },
            StopsStat {
                stops: 2,
                count: 100,
                avg_price: 250.00,
                avg_duration: 380,
            },
        ],
        overall: FlightOverall {
            total_flights: 1000,
            avg_price: 385.50,
            avg_duration: 215,
            avg_available_seats: 120,
        },
        error: Some(error),
    }
}

fn city(city: &str, avg_rating: f64, count: i64) -> CityStat {
    CityStat {
        city: city.to_string(),
        avg_rating,
        count,
    }
}

fn hotels(error: String) -> HotelStats {
    HotelStats {
        cities: vec![
            city("Paris", 4.8, 250),
            city("London", 4.7, 220),
            city("New York", 4.6, 300),
            city("Tokyo", 4.5, 180),
            city("Barcelona", 4.4, 150),
            city("Amsterdam", 4.3, 140),
            city("Rome", 4.2, 160),
            city("Dubai", 4.1, 190),
            city("Singapore", 4.0, 120),
            city("Sydney", 3.9, 110),
        ],
        room_prices: vec![
            RoomPriceStat {
                room_type: "Suite".to_string(),
                avg_price: 450.50,
                count: 120,
            },
            RoomPriceStat {
                room_type: "Deluxe".to_string(),
                avg_price: 320.75,
                count: 250,
            },
            RoomPriceStat {
                room_type: "Standard".to_string(),
                avg_price: 180.25,
                count: 400,
            },
            RoomPriceStat {
                room_type: "Economy".to_string(),
                avg_price: 95.00,
                count: 230,
            },
        ],
        amenities: vec![
            AmenityStat {
                kind: "Both".to_string(),
                count: 450,
            },
            AmenityStat {
                kind: "Breakfast Only".to_string(),
                count: 280,
            },
            AmenityStat {
                kind: "Cancellation Only".to_string(),
                count: 190,
            },
            AmenityStat {
                kind: "Neither".to_string(),
                count: 80,
            },
        ],
        overall: HotelOverall {
            total_hotels: 1000,
            avg_rating: 4.3,
            avg_price: 245.50,
        },
        error: Some(error),
    }
}

fn package_type(
    package_type: &str,
    package_count: i64,
    avg_price: f64,
    avg_duration: i64,
) -> PackageTypeStat {
    PackageTypeStat {
        package_type: package_type.to_string(),
        package_count,
        avg_price,
        avg_duration,
    }
}

fn destination(destination: &str, package_count: i64, avg_price: f64, min_price: f64) -> DestinationStat {
    DestinationStat {
        destination: destination.to_string(),
        package_count,
        avg_price,
        min_price,
    }
}

fn packages(error: String) -> PackageStats {
    PackageStats {
        package_types: vec![
            package_type("Flight + Hotel", 450, 1250.00, 7),
            package_type("Flight + Hotel + Car", 320, 1580.00, 10),
            package_type("Beach Holiday", 280, 2100.00, 14),
            package_type("City Break", 250, 850.00, 4),
        ],
        destinations: vec![
            destination("Dubai", 120, 1800.00, 950.00),
            destination("Paris", 110, 1200.00, 680.00),
            destination("Barcelona", 95, 980.00, 550.00),
            destination("Tokyo", 85, 2500.00, 1800.00),
            destination("New York", 80, 1900.00, 1200.00),
        ],
        routes: vec![
            PackageRouteStat {
                departure_city: "London".to_string(),
                destination: "Dubai".to_string(),
                package_count: 45,
                avg_price: 1750.00,
            },
            PackageRouteStat {
                departure_city: "Paris".to_string(),
                destination: "Barcelona".to_string(),
                package_count: 38,
                avg_price: 890.00,
            },
            PackageRouteStat {
                departure_city: "London".to_string(),
                destination: "Paris".to_string(),
                package_count: 35,
                avg_price: 1100.00,
            },
        ],
        durations: vec![
            DurationStat {
                duration_range: "1-3 days".to_string(),
                count: 250,
                avg_price: 650.00,
                avg_days: 2.5,
            },
            DurationStat {
                duration_range: "4-7 days".to_string(),
                count: 420,
                avg_price: 1200.00,
                avg_days: 5.8,
            },
            DurationStat {
                duration_range: "8-14 days".to_string(),
                count: 280,
                avg_price: 2100.00,
                avg_days: 10.5,
            },
            DurationStat {
                duration_range: "15+ days".to_string(),
                count: 50,
                avg_price: 3500.00,
                avg_days: 18.2,
            },
        ],
        overall: PackageOverall {
            total_packages: 1000,
            avg_price: 1485.50,
            avg_duration: 8,
            avg_discount: 15.5,
        },
        error: Some(error),
    }
}

fn company(company_name: &str, review_count: i64, avg_rating: f64) -> CompanyStat {
    CompanyStat {
        company_name: company_name.to_string(),
        review_count,
        avg_rating,
    }
}

fn reviews(error: String) -> ReviewStats {
    ReviewStats {
        ratings: vec![
            RatingStat {
                rating: 1,
                count: 50,
                avg_helpful: 2.5,
            },
            RatingStat {
                rating: 2,
                count: 80,
                avg_helpful: 3.2,
            },
            RatingStat {
                rating: 3,
                count: 150,
                avg_helpful: 4.1,
            },
            RatingStat {
                rating: 4,
                count: 350,
                avg_helpful: 5.8,
            },
            RatingStat {
                rating: 5,
                count: 370,
                avg_helpful: 7.2,
            },
        ],
        item_types: vec![
            ItemTypeStat {
                item_type: "Flight".to_string(),
                review_count: 450,
                avg_rating: 4.2,
                recommend_pct: 78.5,
            },
            ItemTypeStat {
                item_type: "Hotel".to_string(),
                review_count: 380,
                avg_rating: 4.3,
                recommend_pct: 82.1,
            },
            ItemTypeStat {
                item_type: "Package".to_string(),
                review_count: 170,
                avg_rating: 4.5,
                recommend_pct: 85.3,
            },
        ],
        companies: vec![
            company("Delta Air Lines", 85, 4.6),
            company("Marriott Hotels", 72, 4.5),
            company("United Airlines", 68, 4.4),
            company("Hilton Hotels", 65, 4.4),
            company("British Airways", 58, 4.3),
        ],
        travelers: vec![
            TravelerStat {
                traveler_type: "Business".to_string(),
                count: 320,
                avg_rating: 4.1,
            },
            TravelerStat {
                traveler_type: "Leisure".to_string(),
                count: 450,
                avg_rating: 4.4,
            },
            TravelerStat {
                traveler_type: "Family".to_string(),
                count: 230,
                avg_rating: 4.3,
            },
        ],
        sentiment: vec![
            SentimentStat {
                sentiment: "Positive".to_string(),
                count: 720,
            },
            SentimentStat {
                sentiment: "Neutral".to_string(),
                count: 150,
            },
            SentimentStat {
                sentiment: "Negative".to_string(),
                count: 130,
            },
        ],
        overall: ReviewOverall {
            total_reviews: 1000,
            avg_rating: 4.25,
            verified_pct: 72.5,
            recommend_pct: 80.3,
        },
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fallback_carries_the_error_message() {
        let err = StatsError::NoWarehouseAvailable;
        for domain in StatsDomain::ALL {
            let snapshot = fallback(domain, &err);
            let message = snapshot.error().unwrap_or_default();
            assert!(
                message.starts_with("Query failed, showing mock data:"),
                "{domain} fallback should describe the failure, got {message:?}"
            );
            assert_eq!(snapshot.domain(), domain);
        }
    }

    #[test]
    fn flights_fallback_lists_five_airlines() {
        let err = StatsError::Execution("connection refused".to_string());
        let Snapshot::Flights(stats) = fallback(StatsDomain::Flights, &err) else {
            panic!("flights fallback should be a flights snapshot");
        };
        assert_eq!(stats.airlines.len(), 5);
        assert_eq!(stats.airlines[0].airline, "United");
        assert_eq!(stats.overall.total_flights, 1000);
    }

    #[test]
    fn hotels_fallback_covers_ten_cities() {
        let err = StatsError::Execution("timeout".to_string());
        let Snapshot::Hotels(stats) = fallback(StatsDomain::Hotels, &err) else {
            panic!("hotels fallback should be a hotels snapshot");
        };
        assert_eq!(stats.cities.len(), 10);
        assert_eq!(stats.amenities.len(), 4);
    }
}
