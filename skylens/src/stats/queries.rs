//! Query composition for the statistics domains.
//!
//! Flights and hotels run one simple statement per sub-aggregation. Packages
//! and reviews merge their sub-aggregations into a single statement: CTEs per
//! sub-aggregation, then a UNION ALL whose branches all project the same
//! column count (padding unused positions with NULL) and carry a discriminator
//! tag at column 0. The per-branch column layout is a positional contract with
//! [`super::decode`]; the layouts are documented there next to the extraction
//! code.
//!
//! Top-N limits are fixed at compose time (10 everywhere) to bound result
//! size and cache memory; they are not caller-configurable.

use super::domain::StatsDomain;

/// Builds the aggregate statements for each statistics domain.
///
/// Statement order within a domain is fixed; the decoder consumes results
/// positionally in the same order.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    catalog: String,
    schema: String,
}

impl QueryComposer {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }

    /// Fully qualified table name for a domain.
    pub fn table(&self, domain: StatsDomain) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, domain.table())
    }

    /// Compose the statement(s) for a domain.
    pub fn compose(&self, domain: StatsDomain) -> Vec<String> {
        match domain {
            StatsDomain::Flights => self.flights(),
            StatsDomain::Hotels => self.hotels(),
            StatsDomain::Packages => vec![self.packages_combined()],
            StatsDomain::Reviews => vec![self.reviews_combined()],
        }
    }

    /// Flights: airlines, routes, cabin classes, stops, overall (in order).
    fn flights(&self) -> Vec<String> {
        let table = self.table(StatsDomain::Flights);
        vec![
            format!(
                "SELECT airline, COUNT(*) as flight_count, AVG(price) as avg_price, \
                 AVG(duration_minutes) as avg_duration \
                 FROM {table} \
                 WHERE airline IS NOT NULL \
                 GROUP BY airline \
                 ORDER BY COUNT(*) DESC \
                 LIMIT 10"
            ),
            format!(
                "SELECT origin, destination, COUNT(*) as flight_count, \
                 AVG(price) as avg_price, MIN(price) as min_price \
                 FROM {table} \
                 WHERE origin IS NOT NULL AND destination IS NOT NULL \
                 GROUP BY origin, destination \
                 ORDER BY COUNT(*) DESC \
                 LIMIT 10"
            ),
            format!(
                "SELECT cabin_class, AVG(price) as avg_price, COUNT(*) as count \
                 FROM {table} \
                 WHERE cabin_class IS NOT NULL AND price IS NOT NULL \
                 GROUP BY cabin_class"
            ),
            format!(
                "SELECT stops, COUNT(*) as count, AVG(price) as avg_price, \
                 AVG(duration_minutes) as avg_duration \
                 FROM {table} \
                 WHERE stops IS NOT NULL \
                 GROUP BY stops \
                 ORDER BY stops"
            ),
            format!(
                "SELECT COUNT(*) as total_flights, AVG(price) as avg_price, \
                 AVG(duration_minutes) as avg_duration, \
                 AVG(available_seats) as avg_available_seats \
                 FROM {table} \
                 WHERE price IS NOT NULL"
            ),
        ]
    }

    /// Hotels: cities, room prices, amenities, overall (in order).
    fn hotels(&self) -> Vec<String> {
        let table = self.table(StatsDomain::Hotels);
        vec![
            format!(
                "SELECT city, AVG(star_rating) as avg_rating, COUNT(*) as count \
                 FROM {table} \
                 WHERE city IS NOT NULL AND star_rating IS NOT NULL \
                 GROUP BY city \
                 ORDER BY avg_rating DESC \
                 LIMIT 10"
            ),
            format!(
                "SELECT room_type, AVG(total_price) as avg_price, COUNT(*) as count \
                 FROM {table} \
                 WHERE room_type IS NOT NULL AND total_price IS NOT NULL \
                 GROUP BY room_type \
                 ORDER BY avg_price DESC"
            ),
            format!(
                "SELECT CASE \
                 WHEN free_breakfast = true AND free_cancellation = true THEN 'Both' \
                 WHEN free_breakfast = true AND free_cancellation = false THEN 'Breakfast Only' \
                 WHEN free_breakfast = false AND free_cancellation = true THEN 'Cancellation Only' \
                 ELSE 'Neither' END as type, COUNT(*) as count \
                 FROM {table} \
                 GROUP BY type"
            ),
            format!(
                "SELECT COUNT(*) as total_hotels, AVG(star_rating) as avg_rating, \
                 AVG(total_price) as avg_price \
                 FROM {table} \
                 WHERE star_rating IS NOT NULL AND total_price IS NOT NULL"
            ),
        ]
    }

    /// Packages: one combined statement. Tags: types, destinations, routes,
    /// durations, overall. Thirteen columns per branch.
    fn packages_combined(&self) -> String {
        let table = self.table(StatsDomain::Packages);
        format!(
            "WITH type_stats AS ( \
               SELECT package_type, COUNT(*) as package_count, AVG(final_price) as avg_price, \
                      AVG(duration_days) as avg_duration, \
                      ROW_NUMBER() OVER (ORDER BY COUNT(*) DESC) as rn \
               FROM {table} WHERE package_type IS NOT NULL GROUP BY package_type \
             ), \
             destination_stats AS ( \
               SELECT destination, COUNT(*) as package_count, AVG(final_price) as avg_price, \
                      MIN(final_price) as min_price, \
                      ROW_NUMBER() OVER (ORDER BY COUNT(*) DESC) as rn \
               FROM {table} WHERE destination IS NOT NULL GROUP BY destination \
             ), \
             route_stats AS ( \
               SELECT departure_city, destination, COUNT(*) as package_count, \
                      AVG(final_price) as avg_price, \
                      ROW_NUMBER() OVER (ORDER BY COUNT(*) DESC) as rn \
               FROM {table} WHERE departure_city IS NOT NULL AND destination IS NOT NULL \
               GROUP BY departure_city, destination \
             ), \
             duration_stats AS ( \
               SELECT CASE \
                        WHEN duration_days <= 3 THEN '1-3 days' \
                        WHEN duration_days <= 7 THEN '4-7 days' \
                        WHEN duration_days <= 14 THEN '8-14 days' \
                        ELSE '15+ days' END as duration_range, \
                      COUNT(*) as count, AVG(final_price) as avg_price, \
                      AVG(duration_days) as avg_days \
               FROM {table} WHERE duration_days IS NOT NULL GROUP BY duration_range \
             ), \
             overall_stats AS ( \
               SELECT COUNT(*) as total_packages, AVG(final_price) as avg_price, \
                      AVG(duration_days) as avg_duration, \
                      AVG(discount_percentage) as avg_discount \
               FROM {table} WHERE final_price IS NOT NULL \
             ) \
             SELECT 'types' as stat_type, package_type as name, package_count, avg_price, \
                    avg_duration, NULL as min_price, NULL as destination, NULL as departure_city, \
                    NULL as duration_range, NULL as count, NULL as avg_days, \
                    NULL as total_packages, NULL as avg_discount \
             FROM type_stats \
             UNION ALL \
             SELECT 'destinations', destination, package_count, avg_price, NULL, min_price, \
                    NULL, NULL, NULL, NULL, NULL, NULL, NULL \
             FROM destination_stats WHERE rn <= 10 \
             UNION ALL \
             SELECT 'routes', NULL, package_count, avg_price, NULL, NULL, destination, \
                    departure_city, NULL, NULL, NULL, NULL, NULL \
             FROM route_stats WHERE rn <= 10 \
             UNION ALL \
             SELECT 'durations', NULL, NULL, avg_price, NULL, NULL, NULL, NULL, \
                    duration_range, count, avg_days, NULL, NULL \
             FROM duration_stats \
             UNION ALL \
             SELECT 'overall', NULL, NULL, avg_price, avg_duration, NULL, NULL, NULL, \
                    NULL, NULL, NULL, total_packages, avg_discount \
             FROM overall_stats"
        )
    }

    /// Reviews: one combined statement. Tags: ratings, item_types, companies,
    /// travelers, sentiment, overall. Thirteen columns per branch.
    fn reviews_combined(&self) -> String {
        let table = self.table(StatsDomain::Reviews);
        format!(
            "WITH rating_dist AS ( \
               SELECT rating, COUNT(*) as count, AVG(helpful_votes) as avg_helpful \
               FROM {table} WHERE rating IS NOT NULL GROUP BY rating \
             ), \
             item_type_stats AS ( \
               SELECT item_type, COUNT(*) as review_count, AVG(rating) as avg_rating, \
                      SUM(CASE WHEN would_recommend = true THEN 1 ELSE 0 END) * 100.0 / COUNT(*) as recommend_pct \
               FROM {table} WHERE item_type IS NOT NULL GROUP BY item_type \
             ), \
             company_stats AS ( \
               SELECT company_name, COUNT(*) as review_count, AVG(rating) as avg_rating, \
                      ROW_NUMBER() OVER (ORDER BY AVG(rating) DESC, COUNT(*) DESC) as rn \
               FROM {table} WHERE company_name IS NOT NULL GROUP BY company_name \
             ), \
             traveler_stats AS ( \
               SELECT traveler_type, COUNT(*) as count, AVG(rating) as avg_rating \
               FROM {table} WHERE traveler_type IS NOT NULL GROUP BY traveler_type \
             ), \
             sentiment_stats AS ( \
               SELECT CASE \
                        WHEN rating >= 4 THEN 'Positive' \
                        WHEN rating = 3 THEN 'Neutral' \
                        ELSE 'Negative' END as sentiment, \
                      COUNT(*) as count \
               FROM {table} WHERE rating IS NOT NULL GROUP BY sentiment \
             ), \
             overall_stats AS ( \
               SELECT COUNT(*) as total_reviews, AVG(rating) as avg_rating, \
                      SUM(CASE WHEN verified_purchase = true THEN 1 ELSE 0 END) * 100.0 / COUNT(*) as verified_pct, \
                      SUM(CASE WHEN would_recommend = true THEN 1 ELSE 0 END) * 100.0 / COUNT(*) as recommend_pct \
               FROM {table} \
             ) \
             SELECT 'ratings' as stat_type, CAST(rating as STRING) as name, count, avg_helpful, \
                    NULL as review_count, NULL as avg_rating, NULL as recommend_pct, \
                    NULL as item_type, NULL as company_name, NULL as traveler_type, \
                    NULL as sentiment, NULL as total_reviews, NULL as verified_pct \
             FROM rating_dist \
             UNION ALL \
             SELECT 'item_types', NULL, NULL, NULL, review_count, avg_rating, recommend_pct, \
                    item_type, NULL, NULL, NULL, NULL, NULL \
             FROM item_type_stats \
             UNION ALL \
             SELECT 'companies', NULL, NULL, NULL, review_count, avg_rating, NULL, NULL, \
                    company_name, NULL, NULL, NULL, NULL \
             FROM company_stats WHERE rn <= 10 \
             UNION ALL \
             SELECT 'travelers', NULL, NULL, NULL, count, avg_rating, NULL, NULL, NULL, \
                    traveler_type, NULL, NULL, NULL \
             FROM traveler_stats \
             UNION ALL \
             SELECT 'sentiment', NULL, NULL, NULL, count, NULL, NULL, NULL, NULL, NULL, \
                    sentiment, NULL, NULL \
             FROM sentiment_stats \
             UNION ALL \
             SELECT 'overall', NULL, NULL, NULL, NULL, avg_rating, recommend_pct, NULL, NULL, \
                    NULL, NULL, total_reviews, verified_pct \
             FROM overall_stats"
        )
    }
}
