// ============================================================================
// Structure : PriceQuery
// ============================================================================
// Paramètres d'une requête de prix : bornes temporelles + zone
// Sert aussi de clé pour le cache des résultats
// ============================================================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Area;

/// Format ISO-8601 attendu par l'API (millisecondes + 'Z' littéral)
const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Requête de prix pour une zone et une plage de temps
///
/// CONCEPT RUST : Hash + Eq
/// - Permet d'utiliser PriceQuery comme clé de cache
/// - Deux requêtes identiques (start, end, area) ont la même clé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub area: Area,
}

impl PriceQuery {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, area: Area) -> Self {
        Self { start, end, area }
    }

    /// Étend deux dates calendaires en journées complètes
    ///
    /// - start : 00:00:00.000 du premier jour
    /// - end   : 23:59:59.999 du dernier jour
    pub fn for_dates(start: NaiveDate, end: NaiveDate, area: Area) -> Self {
        let day_end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(day_end),
            area,
        }
    }

    /// Borne de début au format de l'API (ex: "2024-01-01T00:00:00.000Z")
    pub fn start_param(&self) -> String {
        self.start.format(API_DATETIME_FORMAT).to_string()
    }

    /// Borne de fin au format de l'API (ex: "2024-01-31T23:59:59.999Z")
    pub fn end_param(&self) -> String {
        self.end.format(API_DATETIME_FORMAT).to_string()
    }

    /// Paramètres de requête HTTP (start, end, mba)
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("start", self.start_param()),
            ("end", self.end_param()),
            ("mba", self.area.code().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_for_dates_expands_full_days() {
        let query = PriceQuery::for_dates(date(2024, 1, 1), date(2024, 1, 31), Area::Se3);

        assert_eq!(query.start_param(), "2024-01-01T00:00:00.000Z");
        assert_eq!(query.end_param(), "2024-01-31T23:59:59.999Z");
    }

    #[test]
    fn test_query_params_use_area_code() {
        let query = PriceQuery::for_dates(date(2024, 3, 1), date(2024, 3, 1), Area::Fi);
        let params = query.query_params();

        assert_eq!(params[0], ("start", "2024-03-01T00:00:00.000Z".to_string()));
        assert_eq!(params[1], ("end", "2024-03-01T23:59:59.999Z".to_string()));
        assert_eq!(params[2], ("mba", "10YFI_1________U".to_string()));
    }

    #[test]
    fn test_same_parameters_same_key() {
        let a = PriceQuery::for_dates(date(2024, 1, 1), date(2024, 1, 2), Area::No1);
        let b = PriceQuery::for_dates(date(2024, 1, 1), date(2024, 1, 2), Area::No1);
        let c = PriceQuery::for_dates(date(2024, 1, 1), date(2024, 1, 2), Area::No2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
