// ============================================================================
// Structures : PriceRecord et PriceTable
// ============================================================================
// Une ligne de prix eSett (un intervalle pour une zone) et la table ordonnée
// produite par un fetch
//
// CONCEPTS RUST :
// 1. NaiveDateTime : date/heure SANS fuseau (le décalage UTC+2 est déjà appliqué)
// 2. Option<f64> : l'API peut renvoyer null pour un prix
// 3. Invariants portés par le constructeur : tri + unicité des timestamps
// ============================================================================

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::models::PriceSeries;

/// Format des timestamps dans l'export CSV et l'affichage
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Une ligne de prix pour un intervalle donné
///
/// CONCEPT RUST : #[serde(rename = "...")]
/// - Les noms de colonnes CSV reprennent exactement ceux de l'API
/// - Les champs Rust restent en snake_case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    /// Heure locale UTC+2, sans information de fuseau
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,

    /// Code de zone tel que renvoyé par l'API
    pub mba: String,

    #[serde(rename = "imblSalesPrice")]
    pub imbalance_sales_price: Option<f64>,

    #[serde(rename = "imblPurchasePrice")]
    pub imbalance_purchase_price: Option<f64>,

    #[serde(rename = "upRegPrice")]
    pub up_regulation_price: Option<f64>,

    #[serde(rename = "downRegPrice")]
    pub down_regulation_price: Option<f64>,

    #[serde(rename = "imblSpotDifferencePrice")]
    pub spot_difference_price: Option<f64>,

    /// Direction principale de régulation, valeur brute de l'API
    /// (en pratique -1 bas, 0 neutre, 1 haut)
    #[serde(rename = "mainDirRegPowerPerMBA")]
    pub main_direction: Option<f64>,
}

impl PriceRecord {
    /// Crée une ligne sans aucune valeur de prix
    pub fn new(timestamp: NaiveDateTime, mba: impl Into<String>) -> Self {
        Self {
            timestamp,
            mba: mba.into(),
            imbalance_sales_price: None,
            imbalance_purchase_price: None,
            up_regulation_price: None,
            down_regulation_price: None,
            spot_difference_price: None,
            main_direction: None,
        }
    }

    /// Valeur de la série demandée pour cette ligne
    pub fn value(&self, series: PriceSeries) -> Option<f64> {
        match series {
            PriceSeries::ImbalanceSales => self.imbalance_sales_price,
            PriceSeries::ImbalancePurchase => self.imbalance_purchase_price,
            PriceSeries::UpRegulation => self.up_regulation_price,
            PriceSeries::DownRegulation => self.down_regulation_price,
            PriceSeries::SpotDifference => self.spot_difference_price,
            PriceSeries::MainDirection => self.main_direction,
        }
    }
}

fn serialize_timestamp<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Table de prix triée par timestamp croissant
///
/// CONCEPT : Invariant garanti par construction
/// - Le champ records est privé
/// - Le seul constructeur (from_records) trie et dédoublonne
/// - Les consommateurs n'ont qu'un accès en lecture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    records: Vec<PriceRecord>,
}

impl PriceTable {
    /// Table vide (réponse valide sans données)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construit une table à partir de lignes dans un ordre quelconque
    ///
    /// Le tri est stable : pour un même timestamp, la première ligne reçue
    /// est conservée et les suivantes sont écartées.
    pub fn from_records(mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|record| record.timestamp);
        records.dedup_by_key(|record| record.timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    /// Les `n` dernières lignes (toute la table si elle est plus courte)
    pub fn tail(&self, n: usize) -> &[PriceRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Premier et dernier timestamp de la table
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Moyenne arithmétique d'une série, valeurs manquantes ignorées
    ///
    /// CONCEPT RUST : fold sur un itérateur filtré
    /// - filter_map() garde uniquement les Some
    /// - Un seul passage pour la somme et le compte
    pub fn mean(&self, series: PriceSeries) -> Option<f64> {
        let (sum, count) = self
            .records
            .iter()
            .filter_map(|record| record.value(series))
            .filter(|value| value.is_finite())
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Minimum et maximum d'un ensemble de séries (pour les bornes du graphique)
    pub fn value_bounds(&self, series: &[PriceSeries]) -> Option<(f64, f64)> {
        self.records
            .iter()
            .flat_map(|record| series.iter().filter_map(move |s| record.value(*s)))
            .filter(|value| value.is_finite())
            .fold(None, |bounds, value| match bounds {
                None => Some((value, value)),
                Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            })
    }
}

impl<'a> IntoIterator for &'a PriceTable {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(hour: u32, sales: Option<f64>) -> PriceRecord {
        let mut record = PriceRecord::new(at(hour), "SE1");
        record.imbalance_sales_price = sales;
        record
    }

    #[test]
    fn test_from_records_sorts_by_timestamp() {
        let table = PriceTable::from_records(vec![
            record(5, Some(1.0)),
            record(2, Some(2.0)),
            record(9, Some(3.0)),
        ]);

        let hours: Vec<NaiveDateTime> = table.iter().map(|r| r.timestamp).collect();
        assert_eq!(hours, vec![at(2), at(5), at(9)]);
    }

    #[test]
    fn test_from_records_keeps_first_duplicate() {
        let table = PriceTable::from_records(vec![
            record(3, Some(10.0)),
            record(1, Some(1.0)),
            record(3, Some(99.0)),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].imbalance_sales_price, Some(10.0));
    }

    #[test]
    fn test_mean_skips_missing_values() {
        let table = PriceTable::from_records(vec![
            record(0, Some(10.0)),
            record(1, None),
            record(2, Some(20.0)),
        ]);

        assert_eq!(table.mean(PriceSeries::ImbalanceSales), Some(15.0));
        assert_eq!(table.mean(PriceSeries::UpRegulation), None);
    }

    #[test]
    fn test_tail_truncates_to_last_rows() {
        let table = PriceTable::from_records((0..10).map(|h| record(h, None)).collect());

        let tail = table.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].timestamp, at(7));
        assert_eq!(table.tail(100).len(), 10);
    }

    #[test]
    fn test_time_range_and_bounds() {
        let mut high = record(4, Some(-5.0));
        high.up_regulation_price = Some(120.0);
        let table = PriceTable::from_records(vec![record(1, Some(30.0)), high]);

        assert_eq!(table.time_range(), Some((at(1), at(4))));
        assert_eq!(
            table.value_bounds(&[PriceSeries::ImbalanceSales, PriceSeries::UpRegulation]),
            Some((-5.0, 120.0))
        );
        assert_eq!(PriceTable::empty().time_range(), None);
    }

    #[test]
    fn test_main_direction_as_value() {
        let mut r = record(0, None);
        r.main_direction = Some(-1.0);
        assert_eq!(r.value(PriceSeries::MainDirection), Some(-1.0));
    }
}
