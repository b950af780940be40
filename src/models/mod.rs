// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod area;    // Zones de marché (MBA)
pub mod price;   // PriceRecord et PriceTable
pub mod query;   // Paramètres de requête / clé de cache
pub mod series;  // Séries affichables

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use esett_viewer::models::price::PriceTable;
// On peut faire : use esett_viewer::models::PriceTable;
pub use area::{Area, UnknownArea};
pub use price::{PriceRecord, PriceTable, TIMESTAMP_FORMAT};
pub use query::PriceQuery;
pub use series::PriceSeries;
