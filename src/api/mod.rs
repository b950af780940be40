// ============================================================================
// Module : api
// ============================================================================
// Client de l'API eSett OpenData, normalisation des réponses et cache
// ============================================================================

pub mod cache;  // Mémoïsation par requête
pub mod error;  // Erreurs Transport / Schema
pub mod esett;  // Client HTTP + normalisation JSON

use std::future::Future;

use crate::models::{PriceQuery, PriceTable};

// Re-export des éléments principaux
pub use cache::CachedSource;
pub use error::{FetchError, SchemaError};
pub use esett::{parse_prices, EsettClient, DEFAULT_API_URL};

/// Une source de tables de prix
///
/// CONCEPT RUST : trait comme point de découplage
/// - EsettClient : la vraie API HTTP
/// - Les tests utilisent une source factice (pas de réseau)
/// - CachedSource enveloppe n'importe quelle implémentation
pub trait PriceSource {
    fn fetch_prices(
        &self,
        query: &PriceQuery,
    ) -> impl Future<Output = Result<PriceTable, FetchError>> + Send;
}
