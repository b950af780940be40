// ============================================================================
// Cache des résultats de fetch
// ============================================================================
// Mémoïsation pure : PriceQuery -> Arc<PriceTable>
//
// CONCEPTS RUST :
// 1. Généricité : CachedSource<S> enveloppe n'importe quelle PriceSource
// 2. Arc : la table est partagée sans copie entre le cache et la session
// 3. moka : cache concurrent, pas de Mutex à gérer nous-mêmes
//
// Les entrées ne sont jamais modifiées après insertion. Deux requêtes
// identiques simultanées peuvent toutes les deux aller sur le réseau, mais
// produisent la même valeur.
// ============================================================================

use std::sync::Arc;

use moka::future::Cache;
use tracing::debug;

use crate::api::{FetchError, PriceSource};
use crate::models::{PriceQuery, PriceTable};

/// Nombre de requêtes distinctes gardées en mémoire
const CACHE_CAPACITY: u64 = 64;

/// Source de prix avec cache par (start, end, area)
pub struct CachedSource<S> {
    inner: S,
    cache: Cache<PriceQuery, Arc<PriceTable>>,
}

impl<S: PriceSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        let cache = Cache::builder().max_capacity(CACHE_CAPACITY).build();
        Self { inner, cache }
    }

    /// Retourne la table en cache, ou la récupère depuis la source
    ///
    /// Seuls les succès sont mis en cache : une erreur laisse l'utilisateur
    /// relancer la même requête.
    pub async fn fetch(&self, query: &PriceQuery) -> Result<Arc<PriceTable>, FetchError> {
        if let Some(table) = self.cache.get(query).await {
            debug!(mba = %query.area.code(), records = table.len(), "Cache hit");
            return Ok(table);
        }

        debug!(mba = %query.area.code(), "Cache miss, fetching from source");
        let table = Arc::new(self.inner.fetch_prices(query).await?);
        self.cache.insert(*query, Arc::clone(&table)).await;
        Ok(table)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SchemaError;
    use crate::models::{Area, PriceRecord};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source factice qui compte les appels
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceSource for CountingSource {
        async fn fetch_prices(&self, query: &PriceQuery) -> Result<PriceTable, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SchemaError::MissingTimestamp.into());
            }
            Ok(PriceTable::from_records(vec![PriceRecord::new(
                query.start,
                query.area.code(),
            )]))
        }
    }

    fn query(area: Area) -> PriceQuery {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceQuery::for_dates(day, day, area)
    }

    #[tokio::test]
    async fn test_identical_query_hits_cache() {
        let source = CachedSource::new(CountingSource::new(false));

        let first = source.fetch(&query(Area::Se1)).await.unwrap();
        let second = source.fetch(&query(Area::Se1)).await.unwrap();

        assert_eq!(source.inner().calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_different_query_misses_cache() {
        let source = CachedSource::new(CountingSource::new(false));

        source.fetch(&query(Area::Se1)).await.unwrap();
        let other = source.fetch(&query(Area::No3)).await.unwrap();

        assert_eq!(source.inner().calls(), 2);
        assert_eq!(other.records()[0].mba, "NO3");
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = CachedSource::new(CountingSource::new(true));

        assert!(source.fetch(&query(Area::Dk1)).await.is_err());
        assert!(source.fetch(&query(Area::Dk1)).await.is_err());

        assert_eq!(source.inner().calls(), 2);
    }
}
