// ============================================================================
// Erreurs du client API
// ============================================================================
// Deux familles d'erreurs, toutes terminales pour la tentative en cours :
// - Transport : réseau, timeout, statut HTTP non-2xx
// - Schema : la réponse ne ressemble pas à ce qu'on attend
//
// Une réponse vide n'est PAS une erreur : on renvoie une table vide.
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - #[from] génère les conversions pour l'opérateur ?
// ============================================================================

use thiserror::Error;

/// Erreur lors de la récupération des prix
#[derive(Debug, Error)]
pub enum FetchError {
    /// Échec réseau ou statut HTTP d'erreur
    #[error("échec de la requête vers l'API eSett : {0}")]
    Transport(#[from] reqwest::Error),

    /// Réponse au format inattendu
    #[error("format de réponse inattendu : {0}")]
    Schema(#[from] SchemaError),
}

/// Détail d'une erreur de format
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Aucun objet ne porte `timestamp` ni `timestampUTC`
    #[error("aucune colonne timestamp dans la réponse (ni `timestamp`, ni `timestampUTC`)")]
    MissingTimestamp,

    /// Le corps n'est pas du JSON valide
    #[error("JSON invalide : {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Le corps est du JSON mais pas un tableau
    #[error("un tableau JSON était attendu, reçu : {0}")]
    NotAnArray(&'static str),
}

impl FetchError {
    /// Conseil affiché à l'utilisateur sous le message d'erreur
    pub fn hint(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => {
                "Certaines zones n'ont pas de données pour toutes les périodes. \
                 Réessayez ([f]) ou ajustez les dates / la zone."
            }
            FetchError::Schema(_) => {
                "Le format de réponse peut différer pour cette zone. \
                 Essayez une autre zone ou une autre période."
            }
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, FetchError::Schema(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_conversion() {
        let err: FetchError = SchemaError::MissingTimestamp.into();
        assert!(err.is_schema());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("timestampUTC"));
        assert!(err.hint().contains("zone"));
    }
}
