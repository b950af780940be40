// ============================================================================
// Enum : Area (Market Balance Area)
// ============================================================================
// Zones de règlement géographiques acceptées par l'API eSett (paramètre `mba`)
//
// CONCEPTS RUST :
// 1. Enum fermé : la liste des zones est connue à la compilation
// 2. &'static str : labels et codes stockés dans le binaire
// 3. FromStr : parsing depuis la ligne de commande
// ============================================================================

use std::fmt;
use std::str::FromStr;

/// Zone de marché (MBA) supportée par l'API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Area {
    #[default]
    Se1,
    Se2,
    Se3,
    Se4,
    Fi,
    No1,
    No2,
    No3,
    No4,
    No5,
    Dk1,
    Dk2,
}

impl Area {
    /// Toutes les zones, dans l'ordre d'affichage du sélecteur
    pub const ALL: [Area; 12] = [
        Area::Se1,
        Area::Se2,
        Area::Se3,
        Area::Se4,
        Area::Fi,
        Area::No1,
        Area::No2,
        Area::No3,
        Area::No4,
        Area::No5,
        Area::Dk1,
        Area::Dk2,
    ];

    /// Code envoyé à l'API (paramètre `mba`)
    ///
    /// La Finlande est identifiée par son code EIC, pas par "FI"
    pub fn code(&self) -> &'static str {
        match self {
            Area::Se1 => "SE1",
            Area::Se2 => "SE2",
            Area::Se3 => "SE3",
            Area::Se4 => "SE4",
            Area::Fi => "10YFI_1________U",
            Area::No1 => "NO1",
            Area::No2 => "NO2",
            Area::No3 => "NO3",
            Area::No4 => "NO4",
            Area::No5 => "NO5",
            Area::Dk1 => "DK1",
            Area::Dk2 => "DK2",
        }
    }

    /// Label pour l'affichage (et pour le nom du fichier CSV)
    pub fn label(&self) -> &'static str {
        match self {
            Area::Se1 => "SE1 (Luleå)",
            Area::Se2 => "SE2 (Sundsvall)",
            Area::Se3 => "SE3 (Stockholm)",
            Area::Se4 => "SE4 (Malmö)",
            Area::Fi => "FI (Finland)",
            Area::No1 => "NO1 (Oslo)",
            Area::No2 => "NO2 (Kristiansand)",
            Area::No3 => "NO3 (Trondheim)",
            Area::No4 => "NO4 (Tromsø)",
            Area::No5 => "NO5 (Bergen)",
            Area::Dk1 => "DK1 (West Denmark)",
            Area::Dk2 => "DK2 (East Denmark)",
        }
    }

    /// Nom court (ex: "SE1", "FI")
    pub fn short_name(&self) -> &'static str {
        match self {
            Area::Fi => "FI",
            other => other.code(),
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(0)
    }

    /// Zone suivante (cycle)
    pub fn next(&self) -> Area {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Zone précédente (cycle)
    pub fn previous(&self) -> Area {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Erreur de parsing d'une zone inconnue
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("zone inconnue : {0} (attendu : SE1-SE4, FI, NO1-NO5, DK1, DK2)")]
pub struct UnknownArea(pub String);

impl FromStr for Area {
    type Err = UnknownArea;

    /// Accepte le nom court ("se3", "FI") ou le code API ("10YFI_1________U")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|area| {
                area.short_name().eq_ignore_ascii_case(wanted) || area.code() == wanted
            })
            .ok_or_else(|| UnknownArea(s.to_string()))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finland_uses_eic_code() {
        assert_eq!(Area::Fi.code(), "10YFI_1________U");
        assert_eq!(Area::Fi.short_name(), "FI");
        assert_eq!(Area::Se3.code(), "SE3");
    }

    #[test]
    fn test_area_cycle() {
        assert_eq!(Area::Se1.next(), Area::Se2);
        assert_eq!(Area::Dk2.next(), Area::Se1);
        assert_eq!(Area::Se1.previous(), Area::Dk2);
        assert_eq!(Area::Fi.previous(), Area::Se4);
    }

    #[test]
    fn test_area_from_str() {
        assert_eq!("se3".parse::<Area>(), Ok(Area::Se3));
        assert_eq!("FI".parse::<Area>(), Ok(Area::Fi));
        assert_eq!("10YFI_1________U".parse::<Area>(), Ok(Area::Fi));
        assert!("XX9".parse::<Area>().is_err());
    }

    #[test]
    fn test_default_area_is_first() {
        assert_eq!(Area::default(), Area::ALL[0]);
    }
}
