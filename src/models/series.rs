// ============================================================================
// Enum : PriceSeries
// ============================================================================
// Les six séries affichables (cases à cocher de l'interface)
// ============================================================================

use ratatui::style::Color;

/// Une série de prix (ou l'indicateur de direction) de l'API eSett
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceSeries {
    ImbalanceSales,
    ImbalancePurchase,
    UpRegulation,
    DownRegulation,
    SpotDifference,
    /// Indicateur catégoriel -1/0/1, tracé sur son propre axe
    MainDirection,
}

impl PriceSeries {
    /// Ordre des cases à cocher (touches 1 à 6)
    pub const ALL: [PriceSeries; 6] = [
        PriceSeries::ImbalanceSales,
        PriceSeries::ImbalancePurchase,
        PriceSeries::UpRegulation,
        PriceSeries::DownRegulation,
        PriceSeries::SpotDifference,
        PriceSeries::MainDirection,
    ];

    /// Nom de la colonne côté API et CSV
    pub fn column(&self) -> &'static str {
        match self {
            PriceSeries::ImbalanceSales => "imblSalesPrice",
            PriceSeries::ImbalancePurchase => "imblPurchasePrice",
            PriceSeries::UpRegulation => "upRegPrice",
            PriceSeries::DownRegulation => "downRegPrice",
            PriceSeries::SpotDifference => "imblSpotDifferencePrice",
            PriceSeries::MainDirection => "mainDirRegPowerPerMBA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceSeries::ImbalanceSales => "Imbalance Sales Price",
            PriceSeries::ImbalancePurchase => "Imbalance Purchase Price",
            PriceSeries::UpRegulation => "Up Regulation Price",
            PriceSeries::DownRegulation => "Down Regulation Price",
            PriceSeries::SpotDifference => "Imbalance Spot Difference",
            PriceSeries::MainDirection => "Main Direction Regulation Power",
        }
    }

    /// Couleur de la courbe dans le graphique
    pub fn color(&self) -> Color {
        match self {
            PriceSeries::ImbalanceSales => Color::Rgb(0x00, 0xf9, 0x00),
            PriceSeries::ImbalancePurchase => Color::Rgb(0xa2, 0x3b, 0x72),
            PriceSeries::UpRegulation => Color::Rgb(0xf1, 0x8f, 0x01),
            PriceSeries::DownRegulation => Color::Rgb(0x24, 0xbf, 0x72),
            PriceSeries::SpotDifference => Color::Rgb(0x6a, 0x99, 0x4e),
            PriceSeries::MainDirection => Color::Rgb(0x8b, 0x45, 0x13),
        }
    }

    /// Case cochée au démarrage
    pub fn default_visible(&self) -> bool {
        !matches!(self, PriceSeries::SpotDifference | PriceSeries::MainDirection)
    }

    /// Vrai pour les séries exprimées en €/MWh
    pub fn is_price(&self) -> bool {
        !matches!(self, PriceSeries::MainDirection)
    }

    /// Série associée à une touche '1'..'6'
    pub fn from_digit(c: char) -> Option<PriceSeries> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        Self::ALL.get(index).copied()
    }
}
