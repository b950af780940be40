// ============================================================================
// Configuration : ligne de commande
// ============================================================================
// CONCEPTS RUST :
// 1. clap derive : la structure Cli décrit les arguments
// 2. FromStr : Area et NaiveDate sont parsés directement par clap
// 3. Séparation Cli (brut) / Config (validé, valeurs par défaut résolues)
// ============================================================================

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Days, NaiveDate};
use clap::Parser;

use crate::api::DEFAULT_API_URL;
use crate::models::Area;

/// Nombre de jours affichés par défaut (fin = aujourd'hui)
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Visualiseur des prix de déséquilibre et de régulation eSett
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Zone de marché (SE1-SE4, FI, NO1-NO5, DK1, DK2)
    #[arg(long, default_value = "SE1")]
    pub area: Area,

    /// Date de début (YYYY-MM-DD), par défaut 30 jours avant la date de fin
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Date de fin (YYYY-MM-DD), par défaut aujourd'hui
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// URL de l'endpoint des prix
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Répertoire où sont écrits les exports CSV
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Répertoire des fichiers de logs
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Configuration validée de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub area: Area,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub api_url: String,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Résout les valeurs par défaut et valide la plage de dates
    ///
    /// `today` est passé en paramètre pour rendre la fonction testable
    pub fn from_cli(cli: Cli, today: NaiveDate) -> Result<Self> {
        let end = cli.end.unwrap_or(today);
        if end > today {
            bail!("la date de fin {} est dans le futur (aujourd'hui : {})", end, today);
        }

        let start = match cli.start {
            Some(start) => start,
            None => default_start(end),
        };
        if start > end {
            bail!("la date de début {} est après la date de fin {}", start, end);
        }

        Ok(Self {
            area: cli.area,
            start,
            end,
            api_url: cli.api_url,
            export_dir: cli.export_dir,
            log_dir: cli.log_dir.unwrap_or_else(default_log_dir),
        })
    }
}

/// Date de début par défaut : 30 jours avant la fin
pub fn default_start(end: NaiveDate) -> NaiveDate {
    end.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// Répertoire de logs par défaut
///
/// - Linux : ~/.local/share/esett-viewer/logs
/// - macOS : ~/Library/Application Support/esett-viewer/logs
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("esett-viewer").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
