// ============================================================================
// Export CSV
// ============================================================================
// Sérialise la table COMPLÈTE (pas seulement les 100 lignes affichées)
// avec toutes les colonnes de l'API
//
// CONCEPTS RUST :
// 1. Généricité sur io::Write : écrire dans un fichier ou dans un Vec<u8>
// 2. csv + serde : chaque PriceRecord devient une ligne
// ============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::models::{Area, PriceTable};

/// En-tête du fichier, dans l'ordre des champs de PriceRecord
pub const CSV_HEADER: [&str; 8] = [
    "timestamp",
    "mba",
    "imblSalesPrice",
    "imblPurchasePrice",
    "upRegPrice",
    "downRegPrice",
    "imblSpotDifferencePrice",
    "mainDirRegPowerPerMBA",
];

/// Nom du fichier exporté
///
/// Ex: "esett_prices_SE1 (Luleå)_2024-01-01_2024-01-31.csv"
pub fn csv_file_name(area: Area, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "esett_prices_{}_{}_{}.csv",
        area.label(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// Écrit la table au format CSV dans n'importe quel writer
///
/// L'en-tête est toujours écrit, même pour une table vide.
pub fn write_csv<W: Write>(table: &PriceTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .context("Échec de l'écriture de l'en-tête CSV")?;

    for record in table {
        csv_writer
            .serialize(record)
            .with_context(|| format!("Échec de l'écriture de la ligne {}", record.timestamp))?;
    }

    csv_writer.flush().context("Échec du flush CSV")?;
    Ok(())
}

/// Exporte la table dans `dir` et retourne le chemin du fichier créé
pub fn export_table(
    table: &PriceTable,
    area: Area,
    start: NaiveDate,
    end: NaiveDate,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Échec de la création du répertoire {}", dir.display()))?;

    let path = dir.join(csv_file_name(area, start, end));
    let file = File::create(&path)
        .with_context(|| format!("Échec de la création du fichier {}", path.display()))?;

    write_csv(table, file)?;

    info!(path = %path.display(), records = table.len(), "Exported CSV");
    Ok(path)
}

// ============================================================================
// Tests unitaires
// ============================================================================
