// Vendor prefixes: registry file loading, download and per-MAC lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use mac_oui::Oui as OuiDb;
use regex::Regex;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use switchgrasp_entity::{oui, UNKNOWN_OUI};

const INSERT_CHUNK: usize = 500;

/// Prefix to `oui.idx_oui`, backed by the `oui` table and the `mac_oui`
/// built-in registry for prefixes the table does not know yet.
pub(crate) struct OuiTable {
    known: RwLock<HashMap<String, i32>>,
    builtin: Option<OuiDb>,
}

/// Parse `oui.txt` style registry text into `(prefix, organization)` pairs.
///
/// Accepts the IEEE `00-00-0C   (hex)   Cisco` and `00000C   (base 16)`
/// forms as well as bare `00000c Cisco` lines.
pub(crate) fn parse_registry(text: &str) -> Result<Vec<(String, String)>, regex::Error> {
    let re = Regex::new(
        r"^\s*([0-9A-Fa-f]{2})[-:]?([0-9A-Fa-f]{2})[-:]?([0-9A-Fa-f]{2})\s+(?:\((?:hex|base 16)\)\s*)?(\S.*?)\s*$",
    )?;
    let mut seen = HashMap::new();
    for line in text.lines() {
        if let Some(captures) = re.captures(line) {
            let prefix =
                format!("{}{}{}", &captures[1], &captures[2], &captures[3]).to_lowercase();
            seen.entry(prefix)
                .or_insert_with(|| captures[4].to_string());
        }
    }
    let mut entries: Vec<(String, String)> = seen.into_iter().collect();
    entries.sort();
    Ok(entries)
}

// Download OUI registry file to specified path.
async fn download_file(url: &str, path: &Path) -> Result<()> {
    info!("Downloading new oui database from: {}", url);
    let body = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()?
        .text()
        .await?;
    info!("Download complete, writing to file: {:?}", path);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

async fn store(db: &DatabaseConnection, entries: &[(String, String)]) -> Result<(), DbErr> {
    for chunk in entries.chunks(INSERT_CHUNK) {
        let rows = chunk.iter().map(|(prefix, organization)| oui::ActiveModel {
            oui: Set(prefix.clone()),
            organization: Set(organization.clone()),
            enabled: Set(true),
            ..Default::default()
        });
        oui::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::column(oui::Column::Oui)
                    .update_column(oui::Column::Organization)
                    .to_owned(),
            )
            .exec(db)
            .await?;
    }
    Ok(())
}

impl OuiTable {
    /// Load the registry file (downloading it first if it is missing and a
    /// URL is configured) into the `oui` table, then cache the table.
    pub(crate) async fn load(
        db: &DatabaseConnection,
        file: Option<&Path>,
        url: Option<&str>,
    ) -> Result<Self> {
        if let Some(file) = file {
            if !file.exists() {
                if let Some(url) = url {
                    download_file(url, file).await?;
                }
            }
            if file.exists() {
                let text = tokio::fs::read_to_string(file)
                    .await
                    .with_context(|| format!("reading {:?}", file))?;
                let entries = parse_registry(&text)?;
                info!("loading {} oui entries from {:?}", entries.len(), file);
                store(db, &entries).await?;
            } else {
                warn!("oui file {:?} not found", file);
            }
        }

        let known = oui::Entity::find()
            .filter(oui::Column::IdxOui.ne(UNKNOWN_OUI))
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.oui, row.idx_oui))
            .collect();

        let builtin = match OuiDb::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("built-in oui database unavailable: {}", e);
                None
            }
        };

        Ok(OuiTable {
            known: RwLock::new(known),
            builtin,
        })
    }

    fn cached(&self, prefix: &str) -> Option<i32> {
        self.known.read().ok()?.get(prefix).copied()
    }

    fn builtin_organization(&self, mac: &str) -> Option<String> {
        let builtin = self.builtin.as_ref()?;
        let colons = mac
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>()
            .join(":");
        match builtin.lookup_by_mac(&colons) {
            Ok(Some(entry)) => Some(entry.company_name.to_string()),
            Ok(None) => None,
            Err(e) => {
                debug!("OUI lookup error for {}: {}", mac, e);
                None
            }
        }
    }

    /// `idx_oui` for a MAC, or the "unknown" row.
    pub(crate) async fn lookup(&self, db: &DatabaseConnection, mac: &str) -> i32 {
        let Some(prefix) = mac.get(..6).map(str::to_lowercase) else {
            return UNKNOWN_OUI;
        };
        if let Some(idx) = self.cached(&prefix) {
            return idx;
        }
        let Some(organization) = self.builtin_organization(mac) else {
            return UNKNOWN_OUI;
        };

        let stored = async {
            store(db, &[(prefix.clone(), organization)]).await?;
            oui::Entity::find()
                .filter(oui::Column::Oui.eq(prefix.as_str()))
                .one(db)
                .await
        }
        .await;
        match stored {
            Ok(Some(row)) => {
                if let Ok(mut known) = self.known.write() {
                    known.insert(prefix, row.idx_oui);
                }
                row.idx_oui
            }
            Ok(None) => UNKNOWN_OUI,
            Err(e) => {
                warn!("failed to store oui {}: {}", prefix, e);
                UNKNOWN_OUI
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    const REGISTRY: &str = "OUI/MA-L                                                    Organization
company_id                                                  Organization
                                                            Address

00-00-0C   (hex)\t\tCisco Systems, Inc
00000C     (base 16)\t\tCisco Systems, Inc
\t\t\t\t170 WEST TASMAN DRIVE

28-C7-CE   (hex)\t\tCisco Systems, Inc
a4bb6d Dell Inc.
";

    #[test]
    fn parses_ieee_and_bare_lines() {
        let entries = parse_registry(REGISTRY).unwrap();
        assert_eq!(
            entries,
            vec![
                ("00000c".to_string(), "Cisco Systems, Inc".to_string()),
                ("28c7ce".to_string(), "Cisco Systems, Inc".to_string()),
                ("a4bb6d".to_string(), "Dell Inc.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn registry_file_is_loaded_into_the_table() {
        let (dir, db) = test_connection().await;
        let file = dir.path().join("oui.txt");
        std::fs::write(&file, REGISTRY).unwrap();

        let table = OuiTable::load(&db, Some(&file), None).await.unwrap();
        let cisco = table.lookup(&db, "00000c123456").await;
        assert_ne!(cisco, UNKNOWN_OUI);
        let row = oui::Entity::find_by_id(cisco).one(&db).await.unwrap().unwrap();
        assert_eq!(row.organization, "Cisco Systems, Inc");

        // Loading twice keeps one row per prefix.
        OuiTable::load(&db, Some(&file), None).await.unwrap();
        let rows = oui::Entity::find()
            .filter(oui::Column::Oui.eq("00000c"))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        assert_eq!(table.lookup(&db, "bad").await, UNKNOWN_OUI);
    }
}
