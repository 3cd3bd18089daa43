use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRcpJ7af2Qox1haajC9iKrxDaWmtQ8fBmrICAnDqlMYoFHyi_32ebtSNz_6eKRHZkSb97RQeTscwnkf/pub?output=csv";

/// Top-level settings: where the inputs live and how their columns are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Village polygons (.shp with .dbf/.shx/.prj beside it).
    pub shapefile: PathBuf,
    /// Village id field in the shapefile attribute table.
    pub shapefile_key: String,
    /// Published sheet, either an http(s) URL or a local CSV path.
    pub sheet: String,
    pub schema: Schema,
    pub map: MapSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shapefile: PathBuf::from("Villages_Guntur.shp"),
            shapefile_key: "id".to_string(),
            sheet: DEFAULT_SHEET_URL.to_string(),
            schema: Schema::default(),
            map: MapSettings::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open config file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse config file: {}", path.display()))
    }
}

/// A tracked party: its raw count column and its per-village share column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub votes: String,
    pub share: String,
}

impl Party {
    pub fn new(name: &str, votes: &str, share: &str) -> Self {
        Self { name: name.to_string(), votes: votes.to_string(), share: share.to_string() }
    }

    /// Column holding the share recomputed from summed counts.
    pub fn aggregate_share(&self) -> String { format!("{}_share", self.name) }
}

/// Column names of the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub key: String,
    pub village: String,
    pub subdistrict: String,
    pub district: String,
    pub ac: String,
    pub dummy_ac: String,
    pub total_votes: String,
    pub parties: Vec<Party>,
    pub demographics: Vec<String>,
    pub demographic_suffix: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            key: "region_code".to_string(),
            village: "village_name".to_string(),
            subdistrict: "subdistrict".to_string(),
            district: "district".to_string(),
            ac: "AC_name".to_string(),
            dummy_ac: "dummy_ac".to_string(),
            total_votes: "total_votes".to_string(),
            parties: vec![
                Party::new("TDP", "TDP_votes", "TDP_vote_share"),
                Party::new("YSRCP", "YSRCP_votes", "YSRCP_vote_share"),
                Party::new("BJP", "BJP_votes", "BJP_vote_share"),
                Party::new("Others", "Others_votes", "Others"),
            ],
            demographics: ["SC_pct", "ST_pct", "OBC_pct", "BC_pct", "OC_pct", "Minority_pct"]
                .into_iter().map(String::from).collect(),
            demographic_suffix: "_pct".to_string(),
        }
    }
}

impl Schema {
    /// Descriptive text columns other than the key, in display order.
    pub fn text_columns(&self) -> [&str; 5] {
        [
            self.village.as_str(),
            self.subdistrict.as_str(),
            self.district.as_str(),
            self.ac.as_str(),
            self.dummy_ac.as_str(),
        ]
    }

    /// Columns coerced to numbers: total, party counts, party shares.
    pub fn vote_columns(&self) -> Vec<&str> {
        std::iter::once(self.total_votes.as_str())
            .chain(self.parties.iter().map(|p| p.votes.as_str()))
            .chain(self.parties.iter().map(|p| p.share.as_str()))
            .collect()
    }

    pub fn share_columns(&self) -> Vec<&str> {
        self.parties.iter().map(|p| p.share.as_str()).collect()
    }

    /// Demographic fields of a sheet with the given columns: configured ones
    /// that are present, then any other column carrying the percentage suffix.
    pub fn detect_demographics<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let columns = columns.into_iter().collect::<Vec<_>>();
        let reserved = self.vote_columns();

        let mut found = self.demographics.iter()
            .filter(|c| columns.contains(&c.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if !self.demographic_suffix.is_empty() {
            for &column in &columns {
                if column.ends_with(&self.demographic_suffix)
                    && !reserved.contains(&column)
                    && !found.iter().any(|f| f == column)
                {
                    found.push(column.to_string());
                }
            }
        }
        found
    }
}

/// Presentation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Default map center as [lat, lon].
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: String,
    /// Village rows shown in the summary table.
    pub summary_rows: usize,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self { center: [16.3, 80.5], zoom: 9, tiles: "OpenStreetMap".to_string(), summary_rows: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "shapefile_key": "VIL_ID", "schema": { "key": "code" } }"#).unwrap();
        assert_eq!(config.shapefile_key, "VIL_ID");
        assert_eq!(config.schema.key, "code");
        assert_eq!(config.schema.total_votes, "total_votes");
        assert_eq!(config.schema.parties.len(), 4);
        assert_eq!(config.map.summary_rows, 200);
    }

    #[test]
    fn demographics_follow_config_order_then_suffix() {
        let schema = Schema::default();
        let found = schema.detect_demographics(
            ["region_code", "Kapu_pct", "OC_pct", "SC_pct", "total_votes", "TDP_vote_share"]
        );
        assert_eq!(found, vec!["SC_pct", "OC_pct", "Kapu_pct"]);
    }

    #[test]
    fn others_share_column_is_not_a_suffix_match() {
        let mut schema = Schema::default();
        schema.parties[3].share = "Others_pct".to_string();
        let found = schema.detect_demographics(["Others_pct", "ST_pct"]);
        assert_eq!(found, vec!["ST_pct"]);
    }
}
