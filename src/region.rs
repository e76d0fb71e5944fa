//! Static wilaya catalog used as the unit of aggregation for order metrics.
//!
//! Codes follow the official two-digit numbering ("01" Adrar .. "58" El Meniaa).
//! A fixed subset of large urban wilayas is flagged high-volume.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One administrative region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    pub high_volume: bool,
}

impl Region {
    pub const fn new(code: &'static str, name: &'static str, high_volume: bool) -> Self {
        Self {
            code,
            name,
            high_volume,
        }
    }
}

/// Codes of the wilayas expected to generate disproportionately more orders.
pub const HIGH_VOLUME_CODES: [&str; 7] = ["16", "31", "25", "19", "09", "06", "23"];

/// (code, name) for all 58 wilayas, in official order.
pub const WILAYAS: [(&str, &str); 58] = [
    ("01", "Adrar"),
    ("02", "Chlef"),
    ("03", "Laghouat"),
    ("04", "Oum El Bouaghi"),
    ("05", "Batna"),
    ("06", "Béjaïa"),
    ("07", "Biskra"),
    ("08", "Béchar"),
    ("09", "Blida"),
    ("10", "Bouira"),
    ("11", "Tamanrasset"),
    ("12", "Tébessa"),
    ("13", "Tlemcen"),
    ("14", "Tiaret"),
    ("15", "Tizi Ouzou"),
    ("16", "Alger"),
    ("17", "Djelfa"),
    ("18", "Jijel"),
    ("19", "Sétif"),
    ("20", "Saïda"),
    ("21", "Skikda"),
    ("22", "Sidi Bel Abbès"),
    ("23", "Annaba"),
    ("24", "Guelma"),
    ("25", "Constantine"),
    ("26", "Médéa"),
    ("27", "Mostaganem"),
    ("28", "M'Sila"),
    ("29", "Mascara"),
    ("30", "Ouargla"),
    ("31", "Oran"),
    ("32", "El Bayadh"),
    ("33", "Illizi"),
    ("34", "Bordj Bou Arréridj"),
    ("35", "Boumerdès"),
    ("36", "El Tarf"),
    ("37", "Tindouf"),
    ("38", "Tissemsilt"),
    ("39", "El Oued"),
    ("40", "Khenchela"),
    ("41", "Souk Ahras"),
    ("42", "Tipaza"),
    ("43", "Mila"),
    ("44", "Aïn Defla"),
    ("45", "Naâma"),
    ("46", "Aïn Témouchent"),
    ("47", "Ghardaïa"),
    ("48", "Relizane"),
    ("49", "Timimoun"),
    ("50", "Bordj Badji Mokhtar"),
    ("51", "Ouled Djellal"),
    ("52", "Béni Abbès"),
    ("53", "In Salah"),
    ("54", "In Guezzam"),
    ("55", "Touggourt"),
    ("56", "Djanet"),
    ("57", "El M'Ghair"),
    ("58", "El Meniaa"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Empty,
    EmptyCode { index: usize },
    DuplicateCode(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "region catalog is empty"),
            CatalogError::EmptyCode { index } => {
                write!(f, "region at index {} has an empty code", index)
            }
            CatalogError::DuplicateCode(code) => write!(f, "duplicate region code {}", code),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered, validated set of regions. Codes are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>) -> Result<Self, CatalogError> {
        if regions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(regions.len());
        for (index, region) in regions.iter().enumerate() {
            if region.code.trim().is_empty() {
                return Err(CatalogError::EmptyCode { index });
            }
            if !seen.insert(region.code) {
                return Err(CatalogError::DuplicateCode(region.code.to_string()));
            }
        }
        Ok(Self { regions })
    }

    /// The built-in 58-wilaya catalog with the high-volume subset flagged.
    pub fn wilayas() -> Self {
        let regions = WILAYAS
            .iter()
            .map(|&(code, name)| Region::new(code, name, HIGH_VOLUME_CODES.contains(&code)))
            .collect();
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    pub fn high_volume(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.high_volume)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::wilayas()
    }
}

impl<'a> IntoIterator for &'a RegionCatalog {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wilaya_catalog_is_valid() {
        let catalog = RegionCatalog::wilayas();
        assert_eq!(catalog.len(), 58);
        let rebuilt = RegionCatalog::new(catalog.regions().to_vec());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn high_volume_subset_is_flagged() {
        let catalog = RegionCatalog::wilayas();
        let codes: Vec<&str> = catalog.high_volume().map(|r| r.code).collect();
        assert_eq!(codes.len(), HIGH_VOLUME_CODES.len());
        for code in HIGH_VOLUME_CODES {
            assert!(catalog.get(code).unwrap().high_volume, "{} not flagged", code);
        }
        assert!(!catalog.get("01").unwrap().high_volume);
    }

    #[test]
    fn lookup_by_code() {
        let catalog = RegionCatalog::wilayas();
        assert_eq!(catalog.get("16").unwrap().name, "Alger");
        assert!(catalog.get("59").is_none());
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(RegionCatalog::new(Vec::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let err = RegionCatalog::new(vec![
            Region::new("16", "Alger", true),
            Region::new("16", "Alger bis", false),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateCode("16".to_string()));
    }

    #[test]
    fn rejects_blank_code() {
        let err = RegionCatalog::new(vec![Region::new("01", "Adrar", false), Region::new(" ", "x", false)])
            .unwrap_err();
        assert_eq!(err, CatalogError::EmptyCode { index: 1 });
    }
}
