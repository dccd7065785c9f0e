// Pluggable lookups used while building GPAD annotations

use anno_common::Result;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

/// Aspect (P/F/C) of an ontology class, usually backed by the ontology
pub trait AspectProvider: Send + Sync {
    fn aspect(&self, cls: &str) -> Option<String>;
}

impl AspectProvider for HashMap<String, String> {
    fn aspect(&self, cls: &str) -> Option<String> {
        self.get(cls).cloned()
    }
}

/// ECO evidence class -> GO evidence code
pub trait EcoMapper: Send + Sync {
    /// Returns the GO code and the ECO class it was mapped from
    fn go_code(&self, eco_cls: &str) -> Option<(String, String)>;
}

/// Mapper backed by the GO `gaf-eco-mapping.txt` table
///
/// Rows are `CODE<TAB>REF<TAB>ECO`. When several codes map to the same ECO
/// class the `Default` row wins, otherwise the first row seen.
#[derive(Debug, Clone, Default)]
pub struct TableEcoMapper {
    by_eco: HashMap<String, String>,
}

impl TableEcoMapper {
    const DEFAULT_REF: &'static str = "Default";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, code: &str, reference: &str, eco_cls: &str) {
        if reference == Self::DEFAULT_REF {
            self.by_eco.insert(eco_cls.to_string(), code.to_string());
        } else {
            self.by_eco
                .entry(eco_cls.to_string())
                .or_insert_with(|| code.to_string());
        }
    }

    /// Load a mapping table; blank lines, `#` comments and rows without
    /// exactly three columns are skipped
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut mapper = Self::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').filter(|c| !c.is_empty()).collect();
            match columns.as_slice() {
                [code, reference, eco] => mapper.add(code, reference, eco),
                _ => debug!("Skipping ECO mapping row: {}", line),
            }
        }
        debug!("Loaded {} ECO mappings", mapper.len());
        Ok(mapper)
    }

    pub fn len(&self) -> usize {
        self.by_eco.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_eco.is_empty()
    }
}

impl FromIterator<(String, String)> for TableEcoMapper {
    /// From `(eco_cls, go_code)` pairs
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        TableEcoMapper {
            by_eco: iter.into_iter().collect(),
        }
    }
}

impl EcoMapper for TableEcoMapper {
    fn go_code(&self, eco_cls: &str) -> Option<(String, String)> {
        self.by_eco
            .get(eco_cls)
            .map(|code| (code.clone(), eco_cls.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TABLE: &str = "# GO evidence code to ECO mapping\n\
IDA\tDefault\tECO:0000314\n\
IEA\tGO_REF:0000002\tECO:0000256\n\
IEA\tDefault\tECO:0000501\n\
ISS\tGO_REF:0000024\tECO:0000250\n\
TAS\tGO_REF:0000024\tECO:0000250\n\
\n\
broken row\n";

    #[test]
    fn test_from_reader() {
        let mapper = TableEcoMapper::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(mapper.len(), 4);
        assert_eq!(
            mapper.go_code("ECO:0000314"),
            Some(("IDA".to_string(), "ECO:0000314".to_string()))
        );
        assert_eq!(mapper.go_code("ECO:0000256").unwrap().0, "IEA");
        // first row wins without a Default
        assert_eq!(mapper.go_code("ECO:0000250").unwrap().0, "ISS");
        assert!(mapper.go_code("ECO:9999999").is_none());
    }

    #[test]
    fn test_aspect_map() {
        let mut aspects = HashMap::new();
        aspects.insert("GO:0005634".to_string(), "C".to_string());
        assert_eq!(aspects.aspect("GO:0005634").as_deref(), Some("C"));
        assert_eq!(aspects.aspect("GO:0000001"), None);
    }
}
