// Shared helpers for anno-formats integration tests

#![allow(dead_code)]

use anno_formats::{GeneAnnotation, TableEcoMapper};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn eco_mapper() -> TableEcoMapper {
    let file = File::open(fixture("gaf-eco-mapping.txt")).expect("mapping fixture");
    TableEcoMapper::from_reader(BufReader::new(file)).expect("valid mapping table")
}

/// GAF 2.0 text with `rows` annotations over `rows / 3 + 1` entities
pub fn generated_gaf(rows: usize) -> String {
    let mut text = String::from("!gaf-version: 2.0\n!Generated for chunking tests\n");
    for i in 0..rows {
        let columns = [
            "UniProtKB".to_string(),
            format!("P{:05}", i / 3),
            format!("SYM{}", i / 3),
            String::new(),
            format!("GO:{:07}", i),
            format!("PMID:{}", 1000 + i),
            "IDA".to_string(),
            String::new(),
            "P".to_string(),
            format!("protein {}", i / 3),
            String::new(),
            "protein".to_string(),
            "taxon:9606".to_string(),
            "20260101".to_string(),
            "UniProt".to_string(),
            String::new(),
            String::new(),
        ];
        text.push_str(&columns.join("\t"));
        text.push('\n');
    }
    text
}

/// Annotation content without its source location
pub fn content(annotation: &GeneAnnotation) -> GeneAnnotation {
    GeneAnnotation {
        source: None,
        ..annotation.clone()
    }
}
