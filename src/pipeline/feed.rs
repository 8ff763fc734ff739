//! Batch loader for detector JSONL output

use crate::exposure_core::Detection;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Detections loaded from one detector output file
#[derive(Debug)]
pub struct DetectionFeed {
    pub detections: Vec<Detection>,
    pub malformed_lines: usize,
}

impl DetectionFeed {
    /// Load every detection from a JSONL file.
    ///
    /// Malformed lines are skipped with a warning and counted; only an I/O
    /// failure on the file itself is an error.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut detections = Vec::new();
        let mut malformed_lines = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match Detection::from_jsonl(&line) {
                Ok(det) => detections.push(det),
                Err(e) => {
                    malformed_lines += 1;
                    log::warn!("Skipping malformed detection at line {}: {}", line_no + 1, e);
                }
            }
        }

        log::info!(
            "📖 Loaded {} detections from {} ({} malformed lines skipped)",
            detections.len(),
            path.display(),
            malformed_lines
        );

        Ok(Self {
            detections,
            malformed_lines,
        })
    }

    /// Group loaded detections by sponsor for per-sponsor scoring
    pub fn by_sponsor(self) -> HashMap<String, Vec<Detection>> {
        let mut grouped: HashMap<String, Vec<Detection>> = HashMap::new();
        for det in self.detections {
            grouped.entry(det.sponsor_id.clone()).or_default().push(det);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_and_group_by_sponsor() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("detections.jsonl");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, r#"{{"timestamp_sec":0.0,"sponsor_id":"acme_cola","bbox":{{"x":0.1,"y":0.1,"width":0.2,"height":0.1}},"confidence":0.9}}"#).unwrap();
        writeln!(file, r#"{{"timestamp_sec":0.5,"sponsor_id":"nimbus_air","bbox":{{"x":0.5,"y":0.5,"width":0.1,"height":0.1}},"confidence":0.8}}"#).unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"timestamp_sec":1.0,"sponsor_id":"acme_cola","bbox":{{"x":0.1,"y":0.1,"width":0.2,"height":0.1}},"confidence":0.95}}"#).unwrap();
        drop(file);

        let feed = DetectionFeed::load(&file_path).unwrap();
        assert_eq!(feed.detections.len(), 3);
        assert_eq!(feed.malformed_lines, 1);

        let grouped = feed.by_sponsor();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["acme_cola"].len(), 2);
        assert_eq!(grouped["nimbus_air"].len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.jsonl");

        assert!(DetectionFeed::load(&missing).is_err());
    }
}
