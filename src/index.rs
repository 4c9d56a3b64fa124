//! Sorted companion index files.
//!
//! Each data file has an index file mapping a primary key to the line
//! number of its record. Entries are `key;line_number\n` lines kept in
//! ascending lexicographic order of the key (plain string comparison;
//! numeric-looking keys sort as text).
//!
//! Lookups are linear scans from the start of the file. The file being
//! sorted would permit binary search, but the linear scan is the
//! documented contract here and is kept as-is.

use crate::error::{Error, Result};
use crate::record;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Separator between the two halves of a composite sales key.
pub const COMPOSITE_SEPARATOR: char = '#';

/// One `key -> line_number` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Primary (or composite) key of the record.
    pub key: String,
    /// Line number of the record in the companion data file.
    pub line_number: u64,
}

impl IndexEntry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, line_number: u64) -> Self {
        Self {
            key: key.into(),
            line_number,
        }
    }

    fn parse(line: &str, path: &Path) -> Result<Self> {
        let trimmed = line.trim_end();
        let (key, number) = trimmed.rsplit_once(record::SEPARATOR).ok_or_else(|| {
            Error::corruption(format!("malformed index entry {:?} in {:?}", trimmed, path))
        })?;
        let line_number = number.parse::<u64>().map_err(|e| {
            Error::corruption(format!(
                "bad line number in index entry {:?} in {:?}: {}",
                trimmed, path, e
            ))
        })?;
        Ok(Self::new(key, line_number))
    }

    fn to_line(&self) -> String {
        format!("{};{}\n", self.key, self.line_number)
    }
}

/// One sorted index file.
///
/// Every operation opens and closes the file within the call. Mutating
/// operations read the whole file, modify the entry list in memory,
/// and rewrite the file in full.
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    /// Create a handle for the index file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every entry in file order.
    ///
    /// A missing file is an empty index, not an error.
    pub fn load_all(&self) -> Result<Vec<IndexEntry>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim_end().is_empty() {
                continue;
            }
            entries.push(IndexEntry::parse(&line, &self.path)?);
        }
        Ok(entries)
    }

    /// Insert `key -> line_number`, keeping the file sorted.
    ///
    /// Loads all entries, walks forward to the first key strictly
    /// greater than the new one, inserts before it (stable: an equal
    /// key lands after existing duplicates), and rewrites the file.
    /// No uniqueness check is performed.
    pub fn insert_sorted(&self, key: &str, line_number: u64) -> Result<()> {
        record::check_separator(key)?;

        let mut entries = self.load_all()?;

        let mut position = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            if entry.key.as_str() > key {
                position = i;
                break;
            }
        }
        entries.insert(position, IndexEntry::new(key, line_number));

        self.write_entries(&entries)
    }

    /// Find the line number for an exact key match.
    ///
    /// Linear scan from the start; the first match wins. A missing
    /// file is an empty index.
    pub fn find(&self, key: &str) -> Result<Option<u64>> {
        for entry in self.load_all()? {
            if entry.key == key {
                return Ok(Some(entry.line_number));
            }
        }
        Ok(None)
    }

    /// Find a sale by the VIN half of its composite key.
    ///
    /// Sales are indexed under `"<sales_number>#<car_vin>"`; this scans
    /// for the first entry whose segment after `#` equals `vin`.
    pub fn find_by_vin(&self, vin: &str) -> Result<Option<u64>> {
        for entry in self.load_all()? {
            if let Some((_, entry_vin)) = entry.key.split_once(COMPOSITE_SEPARATOR) {
                if entry_vin == vin {
                    return Ok(Some(entry.line_number));
                }
            }
        }
        Ok(None)
    }

    /// Find a sale by the sales-number half of its composite key.
    pub fn find_by_sales_number(&self, sales_number: &str) -> Result<Option<u64>> {
        for entry in self.load_all()? {
            if let Some((entry_number, _)) = entry.key.split_once(COMPOSITE_SEPARATOR) {
                if entry_number == sales_number {
                    return Ok(Some(entry.line_number));
                }
            }
        }
        Ok(None)
    }

    /// Replace the file's whole content with `entries`, re-sorted.
    ///
    /// Used after a rename (keys changed in place) and after a
    /// deletion (one entry dropped).
    pub fn rewrite_all(&self, mut entries: Vec<IndexEntry>) -> Result<()> {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        self.write_entries(&entries)
    }

    // Truncating write of the full entry list.
    fn write_entries(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut content = String::new();
        for entry in entries {
            content.push_str(&entry.to_line());
        }
        let mut file = File::create(&self.path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

// Convenience for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) fn keys_of(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.split(record::SEPARATOR).next().unwrap_or("").to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn index(dir: &TempDir, name: &str) -> IndexFile {
        IndexFile::new(dir.path().join(name))
    }

    fn assert_sorted(index: &IndexFile) {
        let keys = keys_of(index.path());
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted, "index keys out of order: {:?}", keys);
    }

    #[test]
    fn test_missing_file_is_empty_index() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "absent_index.txt");
        assert!(idx.load_all().unwrap().is_empty());
        assert!(idx.find("VIN1").unwrap().is_none());
    }

    #[test]
    fn test_insert_keeps_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "cars_index.txt");

        idx.insert_sorted("VIN5", 0).unwrap();
        idx.insert_sorted("VIN1", 1).unwrap();
        idx.insert_sorted("VIN3", 2).unwrap();

        let keys = keys_of(idx.path());
        assert_eq!(keys, vec!["VIN1", "VIN3", "VIN5"]);
        assert_sorted(&idx);
    }

    #[test]
    fn test_keys_sort_as_text_not_numbers() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "models_index.txt");

        idx.insert_sorted("2", 0).unwrap();
        idx.insert_sorted("10", 1).unwrap();

        // "10" < "2" lexicographically.
        assert_eq!(keys_of(idx.path()), vec!["10", "2"]);
    }

    #[test]
    fn test_duplicate_keys_are_accepted() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "models_index.txt");

        idx.insert_sorted("1", 0).unwrap();
        idx.insert_sorted("1", 1).unwrap();

        // First match wins on lookup.
        assert_eq!(keys_of(idx.path()), vec!["1", "1"]);
        assert_eq!(idx.find("1").unwrap(), Some(0));
    }

    #[test]
    fn test_insert_rejects_separator_in_key() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "cars_index.txt");
        assert!(idx.insert_sorted("VIN;1", 0).is_err());
    }

    #[test]
    fn test_composite_key_lookups() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "sales_index.txt");

        idx.insert_sorted("S1#VIN1", 0).unwrap();
        idx.insert_sorted("S2#VIN2", 1).unwrap();

        assert_eq!(idx.find_by_vin("VIN2").unwrap(), Some(1));
        assert_eq!(idx.find_by_sales_number("S1").unwrap(), Some(0));
        assert!(idx.find_by_vin("VIN9").unwrap().is_none());
        assert!(idx.find_by_sales_number("S9").unwrap().is_none());
    }

    #[test]
    fn test_rewrite_all_resorts() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "cars_index.txt");

        let entries = vec![
            IndexEntry::new("VIN7", 0),
            IndexEntry::new("VIN2", 1),
            IndexEntry::new("VIN9", 2),
        ];
        idx.rewrite_all(entries).unwrap();

        assert_eq!(keys_of(idx.path()), vec!["VIN2", "VIN7", "VIN9"]);
        assert_eq!(idx.find("VIN9").unwrap(), Some(2));
    }

    #[test]
    fn test_rewrite_all_empty_truncates() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "sales_index.txt");

        idx.insert_sorted("S1#VIN1", 0).unwrap();
        idx.rewrite_all(Vec::new()).unwrap();

        assert!(idx.load_all().unwrap().is_empty());
        assert!(idx.path().exists());
    }

    #[test]
    fn test_malformed_entry_is_corruption() {
        let dir = TempDir::new().unwrap();
        let idx = index(&dir, "cars_index.txt");
        fs::write(idx.path(), "no-separator-here\n").unwrap();

        assert!(matches!(idx.load_all(), Err(Error::Corruption(_))));
    }
}
