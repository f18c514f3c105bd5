//! Top-level device database loader.
//!
//! Combines the tilegrid and the segbits tables of one part into a single
//! [`Database`]. The expected directory structure is:
//!
//! ```text
//! prjxray-db/artix7/            <- database root
//! ├── xc7a35tcsg324-1.yaml      <- part description for the extraction tool
//! ├── segbits_clbll_l.db
//! ├── segbits_bram_l.block_ram.db
//! ├── ...
//! └── xc7a35tcsg324-1/
//!     └── tilegrid.json
//! ```
//!
//! `tilegrid.json` is looked up in `<root>/<part>/` first and then in
//! `<root>/`; segbits files are looked up the same way, so a flattened
//! single-part directory works too.

use crate::segbits::{self, SegmentBitIndex};
use crate::tilegrid::{self, BlockType, TileGrid};
use bitfasm_common::{BitfasmError, BitfasmResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The device database for a single part.
#[derive(Debug, Clone)]
pub struct Database {
    /// The part name (e.g., "xc7a35tcsg324-1").
    pub part: String,
    /// The root directory the database was loaded from.
    pub root: PathBuf,
    /// The tile grid of the part.
    pub grid: TileGrid,
    /// Segbits of every tile type in the grid that has any.
    pub index: SegmentBitIndex,
}

impl Database {
    /// Loads the database for `part` from `root`.
    ///
    /// Segbits are loaded for every tile type present in the grid. A tile type
    /// without any segbits file has no features; that is normal for tiles that
    /// carry no configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BitfasmError::DatabaseLoadFailure`] naming the file if the
    /// tilegrid is missing, or if any file cannot be read or parsed.
    pub fn load(root: &Path, part: &str) -> BitfasmResult<Self> {
        if !root.is_dir() {
            return Err(BitfasmError::database(root, "database directory not found"));
        }
        let part_dir = root.join(part);

        let tilegrid_path = find_file(&part_dir, root, "tilegrid.json")?
            .ok_or_else(|| BitfasmError::database(part_dir.join("tilegrid.json"), "file not found"))?;
        let json = read_db_file(&tilegrid_path)?;
        let grid = tilegrid::parse_tilegrid(&json)
            .map_err(|e| BitfasmError::database(&tilegrid_path, e))?;
        log::debug!(
            "loaded {} tiles from {}",
            grid.len(),
            tilegrid_path.display()
        );

        let mut index = SegmentBitIndex::new();
        for tile_type in grid.tile_types() {
            for block in BlockType::ALL {
                let filename = segbits::segbits_filename(tile_type, block);
                let Some(path) = find_file(&part_dir, root, &filename)? else {
                    continue;
                };
                let content = read_db_file(&path)?;
                let features =
                    segbits::parse_segbits(&content).map_err(|e| BitfasmError::database(&path, e))?;
                log::trace!("{}: {} features", path.display(), features.len());
                index.insert(tile_type, block, features);
            }
        }
        log::debug!(
            "loaded {} features for {} tile types",
            index.feature_count(),
            index.tile_type_count()
        );

        Ok(Self {
            part: part.to_string(),
            root: root.to_path_buf(),
            grid,
            index,
        })
    }

    /// Returns the path of the part description consumed by the
    /// frame-extraction tool.
    pub fn part_yaml(root: &Path, part: &str) -> PathBuf {
        root.join(format!("{part}.yaml"))
    }
}

/// Finds `name` in the part directory, falling back to the root.
fn find_file(part_dir: &Path, root: &Path, name: &str) -> BitfasmResult<Option<PathBuf>> {
    for dir in [part_dir, root] {
        let path = dir.join(name);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => return Ok(Some(path)),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(BitfasmError::database(&path, e.to_string())),
        }
    }
    Ok(None)
}

fn read_db_file(path: &Path) -> BitfasmResult<String> {
    std::fs::read_to_string(path).map_err(|e| BitfasmError::database(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TILEGRID: &str = r#"{
        "CLBLL_L_X0Y0": {
            "bits": {
                "CLB_IO_CLK": {"baseaddr": "0x00020800", "frames": 36, "offset": 99, "words": 2}
            },
            "grid_x": 1,
            "grid_y": 1,
            "type": "CLBLL_L"
        },
        "BRAM_L_X6Y0": {
            "bits": {
                "CLB_IO_CLK": {"baseaddr": "0x00020c00", "frames": 28, "offset": 0, "words": 10},
                "BLOCK_RAM": {"baseaddr": "0x00800000", "frames": 128, "offset": 0, "words": 10}
            },
            "grid_x": 2,
            "grid_y": 1,
            "type": "BRAM_L"
        },
        "NULL_X0Y0": {"grid_x": 0, "grid_y": 0, "type": "NULL"}
    }"#;

    /// Creates a database root with the tilegrid under the part directory and
    /// segbits in the root.
    fn fixture_db(part: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let part_dir = dir.path().join(part);
        fs::create_dir_all(&part_dir).unwrap();
        fs::write(part_dir.join("tilegrid.json"), TILEGRID).unwrap();
        fs::write(
            dir.path().join("segbits_clbll_l.db"),
            "CLBLL_L.SLICEL_X0.ALUT.INIT[00] 00_14\nCLBLL_L.SLICEL_X0.AFF.ZRST !01_42\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("segbits_bram_l.block_ram.db"),
            "BRAM_L.RAMB18_Y0.INIT_00[00] 00_00\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn load_fixture_database() {
        let dir = fixture_db("xc7a35t");
        let db = Database::load(dir.path(), "xc7a35t").unwrap();

        assert_eq!(db.part, "xc7a35t");
        assert_eq!(db.grid.len(), 3);
        assert_eq!(db.index.tile_type_count(), 2);
        assert!(db
            .index
            .rules_for("CLBLL_L", "SLICEL_X0.ALUT.INIT[0]")
            .is_ok());
        assert!(db.index.rules_for("BRAM_L", "RAMB18_Y0.INIT_00[0]").is_ok());
        assert!(!db.index.has_block("NULL", BlockType::ClbIoClk));
    }

    #[test]
    fn load_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tilegrid.json"), TILEGRID).unwrap();
        let db = Database::load(dir.path(), "xc7a35t").unwrap();
        assert_eq!(db.grid.len(), 3);
        assert_eq!(db.index.tile_type_count(), 0);
    }

    #[test]
    fn part_dir_segbits_take_precedence() {
        let dir = fixture_db("xc7a35t");
        fs::write(
            dir.path().join("xc7a35t").join("segbits_clbll_l.db"),
            "CLBLL_L.ONLY_HERE 00_01\n",
        )
        .unwrap();
        let db = Database::load(dir.path(), "xc7a35t").unwrap();
        assert!(db.index.rules_for("CLBLL_L", "ONLY_HERE").is_ok());
        assert!(db
            .index
            .rules_for("CLBLL_L", "SLICEL_X0.ALUT.INIT[0]")
            .is_err());
    }

    #[test]
    fn load_missing_root() {
        let err = Database::load(Path::new("/nonexistent/db"), "xc7a35t").unwrap_err();
        assert!(matches!(err, BitfasmError::DatabaseLoadFailure { .. }));
    }

    #[test]
    fn load_missing_tilegrid() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::load(dir.path(), "xc7a35t").unwrap_err();
        assert!(format!("{err}").contains("tilegrid.json"));
    }

    #[test]
    fn corrupt_segbits_names_file() {
        let dir = fixture_db("xc7a35t");
        fs::write(dir.path().join("segbits_clbll_l.db"), "CLBLL_L.BROKEN zz_1\n").unwrap();
        let err = Database::load(dir.path(), "xc7a35t").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("segbits_clbll_l.db"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn corrupt_tilegrid_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tilegrid.json"), "{ nope").unwrap();
        let err = Database::load(dir.path(), "xc7a35t").unwrap_err();
        assert!(matches!(err, BitfasmError::DatabaseLoadFailure { .. }));
    }

    #[test]
    fn oversized_segment_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tilegrid.json"),
            r#"{"CLBLL_L_X2Y3": {
                "bits": {"CLB_IO_CLK": {"baseaddr": "0x00020800", "frames": 4000000000, "offset": 0, "words": 2}},
                "grid_x": 10, "grid_y": 3, "type": "CLBLL_L"
            }}"#,
        )
        .unwrap();
        let err = Database::load(dir.path(), "xc7a35t").unwrap_err();
        match err {
            BitfasmError::DatabaseLoadFailure { path, message } => {
                assert!(path.ends_with("tilegrid.json"));
                assert!(message.contains("CLBLL_L_X2Y3"));
            }
            other => panic!("expected DatabaseLoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn part_yaml_path() {
        assert_eq!(
            Database::part_yaml(Path::new("/db/artix7"), "xc7a35tcsg324-1"),
            PathBuf::from("/db/artix7/xc7a35tcsg324-1.yaml")
        );
    }
}
