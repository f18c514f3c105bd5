//! Parser and spatial index for `tilegrid.json`.
//!
//! The tilegrid describes the physical layout of tiles on the die: each
//! tile's type, grid position, and, per configuration block, the frame window
//! its bits occupy. The loaded [`TileGrid`] also keeps a frame-to-segment
//! index so the disassembler can go from a frame with data straight to the
//! tiles that might own it.

use crate::segbits::SegmentBit;
use bitfasm_bits::{BitAddress, FrameAddress, FRAME_WORD_COUNT, WORD_BITS};
use bitfasm_common::{BitfasmError, BitfasmResult};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// The configuration block a tile segment belongs to.
///
/// A tile may have bits in more than one block; block RAM contents, for
/// example, live in a separate block from the BRAM tile's routing bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockType {
    /// Logic, I/O and clocking configuration.
    ClbIoClk,
    /// Block RAM contents.
    BlockRam,
    /// Configurable logic block internal configuration.
    CfgClb,
}

impl BlockType {
    /// All block types, in database order.
    pub const ALL: [BlockType; 3] = [BlockType::ClbIoClk, BlockType::BlockRam, BlockType::CfgClb];

    /// Returns the name used for this block in `tilegrid.json`.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::ClbIoClk => "CLB_IO_CLK",
            BlockType::BlockRam => "BLOCK_RAM",
            BlockType::CfgClb => "CFG_CLB",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLB_IO_CLK" => Ok(BlockType::ClbIoClk),
            "BLOCK_RAM" => Ok(BlockType::BlockRam),
            "CFG_CLB" => Ok(BlockType::CfgClb),
            _ => Err(format!("unknown block type '{s}'")),
        }
    }
}

/// Most frames one tile segment may span. Block RAM contents, the largest
/// segments, span 128.
pub const MAX_SEGMENT_FRAMES: u32 = 256;

/// The frame window one tile occupies within one configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSegment {
    /// The first frame of the window (e.g., 0x00020800).
    pub baseaddr: FrameAddress,
    /// Number of consecutive frames spanned by the window.
    pub frames: u32,
    /// Word offset within each frame where this tile's data starts.
    pub offset: u32,
    /// Number of 32-bit words per frame used by this tile.
    pub words: u32,
}

impl TileSegment {
    /// Checks that the window lies within a frame and the address space.
    ///
    /// # Errors
    ///
    /// Returns an error string if the word window runs past the end of a
    /// frame, or the frame count is above [`MAX_SEGMENT_FRAMES`] or runs past
    /// the last frame address.
    pub fn validate(&self) -> Result<(), String> {
        if self.offset.checked_add(self.words).map_or(true, |end| end > FRAME_WORD_COUNT) {
            return Err(format!(
                "word window {}+{} exceeds {FRAME_WORD_COUNT} words per frame",
                self.offset, self.words
            ));
        }
        if self.frames > MAX_SEGMENT_FRAMES {
            return Err(format!(
                "{} frames exceeds the limit of {MAX_SEGMENT_FRAMES}",
                self.frames
            ));
        }
        if self.baseaddr.as_raw().checked_add(self.frames).is_none() {
            return Err(format!(
                "{} frames from {} overflow the frame address space",
                self.frames, self.baseaddr
            ));
        }
        Ok(())
    }

    /// Resolves a tile-relative segment bit to an absolute bit address.
    ///
    /// `frame = baseaddr + frame_offset`, and the bit index within the frame
    /// is `offset * 32 + bit_position`.
    pub fn resolve(&self, bit: SegmentBit) -> BitAddress {
        BitAddress::from_frame_bit(
            self.baseaddr.offset(bit.frame_offset),
            self.offset * WORD_BITS + bit.bit_position,
        )
    }
}

/// Everything the database knows about one physical tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfo {
    /// The tile name (e.g., "CLBLL_L_X16Y149").
    pub name: String,
    /// The tile type (e.g., "CLBLL_L", "INT_L").
    pub tile_type: String,
    /// Column position in the tile grid.
    pub grid_x: u32,
    /// Row position in the tile grid.
    pub grid_y: u32,
    /// Configuration windows indexed by block.
    pub segments: BTreeMap<BlockType, TileSegment>,
}

/// The output ordering key of a tile.
///
/// Tiles are grouped by type, then ordered by column ascending and row
/// descending. The name is a final tie-breaker so the order is total even on
/// a grid with overlapping coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TileSortKey<'a> {
    tile_type: &'a str,
    grid_x: u32,
    grid_y: Reverse<u32>,
    name: &'a str,
}

/// A reference to one tile segment, as stored in the frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentRef {
    /// Index of the tile in the grid.
    pub tile: usize,
    /// The block the segment belongs to.
    pub block: BlockType,
}

/// The complete tile grid of a device.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    /// Tiles sorted by name.
    tiles: Vec<TileInfo>,
    by_name: HashMap<String, usize>,
    frame_index: BTreeMap<FrameAddress, Vec<SegmentRef>>,
}

impl TileGrid {
    /// Builds a grid from a list of tiles.
    ///
    /// # Errors
    ///
    /// Returns an error string if two tiles share a name.
    pub fn from_tiles(mut tiles: Vec<TileInfo>) -> Result<Self, String> {
        tiles.sort_by(|a, b| a.name.cmp(&b.name));

        let mut by_name = HashMap::with_capacity(tiles.len());
        let mut frame_index: BTreeMap<FrameAddress, Vec<SegmentRef>> = BTreeMap::new();
        for (idx, tile) in tiles.iter().enumerate() {
            if by_name.insert(tile.name.clone(), idx).is_some() {
                return Err(format!("duplicate tile '{}'", tile.name));
            }
            for (&block, seg) in &tile.segments {
                for i in 0..seg.frames {
                    frame_index
                        .entry(seg.baseaddr.offset(i))
                        .or_default()
                        .push(SegmentRef { tile: idx, block });
                }
            }
        }

        Ok(Self {
            tiles,
            by_name,
            frame_index,
        })
    }

    /// Looks up a tile by name.
    ///
    /// # Errors
    ///
    /// Returns [`BitfasmError::UnknownTile`] if the name is not in the grid.
    pub fn lookup_tile(&self, tile_name: &str) -> BitfasmResult<&TileInfo> {
        self.by_name
            .get(tile_name)
            .map(|&idx| &self.tiles[idx])
            .ok_or_else(|| BitfasmError::UnknownTile(tile_name.to_string()))
    }

    /// Returns the output ordering key of a tile.
    ///
    /// # Errors
    ///
    /// Returns [`BitfasmError::UnknownTile`] if the name is not in the grid.
    pub fn sort_key(&self, tile_name: &str) -> BitfasmResult<TileSortKey<'_>> {
        let tile = self.lookup_tile(tile_name)?;
        Ok(TileSortKey {
            tile_type: &tile.tile_type,
            grid_x: tile.grid_x,
            grid_y: Reverse(tile.grid_y),
            name: &tile.name,
        })
    }

    /// Returns the tile at an index taken from a [`SegmentRef`].
    pub fn tile(&self, idx: usize) -> &TileInfo {
        &self.tiles[idx]
    }

    /// Returns the tile segments whose frame window covers `frame`.
    pub fn segments_in_frame(&self, frame: FrameAddress) -> &[SegmentRef] {
        self.frame_index
            .get(&frame)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns whether the grid has no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Returns all unique tile types, sorted.
    pub fn tile_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.tiles.iter().map(|t| t.tile_type.as_str()).collect();
        types.sort_unstable();
        types.dedup();
        types
    }
}

/// Raw JSON structure for bit segment deserialization.
#[derive(Deserialize)]
struct RawBitSegment {
    baseaddr: String,
    frames: u32,
    offset: u32,
    words: u32,
}

/// Raw JSON structure for a tile entry deserialization.
#[derive(Deserialize)]
struct RawTileEntry {
    #[serde(default)]
    bits: HashMap<String, RawBitSegment>,
    grid_x: u32,
    grid_y: u32,
    #[serde(rename = "type")]
    tile_type: String,
}

/// Parses a hex string like "0x00020800" into a u32.
fn parse_hex_addr(s: &str) -> Result<u32, String> {
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
    match stripped {
        Some(hex) => {
            u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex address '{s}': {e}"))
        }
        None => u32::from_str_radix(s, 16)
            .map_err(|e| format!("invalid hex address '{s}' (no 0x prefix): {e}")),
    }
}

/// Parses a tilegrid JSON string into a [`TileGrid`].
///
/// # Errors
///
/// Returns an error string if the JSON is malformed, names an unknown block
/// type, contains an invalid hex base address, or has a segment that fails
/// [`TileSegment::validate`].
pub fn parse_tilegrid(json: &str) -> Result<TileGrid, String> {
    let raw: HashMap<String, RawTileEntry> =
        serde_json::from_str(json).map_err(|e| format!("tilegrid JSON parse error: {e}"))?;

    let mut tiles = Vec::with_capacity(raw.len());
    for (name, raw_entry) in raw {
        let mut segments = BTreeMap::new();
        for (block_name, raw_seg) in raw_entry.bits {
            let block = block_name
                .parse::<BlockType>()
                .map_err(|e| format!("tile '{name}': {e}"))?;
            let baseaddr = parse_hex_addr(&raw_seg.baseaddr)
                .map_err(|e| format!("tile '{name}': {e}"))?;
            let segment = TileSegment {
                baseaddr: FrameAddress::from_raw(baseaddr),
                frames: raw_seg.frames,
                offset: raw_seg.offset,
                words: raw_seg.words,
            };
            segment
                .validate()
                .map_err(|e| format!("tile '{name}' {block}: {e}"))?;
            segments.insert(block, segment);
        }
        tiles.push(TileInfo {
            name,
            tile_type: raw_entry.tile_type,
            grid_x: raw_entry.grid_x,
            grid_y: raw_entry.grid_y,
            segments,
        });
    }
    TileGrid::from_tiles(tiles)
}
