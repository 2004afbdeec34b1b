//! # Chunk Snapshots
//!
//! Payloads are saved as LZ4-compressed binary blobs so hosts can cache
//! generated chunks between sessions.
//!
//! ## Format
//!
//! ```text
//! lz4( header | heights: f32 x N | colours: [f32; 4] x N )
//! header = magic, version, coord.x, coord.y, width, height   (6 x 4 bytes)
//! ```

use std::io::{Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::chunk::{ChunkCoord, ChunkPayload};
use crate::error::{TerrainError, TerrainResult};
use crate::field::HeightGrid;
use crate::region::Colour;

/// "STRC" in little endian.
const SNAPSHOT_MAGIC: u32 = u32::from_le_bytes(*b"STRC");
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct SnapshotHeader {
    magic: u32,
    version: u32,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

const HEADER_SIZE: usize = std::mem::size_of::<SnapshotHeader>();

impl ChunkPayload {
    /// Encodes this payload as a compressed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::CorruptSnapshot`] if a grid dimension does
    /// not fit the header.
    pub fn to_compressed_bytes(&self) -> TerrainResult<Vec<u8>> {
        let heights = self.heights();
        let dimension = |d: usize| {
            u32::try_from(d)
                .map_err(|_| TerrainError::CorruptSnapshot(format!("dimension {d} too large")))
        };
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            x: self.coord().x,
            y: self.coord().y,
            width: dimension(heights.width())?,
            height: dimension(heights.height())?,
        };

        let height_bytes: &[u8] = bytemuck::cast_slice(heights.values());
        let colour_bytes: &[u8] = bytemuck::cast_slice(self.colours());

        let mut raw = Vec::with_capacity(HEADER_SIZE + height_bytes.len() + colour_bytes.len());
        raw.extend_from_slice(bytemuck::bytes_of(&header));
        raw.extend_from_slice(height_bytes);
        raw.extend_from_slice(colour_bytes);

        Ok(compress_prepend_size(&raw))
    }

    /// Decodes a snapshot produced by [`Self::to_compressed_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::CorruptSnapshot`] on bad compression, magic,
    /// version or size.
    pub fn from_compressed_bytes(compressed: &[u8]) -> TerrainResult<Self> {
        let raw = decompress_size_prepended(compressed)
            .map_err(|e| TerrainError::CorruptSnapshot(e.to_string()))?;

        if raw.len() < HEADER_SIZE {
            return Err(TerrainError::CorruptSnapshot("truncated header".to_string()));
        }
        let header: SnapshotHeader = bytemuck::pod_read_unaligned(&raw[..HEADER_SIZE]);
        if header.magic != SNAPSHOT_MAGIC {
            return Err(TerrainError::CorruptSnapshot("bad magic".to_string()));
        }
        if header.version != SNAPSHOT_VERSION {
            return Err(TerrainError::CorruptSnapshot(format!(
                "unsupported version {}",
                header.version
            )));
        }

        let width = header.width as usize;
        let height = header.height as usize;
        let points = width
            .checked_mul(height)
            .ok_or_else(|| TerrainError::CorruptSnapshot("dimensions overflow".to_string()))?;
        let height_len = points * std::mem::size_of::<f32>();
        let colour_len = points * std::mem::size_of::<Colour>();

        // Validate size
        if raw.len() != HEADER_SIZE + height_len + colour_len {
            return Err(TerrainError::CorruptSnapshot(format!(
                "expected {} bytes for {width}x{height}, got {}",
                HEADER_SIZE + height_len + colour_len,
                raw.len()
            )));
        }

        let body = &raw[HEADER_SIZE..];
        let mut values = vec![0.0f32; points];
        bytemuck::cast_slice_mut::<f32, u8>(&mut values).copy_from_slice(&body[..height_len]);
        let mut colours = vec![Colour::CLEAR; points];
        bytemuck::cast_slice_mut::<Colour, u8>(&mut colours).copy_from_slice(&body[height_len..]);

        let heights = HeightGrid::from_values(width, height, values)?;
        Self::new(ChunkCoord::new(header.x, header.y), heights, colours)
    }

    /// Saves the payload to a compressed binary file.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or file operations fail.
    pub fn save_compressed(&self, path: &Path) -> TerrainResult<()> {
        let compressed = self.to_compressed_bytes()?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(&compressed)?;
        Ok(())
    }

    /// Loads a payload from a compressed binary file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations or decoding fail.
    pub fn load_compressed(path: &Path) -> TerrainResult<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;
        Self::from_compressed_bytes(&compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkGenerator;
    use crate::field::NoiseSettings;
    use crate::noise::WorldSeed;
    use crate::region::RegionTable;

    fn payload() -> ChunkPayload {
        ChunkGenerator::new(
            NoiseSettings::with_seed(WorldSeed::new(42)),
            RegionTable::landmass(),
            64,
        )
        .unwrap()
        .generate_at(ChunkCoord::new(-3, 7))
        .unwrap()
    }

    #[test]
    fn test_snapshot_file_restores_payload() {
        let chunk = payload();
        let path = std::env::temp_dir().join(format!("strata_snapshot_{}.bin", std::process::id()));

        chunk.save_compressed(&path).unwrap();
        let loaded = ChunkPayload::load_compressed(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, chunk);
    }

    #[test]
    fn test_snapshot_is_smaller_than_raw() {
        let chunk = payload();
        let compressed = chunk.to_compressed_bytes().unwrap();
        let raw = HEADER_SIZE + chunk.heights().len() * (4 + 16);

        println!("Compressed: {} bytes, Uncompressed: {raw} bytes", compressed.len());
        assert!(compressed.len() < raw);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            ChunkPayload::from_compressed_bytes(&[1, 2, 3]),
            Err(TerrainError::CorruptSnapshot(_))
        ));

        let bad_magic = compress_prepend_size(&[0u8; HEADER_SIZE]);
        assert!(matches!(
            ChunkPayload::from_compressed_bytes(&bad_magic),
            Err(TerrainError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_body() {
        let chunk = payload();
        let compressed = chunk.to_compressed_bytes().unwrap();
        let mut raw = decompress_size_prepended(&compressed).unwrap();
        raw.truncate(raw.len() - 16);

        assert!(matches!(
            ChunkPayload::from_compressed_bytes(&compress_prepend_size(&raw)),
            Err(TerrainError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("strata_snapshot_does_not_exist.bin");
        assert!(matches!(
            ChunkPayload::load_compressed(&path),
            Err(TerrainError::Io(_))
        ));
    }
}
