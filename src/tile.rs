//! Partition of the image into tiles, the unit of parallel work and of
//! per-pixel sample accumulation.

use crate::maths::Color;
use crate::render::Settings;

/// Edge length of a regular tile in pixels.
pub const TILE_SIZE: u32 = 16;

/// Extent of the last tile along an axis of `res` pixels.
///
/// This is the remainder `res % TILE_SIZE`, or 32 when the remainder is zero.
/// A zero remainder never produces a partial tile, so the fallback value is
/// only ever observed by callers that query it directly.
pub fn last_tile_extent(res: u32) -> u32 {
    match res % TILE_SIZE {
        0 => 2 * TILE_SIZE,
        rem => rem,
    }
}

/// Rectangular pixel region `[x_start, x_end) x [y_start, y_end)` with its own
/// accumulation and jitter storage.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Position in scan order
    pub id: usize,
    /// First column
    pub x_start: u32,
    /// One past the last column
    pub x_end: u32,
    /// First row
    pub y_start: u32,
    /// One past the last row
    pub y_end: u32,
    /// Width in pixels
    pub size_x: u32,
    /// Height in pixels
    pub size_y: u32,
    /// Linear colors, row-major with stride `size_x`.
    pub pixels: Vec<Color>,
    /// Two jitter components per pixel, same layout as `pixels`.
    pub jitter: Vec<f32>,
}

impl Tile {
    fn new(id: usize, x_start: u32, y_start: u32, size_x: u32, size_y: u32) -> Self {
        let count = (size_x * size_y) as usize;
        Self {
            id,
            x_start,
            x_end: x_start + size_x,
            y_start,
            y_end: y_start + size_y,
            size_x,
            size_y,
            pixels: vec![Color::ZERO; count],
            jitter: vec![0.0; count * 2],
        }
    }

    /// Index into `pixels` of absolute image pixel `(x, y)`.
    #[inline(always)]
    pub fn index(&self, x: u32, y: u32) -> usize {
        ((x - self.x_start) + (y - self.y_start) * self.size_x) as usize
    }

    /// Row `local_y` of the tile's pixel store.
    #[inline]
    pub fn row(&self, local_y: u32) -> &[Color] {
        let start = (local_y * self.size_x) as usize;
        &self.pixels[start..start + self.size_x as usize]
    }

    /// Reset accumulated color to black.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::ZERO);
    }
}

/// All tiles of one image resolution in row-major scan order.
///
/// Buffers live as long as the collection; regenerate it when the resolution
/// changes.
#[derive(Debug, Clone)]
pub struct Tiles {
    /// Tiles in scan order, indexed by id
    pub tiles: Vec<Tile>,
    /// Number of tiles
    pub count: usize,
    /// Tiles per row of the image.
    pub tiles_x: usize,
    /// Image width the tiles were generated for
    pub xres: u32,
    /// Image height the tiles were generated for
    pub yres: u32,
}

impl Tiles {
    /// Tiles covering image rows `[band * TILE_SIZE, (band + 1) * TILE_SIZE)`.
    #[inline]
    pub fn band(&self, band: usize) -> &[Tile] {
        let start = band * self.tiles_x;
        &self.tiles[start..start + self.tiles_x]
    }

    /// True if these tiles were generated for the given resolution.
    pub fn matches(&self, settings: &Settings) -> bool {
        self.xres == settings.xres && self.yres == settings.yres
    }

    /// Drop all accumulated color, e.g. after a camera move.
    pub fn reset_accumulation(&mut self) {
        self.tiles.iter_mut().for_each(Tile::clear);
    }
}

/// Split the image described by `settings` into tiles.
///
/// Tiles are `TILE_SIZE` square except along the right and bottom edges,
/// which are clamped to the remaining extent. Ids increase in scan order.
pub fn generate_tiles(settings: &Settings) -> Tiles {
    let tiles_x = settings.xres.div_ceil(TILE_SIZE) as usize;
    let tiles_y = settings.yres.div_ceil(TILE_SIZE) as usize;

    let last_x = last_tile_extent(settings.xres);
    let last_y = last_tile_extent(settings.yres);

    let mut tiles = Vec::with_capacity(tiles_x * tiles_y);

    for y in (0..settings.yres).step_by(TILE_SIZE as usize) {
        let size_y = if y + TILE_SIZE > settings.yres { last_y } else { TILE_SIZE };
        for x in (0..settings.xres).step_by(TILE_SIZE as usize) {
            let size_x = if x + TILE_SIZE > settings.xres { last_x } else { TILE_SIZE };
            tiles.push(Tile::new(tiles.len(), x, y, size_x, size_y));
        }
    }

    Tiles {
        count: tiles.len(),
        tiles,
        tiles_x,
        xres: settings.xres,
        yres: settings.yres,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(xres: u32, yres: u32) -> Vec<u32> {
        let tiles = generate_tiles(&Settings::new(xres, yres));
        let mut hits = vec![0u32; (xres * yres) as usize];
        for tile in &tiles.tiles {
            assert!(tile.x_end <= xres && tile.y_end <= yres, "tile {} out of bounds", tile.id);
            assert_eq!(tile.pixels.len(), (tile.size_x * tile.size_y) as usize);
            assert_eq!(tile.jitter.len(), tile.pixels.len() * 2);
            for y in tile.y_start..tile.y_end {
                for x in tile.x_start..tile.x_end {
                    hits[(x + y * xres) as usize] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn tiles_cover_image_exactly_once() {
        for (xres, yres) in [(1, 1), (15, 3), (16, 16), (17, 33), (32, 48), (100, 37), (1280, 720)] {
            let hits = coverage(xres, yres);
            assert!(hits.iter().all(|&h| h == 1), "{}x{} not covered exactly once", xres, yres);
        }
    }

    #[test]
    fn multiple_of_tile_size_uses_only_full_tiles() {
        assert_eq!(last_tile_extent(32), 32);
        assert_eq!(last_tile_extent(1280), 32);

        let tiles = generate_tiles(&Settings::new(32, 48));
        assert_eq!(tiles.count, 6);
        assert!(tiles.tiles.iter().all(|t| t.size_x == 16 && t.size_y == 16));
    }

    #[test]
    fn edge_tiles_take_the_remainder() {
        assert_eq!(last_tile_extent(37), 5);

        let tiles = generate_tiles(&Settings::new(37, 20));
        assert_eq!(tiles.tiles_x, 3);
        assert_eq!(tiles.count, 6);
        let right = &tiles.tiles[2];
        assert_eq!((right.x_start, right.x_end, right.size_x), (32, 37, 5));
        let bottom = &tiles.tiles[3];
        assert_eq!((bottom.y_start, bottom.y_end, bottom.size_y), (16, 20, 4));
    }

    #[test]
    fn ids_follow_scan_order() {
        let tiles = generate_tiles(&Settings::new(50, 40));
        for (i, tile) in tiles.tiles.iter().enumerate() {
            assert_eq!(tile.id, i);
        }
        let band = tiles.band(1);
        assert!(band.iter().all(|t| t.y_start == 16));
        assert_eq!(band.len(), tiles.tiles_x);
    }

    #[test]
    fn pixel_index_uses_row_stride() {
        let tiles = generate_tiles(&Settings::new(37, 20));
        let tile = &tiles.tiles[5];
        assert_eq!((tile.size_x, tile.size_y), (5, 4));
        assert_eq!(tile.index(32, 16), 0);
        assert_eq!(tile.index(33, 16), 1);
        assert_eq!(tile.index(32, 17), 5);
        assert_eq!(tile.row(1).len(), 5);
    }
}
