// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One cell of the field. `colour` is only meaningful while `occupied`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    pub occupied: bool,
    pub colour: u32,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        occupied: false,
        colour: 0,
    };

    pub fn filled(colour: u32) -> Self {
        Self {
            occupied: true,
            colour,
        }
    }
}

// ============================================================================
// Playfield
// ============================================================================

/// Row-major tile storage. Row 0 is the spawn row, the last row is the floor.
///
/// Every operation asserts its coordinates are inside the field; there is
/// no clamping.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Playfield {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Playfield {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::EMPTY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Coord) -> usize {
        assert!(
            pos.x < self.width && pos.y < self.height,
            "tile ({}, {}) outside {}x{} playfield",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        pos.y * self.width + pos.x
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        assert!(
            row < self.height,
            "row {} outside playfield of height {}",
            row,
            self.height
        );
        let start = row * self.width;
        start..start + self.width
    }

    pub fn tile(&self, pos: Coord) -> Tile {
        self.tiles[self.index(pos)]
    }

    /// Tiles of one row, left to right.
    pub fn row(&self, row: usize) -> &[Tile] {
        &self.tiles[self.row_range(row)]
    }

    /// Marks `pos` occupied with `colour`. The caller checks occupancy first;
    /// an occupied cell is overwritten.
    pub fn place_tile(&mut self, pos: Coord, colour: u32) {
        debug_assert!(!self.is_occupied(pos), "placing over occupied tile");
        let i = self.index(pos);
        self.tiles[i] = Tile::filled(colour);
    }

    /// Copies `src` into `dst`. `src` is left untouched.
    pub fn copy_tile(&mut self, dst: Coord, src: Coord) {
        let (d, s) = (self.index(dst), self.index(src));
        self.tiles[d] = self.tiles[s];
    }

    pub fn copy_row(&mut self, dst: usize, src: usize) {
        let src = self.row_range(src);
        let dst = self.row_range(dst).start;
        self.tiles.copy_within(src, dst);
    }

    pub fn reset_tile(&mut self, pos: Coord) {
        let i = self.index(pos);
        self.tiles[i] = Tile::EMPTY;
    }

    pub fn reset_row(&mut self, row: usize) {
        let range = self.row_range(row);
        self.tiles[range].fill(Tile::EMPTY);
    }

    pub fn reset_all(&mut self) {
        self.tiles.fill(Tile::EMPTY);
    }

    pub fn is_occupied(&self, pos: Coord) -> bool {
        self.tiles[self.index(pos)].occupied
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row).iter().all(|tile| tile.occupied)
    }

    /// Count occupied cells in the whole field
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.occupied).count()
    }
}
