//! Board engine: tiles, flood-fill clicks, removal cascade, gravity and column compaction.

use crate::Demo;
use rand::Rng;

/// Orthogonal neighbour offsets as (dy, dx), in flood-fill order: up, down, right, left.
const NEIGHBOURS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// Removal cascade priority: down, up, right, left.
const REMOVAL_ORDER: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The five tile colours. Theme maps each one to a terminal colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileColor {
    #[default]
    Blue,
    Yellow,
    Red,
    Green,
    White,
}

impl TileColor {
    pub const ALL: [Self; 5] = [Self::Blue, Self::Yellow, Self::Red, Self::Green, Self::White];

    /// Colour index 0..5 for theme.tile_color().
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wraps around, so any index maps to a colour.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Lifecycle of a tile. Marked and Removed only exist while a cascade is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileState {
    #[default]
    Empty,
    Marked,
    Removed,
    Colored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub color: TileColor,
    pub state: TileState,
}

impl Tile {
    pub const EMPTY: Self = Self {
        color: TileColor::Blue,
        state: TileState::Empty,
    };

    pub const fn colored(color: TileColor) -> Self {
        Self {
            color,
            state: TileState::Colored,
        }
    }

    #[inline]
    pub fn is_colored(&self) -> bool {
        self.state == TileState::Colored
    }
}

/// Playfield: `height` rows by `width` logical columns. y=0 is the top row.
///
/// Tiles live in fixed column slots; `order` maps each logical column to its
/// slot, so compaction only rewrites the order and resets the recycled slot.
#[derive(Debug, Clone)]
pub struct Playfield {
    width: usize,
    height: usize,
    /// slots[s][y] = tile.
    slots: Vec<Vec<Tile>>,
    /// order[x] = slot displayed at logical column x.
    order: Vec<usize>,
}

impl Playfield {
    /// Dimensions below 1 are raised to 1 so clamping always has a tile to land on.
    pub fn new(height: usize, width: usize) -> Self {
        let (w, h) = (width.max(1), height.max(1));
        Self {
            width: w,
            height: h,
            slots: (0..w).map(|_| vec![Tile::EMPTY; h]).collect(),
            order: (0..w).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Clamp each axis to the grid independently. Third value is true when either axis moved.
    #[inline]
    fn clamp(&self, y: i32, x: i32) -> (usize, usize, bool) {
        let cy = y.clamp(0, self.height as i32 - 1);
        let cx = x.clamp(0, self.width as i32 - 1);
        (cy as usize, cx as usize, cy != y || cx != x)
    }

    /// Tile at the clamped coordinate and whether the request was outside the grid.
    #[inline]
    pub fn lookup(&self, y: i32, x: i32) -> (Tile, bool) {
        let (cy, cx, outside) = self.clamp(y, x);
        (self.slots[self.order[cx]][cy], outside)
    }

    #[inline]
    pub fn get(&self, y: i32, x: i32) -> Tile {
        self.lookup(y, x).0
    }

    #[inline]
    fn get_mut(&mut self, y: i32, x: i32) -> &mut Tile {
        let (cy, cx, _) = self.clamp(y, x);
        &mut self.slots[self.order[cx]][cy]
    }

    /// If logical column `x` holds no Colored tile, take it out and put a fresh
    /// empty column back at the front (left half) or the back (right half).
    pub fn compact_column(&mut self, x: usize) -> bool {
        let Some(&slot) = self.order.get(x) else {
            return false;
        };
        if self.slots[slot].iter().any(Tile::is_colored) {
            return false;
        }
        self.order.remove(x);
        self.slots[slot].fill(Tile::EMPTY);
        if x <= self.order.len() / 2 {
            self.order.insert(0, slot);
        } else {
            self.order.push(slot);
        }
        log::trace!("compacted column {x}");
        true
    }

    /// Row-major iterator over (y, x, tile).
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (y, x, self.slots[self.order[x]][y]))
        })
    }

    /// First Removed tile in row-major order.
    fn first_removed(&self) -> Option<(i32, i32)> {
        self.tiles()
            .find(|(_, _, t)| t.state == TileState::Removed)
            .map(|(y, x, _)| (y as i32, x as i32))
    }
}

/// Game board: playfield plus score counters.
#[derive(Debug, Clone)]
pub struct Board {
    playfield: Playfield,
    /// Committed score; only `click` changes it.
    points: u32,
    /// Score readout that ramps toward `points` while a cascade plays out.
    display_points: u32,
    last_color: TileColor,
}

impl Board {
    /// All-empty board.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            playfield: Playfield::new(height, width),
            points: 0,
            display_points: 0,
            last_color: TileColor::default(),
        }
    }

    /// Board with every tile Colored in a uniformly random colour.
    pub fn randomized<R: Rng>(height: usize, width: usize, rng: &mut R) -> Self {
        let mut board = Self::new(height, width);
        board.randomize(rng);
        board
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for slot in &mut self.playfield.slots {
            for tile in slot.iter_mut() {
                let color = TileColor::from_index(rng.random_range(0..TileColor::ALL.len()));
                *tile = Tile::colored(color);
            }
        }
    }

    /// Board from rows of optional colours (`None` = Empty). Short rows are padded with Empty.
    pub fn from_rows<R: AsRef<[Option<TileColor>]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut board = Self::new(height, width);
        for (y, row) in rows.iter().enumerate() {
            for (x, color) in row.as_ref().iter().enumerate() {
                if let Some(color) = color {
                    *board.playfield.get_mut(y as i32, x as i32) = Tile::colored(*color);
                }
            }
        }
        board
    }

    /// Preset layouts for trying out the end-of-game paths. Four colours only.
    pub fn demo(demo: Demo, height: usize, width: usize) -> Self {
        let (h, w) = (height.max(1), width.max(1));
        let mut rows: Vec<Vec<Option<TileColor>>> = (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| match demo {
                        Demo::LastMove => Some(TileColor::from_index((x + y + 2) % 4)),
                        Demo::Columns => Some(TileColor::from_index((x + 1) % 4)),
                    })
                    .collect()
            })
            .collect();
        if demo == Demo::LastMove && h >= 2 {
            // Diagonal stripes never touch; plant one matching group above the bottom row.
            let px = w / 2;
            rows[h - 2][px] = rows[h - 1][px];
        }
        Self::from_rows(&rows)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.playfield.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.playfield.height()
    }

    /// Copy of the tile at the clamped coordinate.
    #[inline]
    pub fn get(&self, y: i32, x: i32) -> Tile {
        self.playfield.get(y, x)
    }

    /// Like `get`, also reporting whether (y, x) lay outside the grid.
    #[inline]
    pub fn lookup(&self, y: i32, x: i32) -> (Tile, bool) {
        self.playfield.lookup(y, x)
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn display_points(&self) -> u32 {
        self.display_points
    }

    pub fn last_color(&self) -> TileColor {
        self.last_color
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// True when no tile is Marked or Removed.
    pub fn is_settled(&self) -> bool {
        self.playfield
            .tiles()
            .all(|(_, _, t)| matches!(t.state, TileState::Colored | TileState::Empty))
    }

    /// Click at (y, x). Marks the same-coloured group; groups larger than one
    /// score `n * (n - 1)` and seed the removal cascade at the clicked tile.
    /// Returns the group size, or 0 when nothing happened.
    pub fn click(&mut self, y: i32, x: i32) -> usize {
        let color = self.get(y, x).color;
        let marked = self.mark_group(y, x, color);
        match marked {
            0 => 0,
            1 => {
                self.playfield.get_mut(y, x).state = TileState::Colored;
                0
            }
            n => {
                self.points += (n * (n - 1)) as u32;
                let seed = self.playfield.get_mut(y, x);
                seed.state = TileState::Removed;
                self.last_color = seed.color;
                log::debug!("click ({y}, {x}): removed {n} {color:?} tiles, score {}", self.points);
                n
            }
        }
    }

    /// Mark every Colored tile of `color` 4-connected to (y, x). Returns how many were marked.
    /// The state flip to Marked doubles as the visited set.
    fn mark_group(&mut self, y: i32, x: i32, color: TileColor) -> usize {
        let mut count = 0;
        let mut stack = vec![(y, x)];
        while let Some((y, x)) = stack.pop() {
            let (tile, outside) = self.playfield.lookup(y, x);
            if outside || !tile.is_colored() || tile.color != color {
                continue;
            }
            self.playfield.get_mut(y, x).state = TileState::Marked;
            count += 1;
            for (dy, dx) in NEIGHBOURS_4 {
                stack.push((y + dy, x + dx));
            }
        }
        count
    }

    /// Advance the removal cascade by one tile: the first Removed tile (row-major)
    /// with a Marked neighbour turns that neighbour Removed. Returns false once
    /// nothing is left to flip, snapping the score readout to the committed score.
    pub fn simulate_removal(&mut self) -> bool {
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                if self.get(y, x).state != TileState::Removed {
                    continue;
                }
                self.display_points = (self.display_points + 1).min(self.points);
                for (dy, dx) in REMOVAL_ORDER {
                    let (neighbour, outside) = self.lookup(y + dy, x + dx);
                    if !outside && neighbour.state == TileState::Marked {
                        self.playfield.get_mut(y + dy, x + dx).state = TileState::Removed;
                        return true;
                    }
                }
            }
        }
        self.display_points = self.points;
        false
    }

    /// Resolve one fall: the first Removed tile (row-major) and the non-Colored run
    /// below it are filled by shifting the column above down; the vacated top rows
    /// become Empty and the column is compacted if nothing is left in it.
    pub fn simulate_fall(&mut self) -> bool {
        let Some((y, x)) = self.playfield.first_removed() else {
            return false;
        };
        let mut gap = 0;
        loop {
            let (below, outside) = self.lookup(y + gap + 1, x);
            if outside || below.is_colored() {
                break;
            }
            gap += 1;
        }
        let shift = gap + 1;
        for g in (shift..=y + gap).rev() {
            let source = self.get(g - shift, x);
            *self.playfield.get_mut(g, x) = source;
        }
        for g in 0..shift {
            *self.playfield.get_mut(g, x) = Tile::EMPTY;
        }
        log::trace!("fall in column {x}: {shift} rows");
        self.playfield.compact_column(x as usize);
        true
    }

    /// Compact logical column `x` if it holds no Colored tile.
    pub fn compact_column(&mut self, x: usize) -> bool {
        self.playfield.compact_column(x)
    }

    /// True when every column is empty. Compacts along the way, so only call on a settled board.
    pub fn check_won(&mut self) -> bool {
        debug_assert!(self.is_settled(), "win check on an unsettled board");
        let width = self.width();
        (0..width).all(|x| self.compact_column(x))
    }

    /// True when no Colored tile has a Colored neighbour of the same colour.
    pub fn check_lost(&self) -> bool {
        self.playfield
            .tiles()
            .all(|(y, x, _)| self.is_alone(y as i32, x as i32))
    }

    fn is_alone(&self, y: i32, x: i32) -> bool {
        let tile = self.get(y, x);
        if !tile.is_colored() {
            return true;
        }
        !NEIGHBOURS_4
            .iter()
            .any(|&(dy, dx)| self.same_color(y + dy, x + dx, tile.color))
    }

    fn same_color(&self, y: i32, x: i32, color: TileColor) -> bool {
        let (tile, outside) = self.lookup(y, x);
        !outside && tile.is_colored() && tile.color == color
    }
}
