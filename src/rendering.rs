use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::assets::{RenderResources, Sprite};
use crate::constants::GAME_TITLE;
use crate::entities::EntityKind;
use crate::menu::Menu;
use crate::registry::EntityRegistry;
use crate::types::Rect;

pub const WHITE: Color = Color::Rgb { r: 255, g: 255, b: 255 };
pub const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };
pub const YELLOW: Color = Color::Rgb { r: 255, g: 255, b: 0 };
pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };

const SPRITE_GLYPH: char = '█';
const ALPHA_CUTOFF: u8 = 128;
const MENU_OPTION_SPACING: f64 = 100.0; // Play-field pixels between menu lines

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            glyph: ' ',
            fg: WHITE,
            bg: BLACK,
        }
    }
}

/// Maps the fixed play-field onto the terminal's cell grid.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub field_width: f64,
    pub field_height: f64,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, field_width: f64, field_height: f64) -> Self {
        Viewport {
            cols,
            rows,
            field_width,
            field_height,
        }
    }

    fn cell_width(&self) -> f64 {
        self.field_width / f64::from(self.cols.max(1))
    }

    fn cell_height(&self) -> f64 {
        self.field_height / f64::from(self.rows.max(1))
    }

    pub fn to_col(&self, x: f64) -> i64 {
        (x / self.cell_width()).floor() as i64
    }

    pub fn to_row(&self, y: f64) -> i64 {
        (y / self.cell_height()).floor() as i64
    }

    /// One past the last column an edge at `x` reaches into.
    fn to_col_end(&self, x: f64) -> i64 {
        (x / self.cell_width()).ceil() as i64
    }

    fn to_row_end(&self, y: f64) -> i64 {
        (y / self.cell_height()).ceil() as i64
    }

    /// Play-field point at the middle of a cell.
    pub fn cell_center(&self, col: u16, row: u16) -> (f64, f64) {
        (
            (f64::from(col) + 0.5) * self.cell_width(),
            (f64::from(row) + 0.5) * self.cell_height(),
        )
    }

    /// Cells covered by `rect`, clipped to the screen. Anything on screen
    /// covers at least one cell.
    pub fn cells_for(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let first_col = self.to_col(rect.left());
        let last_col = (self.to_col_end(rect.right()) - 1).max(first_col);
        let first_row = self.to_row(rect.top());
        let last_row = (self.to_row_end(rect.bottom()) - 1).max(first_row);

        let max_col = i64::from(self.cols) - 1;
        let max_row = i64::from(self.rows) - 1;
        if last_col < 0 || last_row < 0 || first_col > max_col || first_row > max_row {
            return None;
        }
        Some((
            first_col.max(0) as u16,
            last_col.min(max_col) as u16,
            first_row.max(0) as u16,
            last_row.min(max_row) as u16,
        ))
    }
}

/// Off-screen frame buffer of coloured cells.
pub struct GameGrid {
    cells: Vec<Cell>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        let i = self.index(x, y)?;
        Some(&self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        let i = self.index(x, y)?;
        Some(&mut self.cells[i])
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Writes text over whatever background is already there.
    pub fn put_text(&mut self, x: i64, y: u16, text: &str, fg: Color) {
        for (i, c) in text.chars().enumerate() {
            let col = x + i as i64;
            if col < 0 {
                continue;
            }
            let Ok(col) = u16::try_from(col) else {
                break;
            };
            if let Some(cell) = self.get_mut(col, y) {
                cell.glyph = c;
                cell.fg = fg;
            }
        }
    }

    pub fn put_text_centered(&mut self, y: u16, text: &str, fg: Color) {
        let x = i64::from(self.width / 2) - text.chars().count() as i64 / 2;
        self.put_text(x, y, text, fg);
    }

    #[cfg(test)]
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|cell| cell.glyph)
            .collect()
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        for y in 0..self.height {
            queue!(out, MoveTo(0, y))?;
            let mut current: Option<(Color, Color)> = None;
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else {
                    continue;
                };
                if current != Some((cell.fg, cell.bg)) {
                    queue!(out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
                    current = Some((cell.fg, cell.bg));
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

fn to_color(pixel: image::Rgba<u8>) -> Color {
    Color::Rgb {
        r: pixel[0],
        g: pixel[1],
        b: pixel[2],
    }
}

/// Repeats the image at its native pixel size across the whole play-field.
pub fn draw_background(grid: &mut GameGrid, viewport: &Viewport, background: &Sprite) {
    for row in 0..grid.height {
        for col in 0..grid.width {
            let (x, y) = viewport.cell_center(col, row);
            let pixel = background.sample_tiled(x, y);
            if let Some(cell) = grid.get_mut(col, row) {
                *cell = Cell {
                    glyph: ' ',
                    fg: WHITE,
                    bg: to_color(pixel),
                };
            }
        }
    }
}

/// Stretches the sprite over the cells `rect` covers; transparent pixels
/// leave the background visible.
pub fn draw_sprite(grid: &mut GameGrid, viewport: &Viewport, sprite: &Sprite, rect: &Rect) {
    let Some((first_col, last_col, first_row, last_row)) = viewport.cells_for(rect) else {
        return;
    };
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let (x, y) = viewport.cell_center(col, row);
            let u = ((x - rect.left()) / rect.width).clamp(0.0, 1.0);
            let v = ((y - rect.top()) / rect.height).clamp(0.0, 1.0);
            let pixel = sprite.sample(u, v);
            if pixel[3] < ALPHA_CUTOFF {
                continue;
            }
            if let Some(cell) = grid.get_mut(col, row) {
                cell.glyph = SPRITE_GLYPH;
                cell.fg = to_color(pixel);
            }
        }
    }
}

pub fn draw_menu(
    grid: &mut GameGrid,
    viewport: &Viewport,
    resources: &RenderResources,
    menu: &Menu,
) {
    draw_background(grid, viewport, &resources.menu_background);

    let title_row = viewport.to_row(viewport.field_height / 4.0).max(0) as u16;
    grid.put_text_centered(title_row, GAME_TITLE, YELLOW);

    for (i, option) in menu.options().iter().enumerate() {
        let y = viewport.field_height / 2.0 + i as f64 * MENU_OPTION_SPACING;
        let row = viewport.to_row(y).max(0) as u16;
        let color = if i == menu.selected_index() { RED } else { WHITE };
        grid.put_text_centered(row, option.label(), color);
    }
}

pub fn draw_game(
    grid: &mut GameGrid,
    viewport: &Viewport,
    resources: &RenderResources,
    registry: &EntityRegistry,
    score: u32,
) {
    draw_background(grid, viewport, &resources.game_background);
    for entity in registry.iter().filter(|e| e.alive) {
        let sprite = match entity.kind {
            EntityKind::Player => &resources.player,
            EntityKind::Laser => &resources.laser,
            EntityKind::Asteroid => &resources.asteroid,
        };
        draw_sprite(grid, viewport, sprite, &entity.rect);
    }
    grid.put_text(0, 0, &format!("Score: {}", score), WHITE);
}
