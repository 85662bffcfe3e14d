use std::path::Path;

use image::{Rgba, RgbaImage};
use log::info;

use crate::config::GameConfig;
use crate::constants::LASER_COLOR;
use crate::errors::{GameError, GameResult};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// RGBA picture used for entities and backgrounds.
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    pub fn load(path: &Path) -> GameResult<Self> {
        let image = image::open(path)
            .map_err(|source| GameError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Sprite { image })
    }

    /// Filled rectangle, e.g. the laser bolt.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Sprite {
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    #[cfg(test)]
    pub fn from_image(image: RgbaImage) -> Self {
        Sprite { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Samples at normalised coordinates; `u` and `v` are clamped to `[0, 1]`.
    pub fn sample(&self, u: f64, v: f64) -> Rgba<u8> {
        if self.width() == 0 || self.height() == 0 {
            return TRANSPARENT;
        }
        let x = ((u.clamp(0.0, 1.0) * f64::from(self.width())) as u32).min(self.width() - 1);
        let y = ((v.clamp(0.0, 1.0) * f64::from(self.height())) as u32).min(self.height() - 1);
        *self.image.get_pixel(x, y)
    }

    /// Samples at pixel coordinates as if the image were repeated forever.
    pub fn sample_tiled(&self, x: f64, y: f64) -> Rgba<u8> {
        if self.width() == 0 || self.height() == 0 {
            return TRANSPARENT;
        }
        let px = (x.floor() as i64).rem_euclid(i64::from(self.width())) as u32;
        let py = (y.floor() as i64).rem_euclid(i64::from(self.height())) as u32;
        *self.image.get_pixel(px, py)
    }
}

/// Everything the renderer draws with, loaded once at startup.
pub struct RenderResources {
    pub player: Sprite,
    pub asteroid: Sprite,
    pub laser: Sprite,
    pub menu_background: Sprite,
    pub game_background: Sprite,
}

impl RenderResources {
    pub fn load(config: &GameConfig) -> GameResult<Self> {
        let assets = &config.assets;
        Ok(RenderResources {
            player: Sprite::load(&assets.player)?,
            asteroid: Sprite::load(&assets.asteroid)?,
            laser: Sprite::solid(
                config.gameplay.laser_width,
                config.gameplay.laser_height,
                LASER_COLOR,
            ),
            menu_background: Sprite::load(&assets.menu_background)?,
            game_background: Sprite::load(&assets.game_background)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Sprite {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, Rgba([255, 255, 255, 0]));
        Sprite::from_image(image)
    }

    #[test]
    fn sample_clamps_to_edges() {
        let sprite = checker();
        assert_eq!(sprite.sample(0.0, 0.0), Rgba([255, 0, 0, 255]));
        assert_eq!(sprite.sample(1.0, 0.0), Rgba([0, 255, 0, 255]));
        assert_eq!(sprite.sample(-3.0, 7.0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn tiled_sampling_wraps_both_ways() {
        let sprite = checker();
        assert_eq!(sprite.sample_tiled(2.0, 0.0), sprite.sample_tiled(0.0, 0.0));
        assert_eq!(sprite.sample_tiled(-1.0, 0.0), Rgba([0, 255, 0, 255]));
        assert_eq!(sprite.sample_tiled(5.5, 3.2), sprite.sample_tiled(1.0, 1.0));
    }

    #[test]
    fn solid_sprite_has_requested_size() {
        let laser = Sprite::solid(10, 15, LASER_COLOR);
        assert_eq!((laser.width(), laser.height()), (10, 15));
        assert_eq!(laser.sample(0.5, 0.5), Rgba(LASER_COLOR));
    }

    #[test]
    fn missing_image_names_the_file() {
        let err = Sprite::load(Path::new("assets/none.png")).err().unwrap();
        assert!(err.to_string().contains("assets/none.png"));
    }

    #[test]
    fn empty_sprite_samples_transparent() {
        let sprite = Sprite::from_image(RgbaImage::new(0, 0));
        assert_eq!(sprite.sample(0.5, 0.5)[3], 0);
        assert_eq!(sprite.sample_tiled(3.0, 3.0)[3], 0);
    }
}
