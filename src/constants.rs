// --- Window ---
pub const SCREEN_WIDTH: u32 = 800;
pub const SCREEN_HEIGHT: u32 = 600;
pub const WINDOW_TITLE: &str = "Game Start Menu";
pub const GAME_TITLE: &str = "Astro Assault";
pub const FRAMES_PER_SECOND: u32 = 60;

// --- Player ---
pub const PLAYER_SPEED: f64 = 5.0; // Pixels per frame
pub const PLAYER_BOTTOM_MARGIN: f64 = 50.0; // Distance of the ship's center from the bottom edge
pub const SHOOT_DELAY_MS: u64 = 250;

// --- Laser ---
pub const LASER_SPEED: f64 = 10.0; // Pixels per frame, upwards
pub const LASER_WIDTH: u32 = 10;
pub const LASER_HEIGHT: u32 = 15;
pub const LASER_COLOR: [u8; 4] = [255, 255, 0, 255];

// --- Asteroids ---
pub const ASTEROID_MIN_SPEED: u32 = 5;
pub const ASTEROID_MAX_SPEED: u32 = 10;
pub const INITIAL_SPAWN_INTERVAL_MS: u64 = 1000;
pub const MIN_SPAWN_INTERVAL_MS: u64 = 200;
pub const SPAWN_INTERVAL_STEP_MS: u64 = 100;
pub const SCORE_PER_DIFFICULTY_STEP: u32 = 5;

// --- Input ---
pub const HELD_KEY_GRACE_MS: u64 = 150; // Only used when the terminal never reports releases
pub const FIRST_REPEAT_DELAY_MS: u64 = 600; // Pause before a terminal starts auto-repeating

// --- Assets ---
pub const PLAYER_SPRITE_PATH: &str = "assets/images/spaceship2.png";
pub const ASTEROID_SPRITE_PATH: &str = "assets/images/asteroid.png";
pub const MENU_BACKGROUND_PATH: &str = "assets/images/menu-background.png";
pub const GAME_BACKGROUND_PATH: &str = "assets/images/game-background.png";
pub const MENU_MUSIC_PATH: &str = "assets/sounds/menu-music.mp3";
pub const LASER_SOUND_PATH: &str = "assets/sounds/laser-gun.mp3";

pub const CONFIG_PATH: &str = "astro-assault.toml";
pub const LOG_PATH: &str = "astro-assault.log";
