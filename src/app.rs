use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::terminal::size;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::RenderResources;
use crate::audio::RodioSoundboard;
use crate::config::GameConfig;
use crate::errors::GameResult;
use crate::game::{Flow, FrameInput, Game, GameState};
use crate::rendering::{GameGrid, Viewport, draw_game, draw_menu};
use crate::terminal_io::{InputEvent, Key, KeyboardState, TerminalGuard, poll_events};

/// Sleeps away whatever is left of each frame's time budget.
pub struct FramePacer {
    budget: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        FramePacer {
            budget: Duration::from_secs(1) / fps.max(1),
            frame_start: Instant::now(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.frame_start.elapsed())
    }

    pub fn finish_frame(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }
}

/// Loads every resource, takes over the terminal and runs until the player
/// quits.
pub fn run(config: GameConfig) -> GameResult<()> {
    let resources = RenderResources::load(&config)?;
    let audio = RodioSoundboard::open(&config.assets)?;

    let terminal = TerminalGuard::enter(&config.window.title)?;
    let (cols, rows) = size().map_err(|e| {
        error!("Failed to get terminal size: {}", e);
        e
    })?;
    info!("Terminal size: {}x{}", cols, rows);

    let field_width = f64::from(config.window.width);
    let field_height = f64::from(config.window.height);
    let mut viewport = Viewport::new(cols, rows, field_width, field_height);
    let mut grid = GameGrid::new(cols, rows);
    let mut keyboard = KeyboardState::new(
        terminal.reports_key_release(),
        config.input.held_key_grace_ms,
        config.input.first_repeat_delay_ms,
    );
    let mut game = Game::new(
        &config,
        (resources.player.width(), resources.player.height()),
        (resources.asteroid.width(), resources.asteroid.height()),
        audio,
        StdRng::from_entropy(),
    );

    let mut pacer = FramePacer::new(config.window.fps);
    let mut stdout = io::stdout();
    let started = Instant::now();
    let mut last_ms = 0;
    let mut frame_count: u64 = 0;

    loop {
        pacer.begin_frame();
        let now_ms = started.elapsed().as_millis() as u64;
        let elapsed_ms = now_ms - last_ms;
        last_ms = now_ms;

        let events: Vec<InputEvent> = poll_events()?
            .into_iter()
            .map(|event| keyboard.apply(event, now_ms))
            .collect();
        for event in &events {
            if let InputEvent::Resize(new_cols, new_rows) = *event {
                viewport = Viewport::new(new_cols, new_rows, field_width, field_height);
                grid = GameGrid::new(new_cols, new_rows);
                info!("Terminal resized to {}x{}", new_cols, new_rows);
            }
        }

        let frame = FrameInput {
            now_ms,
            elapsed_ms,
            events: &events,
            left_held: keyboard.is_held(Key::Left, now_ms),
            right_held: keyboard.is_held(Key::Right, now_ms),
        };
        let state_before = game.state();
        if game.tick(&frame) == Flow::Exit {
            break;
        }
        if game.state() != state_before {
            keyboard.release_all();
        }

        grid.clear();
        match game.state() {
            GameState::Menu => {
                draw_menu(&mut grid, &viewport, &resources, &game.session.menu)
            }
            GameState::Game => draw_game(
                &mut grid,
                &viewport,
                &resources,
                &game.registry,
                game.score(),
            ),
        }
        grid.render(&mut stdout).map_err(|e| {
            error!("Failed to draw frame: {}", e);
            e
        })?;

        frame_count += 1;
        pacer.finish_frame();
    }

    info!(
        "Game loop ended after {} frames with score {}.",
        frame_count,
        game.score()
    );
    drop(game);
    drop(terminal);
    Ok(())
}
