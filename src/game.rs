use log::info;
use rand::rngs::StdRng;

use crate::audio::Soundboard;
use crate::config::{GameConfig, SessionPolicy};
use crate::constants::PLAYER_BOTTOM_MARGIN;
use crate::entities::{Player, PlayerSpec};
use crate::menu::{Menu, MenuOption};
use crate::registry::{EntityId, EntityRegistry};
use crate::spawner::{AsteroidSpawner, Difficulty};
use crate::terminal_io::{InputEvent, Key};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Game,
}

/// Whether the loop should keep running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Round-scoped state.
pub struct GameSession {
    pub state: GameState,
    pub menu: Menu,
    pub score: u32,
    pub spawn_interval_ms: u64,
}

/// One frame's worth of input and timing.
pub struct FrameInput<'a> {
    /// Milliseconds since the game started.
    pub now_ms: u64,
    /// Milliseconds since the previous frame.
    pub elapsed_ms: u64,
    pub events: &'a [InputEvent],
    pub left_held: bool,
    pub right_held: bool,
}

pub struct Game<S: Soundboard> {
    pub session: GameSession,
    pub registry: EntityRegistry,
    pub player: Player,
    spawner: AsteroidSpawner,
    difficulty: Difficulty,
    policy: SessionPolicy,
    field_width: f64,
    field_height: f64,
    audio: S,
    rng: StdRng,
}

impl<S: Soundboard> Game<S> {
    /// Builds the session in the menu with the menu music playing.
    pub fn new(
        config: &GameConfig,
        player_size: (u32, u32),
        asteroid_size: (u32, u32),
        mut audio: S,
        rng: StdRng,
    ) -> Self {
        let gameplay = &config.gameplay;
        let field_width = f64::from(config.window.width);
        let field_height = f64::from(config.window.height);

        let mut registry = EntityRegistry::new();
        let spec = PlayerSpec {
            width: f64::from(player_size.0),
            height: f64::from(player_size.1),
            speed: gameplay.player_speed,
            shoot_delay_ms: gameplay.shoot_delay_ms,
            bottom_margin: PLAYER_BOTTOM_MARGIN,
            laser_width: f64::from(gameplay.laser_width),
            laser_height: f64::from(gameplay.laser_height),
            laser_speed: gameplay.laser_speed,
        };
        let player = Player::spawn(&mut registry, spec, field_width, field_height);
        let spawner = AsteroidSpawner::new(
            f64::from(asteroid_size.0),
            f64::from(asteroid_size.1),
            gameplay.asteroid_min_speed,
            gameplay.asteroid_max_speed,
        );
        let difficulty = Difficulty {
            initial_interval_ms: gameplay.spawn_interval_ms,
            floor_ms: gameplay.spawn_interval_floor_ms,
            step_ms: gameplay.spawn_interval_step_ms,
            score_per_step: gameplay.score_per_step,
        };

        audio.start_menu_music();

        Game {
            session: GameSession {
                state: GameState::Menu,
                menu: Menu::new(),
                score: 0,
                spawn_interval_ms: difficulty.spawn_interval_for_score(0),
            },
            registry,
            player,
            spawner,
            difficulty,
            policy: gameplay.session_policy,
            field_width,
            field_height,
            audio,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.session.state
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    #[cfg(test)]
    pub fn audio(&self) -> &S {
        &self.audio
    }

    /// Runs one frame: input dispatch, then (in gameplay) spawning, movement,
    /// collisions and difficulty.
    pub fn tick(&mut self, frame: &FrameInput) -> Flow {
        for event in frame.events {
            if *event == InputEvent::Close {
                info!("Close requested.");
                self.shut_down();
                return Flow::Exit;
            }
            let flow = match self.session.state {
                GameState::Menu => self.handle_menu_input(event),
                GameState::Game => self.handle_game_input(event, frame.now_ms),
            };
            if flow == Flow::Exit {
                return Flow::Exit;
            }
        }

        if self.session.state == GameState::Game {
            self.update_world(frame);
        }
        Flow::Continue
    }

    fn handle_menu_input(&mut self, event: &InputEvent) -> Flow {
        let InputEvent::KeyDown(key) = event else {
            return Flow::Continue;
        };
        match key {
            Key::Up => self.session.menu.select_previous(),
            Key::Down => self.session.menu.select_next(),
            Key::Enter => match self.session.menu.selected() {
                MenuOption::StartGame => self.start_round(),
                MenuOption::Quit => {
                    info!("Quit selected.");
                    self.shut_down();
                    return Flow::Exit;
                }
            },
            _ => {}
        }
        Flow::Continue
    }

    fn handle_game_input(&mut self, event: &InputEvent, now_ms: u64) -> Flow {
        match event {
            InputEvent::KeyDown(Key::Escape) => self.return_to_menu(),
            InputEvent::KeyDown(Key::Space) => {
                self.player.shoot(&mut self.registry, now_ms);
                self.audio.play_laser();
            }
            _ => {}
        }
        Flow::Continue
    }

    fn start_round(&mut self) {
        info!("Starting the game...");
        self.audio.stop_music();
        if self.policy == SessionPolicy::Reset {
            self.reset_round();
        }
        self.session.state = GameState::Game;
    }

    fn reset_round(&mut self) {
        self.session.score = 0;
        self.session.spawn_interval_ms = self.difficulty.spawn_interval_for_score(0);
        self.spawner.reset();
        self.registry.clear_projectiles();
        self.player
            .reset(&mut self.registry, self.field_width, self.field_height);
    }

    fn return_to_menu(&mut self) {
        info!("Back to menu with score {}.", self.session.score);
        self.session.state = GameState::Menu;
        self.audio.stop_laser();
        self.audio.start_menu_music();
    }

    fn shut_down(&mut self) {
        self.audio.stop_laser();
        self.audio.stop_music();
    }

    fn update_world(&mut self, frame: &FrameInput) {
        self.player.steer(
            &mut self.registry,
            frame.left_held,
            frame.right_held,
            self.field_width,
        );
        self.spawner.tick(
            frame.elapsed_ms,
            self.session.spawn_interval_ms,
            &mut self.registry,
            self.field_width,
            &mut self.rng,
        );
        self.registry.update_all(self.field_height);

        let hits = self.resolve_collisions();
        self.registry.prune();
        if hits > 0 {
            self.session.score += hits;
            self.apply_difficulty();
        }
    }

    /// Each laser destroys the first asteroid it overlaps, in spawn order, and
    /// is consumed with it. Returns the number of asteroids destroyed.
    fn resolve_collisions(&mut self) -> u32 {
        let mut hits = 0;
        let lasers: Vec<EntityId> = self.registry.lasers().to_vec();
        for laser_id in lasers {
            let Some(laser) = self.registry.get(laser_id).filter(|e| e.alive) else {
                continue;
            };
            let laser_rect = laser.rect;
            let target = self.registry.asteroids().iter().copied().find(|id| {
                self.registry
                    .get(*id)
                    .is_some_and(|rock| rock.alive && rock.rect.intersects(&laser_rect))
            });
            if let Some(asteroid_id) = target {
                self.registry.kill(asteroid_id);
                self.registry.kill(laser_id);
                hits += 1;
            }
        }
        hits
    }

    fn apply_difficulty(&mut self) {
        let interval = self.difficulty.spawn_interval_for_score(self.session.score);
        if interval != self.session.spawn_interval_ms {
            info!(
                "Score {} reached, asteroid interval now {} ms.",
                self.session.score, interval
            );
            self.session.spawn_interval_ms = interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{Cue, RecordingSoundboard};
    use crate::entities::{Entity, EntityKind};
    use crate::terminal_io::KeyboardState;
    use rand::SeedableRng;

    fn game_with(config: GameConfig) -> Game<RecordingSoundboard> {
        Game::new(
            &config,
            (50, 40),
            (40, 40),
            RecordingSoundboard::default(),
            StdRng::seed_from_u64(3),
        )
    }

    fn game() -> Game<RecordingSoundboard> {
        game_with(GameConfig::default())
    }

    fn frame(now_ms: u64, events: &[InputEvent]) -> FrameInput<'_> {
        FrameInput {
            now_ms,
            elapsed_ms: 16,
            events,
            left_held: false,
            right_held: false,
        }
    }

    fn press(game: &mut Game<RecordingSoundboard>, now_ms: u64, key: Key) -> Flow {
        game.tick(&frame(now_ms, &[InputEvent::KeyDown(key)]))
    }

    fn started() -> Game<RecordingSoundboard> {
        let mut game = game();
        press(&mut game, 0, Key::Enter);
        game
    }

    /// Motionless asteroid in the laser path, `gap` pixels above the ship.
    fn asteroid_above_player(game: &mut Game<RecordingSoundboard>, gap: f64) -> EntityId {
        let ship = game.player.rect(&game.registry).unwrap();
        let mut rock = Entity::asteroid(ship.center_x() - 20.0, 40.0, 40.0, 0.0);
        rock.rect.set_bottom(ship.top() - gap);
        game.registry.add(rock)
    }

    fn asteroid_over_player(game: &mut Game<RecordingSoundboard>) -> EntityId {
        asteroid_above_player(game, 5.0)
    }

    #[test]
    fn starts_in_menu_with_music() {
        let game = game();
        assert_eq!(game.state(), GameState::Menu);
        assert_eq!(game.audio().cues, vec![Cue::MenuMusicStarted]);
    }

    #[test]
    fn enter_on_start_game_begins_play_and_stops_music_once() {
        let mut game = game();
        assert_eq!(press(&mut game, 0, Key::Enter), Flow::Continue);
        assert_eq!(game.state(), GameState::Game);
        assert_eq!(game.audio().count(Cue::MusicStopped), 1);
    }

    #[test]
    fn enter_on_quit_exits() {
        let mut game = game();
        press(&mut game, 0, Key::Down);
        assert_eq!(press(&mut game, 10, Key::Enter), Flow::Exit);
        assert_eq!(game.audio().count(Cue::MusicStopped), 1);
    }

    #[test]
    fn menu_selection_wraps() {
        let mut game = game();
        press(&mut game, 0, Key::Up);
        assert_eq!(game.session.menu.selected_index(), 1);
        press(&mut game, 10, Key::Down);
        assert_eq!(game.session.menu.selected_index(), 0);
    }

    #[test]
    fn escape_returns_to_menu_and_restarts_music() {
        let mut game = started();
        assert_eq!(press(&mut game, 100, Key::Escape), Flow::Continue);
        assert_eq!(game.state(), GameState::Menu);
        assert_eq!(game.audio().count(Cue::MenuMusicStarted), 2);
        assert_eq!(game.audio().count(Cue::LaserStopped), 1);
    }

    #[test]
    fn close_exits_from_either_state() {
        let mut menu = game();
        assert_eq!(menu.tick(&frame(0, &[InputEvent::Close])), Flow::Exit);

        let mut playing = started();
        assert_eq!(playing.tick(&frame(5, &[InputEvent::Close])), Flow::Exit);
        assert!(playing.audio().count(Cue::MusicStopped) >= 2);
    }

    #[test]
    fn space_fires_and_plays_sound_per_press() {
        let mut game = started();
        press(&mut game, 1_000, Key::Space);
        assert_eq!(game.registry.lasers().len(), 1);
        press(&mut game, 1_100, Key::Space);
        assert_eq!(game.registry.lasers().len(), 1);
        assert_eq!(game.audio().count(Cue::LaserPlayed), 2);
    }

    #[test]
    fn auto_repeat_does_not_fire() {
        let mut game = started();
        game.tick(&frame(1_000, &[InputEvent::KeyRepeat(Key::Space)]));
        assert!(game.registry.lasers().is_empty());
    }

    #[test]
    fn held_space_without_release_reporting_fires_once() {
        let mut game = started();
        let mut keys = KeyboardState::new(false, 150, 600);
        for now_ms in (1_000..2_000).step_by(40) {
            let event = keys.apply(InputEvent::KeyDown(Key::Space), now_ms);
            game.tick(&frame(now_ms, &[event]));
        }
        assert_eq!(game.registry.lasers().len(), 1);
        assert_eq!(game.audio().count(Cue::LaserPlayed), 1);
    }

    #[test]
    fn held_arrow_moves_every_frame() {
        let mut game = started();
        let start = game.player.rect(&game.registry).unwrap().left();
        for i in 0..3 {
            game.tick(&FrameInput {
                right_held: true,
                ..frame(100 + i, &[])
            });
        }
        let moved = game.player.rect(&game.registry).unwrap().left();
        assert_eq!(moved, start + 15.0);
    }

    #[test]
    fn laser_hit_removes_both_and_scores_once() {
        let mut game = started();
        let rock = asteroid_above_player(&mut game, 200.0);
        press(&mut game, 1_000, Key::Space);
        let laser = game.registry.lasers()[0];
        assert_eq!(game.score(), 0);

        let mut frames = 0;
        while game.score() == 0 && frames < 40 {
            game.tick(&frame(1_016 + frames, &[]));
            frames += 1;
        }

        assert_eq!(game.score(), 1);
        assert!(game.registry.get(rock).is_none());
        assert!(game.registry.get(laser).is_none());
        assert!(!game.registry.asteroids().contains(&rock));
        assert!(!game.registry.lasers().contains(&laser));
        assert!(!game.registry.all().contains(&laser));
    }

    #[test]
    fn laser_does_not_pierce_stacked_asteroids() {
        let mut game = started();
        let first = asteroid_over_player(&mut game);
        let second = asteroid_over_player(&mut game);
        press(&mut game, 1_000, Key::Space);
        for i in 0..20 {
            game.tick(&frame(1_016 + i, &[]));
        }
        assert_eq!(game.score(), 1);
        assert!(game.registry.get(first).is_none());
        assert!(game.registry.get(second).is_some());
    }

    #[test]
    fn scoring_shortens_spawn_interval() {
        let mut game = started();
        assert_eq!(game.session.spawn_interval_ms, 1000);
        game.session.score = 4;
        let rock = asteroid_over_player(&mut game);
        press(&mut game, 1_000, Key::Space);
        for i in 0..20 {
            game.tick(&frame(1_016 + i, &[]));
        }
        assert!(game.registry.get(rock).is_none());
        assert_eq!(game.score(), 5);
        assert_eq!(game.session.spawn_interval_ms, 900);
    }

    #[test]
    fn asteroids_fall_in_during_play_only() {
        let mut game = game();
        for i in 0..100 {
            game.tick(&frame(i * 16, &[]));
        }
        assert!(game.registry.asteroids().is_empty());

        press(&mut game, 2_000, Key::Enter);
        for i in 0..70 {
            game.tick(&frame(2_016 + i * 16, &[]));
        }
        assert_eq!(game.registry.asteroids().len(), 1);
    }

    #[test]
    fn expired_entities_leave_every_collection() {
        let mut game = started();
        press(&mut game, 1_000, Key::Space);
        for i in 0..200 {
            game.tick(&frame(1_016 + i * 16, &[]));
            for id in game.registry.all() {
                assert!(game.registry.is_alive(*id));
            }
        }
        for id in game.registry.lasers() {
            assert!(game.registry.get(*id).unwrap().rect.bottom() >= 0.0);
        }
        for id in game.registry.asteroids() {
            let rock = game.registry.get(*id).unwrap();
            assert_eq!(rock.kind, EntityKind::Asteroid);
            assert!(rock.rect.top() <= 600.0);
        }
    }

    #[test]
    fn reset_policy_starts_fresh_rounds() {
        let mut game = started();
        game.session.score = 12;
        game.session.spawn_interval_ms = 800;
        asteroid_over_player(&mut game);
        press(&mut game, 1_000, Key::Escape);
        press(&mut game, 1_100, Key::Enter);

        assert_eq!(game.score(), 0);
        assert_eq!(game.session.spawn_interval_ms, 1000);
        assert!(game.registry.asteroids().is_empty());
        assert_eq!(game.registry.all(), &[game.player.id]);
    }

    #[test]
    fn persist_policy_resumes_rounds() {
        let mut config = GameConfig::default();
        config.gameplay.session_policy = SessionPolicy::Persist;
        let mut game = game_with(config);
        press(&mut game, 0, Key::Enter);
        game.session.score = 12;
        game.session.spawn_interval_ms = 800;
        let rock = asteroid_over_player(&mut game);
        press(&mut game, 1_000, Key::Escape);
        press(&mut game, 1_100, Key::Enter);

        assert_eq!(game.score(), 12);
        assert_eq!(game.session.spawn_interval_ms, 800);
        assert!(game.registry.get(rock).is_some());
    }
}
