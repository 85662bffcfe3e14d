use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::config::AssetPaths;
use crate::errors::{GameError, GameResult};

/// Sound cues the game loop triggers.
pub trait Soundboard {
    /// Starts the looping menu track from the beginning.
    fn start_menu_music(&mut self);
    fn stop_music(&mut self);
    /// Plays the laser cue once, cutting off a previous one still playing.
    fn play_laser(&mut self);
    fn stop_laser(&mut self);
}

type SoundClip = Buffered<Decoder<BufReader<File>>>;

fn load_clip(path: &Path) -> GameResult<SoundClip> {
    let file = File::open(path).map_err(|source| GameError::SoundFile {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| GameError::SoundDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoder.buffered())
}

/// Plays the game's sounds on the default output device. Each cue gets its
/// own sink so music and effects can be stopped independently.
pub struct RodioSoundboard {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    menu_music: SoundClip,
    laser: SoundClip,
    music_sink: Option<Sink>,
    laser_sink: Option<Sink>,
}

impl RodioSoundboard {
    pub fn open(paths: &AssetPaths) -> GameResult<Self> {
        let (stream, handle) = OutputStream::try_default()?;
        // Fail at startup rather than on the first cue if the device cannot take a sink.
        drop(Sink::try_new(&handle)?);
        let menu_music = load_clip(&paths.menu_music)?;
        let laser = load_clip(&paths.laser_sound)?;
        info!("Audio ready.");
        Ok(RodioSoundboard {
            _stream: stream,
            handle,
            menu_music,
            laser,
            music_sink: None,
            laser_sink: None,
        })
    }

    fn new_sink(&self) -> Option<Sink> {
        match Sink::try_new(&self.handle) {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!("Could not create audio sink: {}", e);
                None
            }
        }
    }
}

impl Soundboard for RodioSoundboard {
    fn start_menu_music(&mut self) {
        self.stop_music();
        if let Some(sink) = self.new_sink() {
            sink.append(self.menu_music.clone().repeat_infinite());
            self.music_sink = Some(sink);
        }
    }

    fn stop_music(&mut self) {
        if let Some(sink) = self.music_sink.take() {
            sink.stop();
        }
    }

    fn play_laser(&mut self) {
        self.stop_laser();
        if let Some(sink) = self.new_sink() {
            sink.append(self.laser.clone());
            self.laser_sink = Some(sink);
        }
    }

    fn stop_laser(&mut self) {
        if let Some(sink) = self.laser_sink.take() {
            if !sink.empty() {
                sink.stop();
            }
        }
    }
}

impl Drop for RodioSoundboard {
    fn drop(&mut self) {
        self.stop_laser();
        self.stop_music();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_sound_file_is_reported_with_its_path() {
        let path = PathBuf::from("no/such/laser.mp3");
        match load_clip(&path) {
            Err(GameError::SoundFile { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("missing file loaded"),
        }
    }
}
