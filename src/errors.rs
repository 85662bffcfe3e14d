use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop the game. All of these are fatal; the game does
/// not run in a degraded mode.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to open sound {path}: {source}")]
    SoundFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode sound {path}: {source}")]
    SoundDecode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output device: {0}")]
    AudioDevice(#[from] rodio::StreamError),

    #[error("failed to create audio sink: {0}")]
    AudioSink(#[from] rodio::PlayError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type GameResult<T> = Result<T, GameError>;
