//! Error types for asset loading, lookups and map loading.
//!
//! Three families are kept apart so callers can tell a broken data file
//! from a bad key:
//! - [`AssetError`] aborts [`AssetManager::load_assets`](crate::resources::assetmanager::AssetManager::load_assets)
//! - [`MapError`] aborts [`TileGrid::load_map`](crate::resources::tilegrid::TileGrid::load_map)
//! - [`LookupError`] is returned by catalog, scheduler and grid queries and
//!   never mutates state

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Syntax error in an `objects.txt` definition, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("assets have already been loaded")]
    AlreadyLoaded,
    #[error("could not read asset definition file {path}: {source}")]
    DefinitionRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed asset definition: {0}")]
    Syntax(#[from] ParseError),
    #[error("asset '{0}' is declared more than once")]
    DuplicateAsset(String),
    #[error("asset '{asset}' declares sequence '{sequence}' more than once")]
    DuplicateSequence { asset: String, sequence: String },
    #[error(
        "sequence '{asset}::{sequence}' references frame {index}, but only {frame_count} frames were found"
    )]
    FrameIndexOutOfRange {
        asset: String,
        sequence: String,
        index: usize,
        frame_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("asset catalog is not loaded")]
    NotReady,
    #[error("unknown asset '{0}'")]
    UnknownAsset(String),
    #[error("asset '{asset}' has no sequence '{sequence}'")]
    UnknownSequence { asset: String, sequence: String },
    #[error("sprite is not registered with this scheduler")]
    UnknownInstance,
    #[error("no frame {frame} in sequence '{sequence}'")]
    UnknownFrame { sequence: String, frame: usize },
    #[error("tile ({col}, {row}) is outside the grid")]
    TileOutOfBounds { col: usize, row: usize },
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed map file at line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("palette entry {index} refers to unknown '{asset}::{sequence}'")]
    UnresolvedPalette {
        index: u32,
        asset: String,
        sequence: String,
    },
    #[error("line {line}: tile value {value} is not in the palette")]
    UnknownPaletteIndex { line: usize, value: u32 },
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl MapError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        MapError::Format {
            line,
            message: message.into(),
        }
    }
}
