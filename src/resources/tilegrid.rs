//! Tile grid built from a map file.
//!
//! A [`TileGrid`] is a `height` x `width` array of [`Tile`]s, each one a
//! fixed-position animation registered with an
//! [`AnimationScheduler`]. All tiles share the grid's z-layer. A tile at
//! `(col, row)` is drawn at `(col * w, row * h)` where `(w, h)` is its own
//! scaled frame size, so equally sized tiles line up edge to edge.
//!
//! The shape is fixed once loaded. What each cell shows, and its scale, can
//! change in place.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::error::{LookupError, MapError};
use crate::mapfile::MapFile;
use crate::resources::animationstore::AnimationSet;
use crate::resources::assetmanager::AssetManager;
use crate::resources::framestore::Frame;
use crate::scheduler::{AnimationScheduler, Placement, SpriteHandle};

/// One cell of a [`TileGrid`].
#[derive(Debug)]
pub struct Tile {
    col: usize,
    row: usize,
    sprite: SpriteHandle,
    asset: String,
    sequence: String,
    scale: f64,
}

impl Tile {
    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn sprite(&self) -> &SpriteHandle {
        &self.sprite
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn layout<F: Frame>(
        &self,
        scheduler: &mut AnimationScheduler,
        assets: &AssetManager<F>,
    ) -> Result<(), LookupError> {
        let (w, h) = scheduler.scaled_size(&self.sprite, assets.frames())?;
        scheduler.set_position(&self.sprite, self.col as i32 * w, self.row as i32 * h)
    }
}

/// A layer of tiles sharing one z-layer.
///
/// The grid owns its tiles' handles. Dropping it removes them from the
/// scheduler on the next pass; [`TileGrid::despawn`] removes them at once.
#[derive(Debug)]
pub struct TileGrid {
    name: String,
    width: usize,
    height: usize,
    z_layer: i32,
    visible: bool,
    tiles: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// Read a map file and register one animation per cell.
    pub fn load_map<F: Frame>(
        path: impl AsRef<Path>,
        assets: &AssetManager<F>,
        scheduler: &mut AnimationScheduler,
        scale: f64,
    ) -> Result<Self, MapError> {
        let path = path.as_ref();
        let map = MapFile::read(path).inspect_err(|e| {
            log::error!("could not load map {}: {}", path.display(), e);
        })?;
        Self::from_map(&map, assets, scheduler, scale)
    }

    /// Build a grid from a parsed map.
    ///
    /// Every palette entry is resolved before anything is registered, so on
    /// error the scheduler is left untouched.
    pub fn from_map<F: Frame>(
        map: &MapFile,
        assets: &AssetManager<F>,
        scheduler: &mut AnimationScheduler,
        scale: f64,
    ) -> Result<Self, MapError> {
        let mut palette: BTreeMap<u32, (&Arc<AnimationSet>, &str)> = BTreeMap::new();
        for (&index, entry) in &map.palette {
            let unresolved = || MapError::UnresolvedPalette {
                index,
                asset: entry.asset.clone(),
                sequence: entry.sequence.clone(),
            };
            let set = match assets.animation_set(&entry.asset) {
                Ok(set) => set,
                Err(LookupError::NotReady) => return Err(LookupError::NotReady.into()),
                Err(_) => return Err(unresolved()),
            };
            if !set.has_sequence(&entry.sequence) {
                return Err(unresolved());
            }
            palette.insert(index, (set, entry.sequence.as_str()));
        }

        if map.cells.len() != map.height {
            return Err(MapError::format(
                map.row_line(map.cells.len()),
                format!("expected {} rows, found {}", map.height, map.cells.len()),
            ));
        }
        for (row, cells) in map.cells.iter().enumerate() {
            if cells.len() != map.width {
                return Err(MapError::format(
                    map.row_line(row),
                    format!("row {row} has {} tiles, expected {}", cells.len(), map.width),
                ));
            }
            if let Some(&value) = cells.iter().find(|v| !palette.contains_key(v)) {
                return Err(MapError::UnknownPaletteIndex {
                    line: map.row_line(row),
                    value,
                });
            }
        }

        let mut tiles: Vec<Vec<Tile>> = Vec::with_capacity(map.height);
        for (row, cells) in map.cells.iter().enumerate() {
            let mut line = Vec::with_capacity(map.width);
            for (col, value) in cells.iter().enumerate() {
                let Some(&(set, sequence)) = palette.get(value) else {
                    continue;
                };
                let placed = place_tile(
                    scheduler,
                    assets,
                    set,
                    sequence,
                    col,
                    row,
                    scale,
                    map.z_layer,
                );
                match placed {
                    Ok(tile) => line.push(tile),
                    Err(e) => {
                        for tile in line.into_iter().chain(tiles.into_iter().flatten()) {
                            scheduler.deregister(tile.sprite);
                        }
                        return Err(e.into());
                    }
                }
            }
            tiles.push(line);
        }

        info!(
            "loaded map '{}': {}x{} tiles at z={}, {} palette entries",
            map.name,
            map.width,
            map.height,
            map.z_layer,
            palette.len()
        );

        Ok(Self {
            name: map.name.clone(),
            width: map.width,
            height: map.height,
            z_layer: map.z_layer,
            visible: true,
            tiles,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn z_layer(&self) -> i32 {
        self.z_layer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tile(&self, col: usize, row: usize) -> Result<&Tile, LookupError> {
        self.tiles
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(LookupError::TileOutOfBounds { col, row })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.iter().map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    fn tile_mut(&mut self, col: usize, row: usize) -> Result<&mut Tile, LookupError> {
        self.tiles
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(LookupError::TileOutOfBounds { col, row })
    }

    /// Move every tile to `z_layer`.
    pub fn set_z_layer(
        &mut self,
        scheduler: &mut AnimationScheduler,
        z_layer: i32,
    ) -> Result<(), LookupError> {
        self.z_layer = z_layer;
        for tile in self.tiles.iter().flatten() {
            scheduler.set_z_layer(&tile.sprite, z_layer)?;
        }
        Ok(())
    }

    /// Show or hide the whole grid. Hidden tiles keep animating.
    pub fn set_visible(
        &mut self,
        scheduler: &mut AnimationScheduler,
        visible: bool,
    ) -> Result<(), LookupError> {
        self.visible = visible;
        for tile in self.tiles.iter().flatten() {
            scheduler.set_hidden(&tile.sprite, !visible)?;
        }
        Ok(())
    }

    /// Show `asset::sequence` in a cell, keeping the cell's scale.
    pub fn update_tile<F: Frame>(
        &mut self,
        scheduler: &mut AnimationScheduler,
        assets: &AssetManager<F>,
        col: usize,
        row: usize,
        asset: &str,
        sequence: &str,
    ) -> Result<(), LookupError> {
        let set = assets.animation_set(asset)?;
        set.sequence(sequence)?;
        let (z_layer, visible) = (self.z_layer, self.visible);

        let tile = self.tile_mut(col, row)?;
        let replacement = place_tile(
            scheduler, assets, set, sequence, tile.col, tile.row, tile.scale, z_layer,
        )?;
        if !visible {
            scheduler.set_hidden(&replacement.sprite, true)?;
        }
        let old = std::mem::replace(tile, replacement);
        scheduler.deregister(old.sprite);
        debug!("tile ({col}, {row}) now shows {asset}::{sequence}");
        Ok(())
    }

    /// Change one tile's scale and lay it out again.
    pub fn set_tile_scale<F: Frame>(
        &mut self,
        scheduler: &mut AnimationScheduler,
        assets: &AssetManager<F>,
        col: usize,
        row: usize,
        scale: f64,
    ) -> Result<(), LookupError> {
        let tile = self.tile_mut(col, row)?;
        tile.scale = scale;
        scheduler.set_scale(&tile.sprite, scale)?;
        tile.layout(scheduler, assets)
    }

    /// Draw the tile stored at `(col, row)` as if it sat at
    /// `(draw_col, draw_row)`. The tile stays in its slot.
    pub fn set_tile_coords<F: Frame>(
        &mut self,
        scheduler: &mut AnimationScheduler,
        assets: &AssetManager<F>,
        col: usize,
        row: usize,
        draw_col: usize,
        draw_row: usize,
    ) -> Result<(), LookupError> {
        let tile = self.tile_mut(col, row)?;
        tile.col = draw_col;
        tile.row = draw_row;
        tile.layout(scheduler, assets)
    }

    /// Deregister every tile.
    pub fn despawn(self, scheduler: &mut AnimationScheduler) {
        for tile in self.tiles.into_iter().flatten() {
            scheduler.deregister(tile.sprite);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn place_tile<F: Frame>(
    scheduler: &mut AnimationScheduler,
    assets: &AssetManager<F>,
    set: &Arc<AnimationSet>,
    sequence: &str,
    col: usize,
    row: usize,
    scale: f64,
    z_layer: i32,
) -> Result<Tile, LookupError> {
    let sprite = scheduler.register(
        Arc::clone(set),
        sequence,
        Placement::default().with_z(z_layer).with_scale(scale),
    )?;
    let tile = Tile {
        col,
        row,
        sprite,
        asset: set.name().to_string(),
        sequence: sequence.to_string(),
        scale,
    };
    if let Err(e) = tile.layout(scheduler, assets) {
        scheduler.deregister(tile.sprite);
        return Err(e);
    }
    Ok(tile)
}
