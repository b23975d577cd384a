//! Displayed images and the single current selection.

use crate::asset::AssetResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub path: String,
    pub locator: String,
    pub status: LoadStatus,
}

/// A tile the view still has to load before the grid wait can settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub id: TileId,
    pub locator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Image(TileId),
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    AllLoaded,
    Failed { path: String, reason: String },
}

#[derive(Debug, Default)]
pub struct ImageGrid {
    tiles: Vec<Tile>,
    selection: Option<TileId>,
    next_id: u64,
    settled: bool,
}

impl ImageGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.selection = None;
        self.settled = false;
    }

    pub fn populate<R>(&mut self, paths: &[String], resolver: &R) -> Vec<PendingImage>
    where
        R: AssetResolver + ?Sized,
    {
        self.clear();
        self.tiles = paths
            .iter()
            .map(|path| {
                self.next_id += 1;
                Tile {
                    id: TileId(self.next_id),
                    path: path.clone(),
                    locator: resolver.locator(path),
                    status: LoadStatus::Pending,
                }
            })
            .collect();

        self.tiles
            .iter()
            .map(|tile| PendingImage {
                id: tile.id,
                locator: tile.locator.clone(),
            })
            .collect()
    }

    /// Marks the clicked image as the selection. Returns `false` for
    /// clicks that do not land on a tile of the current grid.
    pub fn select(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Image(id) if self.tile(id).is_some() => {
                self.selection = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> Option<&Tile> {
        self.selection.and_then(|id| self.tile(id))
    }

    pub fn is_selected(&self, id: TileId) -> bool {
        self.selection == Some(id)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn settle_if_empty(&mut self) -> Option<WaitOutcome> {
        if self.tiles.is_empty() && !self.settled {
            self.settled = true;
            return Some(WaitOutcome::AllLoaded);
        }
        None
    }

    /// Records one tile's load signal. Returns the wait's outcome the first
    /// time it settles: on the first failure, or once every tile loaded.
    pub fn record_load(
        &mut self,
        id: TileId,
        result: Result<(), String>,
    ) -> Option<WaitOutcome> {
        let tile = self.tiles.iter_mut().find(|tile| tile.id == id)?;
        let failure = match result {
            Ok(()) => {
                tile.status = LoadStatus::Loaded;
                None
            }
            Err(reason) => {
                tile.status = LoadStatus::Failed;
                Some((tile.path.clone(), reason))
            }
        };

        if self.settled {
            return None;
        }

        if let Some((path, reason)) = failure {
            self.settled = true;
            return Some(WaitOutcome::Failed { path, reason });
        }

        if self.tiles.iter().all(|tile| tile.status == LoadStatus::Loaded) {
            self.settled = true;
            return Some(WaitOutcome::AllLoaded);
        }
        None
    }
}
