// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OpenStreetMap tile fetching with an on-disk cache.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};

pub const TILE_SIZE: f32 = 256.0;
const CACHE_DURATION_DAYS: u64 = 7;
const USER_AGENT: &str = concat!("flight-tracker/", env!("CARGO_PKG_VERSION"));

/// Web Mercator projection utilities
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Latitude to fractional tile Y at `zoom`
    #[must_use]
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(i32::from(zoom));
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Longitude to fractional tile X at `zoom`
    #[must_use]
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        ((lon + 180.0) / 360.0) * n
    }

    #[must_use]
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        let lat_rad = (std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh().atan();
        lat_rad.to_degrees()
    }

    #[must_use]
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        x / n * 360.0 - 180.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    #[must_use]
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Tile URL on the OpenStreetMap servers
    #[must_use]
    pub fn url(&self) -> String {
        let subdomain = ['a', 'b', 'c'][((self.x + self.y) % 3) as usize];
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            subdomain, self.zoom, self.x, self.y
        )
    }

    /// Cache filename, keyed on tile position rather than mirror
    fn cache_filename(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("osm/{}/{}/{}", self.zoom, self.x, self.y).as_bytes());
        format!("{:x}.png", hasher.finalize())
    }

    fn texture_name(&self) -> String {
        format!("tile_{}_{}/{}", self.zoom, self.x, self.y)
    }
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

type TileMap = Arc<Mutex<HashMap<TileCoord, TileState>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct TileManager {
    cache_dir: PathBuf,
    tiles: TileMap,
    download_queue: Arc<Mutex<HashSet<TileCoord>>>,
    client: Option<reqwest::blocking::Client>,
}

impl std::fmt::Debug for TileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileManager")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Default for TileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TileManager {
    #[must_use]
    pub fn new() -> Self {
        let cache_dir = Self::get_cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {}", e);
        }

        Self::cleanup_old_tiles(&cache_dir);

        let client = match reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Tile downloads disabled, HTTP client failed to build: {}", e);
                None
            }
        };

        Self {
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            download_queue: Arc::new(Mutex::new(HashSet::new())),
            client,
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("flight-tracker");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        let Ok(entries) = fs::read_dir(cache_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired {
                let _ = fs::remove_file(entry.path());
                debug!("Removed old tile cache: {}", entry.path().display());
            }
        }
    }

    /// Get tile from cache or queue for download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = lock(&self.tiles);

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let cache_path = self.cache_dir.join(coord.cache_filename());

                if cache_path.exists() {
                    match fs::read(&cache_path)
                        .map_err(|e| e.to_string())
                        .and_then(|bytes| decode_tile(&bytes, coord, ctx))
                    {
                        Ok(texture) => {
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            return Some(texture);
                        }
                        Err(e) => warn!("Failed to load cached tile: {}", e),
                    }
                }

                tiles.insert(coord, TileState::Loading);
                drop(tiles);
                self.queue_download(coord, ctx.clone());
                None
            }
        }
    }

    fn queue_download(&self, coord: TileCoord, ctx: egui::Context) {
        let Some(client) = self.client.clone() else {
            lock(&self.tiles).insert(coord, TileState::Failed);
            return;
        };

        if !lock(&self.download_queue).insert(coord) {
            return;
        }

        let tiles = Arc::clone(&self.tiles);
        let queue = Arc::clone(&self.download_queue);
        let cache_dir = self.cache_dir.clone();

        std::thread::spawn(move || {
            let state = match Self::download_tile(&client, coord, &cache_dir, &ctx) {
                Ok(texture) => TileState::Loaded(texture),
                Err(e) => {
                    warn!("Failed to fetch tile {}: {}", coord.url(), e);
                    TileState::Failed
                }
            };
            lock(&tiles).insert(coord, state);
            lock(&queue).remove(&coord);
            ctx.request_repaint();
        });
    }

    fn download_tile(
        client: &reqwest::blocking::Client,
        coord: TileCoord,
        cache_dir: &Path,
        ctx: &egui::Context,
    ) -> Result<TextureHandle, String> {
        let url = coord.url();
        debug!("Downloading tile: {}", url);

        let response = client.get(&url).send().map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let bytes = response.bytes().map_err(|e| e.to_string())?;

        let cache_path = cache_dir.join(coord.cache_filename());
        if let Err(e) = fs::write(&cache_path, &bytes) {
            warn!("Failed to save tile to cache: {}", e);
        }

        decode_tile(&bytes, coord, ctx)
    }

    /// Tiles covering a viewport, with their pixel offsets from its center
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "tile indices are bounded by 2^zoom with zoom <= 19"
    )]
    pub fn get_visible_tiles(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<(TileCoord, f32, f32)> {
        let mut tiles = Vec::new();

        let center_tile_x = WebMercator::lon_to_x(center_lon, zoom);
        let center_tile_y = WebMercator::lat_to_y(center_lat, zoom);

        let tiles_wide = (viewport_width / TILE_SIZE).ceil() as i32 + 2;
        let tiles_high = (viewport_height / TILE_SIZE).ceil() as i32 + 2;

        let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

        let max_tile = 2_i32.pow(u32::from(zoom));

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Longitude wraps, latitude doesn't
                let wrapped_x = tile_x.rem_euclid(max_tile);
                if (0..max_tile).contains(&tile_y) {
                    let coord = TileCoord::new(wrapped_x as u32, tile_y as u32, zoom);

                    let offset_x = (f64::from(tile_x) - center_tile_x) * f64::from(TILE_SIZE);
                    let offset_y = (f64::from(tile_y) - center_tile_y) * f64::from(TILE_SIZE);

                    tiles.push((coord, offset_x as f32, offset_y as f32));
                }
            }
        }

        tiles
    }

    #[must_use]
    pub fn has_loading_tiles(&self) -> bool {
        lock(&self.tiles)
            .values()
            .any(|state| matches!(state, TileState::Loading))
    }

    #[must_use]
    pub fn get_error_count(&self) -> usize {
        lock(&self.tiles)
            .values()
            .filter(|state| matches!(state, TileState::Failed))
            .count()
    }
}

fn decode_tile(bytes: &[u8], coord: TileCoord, ctx: &egui::Context) -> Result<TextureHandle, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw());

    Ok(ctx.load_texture(coord.texture_name(), color_image, egui::TextureOptions::default()))
}
