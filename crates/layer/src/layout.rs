//! Tile grid descriptions and layout resolution.

use approx::relative_eq;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::{Crs, Error, Extent, Point, Result, SpatialKey};
use raster::{Columns, RasterSize, Rows};

/// Grid description: the number of tiles in both directions and the pixel
/// dimensions of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayout {
    pub layout_cols: i32,
    pub layout_rows: i32,
    pub tile_cols: i32,
    pub tile_rows: i32,
}

impl TileLayout {
    pub const fn new(layout_cols: i32, layout_rows: i32, tile_cols: i32, tile_rows: i32) -> Self {
        TileLayout {
            layout_cols,
            layout_rows,
            tile_cols,
            tile_rows,
        }
    }

    pub const fn tile_size(&self) -> RasterSize {
        RasterSize::with_rows_cols(Rows(self.tile_rows), Columns(self.tile_cols))
    }
}

impl std::fmt::Display for TileLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} tiles of {}x{} pixels",
            self.layout_cols, self.layout_rows, self.tile_cols, self.tile_rows
        )
    }
}

/// An extent paired with a tile layout, defines the full addressable grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefinition {
    pub extent: Extent,
    pub tile_layout: TileLayout,
}

/// Snaps values that sit on a grid boundary within floating point noise to the
/// boundary, so cell index math does not pick the neighboring cell.
pub(crate) fn snap_to_grid(pos: f64) -> f64 {
    if relative_eq!(pos, pos.round(), epsilon = 1e-9, max_relative = 1e-11) {
        pos.round()
    } else {
        pos
    }
}

impl LayoutDefinition {
    pub fn new(extent: Extent, tile_layout: TileLayout) -> Self {
        LayoutDefinition { extent, tile_layout }
    }

    /// World width of a single tile.
    pub fn tile_width(&self) -> f64 {
        self.extent.width() / self.tile_layout.layout_cols as f64
    }

    /// World height of a single tile.
    pub fn tile_height(&self) -> f64 {
        self.extent.height() / self.tile_layout.layout_rows as f64
    }

    pub fn cell_width(&self) -> f64 {
        self.tile_width() / self.tile_layout.tile_cols as f64
    }

    pub fn cell_height(&self) -> f64 {
        self.tile_height() / self.tile_layout.tile_rows as f64
    }

    /// The world extent covered by the tile with the given key.
    pub fn tile_extent(&self, key: SpatialKey) -> Extent {
        let tw = self.tile_width();
        let th = self.tile_height();

        Extent::new(
            self.extent.min_x + key.col as f64 * tw,
            self.extent.max_y - (key.row as f64 + 1.0) * th,
            self.extent.min_x + (key.col as f64 + 1.0) * tw,
            self.extent.max_y - key.row as f64 * th,
        )
    }

    /// The key of the tile containing the given point.
    /// Points on a shared tile edge map to the tile they are the minimum edge of.
    pub fn key_for_point(&self, p: Point) -> SpatialKey {
        let col = snap_to_grid((p.x() - self.extent.min_x) / self.tile_width()).floor() as i32;
        let row = snap_to_grid((self.extent.max_y - p.y()) / self.tile_height()).floor() as i32;

        SpatialKey::new(col, row)
    }

    /// The range of keys whose tiles intersect the given extent, clamped to the
    /// addressable grid. Maximum edges are exclusive: an extent ending exactly
    /// on a tile boundary does not spill into the next tile.
    pub fn key_bounds_for_extent(&self, e: &Extent) -> Option<(SpatialKey, SpatialKey)> {
        let tw = self.tile_width();
        let th = self.tile_height();

        let col_min = snap_to_grid((e.min_x - self.extent.min_x) / tw).floor() as i32;
        let col_max = snap_to_grid((e.max_x - self.extent.min_x) / tw).ceil() as i32 - 1;
        let row_min = snap_to_grid((self.extent.max_y - e.max_y) / th).floor() as i32;
        let row_max = snap_to_grid((self.extent.max_y - e.min_y) / th).ceil() as i32 - 1;

        let col_min = col_min.max(0);
        let col_max = col_max.min(self.tile_layout.layout_cols - 1);
        let row_min = row_min.max(0);
        let row_max = row_max.min(self.tile_layout.layout_rows - 1);

        if col_min > col_max || row_min > row_max {
            return None;
        }

        Some((SpatialKey::new(col_min, row_min), SpatialKey::new(col_max, row_max)))
    }

    /// All keys whose tiles intersect the given extent, in row-major order.
    pub fn keys_for_extent(&self, e: &Extent) -> Vec<SpatialKey> {
        match self.key_bounds_for_extent(e) {
            Some((min, max)) => iproduct!(min.row..=max.row, min.col..=max.col)
                .map(|(row, col)| SpatialKey::new(col, row))
                .collect(),
            None => Vec::default(),
        }
    }
}

impl std::fmt::Display for LayoutDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.tile_layout, self.extent)
    }
}

/// How a tile grid is derived when no explicit extent and layout are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutScheme {
    /// Grid anchored at the top left corner of the collection extent.
    Local { tile_size: u32 },
    /// Power of two grid covering the world extent of the crs, implies a zoom level.
    Global { tile_size: u32 },
}

impl Default for LayoutScheme {
    fn default() -> Self {
        LayoutScheme::Local { tile_size: 256 }
    }
}

pub(crate) struct ResolvedLayout {
    pub definition: LayoutDefinition,
    pub zoom: Option<i32>,
}

/// Resolves the layout for a collection.
///
/// Either both `extent` and `layout` are given and taken as is, or neither is
/// given and the scheme derives a grid from the collection extent and cell
/// size. Supplying only one of the pair is rejected as ambiguous.
pub(crate) fn resolve(
    extent: Option<Extent>,
    layout: Option<TileLayout>,
    scheme: LayoutScheme,
    data_extent: &Extent,
    cell_size: (f64, f64),
    crs: &Crs,
) -> Result<ResolvedLayout> {
    match (extent, layout) {
        (Some(extent), Some(tile_layout)) => Ok(ResolvedLayout {
            definition: LayoutDefinition::new(extent, tile_layout),
            zoom: None,
        }),
        (None, None) => match scheme {
            LayoutScheme::Local { tile_size } => resolve_local(tile_size, data_extent, cell_size),
            LayoutScheme::Global { tile_size } => resolve_global(tile_size, cell_size, crs),
        },
        (extent, layout) => Err(Error::AmbiguousSpecification(format!(
            "extent and layout must be supplied together, got extent: {}, layout: {}",
            extent.map_or("none".to_string(), |e| e.to_string()),
            layout.map_or("none".to_string(), |l| l.to_string()),
        ))),
    }
}

fn checked_tile_size(tile_size: u32) -> Result<f64> {
    if tile_size == 0 {
        return Err(Error::InvalidArgument("tile size must be positive".to_string()));
    }

    Ok(tile_size as f64)
}

fn resolve_local(tile_size: u32, data_extent: &Extent, cell_size: (f64, f64)) -> Result<ResolvedLayout> {
    let ts = checked_tile_size(tile_size)?;
    let (cell_width, cell_height) = cell_size;

    let cols = snap_to_grid(data_extent.width() / (cell_width * ts)).ceil().max(1.0) as i32;
    let rows = snap_to_grid(data_extent.height() / (cell_height * ts)).ceil().max(1.0) as i32;

    let grid_extent = Extent::new(
        data_extent.min_x,
        data_extent.max_y - rows as f64 * ts * cell_height,
        data_extent.min_x + cols as f64 * ts * cell_width,
        data_extent.max_y,
    );

    Ok(ResolvedLayout {
        definition: LayoutDefinition::new(grid_extent, TileLayout::new(cols, rows, tile_size as i32, tile_size as i32)),
        zoom: None,
    })
}

fn resolve_global(tile_size: u32, cell_size: (f64, f64), crs: &Crs) -> Result<ResolvedLayout> {
    let ts = checked_tile_size(tile_size)?;
    let world = crs
        .world_extent()
        .ok_or_else(|| Error::InvalidArgument(format!("no known world extent for crs '{crs}'")))?;

    let zoom = snap_to_grid((world.width() / (cell_size.0 * ts)).log2()).ceil().max(0.0) as i32;
    if zoom > 30 {
        return Err(Error::InvalidArgument(format!(
            "cell size {} is too fine for a global layout",
            cell_size.0
        )));
    }

    let tiles_per_axis = 1_i32 << zoom;

    Ok(ResolvedLayout {
        definition: LayoutDefinition::new(
            world,
            TileLayout::new(tiles_per_axis, tiles_per_axis, tile_size as i32, tile_size as i32),
        ),
        zoom: Some(zoom),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_pixel_grid() -> LayoutDefinition {
        LayoutDefinition::new(Extent::new(0.0, -4.0, 10.0, 6.0), TileLayout::new(2, 2, 5, 5))
    }

    #[test]
    fn tile_extents() {
        let layout = five_pixel_grid();

        assert_eq!(layout.tile_width(), 5.0);
        assert_eq!(layout.tile_height(), 5.0);
        assert_eq!(layout.cell_width(), 1.0);
        assert_eq!(layout.tile_extent(SpatialKey::new(0, 0)), Extent::new(0.0, 1.0, 5.0, 6.0));
        assert_eq!(layout.tile_extent(SpatialKey::new(1, 1)), Extent::new(5.0, -4.0, 10.0, 1.0));
    }

    #[test]
    fn key_for_point_on_boundary() {
        let layout = five_pixel_grid();

        assert_eq!(layout.key_for_point(Point::new(2.0, 5.0)), SpatialKey::new(0, 0));
        assert_eq!(layout.key_for_point(Point::new(5.0, 5.0)), SpatialKey::new(1, 0));
        assert_eq!(layout.key_for_point(Point::new(4.999999999999, 5.0)), SpatialKey::new(1, 0));
    }

    #[test]
    fn key_bounds_max_edges_are_exclusive() {
        let layout = five_pixel_grid();

        // extent ending exactly on the tile boundary does not spill over
        let (min, max) = layout
            .key_bounds_for_extent(&Extent::new(0.0, 1.0, 5.0, 6.0))
            .expect("intersecting extent");
        assert_eq!(min, SpatialKey::new(0, 0));
        assert_eq!(max, SpatialKey::new(0, 0));

        let (min, max) = layout
            .key_bounds_for_extent(&Extent::new(3.0, 2.0, 7.0, 6.0))
            .expect("intersecting extent");
        assert_eq!(min, SpatialKey::new(0, 0));
        assert_eq!(max, SpatialKey::new(1, 0));
    }

    #[test]
    fn key_bounds_are_clamped_to_the_grid() {
        let layout = five_pixel_grid();

        let (min, max) = layout
            .key_bounds_for_extent(&Extent::new(-100.0, -100.0, 100.0, 100.0))
            .expect("intersecting extent");
        assert_eq!(min, SpatialKey::new(0, 0));
        assert_eq!(max, SpatialKey::new(1, 1));

        assert!(layout.key_bounds_for_extent(&Extent::new(20.0, 0.0, 30.0, 6.0)).is_none());
    }

    #[test]
    fn keys_for_extent_row_major() {
        let layout = five_pixel_grid();

        assert_eq!(
            layout.keys_for_extent(&Extent::new(0.0, 0.0, 10.0, 6.0)),
            vec![
                SpatialKey::new(0, 0),
                SpatialKey::new(1, 0),
                SpatialKey::new(0, 1),
                SpatialKey::new(1, 1),
            ]
        );
    }

    #[test]
    fn local_scheme_anchors_at_the_data_extent() {
        let resolved = resolve(
            None,
            None,
            LayoutScheme::Local { tile_size: 5 },
            &Extent::new(0.0, 0.0, 10.0, 6.0),
            (1.0, 1.0),
            &Crs::from_epsg(crate::crs::WGS84),
        )
        .expect("resolvable layout");

        assert_eq!(resolved.definition.tile_layout, TileLayout::new(2, 2, 5, 5));
        assert_eq!(resolved.definition.extent, Extent::new(0.0, -4.0, 10.0, 6.0));
        assert_eq!(resolved.zoom, None);
    }

    #[test]
    fn global_scheme_implies_a_zoom_level() {
        let resolved = resolve(
            None,
            None,
            LayoutScheme::Global { tile_size: 5 },
            &Extent::new(0.0, 0.0, 10.0, 6.0),
            (1.0, 1.0),
            &Crs::from_epsg(crate::crs::WGS84),
        )
        .expect("resolvable layout");

        assert_eq!(resolved.zoom, Some(7));
        assert_eq!(resolved.definition.tile_layout, TileLayout::new(128, 128, 5, 5));
        assert_eq!(resolved.definition.extent, Extent::new(-180.0, -90.0, 180.0, 90.0));
    }

    #[test]
    fn global_scheme_needs_a_known_world_extent() {
        let result = resolve(
            None,
            None,
            LayoutScheme::Global { tile_size: 256 },
            &Extent::new(0.0, 0.0, 10.0, 6.0),
            (1.0, 1.0),
            &Crs::new("+proj=custom"),
        );

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn partial_specification_is_ambiguous() {
        let data_extent = Extent::new(0.0, 0.0, 10.0, 6.0);
        let crs = Crs::from_epsg(crate::crs::WGS84);

        let result = resolve(Some(data_extent), None, LayoutScheme::default(), &data_extent, (1.0, 1.0), &crs);
        assert!(matches!(result, Err(Error::AmbiguousSpecification(_))));

        let result = resolve(
            None,
            Some(TileLayout::new(2, 2, 5, 5)),
            LayoutScheme::default(),
            &data_extent,
            (1.0, 1.0),
            &crs,
        );
        assert!(matches!(result, Err(Error::AmbiguousSpecification(_))));
    }

    #[test]
    fn explicit_pair_is_taken_as_is() {
        let extent = Extent::new(0.0, 0.0, 10.0, 6.0);
        let layout = TileLayout::new(2, 2, 5, 5);

        let resolved = resolve(
            Some(extent),
            Some(layout),
            LayoutScheme::default(),
            &extent,
            (1.0, 1.0),
            &Crs::from_epsg(crate::crs::WGS84),
        )
        .expect("resolvable layout");

        assert_eq!(resolved.definition, LayoutDefinition::new(extent, layout));
        assert_eq!(resolved.zoom, None);
    }

    #[test]
    fn layout_json_wire_format() {
        let layout = five_pixel_grid();
        let json = serde_json::to_value(&layout).expect("serializable");

        assert_eq!(json["tileLayout"]["layoutCols"], 2);
        assert_eq!(json["tileLayout"]["tileRows"], 5);
        assert_eq!(json["extent"]["ymin"], -4.0);

        let back: LayoutDefinition = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back, layout);
    }
}
