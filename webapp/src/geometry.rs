use std::f64::consts::PI;
use std::fmt;
use std::ops;

/// Edge length of one slippy-map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

// sin(latitude) is clamped to this before taking the Mercator logarithm; at
// exactly +/-1 the log blows up to infinity at the poles.
const MAX_SIN_LATITUDE: f64 = 0.9999;

/// Fixed world view shown by the map: centered slightly north of the equator
/// so the populated continents fill the viewport.
pub const WORLD_CENTER: CoordGeo = CoordGeo {
    latitude: 20.0,
    longitude: 0.0,
};
pub const WORLD_ZOOM: u8 = 1;

/// Divisor applied to projected pixel offsets so the whole world fits the
/// viewport at zoom 1. Tuned by hand; it does not depend on the viewport size.
pub const FIT_DIVISOR: f64 = 500.0;

// --------------------------------------------------------------------------
// CoordGeo

/// Geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordGeo {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordGeo {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for CoordGeo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ latitude: {}, longitude: {} }}",
            self.latitude, self.longitude
        )
    }
}

// --------------------------------------------------------------------------
// Coord2D

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coord2D {
    pub x: f64,
    pub y: f64,
}

impl Coord2D {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl ops::Sub<&Coord2D> for &Coord2D {
    type Output = Coord2D;

    fn sub(self, rhs: &Coord2D) -> Coord2D {
        Coord2D {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl fmt::Display for Coord2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ x: {}, y: {}}}", self.x, self.y)
    }
}

// --------------------------------------------------------------------------
// Projection

pub trait Projection<From, To> {
    fn project(&self, input: &From) -> To;
}

/// Standard Web Mercator tile math at a fixed integer zoom level. Longitude
/// maps linearly, latitude logarithmically, into a square of
/// `tile_size * 2^zoom` pixels with the origin at the top-left (north-west)
/// corner.
///
/// Longitudes are not wrapped: anything outside [-180, 180] lands outside the
/// world square. Inputs must be finite.
#[derive(Copy, Clone, Debug)]
pub struct WebMercatorProjection {
    zoom: u8,
    tile_size: f64,
}

impl WebMercatorProjection {
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            tile_size: TILE_SIZE,
        }
    }

    /// Width (and height) of the whole projected world in pixels.
    pub fn scale(&self) -> f64 {
        self.tile_size * self.world_tiles()
    }

    fn world_tiles(&self) -> f64 {
        f64::powi(2.0, i32::from(self.zoom))
    }
}

impl Projection<CoordGeo, Coord2D> for WebMercatorProjection {
    fn project(&self, input: &CoordGeo) -> Coord2D {
        let sin_lat = f64::sin(input.latitude.to_radians())
            .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);
        let x = self.tile_size * (0.5 + input.longitude / 360.0);
        let y = self.tile_size
            * (0.5 - f64::ln((1.0 + sin_lat) / (1.0 - sin_lat)) / (4.0 * PI));
        let n = self.world_tiles();
        Coord2D { x: x * n, y: y * n }
    }
}

/// Projected position together with the scale of the projected world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MercatorPixel {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

pub fn lon_lat_to_pixel(longitude: f64, latitude: f64, zoom: u8) -> MercatorPixel {
    let proj = WebMercatorProjection::new(zoom);
    let Coord2D { x, y } = proj.project(&CoordGeo::new(longitude, latitude));
    MercatorPixel {
        x,
        y,
        scale: proj.scale(),
    }
}

// --------------------------------------------------------------------------
// Transform

pub trait Transform<CoordType> {
    fn transform(&self, input: &CoordType) -> CoordType;
}

#[derive(Copy, Clone, Debug)]
pub struct Translate2D {
    pub x: f64,
    pub y: f64,
}

impl Transform<Coord2D> for Translate2D {
    fn transform(&self, input: &Coord2D) -> Coord2D {
        Coord2D {
            x: input.x + self.x,
            y: input.y + self.y,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Scale2D {
    pub x: f64,
    pub y: f64,
}

impl Transform<Coord2D> for Scale2D {
    fn transform(&self, input: &Coord2D) -> Coord2D {
        Coord2D {
            x: input.x * self.x,
            y: input.y * self.y,
        }
    }
}

// --------------------------------------------------------------------------
// MarkerLayout

/// Places geographic points on a viewport: project, shift so the view center
/// sits at the origin, shrink by [`FIT_DIVISOR`], then move the origin to the
/// middle of the viewport.
///
/// This is a manual fit, not an exact viewport-to-world mapping; markers keep
/// their Mercator arrangement but the scale is a constant.
#[derive(Copy, Clone, Debug)]
pub struct MarkerLayout {
    projection: WebMercatorProjection,
    to_origin: Translate2D,
    shrink: Scale2D,
    to_viewport: Translate2D,
}

impl MarkerLayout {
    /// Layout for the fixed world view.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self::with_view(viewport_width, viewport_height, WORLD_CENTER, WORLD_ZOOM)
    }

    pub fn with_view(
        viewport_width: f64,
        viewport_height: f64,
        center: CoordGeo,
        zoom: u8,
    ) -> Self {
        let projection = WebMercatorProjection::new(zoom);
        let center_px = projection.project(&center);
        Self {
            projection,
            to_origin: Translate2D {
                x: -center_px.x,
                y: -center_px.y,
            },
            shrink: Scale2D {
                x: 1.0 / FIT_DIVISOR,
                y: 1.0 / FIT_DIVISOR,
            },
            to_viewport: Translate2D {
                x: viewport_width / 2.0,
                y: viewport_height / 2.0,
            },
        }
    }

    /// Screen position of `point`, or `None` if it has no finite coordinates.
    pub fn place(&self, point: &CoordGeo) -> Option<Coord2D> {
        if !point.is_finite() {
            return None;
        }
        let projected = self.projection.project(point);
        let placed = self
            .to_viewport
            .transform(&self.shrink.transform(&self.to_origin.transform(&projected)));
        placed.is_finite().then_some(placed)
    }
}
