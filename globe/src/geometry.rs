use geo_types::Coord;
use shared::GeoPoint;

/// Scene-space sphere radius the renderer draws the globe with.
pub const GLOBE_RADIUS: f64 = 100.0;

/// Angular separation below which two points are treated as coincident.
const COINCIDENT_EPSILON: f64 = 1e-7;

/// Signed areas smaller than this are degenerate rings (lines, slivers).
const DEGENERATE_AREA_EPSILON: f64 = 1e-9;

/// Minimal 3-vector for scene-space positions and the arrow basis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or the zero vector when the input has no direction.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 1e-10 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::default()
        }
    }
}

/// Project a lat/lng point at a relative altitude onto the scene sphere.
///
/// Axis convention matches the renderer: +y through the north pole,
/// +z through lat 0 / lng 0.
pub fn to_cartesian(point: GeoPoint, altitude: f64) -> Vec3 {
    let r = GLOBE_RADIUS * (1.0 + altitude);
    let lat = point.lat.to_radians();
    let lng = point.lng.to_radians();
    Vec3::new(
        r * lat.cos() * lng.sin(),
        r * lat.sin(),
        r * lat.cos() * lng.cos(),
    )
}

/// Spherical linear interpolation along the great-circle arc from `a` to `b`.
///
/// Coincident endpoints return `a` unchanged rather than dividing by a
/// vanishing `sin(omega)`.
pub fn slerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let lat_a = a.lat.to_radians();
    let lng_a = a.lng.to_radians();
    let lat_b = b.lat.to_radians();
    let lng_b = b.lng.to_radians();

    let ax = lat_a.cos() * lng_a.cos();
    let ay = lat_a.cos() * lng_a.sin();
    let az = lat_a.sin();
    let bx = lat_b.cos() * lng_b.cos();
    let by = lat_b.cos() * lng_b.sin();
    let bz = lat_b.sin();

    let dot = (ax * bx + ay * by + az * bz).clamp(-1.0, 1.0);
    let omega = dot.acos();
    if omega.abs() < COINCIDENT_EPSILON {
        return a;
    }

    let sin_omega = omega.sin();
    let fa = (((1.0 - t) * omega).sin()) / sin_omega;
    let fb = ((t * omega).sin()) / sin_omega;

    let x = fa * ax + fb * bx;
    let y = fa * ay + fb * by;
    let z = fa * az + fb * bz;

    GeoPoint {
        lat: z.clamp(-1.0, 1.0).asin().to_degrees(),
        lng: y.atan2(x).to_degrees(),
    }
}

/// Arc altitude profile: zero at both endpoints, `peak` at the midpoint.
pub fn arc_height(t: f64, peak: f64) -> f64 {
    (t * std::f64::consts::PI).sin() * peak
}

/// Ease-in-out timing curve used for every timed transition.
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Signed-area centroid of a polygon ring, with the signed area (in
/// square degrees) it was computed from.
///
/// Degenerate rings (fewer than 3 points, or near-zero area) fall back to
/// the arithmetic mean of the points and report area 0.
pub fn ring_centroid(ring: &[Coord]) -> (Coord, f64) {
    let n = ring.len();
    if n < 3 {
        return (Coord { x: 0.0, y: 0.0 }, 0.0);
    }

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        let cross = p0.x * p1.y - p1.x * p0.y;
        area += cross;
        cx += (p0.x + p1.x) * cross;
        cy += (p0.y + p1.y) * cross;
    }
    area *= 0.5;

    if area.abs() < DEGENERATE_AREA_EPSILON {
        let sum = ring.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
        return (
            Coord {
                x: sum.0 / n as f64,
                y: sum.1 / n as f64,
            },
            0.0,
        );
    }

    (
        Coord {
            x: cx / (6.0 * area),
            y: cy / (6.0 * area),
        },
        area,
    )
}

/// Centroid of the ring with the greatest absolute area, i.e. the dominant
/// landmass of an archipelago nation.
pub fn dominant_centroid(rings: &[Vec<Coord>]) -> Coord {
    let mut best = Coord { x: 0.0, y: 0.0 };
    let mut best_area = f64::NEG_INFINITY;
    for ring in rings {
        let (centroid, area) = ring_centroid(ring);
        if area.abs() > best_area {
            best = centroid;
            best_area = area.abs();
        }
    }
    best
}

/// Orthonormal frame for the arrow marker at the growing arc tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// Orient the arrow from the local tangent (`prev` to `tip`) and the local
/// "up" (the tip position away from the globe center).
pub fn arrow_basis(prev: Vec3, tip: Vec3) -> ArrowBasis {
    let dir = tip.sub(prev).normalize();
    let up = tip.normalize();
    let right = dir.cross(up).normalize();
    let forward = up.cross(right);
    ArrowBasis { right, up, forward }
}
