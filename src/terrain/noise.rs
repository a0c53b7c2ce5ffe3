//! Seeded 2D gradient noise for terrain heightmaps.
//!
//! Every field owns its permutation table, so independently seeded fields
//! can coexist without shared process-wide state.

/// The eight gradient directions: unit and diagonal 2D vectors.
const GRADIENTS: [[f32; 2]; 8] = [
    [1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0],
    [1.0, 1.0], [-1.0, 1.0], [1.0, -1.0], [-1.0, -1.0],
];

/// Coherent 2D noise sampler with a fixed seed and coordinate scale.
///
/// `sample` is a pure function: the same (seed, scale, x, z) gives the same
/// value on every call and in every process run.
#[derive(Clone)]
pub struct NoiseField {
    /// Permutation of 0..=255, duplicated to 512 entries so chained lookups
    /// stay in range without re-wrapping.
    perm: [u8; 512],
    scale: f32,
    seed: u32,
}

impl NoiseField {
    /// Build a noise field from a seed and a coordinate scale.
    ///
    /// The permutation table is a Fisher-Yates shuffle of 0..=255 driven by
    /// a seeded RNG, so the table is a bijection and fully determined by the
    /// seed.
    pub fn new(seed: u32, scale: f32) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        for i in (1..table.len()).rev() {
            let j = rng.usize(..=i);
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for i in 0..256 {
            perm[i] = table[i];
            perm[i + 256] = table[i];
        }

        Self { perm, scale, seed }
    }

    /// Seed this field was built from
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Scale applied to input coordinates before sampling
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sample the noise at a lattice position. Returns a value in [0, 1].
    pub fn sample(&self, x: i32, z: i32) -> f32 {
        let sx = x as f32 * self.scale;
        let sz = z as f32 * self.scale;

        // Surrounding unit-cell corners, wrapped to the table range. The
        // noise tiles every 256 scaled units.
        let x0 = (sx.floor() as i32 & 255) as usize;
        let x1 = (x0 + 1) & 255;
        let z0 = (sz.floor() as i32 & 255) as usize;
        let z1 = (z0 + 1) & 255;

        // Fractional position within the cell
        let xf = sx - sx.floor();
        let zf = sz - sz.floor();

        let u = fade(xf);
        let v = fade(zf);

        // Offsets from each corner to the sample point
        let (xf0, zf0) = (xf, zf);
        let (xf1, zf1) = (xf - 1.0, zf - 1.0);

        let h00 = self.hash(x0, z0);
        let h10 = self.hash(x1, z0);
        let h01 = self.hash(x0, z1);
        let h11 = self.hash(x1, z1);

        // Blend the corner gradients along x, then along z
        let nx0 = lerp(grad(h00, xf0, zf0), grad(h10, xf1, zf0), u);
        let nx1 = lerp(grad(h01, xf0, zf1), grad(h11, xf1, zf1), u);
        let n = lerp(nx0, nx1, v);

        // Raw range is nominally [-1, 1]
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Chained permutation lookup hashing a lattice corner
    fn hash(&self, x: usize, z: usize) -> u8 {
        self.perm[(self.perm[x] as usize + z) & 255]
    }
}

/// Quintic fade 6t^5 - 15t^4 + 10t^3, C2-continuous at 0 and 1
fn fade(t: f32) -> f32 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product of the hashed gradient with the corner-to-sample offset
fn grad(hash: u8, x: f32, z: f32) -> f32 {
    let g = GRADIENTS[(hash & 7) as usize];
    g[0] * x + g[1] * z
}
