/// Stone heightmaps from fractal 2D simplex noise.
///
/// Heights are non-negative and deterministic for a given seed.
pub struct TerrainGenerator {
    /// Permutation table for simplex noise (doubled for wrapping).
    perm: [u8; 512],
}

/// Shape of a generated heightmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightmapParams {
    /// Cells per noise period of the base octave.
    pub scale: f32,
    /// Height of the tallest possible peak.
    pub elevation: f32,
    pub octaves: u32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            scale: 20.0,
            elevation: 10.0,
            octaves: 3,
        }
    }
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        let perm = Self::build_permutation(seed);
        Self { perm }
    }

    /// Stone heights for a `side` x `side` grid, row-major.
    pub fn heightmap(&self, side: usize, params: &HeightmapParams) -> Vec<f32> {
        let mut heights = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                heights.push(self.height(x as f64, y as f64, params));
            }
        }
        heights
    }

    /// Height in `[0, elevation]` at a grid position.
    fn height(&self, x: f64, y: f64, params: &HeightmapParams) -> f32 {
        let base = 1.0 / params.scale.max(f32::EPSILON) as f64;
        let mut sum = 0.0f64;
        let mut norm = 0.0f64;
        let mut amplitude = 1.0;
        let mut frequency = base;
        for octave in 0..params.octaves.max(1) {
            let shift = octave as f64 * 100.0;
            sum += self.simplex2d(x * frequency + shift, y * frequency + shift) * amplitude;
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        let unit = ((sum / norm) * 0.5 + 0.5).clamp(0.0, 1.0);
        (unit * params.elevation as f64) as f32
    }

    /// 2D simplex noise. Returns value in [-1, 1].
    fn simplex2d(&self, x: f64, y: f64) -> f64 {
        const F2: f64 = 0.5 * (1.7320508075688772 - 1.0); // (sqrt(3)-1)/2
        const G2: f64 = (3.0 - 1.7320508075688772) / 6.0; // (3-sqrt(3))/6

        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1.0, 0.0) } else { (0.0, 1.0) };

        let x1 = x0 - i1 + G2;
        let y1 = y0 - j1 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i32 & 255) as usize;
        let jj = (j as i32 & 255) as usize;

        let gi0 = self.perm[ii + self.perm[jj] as usize] as usize % 12;
        let gi1 = self.perm[ii + i1 as usize + self.perm[jj + j1 as usize] as usize] as usize % 12;
        let gi2 = self.perm[ii + 1 + self.perm[jj + 1] as usize] as usize % 12;

        let n0 = Self::corner_contribution(gi0, x0, y0);
        let n1 = Self::corner_contribution(gi1, x1, y1);
        let n2 = Self::corner_contribution(gi2, x2, y2);

        // Scale to [-1, 1]
        70.0 * (n0 + n1 + n2)
    }

    fn corner_contribution(gi: usize, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let t = t * t;
            t * t * Self::grad2d(gi, x, y)
        }
    }

    fn grad2d(hash: usize, x: f64, y: f64) -> f64 {
        // 12 gradient directions for 2D simplex
        const GRAD: [[f64; 2]; 12] = [
            [1.0, 1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [-1.0, -1.0],
            [1.0, 0.0],
            [-1.0, 0.0],
            [0.0, 1.0],
            [0.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [-1.0, -1.0],
        ];
        let g = &GRAD[hash % 12];
        g[0] * x + g[1] * y
    }

    fn build_permutation(seed: u64) -> [u8; 512] {
        let mut p: [u8; 256] = [0; 256];
        for (i, val) in p.iter_mut().enumerate() {
            *val = i as u8;
        }

        // Fisher-Yates shuffle with seed
        let mut rng = seed;
        for i in (1..256).rev() {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let j = (rng >> 33) as usize % (i + 1);
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, val) in perm.iter_mut().enumerate() {
            *val = p[i & 255];
        }
        perm
    }
}
