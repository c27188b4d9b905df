//! world noise field & terrain banding
use noise::{NoiseFn, Perlin};

/* ===========================================================
   band thresholds (strict less‑than, boundary goes up a band)
   =========================================================== */
pub const PLAIN_BELOW: f64 = -0.3;
pub const SCRUB_BELOW: f64 = 0.0;
pub const BRUSH_BELOW: f64 = 0.3;
pub const ROCK_BELOW: f64  = 0.6;

/// -------- terrain symbols --------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Plain,
    Scrub,
    Brush,
    Rock,
    Peak,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [
        Symbol::Plain,
        Symbol::Scrub,
        Symbol::Brush,
        Symbol::Rock,
        Symbol::Peak,
    ];

    #[inline]
    pub fn glyph(self) -> char {
        match self {
            Symbol::Plain => '.',
            Symbol::Scrub => ':',
            Symbol::Brush => '*',
            Symbol::Rock  => '#',
            Symbol::Peak  => '@',
        }
    }
}

/// map one noise sample to its band
#[inline]
pub fn classify(v: f64) -> Symbol {
    if v < PLAIN_BELOW {
        Symbol::Plain
    } else if v < SCRUB_BELOW {
        Symbol::Scrub
    } else if v < BRUSH_BELOW {
        Symbol::Brush
    } else if v < ROCK_BELOW {
        Symbol::Rock
    } else {
        Symbol::Peak
    }
}

/* ===========================================================
   noise field
   =========================================================== */

/// Deterministic scalar field over continuous world coordinates.
///
/// Wraps 2‑D Perlin noise; `frequency` scales the input so lower values give
/// larger contiguous regions. Output is clamped to `[-1, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    frequency: f64,
}

impl NoiseField {
    /// `frequency` must be positive; `SimConfig::validate` rejects anything else
    pub fn new(seed: u32, frequency: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            frequency,
        }
    }

    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.perlin
            .get([x * self.frequency, y * self.frequency])
            .clamp(-1.0, 1.0)
    }

    /// shortcut used by the world view
    #[inline]
    pub fn symbol(&self, x: f64, y: f64) -> Symbol {
        classify(self.sample(x, y))
    }
}
