//! Transit geometry: physical transit parameters to on-screen animation
//! parameters. Everything here is pure.

use std::{fmt, str::FromStr};

use shared::domain::{PlanetCandidate, PlanetData};
use thiserror::Error;

pub const DEFAULT_STAR_DIAMETER_PX: f64 = 150.0;
/// Smallest planet disc drawn, whatever the transit depth.
pub const VISIBILITY_FLOOR_PX: f64 = 5.0;
pub const ORBIT_SCALE: f64 = 1.5;
/// Animation milliseconds per orbital day.
pub const TIME_SCALE_MS_PER_DAY: f64 = 50.0;

pub const FALLBACK_ORBITAL_PERIOD_DAYS: f64 = 365.0;
pub const FALLBACK_IMPACT_PARAMETER: f64 = 0.0;
pub const FALLBACK_TRANSIT_DEPTH_PPM: f64 = 1000.0;
pub const MIN_ORBITAL_PERIOD_DAYS: f64 = 0.01;
/// Upper bounds keeping every derived value finite and drawable.
pub const MAX_ORBITAL_PERIOD_DAYS: f64 = 1_000_000.0;
pub const MAX_ABS_IMPACT_PARAMETER: f64 = 10.0;
pub const MAX_TRANSIT_DEPTH_PPM: f64 = 1_000_000.0;
pub const MAX_STAR_DIAMETER_PX: f64 = 4096.0;

const PPM: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StarColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl StarColor {
    pub const SUNLIKE: StarColor = StarColor {
        r: 0xFF,
        g: 0xFD,
        b: 0xE7,
    };
}

impl Default for StarColor {
    fn default() -> Self {
        Self::SUNLIKE
    }
}

impl fmt::Display for StarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid star colour '{0}', expected #RRGGBB")]
pub struct StarColorParseError(String);

impl FromStr for StarColor {
    type Err = StarColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(StarColorParseError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| StarColorParseError(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Physical inputs. Every field is optional; omitted or non-finite values
/// fall back to the documented constants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitInputs {
    pub orbital_period_days: Option<f64>,
    pub impact_parameter: Option<f64>,
    pub transit_depth_ppm: Option<f64>,
    pub star_diameter_px: Option<f64>,
    pub star_color: Option<StarColor>,
}

impl TransitInputs {
    pub fn new(orbital_period_days: f64, impact_parameter: f64, transit_depth_ppm: f64) -> Self {
        Self {
            orbital_period_days: Some(orbital_period_days),
            impact_parameter: Some(impact_parameter),
            transit_depth_ppm: Some(transit_depth_ppm),
            ..Self::default()
        }
    }

    pub fn with_star(mut self, diameter_px: f64, color: StarColor) -> Self {
        self.star_diameter_px = Some(diameter_px);
        self.star_color = Some(color);
        self
    }
}

impl From<&PlanetCandidate> for TransitInputs {
    fn from(candidate: &PlanetCandidate) -> Self {
        Self::new(
            candidate.orbital_period_days,
            candidate.impact_parameter,
            candidate.transit_depth_ppm,
        )
    }
}

impl From<&PlanetData> for TransitInputs {
    fn from(planet: &PlanetData) -> Self {
        Self::new(planet.orbital_period, planet.impact, planet.depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitGeometry {
    pub radius_ratio: f64,
    pub star_diameter_px: f64,
    pub star_color: StarColor,
    pub planet_diameter_px: f64,
    pub orbit_diameter_px: f64,
    pub vertical_offset_px: f64,
    pub angular_period_ms: f64,
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

/// Maps transit parameters to rendering parameters under a simple occultation
/// model: the depth is the squared planet/star radius ratio.
///
/// Out-of-domain values are clamped, never rejected: a negative depth is
/// treated as 0 ppm and a non-positive period as [`MIN_ORBITAL_PERIOD_DAYS`].
/// Oversized inputs are capped at the `MAX_*` bounds, so every output is
/// finite.
pub fn compute_geometry(inputs: TransitInputs) -> TransitGeometry {
    let period_days = finite_or(inputs.orbital_period_days, FALLBACK_ORBITAL_PERIOD_DAYS)
        .clamp(MIN_ORBITAL_PERIOD_DAYS, MAX_ORBITAL_PERIOD_DAYS);
    let impact = finite_or(inputs.impact_parameter, FALLBACK_IMPACT_PARAMETER)
        .clamp(-MAX_ABS_IMPACT_PARAMETER, MAX_ABS_IMPACT_PARAMETER);
    let depth_ppm = finite_or(inputs.transit_depth_ppm, FALLBACK_TRANSIT_DEPTH_PPM)
        .clamp(0.0, MAX_TRANSIT_DEPTH_PPM);
    let star_diameter_px = inputs
        .star_diameter_px
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(DEFAULT_STAR_DIAMETER_PX)
        .min(MAX_STAR_DIAMETER_PX);

    let radius_ratio = (depth_ppm / PPM).sqrt();

    TransitGeometry {
        radius_ratio,
        star_diameter_px,
        star_color: inputs.star_color.unwrap_or_default(),
        planet_diameter_px: (star_diameter_px * radius_ratio).max(VISIBILITY_FLOOR_PX),
        orbit_diameter_px: star_diameter_px * ORBIT_SCALE,
        vertical_offset_px: impact * (star_diameter_px / 2.0),
        angular_period_ms: period_days * TIME_SCALE_MS_PER_DAY,
    }
}
