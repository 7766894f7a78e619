use serde::{Deserialize, Serialize};
use crate::constants::*;
use crate::error::SceneError;
use crate::graphics::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceTier {
    Standard,
    LowPower,
}

impl DeviceTier {
    pub fn is_low_power(self) -> bool {
        self == DeviceTier::LowPower
    }

    pub fn max_particles(self) -> usize {
        match self {
            DeviceTier::Standard => MAX_PARTICLES,
            DeviceTier::LowPower => MAX_PARTICLES_LOW_POWER,
        }
    }

    pub fn emission(self) -> &'static EmissionRates {
        match self {
            DeviceTier::Standard => &EMISSION,
            DeviceTier::LowPower => &EMISSION_LOW_POWER,
        }
    }
}

/// Device signals sampled once per scene (re)build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub hardware_concurrency: Option<u32>,
}

impl DeviceProfile {
    /// Reads the viewport, pixel ratio and CPU count. Browser only.
    pub fn detect(window: &web_sys::Window, container: Option<&web_sys::HtmlElement>) -> Self {
        let inner_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let inner_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);

        let (client_w, client_h) = container
            .map(|el| (el.client_width() as f64, el.client_height() as f64))
            .unwrap_or((0.0, 0.0));
        let width = if client_w > 0.0 { client_w } else { inner_w };
        let height = if client_h > 0.0 { client_h.min(inner_h) } else { inner_h };

        let cores = window.navigator().hardware_concurrency();
        Self {
            width,
            height,
            pixel_ratio: window.device_pixel_ratio(),
            hardware_concurrency: if cores >= 1.0 { Some(cores as u32) } else { None },
        }
    }

    pub fn is_small(&self) -> bool {
        self.width < SMALL_BREAKPOINT
    }

    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT
    }

    /// Mobile with an unknown or limited CPU count.
    pub fn tier(&self) -> DeviceTier {
        let limited_cpu = self.hardware_concurrency.map_or(true, |c| c <= 4);
        if self.is_mobile() && limited_cpu {
            DeviceTier::LowPower
        } else {
            DeviceTier::Standard
        }
    }

    pub fn resolution(&self) -> f64 {
        let tier_resolution: f64 = if self.is_small() {
            0.75
        } else if self.is_mobile() {
            0.9
        } else {
            1.1
        };
        let dpr = if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 };
        tier_resolution.min(dpr)
    }

    pub fn max_fps(&self) -> u32 {
        if self.is_small() {
            20
        } else if self.is_mobile() {
            24
        } else {
            30
        }
    }

    pub fn size_range(&self) -> &'static SizeRange {
        if self.is_mobile() { &MOBILE_SIZE } else { &DESKTOP_SIZE }
    }
}

/// Width breakpoint table; monotonic in width.
pub fn rocket_count(width: f64, tier: DeviceTier) -> usize {
    let low = tier.is_low_power();
    if width < SMALL_BREAKPOINT {
        if low { 4 } else { 6 }
    } else if width < MOBILE_BREAKPOINT {
        if low { 4 } else { 8 }
    } else if width < WIDE_BREAKPOINT {
        8
    } else {
        15
    }
}

/// Overrides read from the mount element's `data-rocket-config` JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneOptions {
    pub background: Color,
    pub debounce_ms: u32,
    pub rocket_count: Option<usize>,
    pub max_fps: Option<u32>,
    pub max_particles: Option<usize>,
    pub seed: Option<u64>,
    pub force_tier: Option<DeviceTier>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            background: BACKGROUND,
            debounce_ms: RESIZE_DEBOUNCE_MS,
            rocket_count: None,
            max_fps: None,
            max_particles: None,
            seed: None,
            force_tier: None,
        }
    }
}

impl SceneOptions {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resize quiet period, held to 300..=500 ms whatever the override says.
    pub fn debounce_delay(&self) -> u32 {
        self.debounce_ms.clamp(RESIZE_DEBOUNCE_MS, RESIZE_DEBOUNCE_MAX_MS)
    }
}

/// Everything one scene build needs, resolved from device signals and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub width: f64,
    pub height: f64,
    pub tier: DeviceTier,
    pub resolution: f64,
    pub max_fps: u32,
    pub rocket_count: usize,
    pub max_particles: usize,
    pub min_size: f64,
    pub max_size: f64,
    pub background: Color,
}

impl SceneSettings {
    pub fn resolve(profile: &DeviceProfile, options: &SceneOptions) -> Self {
        let tier = options.force_tier.unwrap_or_else(|| profile.tier());
        let size = profile.size_range();
        Self {
            width: profile.width,
            height: profile.height,
            tier,
            resolution: profile.resolution(),
            max_fps: options.max_fps.unwrap_or_else(|| profile.max_fps()).max(1),
            rocket_count: options.rocket_count.unwrap_or_else(|| rocket_count(profile.width, tier)),
            max_particles: options.max_particles.unwrap_or_else(|| tier.max_particles()),
            min_size: size.min,
            max_size: size.max,
            background: options.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(width: f64, cores: Option<u32>) -> DeviceProfile {
        DeviceProfile { width, height: 800.0, pixel_ratio: 2.0, hardware_concurrency: cores }
    }

    #[test]
    fn test_tier_detection() {
        assert_eq!(profile(1920.0, None).tier(), DeviceTier::Standard);
        assert_eq!(profile(1920.0, Some(2)).tier(), DeviceTier::Standard);
        assert_eq!(profile(375.0, Some(4)).tier(), DeviceTier::LowPower);
        assert_eq!(profile(375.0, None).tier(), DeviceTier::LowPower);
        assert_eq!(profile(375.0, Some(8)).tier(), DeviceTier::Standard);
    }

    #[test]
    fn test_rocket_count_table() {
        assert_eq!(rocket_count(1024.0, DeviceTier::Standard), 8);
        assert_eq!(rocket_count(1024.0, DeviceTier::LowPower), 8);
        assert_eq!(rocket_count(1920.0, DeviceTier::Standard), 15);
        assert_eq!(rocket_count(320.0, DeviceTier::LowPower), 4);
        assert_eq!(rocket_count(320.0, DeviceTier::Standard), 6);
        assert_eq!(rocket_count(600.0, DeviceTier::Standard), 8);
    }

    #[test]
    fn test_rocket_count_monotonic() {
        for tier in [DeviceTier::Standard, DeviceTier::LowPower] {
            let mut last = 0;
            for w in (0..3000).step_by(10) {
                let n = rocket_count(w as f64, tier);
                assert!(n >= last, "count dropped at width {w}");
                last = n;
            }
        }
    }

    #[test]
    fn test_resolution_is_capped_by_pixel_ratio() {
        assert_eq!(profile(1920.0, None).resolution(), 1.1);
        assert_eq!(profile(600.0, None).resolution(), 0.9);
        assert_eq!(profile(320.0, None).resolution(), 0.75);
        let dim = DeviceProfile { pixel_ratio: 0.5, ..profile(1920.0, None) };
        assert_eq!(dim.resolution(), 0.5);
    }

    #[test]
    fn test_max_fps_by_breakpoint() {
        assert_eq!(profile(320.0, None).max_fps(), 20);
        assert_eq!(profile(600.0, None).max_fps(), 24);
        assert_eq!(profile(1280.0, None).max_fps(), 30);
    }

    #[test]
    fn test_options_parse_partial_json() {
        let opts = SceneOptions::from_json(r#"{"rocket_count": 3, "force_tier": "low-power"}"#).unwrap();
        assert_eq!(opts.rocket_count, Some(3));
        assert_eq!(opts.force_tier, Some(DeviceTier::LowPower));
        assert_eq!(opts.background, BACKGROUND);
        assert_eq!(opts.debounce_ms, RESIZE_DEBOUNCE_MS);
    }

    #[test]
    fn test_options_reject_unknown_fields() {
        assert!(matches!(
            SceneOptions::from_json(r#"{"rockets": 3}"#),
            Err(SceneError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_settings_resolve_defaults() {
        let s = SceneSettings::resolve(&profile(375.0, Some(2)), &SceneOptions::default());
        assert_eq!(s.tier, DeviceTier::LowPower);
        assert_eq!(s.max_particles, 120);
        assert_eq!(s.rocket_count, 4);
        assert_eq!((s.min_size, s.max_size), (0.8, 1.5));
    }

    #[test]
    fn test_settings_honor_overrides() {
        let opts = SceneOptions { max_particles: Some(0), max_fps: Some(0), force_tier: Some(DeviceTier::Standard), ..SceneOptions::default() };
        let s = SceneSettings::resolve(&profile(375.0, Some(2)), &opts);
        assert_eq!(s.tier, DeviceTier::Standard);
        assert_eq!(s.max_particles, 0);
        assert_eq!(s.max_fps, 1);
        assert_eq!(s.rocket_count, 6);
    }

    #[test]
    fn test_debounce_override_is_clamped() {
        let quiet = |ms: u32| SceneOptions { debounce_ms: ms, ..SceneOptions::default() }.debounce_delay();
        assert_eq!(quiet(0), 300);
        assert_eq!(quiet(420), 420);
        assert_eq!(quiet(5000), 500);
        assert_eq!(SceneOptions::default().debounce_delay(), RESIZE_DEBOUNCE_MS);
    }

    #[test]
    fn test_resolution_caps_at_pixel_ratio() {
        let at = |width: f64, dpr: f64| DeviceProfile { width, height: 800.0, pixel_ratio: dpr, hardware_concurrency: None }.resolution();
        assert_eq!(at(1920.0, 2.0), 1.1);
        assert_eq!(at(1920.0, 1.0), 1.0);
        assert_eq!(at(600.0, 3.0), 0.9);
        assert_eq!(at(320.0, 3.0), 0.75);
        assert_eq!(at(320.0, 0.0), 0.75);
    }
}
