use chrono::{DateTime, TimeZone, Utc};
use citycanopy_core::sun::{DAYLIGHT_COLOR, NIGHT_COLOR};
use citycanopy_core::{apply_sun_light, InMemorySurface, SunLight, SunPosition};
use std::f64::consts::FRAC_PI_4;

#[test]
fn test_high_sun_light() {
    let light = SunLight::from_position(SunPosition {
        azimuth: 0.0,
        altitude: FRAC_PI_4,
    });
    // South-facing sun maps to a bearing of 180°
    assert!((light.position[1] - 180.0).abs() < 1e-9);
    assert!((light.position[2] - 45.0).abs() < 1e-9);
    assert_eq!(light.color, DAYLIGHT_COLOR);
    assert!(light.is_daylight());
    assert!(light.intensity > 0.7);
}

#[test]
fn test_night_light() {
    let light = SunLight::from_position(SunPosition {
        azimuth: 1.0,
        altitude: -0.3,
    });
    assert_eq!(light.position[2], 90.0);
    assert_eq!(light.color, NIGHT_COLOR);
    assert!(!light.is_daylight());
}

#[test]
fn test_apply_sun_light_pushes_to_surface() {
    let mut surface = InMemorySurface::new();
    let provider = |_at: DateTime<Utc>, _lat: f64, _lon: f64| SunPosition {
        azimuth: 0.5,
        altitude: 0.6,
    };
    let at = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();

    let light = apply_sun_light(&mut surface, &provider, at, 52.5, 13.4).unwrap();
    assert_eq!(surface.light(), Some(&light));
}
