//! Visibility engine and morning brief against the scripted oracle.

mod support;

use std::sync::Arc;

use lunar_observatory::models::{Planet, Rating, VisibilityRecord};
use lunar_observatory::services::observatory::BRIEF_TITLE;
use lunar_observatory::services::VisibilityComputer;
use support::{date, observatory_with, utc_config, MockOracle};

#[tokio::test]
async fn test_night_planet_is_excellent() {
    let (observatory, _repo) = observatory_with(Arc::new(MockOracle::new()), utc_config());
    let visibility = observatory.visibility(date(2026, 2, 24)).await.unwrap();

    let jupiter = &visibility["jupiter"];
    assert!(jupiter.visible);
    assert_eq!(jupiter.rise.as_deref(), Some("00:00"));
    assert_eq!(jupiter.set.as_deref(), Some("23:50"));
    assert_eq!(jupiter.transit.as_deref(), Some("00:00"));
    assert_eq!(jupiter.max_altitude, Some(60.0));
    assert_eq!(jupiter.azimuth, Some(135.0));
    assert!(jupiter.visible_after_sunset);
    // The evening run (19:20 - 23:50) is one sample shorter
    assert_eq!(jupiter.best_view_window.as_deref(), Some("00:00 - 04:40"));
    assert_eq!(jupiter.rating, Rating::Excellent);
    assert_eq!(jupiter.magnitude, -2.7);
}

#[tokio::test]
async fn test_daytime_planets_are_poor() {
    let (observatory, _repo) = observatory_with(Arc::new(MockOracle::new()), utc_config());
    let visibility = observatory.visibility(date(2026, 2, 24)).await.unwrap();

    for key in ["mercury", "venus", "mars"] {
        let record = &visibility[key];
        assert!(record.visible, "{key}");
        assert!(!record.visible_after_sunset, "{key}");
        assert!(record.best_view_window.is_none(), "{key}");
        assert_eq!(record.rating, Rating::Poor, "{key}");
        assert_eq!(record.transit.as_deref(), Some("12:00"), "{key}");
    }
}

#[tokio::test]
async fn test_never_rising_planet_keeps_catalog_magnitude() {
    let (observatory, _repo) = observatory_with(Arc::new(MockOracle::new()), utc_config());
    let visibility = observatory.visibility(date(2026, 2, 24)).await.unwrap();

    assert_eq!(
        visibility["saturn"],
        VisibilityRecord::never_rises(Planet::Saturn)
    );
    assert_eq!(visibility["saturn"].magnitude, 0.5);
}

#[test]
fn test_sample_grid_covers_local_day() {
    let offset = lunar_observatory::models::utc_offset(5.5).unwrap();
    let instants = VisibilityComputer::sample_instants(date(2026, 2, 24), offset).unwrap();
    assert_eq!(instants.len(), 144);
    assert_eq!(instants[0], support::utc(2026, 2, 23, 18, 30));
    assert_eq!(instants[143], support::utc(2026, 2, 24, 18, 20));
}

#[tokio::test]
async fn test_morning_brief_lists_well_placed_planets() {
    let (observatory, _repo) = observatory_with(Arc::new(MockOracle::new()), utc_config());
    let brief = observatory.morning_brief_at(date(2026, 2, 24)).await.unwrap();

    assert_eq!(brief.title, BRIEF_TITLE);
    assert_eq!(brief.date, date(2026, 2, 24));
    assert_eq!(brief.visible_planets, vec!["Jupiter".to_string()]);
    assert!(brief.body.starts_with(&format!("Moon: {}\n", brief.moon_phase)));
    assert!(brief.body.ends_with("Best Tonight:\nJupiter"));
    assert!((0.0..=100.0).contains(&brief.illumination_percent));
}
