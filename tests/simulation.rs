use std::sync::atomic::AtomicBool;

use macsim_rs::mac::MacScheme;
use macsim_rs::sim::{self, SimConfig, Simulation};

fn short_config(stations: usize) -> SimConfig {
    SimConfig {
        stations,
        duration_secs: 0.5,
        arrival_interval_ms: 40,
        seed: 21,
        ..SimConfig::default()
    }
}

#[test]
fn every_scheme_delivers_on_a_lightly_loaded_medium() {
    let keep_going = AtomicBool::new(true);
    for scheme in MacScheme::ALL {
        let report = Simulation::new(scheme, short_config(2))
            .unwrap()
            .run(&keep_going, |_| {})
            .unwrap();

        let t = report.totals;
        assert_eq!(report.stations.len(), 2, "{scheme}");
        assert!(t.offered > 0, "{scheme}: nothing offered");
        assert!(t.delivered > 0, "{scheme}: nothing delivered");
        assert!(
            t.delivered + t.dropped + t.interrupted <= t.offered,
            "{scheme}: more outcomes than packets"
        );
        assert!(t.data_sent >= t.delivered, "{scheme}");
        assert!(report.access_point.data_received >= t.delivered, "{scheme}");
    }
}

#[test]
fn only_reservation_scheme_sends_rts() {
    let keep_going = AtomicBool::new(true);
    let reports = sim::compare(&short_config(3), &keep_going, |_, _| {}).unwrap();

    assert_eq!(reports.len(), 4);
    for report in &reports {
        let uses_rts = report.scheme == MacScheme::RtsCts;
        assert_eq!(report.totals.rts_sent > 0, uses_rts, "{}", report.scheme);
    }
}

#[test]
fn unbounded_schemes_never_drop() {
    let keep_going = AtomicBool::new(true);
    for scheme in [MacScheme::CsmaCa, MacScheme::RtsCts] {
        let report = Simulation::new(scheme, short_config(4))
            .unwrap()
            .run(&keep_going, |_| {})
            .unwrap();
        assert_eq!(report.totals.dropped, 0, "{scheme}");
    }
}

#[test]
fn cleared_flag_returns_immediately() {
    let keep_going = AtomicBool::new(false);
    let config = SimConfig {
        duration_secs: 30.0,
        ..short_config(2)
    };
    let report = Simulation::new(MacScheme::NullMac, config)
        .unwrap()
        .run(&keep_going, |_| {})
        .unwrap();

    assert!(report.elapsed_secs < 5.0);
    assert!(sim::compare(&short_config(2), &keep_going, |_, _| {})
        .unwrap()
        .is_empty());
}

#[test]
fn config_file_overrides_defaults() {
    let path = std::env::temp_dir().join(format!("macsim-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "stations": 6, "arrival_interval_ms": 15 }"#).unwrap();

    let config = SimConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.stations, 6);
    assert_eq!(config.arrival_interval_ms, 15);
    assert_eq!(config.duration_secs, SimConfig::default().duration_secs);
}
