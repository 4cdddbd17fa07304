//! E2E tests for id filters and bit rate configuration.

mod helpers;

use ntcan_commands::{CommandError, Value};
use ntcan_driver::MAX_REGION_GRANT;

use helpers::TestHarness;

#[test]
fn e2e_region_add_full_and_short_grants() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    h.run("ntcan::IdRegionAdd", &[&hs, "0x200", "16"]).unwrap();
    assert_eq!(h.mock.filters(handle).len(), 16);

    h.mock.set_grant_limit(Some(15));
    let err = h.run("ntcan::IdRegionAdd", &[&hs, "0x300", "16"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "NTCAN canIdRegionAdd() added only 15 instead of 16 IDs"
    );
    // The partial grant stays in effect.
    assert_eq!(h.mock.filters(handle).len(), 31);
}

#[test]
fn e2e_region_add_huge_count_is_short_grant() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    let err = h
        .run("ntcan::IdRegionAdd", &[&hs, "0", "2147483647"])
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::CountMismatch {
            call: "canIdRegionAdd",
            verb: "added",
            granted: MAX_REGION_GRANT,
            requested: i32::MAX,
        }
    );
    assert_eq!(h.mock.filters(handle).len(), MAX_REGION_GRANT as usize);
}

#[test]
fn e2e_region_delete_short_grant() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    h.run("ntcan::IdRegionAdd", &[&hs, "0", "10"]).unwrap();
    h.mock.set_grant_limit(Some(4));
    let err = h.run("ntcan::IdRegionDelete", &[&hs, "0", "10"]).unwrap_err();
    assert_eq!(
        err,
        CommandError::CountMismatch {
            call: "canIdRegionDelete",
            verb: "deleted",
            granted: 4,
            requested: 10,
        }
    );
    assert_eq!(h.mock.filters(handle), vec![4, 5, 6, 7, 8, 9]);
}

#[test]
fn e2e_single_id_filter() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    h.run("ntcan::IdAdd", &[&hs, "0x7E8"]).unwrap();
    h.run("ntcan::IdAdd", &[&hs, "0x7E0"]).unwrap();
    assert_eq!(h.mock.filters(handle), vec![0x7E0, 0x7E8]);

    h.run("ntcan::IdDelete", &[&hs, "0x7E8"]).unwrap();
    let err = h.run("ntcan::IdDelete", &[&hs, "0x7E8"]).unwrap_err();
    assert!(matches!(err, CommandError::Driver { call: "canIdDelete", .. }));
}

#[test]
fn e2e_baudrate_x_roundtrip() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    h.run("ntcan::SetBaudrateX", &[&hs, "1", "0", "0x7", "0x3"])
        .unwrap();
    let got = h.run("ntcan::GetBaudrateX", &[&hs]).unwrap();
    assert_eq!(
        got,
        Value::List(vec![Value::Int(1), Value::Int(0), Value::Int(7), Value::Int(3)])
    );
}

#[test]
fn e2e_classic_baudrate_and_timeouts() {
    let h = TestHarness::with_sample_nets();
    let handle = h.open(0);
    let hs = handle.to_string();

    h.run("ntcan::SetBaudrate", &[&hs, "2"]).unwrap();
    assert_eq!(h.run("ntcan::GetBaudrate", &[&hs]).unwrap(), Value::Int(2));

    // Open used 100 ms for both directions.
    assert_eq!(h.run("ntcan::GetRxTimeout", &[&hs]).unwrap(), Value::Int(100));
    h.run("ntcan::SetRxTimeout", &[&hs, "5000"]).unwrap();
    assert_eq!(h.run("ntcan::GetRxTimeout", &[&hs]).unwrap(), Value::Int(5000));
    assert_eq!(h.run("ntcan::GetTxTimeout", &[&hs]).unwrap(), Value::Int(100));
}
