//! Receive id filter.
//!
//! A short grant on a region call is an error, but whatever the driver did
//! grant stays applied. Nothing is rolled back.

use ntcan_driver::{NtcanDriver, calls};

use super::failed;
use crate::args::Args;
use crate::error::{CommandError, CommandResult};
use crate::registry::CommandSpec;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "IdAdd",
            usage: "handle id",
            arity: 2,
            summary: "Enable reception of one CAN id",
            handler: id_add,
        },
        CommandSpec {
            name: "IdRegionAdd",
            usage: "handle idStart idCnt",
            arity: 3,
            summary: "Enable reception of a range of CAN ids",
            handler: id_region_add,
        },
        CommandSpec {
            name: "IdDelete",
            usage: "handle id",
            arity: 2,
            summary: "Disable reception of one CAN id",
            handler: id_delete,
        },
        CommandSpec {
            name: "IdRegionDelete",
            usage: "handle idStart idCnt",
            arity: 3,
            summary: "Disable reception of a range of CAN ids",
            handler: id_region_delete,
        },
    ]
}

fn id_add(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let id = args.int32(1, "id")?;
    driver.id_add(handle, id).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn id_delete(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let id = args.int32(1, "id")?;
    driver.id_delete(handle, id).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn id_region_add(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let start = args.int32(1, "idStart")?;
    let requested = args.int32(2, "idCnt")?;
    let granted = driver
        .id_region_add(handle, start, requested)
        .map_err(failed(driver))?;
    full_grant(calls::ID_REGION_ADD, "added", granted, requested)
}

fn id_region_delete(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let start = args.int32(1, "idStart")?;
    let requested = args.int32(2, "idCnt")?;
    let granted = driver
        .id_region_delete(handle, start, requested)
        .map_err(failed(driver))?;
    full_grant(calls::ID_REGION_DELETE, "deleted", granted, requested)
}

fn full_grant(
    call: &'static str,
    verb: &'static str,
    granted: i32,
    requested: i32,
) -> CommandResult<Value> {
    if granted == requested {
        Ok(Value::Empty)
    } else {
        tracing::warn!(call, granted, requested, "partial id region grant");
        Err(CommandError::CountMismatch {
            call,
            verb,
            granted,
            requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntcan_driver::{Handle, IfStatus, MockDriver, OpenParams};

    use crate::registry::CommandRegistry;

    fn open() -> (MockDriver, Handle) {
        let mock = MockDriver::with_net(0, IfStatus::default());
        let handle = mock.open(OpenParams::probe(0)).unwrap();
        mock.clear_calls();
        (mock, handle)
    }

    fn region(h: Handle, start: i64, count: i64) -> [Value; 3] {
        [Value::Int(h.0), Value::Int(start), Value::Int(count)]
    }

    #[test]
    fn id_add_and_delete() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        reg.dispatch("IdAdd", &[Value::Int(h.0), Value::from("0x123")], &mock)
            .unwrap();
        assert_eq!(mock.filters(h), vec![0x123]);
        reg.dispatch("IdDelete", &[Value::Int(h.0), Value::Int(0x123)], &mock)
            .unwrap();
        assert!(mock.filters(h).is_empty());
    }

    #[test]
    fn delete_unknown_id_is_driver_error() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        let err = reg
            .dispatch("IdDelete", &[Value::Int(h.0), Value::Int(5)], &mock)
            .unwrap_err();
        assert!(matches!(err, CommandError::Driver { call: "canIdDelete", .. }));
    }

    #[test]
    fn region_add_full_grant() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        let result = reg.dispatch("IdRegionAdd", &region(h, 0x100, 4), &mock).unwrap();
        assert!(result.is_empty());
        assert_eq!(mock.filters(h), vec![0x100, 0x101, 0x102, 0x103]);
        assert_eq!(mock.calls(), vec!["canIdRegionAdd"]);
    }

    #[test]
    fn region_add_short_grant_keeps_partial_filter() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        mock.set_grant_limit(Some(3));

        let err = reg
            .dispatch("IdRegionAdd", &region(h, 0x100, 4), &mock)
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::CountMismatch {
                call: "canIdRegionAdd",
                verb: "added",
                granted: 3,
                requested: 4,
            }
        );
        assert_eq!(mock.filters(h).len(), 3);
    }

    #[test]
    fn region_delete_short_grant() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        reg.dispatch("IdRegionAdd", &region(h, 0, 8), &mock).unwrap();
        mock.set_grant_limit(Some(2));

        let err = reg
            .dispatch("IdRegionDelete", &region(h, 0, 8), &mock)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "NTCAN canIdRegionDelete() deleted only 2 instead of 8 IDs"
        );
        assert_eq!(mock.filters(h), vec![2, 3, 4, 5, 6, 7]);
    }
}
