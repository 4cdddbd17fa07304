//! Typed decoding of command arguments.

use ntcan_driver::Handle;

use crate::error::{CommandError, CommandResult};
use crate::value::Value;

/// Arguments of one invocation, already arity-checked by the registry.
pub struct Args<'a> {
    command: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(command: &'a str, values: &'a [Value]) -> Self {
        Self { command, values }
    }

    pub fn command(&self) -> &str {
        self.command
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn handle(&self, index: usize) -> CommandResult<Handle> {
        self.int(index, "handle", "an integer handle").map(Handle)
    }

    /// Signed 32-bit word. Values up to `u32::MAX` wrap like a C cast.
    pub fn int32(&self, index: usize, name: &'static str) -> CommandResult<i32> {
        self.word32(index, name).map(|n| n as i32)
    }

    /// Unsigned 32-bit word. Negative values down to `i32::MIN` wrap like a C cast.
    pub fn uint32(&self, index: usize, name: &'static str) -> CommandResult<u32> {
        self.word32(index, name).map(|n| n as u32)
    }

    pub fn uint16(&self, index: usize, name: &'static str) -> CommandResult<u16> {
        let n = self.int(index, name, "an integer in 0..65535")?;
        u16::try_from(n).map_err(|_| self.invalid(index, name, "an integer in 0..65535"))
    }

    /// Payload bytes: a byte array, a list of byte values, or hex text.
    pub fn bytes(&self, index: usize, name: &'static str) -> CommandResult<Vec<u8>> {
        self.get(index)
            .as_bytes()
            .ok_or_else(|| self.invalid(index, name, "a byte array or hex string"))
    }

    fn word32(&self, index: usize, name: &'static str) -> CommandResult<i64> {
        const EXPECTED: &str = "a 32-bit integer";
        let n = self.int(index, name, EXPECTED)?;
        if (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&n) {
            Ok(n)
        } else {
            Err(self.invalid(index, name, EXPECTED))
        }
    }

    fn int(&self, index: usize, name: &'static str, expected: &'static str) -> CommandResult<i64> {
        self.get(index)
            .as_int()
            .ok_or_else(|| self.invalid(index, name, expected))
    }

    fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&Value::Empty)
    }

    fn invalid(&self, index: usize, name: &'static str, expected: &'static str) -> CommandError {
        CommandError::InvalidArgument {
            command: self.command.to_string(),
            name,
            value: self.get(index).to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn int32_wraps_unsigned_range() {
        let values = words(&["0xFFFFFFFF", "-1", "0x80000000"]);
        let args = Args::new("ntcan::IdAdd", &values);
        assert_eq!(args.int32(0, "id").unwrap(), -1);
        assert_eq!(args.int32(1, "id").unwrap(), -1);
        assert_eq!(args.int32(2, "id").unwrap(), i32::MIN);
        assert_eq!(args.uint32(1, "mode").unwrap(), u32::MAX);
    }

    #[test]
    fn int32_rejects_out_of_range() {
        let values = words(&["0x100000000", "-2147483649"]);
        let args = Args::new("ntcan::IdAdd", &values);
        assert!(args.int32(0, "id").is_err());
        assert!(args.uint32(1, "id").is_err());
    }

    #[test]
    fn uint16_bounds() {
        let values = words(&["65535", "65536", "-1"]);
        let args = Args::new("ntcan::SetBaudrateX", &values);
        assert_eq!(args.uint16(0, "mode").unwrap(), 0xFFFF);
        assert!(args.uint16(1, "mode").is_err());
        assert!(args.uint16(2, "mode").is_err());
    }

    #[test]
    fn invalid_argument_names_the_value() {
        let values = words(&["abc"]);
        let args = Args::new("ntcan::Close", &values);
        let err = args.handle(0).unwrap_err();
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            r#"ntcan::Close: expected an integer handle for handle but got "abc""#
        );
    }

    #[test]
    fn bytes_accepts_hex_and_arrays() {
        let values = vec![Value::from("01 02"), Value::Bytes(vec![9]), Value::Int(3)];
        let args = Args::new("ntcan::Write", &values);
        assert_eq!(args.bytes(0, "data").unwrap(), vec![1, 2]);
        assert_eq!(args.bytes(1, "data").unwrap(), vec![9]);
        assert!(args.bytes(2, "data").is_err());
    }
}
