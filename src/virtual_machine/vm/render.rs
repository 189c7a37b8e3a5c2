use std::io::{self, Write};
use std::ops::RangeInclusive;

/// Bytes written as their ASCII character; everything else is written `[N]`.
pub const PRINTABLE: RangeInclusive<u8> = 32..=126;

/// Writes one output list followed by a newline.
///
/// Runs of printable bytes are written in one call.
pub fn render_list<W: Write>(values: &[u8], out: &mut W) -> io::Result<()> {
    let mut rest = values;
    while !rest.is_empty() {
        let run = rest
            .iter()
            .position(|b| !PRINTABLE.contains(b))
            .unwrap_or(rest.len());
        out.write_all(&rest[..run])?;
        if let Some(byte) = rest.get(run) {
            write!(out, "[{byte}]")?;
            rest = &rest[run + 1..];
        } else {
            rest = &[];
        }
    }
    out.write_all(b"\n")
}
