use crate::state::ListingLine;
use std::io::Write;

/// Writes the listing produced by pass 2: address, emitted bytes and the
/// originating source line. Long runs (e.g. `!fill`) wrap at eight bytes.
pub fn write_listing<W: Write>(writer: &mut W, lines: &[ListingLine]) -> std::io::Result<()> {
    for line in lines {
        for (index, chunk) in line.bytes.chunks(8).enumerate() {
            let rendered: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            writeln!(
                writer,
                "{:04x}  {:<23}  {}:{}",
                line.pc as usize + index * 8,
                rendered.join(" "),
                line.path,
                line.line
            )?;
        }
    }
    Ok(())
}
