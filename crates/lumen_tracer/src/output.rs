//! Image output: plain-text PPM plus anything the `image` crate encodes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::accumulation::AccumulationBuffer;
use crate::error::RenderResult;

/// Write the tone-mapped buffer as ASCII PPM (P3), top row first.
pub fn write_ppm<W: Write>(buffer: &AccumulationBuffer, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", buffer.width(), buffer.height())?;
    writeln!(writer, "255")?;

    for y in (0..buffer.height()).rev() {
        for rgb in buffer.display_row(y).chunks_exact(3) {
            writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
        }
    }

    Ok(())
}

/// Save as a PPM file.
pub fn save_ppm<P: AsRef<Path>>(buffer: &AccumulationBuffer, path: P) -> RenderResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_ppm(buffer, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save in the format named by the file extension.
///
/// `.ppm` (or no extension) goes through [`write_ppm`]; everything else is
/// handed to the `image` crate.
pub fn save_image<P: AsRef<Path>>(buffer: &AccumulationBuffer, path: P) -> RenderResult<()> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        save_ppm(buffer, path)?;
    } else {
        buffer.to_rgb_image().save(path)?;
    }

    log::info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn two_by_two() -> AccumulationBuffer {
        let mut buffer = AccumulationBuffer::new(2, 2);
        buffer.add_sample(0, 0, Color::new(1.0, 0.0, 0.0));
        buffer.add_sample(1, 0, Color::new(0.0, 1.0, 0.0));
        buffer.add_sample(0, 1, Color::new(0.0, 0.0, 1.0));
        buffer.add_sample(1, 1, Color::splat(0.25));
        buffer
    }

    #[test]
    fn test_ppm_layout() {
        let mut out = Vec::new();
        write_ppm(&two_by_two(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Top row (y = 1) first
        assert_eq!(
            text,
            "P3\n2 2\n255\n0 0 255\n127 127 127\n255 0 0\n0 255 0\n"
        );
    }

    #[test]
    fn test_unsampled_pixels_write_black() {
        let mut out = Vec::new();
        write_ppm(&AccumulationBuffer::new(1, 2), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "P3\n1 2\n255\n0 0 0\n0 0 0\n");
    }

    #[test]
    fn test_save_image_by_extension() {
        let dir = std::env::temp_dir().join(format!("lumen-output-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let buffer = two_by_two();

        let ppm = dir.join("frame.ppm");
        save_image(&buffer, &ppm).unwrap();
        assert!(std::fs::read_to_string(&ppm).unwrap().starts_with("P3\n2 2\n"));

        let png = dir.join("frame.png");
        save_image(&buffer, &png).unwrap();
        let decoded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [0, 255, 0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let path = std::env::temp_dir().join("lumen-no-such-dir").join("x").join("out.ppm");
        assert!(save_image(&two_by_two(), path).is_err());
    }
}
