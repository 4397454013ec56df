//! Terminal QR rendering
//!
//! Renders a pairing payload as a scannable block using Unicode half-block
//! characters, packing two rows of modules into each output line so the code
//! fits a normal terminal.

use anyhow::{Context, Result};
use qrcode::{Color, EcLevel, QrCode};

pub fn render_terminal(data: &str) -> Result<String> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .context("QR generation failed")?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let is_dark = |row: usize, col: usize| -> bool {
        row < width && col < width && colors[row * width + col] == Color::Dark
    };

    let mut out = String::new();
    let mut row = 0;
    while row < width {
        for col in 0..width {
            let top = is_dark(row, col);
            let bottom = row + 1 < width && is_dark(row + 1, col);
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_non_empty_block() {
        let qr = render_terminal("wa-relay-pairing-payload").unwrap();
        assert!(!qr.is_empty());
        // Two module rows per text line.
        let lines: Vec<&str> = qr.lines().collect();
        assert!(lines.len() >= 10);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn uses_only_half_block_characters() {
        let qr = render_terminal("payload").unwrap();
        assert!(
            qr.chars()
                .all(|c| matches!(c, '█' | '▀' | '▄' | ' ' | '\n'))
        );
    }
}
