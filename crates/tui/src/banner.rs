use std::collections::HashMap;

use once_cell::sync::Lazy;

const GLYPH_HEIGHT: usize = 5;
const GLYPH_WIDTH: usize = 5;
const LETTER_SPACING: usize = 1;
const FILL_CHAR: char = '█';
const SHADOW_CHAR: char = '▒';

type Glyph = [&'static str; GLYPH_HEIGHT];

const FALLBACK: Glyph = [" 111 ", "1   1", "  11 ", "     ", "  1  "];

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('A', [" 111 ", "1   1", "11111", "1   1", "1   1"]),
        ('E', ["11111", "1    ", "1111 ", "1    ", "11111"]),
        ('I', ["11111", "  1  ", "  1  ", "  1  ", "11111"]),
        ('L', ["1    ", "1    ", "1    ", "1    ", "11111"]),
        ('R', ["1111 ", "1   1", "1111 ", "1  1 ", "1   1"]),
        ('S', [" 1111", "1    ", " 111 ", "    1", "1111 "]),
        ('V', ["1   1", "1   1", "1   1", " 1 1 ", "  1  "]),
        ('W', ["1   1", "1   1", "1 1 1", "11 11", "1   1"]),
        ('Y', ["1   1", " 1 1 ", "  1  ", "  1  ", "  1  "]),
        (' ', ["     ", "     ", "     ", "     ", "     "]),
    ])
});

/// Render `text` in block letters with a one-cell drop shadow.
pub fn render(text: &str) -> Vec<String> {
    let content: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    let height = GLYPH_HEIGHT + 1;
    if content.is_empty() {
        return vec![String::new(); height];
    }

    let width = content.len() * (GLYPH_WIDTH + LETTER_SPACING) + 1;
    let mut canvas = vec![vec![' '; width]; height];
    for (index, ch) in content.iter().enumerate() {
        let glyph = GLYPHS.get(ch).unwrap_or(&FALLBACK);
        let x_offset = index * (GLYPH_WIDTH + LETTER_SPACING);
        for (y, row) in glyph.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                if symbol == '1' {
                    place(&mut canvas, y, x_offset + x, FILL_CHAR);
                    place(&mut canvas, y + 1, x_offset + x + 1, SHADOW_CHAR);
                }
            }
        }
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

/// Display width of the widest rendered line.
pub fn width(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

fn place(canvas: &mut [Vec<char>], y: usize, x: usize, ch: char) {
    let Some(cell) = canvas.get_mut(y).and_then(|row| row.get_mut(x)) else {
        return;
    };
    if *cell == ' ' || (*cell == SHADOW_CHAR && ch == FILL_CHAR) {
        *cell = ch;
    }
}
