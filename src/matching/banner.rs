/// Box-drawing, star, bullet and filler glyphs providers use for separator rows
const DECORATIVE_GLYPHS: &[char] = &[
    '★', '☆', '✦', '✧', '✪', '✯', '✰', '❖', '❋', '✿', '❀', '♦', '♢', '◆', '◇', '●', '○',
    '◉', '•', '▪', '▫', '■', '□', '▬', '▶', '◀', '►', '◄', '»', '«', '═', '─', '━', '│',
    '┃', '║', '╔', '╗', '╚', '╝', '╠', '╣', '▎', '▌', '▐', '░', '▒', '▓', '█', '#', '=',
    '*', '~', '_', '|',
];

const MIN_NAME_CHARS: usize = 3;

pub fn is_decorative(c: char) -> bool {
    DECORATIVE_GLYPHS.contains(&c)
}

/// True for separator or placeholder rows that are not playable channels.
///
/// A name is a banner when, once trimmed, it is shorter than three
/// characters, has more decorative glyphs than letters and digits, contains
/// a run of three hyphens, or is framed by decorative glyphs on both ends
/// (`★★★ PLACEHOLDER ★★★`, `#### USA ####`).
pub fn is_banner(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return true;
    }

    if trimmed.contains("---") {
        return true;
    }

    let framed = trimmed.chars().next().is_some_and(is_decorative)
        && trimmed.chars().next_back().is_some_and(is_decorative);
    if framed {
        return true;
    }

    let (decorative, alphanumeric) = trimmed.chars().fold((0usize, 0usize), |(d, a), c| {
        if is_decorative(c) {
            (d + 1, a)
        } else if c.is_alphanumeric() {
            (d, a + 1)
        } else {
            (d, a)
        }
    });
    decorative > alphanumeric
}
