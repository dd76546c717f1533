//! Embedded digit art for the counter image. Each entry is the inner content
//! of a 40x60 tile (already stripped of its outer `<svg>` wrapper); the
//! kiriban module translates them into their slots.

const DIGIT_BODIES: [&str; 10] = [
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>0</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>1</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>2</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>3</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>4</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>5</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>6</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>7</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>8</text>",
    "<rect width='40' height='60' rx='4' fill='#10142a'/><text x='20' y='45' font-family='monospace' font-size='44' fill='#9ce7c8' text-anchor='middle'>9</text>",
];

/// Tile content for one decimal digit; anything out of range renders empty.
pub fn digit_body(digit: usize) -> &'static str {
    DIGIT_BODIES.get(digit).copied().unwrap_or("")
}
