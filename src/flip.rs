//! Vertical flip of SVG path data.
//!
//! SVG puts the origin at the top-left corner with y growing downwards; the
//! BAS renderer grows y upwards. [`flip_y`] rewrites every y coordinate `y`
//! of an absolute path command as `height - y`.
//!
//! The path is tokenized into commands and numbers, and each number's role
//! is decided by the current command and the number's position within that
//! command's argument group:
//!
//! | Command   | Arity | y arguments |
//! |-----------|-------|-------------|
//! | `M L T`   | 2     | 1           |
//! | `H`       | 1     | none        |
//! | `V`       | 1     | 0           |
//! | `C`       | 6     | 1, 3, 5     |
//! | `S Q`     | 4     | 1, 3        |
//! | `A`       | 7     | 6           |
//! | `Z`       | 0     | none        |
//!
//! Left unchanged: command letters, x arguments, arc radii, rotations and
//! flags, negative numbers, and every argument of a relative (lowercase)
//! command. All other text is copied byte for byte.

/// A numeric token in the source string.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NumberToken {
    start: usize,
    end: usize,
    value: f64,
    negative: bool,
    /// Digits after the decimal point, `None` when written with an exponent.
    decimals: Option<usize>,
}

/// Which arguments of a command are y coordinates.
fn y_role(command: u8, argument: usize) -> bool {
    match command {
        b'M' | b'L' | b'T' | b'C' | b'S' | b'Q' => argument % 2 == 1,
        b'V' => true,
        b'A' => argument % 7 == 6,
        _ => false,
    }
}

fn is_command(byte: u8) -> bool {
    matches!(
        byte.to_ascii_uppercase(),
        b'M' | b'L' | b'H' | b'V' | b'C' | b'S' | b'Q' | b'T' | b'A' | b'Z'
    )
}

fn continues_number(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b'.'
}

/// Whether the argument at this position is an arc flag, which may be
/// written as a bare `0`/`1` with no separator after it.
fn is_arc_flag(command: u8, argument: usize) -> bool {
    command.eq_ignore_ascii_case(&b'A') && matches!(argument % 7, 3 | 4)
}

/// Scan a number starting at `start`. Returns `None` if no digits follow.
fn scan_number(bytes: &[u8], start: usize) -> Option<NumberToken> {
    let mut index = start;
    let mut negative = false;
    if let Some(&sign) = bytes.get(index) {
        if sign == b'-' || sign == b'+' {
            negative = sign == b'-';
            index += 1;
        }
    }

    let integer_start = index;
    while bytes.get(index).is_some_and(u8::is_ascii_digit) {
        index += 1;
    }
    let mut digits = index - integer_start;

    let mut decimals = Some(0);
    if bytes.get(index) == Some(&b'.') {
        let fraction_start = index + 1;
        let mut cursor = fraction_start;
        while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
        }
        if cursor > fraction_start || digits > 0 {
            decimals = Some(cursor - fraction_start);
            digits += cursor - fraction_start;
            index = cursor;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(index), Some(b'e' | b'E')) {
        let mut cursor = index + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exponent_start = cursor;
        while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
        }
        if cursor > exponent_start {
            index = cursor;
            decimals = None;
        }
    }

    // The slice is ASCII by construction.
    let text = std::str::from_utf8(&bytes[start..index]).ok()?;
    let value = text.parse::<f64>().ok()?;
    Some(NumberToken {
        start,
        end: index,
        value,
        negative,
        decimals,
    })
}

fn format_flipped(value: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(0) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        Some(places) => format!("{value:.places$}"),
        None => format!("{value}"),
    }
}

/// Flip the y coordinates of an SVG path string around `canvas_height`.
///
/// # Example
///
/// ```
/// assert_eq!(svg2bas::flip_y("M10 20 L30 -5", 100), "M10 80 L30 -5");
/// assert_eq!(svg2bas::flip_y("M0 0 V25 H4 Z", 100), "M0 100 V75 H4 Z");
/// ```
pub fn flip_y(d: &str, canvas_height: u32) -> String {
    let bytes = d.as_bytes();
    let height = f64::from(canvas_height);
    let mut output = String::with_capacity(d.len() + 8);
    let mut copied = 0;

    let mut command: u8 = 0;
    let mut argument = 0usize;
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];

        if byte.is_ascii_alphabetic() {
            if is_command(byte) {
                command = byte;
            } else {
                command = 0;
            }
            argument = 0;
            index += 1;
            continue;
        }

        if is_arc_flag(command, argument) && (byte == b'0' || byte == b'1') {
            argument += 1;
            index += 1;
            continue;
        }

        if byte.is_ascii_digit() || byte == b'.' || byte == b'-' || byte == b'+' {
            let Some(token) = scan_number(bytes, index) else {
                index += 1;
                continue;
            };

            if y_role(command, argument) && !token.negative {
                let flipped = format_flipped(height - token.value, token.decimals);
                output.push_str(&d[copied..token.start]);
                // Keep the replacement from merging with its neighbours.
                if token.start > 0 && continues_number(bytes[token.start - 1]) {
                    output.push(' ');
                }
                output.push_str(&flipped);
                if bytes.get(token.end) == Some(&b'.') && !flipped.contains('.') {
                    output.push(' ');
                }
                copied = token.end;
            }
            argument += 1;
            index = token.end;
            continue;
        }

        // Separators and anything unrecognized.
        index += 1;
    }

    output.push_str(&d[copied..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_only_y_of_absolute_pairs() {
        assert_eq!(flip_y("M10 20 L30 -5", 100), "M10 80 L30 -5");
        assert_eq!(flip_y("M10,20L30,40", 100), "M10,80L30,60");
    }

    #[test]
    fn implicit_repeats_keep_pair_positions() {
        assert_eq!(flip_y("M0 0 10 10 20 30", 100), "M0 100 10 90 20 70");
    }

    #[test]
    fn vertical_and_horizontal_lines() {
        assert_eq!(flip_y("H50 V10 20", 100), "H50 V90 80");
    }

    #[test]
    fn curves_flip_every_odd_argument() {
        assert_eq!(
            flip_y("C1 2 3 4 5 6 S7 8 9 10 Q1 1 2 2 T3 3", 10),
            "C1 8 3 6 5 4 S7 2 9 0 Q1 9 2 8 T3 7"
        );
    }

    #[test]
    fn arcs_flip_only_the_end_point() {
        assert_eq!(flip_y("A5 5 0 1 0 10 20", 100), "A5 5 0 1 0 10 80");
        // Compact flags with no separators.
        assert_eq!(flip_y("A5 5 0 0110 20", 100), "A5 5 0 0110 80");
    }

    #[test]
    fn relative_commands_pass_through() {
        assert_eq!(flip_y("m10 20 l5 5 v3 c1 2 3 4 5 6z", 100), "m10 20 l5 5 v3 c1 2 3 4 5 6z");
        assert_eq!(flip_y("M10 20 l5 5 L1 1", 100), "M10 80 l5 5 L1 99");
    }

    #[test]
    fn decimals_and_compact_numbers() {
        assert_eq!(flip_y("M1.5 20.25", 100), "M1.5 79.75");
        assert_eq!(flip_y("M0.5.5", 10), "M0.5 9.5");
        assert_eq!(flip_y("M1 2.1", 100), "M1 97.9");
        assert_eq!(flip_y("M5+5", 100), "M5 95");
    }

    #[test]
    fn exponent_numbers() {
        assert_eq!(flip_y("M0 1e1", 100), "M0 90");
    }

    #[test]
    fn negative_y_is_left_alone() {
        assert_eq!(flip_y("M5-5L6-7", 100), "M5-5L6-7");
    }

    #[test]
    fn separators_and_whitespace_are_preserved() {
        assert_eq!(flip_y("  M 1 , 2\nL 3 4 Z  ", 10), "  M 1 , 8\nL 3 6 Z  ");
    }

    #[test]
    fn empty_path() {
        assert_eq!(flip_y("", 100), "");
    }
}
