use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal columns occupied by `s` (CJK and emoji count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// Widths of three columns or less cannot fit a character plus the ellipsis,
/// so the text is simply cut there. Returns the input unchanged (borrowed)
/// when it already fits.
///
/// ```
/// use cliflux::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

fn is_stripped_control(b: u8) -> bool {
    b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Entry titles and bodies come from arbitrary feeds; anything that could
/// move the cursor or retitle the terminal is dropped before display. CSI
/// (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`) sequences are removed
/// whole; other control bytes except tab, newline and carriage return are
/// removed individually.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| b == 0x1b || is_stripped_control(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                i += 2;
                while i < bytes.len() {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            }
            0x1b if bytes.get(i + 1) == Some(&b']') => {
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b if b == 0x1b || is_stripped_control(b) => i += 1,
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != 0x1b && !is_stripped_control(bytes[i]) {
                    i += 1;
                }
                // Only ASCII bytes stop the run, so the slice is on a char boundary.
                out.push_str(&s[start..i]);
            }
        }
    }

    Cow::Owned(out)
}
