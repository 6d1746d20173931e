//! Number-format codes and numeric display rendering.
//!
//! Only the parts of the format mini-language that change the rendered
//! digits are interpreted: thousands grouping, decimal places, percent and
//! trailing-comma scaling. Colors, locale tags, quoted literals, currency
//! symbols and padding directives are skipped. Anything else (scientific notation, fractions,
//! text sections) makes the code unrecognized, and unrecognized codes fall
//! back to the canonical rendering.
//!
//! Rounding is half-up (away from zero) on the shortest decimal
//! representation of the value, so `1.005` with two places renders as
//! `1.01` the way spreadsheet applications display it. Percent and scaling
//! move the decimal point in that representation before rounding.

/// Literal characters that may appear unquoted in a format code.
const LITERALS: &[char] = &[
    '$', '-', '+', '(', ')', ':', '!', '^', '&', '\'', '~', '{', '}', '<', '>', '=', ' ',
];

const GROUP_SEPARATOR: char = ',';
const DECIMAL_POINT: char = '.';

/// The parts of a number-format code that affect the rendered digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NumberFormat {
    /// Decimal places always shown (`0` placeholders after the point).
    pub min_decimals: usize,
    /// Decimal places shown at most (`0`, `#` and `?` placeholders after the point).
    pub max_decimals: usize,
    pub grouping: bool,
    pub percent: bool,
    /// Number of trailing commas; each divides the value by 1000.
    pub thousands_scale: u32,
}

impl NumberFormat {
    /// Render a finite value using this format.
    pub fn render(&self, value: f64) -> String {
        let mut shift = -3 * self.thousands_scale as i32;
        if self.percent {
            shift += 2;
        }
        let digits = shift_decimal_point(&format!("{}", value.abs()), shift);

        let (int_digits, mut frac) = round_half_up(&digits, self.max_decimals);
        while frac.len() > self.min_decimals && frac.ends_with('0') {
            frac.pop();
        }
        let is_zero = int_digits.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
        let int_part = if self.grouping {
            group_thousands(&int_digits)
        } else {
            int_digits
        };

        let mut out = String::with_capacity(int_part.len() + frac.len() + 3);
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }
        out.push_str(&int_part);
        if !frac.is_empty() {
            out.push(DECIMAL_POINT);
            out.push_str(&frac);
        }
        if self.percent {
            out.push('%');
        }
        out
    }
}

/// Parse the positive section of a number-format code.
///
/// Returns `None` for `General`, text formats and anything this renderer
/// does not understand.
pub fn parse_number_format(code: &str) -> Option<NumberFormat> {
    let section = first_section(code).trim();
    if section.is_empty() || section.eq_ignore_ascii_case("general") {
        return None;
    }

    let mut fmt = NumberFormat::default();
    let mut seen_placeholder = false;
    let mut in_fraction = false;
    let mut zero_run = true;
    let mut chars = section.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                }
            }
            '0' | '#' | '?' => {
                seen_placeholder = true;
                if in_fraction {
                    fmt.max_decimals += 1;
                    if c == '0' && zero_run {
                        fmt.min_decimals += 1;
                    } else {
                        zero_run = false;
                    }
                }
            }
            '.' => {
                if in_fraction {
                    return None;
                }
                in_fraction = true;
            }
            ',' => {
                if !seen_placeholder {
                    continue;
                }
                let before_placeholder = matches!(chars.peek(), Some('0' | '#' | '?'));
                if !before_placeholder {
                    fmt.thousands_scale += 1;
                } else if !in_fraction {
                    fmt.grouping = true;
                }
            }
            '%' => fmt.percent = true,
            c if LITERALS.contains(&c) => {}
            // Currency and unit symbols such as € £ ¥ ₹.
            c if !c.is_ascii() && !c.is_alphanumeric() => {}
            _ => return None,
        }
    }

    seen_placeholder.then_some(fmt)
}

/// True when the format code renders a date or time.
pub fn is_date_format(code: &str) -> bool {
    let section = first_section(code);
    let mut chars = section.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let inner: String = chars.by_ref().take_while(|&b| b != ']').collect();
                // [h], [mm], [ss] are elapsed-time tokens; [Red], [$-409] are not.
                if !inner.is_empty() && inner.chars().all(|b| matches!(b, 'h' | 'H' | 'm' | 'M' | 's' | 'S')) {
                    return true;
                }
            }
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            _ => {}
        }
    }
    false
}

/// Render a number without format hints: integers without a decimal point,
/// everything else with all significant fractional digits.
pub fn format_canonical(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Render a number the way a viewer sees it under the given format code.
/// Missing or unrecognized codes use [`format_canonical`].
pub fn format_number(value: f64, code: Option<&str>) -> String {
    if !value.is_finite() {
        return format_canonical(value);
    }
    match code.and_then(parse_number_format) {
        Some(fmt) => fmt.render(value),
        None => format_canonical(value),
    }
}

/// The first `;`-separated section of a format code, ignoring separators
/// inside quotes or after a backslash.
fn first_section(code: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in code.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if !in_quotes => escaped = true,
            ';' if !in_quotes => return &code[..idx],
            _ => {}
        }
    }
    code
}

/// Move the decimal point of a plain decimal string (`"0.285"`) by `shift`
/// places to the right (negative moves it left).
fn shift_decimal_point(digits: &str, shift: i32) -> String {
    if shift == 0 {
        return digits.to_string();
    }
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let all: String = [int_part, frac_part].concat();
    let point = int_part.len() as i64 + i64::from(shift);

    let (int, frac) = if point <= 0 {
        let zeros = "0".repeat(point.unsigned_abs() as usize);
        ("0".to_string(), format!("{}{}", zeros, all))
    } else if point as usize >= all.len() {
        let zeros = "0".repeat(point as usize - all.len());
        (format!("{}{}", all, zeros), String::new())
    } else {
        let (int, frac) = all.split_at(point as usize);
        (int.to_string(), frac.to_string())
    };

    let int = int.trim_start_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{}.{}", int, frac)
    }
}

/// Round a plain decimal string (`"123.456"`) to `places` fractional digits,
/// half-up. Returns the integer and fractional digit strings.
fn round_half_up(digits: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if frac_part.len() <= places {
        let mut frac = frac_part.to_string();
        frac.extend(std::iter::repeat_n('0', places - frac_part.len()));
        return (int_part.to_string(), frac);
    }

    let round_up = frac_part.as_bytes()[places] >= b'5';
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .collect();
    if round_up {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let split = kept.len() - places;
    let int: String = kept[..split].iter().map(|&b| b as char).collect();
    let frac: String = kept[split..].iter().map(|&b| b as char).collect();
    (int, frac)
}

/// Insert group separators every three digits counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
