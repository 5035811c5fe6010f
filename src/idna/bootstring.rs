//! Bootstring transcoder (RFC 3492) with the Punycode parameters.
//!
//! Code point sequences are `&[char]`, so every element is already a Unicode
//! scalar value. All delta and index arithmetic is checked; an overflow is
//! reported as [`EmojiDomainError::Overflow`] instead of wrapping.

use crate::error::{EmojiDomainError, Result};

pub const BASE: u32 = 36;
pub const T_MIN: u32 = 1;
pub const T_MAX: u32 = 26;
pub const SKEW: u32 = 38;
pub const DAMP: u32 = 700;
pub const INITIAL_BIAS: u32 = 72;
pub const INITIAL_N: u32 = 0x80;
pub const DELIMITER: char = '-';

/// Bias adaptation after each encoded or decoded delta.
///
/// `num_points` counts every code point handled so far, basic ones included,
/// plus the one this delta belongs to.
pub fn adapt_bias(delta: u32, num_points: u32, first_time: bool) -> u32 {
    let mut delta = if first_time { delta / DAMP } else { delta >> 1 };
    delta += delta / num_points;

    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }

    k + (BASE - T_MIN + 1) * delta / (delta + SKEW)
}

/// Digit threshold for position `k`: `clamp(k - bias, T_MIN, T_MAX)`
pub fn threshold(k: u32, bias: u32) -> u32 {
    k.saturating_sub(bias).clamp(T_MIN, T_MAX)
}

/// Digit value to its lowercase character (`a`..`z`, `0`..`9`)
pub fn encode_digit(d: u32) -> Option<char> {
    match d {
        0..=25 => char::from_u32('a' as u32 + d),
        26..=35 => char::from_u32('0' as u32 + d - 26),
        _ => None,
    }
}

/// Character to digit value, case-insensitive
pub fn decode_digit(c: char) -> Option<u32> {
    match c {
        'a'..='z' => Some(c as u32 - 'a' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32),
        '0'..='9' => Some(c as u32 - '0' as u32 + 26),
        _ => None,
    }
}

/// Encode a code point sequence into a Bootstring label (without `xn--`).
pub fn encode_label(input: &[char]) -> Result<String> {
    let mut output: String = input.iter().filter(|c| c.is_ascii()).collect();
    let basic_len = u32::try_from(output.len())
        .map_err(|_| EmojiDomainError::overflow("input has too many basic code points"))?;
    let total = u32::try_from(input.len())
        .map_err(|_| EmojiDomainError::overflow("input has too many code points"))?;

    if basic_len > 0 {
        output.push(DELIMITER);
    }

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut handled = basic_len;

    while handled < total {
        // Smallest code point not yet handled; one exists while handled < total.
        let m = input
            .iter()
            .map(|&c| c as u32)
            .filter(|&c| c >= n)
            .min()
            .ok_or_else(|| EmojiDomainError::internal("no code point left to encode"))?;

        delta = (m - n)
            .checked_mul(handled + 1)
            .and_then(|d| delta.checked_add(d))
            .ok_or_else(|| EmojiDomainError::overflow("delta exceeds 32 bits while encoding"))?;
        n = m;

        for &c in input {
            let c = c as u32;
            if c < n {
                delta = delta
                    .checked_add(1)
                    .ok_or_else(|| EmojiDomainError::overflow("delta exceeds 32 bits while encoding"))?;
            }
            if c == n {
                emit_integer(&mut output, delta, bias)?;
                bias = adapt_bias(delta, handled + 1, handled == basic_len);
                delta = 0;
                handled += 1;
            }
        }

        delta = delta
            .checked_add(1)
            .ok_or_else(|| EmojiDomainError::overflow("delta exceeds 32 bits while encoding"))?;
        n += 1;
    }

    Ok(output)
}

/// Write `q` as a generalized variable-length integer
fn emit_integer(output: &mut String, mut q: u32, bias: u32) -> Result<()> {
    let mut k = BASE;
    loop {
        let t = threshold(k, bias);
        if q < t {
            break;
        }
        let digit = t + (q - t) % (BASE - t);
        output.push(encode_digit(digit).ok_or_else(|| EmojiDomainError::internal("digit out of range"))?);
        q = (q - t) / (BASE - t);
        k += BASE;
    }
    output.push(encode_digit(q).ok_or_else(|| EmojiDomainError::internal("digit out of range"))?);
    Ok(())
}

/// Decode a Bootstring label (without `xn--`) back into code points.
pub fn decode_label(input: &str) -> Result<Vec<char>> {
    // A leading delimiter is not a separator: with no basic code points the
    // whole input is the digit stream, where '-' is invalid.
    let (basic, digits) = match input.rfind(DELIMITER) {
        Some(pos) if pos > 0 => (&input[..pos], &input[pos + 1..]),
        _ => ("", input),
    };

    let mut output: Vec<char> = Vec::with_capacity(input.len());
    for (pos, c) in basic.char_indices() {
        if !c.is_ascii() {
            return Err(EmojiDomainError::invalid_input(
                format!("non-basic code point U+{:04X} before the delimiter", c as u32),
                Some(pos),
            ));
        }
        output.push(c);
    }

    let offset = input.len() - digits.len();
    let mut digits = digits.char_indices().peekable();
    let mut n = INITIAL_N;
    let mut i: u32 = 0;
    let mut bias = INITIAL_BIAS;

    while digits.peek().is_some() {
        let old_i = i;
        let mut w: u32 = 1;
        let mut k = BASE;

        loop {
            let (pos, c) = digits.next().ok_or_else(|| {
                EmojiDomainError::invalid_input("digit stream ends inside an integer", Some(input.len()))
            })?;
            let digit = decode_digit(c).ok_or_else(|| {
                EmojiDomainError::invalid_input(format!("'{}' is not a base-36 digit", c), Some(offset + pos))
            })?;

            i = digit
                .checked_mul(w)
                .and_then(|d| i.checked_add(d))
                .ok_or_else(|| EmojiDomainError::overflow("insertion index exceeds 32 bits while decoding"))?;

            let t = threshold(k, bias);
            if digit < t {
                break;
            }
            w = w
                .checked_mul(BASE - t)
                .ok_or_else(|| EmojiDomainError::overflow("digit weight exceeds 32 bits while decoding"))?;
            k += BASE;
        }

        let len = u32::try_from(output.len() + 1)
            .map_err(|_| EmojiDomainError::overflow("output has too many code points"))?;
        bias = adapt_bias(i - old_i, len, old_i == 0);

        n = n
            .checked_add(i / len)
            .ok_or_else(|| EmojiDomainError::overflow("code point exceeds 32 bits while decoding"))?;
        i %= len;

        if n < INITIAL_N {
            return Err(EmojiDomainError::invalid_input(
                format!("encoded basic code point U+{:04X}", n),
                None,
            ));
        }
        let c = char::from_u32(n).ok_or_else(|| {
            EmojiDomainError::invalid_input(format!("0x{:X} is not a Unicode scalar value", n), None)
        })?;

        output.insert(i as usize, c);
        i += 1;
    }

    Ok(output)
}
