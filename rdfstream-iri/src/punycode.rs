//! Punycode (RFC 3492) bootstring encoding.

use crate::error::IdnaError;

const BASE: u32 = 36;
const TMIN: u32 = 1;
const TMAX: u32 = 26;
const SKEW: u32 = 38;
const DAMP: u32 = 700;
const INITIAL_BIAS: u32 = 72;
const INITIAL_N: u32 = 0x80;
const DELIMITER: char = '-';

fn adapt(mut delta: u32, num_points: u32, first_time: bool) -> u32 {
    delta = if first_time { delta / DAMP } else { delta / 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - TMIN) * TMAX) / 2 {
        delta /= BASE - TMIN;
        k += BASE;
    }
    k + (BASE - TMIN + 1) * delta / (delta + SKEW)
}

fn threshold(k: u32, bias: u32) -> u32 {
    if k <= bias {
        TMIN
    } else if k >= bias + TMAX {
        TMAX
    } else {
        k - bias
    }
}

fn encode_digit(d: u32) -> char {
    // 0..25 => 'a'..'z', 26..35 => '0'..'9'
    let cp = if d < 26 { d + 97 } else { d + 22 };
    char::from_u32(cp).unwrap_or('a')
}

fn decode_digit(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - 22),
        'A'..='Z' => Some(c as u32 - 65),
        'a'..='z' => Some(c as u32 - 97),
        _ => None,
    }
}

/// Encode a Unicode string as punycode (without the `xn--` prefix).
pub fn encode(input: &str) -> Result<String, IdnaError> {
    let chars: Vec<u32> = input.chars().map(|c| c as u32).collect();
    let mut out: String = input.chars().filter(char::is_ascii).collect();

    let basic = out.chars().count() as u32;
    let mut handled = basic;
    if basic > 0 {
        out.push(DELIMITER);
    }

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let total = chars.len() as u32;

    while handled < total {
        let m = chars
            .iter()
            .copied()
            .filter(|&c| c >= n)
            .min()
            .ok_or(IdnaError::Overflow)?;
        let step = (m - n)
            .checked_mul(handled + 1)
            .ok_or(IdnaError::Overflow)?;
        delta = delta.checked_add(step).ok_or(IdnaError::Overflow)?;
        n = m;

        for &c in &chars {
            if c < n {
                delta = delta.checked_add(1).ok_or(IdnaError::Overflow)?;
            }
            if c == n {
                let mut q = delta;
                let mut k = BASE;
                loop {
                    let t = threshold(k, bias);
                    if q < t {
                        break;
                    }
                    out.push(encode_digit(t + (q - t) % (BASE - t)));
                    q = (q - t) / (BASE - t);
                    k += BASE;
                }
                out.push(encode_digit(q));
                bias = adapt(delta, handled + 1, handled == basic);
                delta = 0;
                handled += 1;
            }
        }
        delta = delta.checked_add(1).ok_or(IdnaError::Overflow)?;
        n += 1;
    }
    Ok(out)
}

/// Decode punycode (without the `xn--` prefix) to a Unicode string.
pub fn decode(input: &str) -> Result<String, IdnaError> {
    let (basic, extended) = match input.rfind(DELIMITER) {
        Some(pos) => (&input[..pos], &input[pos + 1..]),
        None => ("", input),
    };
    if !basic.is_ascii() {
        return Err(IdnaError::BadInput(input.to_string()));
    }

    let mut output: Vec<char> = basic.chars().collect();
    let mut n = INITIAL_N;
    let mut i: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut digits = extended.chars().peekable();

    while digits.peek().is_some() {
        let old_i = i;
        let mut w: u32 = 1;
        let mut k = BASE;
        loop {
            let c = digits
                .next()
                .ok_or_else(|| IdnaError::BadInput(input.to_string()))?;
            let digit = decode_digit(c).ok_or_else(|| IdnaError::BadInput(input.to_string()))?;
            let step = digit.checked_mul(w).ok_or(IdnaError::Overflow)?;
            i = i.checked_add(step).ok_or(IdnaError::Overflow)?;
            let t = threshold(k, bias);
            if digit < t {
                break;
            }
            w = w.checked_mul(BASE - t).ok_or(IdnaError::Overflow)?;
            k += BASE;
        }
        let len = output.len() as u32 + 1;
        bias = adapt(i - old_i, len, old_i == 0);
        n = n.checked_add(i / len).ok_or(IdnaError::Overflow)?;
        i %= len;
        let c = char::from_u32(n).ok_or_else(|| IdnaError::BadInput(input.to_string()))?;
        output.insert(i as usize, c);
        i += 1;
    }
    Ok(output.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rfc3492_samples() {
        // (A) Arabic (Egyptian)
        assert_eq!(
            encode("\u{0644}\u{064A}\u{0647}\u{0645}\u{0627}\u{0628}\u{062A}\u{0643}\u{0644}\u{0645}\u{0648}\u{0634}\u{0639}\u{0631}\u{0628}\u{064A}\u{061F}")
                .unwrap(),
            "egbpdaj6bu4bxfgehfvwxn"
        );
        // (L) 3<nen>B<gumi><kinpachi><sensei>
        assert_eq!(
            encode("3年B組金八先生").unwrap(),
            "3B-ww4c5e180e575a65lsy2b"
        );
    }

    #[test]
    fn test_encode_mixed() {
        assert_eq!(encode("bücher").unwrap(), "bcher-kva");
        assert_eq!(encode("münchen").unwrap(), "mnchen-3ya");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("bcher-kva").unwrap(), "bücher");
        assert_eq!(decode("3B-ww4c5e180e575a65lsy2b").unwrap(), "3年B組金八先生");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("ab!c").is_err());
        // truncated variable-length integer
        assert!(decode("bcher-kv").is_err());
    }

    #[test]
    fn test_all_ascii() {
        assert_eq!(encode("abc").unwrap(), "abc-");
        assert_eq!(decode("abc-").unwrap(), "abc");
    }
}
