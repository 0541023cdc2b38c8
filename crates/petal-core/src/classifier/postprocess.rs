//! Turning a score vector into a reported class.

/// Index of the largest score.
///
/// Ties resolve to the lowest index. NaN scores are never selected; returns
/// `None` for an empty or all-NaN vector.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Render a raw score as a percentage with two decimals: `0.8231` → `"82.31%"`.
///
/// The percentage is computed in `f32` and rounded half-up (away from zero)
/// on its shortest decimal representation, so a score whose percentage prints
/// as `0.125` shows as `0.13%` rather than the binary-exact `0.12%`.
pub fn format_confidence(score: f32) -> String {
    let percent = score * 100.0;
    if percent.is_nan() {
        return "NaN%".to_string();
    }
    if percent.is_infinite() {
        let sign = if percent < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity%");
    }

    // Shortest round-trip digits of the widened value, never in exponent form
    let shortest = (percent as f64).abs().to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    let frac = frac_part.as_bytes();
    digits.extend((0..2).map(|i| frac.get(i).copied().unwrap_or(b'0')));

    if frac.get(2).is_some_and(|&d| d >= b'5') {
        round_up(&mut digits);
    }

    let split = digits.len() - 2;
    let sign = if percent.is_sign_negative() { "-" } else { "" };
    format!(
        "{sign}{}.{}%",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Add one to a string of ASCII decimal digits.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}
