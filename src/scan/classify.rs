// Label classification: permissive two-way taxonomy over the runtime's class names.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    HighGrade,
    LowGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Supermarket,
    Juice,
}

/// Case-fold a raw class label and collapse separator runs (`_`, `-`,
/// whitespace) to single spaces.
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// `HighGrade` iff the normalized label contains "high"; everything else is low.
pub fn classify(raw_label: &str) -> Grade {
    if normalize_label(raw_label).contains("high") {
        Grade::HighGrade
    } else {
        Grade::LowGrade
    }
}

/// Winning score scaled to an integer percentage, round half to even, 0 to 100.
pub fn confidence_pct(score: f32) -> u8 {
    // f32 arithmetic pushes 0.005 * 100 up to exactly 0.5; widen first.
    ((score as f64) * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

pub fn recommendation(grade: Grade) -> Recommendation {
    match grade {
        Grade::HighGrade => Recommendation::Supermarket,
        Grade::LowGrade => Recommendation::Juice,
    }
}
