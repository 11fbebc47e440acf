use std::fmt;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// A parsed value plus whether it fell back to the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub defaulted: bool,
}

/// Parse a pt-BR amount ("1.234,56") and report whether parsing failed.
///
/// Dots are thousands separators and are dropped; the comma becomes the
/// decimal point. Anything that still isn't a finite number yields 0.0.
pub fn check_amount(raw: Option<&str>) -> Checked<f64> {
    let Some(raw) = raw else {
        return Checked { value: 0.0, defaulted: true };
    };
    let normalized = raw.replace('.', "").replace(',', ".");
    match normalized.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Checked { value: v, defaulted: false },
        _ => Checked { value: 0.0, defaulted: true },
    }
}

pub fn parse_amount(raw: &str) -> f64 {
    check_amount(Some(raw)).value
}

/// Round to two decimal places; exact halves go to the even cent.
pub fn round2(val: f64) -> f64 {
    let rounded = (val * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Year/month key used to group records into monthly series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket {
    pub year: String,
    pub month: String,
}

impl Bucket {
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// Extract a `(year, month)` bucket from a loosely formatted date.
///
/// Slash dates are `dd/mm/yyyy` when the last part is four characters long
/// and otherwise read month from the first part (`mm/dd/yy...`). Dash dates
/// are `yyyy-mm-...`. The month must be numeric so it can be zero-padded;
/// dates without enough parts or with a non-numeric month have no bucket.
pub fn bucket_date(raw: &str) -> Option<Bucket> {
    let raw = raw.trim();
    let (year, month) = if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() < 3 {
            return None;
        }
        let last = parts[parts.len() - 1];
        if last.chars().count() == 4 {
            (parts[2], parts[1])
        } else {
            (parts[2], parts[0])
        }
    } else if raw.contains('-') {
        let parts: Vec<&str> = raw.split('-').collect();
        (parts[0], parts[1])
    } else {
        return None;
    };

    let month: u32 = month.trim().parse().ok()?;
    Some(Bucket {
        year: year.to_string(),
        month: format!("{month:02}"),
    })
}
