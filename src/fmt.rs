/// Format a float as Brazilian reais with dot thousands separators: R$ 1.234,56
pub fn money(val: f64) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-R$ {with_dots},{dec_part}")
    } else {
        format!("R$ {with_dots},{dec_part}")
    }
}

/// Percentage with one decimal and a comma: 12,5%
pub fn percent(val: f64) -> String {
    format!("{:.1}%", val).replace('.', ",")
}

/// Render a stored `YYYY-MM-DD HH:MM:SS[.fff]` timestamp as `DD/MM/YYYY HH:MM`.
/// Anything else is returned unchanged.
pub fn timestamp(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "R$ 1.234,56");
        assert_eq!(money(-500.00), "-R$ 500,00");
        assert_eq!(money(0.0), "R$ 0,00");
        assert_eq!(money(1000000.99), "R$ 1.000.000,99");
        assert_eq!(money(42.10), "R$ 42,10");
        assert_eq!(money(-0.001), "R$ 0,00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(50.0), "50,0%");
        assert_eq!(percent(12.345), "12,3%");
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp("2024-03-05 14:07:09.123"), "05/03/2024 14:07");
        assert_eq!(timestamp("2024-03-05 14:07:09"), "05/03/2024 14:07");
        assert_eq!(timestamp("ontem"), "ontem");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
