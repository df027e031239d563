/// Format minor units with thousands separators: 123456 -> 1,234.56
pub fn amount(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.unsigned_abs();
    let int_part = (abs / 100).to_string();
    let dec_part = abs % 100;

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part:02}")
    } else {
        format!("{with_commas}.{dec_part:02}")
    }
}

/// Format minor units the way the importer parses them back: -1234.50
pub fn plain_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Format minutes east of UTC as `+08:00`.
pub fn utc_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(123456), "1,234.56");
        assert_eq!(amount(-50000), "-500.00");
        assert_eq!(amount(0), "0.00");
        assert_eq!(amount(100000099), "1,000,000.99");
        assert_eq!(amount(4210), "42.10");
        assert_eq!(amount(-5), "-0.05");
    }

    #[test]
    fn test_plain_amount() {
        assert_eq!(plain_amount(123456), "1234.56");
        assert_eq!(plain_amount(-5), "-0.05");
        assert_eq!(plain_amount(700), "7.00");
    }

    #[test]
    fn test_utc_offset() {
        assert_eq!(utc_offset(480), "+08:00");
        assert_eq!(utc_offset(-330), "-05:30");
        assert_eq!(utc_offset(0), "+00:00");
    }
}
