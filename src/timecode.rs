//! Модуль для работы с текстовыми временными метками
//!
//! Этот модуль содержит функции преобразования между текстовыми таймкодами
//! (`H:MM:SS.s`, `MM:SS.s`, `SS.s`) и секундами с плавающей точкой.

/// Разбор текстового таймкода в секунды
///
/// Части разделяются двоеточием и суммируются справа налево: секунды,
/// минуты, часы. Любая ошибка разбора дает `0.0` — некорректная метка
/// из восходящего потока не должна прерывать пакетную обработку.
pub fn parse(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return 0.0;
    }

    let mut seconds = 0.0;
    let mut multiplier = 1.0;
    for part in parts.iter().rev() {
        match part.trim().parse::<f64>() {
            Ok(value) if value >= 0.0 => seconds += value * multiplier,
            _ => return 0.0,
        }
        multiplier *= 60.0;
    }

    seconds
}

/// Форматирование секунд в канонический таймкод
///
/// До одного часа используется форма `M:SS.s`, от часа и выше `H:MM:SS.s`.
pub fn format(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_minutes = (seconds / 60.0).floor() as u64;
    let secs = seconds - (total_minutes * 60) as f64;

    if total_minutes >= 60 {
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;
        format!("{}:{:02}:{:04.1}", hours, minutes, secs)
    } else {
        format!("{}:{:04.1}", total_minutes, secs)
    }
}

/// Форматирование длительности в форму `M:SS.s`
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = seconds - (minutes * 60) as f64;
    format!("{}:{:04.1}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse("12.5"), 12.5);
        assert_eq!(parse("0"), 0.0);
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse("1:02.0"), 62.0);
        assert_eq!(parse("0:01.2"), 1.2);
        assert_eq!(parse("1:00:01.5"), 3601.5);
    }

    #[test]
    fn test_parse_is_fail_soft() {
        // Некорректные метки не должны прерывать обработку
        assert_eq!(parse(""), 0.0);
        assert_eq!(parse("abc"), 0.0);
        assert_eq!(parse("1:2:3:4"), 0.0);
        assert_eq!(parse("-5.0"), 0.0);
    }

    #[test]
    fn test_format_below_one_hour() {
        assert_eq!(format(0.0), "0:00.0");
        assert_eq!(format(2.1), "0:02.1");
        assert_eq!(format(62.0), "1:02.0");
        assert_eq!(format(754.3), "12:34.3");
    }

    #[test]
    fn test_format_with_hours() {
        assert_eq!(format(3601.5), "1:00:01.5");
    }

    #[test]
    fn test_round_trip_stability() {
        // parse(format(parse(t))) == parse(t) с точностью форматирования
        for t in ["0:01.2", "1:02.0", "0:29.9", "1:00:01.5", "15.0"] {
            let once = parse(t);
            let twice = parse(&format(once));
            assert!(
                (once - twice).abs() < 0.05,
                "round trip drifted for {}: {} vs {}",
                t,
                once,
                twice
            );
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(4.5), "0:04.5");
        assert_eq!(format_duration(65.0), "1:05.0");
    }
}
