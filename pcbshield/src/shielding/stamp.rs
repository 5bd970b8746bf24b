//! `$date$` stamps
//!
//! A text drawing reading `$date$`, optionally followed by a previously
//! stamped `YYYY-MM-DD`, is rewritten to `$date$ <today>` whenever the
//! shielding is regenerated.

use chrono::NaiveDate;

use crate::board::Board;

pub const DATE_MARKER: &str = "$date$";

/// True for `$date$` and `$date$ dddd-dd-dd`.
pub fn is_date_stamp(text: &str) -> bool {
    match text.strip_prefix(DATE_MARKER) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(' ')
            .map_or(false, looks_like_iso_date),
        None => false,
    }
}

fn looks_like_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn date_stamp(today: NaiveDate) -> String {
    format!("{} {}", DATE_MARKER, today.format("%Y-%m-%d"))
}

/// Rewrite every date stamp on the board. Returns how many texts changed.
pub fn refresh_date_stamps<B: Board + ?Sized>(board: &mut B, today: NaiveDate) -> usize {
    let stamp = date_stamp(today);
    let mut changed = 0;
    for drawing in board.drawings() {
        let Some(text) = drawing.text() else {
            continue;
        };
        if is_date_stamp(text) && text != stamp && board.set_text(drawing.id, stamp.clone()) {
            tracing::debug!("Updated date stamp {} on layer {}", drawing.id, drawing.layer);
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MemoryBoard;
    use crate::geometry::Point;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_is_date_stamp() {
        assert!(is_date_stamp("$date$"));
        assert!(is_date_stamp("$date$ 2019-12-31"));
        assert!(!is_date_stamp("$date$ yesterday"));
        assert!(!is_date_stamp("rev $date$"));
        assert!(!is_date_stamp("$date$ 2019-12-31 rev B"));
    }

    #[test]
    fn test_refresh_rewrites_only_stamps() {
        let mut board = MemoryBoard::new();
        board.add_text(Point::default(), "$date$".to_string(), 37);
        board.add_text(Point::default(), "$date$ 2001-01-01".to_string(), 49);
        board.add_text(Point::default(), "Rev A".to_string(), 37);

        assert_eq!(refresh_date_stamps(&mut board, today()), 2);
        let texts: Vec<_> = board
            .drawings()
            .iter()
            .filter_map(|d| d.text().map(str::to_string))
            .collect();
        assert_eq!(texts, vec!["$date$ 2024-03-09", "$date$ 2024-03-09", "Rev A"]);

        // Already current
        assert_eq!(refresh_date_stamps(&mut board, today()), 0);
    }
}
