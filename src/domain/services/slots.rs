use chrono::{NaiveDate, NaiveTime, Timelike};
use crate::domain::models::schedule::{Blockout, TimeSlot};

/// Generate the slot template for one day: back-to-back slots of
/// `duration_min` from `open_time` to `close_time`, skipping any slot that
/// overlaps a blockout. Times are zero-padded "HH:MM" strings throughout.
pub fn build_day_slots(
    date: NaiveDate,
    open_time: &str,
    close_time: &str,
    duration_min: u32,
    capacity: i32,
    blockouts: &[Blockout],
) -> Vec<TimeSlot> {
    let (open, close) = match (
        NaiveTime::parse_from_str(open_time, "%H:%M"),
        NaiveTime::parse_from_str(close_time, "%H:%M"),
    ) {
        (Ok(open), Ok(close)) => (open, close),
        _ => return Vec::new(),
    };

    if duration_min == 0 || capacity < 1 || open >= close {
        return Vec::new();
    }

    let open_idx = open.hour() * 60 + open.minute();
    let close_idx = close.hour() * 60 + close.minute();

    let mut slots = Vec::new();
    let mut cursor = open_idx;

    while cursor + duration_min <= close_idx {
        let end_idx = cursor + duration_min;
        let start_s = format!("{:02}:{:02}", cursor / 60, cursor % 60);
        let end_s = format!("{:02}:{:02}", end_idx / 60, end_idx % 60);

        if !blockouts.iter().any(|b| b.overlaps(&start_s, &end_s)) {
            slots.push(TimeSlot {
                day_date: date,
                start_time: start_s,
                end_time: end_s,
                max_bookings: capacity,
                current_bookings: 0,
                booking_id: None,
            });
        }

        cursor += duration_min;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_full_day_template() {
        let slots = build_day_slots(date(), "09:00", "17:00", 120, 1, &[]);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start_time, "09:00");
        assert_eq!(slots[0].end_time, "11:00");
        assert_eq!(slots[3].start_time, "15:00");
        assert!(slots.iter().all(|s| s.is_available()));
    }

    #[test]
    fn test_blockout_removes_overlapping_slots() {
        let block = Blockout::new(date(), "10:00".into(), "12:00".into(), Some("supply run".into()));
        let slots = build_day_slots(date(), "09:00", "17:00", 120, 1, &[block]);
        // 09:00-11:00 and 11:00-13:00 both overlap 10:00-12:00
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start_time, "13:00");
    }

    #[test]
    fn test_partial_trailing_slot_dropped() {
        let slots = build_day_slots(date(), "09:00", "12:00", 120, 1, &[]);
        // 11:00-13:00 would run past close
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(build_day_slots(date(), "17:00", "09:00", 60, 1, &[]).is_empty());
        assert!(build_day_slots(date(), "09:00", "17:00", 0, 1, &[]).is_empty());
        assert!(build_day_slots(date(), "9am", "5pm", 60, 1, &[]).is_empty());
    }
}
