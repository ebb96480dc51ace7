use chrono::{NaiveDate, Weekday};

use crate::calendar::{weekday_of, weekday_to_index};

/// A participant-owned rule marking days that do not require a check-in.
///
/// `Weekly` applies every week; `Range` is an inclusive calendar-day span
/// (`start == end` is a single exempt day). A participant may hold any number
/// of rules of either kind; overlapping ranges are legal and idempotent in
/// effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptDayRule {
    Weekly(Weekday),
    Range { start: NaiveDate, end: NaiveDate },
}

impl ExemptDayRule {
    pub fn matches(&self, day: NaiveDate) -> bool {
        match *self {
            ExemptDayRule::Weekly(weekday) => weekday_of(day) == weekday,
            ExemptDayRule::Range { start, end } => start <= day && day <= end,
        }
    }
}

/// A day is exempt when any rule matches; rule kinds have no precedence.
pub fn is_exempt(day: NaiveDate, rules: &[ExemptDayRule]) -> bool {
    rules.iter().any(|rule| rule.matches(day))
}

/// First non-exempt day strictly after `after`, or `None` when the weekly
/// rules cover all seven weekdays and no day is ever required.
///
/// The scan never steps through a `Range` rule one day at a time: a matching
/// range is skipped to the day past its largest matching end, so a huge span
/// cannot stall the loop. Weekly matches advance at most six consecutive days
/// before an uncovered weekday is reached.
pub fn next_required_day(after: NaiveDate, rules: &[ExemptDayRule]) -> Option<NaiveDate> {
    let weekly_mask = rules.iter().fold(0u8, |mask, rule| match rule {
        ExemptDayRule::Weekly(weekday) => mask | (1u8 << weekday_to_index(*weekday)),
        ExemptDayRule::Range { .. } => mask,
    });
    if weekly_mask == 0b0111_1111 {
        return None;
    }

    let mut day = after.succ_opt()?;
    loop {
        if weekly_mask & (1u8 << weekday_to_index(weekday_of(day))) != 0 {
            day = day.succ_opt()?;
            continue;
        }
        let skip_past = rules
            .iter()
            .filter_map(|rule| match *rule {
                ExemptDayRule::Range { start, end } if start <= day && day <= end => Some(end),
                _ => None,
            })
            .max();
        match skip_past {
            Some(end) => day = end.succ_opt()?,
            None => return Some(day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_rule_matches_its_weekday_every_week() {
        let rules = [ExemptDayRule::Weekly(Weekday::Sat)];
        assert!(is_exempt(day(2024, 1, 6), &rules)); // Saturday
        assert!(is_exempt(day(2024, 1, 13), &rules)); // next Saturday
        assert!(!is_exempt(day(2024, 1, 8), &rules)); // Monday
    }

    #[test]
    fn range_rule_is_inclusive_on_both_ends() {
        let rules = [ExemptDayRule::Range {
            start: day(2024, 12, 20),
            end: day(2024, 12, 31),
        }];
        assert!(is_exempt(day(2024, 12, 20), &rules));
        assert!(is_exempt(day(2024, 12, 25), &rules));
        assert!(is_exempt(day(2024, 12, 31), &rules));
        assert!(!is_exempt(day(2024, 12, 19), &rules));
        assert!(!is_exempt(day(2025, 1, 1), &rules));
    }

    #[test]
    fn single_day_range_matches_exactly_one_day() {
        let rules = [ExemptDayRule::Range {
            start: day(2024, 7, 4),
            end: day(2024, 7, 4),
        }];
        assert!(is_exempt(day(2024, 7, 4), &rules));
        assert!(!is_exempt(day(2024, 7, 5), &rules));
    }

    #[test]
    fn next_required_day_skips_weekend() {
        let rules = [
            ExemptDayRule::Weekly(Weekday::Sat),
            ExemptDayRule::Weekly(Weekday::Sun),
        ];
        // 2024-01-05 is a Friday; next required day is Monday the 8th.
        assert_eq!(
            next_required_day(day(2024, 1, 5), &rules),
            Some(day(2024, 1, 8))
        );
    }

    #[test]
    fn next_required_day_jumps_past_range_ends() {
        // A multi-century range must not be walked one day at a time.
        let rules = [ExemptDayRule::Range {
            start: day(2024, 1, 1),
            end: day(2800, 1, 1),
        }];
        assert_eq!(
            next_required_day(day(2023, 12, 31), &rules),
            Some(day(2800, 1, 2))
        );
    }

    #[test]
    fn next_required_day_none_when_every_weekday_exempt() {
        let rules: Vec<ExemptDayRule> = (0..7)
            .map(|i| ExemptDayRule::Weekly(crate::calendar::weekday_from_index(i).unwrap()))
            .collect();
        assert_eq!(next_required_day(day(2024, 1, 1), &rules), None);
    }

    #[test]
    fn next_required_day_interleaves_weekly_and_range_rules() {
        let rules = [
            ExemptDayRule::Weekly(Weekday::Sat),
            ExemptDayRule::Weekly(Weekday::Sun),
            // Vacation Mon 2024-01-08 .. Fri 2024-01-12.
            ExemptDayRule::Range {
                start: day(2024, 1, 8),
                end: day(2024, 1, 12),
            },
        ];
        // After Friday the 5th: weekend, then the vacation week, then another
        // weekend; the next required day is Monday the 15th.
        assert_eq!(
            next_required_day(day(2024, 1, 5), &rules),
            Some(day(2024, 1, 15))
        );
    }
}
