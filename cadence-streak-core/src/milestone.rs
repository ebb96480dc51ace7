use rand::Rng;

/// Streak-day thresholds that trigger a celebration, ascending.
pub const FIXED_MILESTONES: [i64; 12] = [7, 14, 30, 60, 90, 100, 180, 250, 365, 500, 730, 1000];

/// Past the highest fixed milestone, every exact multiple of this many days
/// also counts.
pub const EXTENDED_INTERVAL: i64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub days: i64,
}

/// Exact-equality threshold lookup; fires only on the check-in that makes the
/// count exactly a milestone value. Deterministic, so tests can pin it.
pub fn detect(streak_count: i64) -> Option<Milestone> {
    if FIXED_MILESTONES.contains(&streak_count) {
        return Some(Milestone { days: streak_count });
    }
    let highest = FIXED_MILESTONES[FIXED_MILESTONES.len() - 1];
    if streak_count > highest && streak_count % EXTENDED_INTERVAL == 0 {
        return Some(Milestone { days: streak_count });
    }
    None
}

const FLAVOR_LINES: [&str; 6] = [
    "Keep it rolling!",
    "Unstoppable!",
    "What a run!",
    "Consistency pays off!",
    "The calendar fears you!",
    "Onward and upward!",
];

impl Milestone {
    /// Human-readable span: whole years, then whole months, then whole weeks,
    /// falling back to a plain day count.
    pub fn span_label(&self) -> String {
        let days = self.days;
        if days % 365 == 0 {
            let years = days / 365;
            return format!("{years} year{}", plural(years));
        }
        if days >= 30 && days % 30 == 0 {
            let months = days / 30;
            return format!("{months} month{}", plural(months));
        }
        if days % 7 == 0 {
            let weeks = days / 7;
            return format!("{weeks} week{}", plural(weeks));
        }
        format!("{days} day{}", plural(days))
    }

    /// Celebration text with a randomized flavor line. The threshold itself is
    /// decided by [`detect`]; only the wording varies with `rng`.
    pub fn announcement<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let flavor = FLAVOR_LINES[rng.random_range(0..FLAVOR_LINES.len())];
        format!("just hit a {} streak! {flavor}", self.span_label())
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn detection_is_exact_equality() {
        assert!(detect(99).is_none());
        assert_eq!(detect(100), Some(Milestone { days: 100 }));
        assert!(detect(101).is_none());
    }

    #[test]
    fn every_fixed_threshold_fires() {
        for days in FIXED_MILESTONES {
            assert_eq!(detect(days), Some(Milestone { days }));
        }
    }

    #[test]
    fn beyond_the_highest_only_interval_multiples_fire() {
        assert!(detect(1100).is_none());
        assert_eq!(detect(1250), Some(Milestone { days: 1250 }));
        assert_eq!(detect(1500), Some(Milestone { days: 1500 }));
        assert!(detect(1249).is_none());
    }

    #[test]
    fn span_labels_prefer_the_largest_whole_unit() {
        assert_eq!(Milestone { days: 7 }.span_label(), "1 week");
        assert_eq!(Milestone { days: 14 }.span_label(), "2 weeks");
        assert_eq!(Milestone { days: 30 }.span_label(), "1 month");
        assert_eq!(Milestone { days: 90 }.span_label(), "3 months");
        assert_eq!(Milestone { days: 100 }.span_label(), "100 days");
        assert_eq!(Milestone { days: 365 }.span_label(), "1 year");
        assert_eq!(Milestone { days: 730 }.span_label(), "2 years");
    }

    #[test]
    fn announcement_is_deterministic_given_a_seeded_rng() {
        let milestone = Milestone { days: 7 };
        let first = milestone.announcement(&mut StdRng::seed_from_u64(11));
        let second = milestone.announcement(&mut StdRng::seed_from_u64(11));
        assert_eq!(first, second);
        assert!(first.contains("1 week"));
    }
}
