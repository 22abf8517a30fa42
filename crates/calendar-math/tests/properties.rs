//! Property tests for calendar arithmetic and differences.

use calendar_math::{
    diff_days, diff_months, diff_seconds, diff_years, Duration, Instant, Range, Zone,
};
use chrono::{Months, NaiveDateTime};
use proptest::prelude::*;

/// Fixed-offset zones from -12:00 to +14:00 in quarter hours.
fn fixed_zone() -> impl Strategy<Value = Zone> {
    (-48i32..=56).prop_map(|quarters| Zone::from_offset_seconds(quarters * 900).unwrap())
}

fn named_zone() -> impl Strategy<Value = Zone> {
    prop::sample::select(vec![
        "UTC",
        "Europe/Amsterdam",
        "America/New_York",
        "Asia/Tokyo",
        "Australia/Lord_Howe",
        "Asia/Kolkata",
    ])
    .prop_map(|name| Zone::parse(name).unwrap())
}

fn any_zone() -> impl Strategy<Value = Zone> {
    prop_oneof![fixed_zone(), named_zone()]
}

/// Instants between 1970 and 2069 in `zone`, any day of the month.
fn instant_in(zone: impl Strategy<Value = Zone>) -> impl Strategy<Value = Instant> {
    (1970i32..2070, 1u32..=12, 1u32..=31, 0u32..24, 0u32..60, 0u32..60, zone).prop_filter_map(
        "invalid calendar date",
        |(y, mo, d, h, mi, s, zone)| Instant::from_ymd_hms(y, mo, d, h, mi, s, zone).ok(),
    )
}

/// Instants whose day of month survives any month or year step unclamped.
fn unclamped_instant() -> impl Strategy<Value = Instant> {
    (
        1970i32..2070,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        prop_oneof![Just(Zone::UTC), fixed_zone()],
    )
        .prop_map(|(y, mo, d, h, mi, s, zone)| {
            Instant::from_ymd_hms(y, mo, d, h, mi, s, zone).unwrap()
        })
}

/// Count whole months by stepping one month at a time on UTC wall time.
fn reference_months(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    let (low, high, sign) = if a <= b { (a, b, 1) } else { (b, a, -1) };
    let mut months = 0u32;
    while low
        .checked_add_months(Months::new(months + 1))
        .is_some_and(|next| next <= high)
    {
        months += 1;
    }
    sign * i64::from(months)
}

proptest! {
    #[test]
    fn prop_diff_years_antisymmetric(a in instant_in(any_zone()), b in instant_in(any_zone())) {
        prop_assert_eq!(diff_years(&a, &b).unwrap(), -diff_years(&b, &a).unwrap());
    }

    #[test]
    fn prop_diff_months_antisymmetric(a in instant_in(any_zone()), b in instant_in(any_zone())) {
        prop_assert_eq!(diff_months(&a, &b).unwrap(), -diff_months(&b, &a).unwrap());
    }

    #[test]
    fn prop_fixed_diffs_antisymmetric_up_to_floor(
        a in instant_in(any_zone()),
        b in instant_in(any_zone()),
    ) {
        // whole-second instants, so floor never rounds
        prop_assert_eq!(diff_seconds(&a, &b), -diff_seconds(&b, &a));
        let days = diff_days(&a, &b) + diff_days(&b, &a);
        prop_assert!(days == 0 || days == -1);
    }

    #[test]
    fn prop_diff_with_self_is_zero(a in instant_in(any_zone())) {
        prop_assert_eq!(diff_years(&a, &a).unwrap(), 0);
        prop_assert_eq!(diff_months(&a, &a).unwrap(), 0);
        prop_assert_eq!(diff_seconds(&a, &a), 0);
    }

    #[test]
    fn prop_diff_months_matches_month_stepping(
        a in instant_in(Just(Zone::UTC)),
        b in instant_in(Just(Zone::UTC)),
    ) {
        let expected = reference_months(a.utc().naive_utc(), b.utc().naive_utc());
        prop_assert_eq!(diff_months(&a, &b).unwrap(), expected);
    }

    #[test]
    fn prop_diff_years_is_whole_months_over_twelve(
        a in instant_in(prop_oneof![Just(Zone::UTC), fixed_zone()]),
        b in instant_in(prop_oneof![Just(Zone::UTC), fixed_zone()]),
    ) {
        prop_assert_eq!(diff_years(&a, &b).unwrap(), diff_months(&a, &b).unwrap() / 12);
    }

    #[test]
    fn prop_add_sub_years_round_trip(a in unclamped_instant(), n in -50i64..50) {
        prop_assert_eq!(a.add_years(n).unwrap().sub_years(n).unwrap(), a);
    }

    #[test]
    fn prop_add_sub_months_round_trip(a in unclamped_instant(), n in -600i64..600) {
        prop_assert_eq!(a.add_months(n).unwrap().sub_months(n).unwrap(), a);
    }

    #[test]
    fn prop_added_months_are_whole_months(a in unclamped_instant(), n in 0i64..600) {
        let later = a.add_months(n).unwrap();
        prop_assert_eq!(diff_months(&a, &later).unwrap(), n);
        prop_assert_eq!(diff_months(&later, &a).unwrap(), -n);
    }

    #[test]
    fn prop_added_seconds_diff_back(a in instant_in(any_zone()), n in -100_000_000i64..100_000_000) {
        let moved = a.add_seconds(n).unwrap();
        prop_assert_eq!(diff_seconds(&a, &moved), n);
    }

    #[test]
    fn prop_numeric_duration_total(n in 0u32..1_000_000_000) {
        let duration = Duration::parse(&n.to_string(), None).unwrap();
        prop_assert_eq!(duration.total_seconds(None).unwrap(), i64::from(n));
    }

    #[test]
    fn prop_phrase_matches_component_add(a in instant_in(any_zone()), n in 0i64..1_000) {
        let phrase = Duration::parse(&format!("+{n} days"), None).unwrap();
        prop_assert_eq!(a.add_duration(&phrase).unwrap(), a.add_days(n).unwrap());
    }

    #[test]
    fn prop_daily_sequence_length(a in instant_in(Just(Zone::UTC)), n in 0i64..200) {
        let range = Range::new(a, a.add_days(n).unwrap());
        let sequence = range.sequence_of("+1 day", None).unwrap();
        prop_assert_eq!(sequence.len() as i64, n + 1);
    }
}
