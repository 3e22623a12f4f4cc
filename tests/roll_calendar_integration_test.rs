//! Integration tests for roll calendar construction
//!
//! Builds calendars end to end from in-memory contract prices and checks
//! them with the validator, the CSV round trip and property tests.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rusty_rollcal::prelude::*;
use rusty_rollcal::roll_calendar::{adjust_to_price_series, generate_approximate_calendar};

fn cd(s: &str) -> ContractDate {
    s.parse().unwrap()
}

fn date(year: i32, month: u32, day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Daily prices from `start` to `end` inclusive
fn daily_prices(start: Timestamp, end: Timestamp, level: f64) -> PriceSeries {
    let days = (end - start).num_days();
    PriceSeries::from_points((0..=days).map(|i| (start + Duration::days(i), level + i as f64 * 0.01)))
}

/// March/June/September 2020 contracts overlapping in mid February to late March
fn three_contract_prices() -> ContractPriceMap {
    let mut prices = ContractPriceMap::new();
    prices.insert(cd("20200300"), daily_prices(date(2020, 1, 1), date(2020, 3, 20), 100.0));
    prices.insert(cd("20200600"), daily_prices(date(2020, 2, 15), date(2020, 6, 20), 101.0));
    prices.insert(cd("20200900"), daily_prices(date(2020, 2, 1), date(2020, 9, 20), 102.0));
    prices
}

/// Hold March and June; carry two priced contracts ahead; ideal roll on 18th March
fn three_contract_parameters() -> RollParameters {
    RollParameters::new("HM", "HMUZ", -3, 2, 20).unwrap()
}

#[test]
fn test_three_contract_scenario() {
    let prices = three_contract_prices();
    let params = three_contract_parameters();

    let approx = generate_approximate_calendar(&params, &prices).unwrap();
    assert_eq!(approx.len(), 1);
    assert_eq!(approx[0].current_contract, cd("20200300"));
    assert_eq!(approx[0].next_contract, cd("20200600"));
    assert_eq!(approx[0].carry_contract, cd("20200900"));
    assert_eq!(approx[0].roll_date, date(2020, 3, 18));

    let adjusted = RollCalendar::create_from_prices(&prices, &params).unwrap();
    assert!(adjusted.is_complete());

    let calendar = adjusted.into_calendar();
    assert_eq!(calendar.len(), 1);
    assert_eq!(calendar.first().unwrap().roll_date, date(2020, 3, 18));

    assert!(calendar.validate(&prices).is_ok());
}

#[test]
fn test_gap_on_ideal_date_picks_earlier_neighbour() {
    let mut prices = three_contract_prices();
    let mut june = prices.get(&cd("20200600")).unwrap().clone();
    june.insert(date(2020, 3, 18), f64::NAN);
    prices.insert(cd("20200600"), june);

    let calendar = RollCalendar::create_from_prices(&prices, &three_contract_parameters())
        .unwrap()
        .into_calendar();

    // 17th and 19th are both one day away
    assert_eq!(calendar.first().unwrap().roll_date, date(2020, 3, 17));
    assert!(calendar.validate(&prices).is_ok());
}

#[test]
fn test_no_overlap_stops_early() {
    let mut prices = ContractPriceMap::new();
    prices.insert(cd("20200300"), daily_prices(date(2020, 1, 1), date(2020, 2, 1), 100.0));
    prices.insert(cd("20200600"), daily_prices(date(2020, 3, 1), date(2020, 6, 1), 101.0));
    prices.insert(cd("20200900"), daily_prices(date(2020, 3, 1), date(2020, 9, 1), 102.0));

    let params = RollParameters::new("HMUZ", "HMUZ", -5, 1, 0).unwrap();
    let adjusted = RollCalendar::create_from_prices(&prices, &params).unwrap();

    // March and June never overlap, so nothing can be adjusted
    assert!(adjusted.calendar.is_empty());
    let stop = adjusted.early_stop.expect("adjustment should stop");
    assert_eq!(stop.row_index, 0);
    assert_eq!(stop.current_contract, cd("20200300"));
}

#[test]
fn test_add_carry_drops_first_roll() {
    let prices = three_contract_prices();
    let params = RollParameters::new("HMU", "HMU", -3, -1, 0).unwrap();

    let rolls = vec![
        ContractRoll::new(date(2020, 3, 18), cd("20200300"), cd("20200600")),
        ContractRoll::new(date(2020, 6, 17), cd("20200600"), cd("20200900")),
    ];

    let calendar = rusty_rollcal::roll_calendar::add_carry_calendar(&rolls, &params, &prices).unwrap();

    assert_eq!(calendar.len(), rolls.len() - 1);
    assert_eq!(calendar.first().unwrap().current_contract, cd("20200600"));
    assert_eq!(calendar.first().unwrap().carry_contract, cd("20200300"));
}

#[test]
fn test_prior_carry_on_full_quarterly_history() {
    // every held month is priced, so the first contract's carry is before the data
    let mut prices = ContractPriceMap::new();
    for id in &QUARTERS[..8] {
        let contract = cd(id);
        let expiry = contract.expiry_date(15);
        let start = expiry - Duration::days(HISTORY_DAYS as i64);
        prices.insert(contract, daily_prices(start, expiry, 100.0));
    }

    let params = RollParameters::new("HMUZ", "HMUZ", -10, -1, 15).unwrap();
    let calendar = RollCalendar::create_from_prices(&prices, &params)
        .unwrap()
        .into_calendar();

    assert_eq!(calendar.len(), 6);
    let first = calendar.first().unwrap();
    assert_eq!(first.current_contract, cd("20190600"));
    assert_eq!(first.carry_contract, cd("20190300"));
    assert_eq!(calendar.last().unwrap().next_contract, cd("20201200"));
    assert!(calendar.validate(&prices).is_ok());
}

#[test]
fn test_back_out_detects_each_increase() {
    let ids = ["20200300", "20200300", "20200300", "20200600", "20200600", "20200900"];
    let next_of = |id: &str| match id {
        "20200300" => cd("20200600"),
        "20200600" => cd("20200900"),
        _ => cd("20201200"),
    };

    let rows: Vec<ForwardSeriesRow> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| ForwardSeriesRow {
            dt: date(2020, 3, 1 + i as u32),
            price: 100.0,
            forward: 101.0,
            forward_contract: next_of(id),
            price_contract: cd(id),
            carry_contract: next_of(id),
        })
        .collect();

    let calendar = RollCalendar::back_out_from_current_and_forward_data(&ForwardSeries::new(rows)).unwrap();

    assert_eq!(calendar.len(), 3);

    let first = calendar.get(0).unwrap();
    assert_eq!(first.roll_date, date(2020, 3, 4));
    assert_eq!(first.current_contract, cd("20200300"));
    assert_eq!(first.next_contract, cd("20200600"));
    assert_eq!(first.carry_contract, cd("20200600"));

    let second = calendar.get(1).unwrap();
    assert_eq!(second.roll_date, date(2020, 3, 6));
    assert_eq!(second.current_contract, cd("20200600"));
    assert_eq!(second.next_contract, cd("20200900"));

    let trailing = calendar.get(2).unwrap();
    assert_eq!(trailing.roll_date, date(2020, 3, 6));
    assert_eq!(trailing.current_contract, cd("20200900"));
    assert_eq!(trailing.next_contract, cd("20201200"));

    // the final roll and the trailing row share a date
    let report = calendar.check_if_date_index_monotonic();
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn test_round_trip_through_csv() {
    let calendar = RollCalendar::create_from_prices(&three_contract_prices(), &three_contract_parameters())
        .unwrap()
        .into_calendar();

    let mut buf = Vec::new();
    calendar.write_csv(&mut buf).unwrap();
    let loaded = RollCalendar::read_csv(buf.as_slice()).unwrap();

    assert_eq!(loaded, calendar);
}

const QUARTERS: [&str; 12] = [
    "20190300", "20190600", "20190900", "20191200", "20200300", "20200600", "20200900", "20201200",
    "20210300", "20210600", "20210900", "20211200",
];

const HISTORY_DAYS: usize = 200;

/// Quarterly contracts with 200 days of history each, NaN where `gaps` says so
fn gappy_prices(gaps: &[Vec<bool>]) -> ContractPriceMap {
    QUARTERS
        .iter()
        .zip(gaps)
        .map(|(id, contract_gaps)| {
            let contract = cd(id);
            let expiry = contract.expiry_date(15);
            let start = expiry - Duration::days(HISTORY_DAYS as i64);
            let series = PriceSeries::from_points(contract_gaps.iter().enumerate().map(|(i, gap)| {
                let price = if *gap { f64::NAN } else { 100.0 + i as f64 };
                (start + Duration::days(i as i64), price)
            }));
            (contract, series)
        })
        .collect()
}

fn gap_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    proptest::collection::vec(
        proptest::collection::vec(proptest::bool::weighted(0.3), HISTORY_DAYS),
        QUARTERS.len(),
    )
}

fn check_built_calendar(prices: &ContractPriceMap, params: &RollParameters) -> std::result::Result<(), TestCaseError> {
    let adjusted = match RollCalendar::create_from_prices(prices, params) {
        Ok(adjusted) => adjusted,
        // a whole contract of gaps is astronomically unlikely but not an algorithm bug
        Err(RollCalendarError::NoNextContract { .. }) | Err(RollCalendarError::NoCarryContract { .. }) => {
            return Ok(())
        }
        Err(e) => return Err(TestCaseError::fail(e.to_string())),
    };
    let calendar = adjusted.calendar;

    for pair in calendar.rows().windows(2) {
        prop_assert!(pair[1].roll_date > pair[0].roll_date);
    }

    for row in calendar.rows() {
        prop_assert!(prices.get(&row.current_contract).unwrap().price_at(&row.roll_date).is_some());
        prop_assert!(prices.get(&row.next_contract).unwrap().price_at(&row.roll_date).is_some());
    }

    prop_assert!(calendar.validate(prices).is_ok());

    let mut buf = Vec::new();
    calendar.write_csv(&mut buf).unwrap();
    prop_assert_eq!(RollCalendar::read_csv(buf.as_slice()).unwrap(), calendar);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_next_carry_calendars_are_valid(gaps in gap_strategy()) {
        let prices = gappy_prices(&gaps);
        let params = RollParameters::new("HMUZ", "HMUZ", -10, 1, 15).unwrap();
        check_built_calendar(&prices, &params)?;
    }

    #[test]
    fn prop_prior_carry_calendars_are_valid(gaps in gap_strategy()) {
        let prices = gappy_prices(&gaps);
        let params = RollParameters::new("MZ", "HMUZ", -10, -1, 15).unwrap();

        // prior carry: every row except the last must also have the next row's carry priced
        let approx = match generate_approximate_calendar(&params, &prices) {
            Ok(approx) => approx,
            Err(_) => return Ok(()),
        };
        let adjusted = adjust_to_price_series(&approx, &prices).unwrap();
        for (idx, row) in adjusted.calendar.rows().iter().enumerate() {
            if idx + 1 < approx.len() {
                let carry = &approx[idx + 1].carry_contract;
                prop_assert!(prices.get(carry).unwrap().price_at(&row.roll_date).is_some());
            }
        }

        check_built_calendar(&prices, &params)?;
    }
}
