use crate::data::{CoinSnapshot, MergedRecord, PricePoint};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyOhlc {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Fold the points into one OHLC row per calendar date. The input is
/// taken in upstream order: the first price seen on a date is the open,
/// the last is the close. A date with a single sample collapses to
/// open == high == low == close.
pub fn daily_ohlc(points: &[PricePoint]) -> Vec<DailyOhlc> {
    let mut days: Vec<DailyOhlc> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for point in points {
        let date = point.timestamp.date();
        match index.get(&date) {
            Some(&i) => {
                let day = &mut days[i];
                day.high = day.high.max(point.price);
                day.low = day.low.min(point.price);
                day.close = point.price;
            }
            None => {
                index.insert(date, days.len());
                days.push(DailyOhlc {
                    date,
                    open: point.price,
                    high: point.price,
                    low: point.price,
                    close: point.price,
                });
            }
        }
    }

    days
}

/// Left-join every point against its date's OHLC and attach the coin's
/// snapshot values uniformly to each row.
pub fn enrich(coin_id: &str, points: Vec<PricePoint>, snapshot: &CoinSnapshot) -> Vec<MergedRecord> {
    let by_date: HashMap<NaiveDate, DailyOhlc> = daily_ohlc(&points)
        .into_iter()
        .map(|day| (day.date, day))
        .collect();

    points
        .into_iter()
        .filter_map(|point| {
            let day = *by_date.get(&point.timestamp.date())?;
            Some(MergedRecord {
                id: coin_id.to_string(),
                timestamp: point.timestamp,
                price: point.price,
                market_cap: point.market_cap,
                total_volume: point.total_volume,
                ath: snapshot.ath,
                atl: snapshot.atl,
                open: day.open,
                high: day.high,
                low: day.low,
                close: day.close,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn point(timestamp: &str, price: f64) -> PricePoint {
        PricePoint {
            timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
                .expect("Invalid date"),
            price,
            market_cap: 1_000.0,
            total_volume: 50.0,
        }
    }

    #[test]
    fn single_sample_date_collapses() {
        let days = daily_ohlc(&[point("2024-01-01 12:00:00", 100.0)]);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].open, 100.0);
        assert_eq!(days[0].high, 100.0);
        assert_eq!(days[0].low, 100.0);
        assert_eq!(days[0].close, 100.0);
    }

    #[test]
    fn open_is_first_and_close_is_last_in_input_order() {
        let points = vec![
            point("2024-01-01 12:00:00", 100.0),
            point("2024-01-02 00:00:00", 110.0),
            point("2024-01-02 12:00:00", 105.0),
        ];

        let days = daily_ohlc(&points);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].open, 100.0);
        assert_eq!(days[0].close, 100.0);

        assert_eq!(days[1].open, 110.0);
        assert_eq!(days[1].high, 110.0);
        assert_eq!(days[1].low, 105.0);
        assert_eq!(days[1].close, 105.0);
    }

    #[test]
    fn high_and_low_bound_every_sample_of_the_date() {
        let prices = [104.0, 99.5, 107.25, 101.0, 96.75];
        let points: Vec<PricePoint> = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| point(&format!("2024-03-05 {:02}:00:00", i), price))
            .collect();

        let days = daily_ohlc(&points);
        assert_eq!(days.len(), 1);
        for &price in &prices {
            assert!(days[0].high >= price);
            assert!(days[0].low <= price);
        }
        assert_eq!(days[0].open, 104.0);
        assert_eq!(days[0].close, 96.75);
    }

    #[test]
    fn rows_inherit_their_dates_ohlc_and_the_snapshot() {
        let points = vec![
            point("2024-01-01 12:00:00", 100.0),
            point("2024-01-02 00:00:00", 110.0),
            point("2024-01-02 12:00:00", 105.0),
        ];
        let snapshot = CoinSnapshot {
            ath: Some(120.0),
            atl: Some(10.0),
        };

        let rows = enrich("bitcoin", points, &snapshot);
        assert_eq!(rows.len(), 3);

        for row in &rows {
            assert_eq!(row.id, "bitcoin");
            assert_eq!(row.ath, Some(120.0));
            assert_eq!(row.atl, Some(10.0));
        }

        assert_eq!(rows[0].open, 100.0);
        assert_eq!(rows[0].close, 100.0);

        // Both rows of 2024-01-02 share that date's OHLC.
        for row in &rows[1..] {
            assert_eq!(row.open, 110.0);
            assert_eq!(row.high, 110.0);
            assert_eq!(row.low, 105.0);
            assert_eq!(row.close, 105.0);
        }
    }

    #[test]
    fn enrich_keeps_missing_snapshot_values_absent() {
        let rows = enrich(
            "bitcoin",
            vec![point("2024-01-01 12:00:00", 100.0)],
            &CoinSnapshot::default(),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ath, None);
        assert_eq!(rows[0].atl, None);
    }

    #[test]
    fn no_points_produce_no_rows() {
        assert!(daily_ohlc(&[]).is_empty());
        assert!(enrich("bitcoin", vec![], &CoinSnapshot::default()).is_empty());
    }
}
