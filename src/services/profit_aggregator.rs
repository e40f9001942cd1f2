//! Cost and profit aggregation for a single trip.
//!
//! Absent charges count as zero. No rounding happens here; values are only
//! normalized (trailing zeros dropped).

use rust_decimal::Decimal;

use crate::models::maintenance::MaintenanceItem;
use crate::models::report::{RoadTolls, TripProfit};
use crate::models::trip::TripCharges;
use crate::services::maintenance_ledger::total_cost;

pub fn compute_profit(
    charges: &TripCharges,
    maintenance: &[MaintenanceItem],
    road_tolls: RoadTolls,
) -> TripProfit {
    let rate = charges.rate.unwrap_or_default();
    let fuel = charges.fuel.unwrap_or_default();
    let mileage = charges.mileage.unwrap_or_default();
    let salary = charges.salary.unwrap_or_default();
    let maintenance_cost = total_cost(maintenance);

    let tolls = match road_tolls {
        RoadTolls::Include => Some(charges.road_tolls.unwrap_or_default()),
        RoadTolls::Exclude => None,
    };

    let total_costs = fuel + mileage + salary + maintenance_cost + tolls.unwrap_or_default();
    let profit = rate - total_costs;
    let profit_margin = if rate > Decimal::ZERO {
        profit / rate * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    TripProfit {
        rate: rate.normalize(),
        fuel: fuel.normalize(),
        mileage: mileage.normalize(),
        salary: salary.normalize(),
        road_tolls: tolls.map(|t| t.normalize()),
        maintenance_cost: maintenance_cost.normalize(),
        total_costs: total_costs.normalize(),
        profit: profit.normalize(),
        profit_margin: profit_margin.normalize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn item(cost: i64) -> MaintenanceItem {
        MaintenanceItem {
            id: Uuid::new_v4(),
            truck_id: Uuid::new_v4(),
            trip_id: None,
            description: "part".into(),
            cost: Decimal::from(cost),
            maintenance_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn charges(rate: i64, fuel: i64, mileage: i64, salary: i64, tolls: Option<i64>) -> TripCharges {
        TripCharges {
            rate: Some(Decimal::from(rate)),
            fuel: Some(Decimal::from(fuel)),
            mileage: Some(Decimal::from(mileage)),
            salary: Some(Decimal::from(salary)),
            road_tolls: tolls.map(Decimal::from),
        }
    }

    #[test]
    fn worked_example() {
        let profit = compute_profit(
            &charges(1000, 200, 50, 300, None),
            &[item(50), item(25)],
            RoadTolls::Include,
        );
        assert_eq!(profit.maintenance_cost, Decimal::from(75));
        assert_eq!(profit.total_costs, Decimal::from(625));
        assert_eq!(profit.profit, Decimal::from(375));
        assert_eq!(profit.profit_margin, Decimal::new(375, 1));
        assert_eq!(profit.profit_margin.to_string(), "37.5");
    }

    #[rstest]
    #[case(RoadTolls::Include, 725, 275)]
    #[case(RoadTolls::Exclude, 625, 375)]
    fn road_tolls_follow_the_flag(
        #[case] flag: RoadTolls,
        #[case] total_costs: i64,
        #[case] profit: i64,
    ) {
        let result = compute_profit(&charges(1000, 200, 50, 300, Some(100)), &[item(75)], flag);
        assert_eq!(result.total_costs, Decimal::from(total_costs));
        assert_eq!(result.profit, Decimal::from(profit));
        assert_eq!(result.road_tolls.is_some(), flag == RoadTolls::Include);
    }

    #[test]
    fn item_order_does_not_matter() {
        let items = [item(10), item(32), item(7), item(100)];
        let mut reversed = items.clone();
        reversed.reverse();
        let c = charges(900, 120, 30, 250, Some(15));
        assert_eq!(
            compute_profit(&c, &items, RoadTolls::Include),
            compute_profit(&c, &reversed, RoadTolls::Include)
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-50)]
    fn no_margin_without_positive_rate(#[case] rate: i64) {
        let result = compute_profit(&charges(rate, 10, 0, 0, None), &[], RoadTolls::Exclude);
        assert_eq!(result.profit_margin, Decimal::ZERO);
    }

    #[test]
    fn missing_charges_count_as_zero() {
        let result = compute_profit(&TripCharges::default(), &[item(40)], RoadTolls::Include);
        assert_eq!(result.rate, Decimal::ZERO);
        assert_eq!(result.road_tolls, Some(Decimal::ZERO));
        assert_eq!(result.total_costs, Decimal::from(40));
        assert_eq!(result.profit, Decimal::from(-40));
        assert_eq!(result.profit_margin, Decimal::ZERO);
    }
}
