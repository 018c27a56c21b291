//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::simulators::{MealPlanInputs, MealPlanSimulator, Simulator};
    use crate::test_utils::date;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn new_tx(day: u32, amount: Decimal, category: Category, hash: Option<&str>) -> NewTransaction {
        NewTransaction {
            date: date(2024, 1, day),
            amount,
            category,
            note: String::new(),
            import_hash: hash.map(String::from),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_profile_crud() {
        let db = Database::in_memory().unwrap();

        let id = db
            .create_profile("Alex", dec!(1800.50), RiskTolerance::Low)
            .unwrap();
        let profile = db.get_profile(id).unwrap().unwrap();
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.monthly_income, dec!(1800.50));
        assert_eq!(profile.risk_tolerance, RiskTolerance::Low);
        assert!(profile.goals.is_empty());

        db.update_monthly_income(id, dec!(2100)).unwrap();
        db.update_risk_tolerance(id, RiskTolerance::High).unwrap();
        let profile = db.require_profile(id).unwrap();
        assert_eq!(profile.monthly_income, dec!(2100));
        assert_eq!(profile.risk_tolerance, RiskTolerance::High);

        assert!(db.get_profile(999).unwrap().is_none());
        assert!(matches!(db.require_profile(999), Err(Error::NotFound(_))));
        assert!(matches!(
            db.update_monthly_income(999, dec!(1)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_profile_rejects_negative_income() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.create_profile("Neg", dec!(-1), RiskTolerance::Moderate),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decimal_amounts_roundtrip_exactly() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();

        db.insert_transaction(profile, &new_tx(5, dec!(-0.10), Category::Food, None))
            .unwrap();
        db.insert_transaction(profile, &new_tx(6, dec!(-0.20), Category::Food, None))
            .unwrap();

        let txs = db.list_transactions(profile, None, None).unwrap();
        let total: Decimal = txs.iter().map(|t| t.amount).sum();
        assert_eq!(total, dec!(-0.30));
    }

    #[test]
    fn test_import_hash_dedup() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();

        let batch = vec![
            new_tx(1, dec!(-10), Category::Food, Some("a")),
            new_tx(2, dec!(-20), Category::Food, Some("b")),
        ];
        let first = db.import_transactions(profile, &batch).unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.duplicates, 0);

        let second = db.import_transactions(profile, &batch).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 2);
        assert_eq!(db.count_transactions(profile).unwrap(), 2);

        // Dedup is scoped to the importing profile
        let other = db.create_profile("Q", dec!(0), RiskTolerance::Moderate).unwrap();
        assert_eq!(db.import_transactions(other, &batch).unwrap().inserted, 2);

        // Manual entries have no hash and are never deduplicated
        let manual = new_tx(3, dec!(-5), Category::Other, None);
        assert!(matches!(
            db.insert_transaction(profile, &manual).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
        assert!(matches!(
            db.insert_transaction(profile, &manual).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
    }

    #[test]
    fn test_list_transactions_by_date_range() {
        let db = Database::in_memory().unwrap();
        let a = db.create_profile("A", dec!(0), RiskTolerance::Moderate).unwrap();
        let b = db.create_profile("B", dec!(0), RiskTolerance::Moderate).unwrap();

        for day in [20, 5, 12] {
            db.insert_transaction(a, &new_tx(day, dec!(-1), Category::Food, None))
                .unwrap();
        }
        db.insert_transaction(b, &new_tx(6, dec!(-1), Category::Food, None))
            .unwrap();

        let all = db.list_transactions(a, None, None).unwrap();
        let days: Vec<String> = all.iter().map(|t| t.date.to_string()).collect();
        assert_eq!(days, vec!["2024-01-05", "2024-01-12", "2024-01-20"]);

        let window = db
            .list_transactions(a, Some(date(2024, 1, 6)), Some(date(2024, 1, 20)))
            .unwrap();
        assert_eq!(window.len(), 2);

        let until = db.list_transactions(a, None, Some(date(2024, 1, 12))).unwrap();
        assert_eq!(until.len(), 2);
    }

    #[test]
    fn test_goal_contributions() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();
        let goal_id = db
            .create_goal(profile, "Laptop", dec!(1200), date(2024, 8, 1))
            .unwrap();

        let goal = db.record_contribution(goal_id, dec!(300)).unwrap();
        assert_eq!(goal.current_amount, dec!(300));
        let goal = db.record_contribution(goal_id, dec!(150.25)).unwrap();
        assert_eq!(goal.current_amount, dec!(450.25));

        let stored = db.get_goal(goal_id).unwrap().unwrap();
        assert_eq!(stored.current_amount, dec!(450.25));
        assert_eq!(db.list_contributions(goal_id).unwrap().len(), 2);

        let profile = db.require_profile(profile).unwrap();
        assert_eq!(profile.goals.len(), 1);
        assert_eq!(profile.goals[0].description, "Laptop");
    }

    #[test]
    fn test_invalid_contribution_writes_nothing() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();
        let goal_id = db
            .create_goal(profile, "Trip", dec!(500), date(2024, 6, 1))
            .unwrap();

        assert!(matches!(
            db.record_contribution(goal_id, dec!(0)),
            Err(Error::InvalidInput(_))
        ));
        assert!(db.list_contributions(goal_id).unwrap().is_empty());
        assert!(matches!(
            db.record_contribution(999, dec!(10)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_goal_removes_contributions() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();
        let keep = db
            .create_goal(profile, "Books", dec!(200), date(2024, 9, 1))
            .unwrap();
        let drop = db
            .create_goal(profile, "Concert", dec!(150), date(2024, 7, 1))
            .unwrap();
        db.record_contribution(keep, dec!(50)).unwrap();
        db.record_contribution(drop, dec!(40)).unwrap();
        db.record_contribution(drop, dec!(10)).unwrap();

        db.delete_goal(drop).unwrap();

        assert!(db.get_goal(drop).unwrap().is_none());
        assert!(db.list_contributions(drop).unwrap().is_empty());
        let remaining = db.list_goals(profile).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep);
        assert_eq!(remaining[0].current_amount, dec!(50));

        assert!(matches!(db.delete_goal(drop), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();
        let goal_id = db
            .create_goal(profile, "Bike", dec!(300), date(2024, 5, 1))
            .unwrap();
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO goal_contributions (goal_id, amount, contributed_at) VALUES (?, '25', 'yesterday')",
                rusqlite::params![goal_id],
            )
            .unwrap();

        assert!(matches!(
            db.list_contributions(goal_id),
            Err(Error::Database(rusqlite::Error::FromSqlConversionFailure(3, _, _)))
        ));
    }

    #[test]
    fn test_simulations_are_append_only() {
        let db = Database::in_memory().unwrap();
        let profile = db.create_profile("P", dec!(0), RiskTolerance::Moderate).unwrap();

        let inputs = MealPlanInputs {
            plan_cost: dec!(2000),
            plan_meals: 200,
            grocery_monthly: dec!(350),
            grocery_meals: 30,
        };
        let result = MealPlanSimulator.run(&inputs).unwrap();

        let first = db.save_simulation(profile, &result).unwrap();
        let second = db.save_simulation(profile, &result).unwrap();
        assert_ne!(first, second);

        let stored = db.get_simulation(first).unwrap().unwrap();
        assert_eq!(stored.result, result);
        assert_eq!(stored.profile_id, profile);

        let listed = db.list_simulations(profile).unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first
        assert_eq!(listed[0].id, second);

        assert!(db.get_simulation(999).unwrap().is_none());
    }
}
