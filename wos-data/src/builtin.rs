//! Catalog data compiled into the binary.

use wos_core::models::Catalog;

use crate::loader::{CatalogLoader, CatalogLoaderError};

pub const BUILTIN_ITEMS_CSV: &str = include_str!("../data/items.csv");
pub const BUILTIN_GOALS_CSV: &str = include_str!("../data/goals.csv");

/// The catalog shipped with the application.
pub fn builtin_catalog() -> Result<Catalog, CatalogLoaderError> {
    let items = CatalogLoader::parse_items(BUILTIN_ITEMS_CSV.as_bytes())?;
    let goals = CatalogLoader::parse_goals(BUILTIN_GOALS_CSV.as_bytes())?;
    CatalogLoader::build(&items, &goals)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use wos_core::models::CalculatorKind;

    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = builtin_catalog().expect("built-in catalog must be valid");

        assert_eq!(
            catalog.kinds().collect::<Vec<_>>(),
            vec![
                CalculatorKind::Armament,
                CalculatorKind::OfficerProject,
                CalculatorKind::KingOfIcefield,
                CalculatorKind::StateOfPower,
            ]
        );
    }

    #[test]
    fn state_of_power_goals() {
        let catalog = builtin_catalog().unwrap();
        let sop = catalog.get(CalculatorKind::StateOfPower).unwrap();

        let goals: Vec<&str> = sop.stages.iter().map(|s| s.default_goal.as_str()).collect();

        assert_eq!(goals, vec!["200000", "270000", "300000", "300000", "250000"]);
    }

    #[test]
    fn king_of_icefield_has_seven_named_stages() {
        let catalog = builtin_catalog().unwrap();
        let koi = catalog.get(CalculatorKind::KingOfIcefield).unwrap();

        assert_eq!(koi.stages.len(), 7);
        assert_eq!(koi.stages[0].name, "City Construction");
        assert_eq!(koi.stages[6].default_goal, "345000");
    }

    #[test]
    fn officer_project_troops_have_levels() {
        let catalog = builtin_catalog().unwrap();
        let stage = catalog
            .get(CalculatorKind::OfficerProject)
            .and_then(|d| d.stage("stage1"))
            .unwrap();
        let troops = stage.item("train-troops-1").unwrap();

        assert_eq!(troops.levels.len(), 7);
        assert_eq!(troops.level_for(dec!(37)).map(|l| l.name.as_str()), Some("Lv 11"));
        assert_eq!(troops.base_multiplier, dec!(30));
    }

    #[test]
    fn armament_speedups_are_speedup_items() {
        let catalog = builtin_catalog().unwrap();
        let stage = catalog
            .get(CalculatorKind::Armament)
            .and_then(|d| d.stage("stage2"))
            .unwrap();

        assert_eq!(stage.items.len(), 8);
        assert_eq!(
            stage.item("speedups-2").and_then(|i| i.help_topic.as_deref()),
            Some("speedups")
        );
    }
}
