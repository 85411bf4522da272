pub mod chest_pairing;
pub mod helpers;
pub mod weathering;

use tessera_engine::rules::{RuleFn, RuleSet};
use tessera_engine::weathering::WeatheringPolicy;

/// The vanilla rule set: chest pairing, plus weathering under `policy`.
pub fn standard(policy: impl WeatheringPolicy + 'static) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.add(chest_pairing::chest_pairing as RuleFn);
    rules.add(weathering::Weathering::new(policy));
    rules
}
