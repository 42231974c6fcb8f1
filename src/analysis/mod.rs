mod strategy_rules;

pub use strategy_rules::{
    BollingerReversionRule, BreakoutRule, MaCrossoverRule, RsiReversionRule, SignalRule, rule_for,
};
