use {
    crate::{config::BINANCE_QUOTE_ASSETS, utils::TimeUtils},
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    /// Build from a symbol and an exchange interval shorthand such as `1h`.
    pub fn from_shorthand(name: &str, interval: &str) -> Option<Self> {
        let interval_ms = TimeUtils::interval_from_string(interval)?;
        Some(Self {
            name: name.trim().to_ascii_uppercase(),
            interval_ms,
        })
    }

    pub fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        text.strip_suffix(quote)
    }

    pub fn get_quote(text: &str) -> Option<&str> {
        BINANCE_QUOTE_ASSETS
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub(crate) fn bn_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval_str(&self) -> &'static str {
        TimeUtils::interval_to_string(self.interval_ms)
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let base = Self::get_base(&self.name).unwrap_or("UNKNOWN_BASE");
        let quote = Self::get_quote(&self.name).unwrap_or("UNKNOWN_QUOTE");
        write!(
            f,
            "{} ({}/{}) {}",
            self.name,
            base,
            quote,
            self.interval_str()
        )
    }
}
