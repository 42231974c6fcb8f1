pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// REST constraints: at most 1000 klines per request.
pub struct RestLimits {
    pub klines_limit: i32,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

/// Quote assets we recognise when splitting a symbol into base/quote for display.
pub const BINANCE_QUOTE_ASSETS: &[&str] = &["USDT", "USDC", "FDUSD", "BTC", "ETH", "BNB", "EUR"];

pub struct BinanceConfig {
    pub limits: RestLimits,
    pub client: ClientDefaults,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits { klines_limit: 1000 },
    client: ClientDefaults {
        timeout_ms: 5000,
        // A failed fetch is reported; the user re-runs.
        retries: 0,
        backoff_ms: 1000,
    },
};
