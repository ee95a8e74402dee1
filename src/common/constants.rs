/// Exchange endpoints
pub const BINANCE_API_BASE_URL: &str = "https://api.binance.com";
pub const BINANCE_MAX_KLINES_LIMIT: u32 = 1000;

// HTTP client
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 50; // 20 requests per second max

// Discord
pub const DISCORD_API_BASE_URL: &str = "https://discord.com";
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";
pub const DISCORD_CHANNEL_ID_ENV: &str = "DISCORD_CHANNEL_ID";

// Scanner defaults
pub const DEFAULT_SCAN_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_LOOKBACK_CANDLES: u32 = 100;
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";
pub const FALLBACK_SYMBOLS: [&str; 2] = ["BTCUSDT", "ETHUSDT"];

// Interval mappings
pub const INTERVAL_4H: &str = "4h";
pub const INTERVAL_1D: &str = "1d";

// Metrics
pub const DEFAULT_METRICS_PORT: u16 = 9184;
