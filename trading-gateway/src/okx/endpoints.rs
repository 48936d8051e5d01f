//! OKX API host and v5 endpoint paths.

/// Production REST host.
pub const REST_URL: &str = "https://www.okx.com";

/// Prefix of the authentication headers (`OK-ACCESS-KEY`, ...).
pub const HEADER_PREFIX: &str = "OK-ACCESS-";

/// Most orders `batch-orders` and `cancel-batch-orders` accept per call.
pub const MAX_BATCH_SIZE: usize = 20;

/// Page size of `orders-pending` (the venue maximum).
pub const PENDING_PAGE_LIMIT: usize = 100;

/// Account type ids used by asset transfers.
pub mod account_type {
    /// Funding account
    pub const FUNDING: &str = "6";
    /// Trading (unified) account
    pub const TRADING: &str = "18";
}

/// Withdrawal destination: on-chain.
pub const WITHDRAW_DEST_ON_CHAIN: &str = "4";

/// Trade endpoints.
pub mod trade {
    /// Place, or query one order
    pub const ORDER: &str = "/api/v5/trade/order";

    /// Place up to 20 orders
    pub const BATCH_ORDERS: &str = "/api/v5/trade/batch-orders";

    /// Cancel an order
    pub const CANCEL_ORDER: &str = "/api/v5/trade/cancel-order";

    /// Cancel up to 20 orders
    pub const CANCEL_BATCH_ORDERS: &str = "/api/v5/trade/cancel-batch-orders";

    /// Open orders
    pub const ORDERS_PENDING: &str = "/api/v5/trade/orders-pending";
}

/// Account endpoints.
pub mod account {
    /// Trading account balance
    pub const BALANCE: &str = "/api/v5/account/balance";

    /// Account configuration (position mode)
    pub const CONFIG: &str = "/api/v5/account/config";

    /// Switch between long/short and net mode
    pub const SET_POSITION_MODE: &str = "/api/v5/account/set-position-mode";

    /// Set leverage
    pub const SET_LEVERAGE: &str = "/api/v5/account/set-leverage";

    /// Add or reduce isolated margin
    pub const MARGIN_BALANCE: &str = "/api/v5/account/position/margin-balance";

    /// Open positions
    pub const POSITIONS: &str = "/api/v5/account/positions";

    /// Fee rates
    pub const TRADE_FEE: &str = "/api/v5/account/trade-fee";
}

/// Market data endpoints.
pub mod market {
    /// Order book
    pub const BOOKS: &str = "/api/v5/market/books";

    /// Ticker of one instrument
    pub const TICKER: &str = "/api/v5/market/ticker";

    /// Tickers of one instrument type
    pub const TICKERS: &str = "/api/v5/market/tickers";

    /// Index price
    pub const INDEX_TICKERS: &str = "/api/v5/market/index-tickers";
}

/// Public data endpoints.
pub mod public {
    /// Instrument rules
    pub const INSTRUMENTS: &str = "/api/v5/public/instruments";

    /// Mark price
    pub const MARK_PRICE: &str = "/api/v5/public/mark-price";

    /// Funding rate
    pub const FUNDING_RATE: &str = "/api/v5/public/funding-rate";

    /// Coin amount to contract count conversion
    pub const CONVERT_CONTRACT_COIN: &str = "/api/v5/public/convert-contract-coin";
}

/// Funding account endpoints.
pub mod asset {
    /// Deposit addresses of a currency
    pub const DEPOSIT_ADDRESS: &str = "/api/v5/asset/deposit-address";

    /// Move funds between accounts
    pub const TRANSFER: &str = "/api/v5/asset/transfer";

    /// Currency chains and withdrawal fees
    pub const CURRENCIES: &str = "/api/v5/asset/currencies";

    /// Withdraw
    pub const WITHDRAWAL: &str = "/api/v5/asset/withdrawal";
}

/// `instType` values.
pub mod inst_type {
    pub const SPOT: &str = "SPOT";
    pub const SWAP: &str = "SWAP";
}
