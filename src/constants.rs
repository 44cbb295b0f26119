use alloy::primitives::{Address, address};

// Quest ledger deployment the front end was built against
pub const DEFAULT_QUEST_CONTRACT_ADDRESS: Address =
    address!("0x62cE3E51E090425A6c4F219829005b9f4D8C06Ec");

/// Reward asset identifier standing in for the chain's native coin.
pub const NATIVE_ASSET: Address = Address::ZERO;
pub const NATIVE_DECIMALS: u8 = 18;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Decimal places kept (rounding up) when rendering USD values.
pub const USD_PRECISION: u32 = 3;

/// Revert reason the ledger uses for reads past the last quest.
pub const OUT_OF_BOUNDS_REASON: &str = "Start index out of bounds";

pub const NOTIFICATION_DISMISS_MS: u64 = 3000;

pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs/";
pub const DEFAULT_PINATA_UPLOAD_URL: &str = "https://uploads.pinata.cloud/v3/files";
pub const DEFAULT_NATIVE_PRICE_URL: &str =
    "https://min-api.cryptocompare.com/data/price?fsym=ETH&tsyms=USD";
pub const DEFAULT_TOKEN_PRICE_URL: &str = "https://api.dexscreener.com/latest/dex/search?q=";

// Used for testing
pub const FAKE_ADDRESS: Address = address!("0xc76a6477c12dcb8554b1493482D85AB720b2A322");
pub const FAKE_TOKEN_ADDRESS: Address = address!("0xF73978B3A7D1d4974abAE11f696c1b4408c027A0");
