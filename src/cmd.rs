pub mod ping;
pub mod setkey;
