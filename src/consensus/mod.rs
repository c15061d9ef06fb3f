// Consensus - FFG accounting: validators, dynasties, deposits and slashing
// Principle: Stake is conserved across every transition

pub mod checkpoint;
pub mod dynasty;
pub mod economics;
pub mod epoch;
pub mod scale;
pub mod slashing;
pub mod validator;
