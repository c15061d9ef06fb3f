// Tests module
// Scenario tests: slashing, withdrawal and ledger invariants across many epochs


pub mod slashing_scenarios;
