pub mod ledger_repo;
