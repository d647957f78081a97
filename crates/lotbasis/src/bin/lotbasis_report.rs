//! lotbasis-report - Report realized sales and remaining basis.
//!
//! Primary binary for replaying a JSON trade ledger.

fn main() -> std::process::ExitCode {
    lotbasis::cmd::report::main()
}
