//! Command-line interface for the `mbgate` application.
//!
//! This crate is the executable entry point; all behavior lives in
//! `mbgate-client`.

fn main() -> anyhow::Result<()> {
    mbgate_client::run()
}
