// Adapters layer: concrete implementations of the domain ports.

pub mod ipa_cli;
pub mod terminal;

pub use ipa_cli::IpaCli;
pub use terminal::LineAnswers;
